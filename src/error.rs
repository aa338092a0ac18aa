//! Engine error taxonomy.
//!
//! Errors that occur before a harvest loop starts (launch, navigation,
//! submission) propagate as `EngineError` so the caller can decide whether to
//! continue with other engines. Errors inside the loop are handled at the
//! engine level and end the loop with whatever was gathered so far.

use std::time::Duration;

use chromiumoxide::error::CdpError;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Browser discovery, download, or launch failed.
    #[error("browser provisioning failed: {0}")]
    Launch(#[from] anyhow::Error),

    /// A DevTools command failed after the browser was up.
    #[error("browser automation failed: {0}")]
    Cdp(#[source] Box<CdpError>),

    /// A bounded wait expired before its condition held.
    #[error("timed out after {waited:?} waiting for {what}")]
    Timeout { waited: Duration, what: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// CdpError is large; box it at the conversion boundary so `?` stays cheap.
impl From<CdpError> for EngineError {
    fn from(err: CdpError) -> Self {
        Self::Cdp(Box::new(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_message_names_the_condition() {
        let err = EngineError::Timeout {
            waited: Duration::from_secs(12),
            what: "results container".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("results container"));
        assert!(msg.contains("12s"));
    }

    #[test]
    fn test_launch_wraps_anyhow_context() {
        let err = EngineError::from(anyhow::anyhow!("no chromium found"));
        assert!(err.to_string().contains("browser provisioning failed"));
        assert!(err.to_string().contains("no chromium found"));
    }

    #[test]
    fn test_io_errors_pass_through_transparently() {
        let io = std::io::Error::other("pipe closed");
        let err = EngineError::from(io);
        assert_eq!(err.to_string(), "pipe closed");
    }
}
