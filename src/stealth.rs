//! Page hardening against automation detection.
//!
//! Search engines gate obvious automation behind CAPTCHAs, so before any
//! navigation each page gets a set of init scripts that paper over the usual
//! headless tells, plus a user agent override with the Headless marker
//! removed. Best effort only; a determined detector will still win.

use chromiumoxide::Page;
use chromiumoxide::cdp::browser_protocol::browser::GetVersionParams;
use chromiumoxide::cdp::browser_protocol::network::SetUserAgentOverrideParams;
use chromiumoxide::cdp::browser_protocol::page::AddScriptToEvaluateOnNewDocumentParams;
use tracing::debug;

use crate::error::EngineError;

/// Injected before every document in the page loads.
const INIT_SCRIPTS: &[&str] = &[
    // navigator.webdriver is the first thing every detector checks.
    "Object.defineProperty(navigator, 'webdriver', { get: () => undefined });",
    "Object.defineProperty(navigator, 'languages', { get: () => ['en-US', 'en'] });",
    // A plugin-less navigator is a headless giveaway.
    "Object.defineProperty(navigator, 'plugins', { get: () => [1, 2, 3] });",
    "window.chrome = window.chrome || { runtime: {} };",
];

/// Install the init scripts and user agent override on a fresh page. Must run
/// before the first navigation so the scripts cover the initial document.
pub async fn prepare_page(page: &Page) -> Result<(), EngineError> {
    for source in INIT_SCRIPTS {
        page.execute(AddScriptToEvaluateOnNewDocumentParams {
            source: (*source).to_string(),
            include_command_line_api: None,
            world_name: None,
            run_immediately: None,
        })
        .await?;
    }

    // Reuse the browser's own UA so version numbers stay consistent, just
    // without the HeadlessChrome marker.
    let version = page.execute(GetVersionParams {}).await?;
    let user_agent = version.user_agent.replace("Headless", "");
    debug!(%user_agent, "overriding page user agent");

    page.execute(SetUserAgentOverrideParams {
        user_agent,
        accept_language: Some("en-US,en".to_string()),
        platform: Some("Win32".to_string()),
        user_agent_metadata: None,
    })
    .await?;

    Ok(())
}
