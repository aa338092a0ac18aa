//! Chromium discovery, launch, and teardown.
//!
//! Resolution order: the `CHROMIUM_PATH` environment variable, well-known
//! install locations per platform, `which` on Unix, and finally a managed
//! download into the user cache directory. The launched browser is wrapped in
//! a [`BrowserHandle`] that owns the CDP event pump and the throwaway profile
//! directory, so one `close().await` tears the whole session down.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use anyhow::{Context, Result};
use chromiumoxide::browser::{Browser, BrowserConfigBuilder, HeadlessMode};
use chromiumoxide::fetcher::{BrowserFetcher, BrowserFetcherOptions};
use futures::StreamExt;
use tokio::task::{self, JoinHandle};
use tracing::{debug, info, trace, warn};

use crate::engine::types::CHROME_USER_AGENT;

/// Locate an installed Chrome or Chromium executable.
///
/// `CHROMIUM_PATH` overrides everything else; a value pointing at a missing
/// file is ignored with a warning rather than treated as fatal.
pub fn find_browser_executable() -> Option<PathBuf> {
    if let Ok(configured) = std::env::var("CHROMIUM_PATH") {
        let path = PathBuf::from(configured);
        if path.exists() {
            info!("using browser from CHROMIUM_PATH: {}", path.display());
            return Some(path);
        }
        warn!(
            "CHROMIUM_PATH points at a missing file, ignoring: {}",
            path.display()
        );
    }

    let candidates: &[&str] = if cfg!(target_os = "windows") {
        &[
            r"C:\Program Files\Google\Chrome\Application\chrome.exe",
            r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
            r"%LOCALAPPDATA%\Google\Chrome\Application\chrome.exe",
            r"C:\Program Files\Chromium\Application\chrome.exe",
        ]
    } else if cfg!(target_os = "macos") {
        &[
            "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
            "/Applications/Chromium.app/Contents/MacOS/Chromium",
            "~/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
            "~/Applications/Chromium.app/Contents/MacOS/Chromium",
            "/opt/homebrew/bin/chromium",
        ]
    } else {
        &[
            "/usr/bin/google-chrome",
            "/usr/bin/google-chrome-stable",
            "/usr/bin/chromium",
            "/usr/bin/chromium-browser",
            "/snap/bin/chromium",
            "/usr/local/bin/chromium",
            "/opt/google/chrome/chrome",
        ]
    };

    for candidate in candidates {
        let path = if let Some(rest) = candidate.strip_prefix("~/") {
            match dirs::home_dir() {
                Some(home) => home.join(rest),
                None => continue,
            }
        } else if candidate.contains('%') && cfg!(target_os = "windows") {
            PathBuf::from(expand_windows_env_vars(candidate))
        } else {
            PathBuf::from(candidate)
        };

        if path.exists() {
            info!("found browser at: {}", path.display());
            return Some(path);
        }
    }

    if !cfg!(target_os = "windows")
        && let Some(path) = probe_with_which()
    {
        info!("found browser via which: {}", path.display());
        return Some(path);
    }

    None
}

/// Ask `which` for the first known browser name resolvable on PATH.
fn probe_with_which() -> Option<PathBuf> {
    ["chromium", "chromium-browser", "google-chrome", "chrome"]
        .into_iter()
        .find_map(|name| {
            let output = Command::new("which").arg(name).output().ok()?;
            output
                .status
                .success()
                .then(|| String::from_utf8_lossy(&output.stdout).trim().to_string())
                .filter(|found| !found.is_empty())
                .map(PathBuf::from)
        })
}

/// Expand `%VAR%` tokens in a Windows path. Unknown variables and malformed
/// tokens are preserved verbatim so the path simply fails the exists check.
///
/// The `%` delimiters alternate segments between literal text and variable
/// names, so even-indexed segments pass through and odd-indexed ones expand.
/// A trailing odd segment has no closing `%` and is kept as written; an empty
/// one came from `%%` and collapses to a literal percent.
fn expand_windows_env_vars(path: &str) -> String {
    let segments: Vec<&str> = path.split('%').collect();
    let mut result = String::with_capacity(path.len());

    for (i, segment) in segments.iter().enumerate() {
        if i % 2 == 0 {
            result.push_str(segment);
        } else if i == segments.len() - 1 {
            result.push('%');
            result.push_str(segment);
        } else if segment.is_empty() {
            result.push('%');
        } else if let Ok(value) = std::env::var(segment) {
            result.push_str(&value);
        } else {
            result.push('%');
            result.push_str(segment);
            result.push('%');
        }
    }

    result
}

/// Download a Chromium build into the user cache and return its executable.
pub async fn download_managed_browser() -> Result<PathBuf> {
    let cache_dir = dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("dorkharvest")
        .join("chromium");
    std::fs::create_dir_all(&cache_dir).context("creating browser cache directory")?;

    info!("downloading managed Chromium into {}", cache_dir.display());
    let fetcher = BrowserFetcher::new(
        BrowserFetcherOptions::builder()
            .with_path(&cache_dir)
            .build()
            .context("building browser fetcher options")?,
    );
    let revision = fetcher.fetch().await.context("downloading browser")?;
    info!("downloaded Chromium {}", revision.folder_path.display());

    Ok(revision.executable_path)
}

/// Command line handed to every launched browser. Keeps automation banners
/// and background chatter out of the way without weakening TLS or process
/// isolation.
const LAUNCH_ARGS: &[&str] = &[
    "--disable-blink-features=AutomationControlled",
    "--start-maximized",
    "--disable-infobars",
    "--disable-notifications",
    "--disable-popup-blocking",
    "--disable-extensions",
    "--disable-background-networking",
    "--disable-background-timer-throttling",
    "--disable-backgrounding-occluded-windows",
    "--disable-breakpad",
    "--disable-hang-monitor",
    "--disable-prompt-on-repost",
    "--no-first-run",
    "--no-default-browser-check",
    "--metrics-recording-only",
    "--password-store=basic",
    "--use-mock-keychain",
    "--mute-audio",
];

/// A launched browser plus the resources tied to its lifetime.
///
/// The CDP event stream must be pumped for the connection to stay alive, so
/// the pump task is owned here and stopped on close. The profile directory
/// is unique per process and removed at teardown.
pub struct BrowserHandle {
    browser: Browser,
    handler: JoinHandle<()>,
    user_data_dir: Option<PathBuf>,
}

impl BrowserHandle {
    /// Find or download a browser and launch it with a throwaway profile.
    pub async fn launch(headless: bool) -> Result<Self> {
        let executable = match find_browser_executable() {
            Some(path) => path,
            None => {
                warn!("no installed Chrome/Chromium found, downloading one");
                download_managed_browser().await?
            }
        };

        let user_data_dir =
            std::env::temp_dir().join(format!("dorkharvest_chrome_{}", std::process::id()));
        std::fs::create_dir_all(&user_data_dir).context("creating browser profile directory")?;

        let mut builder = BrowserConfigBuilder::default()
            .request_timeout(Duration::from_secs(30))
            .window_size(1920, 1080)
            .user_data_dir(&user_data_dir)
            .chrome_executable(executable)
            .arg(format!("--user-agent={CHROME_USER_AGENT}"));
        builder = if headless {
            builder.headless_mode(HeadlessMode::New)
        } else {
            builder.with_head()
        };
        for arg in LAUNCH_ARGS {
            builder = builder.arg(*arg);
        }
        let config = builder
            .build()
            .map_err(|e| anyhow::anyhow!("building browser config: {e}"))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .context("launching browser")?;

        // Pump CDP events until the connection ends. Chrome emits events
        // chromiumoxide cannot deserialize; those are noise, not failures.
        // See chromiumoxide issues #167 and #229.
        let handler_task = task::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    let msg = e.to_string();
                    let benign = msg
                        .contains("data did not match any variant of untagged enum Message")
                        || msg.contains("Failed to deserialize WS response");
                    if benign {
                        trace!("suppressed benign CDP serialization error: {msg}");
                    } else {
                        warn!("browser handler error: {e:?}");
                    }
                }
            }
            debug!("browser handler task finished");
        });

        Ok(Self {
            browser,
            handler: handler_task,
            user_data_dir: Some(user_data_dir),
        })
    }

    #[must_use]
    pub fn browser(&self) -> &Browser {
        &self.browser
    }

    /// Close the browser, stop the event pump, and remove the profile
    /// directory. Teardown problems are logged, never propagated; by this
    /// point the links are already harvested.
    pub async fn close(mut self) {
        if let Err(e) = self.browser.close().await {
            warn!("browser close failed: {e}");
        }
        if let Err(e) = self.browser.wait().await {
            warn!("browser did not exit cleanly: {e}");
        }
        self.handler.abort();
        if let Some(dir) = self.user_data_dir.take() {
            remove_profile_dir(&dir);
        }
    }
}

impl Drop for BrowserHandle {
    fn drop(&mut self) {
        // Normal teardown goes through close(); this is the abort path.
        self.handler.abort();
        if let Some(dir) = self.user_data_dir.take() {
            remove_profile_dir(&dir);
        }
    }
}

fn remove_profile_dir(dir: &Path) {
    if let Err(e) = std::fs::remove_dir_all(dir) {
        debug!("could not remove profile dir {}: {e}", dir.display());
    }
}
