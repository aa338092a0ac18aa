//! Shared per-query browser session.
//!
//! Every engine run owns exactly one [`HarvestSession`]: a launched browser,
//! one prepared page, and the link accumulator. The session guarantees the
//! browser is released on every exit path, whether the run drains normally
//! through [`HarvestSession::finish`] or bails early through
//! [`HarvestSession::dispose`].

use std::collections::HashSet;
use std::future::Future;
use std::time::{Duration, Instant};

use chromiumoxide::element::Element;
use chromiumoxide::page::Page;
use serde_json::Value;
use tokio::task;
use tracing::debug;

use crate::browser::BrowserHandle;
use crate::collector::LinkCollector;
use crate::config::HarvestConfig;
use crate::error::EngineError;
use crate::stealth;

/// Poll `check` until it returns true, spacing attempts by `interval` and
/// giving up after `timeout`. The condition is always checked at least once.
/// Returns how long the condition took to hold; the timeout error names
/// `what` so the failure reads well in logs.
pub async fn poll_until<F, Fut>(
    mut check: F,
    timeout: Duration,
    interval: Duration,
    what: &str,
) -> Result<Duration, EngineError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let start = Instant::now();
    loop {
        if check().await {
            return Ok(start.elapsed());
        }
        if start.elapsed() >= timeout {
            return Err(EngineError::Timeout {
                waited: start.elapsed(),
                what: what.to_string(),
            });
        }
        tokio::time::sleep(interval).await;
    }
}

/// Promote a lookup result into its element, reporting absence as an expired
/// wait on `what`. A node can detach between appearing and being fetched;
/// callers see that as the same bounded-wait failure.
fn require_attached(
    found: Option<Element>,
    what: &str,
    waited: Duration,
) -> Result<Element, EngineError> {
    found.ok_or_else(|| EngineError::Timeout {
        waited,
        what: what.to_string(),
    })
}

/// Quote `raw` as a JavaScript string literal.
fn js_string(raw: &str) -> String {
    let escaped = raw.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{escaped}\"")
}

/// An element address usable from injected JavaScript. Pagination controls
/// are addressed by CSS where possible and by XPath where only the text
/// content distinguishes them.
#[derive(Debug, Clone, Copy)]
pub enum Locator<'a> {
    Css(&'a str),
    XPath(&'a str),
}

impl Locator<'_> {
    /// Expression evaluating to the element or null.
    fn find_js(&self) -> String {
        match self {
            Self::Css(selector) => format!("document.querySelector({})", js_string(selector)),
            Self::XPath(xpath) => format!(
                "document.evaluate({}, document, null, XPathResult.FIRST_ORDERED_NODE_TYPE, null).singleNodeValue",
                js_string(xpath)
            ),
        }
    }

    fn present_js(&self) -> String {
        format!("{} !== null", self.find_js())
    }

    /// Visible means attached and laid out; offsetParent is null for
    /// display:none and detached nodes.
    fn visible_js(&self) -> String {
        format!(
            "(() => {{ const el = {}; return el !== null && el.offsetParent !== null; }})()",
            self.find_js()
        )
    }

    /// Scroll the element to center and click it, reporting whether a click
    /// actually happened.
    fn click_js(&self) -> String {
        format!(
            "(() => {{ const el = {}; if (el === null || el.offsetParent === null) return false; el.scrollIntoView({{ block: 'center' }}); el.click(); return true; }})()",
            self.find_js()
        )
    }

    fn focus_js(&self) -> String {
        format!(
            "(() => {{ const el = {}; if (el === null) return false; el.focus(); return true; }})()",
            self.find_js()
        )
    }
}

/// One browser session bound to one engine run.
pub struct HarvestSession {
    handle: BrowserHandle,
    page: Page,
    links: LinkCollector,
}

impl HarvestSession {
    /// Launch a browser, harden a fresh page, and navigate it to `home`.
    /// The browser is torn down before returning any error.
    pub async fn open(home: &str, config: &HarvestConfig) -> Result<Self, EngineError> {
        let handle = BrowserHandle::launch(config.headless()).await?;
        match Self::prepare_page(&handle, home).await {
            Ok(page) => Ok(Self {
                handle,
                page,
                links: LinkCollector::new(),
            }),
            Err(e) => {
                handle.close().await;
                Err(e)
            }
        }
    }

    async fn prepare_page(handle: &BrowserHandle, home: &str) -> Result<Page, EngineError> {
        let page = handle.browser().new_page("about:blank").await?;
        stealth::prepare_page(&page).await?;
        page.goto(home).await?;
        page.wait_for_navigation().await?;
        Ok(page)
    }

    /// Wait until `selector` matches something, bounded by the configured
    /// results wait.
    pub async fn wait_for(
        &self,
        selector: &str,
        config: &HarvestConfig,
    ) -> Result<(), EngineError> {
        let waited = poll_until(
            || async move { self.try_find(selector).await.is_some() },
            config.results_wait(),
            config.poll_interval(),
            selector,
        )
        .await?;
        debug!("{selector} appeared after {waited:?}");
        Ok(())
    }

    /// Look up an element without waiting. Absence is an answer here, not an
    /// error.
    pub async fn try_find(&self, selector: &str) -> Option<Element> {
        self.page.find_element(selector).await.ok()
    }

    /// Full serialized DOM of the current page.
    pub async fn html(&self) -> Result<String, EngineError> {
        Ok(self.page.content().await?)
    }

    async fn eval_bool(&self, js: String) -> Result<bool, EngineError> {
        let result = self.page.evaluate(js).await?;
        Ok(result.value().and_then(Value::as_bool).unwrap_or(false))
    }

    /// Rendered height of the document, the progress signal for engines that
    /// paginate by scrolling.
    pub async fn page_height(&self) -> Result<u64, EngineError> {
        let result = self.page.evaluate("document.body.scrollHeight").await?;
        Ok(result.value().and_then(Value::as_u64).unwrap_or(0))
    }

    pub async fn scroll_to_bottom(&self) -> Result<(), EngineError> {
        self.page
            .evaluate("window.scrollTo(0, document.body.scrollHeight);")
            .await?;
        Ok(())
    }

    pub async fn is_present(&self, locator: &Locator<'_>) -> Result<bool, EngineError> {
        self.eval_bool(locator.present_js()).await
    }

    /// Give keyboard focus to `locator` if it exists.
    pub async fn focus(&self, locator: &Locator<'_>) -> Result<bool, EngineError> {
        self.eval_bool(locator.focus_js()).await
    }

    /// Click `locator` if it is currently visible. Returns whether the click
    /// landed.
    pub async fn click(&self, locator: &Locator<'_>) -> Result<bool, EngineError> {
        self.eval_bool(locator.click_js()).await
    }

    /// Wait for `locator` to become visible, then click it. A timeout is an
    /// expected outcome (the control may simply not exist on this layout) and
    /// reports as a missed click rather than an error.
    pub async fn click_when_clickable(
        &self,
        locator: &Locator<'_>,
        config: &HarvestConfig,
    ) -> Result<bool, EngineError> {
        let page = &self.page;
        let visible = locator.visible_js();
        let visible_js = visible.as_str();
        let waited = poll_until(
            || async move {
                match page.evaluate(visible_js).await {
                    Ok(result) => result.value().and_then(Value::as_bool).unwrap_or(false),
                    Err(_) => false,
                }
            },
            config.results_wait(),
            config.poll_interval(),
            "element to become clickable",
        )
        .await;

        match waited {
            Ok(_) => self.click(locator).await,
            Err(EngineError::Timeout { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Focus the search box, type the query, and submit with Enter.
    pub async fn submit_query(
        &self,
        selector: &str,
        query: &str,
        config: &HarvestConfig,
    ) -> Result<(), EngineError> {
        self.wait_for(selector, config).await?;
        let input = require_attached(
            self.try_find(selector).await,
            selector,
            config.results_wait(),
        )?;
        input.click().await?;
        input.type_str(query).await?;
        input.press_key("Enter").await?;
        self.page.wait_for_navigation().await?;
        Ok(())
    }

    pub async fn current_url(&self) -> Result<String, EngineError> {
        Ok(self.page.url().await?.unwrap_or_default())
    }

    /// Block until the operator presses Enter on stdin. Used when a CAPTCHA
    /// needs a human before the harvest can continue.
    pub async fn await_operator_ack(&self) -> Result<(), EngineError> {
        task::spawn_blocking(|| {
            let mut line = String::new();
            std::io::stdin().read_line(&mut line).map(|_| ())
        })
        .await
        .map_err(|e| EngineError::Io(std::io::Error::other(e)))??;
        Ok(())
    }

    /// Fold freshly extracted candidate URLs into the session's link set,
    /// returning how many were new.
    pub fn merge_links<I>(&mut self, candidates: I) -> usize
    where
        I: IntoIterator<Item = String>,
    {
        self.links.merge(candidates)
    }

    #[must_use]
    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    /// Normal teardown: pause for `drain` so late result tiles can render,
    /// close the browser, and yield everything harvested.
    pub async fn finish(self, drain: Duration) -> HashSet<String> {
        tokio::time::sleep(drain).await;
        let Self { handle, links, .. } = self;
        handle.close().await;
        links.into_set()
    }

    /// Early teardown for errors before the harvest loop produced anything
    /// worth keeping.
    pub async fn dispose(self) {
        let Self { handle, .. } = self;
        handle.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_poll_until_reports_elapsed_time_on_success() {
        let mut remaining = 3u32;
        let waited = poll_until(
            || {
                let ready = remaining == 0;
                remaining = remaining.saturating_sub(1);
                async move { ready }
            },
            Duration::from_secs(1),
            Duration::from_millis(1),
            "countdown",
        )
        .await
        .unwrap();
        assert!(waited >= Duration::from_millis(3));
    }

    #[tokio::test]
    async fn test_poll_until_times_out_with_condition_name() {
        let err = poll_until(
            || async { false },
            Duration::from_millis(5),
            Duration::from_millis(1),
            "never-true condition",
        )
        .await
        .unwrap_err();
        match err {
            EngineError::Timeout { what, .. } => assert_eq!(what, "never-true condition"),
            other => panic!("expected timeout, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_poll_until_checks_at_least_once() {
        // Even a zero timeout gets one shot at the condition.
        let waited = poll_until(
            || async { true },
            Duration::ZERO,
            Duration::from_millis(1),
            "immediate",
        )
        .await;
        assert!(waited.is_ok());
    }

    #[test]
    fn test_detached_element_maps_to_a_bounded_wait_failure() {
        let err =
            require_attached(None, "textarea[name='q']", Duration::from_secs(12)).unwrap_err();
        match err {
            EngineError::Timeout { what, .. } => assert_eq!(what, "textarea[name='q']"),
            other => panic!("expected timeout, got {other:?}"),
        }
    }

    #[test]
    fn test_js_string_escapes_quotes_and_backslashes() {
        assert_eq!(js_string("plain"), "\"plain\"");
        assert_eq!(js_string("a\"b"), "\"a\\\"b\"");
        assert_eq!(js_string("back\\slash"), "\"back\\\\slash\"");
    }

    #[test]
    fn test_css_locator_uses_query_selector() {
        let js = Locator::Css("#pnnext").find_js();
        assert_eq!(js, "document.querySelector(\"#pnnext\")");
    }

    #[test]
    fn test_xpath_locator_uses_document_evaluate() {
        let js = Locator::XPath("//button[@id='L2AGLb']").find_js();
        assert!(js.starts_with("document.evaluate(\"//button[@id='L2AGLb']\""));
        assert!(js.contains("FIRST_ORDERED_NODE_TYPE"));
    }

    #[test]
    fn test_click_js_guards_on_visibility() {
        let js = Locator::Css("#more-results").click_js();
        assert!(js.contains("offsetParent === null) return false"));
        assert!(js.contains("scrollIntoView"));
        assert!(js.contains("el.click()"));
    }

    #[test]
    fn test_focus_js_tolerates_a_missing_element() {
        let js = Locator::Css("#searchbox_input").focus_js();
        assert!(js.contains("el === null) return false"));
        assert!(js.contains("el.focus()"));
    }
}
