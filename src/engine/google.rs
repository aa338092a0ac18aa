//! Google result harvesting.
//!
//! Flow: land on the home page, click through any consent wall, type the
//! query, then loop the continuous-results layout. Each cycle extracts every
//! visible result card, deals with a CAPTCHA interstitial if one appeared,
//! and advances by the "More results" button, the classic next-page link, or
//! a plain scroll, in that order. The loop ends when the link count stops
//! moving for three cycles with no pagination click to explain it.

use std::collections::HashSet;
use std::io::{self, Write};

use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use tracing::{info, warn};

use crate::config::HarvestConfig;
use crate::engine::SearchEngine;
use crate::engine::pagination::StagnationTracker;
use crate::engine::session::{HarvestSession, Locator};
use crate::engine::types::{
    CONSENT_SETTLE, GOOGLE_ANY_LINK_SELECTOR, GOOGLE_CARD_SELECTORS, GOOGLE_CONSENT_XPATHS,
    GOOGLE_DRAIN_PAUSE, GOOGLE_HOME, GOOGLE_MORE_RESULTS_XPATH, GOOGLE_NEXT_PAGE_SELECTORS,
    GOOGLE_RECAPTCHA_XPATH, GOOGLE_RESULTS_CONTAINER, GOOGLE_TITLE_LINK_SELECTOR,
    SEARCH_BOX_SELECTOR,
};
use crate::error::EngineError;

pub struct GoogleEngine;

#[async_trait]
impl SearchEngine for GoogleEngine {
    fn name(&self) -> &'static str {
        "google"
    }

    fn home_url(&self) -> &'static str {
        GOOGLE_HOME
    }

    async fn run(
        &self,
        query: &str,
        config: &HarvestConfig,
    ) -> Result<HashSet<String>, EngineError> {
        let mut session = HarvestSession::open(GOOGLE_HOME, config).await?;

        if let Err(e) = start_search(&session, query, config).await {
            session.dispose().await;
            return Err(e);
        }

        let mut tracker = StagnationTracker::new(config.stagnation_limit());
        loop {
            match harvest_cycle(&mut session, config, &mut tracker).await {
                Ok(done) => {
                    if done {
                        break;
                    }
                }
                Err(e) => {
                    warn!("google cycle ended early, keeping partial results: {e}");
                    break;
                }
            }
        }

        Ok(session.finish(GOOGLE_DRAIN_PAUSE).await)
    }
}

async fn start_search(
    session: &HarvestSession,
    query: &str,
    config: &HarvestConfig,
) -> Result<(), EngineError> {
    dismiss_consent(session, config).await?;
    session
        .submit_query(SEARCH_BOX_SELECTOR, query, config)
        .await
}

/// Click through the regional consent wall when one is shown. Absence of any
/// known button is fine; the page simply had no wall.
async fn dismiss_consent(
    session: &HarvestSession,
    config: &HarvestConfig,
) -> Result<(), EngineError> {
    if session.wait_for("body", config).await.is_err() {
        // Nothing rendered at all; let query submission surface the failure.
        return Ok(());
    }
    for xpath in GOOGLE_CONSENT_XPATHS {
        let locator = Locator::XPath(xpath);
        if !session.is_present(&locator).await? {
            continue;
        }
        if session.click_when_clickable(&locator, config).await? {
            info!("dismissed consent dialog");
            tokio::time::sleep(CONSENT_SETTLE).await;
            return Ok(());
        }
    }
    Ok(())
}

/// One pagination cycle. Returns true when the stagnation limit is reached.
async fn harvest_cycle(
    session: &mut HarvestSession,
    config: &HarvestConfig,
    tracker: &mut StagnationTracker,
) -> Result<bool, EngineError> {
    session.wait_for(GOOGLE_RESULTS_CONTAINER, config).await?;

    let html = session.html().await?;
    let added = session.merge_links(collect_links(&html));
    if added > 0 {
        info!(
            "google yielded {added} new links ({} total)",
            session.link_count()
        );
    }

    if challenge_present(session).await? {
        println!("ReCAPTCHA detected. Solve it in the browser, then press Enter here to continue.");
        print!("Press Enter after solving ReCAPTCHA...");
        io::stdout().flush()?;
        session.await_operator_ack().await?;
    }

    let clicked = advance(session, config).await?;
    tokio::time::sleep(config.settle_delay()).await;

    Ok(tracker.observe(session.link_count() as u64, clicked))
}

async fn challenge_present(session: &HarvestSession) -> Result<bool, EngineError> {
    if session
        .is_present(&Locator::XPath(GOOGLE_RECAPTCHA_XPATH))
        .await?
    {
        return Ok(true);
    }
    Ok(session.current_url().await?.contains("/sorry/"))
}

/// Try each way of requesting more results, reporting whether a control was
/// actually clicked. Present controls get the full clickability wait before
/// giving up on them. A plain scroll still triggers loading on the continuous
/// layout but does not count as a click.
async fn advance(session: &HarvestSession, config: &HarvestConfig) -> Result<bool, EngineError> {
    let more = Locator::XPath(GOOGLE_MORE_RESULTS_XPATH);
    if session.is_present(&more).await? && session.click_when_clickable(&more, config).await? {
        return Ok(true);
    }
    for selector in GOOGLE_NEXT_PAGE_SELECTORS {
        let next = Locator::Css(selector);
        if session.is_present(&next).await? && session.click_when_clickable(&next, config).await? {
            return Ok(true);
        }
    }
    session.scroll_to_bottom().await?;
    Ok(false)
}

/// Extract result hrefs from a serialized results page. Card strategies are
/// tried most specific first; the first one matching any cards wins, even if
/// none of those cards carried a usable anchor.
fn collect_links(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let title_link = Selector::parse(GOOGLE_TITLE_LINK_SELECTOR).ok();
    let any_link = Selector::parse(GOOGLE_ANY_LINK_SELECTOR).ok();

    for card_selector in GOOGLE_CARD_SELECTORS {
        let Ok(cards) = Selector::parse(card_selector) else {
            continue;
        };
        let mut matched = false;
        let mut found = Vec::new();
        for card in document.select(&cards) {
            matched = true;
            if let Some(href) = card_link(&card, title_link.as_ref(), any_link.as_ref()) {
                found.push(href);
            }
        }
        if matched {
            return found;
        }
    }

    Vec::new()
}

/// Prefer the title anchor, fall back to the card's first http anchor.
fn card_link(
    card: &ElementRef<'_>,
    title_link: Option<&Selector>,
    any_link: Option<&Selector>,
) -> Option<String> {
    for selector in [title_link, any_link].into_iter().flatten() {
        if let Some(anchor) = card.select(selector).next()
            && let Some(href) = anchor.value().attr("href")
        {
            return Some(href.to_string());
        }
    }
    None
}
