//! DuckDuckGo result harvesting.
//!
//! The React serp renders everything into one growing list, so pagination is
//! a "More results" button when present and an end-of-page scroll otherwise.
//! Progress is measured by rendered document height rather than link count,
//! since the button can load content that parses into zero new links.

use std::collections::HashSet;

use async_trait::async_trait;
use scraper::{Html, Selector};
use tracing::{info, warn};

use crate::config::HarvestConfig;
use crate::engine::SearchEngine;
use crate::engine::pagination::StagnationTracker;
use crate::engine::session::{HarvestSession, Locator};
use crate::engine::types::{
    DUCKDUCKGO_DRAIN_PAUSE, DUCKDUCKGO_HOME, DUCKDUCKGO_LINK_SELECTORS,
    DUCKDUCKGO_MORE_RESULTS_SELECTOR, DUCKDUCKGO_RESULTS_CONTAINER, FOCUS_SETTLE,
    SEARCH_BOX_SELECTOR,
};
use crate::error::EngineError;

pub struct DuckDuckGoEngine;

#[async_trait]
impl SearchEngine for DuckDuckGoEngine {
    fn name(&self) -> &'static str {
        "duckduckgo"
    }

    fn home_url(&self) -> &'static str {
        DUCKDUCKGO_HOME
    }

    async fn run(
        &self,
        query: &str,
        config: &HarvestConfig,
    ) -> Result<HashSet<String>, EngineError> {
        let mut session = HarvestSession::open(DUCKDUCKGO_HOME, config).await?;

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
                    warn!("duckduckgo cycle ended early, keeping partial results: {e}");
                    break;
                }
            }
        }

        Ok(session.finish(DUCKDUCKGO_DRAIN_PAUSE).await)
    }
}

/// Type the query and submit it. The homepage overlay can steal focus from
/// the box, so it is nudged explicitly before typing starts.
async fn start_search(
    session: &HarvestSession,
    query: &str,
    config: &HarvestConfig,
) -> Result<(), EngineError> {
    session.wait_for(SEARCH_BOX_SELECTOR, config).await?;
    session.focus(&Locator::Css(SEARCH_BOX_SELECTOR)).await?;
    tokio::time::sleep(FOCUS_SETTLE).await;
    session.submit_query(SEARCH_BOX_SELECTOR, query, config).await
}

/// One pagination cycle. Returns true when the stagnation limit is reached.
async fn harvest_cycle(
    session: &mut HarvestSession,
    config: &HarvestConfig,
    tracker: &mut StagnationTracker,
) -> Result<bool, EngineError> {
    session
        .wait_for(DUCKDUCKGO_RESULTS_CONTAINER, config)
        .await?;

    let html = session.html().await?;
    let added = session.merge_links(collect_links(&html));
    if added > 0 {
        info!(
            "duckduckgo yielded {added} new links ({} total)",
            session.link_count()
        );
    }

    let more = Locator::Css(DUCKDUCKGO_MORE_RESULTS_SELECTOR);
    let mut clicked = false;
    if session.is_present(&more).await? {
        clicked = session.click_when_clickable(&more, config).await?;
    }
    if !clicked {
        session.scroll_to_bottom().await?;
    }

    tokio::time::sleep(config.settle_delay()).await;
    let height = session.page_height().await?;

    Ok(tracker.observe(height, clicked))
}

/// Extract result hrefs from the serialized serp. Anchor strategies are tried
/// most specific first; the first one yielding anything wins.
fn collect_links(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);

    for selector_str in DUCKDUCKGO_LINK_SELECTORS {
        let Ok(selector) = Selector::parse(selector_str) else {
            continue;
        };
        let found: Vec<String> = document
            .select(&selector)
            .filter_map(|anchor| anchor.value().attr("href").map(str::to_string))
            .collect();
        if !found.is_empty() {
            return found;
        }
    }

    Vec::new()
}
