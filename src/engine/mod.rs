//! Search engines and their registry.
//!
//! Every engine implements [`SearchEngine`]: given one query and a run
//! configuration it owns a full browser session and returns the harvested
//! links. The [`EngineRegistry`] maps stable engine names to implementations
//! so the runner and CLI never hard-code the set.

pub mod pagination;
pub mod session;
pub mod types;

mod duckduckgo;
mod google;

pub use duckduckgo::DuckDuckGoEngine;
pub use google::GoogleEngine;

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;

use crate::config::HarvestConfig;
use crate::error::EngineError;

#[async_trait]
pub trait SearchEngine: Send + Sync {
    /// Stable identifier, also the value recorded in the CSV engine column.
    fn name(&self) -> &'static str;

    /// Landing page the query gets typed into.
    fn home_url(&self) -> &'static str;

    /// Harvest result links for one query inside a dedicated browser
    /// session. Failures before the first results page surface as errors;
    /// failures mid-pagination end the run with whatever was collected.
    async fn run(
        &self,
        query: &str,
        config: &HarvestConfig,
    ) -> Result<HashSet<String>, EngineError>;
}

/// Name-keyed engine lookup. Backed by a BTreeMap so listings and iteration
/// stay deterministic.
pub struct EngineRegistry {
    engines: BTreeMap<&'static str, Arc<dyn SearchEngine>>,
}

impl EngineRegistry {
    #[must_use]
    pub fn empty() -> Self {
        Self {
            engines: BTreeMap::new(),
        }
    }

    /// Registry holding every built-in engine.
    #[must_use]
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        registry.register(Arc::new(GoogleEngine));
        registry.register(Arc::new(DuckDuckGoEngine));
        registry
    }

    /// Insert an engine under its own name, replacing any previous holder.
    pub fn register(&mut self, engine: Arc<dyn SearchEngine>) {
        self.engines.insert(engine.name(), engine);
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<dyn SearchEngine>> {
        self.engines.get(name).cloned()
    }

    /// Registered engine names in sorted order.
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.engines.keys().copied().collect()
    }
}

impl Default for EngineRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
