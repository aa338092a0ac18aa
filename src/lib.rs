//! Dork query generation and browser-driven search result harvesting.
//!
//! The crate builds search queries from parameter/term mappings ("dorks"),
//! drives a real Chromium through each supported engine to collect result
//! links past the first page, and appends everything to a CSV. The pieces
//! compose:
//!
//! - [`dork`] renders parameter/term pairs into queries
//! - [`engine`] hosts the [`SearchEngine`] trait, the registry, and the
//!   Google and DuckDuckGo implementations
//! - [`browser`] finds or downloads Chromium and owns its lifecycle
//! - [`sink`] appends result rows to CSV
//! - [`cli`] and [`harvest`] turn flags or prompts into a full run

pub mod browser;
pub mod cli;
pub mod collector;
pub mod config;
pub mod dork;
pub mod engine;
pub mod error;
pub mod harvest;
pub mod sink;
pub mod stealth;

pub use cli::{Args, EngineChoice, RunPlan};
pub use collector::LinkCollector;
pub use config::HarvestConfig;
pub use dork::{build_queries, normalize_param, render_pair};
pub use engine::{DuckDuckGoEngine, EngineRegistry, GoogleEngine, SearchEngine};
pub use error::EngineError;
pub use sink::{SearchResult, append_rows};
