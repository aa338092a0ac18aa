//! Run orchestration.
//!
//! Expands the plan into queries, runs every query against every requested
//! engine, and appends all rows to the output CSV in one shot at the end. An
//! engine failing one query is reported and skipped; the run keeps going.

use anyhow::Result;
use tracing::{error, info};

use crate::cli::RunPlan;
use crate::config::HarvestConfig;
use crate::dork::build_queries;
use crate::engine::{EngineRegistry, SearchEngine};
use crate::sink::{self, SearchResult};

pub async fn run(plan: &RunPlan, registry: &EngineRegistry) -> Result<()> {
    let queries = build_queries(&plan.params_to_terms, plan.combine);
    if queries.is_empty() {
        println!("No queries built. Exiting.");
        return Ok(());
    }
    println!("Total queries: {}", queries.len());

    let config = HarvestConfig::default().with_headless(plan.headless);
    let mut rows: Vec<SearchResult> = Vec::new();

    for query in &queries {
        for name in &plan.engines {
            println!("\n[{}] Running: {query}", name.to_uppercase());
            let Some(engine) = registry.get(name) else {
                error!("no engine registered under '{name}'");
                println!("[{name}] Error: unknown engine");
                continue;
            };
            match engine.run(query, &config).await {
                Ok(links) => {
                    println!("Found {} links.", links.len());
                    info!("{name} finished '{query}' with {} links", links.len());
                    rows.extend(
                        links
                            .into_iter()
                            .map(|url| SearchResult::new(query.clone(), url, *name)),
                    );
                }
                Err(e) => {
                    error!("{name} failed on '{query}': {e}");
                    println!("[{name}] Error: {e}");
                }
            }
        }
    }

    sink::append_rows(&plan.out, &rows)?;
    println!("\nDone. Wrote {} rows to: {}", rows.len(), plan.out.display());
    Ok(())
}
