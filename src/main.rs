use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use dorkharvest::cli::Args;
use dorkharvest::engine::EngineRegistry;
use dorkharvest::harvest;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let plan = Args::parse().into_plan()?;
    let registry = EngineRegistry::builtin();
    harvest::run(&plan, &registry).await
}
