use std::path::PathBuf;

use tracing::level_filters::LevelFilter;

use cli::batch::{run_merge, DEFAULT_TEMPLATES_ROOT};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(LevelFilter::INFO)
        .init();

    let root = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_TEMPLATES_ROOT));

    run_merge(&root)?;
    Ok(())
}
