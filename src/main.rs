use std::path::PathBuf;

use dust_viewer::{config::DEFAULT_CONFIG_FILE, flow, ViewerConfig};

fn main() -> anyhow::Result<()> {
    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
    let config = ViewerConfig::load_or_default(&path)?;
    flow::run(config)
}
