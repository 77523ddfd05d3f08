use std::path::PathBuf;

use clap::Parser;

/// Command-line configuration. Log verbosity comes from `RUST_LOG`.
#[derive(Debug, Clone, Parser)]
#[command(name = "vax-dashboard", version, about = "Regional vaccination coverage dashboard")]
pub struct Config {
    /// Coverage table to load (.csv, .json or .parquet).
    #[arg(long, default_value = "vaccination_data.csv")]
    pub data: PathBuf,

    /// How many regions (in sorted order) are selected at start-up.
    #[arg(long, default_value_t = 5)]
    pub default_regions: usize,

    /// Initial window width.
    #[arg(long, default_value_t = 1280.0)]
    pub width: f32,

    /// Initial window height.
    #[arg(long, default_value_t = 860.0)]
    pub height: f32,
}
