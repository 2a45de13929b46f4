use std::path::PathBuf;

use clap::Parser;

/// Sweep axis selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum Axis {
    /// Vary the query radius; calibrate and sample once.
    Radius,
    /// Vary the embedding cutoff N; re-calibrate per prefix, radius fixed.
    Cutoff,
}

#[derive(Parser, Debug, Clone)]
#[command(author, version, about)]
pub struct Args {
    /// Embedding CSV (columns: n (optional), x, y, event label)
    #[arg(value_name = "EMBEDDING_CSV")]
    pub embedding: PathBuf,

    /// Which parameter axis to sweep
    #[arg(long, value_enum, default_value = "radius")]
    pub axis: Axis,

    /// Radius axis values (comma separated; overrides config)
    #[arg(long, value_delimiter = ',')]
    pub radii: Option<Vec<f64>>,

    /// Cutoff axis values (comma separated; overrides config)
    #[arg(long, value_delimiter = ',')]
    pub cutoffs: Option<Vec<u64>>,

    /// Fixed query radius for cutoff sweeps (overrides config)
    #[arg(long)]
    pub radius: Option<f64>,

    /// Reference sample size (overrides config)
    #[arg(long)]
    pub sample_size: Option<usize>,

    /// Base random seed (overrides config)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Calibration target; default matches the observed event count
    #[arg(long)]
    pub target_count: Option<usize>,

    /// Event label column of the embedding CSV (overrides config)
    #[arg(long)]
    pub label: Option<String>,

    /// Output CSV for the sweep table
    #[arg(long, default_value = "sweep.csv")]
    pub out: PathBuf,

    /// Also export the calibrated null field (full embedding) to this CSV
    #[arg(long)]
    pub null_out: Option<PathBuf>,

    /// Path to config TOML
    #[arg(long, default_value = "nullscape.toml")]
    pub config: String,
}
