use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Sweep controls. Every field can be overridden from the command line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepConfig {
    #[serde(default = "SweepConfig::default_seed")]
    pub seed: u64,
    #[serde(default = "SweepConfig::default_sample_size")]
    pub sample_size: usize,
    /// Fixed query radius for cutoff sweeps and single comparisons.
    #[serde(default = "SweepConfig::default_radius")]
    pub radius: f64,
    /// Radius axis values.
    #[serde(default = "SweepConfig::default_radii")]
    pub radii: Vec<f64>,
    /// Cutoff axis values.
    #[serde(default = "SweepConfig::default_cutoffs")]
    pub cutoffs: Vec<u64>,
    /// Calibration target; omitted means "match the observed event count".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_count: Option<usize>,
}

impl SweepConfig {
    fn default_seed() -> u64 {
        42
    }
    fn default_sample_size() -> usize {
        50_000
    }
    fn default_radius() -> f64 {
        10.0
    }
    fn default_radii() -> Vec<f64> {
        vec![2.0, 5.0, 10.0, 20.0]
    }
    fn default_cutoffs() -> Vec<u64> {
        vec![200_000, 400_000, 600_000, 800_000, 1_000_000]
    }
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            seed: Self::default_seed(),
            sample_size: Self::default_sample_size(),
            radius: Self::default_radius(),
            radii: Self::default_radii(),
            cutoffs: Self::default_cutoffs(),
            target_count: None,
        }
    }
}

/// Input column names.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    /// Event label column of the embedding CSV.
    #[serde(default = "InputConfig::default_label")]
    pub label: String,
    /// Label column written when exporting a null field.
    #[serde(default = "InputConfig::default_null_label")]
    pub null_label: String,
}

impl InputConfig {
    fn default_label() -> String {
        "is_prime".into()
    }
    fn default_null_label() -> String {
        "is_prime_null".into()
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            label: Self::default_label(),
            null_label: Self::default_null_label(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub sweep: SweepConfig,
    #[serde(default)]
    pub input: InputConfig,
}

impl AppConfig {
    /// Read the config at `path`, or write commented defaults there and
    /// return them. A malformed file falls back to defaults with a notice
    /// rather than aborting the run.
    pub fn load_or_default(path: &str) -> Self {
        let path_obj = Path::new(path);
        if path_obj.exists() {
            match fs::read_to_string(path_obj) {
                Ok(contents) => match toml::from_str(&contents) {
                    Ok(cfg) => return cfg,
                    Err(err) => {
                        eprintln!("Failed to parse config {path}: {err}. Using defaults.");
                    }
                },
                Err(err) => {
                    eprintln!("Failed to read config {path}: {err}. Using defaults.");
                }
            }
            return Self::default();
        }

        // File does not exist: write defaults, commented out so the file
        // documents the keys without pinning them.
        let default_cfg = Self::default();
        if let Ok(text) = toml::to_string_pretty(&default_cfg) {
            let mut commented = String::new();
            for line in text.lines() {
                let trimmed = line.trim();
                if trimmed.is_empty() || (trimmed.starts_with('[') && trimmed.ends_with(']')) {
                    commented.push_str(line);
                } else {
                    commented.push_str("# ");
                    commented.push_str(line);
                }
                commented.push('\n');
            }
            if let Err(err) = fs::write(path_obj, commented) {
                eprintln!("Failed to write default config to {path}: {err}");
            }
        } else {
            eprintln!("Failed to serialize default config; continuing with defaults");
        }
        default_cfg
    }
}
