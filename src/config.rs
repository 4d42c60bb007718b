use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::record::RECORD_SIZE;

/// Tunables for chunk discovery. The heuristic thresholds are empirical and
/// not derived from the format.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ScanConfig {
    pub min_directory_entries: usize,
    pub merge_proximity: u64,
    pub density_window: usize,
    pub density_stride: usize,
    pub min_probe_hits: usize,
    pub marker_window: usize,
    pub min_marker_hits: usize,
    pub enable_full_scan: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            min_directory_entries: 4,
            merge_proximity: 1024,
            density_window: 4096,
            density_stride: 4096,
            min_probe_hits: 4,
            marker_window: 4096,
            min_marker_hits: 3,
            enable_full_scan: true,
        }
    }
}

impl ScanConfig {
    pub fn validate(&self) -> Result<()> {
        if self.density_window < RECORD_SIZE {
            bail!(
                "density_window {} is smaller than one record ({RECORD_SIZE} bytes)",
                self.density_window
            );
        }
        if self.marker_window < RECORD_SIZE {
            bail!(
                "marker_window {} is smaller than one record ({RECORD_SIZE} bytes)",
                self.marker_window
            );
        }
        if self.density_stride == 0 {
            bail!("density_stride must be non-zero");
        }
        if self.min_probe_hits == 0 || self.min_marker_hits == 0 {
            bail!("heuristic hit thresholds must be at least 1");
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub run_id: String,
    #[serde(default)]
    pub scan: ScanConfig,
}

#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: Config,
    pub config_hash: String,
}

pub fn load_config(path: Option<&Path>) -> Result<LoadedConfig> {
    let bytes: Vec<u8> = if let Some(p) = path {
        std::fs::read(p).with_context(|| format!("reading config {}", p.display()))?
    } else {
        include_bytes!("../config/default.yml").to_vec()
    };

    let mut config: Config = serde_yaml::from_slice(&bytes).context("parsing config yaml")?;
    if config.run_id.trim().is_empty() {
        config.run_id = generate_run_id();
    }
    config.scan.validate()?;

    let config_hash = hash_bytes(&bytes);

    Ok(LoadedConfig { config, config_hash })
}

fn hash_bytes(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let digest = hasher.finalize();
    hex::encode(digest)
}

fn generate_run_id() -> String {
    let now = chrono::Utc::now();
    format!("{}_{:08x}", now.format("%Y%m%dT%H%M%SZ"), now.timestamp_subsec_nanos())
}
