//! # Utility Module
//!
//! Glue between CLI options, configuration and output.

use std::fs::OpenOptions;
use std::path::Path;

use anyhow::{Result, anyhow};
use tracing::{info, warn};

use crate::cli::{CliOptions, OutputFormat};
use crate::config::ScanConfig;
use crate::output::OutputBackendKind;

/// Convert CLI output format to internal enum
pub fn backend_from_cli(format: OutputFormat) -> OutputBackendKind {
    match format {
        OutputFormat::Jsonl => OutputBackendKind::Jsonl,
        OutputFormat::Csv => OutputBackendKind::Csv,
    }
}

/// Apply CLI threshold overrides on top of the loaded scan config.
pub fn apply_cli_overrides(scan: &mut ScanConfig, opts: &CliOptions) -> Result<()> {
    if opts.no_full_scan {
        scan.enable_full_scan = false;
        info!("full-file fallback scan disabled by CLI");
    }
    if let Some(hits) = opts.min_probe_hits {
        scan.min_probe_hits = hits;
    }
    if let Some(hits) = opts.min_marker_hits {
        scan.min_marker_hits = hits;
    }
    scan.validate()
}

/// Ensure output directory exists and is writable, warning on unsafe permissions.
pub fn ensure_output_dir(path: &Path) -> Result<()> {
    if path.exists() {
        let metadata = std::fs::metadata(path)?;
        if !metadata.is_dir() {
            return Err(anyhow!(
                "output path is not a directory: {}",
                path.display()
            ));
        }
    } else {
        std::fs::create_dir_all(path)?;
    }

    let probe_path = path.join(".squadcarve_write_probe");
    match OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&probe_path)
    {
        Ok(_) => {
            let _ = std::fs::remove_file(&probe_path);
        }
        Err(err) => {
            return Err(anyhow!(
                "output directory is not writable: {} ({})",
                path.display(),
                err
            ));
        }
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = std::fs::metadata(path)?.permissions().mode();
        if mode & 0o002 != 0 {
            warn!("output directory is world-writable: {}", path.display());
        }
    }

    Ok(())
}
