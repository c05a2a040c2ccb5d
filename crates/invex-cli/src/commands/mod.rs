//! CLI subcommands.

pub mod batch;
pub mod config;
pub mod models;
pub mod process;

use std::path::{Path, PathBuf};

use clap::Args;
use tracing::debug;

use invex_core::models::config::OcrConfig;
use invex_core::ExtractorConfig;

/// Per-user configuration file.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("invex")
        .join("config.json")
}

/// The configuration file in effect: `--config` if given, else the per-user file.
pub fn config_path(explicit: Option<&str>) -> PathBuf {
    explicit.map(PathBuf::from).unwrap_or_else(default_config_path)
}

/// Load `--config`, else the per-user file if it exists, else defaults.
pub fn load_config(explicit: Option<&str>) -> anyhow::Result<ExtractorConfig> {
    if let Some(path) = explicit {
        return Ok(ExtractorConfig::from_file(Path::new(path))?);
    }

    let path = default_config_path();
    if path.exists() {
        debug!("Using config file {}", path.display());
        Ok(ExtractorConfig::from_file(&path)?)
    } else {
        Ok(ExtractorConfig::default())
    }
}

/// `--gpu` / `--no-gpu`; the last one given wins.
#[derive(Args, Debug, Clone, Default)]
pub struct GpuArgs {
    /// Request GPU acceleration for OCR
    #[arg(long, overrides_with = "no_gpu")]
    gpu: bool,

    /// Run OCR on the CPU
    #[arg(long, overrides_with = "gpu")]
    no_gpu: bool,
}

impl GpuArgs {
    /// Override the configured GPU setting when a flag was given.
    pub fn apply(&self, ocr: &mut OcrConfig) {
        if self.gpu {
            ocr.use_gpu = true;
        } else if self.no_gpu {
            ocr.use_gpu = false;
        }
    }
}
