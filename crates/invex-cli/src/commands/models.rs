//! Models command - inspect the OCR model files.

use std::fs;
use std::path::PathBuf;

use clap::{Args, Subcommand};
use console::style;

use invex_core::models::config::ModelConfig;

use super::load_config;

/// Arguments for the models command.
#[derive(Args)]
pub struct ModelsArgs {
    #[command(subcommand)]
    command: ModelsCommand,
}

#[derive(Subcommand)]
enum ModelsCommand {
    /// Check which model files are present
    Status(DirArgs),

    /// Print the model directory
    Path(DirArgs),
}

#[derive(Args)]
struct DirArgs {
    /// Model directory (default: from config)
    #[arg(short, long)]
    model_dir: Option<PathBuf>,
}

pub async fn run(args: ModelsArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let resolve = |dir_args: DirArgs| {
        let mut models = config.models.clone();
        if let Some(dir) = dir_args.model_dir {
            models.model_dir = dir;
        }
        models
    };

    match args.command {
        ModelsCommand::Status(dir_args) => check_status(&resolve(dir_args)),
        ModelsCommand::Path(dir_args) => {
            println!("{}", resolve(dir_args).model_dir.display());
            Ok(())
        }
    }
}

/// Model files that are missing from `models.model_dir`.
fn missing_files(models: &ModelConfig) -> Vec<PathBuf> {
    models.files().into_iter().filter(|p| !p.exists()).collect()
}

fn check_status(models: &ModelConfig) -> anyhow::Result<()> {
    println!("{}", style("Model Status").bold());
    println!("Model directory: {}", style(models.model_dir.display()).cyan());
    println!();

    let mut total_size: u64 = 0;

    for path in models.files() {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let (status, size_str) = if path.exists() {
            let size = fs::metadata(&path)?.len();
            total_size += size;
            if size > 0 {
                (style("✓").green(), format_size(size))
            } else {
                (style("⚠").yellow(), "empty".to_string())
            }
        } else {
            (style("✗").red(), "missing".to_string())
        };

        println!("    {} {:<25} {:>10}", status, name, size_str);
    }

    println!();
    let missing = missing_files(models);
    if missing.is_empty() {
        println!(
            "{} Ready ({} total)",
            style("✓").green(),
            format_size(total_size)
        );
    } else {
        println!(
            "{} {} model file(s) missing; scanned PDFs will fail until they are installed",
            style("⚠").yellow(),
            missing.len()
        );
    }

    Ok(())
}

fn format_size(bytes: u64) -> String {
    if bytes >= 1_000_000_000 {
        format!("{:.1}GB", bytes as f64 / 1_000_000_000.0)
    } else if bytes >= 1_000_000 {
        format!("{:.1}MB", bytes as f64 / 1_000_000.0)
    } else if bytes >= 1_000 {
        format!("{:.1}KB", bytes as f64 / 1_000.0)
    } else {
        format!("{}B", bytes)
    }
}
