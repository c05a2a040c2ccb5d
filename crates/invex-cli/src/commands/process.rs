//! Process command - extract data from a single invoice file.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use tracing::info;

use invex_core::InvoiceExtractor;

use super::{GpuArgs, load_config};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input PDF file
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[command(flatten)]
    gpu: GpuArgs,

    /// Model directory
    #[arg(short, long)]
    model_dir: Option<PathBuf>,
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut config = load_config(config_path)?;
    args.gpu.apply(&mut config.ocr);
    if let Some(model_dir) = &args.model_dir {
        config.models.model_dir = model_dir.clone();
    }

    let extractor = InvoiceExtractor::new(config);
    let input = args.input.clone();
    let record = tokio::task::spawn_blocking(move || extractor.process_pdf(&input)).await??;

    let output = record.to_json_pretty()?;

    if let Some(output_path) = &args.output {
        if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(output_path, &output)?;
        eprintln!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    info!(
        "Finished {} in {}ms",
        args.input.display(),
        start.elapsed().as_millis()
    );

    Ok(())
}
