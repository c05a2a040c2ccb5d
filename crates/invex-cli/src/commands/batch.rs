//! Batch processing command for a directory of invoices.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;

use invex_core::{BatchProcessor, BatchReport, FileStatus, InvoiceExtractor};

use super::{GpuArgs, load_config};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Directory containing PDF invoices
    input_dir: PathBuf,

    /// Directory for the JSON results (created if missing)
    output_dir: PathBuf,

    #[command(flatten)]
    gpu: GpuArgs,

    /// Number of parallel workers (0 = one per CPU)
    #[arg(short = 'j', long)]
    jobs: Option<usize>,

    /// Model directory
    #[arg(short, long)]
    model_dir: Option<PathBuf>,

    /// Also write a per-file summary CSV to this path
    #[arg(long)]
    summary: Option<PathBuf>,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    if !args.input_dir.is_dir() {
        anyhow::bail!("Input directory not found: {}", args.input_dir.display());
    }

    let mut config = load_config(config_path)?;
    args.gpu.apply(&mut config.ocr);
    if let Some(model_dir) = &args.model_dir {
        config.models.model_dir = model_dir.clone();
    }
    if let Some(jobs) = args.jobs {
        config.batch.jobs = jobs;
    }

    let processor = BatchProcessor::new(Arc::new(InvoiceExtractor::new(config)));
    let files = BatchProcessor::discover(&args.input_dir)?;

    let file_count = files.len();
    eprintln!(
        "{} Found {} PDF files, using {} workers",
        style("ℹ").blue(),
        file_count,
        processor.jobs()
    );

    let pb = ProgressBar::new(file_count as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files {msg}")?
            .progress_chars("=>-"),
    );
    pb.enable_steady_tick(Duration::from_millis(120));

    let progress = pb.clone();
    let report = processor
        .process_files(files, &args.output_dir, move |outcome| {
            if let FileStatus::Failed(message) = &outcome.status {
                progress.println(format!(
                    "{} {}: {}",
                    style("✗").red(),
                    outcome.path.display(),
                    message
                ));
            }
            progress.set_message(file_name(&outcome.path));
            progress.inc(1);
        })
        .await?;

    pb.finish_and_clear();

    if let Some(summary_path) = &args.summary {
        write_summary(summary_path, &report)?;
        eprintln!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    print_summary(&report, &args.output_dir);

    Ok(())
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn print_summary(report: &BatchReport, output_dir: &Path) {
    println!(
        "{} Processed {} files in {:.1}s",
        style("✓").green(),
        report.total(),
        report.elapsed_ms as f64 / 1000.0
    );
    println!(
        "   {} succeeded, {} failed",
        style(report.succeeded()).green(),
        style(report.failed()).red()
    );

    match report.success_rate() {
        Some(rate) => println!("   Success rate: {:.1}%", rate * 100.0),
        None => println!("   Success rate: n/a (no PDF files found)"),
    }
    println!("   Results in {}", output_dir.display());

    let failed: Vec<_> = report.outcomes.iter().filter(|o| !o.is_success()).collect();
    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for outcome in failed {
            println!(
                "  - {}: {}",
                outcome.path.display(),
                outcome.error().unwrap_or("unknown error")
            );
        }
    }
}

fn write_summary(path: &Path, report: &BatchReport) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "filename",
        "status",
        "invoice_number",
        "date",
        "total_amount",
        "vendor_name",
        "processing_time_ms",
        "error",
    ])?;

    for outcome in &report.outcomes {
        let filename = file_name(&outcome.path);
        let elapsed = outcome.elapsed_ms.to_string();

        match &outcome.status {
            FileStatus::Succeeded(record) => {
                let total = record.total_amount.map(|t| t.to_string()).unwrap_or_default();
                wtr.write_record([
                    filename.as_str(),
                    "success",
                    record.invoice_number.as_deref().unwrap_or(""),
                    record.date.as_deref().unwrap_or(""),
                    total.as_str(),
                    record.vendor_name.as_deref().unwrap_or(""),
                    elapsed.as_str(),
                    "",
                ])?
            }
            FileStatus::Failed(message) => wtr.write_record([
                filename.as_str(),
                "error",
                "",
                "",
                "",
                "",
                elapsed.as_str(),
                message.as_str(),
            ])?,
        }
    }

    wtr.flush()?;
    debug!("Wrote {} summary rows", report.total());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use invex_core::{FileOutcome, InvoiceRecord};

    #[test]
    fn test_write_summary() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out/summary.csv");
        let record = InvoiceRecord {
            invoice_number: Some("INV-1".to_string()),
            total_amount: Some(12.5),
            ..InvoiceRecord::empty()
        };
        let report = BatchReport {
            outcomes: vec![
                FileOutcome {
                    path: PathBuf::from("/in/a.pdf"),
                    output_path: PathBuf::from("/out/a.json"),
                    status: FileStatus::Succeeded(record),
                    elapsed_ms: 7,
                },
                FileOutcome {
                    path: PathBuf::from("/in/b.pdf"),
                    output_path: PathBuf::from("/out/b.json"),
                    status: FileStatus::Failed("PDF parse error: bad".to_string()),
                    elapsed_ms: 3,
                },
            ],
            elapsed_ms: 10,
        };

        write_summary(&path, &report).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(
            lines[0],
            "filename,status,invoice_number,date,total_amount,vendor_name,processing_time_ms,error"
        );
        assert_eq!(lines[1], "a.pdf,success,INV-1,,12.5,,7,");
        assert_eq!(lines[2], "b.pdf,error,,,,,3,PDF parse error: bad");
    }
}
