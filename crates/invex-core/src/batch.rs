//! Batch processing of a directory of PDF invoices.

use std::collections::HashSet;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use glob::{MatchOptions, Pattern};
use serde::{Deserialize, Serialize};
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::error::{InvexError, Result, panic_message};
use crate::models::InvoiceRecord;
use crate::models::config::BatchConfig;
use crate::pipeline::InvoiceExtractor;

/// What happened to one input file.
#[derive(Debug, Clone, PartialEq)]
pub enum FileStatus {
    Succeeded(InvoiceRecord),
    Failed(String),
}

/// Outcome of processing one file.
#[derive(Debug, Clone)]
pub struct FileOutcome {
    /// Input PDF.
    pub path: PathBuf,
    /// JSON written for this file (record or failure report).
    pub output_path: PathBuf,
    pub status: FileStatus,
    /// Wall time spent on this file.
    pub elapsed_ms: u64,
}

impl FileOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self.status, FileStatus::Succeeded(_))
    }

    pub fn record(&self) -> Option<&InvoiceRecord> {
        match &self.status {
            FileStatus::Succeeded(record) => Some(record),
            FileStatus::Failed(_) => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.status {
            FileStatus::Succeeded(_) => None,
            FileStatus::Failed(message) => Some(message),
        }
    }
}

/// JSON written in place of a record when a file fails.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureReport {
    pub source: String,
    pub error: String,
}

impl FailureReport {
    fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

/// Summary of a batch run. Outcomes are sorted by input path.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub outcomes: Vec<FileOutcome>,
    pub elapsed_ms: u64,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.total() - self.succeeded()
    }

    /// Succeeded / total, `None` when no files were processed.
    pub fn success_rate(&self) -> Option<f64> {
        if self.outcomes.is_empty() {
            None
        } else {
            Some(self.succeeded() as f64 / self.total() as f64)
        }
    }
}

/// Runs one [`InvoiceExtractor`] over every PDF in a directory.
pub struct BatchProcessor {
    extractor: Arc<InvoiceExtractor>,
    jobs: usize,
}

impl BatchProcessor {
    /// Worker count comes from the extractor's `batch.jobs` setting.
    pub fn new(extractor: Arc<InvoiceExtractor>) -> Self {
        let jobs = extractor.config().batch.effective_jobs();
        Self { extractor, jobs }
    }

    /// Set the number of files processed concurrently (0 = all CPUs).
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = BatchConfig { jobs }.effective_jobs();
        self
    }

    pub fn jobs(&self) -> usize {
        self.jobs
    }

    /// PDF files directly inside `dir`, matched case-insensitively, sorted.
    pub fn discover(dir: &Path) -> Result<Vec<PathBuf>> {
        if !dir.is_dir() {
            return Err(InvexError::NotFound(dir.to_path_buf()));
        }

        let pattern = format!("{}/*.pdf", Pattern::escape(&dir.to_string_lossy()));
        let options = MatchOptions {
            case_sensitive: false,
            ..MatchOptions::new()
        };

        let mut files: Vec<PathBuf> = glob::glob_with(&pattern, options)?
            .filter_map(|entry| match entry {
                Ok(path) => Some(path),
                Err(e) => {
                    warn!("Skipping unreadable entry: {}", e);
                    None
                }
            })
            .filter(|path| path.is_file())
            .collect();
        files.sort();

        Ok(files)
    }

    /// Process every PDF in `input_dir`, writing one JSON per file into
    /// `output_dir`.
    pub async fn run(&self, input_dir: &Path, output_dir: &Path) -> Result<BatchReport> {
        self.run_with_progress(input_dir, output_dir, |_| {}).await
    }

    /// Like [`run`](Self::run), calling `progress` as each file completes.
    pub async fn run_with_progress<F>(
        &self,
        input_dir: &Path,
        output_dir: &Path,
        progress: F,
    ) -> Result<BatchReport>
    where
        F: Fn(&FileOutcome) + Send + Sync,
    {
        let files = Self::discover(input_dir)?;
        info!("Found {} PDF files in {}", files.len(), input_dir.display());
        self.process_files(files, output_dir, progress).await
    }

    /// Process an already discovered list of files.
    ///
    /// Every input gets its own output file, see [`plan_outputs`].
    pub async fn process_files<F>(
        &self,
        files: Vec<PathBuf>,
        output_dir: &Path,
        progress: F,
    ) -> Result<BatchReport>
    where
        F: Fn(&FileOutcome) + Send + Sync,
    {
        let start = Instant::now();
        std::fs::create_dir_all(output_dir)?;

        info!("Processing {} PDF files with {} workers", files.len(), self.jobs);

        let outputs = plan_outputs(&files, output_dir);
        let mut outcomes = Vec::with_capacity(files.len());
        let mut join_set = JoinSet::new();
        let mut pending = files.into_iter().zip(outputs);

        loop {
            while join_set.len() < self.jobs {
                let Some((path, output_path)) = pending.next() else { break };
                let extractor = Arc::clone(&self.extractor);
                join_set.spawn_blocking(move || process_file(&extractor, path, output_path));
            }

            let Some(joined) = join_set.join_next().await else { break };
            match joined {
                Ok(outcome) => {
                    progress(&outcome);
                    outcomes.push(outcome);
                }
                // process_file catches panics, so only cancellation lands here
                Err(e) => error!("Batch worker failed: {}", e),
            }
        }

        outcomes.sort_by(|a, b| a.path.cmp(&b.path));
        let report = BatchReport {
            outcomes,
            elapsed_ms: start.elapsed().as_millis() as u64,
        };

        match report.success_rate() {
            Some(rate) => info!(
                "Batch complete: {}/{} succeeded ({:.1}%) in {}ms",
                report.succeeded(),
                report.total(),
                rate * 100.0,
                report.elapsed_ms
            ),
            None => info!("Batch complete: no PDF files to process"),
        }

        Ok(report)
    }
}

/// Output file for each of `files`, in the same order.
///
/// `<stem>.json` unless an earlier file already claimed that name (compared
/// case-insensitively), then `<file name>.json`, then `<stem>-<n>.json`.
pub fn plan_outputs(files: &[PathBuf], output_dir: &Path) -> Vec<PathBuf> {
    let mut claimed = HashSet::new();
    files
        .iter()
        .map(|path| {
            let stem = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "output".to_string());
            let file_name = path
                .file_name()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| stem.clone());
            output_dir.join(claim_name(&mut claimed, &stem, &file_name))
        })
        .collect()
}

fn claim_name(claimed: &mut HashSet<String>, stem: &str, file_name: &str) -> String {
    for candidate in [format!("{}.json", stem), format!("{}.json", file_name)] {
        if claimed.insert(candidate.to_lowercase()) {
            return candidate;
        }
    }

    let mut n = 2;
    loop {
        let candidate = format!("{}-{}.json", stem, n);
        if claimed.insert(candidate.to_lowercase()) {
            return candidate;
        }
        n += 1;
    }
}

fn process_file(extractor: &InvoiceExtractor, path: PathBuf, output_path: PathBuf) -> FileOutcome {
    let start = Instant::now();

    let mut status = match panic::catch_unwind(AssertUnwindSafe(|| extractor.process_pdf(&path))) {
        Ok(Ok(record)) => FileStatus::Succeeded(record),
        Ok(Err(e)) => FileStatus::Failed(e.to_string()),
        Err(payload) => {
            let message = format!("worker panicked: {}", panic_message(payload.as_ref()));
            error!("{}: {}", path.display(), message);
            FileStatus::Failed(message)
        }
    };

    let written = match &status {
        FileStatus::Succeeded(record) => record.save(&output_path),
        FileStatus::Failed(message) => FailureReport {
            source: path.display().to_string(),
            error: message.clone(),
        }
        .save(&output_path),
    };

    match written {
        Ok(()) => debug!("Wrote {}", output_path.display()),
        Err(e) => {
            let message = format!("failed to write {}: {}", output_path.display(), e);
            error!("{}", message);
            status = FileStatus::Failed(message);
        }
    }

    FileOutcome {
        path,
        output_path,
        status,
        elapsed_ms: start.elapsed().as_millis() as u64,
    }
}
