//! Single-document processing: embedded text, OCR fallback, field extraction.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use once_cell::sync::OnceCell;
use tracing::{debug, error, info};

use crate::error::{InvexError, Result};
use crate::invoice::{InvoiceParser, RuleBasedParser};
use crate::models::{ExtractorConfig, InvoiceRecord};
use crate::ocr::{DocumentOcr, OcrPage, load_document_ocr};
use crate::pdf::{PdfExtractor, PdfProcessor};

/// Whether embedded text is too short to trust and the document needs OCR.
///
/// Counts characters after trimming surrounding whitespace.
pub fn needs_ocr(text: &str, min_len: usize) -> bool {
    text.trim().chars().count() < min_len
}

/// Embedded text, a newline, then every OCR line in page and reading order.
pub fn combine_text(pdf_text: &str, ocr_pages: &[OcrPage]) -> String {
    let ocr_lines: Vec<&str> = ocr_pages
        .iter()
        .flat_map(|page| page.lines.iter().map(|line| line.text.as_str()))
        .collect();
    format!("{}\n{}", pdf_text, ocr_lines.join("\n"))
}

/// Turns PDF files into invoice records.
///
/// The OCR stage is built on first need and then shared by every document
/// processed through this extractor, including from concurrent workers.
pub struct InvoiceExtractor {
    config: ExtractorConfig,
    parser: RuleBasedParser,
    ocr: OnceCell<Arc<dyn DocumentOcr>>,
}

impl InvoiceExtractor {
    pub fn new(config: ExtractorConfig) -> Self {
        let parser = RuleBasedParser::from_config(&config.extraction);
        Self {
            config,
            parser,
            ocr: OnceCell::new(),
        }
    }

    /// Use `ocr` instead of loading the configured models.
    pub fn with_ocr(config: ExtractorConfig, ocr: Arc<dyn DocumentOcr>) -> Self {
        let extractor = Self::new(config);
        // A fresh cell is always empty
        let _ = extractor.ocr.set(ocr);
        extractor
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Whether an OCR stage has been loaded (or injected).
    pub fn ocr_loaded(&self) -> bool {
        self.ocr.get().is_some()
    }

    fn ocr(&self) -> Result<&Arc<dyn DocumentOcr>> {
        Ok(self.ocr.get_or_try_init(|| {
            info!("Loading OCR models from {}", self.config.models.model_dir.display());
            load_document_ocr(&self.config)
        })?)
    }

    /// Extract an invoice record from the PDF at `path`.
    pub fn process_pdf(&self, path: &Path) -> Result<InvoiceRecord> {
        self.process(path).inspect_err(|e| {
            error!("Failed to process {}: {}", path.display(), e);
        })
    }

    fn process(&self, path: &Path) -> Result<InvoiceRecord> {
        if !path.exists() {
            return Err(InvexError::NotFound(path.to_path_buf()));
        }

        let start = Instant::now();
        info!("Processing {}", path.display());

        let data = std::fs::read(path)?;
        let pdf = PdfExtractor::from_bytes(&data)?;
        let mut text = pdf.extract_text()?;

        let embedded_chars = text.trim().chars().count();
        if needs_ocr(&text, self.config.pdf.min_text_length) {
            info!(
                "{} has {} chars of embedded text, running OCR",
                path.display(),
                embedded_chars
            );
            let ocr = self.ocr()?;
            let pages = ocr.recognize_document(&pdf)?;
            text = combine_text(&text, &pages);
        } else {
            debug!("Using {} chars of embedded text", embedded_chars);
        }

        let result = self.parser.parse(&text);
        for warning in &result.warnings {
            debug!("{}: {}", path.display(), warning);
        }

        info!(
            "Processed {} in {}ms ({}/4 fields)",
            path.display(),
            start.elapsed().as_millis(),
            result.record.populated_fields()
        );

        Ok(result.record)
    }
}
