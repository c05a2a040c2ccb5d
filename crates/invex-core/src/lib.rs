//! Core library for PDF invoice extraction.
//!
//! This crate provides:
//! - PDF processing (embedded text and page image extraction)
//! - OCR fallback for scanned documents using PaddleOCR models
//! - Rule-based invoice field extraction (number, date, total, vendor, line items)
//! - Single-file and batch processing pipelines

pub mod batch;
pub mod error;
pub mod invoice;
pub mod models;
pub mod ocr;
pub mod pdf;
pub mod pipeline;

pub use batch::{BatchProcessor, BatchReport, FailureReport, FileOutcome, FileStatus};
pub use error::{InvexError, OcrError, PdfError, Result};
pub use invoice::{ExtractionResult, InvoiceParser, RuleBasedParser};
pub use models::{ExtractorConfig, InvoiceRecord, LineItem};
pub use ocr::{DocumentOcr, OcrLine, OcrPage, PageImageOcr, PureOcrEngine, TextRecognizer};
pub use pdf::{PdfExtractor, PdfProcessor};
pub use pipeline::{InvoiceExtractor, combine_text, needs_ocr};
