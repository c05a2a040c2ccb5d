//! Error types for the invex-core library.

use std::any::Any;
use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the invex library.
#[derive(Error, Debug)]
pub enum InvexError {
    /// The input file does not exist.
    #[error("PDF file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// OCR processing error.
    #[error("OCR error: {0}")]
    Ocr(#[from] OcrError),

    /// JSON serialization error.
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Invalid file discovery pattern.
    #[error("invalid file pattern: {0}")]
    Pattern(#[from] glob::PatternError),
}

impl InvexError {
    /// Whether this error means the input file was missing.
    pub fn is_not_found(&self) -> bool {
        matches!(self, InvexError::NotFound(_))
    }
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// Invalid page number requested.
    #[error("invalid page number: {0}")]
    InvalidPage(u32),

    /// An operation needed a document before one was loaded.
    #[error("no document loaded")]
    NotLoaded,
}

/// Errors related to OCR processing.
#[derive(Error, Debug)]
pub enum OcrError {
    /// Failed to load OCR models.
    #[error("failed to load model: {0}")]
    ModelLoad(String),

    /// A required model file is missing from the model directory.
    #[error("model file {file} not found in {}", .dir.display())]
    ModelsNotFound { dir: PathBuf, file: String },

    /// Text recognition failed.
    #[error("text recognition failed: {0}")]
    Recognition(String),

    /// Invalid image format or dimensions.
    #[error("invalid image: {0}")]
    InvalidImage(String),
}

/// Result type for the invex library.
pub type Result<T> = std::result::Result<T, InvexError>;

/// Text of a caught panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message() {
        let err = InvexError::NotFound(PathBuf::from("missing.pdf"));
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "PDF file not found: missing.pdf");
    }

    #[test]
    fn test_pdf_error_is_not_not_found() {
        let err: InvexError = PdfError::NoPages.into();
        assert!(!err.is_not_found());
        assert_eq!(err.to_string(), "PDF error: PDF has no pages");
    }

    #[test]
    fn test_panic_message() {
        let payload: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(payload.as_ref()), "boom");
        let payload: Box<dyn Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(payload.as_ref()), "bang");
        let payload: Box<dyn Any + Send> = Box::new(7u8);
        assert_eq!(panic_message(payload.as_ref()), "unknown panic");
    }
}
