//! Document-level OCR: page images in, recognized lines per page out.

use tracing::{debug, info};

use crate::error::{OcrError, PdfError};
use crate::pdf::{PdfExtractor, PdfProcessor};

use super::{OcrPage, TextRecognizer};

/// OCR over a whole PDF document.
pub trait DocumentOcr: Send + Sync {
    /// Recognize text on every page of `pdf`, pages in order.
    fn recognize_document(&self, pdf: &PdfExtractor) -> Result<Vec<OcrPage>, OcrError>;

    /// Engine name for logs.
    fn name(&self) -> &str;
}

/// Runs a [`TextRecognizer`] over the raster images placed on each page.
pub struct PageImageOcr<R: TextRecognizer> {
    recognizer: R,
    max_pages: usize,
    min_confidence: f32,
}

impl<R: TextRecognizer> PageImageOcr<R> {
    pub fn new(recognizer: R) -> Self {
        Self {
            recognizer,
            max_pages: 0,
            min_confidence: 0.0,
        }
    }

    /// Limit the number of pages recognized (0 = unlimited).
    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// Drop lines recognized below `min_confidence`.
    pub fn with_min_confidence(mut self, min_confidence: f32) -> Self {
        self.min_confidence = min_confidence;
        self
    }
}

impl<R: TextRecognizer> DocumentOcr for PageImageOcr<R> {
    fn recognize_document(&self, pdf: &PdfExtractor) -> Result<Vec<OcrPage>, OcrError> {
        let mut page_count = pdf.page_count();
        if self.max_pages > 0 {
            page_count = page_count.min(self.max_pages as u32);
        }

        let mut pages = Vec::with_capacity(page_count as usize);

        for number in 1..=page_count {
            let images = pdf
                .extract_images(number)
                .map_err(|e: PdfError| OcrError::InvalidImage(e.to_string()))?;

            if images.is_empty() {
                debug!("No raster content on page {}", number);
            }

            let mut lines = Vec::new();
            for image in &images {
                lines.extend(
                    self.recognizer
                        .recognize(image)?
                        .into_iter()
                        .filter(|line| line.confidence >= self.min_confidence),
                );
            }

            pages.push(OcrPage { number, lines });
        }

        info!(
            "{} recognized {} lines on {} pages",
            self.recognizer.name(),
            pages.iter().map(|p| p.lines.len()).sum::<usize>(),
            pages.len()
        );

        Ok(pages)
    }

    fn name(&self) -> &str {
        self.recognizer.name()
    }
}
