//! OCR fallback for documents without enough embedded text.

mod document;
mod engine;
mod worker;

pub use document::{DocumentOcr, PageImageOcr};
pub use engine::{PureOcrEngine, load_document_ocr};
pub use worker::OcrWorker;

use image::DynamicImage;
use serde::{Deserialize, Serialize};

use crate::error::OcrError;

/// A recognized line of text with its coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrLine {
    /// Recognized text content.
    pub text: String,

    /// Recognition confidence score (0.0 - 1.0).
    pub confidence: f32,

    /// Bounding box coordinates (x1, y1, x2, y2, x3, y3, x4, y4) for quadrilateral.
    pub bbox: [f32; 8],

    /// Orientation the line was read at (0 or 180).
    pub angle: i32,
}

impl OcrLine {
    /// Line without geometry, mostly useful for tests and synthetic input.
    pub fn new(text: impl Into<String>, confidence: f32) -> Self {
        Self {
            text: text.into(),
            confidence,
            bbox: [0.0; 8],
            angle: 0,
        }
    }

    /// Get the axis-aligned bounding rectangle.
    pub fn rect(&self) -> (f32, f32, f32, f32) {
        let xs = [self.bbox[0], self.bbox[2], self.bbox[4], self.bbox[6]];
        let ys = [self.bbox[1], self.bbox[3], self.bbox[5], self.bbox[7]];

        let min_x = xs.iter().cloned().fold(f32::INFINITY, f32::min);
        let max_x = xs.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
        let min_y = ys.iter().cloned().fold(f32::INFINITY, f32::min);
        let max_y = ys.iter().cloned().fold(f32::NEG_INFINITY, f32::max);

        (min_x, min_y, max_x, max_y)
    }
}

/// OCR output for one PDF page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OcrPage {
    /// Page number (1-indexed).
    pub number: u32,

    /// Lines in reading order.
    pub lines: Vec<OcrLine>,
}

impl OcrPage {
    /// The page's lines joined by newlines.
    pub fn text(&self) -> String {
        self.lines
            .iter()
            .map(|l| l.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Recognizes text lines in a single image.
pub trait TextRecognizer: Send + Sync {
    /// Detect and recognize all lines in `image`.
    fn recognize(&self, image: &DynamicImage) -> Result<Vec<OcrLine>, OcrError>;

    /// Engine name for logs.
    fn name(&self) -> &str;
}

/// Sort lines top-to-bottom, then left-to-right within rows of ~20px.
pub fn sort_by_reading_order(lines: &mut [OcrLine]) {
    lines.sort_by(|a, b| {
        let (ax, ay, _, _) = a.rect();
        let (bx, by, _, _) = b.rect();

        let row_a = (ay / 20.0) as i32;
        let row_b = (by / 20.0) as i32;

        if row_a != row_b {
            row_a.cmp(&row_b)
        } else {
            ax.partial_cmp(&bx).unwrap_or(std::cmp::Ordering::Equal)
        }
    });
}

/// Mean confidence of `lines`, 0.0 when there are none.
pub fn mean_confidence(lines: &[OcrLine]) -> f32 {
    if lines.is_empty() {
        return 0.0;
    }
    lines.iter().map(|l| l.confidence).sum::<f32>() / lines.len() as f32
}
