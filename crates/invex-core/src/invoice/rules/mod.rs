//! Rule-based field extractors for invoices.

pub mod amounts;
pub mod dates;
pub mod invoice_number;
pub mod line_items;
pub mod patterns;
pub mod vendor;

pub use amounts::{AmountExtractor, extract_total_amount, parse_amount};
pub use dates::{DateExtractor, extract_invoice_date};
pub use invoice_number::extract_invoice_number;
pub use line_items::extract_line_items;
pub use vendor::extract_vendor_name;

/// Trait for field extractors.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the field from text.
    fn extract(&self, text: &str) -> Option<Self::Output>;

    /// Extract all occurrences of the field.
    fn extract_all(&self, text: &str) -> Vec<Self::Output>;
}

/// Extraction context with confidence scores.
#[derive(Debug, Clone)]
pub struct ExtractionMatch<T> {
    /// Extracted value.
    pub value: T,
    /// Confidence score (0.0 - 1.0).
    pub confidence: f32,
    /// Position in source text.
    pub position: Option<(usize, usize)>,
    /// Source text that was matched.
    pub source: String,
}

impl<T> ExtractionMatch<T> {
    pub fn new(value: T, confidence: f32, source: impl Into<String>) -> Self {
        Self {
            value,
            confidence,
            position: None,
            source: source.into(),
        }
    }

    pub fn with_position(mut self, start: usize, end: usize) -> Self {
        self.position = Some((start, end));
        self
    }

    fn overlaps(&self, start: usize, end: usize) -> bool {
        self.position
            .map(|(s, e)| start < e && s < end)
            .unwrap_or(false)
    }
}

/// The rest of the line after `pos` plus the following non-empty line.
///
/// Extracted PDF text often puts a label and its value on separate lines.
pub(crate) fn value_window(text: &str, pos: usize) -> (&str, Option<&str>) {
    let rest = &text[pos..];
    let mut lines = rest.split('\n');
    let same_line = lines.next().unwrap_or("").trim();
    let next_line = lines.map(str::trim).find(|l| !l.is_empty());
    (same_line, next_line)
}
