//! Rule-based invoice parser.

use std::time::Instant;

use rust_decimal::prelude::ToPrimitive;
use tracing::debug;

use crate::models::config::ExtractionConfig;
use crate::models::{InvoiceRecord, LineItem};

use super::rules::{
    DateExtractor, extract_invoice_date, extract_invoice_number, extract_line_items,
    extract_total_amount, extract_vendor_name,
};

/// Result of invoice extraction.
#[derive(Debug, Clone)]
pub struct ExtractionResult {
    /// Extracted invoice data.
    pub record: InvoiceRecord,
    /// Fields that could not be found.
    pub warnings: Vec<String>,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

/// Trait for invoice parsing.
pub trait InvoiceParser: Send + Sync {
    /// Parse invoice fields from text. Fields that cannot be found stay empty.
    fn parse(&self, text: &str) -> ExtractionResult;
}

/// Invoice parser built from the heuristics in [`super::rules`].
#[derive(Debug, Clone, Default)]
pub struct RuleBasedParser {
    /// Read ambiguous numeric dates as day-first.
    day_first: bool,
}

impl RuleBasedParser {
    /// Create a new parser with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self::new().with_day_first(config.day_first)
    }

    /// Set day-first reading of ambiguous dates.
    pub fn with_day_first(mut self, day_first: bool) -> Self {
        self.day_first = day_first;
        self
    }

    pub fn extract_invoice_number(&self, text: &str) -> Option<String> {
        extract_invoice_number(text).map(|m| m.value)
    }

    /// Issue date as `YYYY-MM-DD`.
    pub fn extract_date(&self, text: &str) -> Option<String> {
        let extractor = DateExtractor::new().with_day_first(self.day_first);
        extract_invoice_date(text, &extractor).map(|m| m.value.format("%Y-%m-%d").to_string())
    }

    pub fn extract_total_amount(&self, text: &str) -> Option<f64> {
        extract_total_amount(text).and_then(|m| m.value.to_f64())
    }

    pub fn extract_vendor_name(&self, text: &str) -> Option<String> {
        extract_vendor_name(text).map(|m| m.value)
    }

    pub fn extract_line_items(&self, text: &str) -> Vec<LineItem> {
        extract_line_items(text)
    }

    /// Run every field extractor over `text`.
    pub fn extract_structured_data(&self, text: &str) -> InvoiceRecord {
        InvoiceRecord {
            invoice_number: self.extract_invoice_number(text),
            date: self.extract_date(text),
            total_amount: self.extract_total_amount(text),
            vendor_name: self.extract_vendor_name(text),
            line_items: self.extract_line_items(text),
        }
    }
}

impl InvoiceParser for RuleBasedParser {
    fn parse(&self, text: &str) -> ExtractionResult {
        let start = Instant::now();
        let record = self.extract_structured_data(text);

        let mut warnings = Vec::new();
        if record.invoice_number.is_none() {
            warnings.push("Invoice number not found".to_string());
        }
        if record.date.is_none() {
            warnings.push("Invoice date not found".to_string());
        }
        if record.total_amount.is_none() {
            warnings.push("Total amount not found".to_string());
        }
        if record.vendor_name.is_none() {
            warnings.push("Vendor name not found".to_string());
        }
        if record.line_items.is_empty() {
            warnings.push("No line items found".to_string());
        }

        debug!(
            "Extracted {}/4 fields and {} line items",
            record.populated_fields(),
            record.line_items.len()
        );

        ExtractionResult {
            record,
            warnings,
            processing_time_ms: start.elapsed().as_millis() as u64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = "\
ACME Supplies Ltd
42 Industrial Way, Springfield
billing@acme.example

INVOICE

Invoice Number: INV-2024-0042
Invoice Date: 03/05/2024
Due Date: 04/04/2024

Bill To:
Globex Corporation
1 Corporate Plaza

Description              Qty   Unit Price     Amount
Steel brackets            10        $4.50     $45.00
Installation labour        3       $60.00    $180.00

Subtotal                                     $225.00
Tax (10%)                                     $22.50
Total Amount Due                             $247.50
";

    #[test]
    fn test_parse_basic_invoice() {
        let result = RuleBasedParser::new().parse(SAMPLE);
        let record = result.record;

        assert_eq!(record.invoice_number.as_deref(), Some("INV-2024-0042"));
        assert_eq!(record.date.as_deref(), Some("2024-03-05"));
        assert_eq!(record.total_amount, Some(247.5));
        assert_eq!(record.vendor_name.as_deref(), Some("ACME Supplies Ltd"));
        assert_eq!(
            record.line_items,
            vec![
                LineItem {
                    description: "Steel brackets".to_string(),
                    quantity: Some(10.0),
                    unit_price: Some(4.5),
                    amount: Some(45.0),
                },
                LineItem {
                    description: "Installation labour".to_string(),
                    quantity: Some(3.0),
                    unit_price: Some(60.0),
                    amount: Some(180.0),
                },
            ]
        );
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_day_first() {
        let parser = RuleBasedParser::from_config(&ExtractionConfig { day_first: true });
        assert_eq!(parser.extract_date(SAMPLE).as_deref(), Some("2024-05-03"));
    }

    #[test]
    fn test_empty_text() {
        let result = RuleBasedParser::new().parse("");
        assert_eq!(result.record, InvoiceRecord::empty());
        assert_eq!(result.warnings.len(), 5);
    }

    #[test]
    fn test_extreme_amounts_do_not_panic() {
        let text = "Description  Qty  Amount\nWidget  0.01  79228162514264337593543950335\nTotal 1.00";
        let result = RuleBasedParser::new().parse(text);

        assert_eq!(result.record.total_amount, Some(1.0));
        assert_eq!(result.record.line_items.len(), 1);
        assert_eq!(result.record.line_items[0].unit_price, None);
    }
}
