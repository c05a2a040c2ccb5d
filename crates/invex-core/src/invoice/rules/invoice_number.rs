//! Invoice number extraction.

use super::patterns::{
    INVOICE_NUMBER, INVOICE_NUMBER_COLON, INVOICE_NUMBER_LABEL, INVOICE_NUMBER_STANDALONE,
};
use super::{ExtractionMatch, value_window};

/// Extract the invoice number.
///
/// Tries "Invoice No./Number/#" labels (value on the same or the next line),
/// then "Invoice: X", then a bare `INV-...` token. Candidates without a digit
/// are words caught by a label, not identifiers.
pub fn extract_invoice_number(text: &str) -> Option<ExtractionMatch<String>> {
    for caps in INVOICE_NUMBER.captures_iter(text) {
        if let Some(number) = candidate(&caps[1]) {
            return Some(ExtractionMatch::new(number, 0.95, &caps[0]));
        }
    }

    for m in INVOICE_NUMBER_LABEL.find_iter(text) {
        let (same_line, next_line) = value_window(text, m.end());
        if !same_line.is_empty() {
            continue;
        }
        let token = next_line.and_then(|line| line.split_whitespace().next());
        if let Some(number) = token.and_then(candidate) {
            return Some(ExtractionMatch::new(number, 0.85, m.as_str()));
        }
    }

    for caps in INVOICE_NUMBER_COLON.captures_iter(text) {
        if let Some(number) = candidate(&caps[1]) {
            return Some(ExtractionMatch::new(number, 0.85, &caps[0]));
        }
    }

    INVOICE_NUMBER_STANDALONE
        .captures(text)
        .and_then(|caps| candidate(&caps[1]).map(|n| ExtractionMatch::new(n, 0.6, &caps[0])))
}

fn candidate(raw: &str) -> Option<String> {
    let trimmed = raw
        .trim()
        .trim_start_matches(['#', ':'])
        .trim_end_matches(['.', '-', '/', ',', ':']);
    if trimmed.chars().any(|c| c.is_ascii_digit()) {
        Some(trimmed.to_string())
    } else {
        None
    }
}
