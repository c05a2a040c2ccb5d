//! Amount extraction for invoices.

use rust_decimal::Decimal;
use std::str::FromStr;

use super::patterns::{AMOUNT, SUBTOTAL, TOTAL_LABEL};
use super::{ExtractionMatch, FieldExtractor, value_window};

/// Amount field extractor.
pub struct AmountExtractor;

impl AmountExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for AmountExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for AmountExtractor {
    type Output = ExtractionMatch<Decimal>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let mut results = Vec::new();

        for caps in AMOUNT.captures_iter(text) {
            let full_match = caps.get(0).unwrap();
            // Percentages are rates, not money
            if text[full_match.end()..].trim_start().starts_with('%') {
                continue;
            }
            if let Some(amount) = parse_amount(&caps[1]) {
                results.push(
                    ExtractionMatch::new(amount, 0.8, full_match.as_str())
                        .with_position(full_match.start(), full_match.end()),
                );
            }
        }

        results
    }
}

/// Parse a formatted amount ("$1,234.56", "1.234,56", "1 234", "€ 99").
///
/// The last `.` or `,` is the decimal point when one or two digits follow it;
/// every other separator groups thousands.
pub fn parse_amount(s: &str) -> Option<Decimal> {
    let cleaned: String = s
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, ',' | '.' | '-'))
        .collect();

    if !cleaned.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }

    let normalized = match cleaned.rfind([',', '.']) {
        Some(pos) if (1..=2).contains(&(cleaned.len() - pos - 1)) => {
            let integer: String = cleaned[..pos].chars().filter(|c| !matches!(c, ',' | '.')).collect();
            format!("{}.{}", integer, &cleaned[pos + 1..])
        }
        _ => cleaned.replace([',', '.'], ""),
    };

    Decimal::from_str(&normalized).ok()
}

/// How strongly a total label identifies the amount payable.
fn label_priority(label: &str) -> u8 {
    let label = label.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase();
    match label.as_str() {
        "grand total" | "total amount due" | "amount due" | "balance due" | "total due"
        | "amount payable" | "total payable" => 3,
        "invoice total" | "total amount" => 2,
        _ => 1,
    }
}

/// Extract the invoice total.
///
/// Each "total"-style label (never a subtotal or tax total) is paired with the
/// last amount after it on the same line, or the amount opening the next line.
/// The strongest label wins; among equals the one furthest down the document.
pub fn extract_total_amount(text: &str) -> Option<ExtractionMatch<Decimal>> {
    let extractor = AmountExtractor::new();
    let excluded: Vec<(usize, usize)> = SUBTOTAL
        .find_iter(text)
        .map(|m| (m.start(), m.end()))
        .collect();

    let mut best: Option<(u8, ExtractionMatch<Decimal>)> = None;

    for caps in TOTAL_LABEL.captures_iter(text) {
        let label = caps.get(0).unwrap();
        if excluded.iter().any(|&(s, e)| label.start() < e && s < label.end()) {
            continue;
        }

        let (same_line, next_line) = value_window(text, label.end());
        let amount = extractor.extract_all(same_line).pop().or_else(|| {
            next_line
                .and_then(|line| extractor.extract(line))
                .filter(|m| m.position.is_some_and(|(start, _)| start == 0))
        });

        let Some(amount) = amount else { continue };

        let priority = label_priority(&caps[1]);
        if best.as_ref().is_none_or(|(p, _)| priority >= *p) {
            let found = ExtractionMatch::new(amount.value, 0.6 + 0.1 * priority as f32, label.as_str())
                .with_position(label.start(), label.end());
            best = Some((priority, found));
        }
    }

    best.map(|(_, found)| found)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("$1,234.56"), Some(dec("1234.56")));
        assert_eq!(parse_amount("1.234,56"), Some(dec("1234.56")));
        assert_eq!(parse_amount("1234,5"), Some(dec("1234.5")));
        assert_eq!(parse_amount("1,234"), Some(dec("1234")));
        assert_eq!(parse_amount("12 345 678.90"), Some(dec("12345678.90")));
        assert_eq!(parse_amount("€ 99"), Some(dec("99")));
        assert_eq!(parse_amount("-15.00"), Some(dec("-15.00")));
        assert_eq!(parse_amount("USD"), None);
    }

    #[test]
    fn test_extract_all_amounts() {
        let extractor = AmountExtractor::new();
        let results = extractor.extract_all("Price: $100.00, Tax 20%, Total: 1,234.56");
        let values: Vec<Decimal> = results.into_iter().map(|m| m.value).collect();
        assert_eq!(values, vec![dec("100.00"), dec("1234.56")]);
    }

    #[test]
    fn test_total_skips_subtotal_and_tax() {
        let text = "Subtotal: $1,000.00\nTotal Tax: $80.00\nTotal: $1,080.00\n";
        assert_eq!(extract_total_amount(text).unwrap().value, dec("1080.00"));
    }

    #[test]
    fn test_amount_due_beats_plain_total() {
        let text = "Total  $1,080.00\nPayments  -$80.00\nAmount Due  $1,000.00\nThank you";
        assert_eq!(extract_total_amount(text).unwrap().value, dec("1000.00"));
    }

    #[test]
    fn test_total_value_on_next_line() {
        let text = "Grand Total\n$ 2,500.00\nNotes";
        assert_eq!(extract_total_amount(text).unwrap().value, dec("2500.00"));
    }

    #[test]
    fn test_last_amount_on_total_line() {
        let text = "Total 3 items 45.00";
        assert_eq!(extract_total_amount(text).unwrap().value, dec("45.00"));
    }

    #[test]
    fn test_no_total() {
        assert!(extract_total_amount("Subtotal 10.00\nShipping 5.00").is_none());
        assert!(extract_total_amount("Total\nthanks").is_none());
    }
}
