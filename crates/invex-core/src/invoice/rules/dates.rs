//! Date extraction for invoices.

use chrono::NaiveDate;

use super::patterns::{
    DATE_DAY_FIRST, DATE_ISO, DATE_LABEL, DATE_MONTH_FIRST, DATE_NUMERIC, INVOICE_DATE_LABEL,
};
use super::{ExtractionMatch, FieldExtractor, value_window};

/// Words that turn a plain "Date" label into some other date.
const NON_ISSUE_DATE_WORDS: &[&str] = &[
    "due", "delivery", "ship", "shipping", "shipment", "order", "payment", "expiry",
    "expiration", "birth", "start", "end", "service", "period",
];

/// Date field extractor.
pub struct DateExtractor {
    day_first: bool,
}

impl DateExtractor {
    pub fn new() -> Self {
        Self { day_first: false }
    }

    /// Read ambiguous numeric dates (both parts ≤ 12) as day-first.
    pub fn with_day_first(mut self, day_first: bool) -> Self {
        self.day_first = day_first;
        self
    }

    fn numeric_day_month(&self, first: u32, second: u32) -> (u32, u32) {
        if first > 12 {
            (first, second)
        } else if second > 12 {
            (second, first)
        } else if self.day_first {
            (first, second)
        } else {
            (second, first)
        }
    }
}

impl Default for DateExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for DateExtractor {
    type Output = ExtractionMatch<NaiveDate>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    /// All dates in `text`, ordered by position.
    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let mut results: Vec<Self::Output> = Vec::new();

        let mut push = |date: Option<NaiveDate>, confidence: f32, m: regex::Match<'_>| {
            let Some(date) = date else { return };
            if results.iter().any(|r| r.overlaps(m.start(), m.end())) {
                return;
            }
            results.push(
                ExtractionMatch::new(date, confidence, m.as_str()).with_position(m.start(), m.end()),
            );
        };

        // YYYY-MM-DD first so its digits are not re-read as D/M/Y
        for caps in DATE_ISO.captures_iter(text) {
            let year: i32 = caps[1].parse().unwrap_or(0);
            let month: u32 = caps[2].parse().unwrap_or(0);
            let day: u32 = caps[3].parse().unwrap_or(0);
            push(NaiveDate::from_ymd_opt(year, month, day), 0.95, caps.get(0).unwrap());
        }

        for caps in DATE_MONTH_FIRST.captures_iter(text) {
            let month = month_from_name(&caps[1]);
            let day: u32 = caps[2].parse().unwrap_or(0);
            let year: i32 = caps[3].parse().unwrap_or(0);
            push(NaiveDate::from_ymd_opt(year, month, day), 0.95, caps.get(0).unwrap());
        }

        for caps in DATE_DAY_FIRST.captures_iter(text) {
            let day: u32 = caps[1].parse().unwrap_or(0);
            let month = month_from_name(&caps[2]);
            let year: i32 = caps[3].parse().unwrap_or(0);
            push(NaiveDate::from_ymd_opt(year, month, day), 0.95, caps.get(0).unwrap());
        }

        for caps in DATE_NUMERIC.captures_iter(text) {
            let first: u32 = caps[1].parse().unwrap_or(0);
            let second: u32 = caps[2].parse().unwrap_or(0);
            let year = parse_year(&caps[3]);
            let (day, month) = self.numeric_day_month(first, second);
            let ambiguous = first <= 12 && second <= 12 && first != second;
            let confidence = if ambiguous { 0.7 } else { 0.9 };
            push(NaiveDate::from_ymd_opt(year, month, day), confidence, caps.get(0).unwrap());
        }

        results.sort_by_key(|r| r.position.map(|(start, _)| start).unwrap_or(usize::MAX));
        results
    }
}

/// Extract the invoice (issue) date.
///
/// Explicit issue-date labels win, then a plain "Date" label that is not a
/// due/delivery/... date, then the first date anywhere in the text.
pub fn extract_invoice_date(text: &str, extractor: &DateExtractor) -> Option<ExtractionMatch<NaiveDate>> {
    let labeled = |label_end: usize| {
        let (same_line, next_line) = value_window(text, label_end);
        extractor
            .extract(same_line)
            .or_else(|| next_line.and_then(|line| extractor.extract(line)))
            .map(|m| ExtractionMatch::new(m.value, 0.95, m.source))
    };

    for m in INVOICE_DATE_LABEL.find_iter(text) {
        if let Some(found) = labeled(m.end()) {
            return Some(found);
        }
    }

    for m in DATE_LABEL.find_iter(text) {
        let preceding = text[..m.start()]
            .split_whitespace()
            .last()
            .unwrap_or("")
            .trim_matches(|c: char| !c.is_alphanumeric())
            .to_lowercase();
        let following = text[m.end()..]
            .split_whitespace()
            .next()
            .unwrap_or("")
            .to_lowercase();

        if NON_ISSUE_DATE_WORDS.contains(&preceding.as_str()) || following.starts_with("due") {
            continue;
        }

        if let Some(found) = labeled(m.end()) {
            return Some(found);
        }
    }

    extractor.extract(text)
}

fn parse_year(s: &str) -> i32 {
    let year: i32 = s.parse().unwrap_or(0);
    if year < 100 {
        // Two-digit year: assume 2000s for 00-50, 1900s for 51-99
        if year <= 50 { 2000 + year } else { 1900 + year }
    } else {
        year
    }
}

fn month_from_name(month: &str) -> u32 {
    match month.get(..3).map(|m| m.to_lowercase()).as_deref() {
        Some("jan") => 1,
        Some("feb") => 2,
        Some("mar") => 3,
        Some("apr") => 4,
        Some("may") => 5,
        Some("jun") => 6,
        Some("jul") => 7,
        Some("aug") => 8,
        Some("sep") => 9,
        Some("oct") => 10,
        Some("nov") => 11,
        Some("dec") => 12,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_extract_date_iso() {
        let extractor = DateExtractor::new();
        let result = extractor.extract("2024-01-15");
        assert_eq!(result.unwrap().value, ymd(2024, 1, 15));
    }

    #[test]
    fn test_extract_date_us_numeric() {
        let extractor = DateExtractor::new();
        assert_eq!(extractor.extract("03/04/2024").unwrap().value, ymd(2024, 3, 4));
        // Unambiguous day-first
        assert_eq!(extractor.extract("15.01.2024").unwrap().value, ymd(2024, 1, 15));
    }

    #[test]
    fn test_extract_date_day_first_option() {
        let extractor = DateExtractor::new().with_day_first(true);
        assert_eq!(extractor.extract("03/04/2024").unwrap().value, ymd(2024, 4, 3));
        assert_eq!(extractor.extract("12/31/2024").unwrap().value, ymd(2024, 12, 31));
    }

    #[test]
    fn test_extract_date_long_forms() {
        let extractor = DateExtractor::new();
        assert_eq!(extractor.extract("January 15, 2024").unwrap().value, ymd(2024, 1, 15));
        assert_eq!(extractor.extract("Sept. 3rd 2023").unwrap().value, ymd(2023, 9, 3));
        assert_eq!(extractor.extract("15 March 2024").unwrap().value, ymd(2024, 3, 15));
        assert_eq!(extractor.extract("05-Feb-2024").unwrap().value, ymd(2024, 2, 5));
    }

    #[test]
    fn test_two_digit_year() {
        let extractor = DateExtractor::new();
        assert_eq!(extractor.extract("15.01.24").unwrap().value, ymd(2024, 1, 15));
        assert_eq!(extractor.extract("15.01.99").unwrap().value, ymd(1999, 1, 15));
    }

    #[test]
    fn test_invalid_dates_skipped() {
        let extractor = DateExtractor::new();
        assert!(extractor.extract("2024-13-45").is_none());
        assert!(extractor.extract("no dates here").is_none());
    }

    #[test]
    fn test_extract_all_in_order() {
        let extractor = DateExtractor::new();
        let dates = extractor.extract_all("Due March 1, 2024 issued 2024-02-01");
        let values: Vec<NaiveDate> = dates.into_iter().map(|m| m.value).collect();
        assert_eq!(values, vec![ymd(2024, 3, 1), ymd(2024, 2, 1)]);
    }

    #[test]
    fn test_labeled_invoice_date_wins() {
        let text = "Due Date: 2024-02-14\nInvoice Date: 2024-01-15\n";
        let date = extract_invoice_date(text, &DateExtractor::new()).unwrap();
        assert_eq!(date.value, ymd(2024, 1, 15));
    }

    #[test]
    fn test_plain_date_label_skips_due_date() {
        let text = "Due Date: 02/14/2024\nDate: 01/15/2024\n";
        let date = extract_invoice_date(text, &DateExtractor::new()).unwrap();
        assert_eq!(date.value, ymd(2024, 1, 15));

        let text = "Date Due: 02/14/2024\nDate: 01/16/2024\n";
        let date = extract_invoice_date(text, &DateExtractor::new()).unwrap();
        assert_eq!(date.value, ymd(2024, 1, 16));
    }

    #[test]
    fn test_label_value_on_next_line() {
        let text = "Invoice Date\n\nMarch 5, 2024\n";
        let date = extract_invoice_date(text, &DateExtractor::new()).unwrap();
        assert_eq!(date.value, ymd(2024, 3, 5));
    }

    #[test]
    fn test_falls_back_to_first_date() {
        let text = "Acme Corp\nIssued 2024-06-01 in Springfield";
        let date = extract_invoice_date(text, &DateExtractor::new()).unwrap();
        assert_eq!(date.value, ymd(2024, 6, 1));
    }
}
