//! Vendor (issuer) name extraction.

use super::patterns::{
    AMOUNT_TOKEN, DOCUMENT_TITLE, EMAIL, PHONE, RECIPIENT_SECTION, VENDOR_LABEL,
};
use super::{DateExtractor, ExtractionMatch, FieldExtractor, value_window};

const MAX_NAME_LEN: usize = 80;

/// Extract the vendor name.
///
/// An explicit "Vendor:/Supplier:/From:" label wins. Otherwise the vendor is
/// taken to be the first name-like line of the header, above any
/// "Bill To"/"Customer" block.
pub fn extract_vendor_name(text: &str) -> Option<ExtractionMatch<String>> {
    for caps in VENDOR_LABEL.captures_iter(text) {
        let value = caps[1].trim();
        let value = if value.is_empty() {
            let label_end = caps.get(0).unwrap().end();
            value_window(text, label_end).1.unwrap_or("")
        } else {
            value
        };

        if is_plausible_name(value) {
            return Some(ExtractionMatch::new(value.to_string(), 0.9, &caps[0]));
        }
    }

    let header = match RECIPIENT_SECTION.find(text) {
        Some(m) => &text[..m.start()],
        None => text,
    };

    header
        .lines()
        .map(str::trim)
        .find(|line| is_plausible_name(line))
        .map(|line| ExtractionMatch::new(line.to_string(), 0.5, line))
}

/// Whether `line` reads like a company name rather than a label or a
/// contact detail, title, date or number.
fn is_plausible_name(line: &str) -> bool {
    let len = line.chars().count();
    if !(2..=MAX_NAME_LEN).contains(&len) || line.contains(':') {
        return false;
    }

    let letters = line.chars().filter(|c| c.is_alphabetic()).count();
    let digits = line.chars().filter(|c| c.is_ascii_digit()).count();
    if letters == 0 || digits > letters {
        return false;
    }

    !(EMAIL.is_match(line)
        || PHONE.is_match(line)
        || DOCUMENT_TITLE.is_match(line)
        || AMOUNT_TOKEN.is_match(line)
        || DateExtractor::new().extract(line).is_some())
}
