//! Common regex patterns for invoice field extraction.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Invoice number patterns
    pub static ref INVOICE_NUMBER: Regex = Regex::new(
        r"(?i)\b(?:invoice|inv)\.?[ \t]*(?:number|num\b\.?|no\b\.?|#|id\b)[ \t]*[:#.]?[ \t]*([A-Z0-9][A-Z0-9/_.\-]*)"
    ).unwrap();

    pub static ref INVOICE_NUMBER_LABEL: Regex = Regex::new(
        r"(?i)\b(?:invoice|inv)\.?[ \t]*(?:number|num\b\.?|no\b\.?|#|id\b)[ \t]*[:#.]?"
    ).unwrap();

    pub static ref INVOICE_NUMBER_COLON: Regex = Regex::new(
        r"(?i)\binvoice[ \t]*:[ \t]*([A-Z0-9][A-Z0-9/_.\-]*)"
    ).unwrap();

    pub static ref INVOICE_NUMBER_STANDALONE: Regex = Regex::new(
        r"(?i)\b(INV[\-/]?\d[A-Z0-9/\-]*)"
    ).unwrap();

    // Date patterns
    pub static ref DATE_ISO: Regex = Regex::new(
        r"\b(\d{4})[./\-](\d{1,2})[./\-](\d{1,2})\b"
    ).unwrap();

    pub static ref DATE_NUMERIC: Regex = Regex::new(
        r"\b(\d{1,2})[./\-](\d{1,2})[./\-](\d{4}|\d{2})\b"
    ).unwrap();

    pub static ref DATE_MONTH_FIRST: Regex = Regex::new(
        r"(?i)\b(jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\.?[ \t]+(\d{1,2})(?:st|nd|rd|th)?,?[ \t]+(\d{4})\b"
    ).unwrap();

    pub static ref DATE_DAY_FIRST: Regex = Regex::new(
        r"(?i)\b(\d{1,2})(?:st|nd|rd|th)?[ \t\-]+(jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\.?[ \t\-,]+(\d{4})\b"
    ).unwrap();

    // Labeled dates
    pub static ref INVOICE_DATE_LABEL: Regex = Regex::new(
        r"(?i)\b(?:invoice\s+date|date\s+of\s+(?:issue|invoice)|issue\s+date|date\s+issued|billing\s+date)\b[ \t]*[:.]?"
    ).unwrap();

    pub static ref DATE_LABEL: Regex = Regex::new(
        r"(?i)\bdate\b[ \t]*[:.]?"
    ).unwrap();

    // Amounts (1,234.56 / 1.234,56 / 1234.56 / 1234)
    pub static ref AMOUNT: Regex = Regex::new(
        r"(?:[$€£¥][ \t]?)?(-?\d{1,3}(?:[,.\u{00a0}]\d{3})+(?:[.,]\d{1,2})?|-?\d+(?:[.,]\d{1,2})?)"
    ).unwrap();

    pub static ref AMOUNT_TOKEN: Regex = Regex::new(
        r"^(?:[$€£¥]|USD|EUR|GBP|CAD|AUD)?[ \t]?-?(?:\d{1,3}(?:[,.]\d{3})+(?:[.,]\d{1,2})?|\d+(?:[.,]\d{1,2})?)$"
    ).unwrap();

    // Totals
    pub static ref TOTAL_LABEL: Regex = Regex::new(
        r"(?i)\b(grand\s+total|total\s+amount\s+due|amount\s+due|balance\s+due|total\s+due|amount\s+payable|total\s+payable|invoice\s+total|total\s+amount|total)\b"
    ).unwrap();

    pub static ref SUBTOTAL: Regex = Regex::new(
        r"(?i)\bsub[\s\-]?total\b|\btotal\s+(?:tax|vat|gst|discount|qty|quantity|items?|weight|hours)\b"
    ).unwrap();

    // Vendor
    pub static ref VENDOR_LABEL: Regex = Regex::new(
        r"(?im)^[ \t]*(?:vendor|supplier|seller|from|sold\s+by|billed\s+by|issued\s+by|remit\s+to|company)(?:\s+name)?[ \t]*:[ \t]*(.*)$"
    ).unwrap();

    pub static ref RECIPIENT_SECTION: Regex = Regex::new(
        r"(?im)^[ \t]*(?:bill(?:ed)?\s+to|ship(?:ped)?\s+to|sold\s+to|customer|buyer|client)\b"
    ).unwrap();

    pub static ref DOCUMENT_TITLE: Regex = Regex::new(
        r"(?i)^(?:(?:tax|commercial|proforma|pro-forma)\s+)?(?:invoice|receipt|statement|bill|credit\s+note)\b|^page\s+\d+"
    ).unwrap();

    // Line item table
    pub static ref LINE_ITEM_HEADER_DESCRIPTION: Regex = Regex::new(
        r"(?i)\b(?:description|item|product|service|details)s?\b"
    ).unwrap();

    pub static ref LINE_ITEM_HEADER_NUMERIC: Regex = Regex::new(
        r"(?i)\b(?:qty|quantity|amount|price|rate|total|unit)\b"
    ).unwrap();

    pub static ref LINE_ITEMS_END: Regex = Regex::new(
        r"(?i)^\s*(?:sub[\s\-]?total|total|tax|vat|gst|amount\s+due|balance|notes?|terms|payment|thank\s+you)\b"
    ).unwrap();

    pub static ref COLUMN_SEPARATOR: Regex = Regex::new(
        r"\s*[|\t]\s*|\s{2,}"
    ).unwrap();

    // Email pattern
    pub static ref EMAIL: Regex = Regex::new(
        r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}"
    ).unwrap();

    // Phone pattern
    pub static ref PHONE: Regex = Regex::new(
        r"(?:\+\d{1,3}[\s\-]?)?\(?\d{3}\)?[\s\-.]?\d{3}[\s\-.]?\d{4}\b"
    ).unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_label_ignores_subtotal_word() {
        assert!(!TOTAL_LABEL.is_match("Subtotal 10.00"));
        assert!(SUBTOTAL.is_match("Sub Total 10.00"));
        assert!(SUBTOTAL.is_match("Total Tax 1.00"));
        assert!(TOTAL_LABEL.is_match("Grand Total: 12.00"));
    }

    #[test]
    fn test_amount_token() {
        assert!(AMOUNT_TOKEN.is_match("1,234.56"));
        assert!(AMOUNT_TOKEN.is_match("$20.00"));
        assert!(AMOUNT_TOKEN.is_match("3"));
        assert!(!AMOUNT_TOKEN.is_match("A4"));
        assert!(!AMOUNT_TOKEN.is_match("2024-01-15"));
    }

    #[test]
    fn test_document_title() {
        assert!(DOCUMENT_TITLE.is_match("INVOICE"));
        assert!(DOCUMENT_TITLE.is_match("Tax Invoice #12"));
        assert!(!DOCUMENT_TITLE.is_match("Invoicely Ltd"));
    }
}
