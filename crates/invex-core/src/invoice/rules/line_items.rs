//! Line item table extraction.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use crate::models::LineItem;

use super::amounts::parse_amount;
use super::patterns::{
    AMOUNT_TOKEN, COLUMN_SEPARATOR, LINE_ITEM_HEADER_DESCRIPTION, LINE_ITEM_HEADER_NUMERIC,
    LINE_ITEMS_END,
};

/// Extract line items from the item table.
///
/// Rows are read after a header line naming both a description column and a
/// numeric column, up to the first subtotal/total/notes line. A row is kept
/// when it has a description with letters and at least one trailing number.
pub fn extract_line_items(text: &str) -> Vec<LineItem> {
    let mut items = Vec::new();
    let mut in_table = false;

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if is_header(line) {
            in_table = true;
            continue;
        }

        if !in_table {
            continue;
        }

        if LINE_ITEMS_END.is_match(line) {
            in_table = false;
            continue;
        }

        if let Some(item) = parse_row(line) {
            items.push(item);
        }
    }

    items
}

fn is_header(line: &str) -> bool {
    LINE_ITEM_HEADER_DESCRIPTION.is_match(line)
        && LINE_ITEM_HEADER_NUMERIC.is_match(line)
        && !line.chars().any(|c| c.is_ascii_digit())
}

fn parse_row(line: &str) -> Option<LineItem> {
    let mut tokens: Vec<&str> = COLUMN_SEPARATOR
        .split(line)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect();
    if tokens.len() == 1 {
        tokens = line.split_whitespace().collect();
    }

    let numeric_tail = tokens
        .iter()
        .rev()
        .take_while(|t| AMOUNT_TOKEN.is_match(t))
        .count()
        .min(3);
    if numeric_tail == 0 {
        return None;
    }

    let (mut description, numbers) = tokens.split_at(tokens.len() - numeric_tail);

    // Leading row number ("1", "2.")
    if description.len() > 1
        && description[0]
            .trim_end_matches('.')
            .chars()
            .all(|c| c.is_ascii_digit())
    {
        description = &description[1..];
    }

    let description = description.join(" ");
    if !description.chars().any(char::is_alphabetic) {
        return None;
    }

    let values: Vec<Decimal> = numbers.iter().filter_map(|t| parse_amount(t)).collect();
    let (quantity, unit_price, amount) = match values.as_slice() {
        [quantity, unit_price, amount] => (Some(*quantity), Some(*unit_price), Some(*amount)),
        [quantity, amount] => {
            // None for a zero quantity or a quotient beyond Decimal's range
            let unit_price = amount.checked_div(*quantity).map(|d| d.round_dp(2));
            (Some(*quantity), unit_price, Some(*amount))
        }
        [amount] => (None, None, Some(*amount)),
        _ => return None,
    };

    Some(LineItem {
        description,
        quantity: quantity.and_then(|d| d.to_f64()),
        unit_price: unit_price.and_then(|d| d.to_f64()),
        amount: amount.and_then(|d| d.to_f64()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn item(description: &str, quantity: Option<f64>, unit_price: Option<f64>, amount: f64) -> LineItem {
        LineItem {
            description: description.to_string(),
            quantity,
            unit_price,
            amount: Some(amount),
        }
    }

    #[test]
    fn test_column_table() {
        let text = "\
ACME Supplies
Description          Qty   Unit Price    Amount
Widget A               2       $10.00    $20.00
Consulting (hours)     3      $150.00   $450.00
Subtotal                                $470.00
Total                                   $470.00";

        assert_eq!(
            extract_line_items(text),
            vec![
                item("Widget A", Some(2.0), Some(10.0), 20.0),
                item("Consulting (hours)", Some(3.0), Some(150.0), 450.0),
            ]
        );
    }

    #[test]
    fn test_single_spaced_rows() {
        let text = "Item Qty Price Total\n1 Blue paint 4 12.50 50.00\n2. Brushes 25.00\nTax 6.00";

        assert_eq!(
            extract_line_items(text),
            vec![
                item("Blue paint", Some(4.0), Some(12.5), 50.0),
                item("Brushes", None, None, 25.0),
            ]
        );
    }

    #[test]
    fn test_quantity_and_amount_only() {
        let text = "Service | Hours | Amount\nDesign work | 4 | 300.00\n";
        assert_eq!(
            extract_line_items(text),
            vec![item("Design work", Some(4.0), Some(75.0), 300.0)]
        );
    }

    #[test]
    fn test_rows_without_numbers_are_skipped() {
        let text = "Description  Amount\nContinued from previous page\nHosting  99.00\nNotes: thanks";
        assert_eq!(extract_line_items(text), vec![item("Hosting", None, None, 99.0)]);
    }

    #[test]
    fn test_no_table() {
        assert!(extract_line_items("Widget 2 10.00 20.00\nTotal 20.00").is_empty());
    }

    #[test]
    fn test_unit_price_out_of_range() {
        let text = "Description  Qty  Amount\nWidget  0.01  79228162514264337593543950335\nFreebie  0  5.00\nTotal 1.00";
        let items = extract_line_items(text);

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].description, "Widget");
        assert_eq!(items[0].quantity, Some(0.01));
        assert_eq!(items[0].unit_price, None);
        assert!(items[0].amount.is_some());
        assert_eq!(items[1], item("Freebie", Some(0.0), None, 5.0));
    }
}
