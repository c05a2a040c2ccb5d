//! The invoice record emitted for every processed document.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Structured invoice fields.
///
/// Every field is always serialized, so the JSON object carries exactly
/// `invoice_number`, `date`, `total_amount`, `vendor_name` and `line_items`
/// whether or not a value was found.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InvoiceRecord {
    /// Invoice number/identifier.
    pub invoice_number: Option<String>,

    /// Issue date as `YYYY-MM-DD`.
    pub date: Option<String>,

    /// Total amount payable.
    pub total_amount: Option<f64>,

    /// Issuing vendor.
    pub vendor_name: Option<String>,

    /// Line items in document order.
    pub line_items: Vec<LineItem>,
}

/// A single line item on the invoice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    /// Product/service description.
    pub description: String,

    /// Quantity.
    pub quantity: Option<f64>,

    /// Unit price.
    pub unit_price: Option<f64>,

    /// Line total.
    pub amount: Option<f64>,
}

impl InvoiceRecord {
    /// A record with no extracted fields.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of scalar fields that carry a value.
    pub fn populated_fields(&self) -> usize {
        [
            self.invoice_number.is_some(),
            self.date.is_some(),
            self.total_amount.is_some(),
            self.vendor_name.is_some(),
        ]
        .into_iter()
        .filter(|present| *present)
        .count()
    }

    /// Serialize with two-space indentation.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the record as indented JSON, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_json_pretty()?)?;
        Ok(())
    }
}
