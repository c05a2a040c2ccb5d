//! Data models: configuration and the invoice record.

pub mod config;
pub mod record;

pub use config::ExtractorConfig;
pub use record::{InvoiceRecord, LineItem};
