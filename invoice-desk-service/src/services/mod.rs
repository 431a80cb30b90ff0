//! Services module for invoice-desk-service.

pub mod metrics;
pub mod reports;
pub mod store;

pub use metrics::{get_metrics, init_metrics};
pub use store::{InvoiceStore, StoreError};
