//! Domain models for invoice-desk-service.

mod invoice;
mod payment;
mod relationship_manager;
mod report;

pub(crate) use invoice::check_amount;
pub use invoice::{
    AmountOutOfRange, AssignmentStatus, Invoice, InvoiceAmounts, InvoicePatch,
    ListInvoicesFilter, NewInvoice, PaymentMode, PaymentStatus, MAX_AMOUNT,
};
pub use payment::{status_for_balance, PaymentUpdate, RecordPayment};
pub use relationship_manager::{NewRelationshipManager, RelationshipManager, RmPatch};
pub use report::{
    AgingBuckets, DashboardStats, RmPerformance, RmPerformanceReport, RmSummary, RosterSummary,
};
