//! Request and response bodies for the invoice endpoints.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::models::{
    AssignmentStatus, Invoice, InvoicePatch, ListInvoicesFilter, NewInvoice, PaymentMode,
    PaymentStatus, PaymentUpdate, RecordPayment, MAX_AMOUNT,
};

fn bounded_amount(value: &Decimal) -> Result<(), ValidationError> {
    if *value <= MAX_AMOUNT {
        Ok(())
    } else {
        Err(ValidationError::new("amount_too_large"))
    }
}

fn positive_amount(value: &Decimal) -> Result<(), ValidationError> {
    if *value > Decimal::ZERO {
        bounded_amount(value)
    } else {
        Err(ValidationError::new("amount_must_be_positive"))
    }
}

fn non_negative_amount(value: &Decimal) -> Result<(), ValidationError> {
    if *value >= Decimal::ZERO {
        bounded_amount(value)
    } else {
        Err(ValidationError::new("amount_must_not_be_negative"))
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateInvoiceRequest {
    pub customer_id: Option<String>,
    #[validate(length(min = 1, message = "Customer name cannot be empty"))]
    pub customer_name: String,
    pub invoice_date: Option<DateTime<Utc>>,
    pub due_date: DateTime<Utc>,
    #[validate(custom(function = "positive_amount"))]
    pub unit_amount: Decimal,
    #[serde(default)]
    #[validate(custom(function = "non_negative_amount"))]
    pub gst_percent: Decimal,
    #[validate(custom(function = "non_negative_amount"))]
    pub gst_amount: Option<Decimal>,
    pub tax_details: Option<String>,
    pub project: Option<String>,
    pub business_unit: Option<String>,
    pub payment_status: Option<PaymentStatus>,
    #[serde(default)]
    pub follow_up_initiated: bool,
    pub remarks: Option<String>,
    pub payment_reference: Option<String>,
    #[validate(custom(function = "non_negative_amount"))]
    pub amount_paid: Option<Decimal>,
    pub payment_date: Option<DateTime<Utc>>,
    pub payment_mode: Option<PaymentMode>,
}

impl CreateInvoiceRequest {
    /// Fills presentation defaults: a generated customer id, today's invoice
    /// date and unpaid status.
    pub fn into_new_invoice(self, now: DateTime<Utc>) -> NewInvoice {
        NewInvoice {
            customer_id: self
                .customer_id
                .filter(|id| !id.is_empty())
                .unwrap_or_else(|| format!("CUST-{}", uuid::Uuid::new_v4().simple())),
            customer_name: self.customer_name,
            invoice_date: self.invoice_date.unwrap_or(now),
            due_date: self.due_date,
            unit_amount: self.unit_amount,
            gst_percent: self.gst_percent,
            gst_amount: self.gst_amount,
            tax_details: self.tax_details,
            project: self.project,
            business_unit: self.business_unit,
            payment_status: self.payment_status.unwrap_or(PaymentStatus::Unpaid),
            follow_up_initiated: self.follow_up_initiated,
            remarks: self.remarks,
            payment_reference: self.payment_reference,
            amount_paid: self.amount_paid,
            payment_date: self.payment_date,
            payment_mode: self.payment_mode,
        }
    }
}

/// Patch body. Unknown fields (including the assignee) are rejected. An
/// explicit `null` clears an optional field.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct UpdateInvoiceRequest {
    pub customer_id: Option<String>,
    #[validate(length(min = 1, message = "Customer name cannot be empty"))]
    pub customer_name: Option<String>,
    pub invoice_date: Option<DateTime<Utc>>,
    pub due_date: Option<DateTime<Utc>>,
    #[validate(custom(function = "positive_amount"))]
    pub unit_amount: Option<Decimal>,
    #[validate(custom(function = "non_negative_amount"))]
    pub gst_percent: Option<Decimal>,
    #[validate(custom(function = "non_negative_amount"))]
    pub gst_amount: Option<Decimal>,
    #[serde(default, deserialize_with = "super::nullable")]
    pub tax_details: Option<Option<String>>,
    #[serde(default, deserialize_with = "super::nullable")]
    pub project: Option<Option<String>>,
    #[serde(default, deserialize_with = "super::nullable")]
    pub business_unit: Option<Option<String>>,
    pub payment_status: Option<PaymentStatus>,
    pub assignment_status: Option<AssignmentStatus>,
    pub follow_up_initiated: Option<bool>,
    #[serde(default, deserialize_with = "super::nullable")]
    pub remarks: Option<Option<String>>,
    #[serde(default, deserialize_with = "super::nullable")]
    pub payment_reference: Option<Option<String>>,
    #[validate(custom(function = "non_negative_amount"))]
    pub amount_paid: Option<Decimal>,
    #[serde(default, deserialize_with = "super::nullable")]
    pub payment_date: Option<Option<DateTime<Utc>>>,
    #[serde(default, deserialize_with = "super::nullable")]
    pub payment_mode: Option<Option<PaymentMode>>,
}

impl From<UpdateInvoiceRequest> for InvoicePatch {
    fn from(req: UpdateInvoiceRequest) -> Self {
        InvoicePatch {
            customer_id: req.customer_id,
            customer_name: req.customer_name,
            invoice_date: req.invoice_date,
            due_date: req.due_date,
            unit_amount: req.unit_amount,
            gst_percent: req.gst_percent,
            gst_amount: req.gst_amount,
            tax_details: req.tax_details,
            project: req.project,
            business_unit: req.business_unit,
            payment_status: req.payment_status,
            assignment_status: req.assignment_status,
            follow_up_initiated: req.follow_up_initiated,
            remarks: req.remarks,
            payment_reference: req.payment_reference,
            amount_paid: req.amount_paid,
            payment_date: req.payment_date,
            payment_mode: req.payment_mode,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct ReassignInvoiceRequest {
    #[validate(length(min = 1, message = "rm_id cannot be empty"))]
    pub rm_id: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RecordPaymentRequest {
    #[validate(length(min = 1, message = "Payment reference cannot be empty"))]
    pub payment_reference: String,
    #[validate(custom(function = "non_negative_amount"))]
    pub amount_paid: Decimal,
    pub payment_date: Option<DateTime<Utc>>,
    pub payment_mode: PaymentMode,
    pub updated_by: Option<String>,
}

impl RecordPaymentRequest {
    pub fn into_record(self, now: DateTime<Utc>) -> RecordPayment {
        RecordPayment {
            payment_reference: self.payment_reference,
            amount_paid: self.amount_paid,
            payment_date: self.payment_date.unwrap_or(now),
            payment_mode: self.payment_mode,
            updated_by: self.updated_by.unwrap_or_else(|| "system".to_string()),
        }
    }
}

/// Query string for `GET /invoices`.
#[derive(Debug, Default, Deserialize)]
pub struct InvoiceListQuery {
    pub search: Option<String>,
    pub status: Option<PaymentStatus>,
    pub rm_id: Option<String>,
    #[serde(default)]
    pub overdue: bool,
}

impl From<InvoiceListQuery> for ListInvoicesFilter {
    fn from(query: InvoiceListQuery) -> Self {
        ListInvoicesFilter {
            search: query.search.filter(|s| !s.is_empty()),
            payment_status: query.status,
            assigned_rm: query.rm_id,
            overdue_only: query.overdue,
        }
    }
}

/// Query string for `GET /reports/overdue`.
#[derive(Debug, Default, Deserialize)]
pub struct OverdueQuery {
    pub limit: Option<usize>,
}

/// Invoice as returned over HTTP, with the legacy `amount` alias.
#[derive(Debug, Serialize)]
pub struct InvoiceResponse {
    #[serde(flatten)]
    pub invoice: Invoice,
    pub amount: Decimal,
}

impl From<Invoice> for InvoiceResponse {
    fn from(invoice: Invoice) -> Self {
        let amount = invoice.amount();
        Self { invoice, amount }
    }
}

#[derive(Debug, Serialize)]
pub struct PaymentResponse {
    #[serde(flatten)]
    pub payment: PaymentUpdate,
}

impl From<PaymentUpdate> for PaymentResponse {
    fn from(payment: PaymentUpdate) -> Self {
        Self { payment }
    }
}
