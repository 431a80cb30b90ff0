//! Payment update records.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{PaymentMode, PaymentStatus};

/// One recorded payment against an invoice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentUpdate {
    pub id: String,
    pub invoice_id: String,
    pub payment_reference: String,
    pub amount_paid: Decimal,
    pub payment_date: DateTime<Utc>,
    pub balance_amount: Decimal,
    pub payment_mode: PaymentMode,
    pub updated_by: String,
    pub created_at: DateTime<Utc>,
}

/// Input for recording a payment.
#[derive(Debug, Clone)]
pub struct RecordPayment {
    pub payment_reference: String,
    /// Cumulative amount paid so far on the invoice.
    pub amount_paid: Decimal,
    pub payment_date: DateTime<Utc>,
    pub payment_mode: PaymentMode,
    pub updated_by: String,
}

/// Status implied by a balance: settled, partly settled, or untouched.
pub fn status_for_balance(amount_paid: Decimal, balance: Decimal) -> PaymentStatus {
    if balance <= Decimal::ZERO {
        PaymentStatus::Paid
    } else if amount_paid > Decimal::ZERO {
        PaymentStatus::PartiallyPaid
    } else {
        PaymentStatus::Unpaid
    }
}
