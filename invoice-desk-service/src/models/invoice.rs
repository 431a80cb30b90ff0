//! Invoice model for invoice-desk-service.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Largest money amount the store accepts for any single value (10^15).
/// Sums over the store stay far below `Decimal::MAX` under this bound.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0xA4C6_8000, 0x0003_8D7E, 0, false, 0);

/// An amount, or a total derived from it, falls outside `±MAX_AMOUNT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Amount exceeds the supported maximum of 1000000000000000")]
pub struct AmountOutOfRange;

pub(crate) fn check_amount(value: Decimal) -> Result<Decimal, AmountOutOfRange> {
    if value.abs() <= MAX_AMOUNT {
        Ok(value)
    } else {
        Err(AmountOutOfRange)
    }
}

/// Payment status of an invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Unpaid,
    PartiallyPaid,
    Paid,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Unpaid => "unpaid",
            PaymentStatus::PartiallyPaid => "partially_paid",
            PaymentStatus::Paid => "paid",
        }
    }
}

/// How a payment was received.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMode {
    BankTransfer,
    Cheque,
    Upi,
    Gateway,
}

impl PaymentMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMode::BankTransfer => "bank_transfer",
            PaymentMode::Cheque => "cheque",
            PaymentMode::Upi => "upi",
            PaymentMode::Gateway => "gateway",
        }
    }
}

/// State of the invoice's RM assignment.
///
/// `Accepted` is only ever set from outside (via a patch); the store itself
/// produces `Pending` on round-robin assignment and `Reassigned` on override.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentStatus {
    Pending,
    Accepted,
    Reassigned,
}

/// GST amount and invoice total derived from the unit amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvoiceAmounts {
    pub unit_amount: Decimal,
    pub gst_percent: Decimal,
    pub gst_amount: Decimal,
    pub total_amount: Decimal,
}

impl InvoiceAmounts {
    /// Computes GST from the percentage (rounded to cents) unless an explicit
    /// amount is supplied. The total is always `unit_amount + gst_amount` and
    /// must itself stay within [`MAX_AMOUNT`].
    pub fn compute(
        unit_amount: Decimal,
        gst_percent: Decimal,
        gst_amount: Option<Decimal>,
    ) -> Result<Self, AmountOutOfRange> {
        let unit_amount = check_amount(unit_amount)?;
        let gst_amount = match gst_amount {
            Some(gst_amount) => check_amount(gst_amount)?,
            None => unit_amount
                .checked_mul(gst_percent)
                .and_then(|gst| gst.checked_div(Decimal::ONE_HUNDRED))
                .ok_or(AmountOutOfRange)?
                .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero),
        };
        let total_amount = unit_amount
            .checked_add(gst_amount)
            .ok_or(AmountOutOfRange)
            .and_then(check_amount)?;

        Ok(Self {
            unit_amount,
            gst_percent,
            gst_amount,
            total_amount,
        })
    }
}

/// Invoice record held by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: String,
    pub customer_id: String,
    pub customer_name: String,
    pub invoice_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub unit_amount: Decimal,
    pub gst_percent: Decimal,
    pub gst_amount: Decimal,
    pub total_amount: Decimal,
    pub tax_details: Option<String>,
    pub project: Option<String>,
    pub business_unit: Option<String>,
    pub payment_status: PaymentStatus,
    pub assigned_rm: Option<String>,
    pub assigned_rm_name: Option<String>,
    pub assignment_timestamp: Option<DateTime<Utc>>,
    pub assignment_status: Option<AssignmentStatus>,
    pub follow_up_initiated: bool,
    pub remarks: Option<String>,
    pub payment_reference: Option<String>,
    pub amount_paid: Option<Decimal>,
    pub payment_date: Option<DateTime<Utc>>,
    pub balance_amount: Option<Decimal>,
    pub payment_mode: Option<PaymentMode>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Invoice {
    /// Legacy alias for `total_amount`.
    pub fn amount(&self) -> Decimal {
        self.total_amount
    }

    pub fn is_paid(&self) -> bool {
        self.payment_status == PaymentStatus::Paid
    }

    /// Not paid and due strictly before `now`.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        !self.is_paid() && self.due_date < now
    }

    /// Whole days elapsed since the due date, floored. Negative when not yet due.
    pub fn days_past_due(&self, now: DateTime<Utc>) -> i64 {
        (now - self.due_date)
            .num_milliseconds()
            .div_euclid(MILLIS_PER_DAY)
    }

    /// Whether the current assignment happened on the given calendar day (UTC).
    pub fn assigned_on(&self, day: NaiveDate) -> bool {
        self.assignment_timestamp
            .is_some_and(|ts| ts.date_naive() == day)
    }

    pub fn is_assigned_to(&self, rm_id: &str) -> bool {
        self.assigned_rm.as_deref() == Some(rm_id)
    }

    fn amounts(&self) -> InvoiceAmounts {
        InvoiceAmounts {
            unit_amount: self.unit_amount,
            gst_percent: self.gst_percent,
            gst_amount: self.gst_amount,
            total_amount: self.total_amount,
        }
    }

    fn set_amounts(&mut self, amounts: InvoiceAmounts) {
        self.unit_amount = amounts.unit_amount;
        self.gst_percent = amounts.gst_percent;
        self.gst_amount = amounts.gst_amount;
        self.total_amount = amounts.total_amount;
    }

    /// Keeps `balance_amount == total_amount - amount_paid` when a paid
    /// amount is known.
    pub(crate) fn refresh_balance(&mut self) {
        self.balance_amount = self.amount_paid.map(|paid| self.total_amount - paid);
    }
}

/// Input for creating an invoice. Identity and timestamps are assigned by the store.
#[derive(Debug, Clone)]
pub struct NewInvoice {
    pub customer_id: String,
    pub customer_name: String,
    pub invoice_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub unit_amount: Decimal,
    pub gst_percent: Decimal,
    pub gst_amount: Option<Decimal>,
    pub tax_details: Option<String>,
    pub project: Option<String>,
    pub business_unit: Option<String>,
    pub payment_status: PaymentStatus,
    pub follow_up_initiated: bool,
    pub remarks: Option<String>,
    pub payment_reference: Option<String>,
    pub amount_paid: Option<Decimal>,
    pub payment_date: Option<DateTime<Utc>>,
    pub payment_mode: Option<PaymentMode>,
}

impl NewInvoice {
    /// Minimal unpaid invoice; remaining fields can be set on the returned value.
    pub fn new(
        customer_id: impl Into<String>,
        customer_name: impl Into<String>,
        unit_amount: Decimal,
        gst_percent: Decimal,
        invoice_date: DateTime<Utc>,
        due_date: DateTime<Utc>,
    ) -> Self {
        Self {
            customer_id: customer_id.into(),
            customer_name: customer_name.into(),
            invoice_date,
            due_date,
            unit_amount,
            gst_percent,
            gst_amount: None,
            tax_details: None,
            project: None,
            business_unit: None,
            payment_status: PaymentStatus::Unpaid,
            follow_up_initiated: false,
            remarks: None,
            payment_reference: None,
            amount_paid: None,
            payment_date: None,
            payment_mode: None,
        }
    }

    pub(crate) fn into_invoice(
        self,
        id: String,
        now: DateTime<Utc>,
    ) -> Result<Invoice, AmountOutOfRange> {
        let amounts = InvoiceAmounts::compute(self.unit_amount, self.gst_percent, self.gst_amount)?;
        let amount_paid = self.amount_paid.map(check_amount).transpose()?;

        let mut invoice = Invoice {
            id,
            customer_id: self.customer_id,
            customer_name: self.customer_name,
            invoice_date: self.invoice_date,
            due_date: self.due_date,
            unit_amount: amounts.unit_amount,
            gst_percent: amounts.gst_percent,
            gst_amount: amounts.gst_amount,
            total_amount: amounts.total_amount,
            tax_details: self.tax_details,
            project: self.project,
            business_unit: self.business_unit,
            payment_status: self.payment_status,
            assigned_rm: None,
            assigned_rm_name: None,
            assignment_timestamp: None,
            assignment_status: None,
            follow_up_initiated: self.follow_up_initiated,
            remarks: self.remarks,
            payment_reference: self.payment_reference,
            amount_paid,
            payment_date: self.payment_date,
            balance_amount: None,
            payment_mode: self.payment_mode,
            created_at: now,
            updated_at: now,
        };
        invoice.refresh_balance();
        Ok(invoice)
    }
}

/// Partial update for an invoice. `None` leaves the field untouched. The
/// optional invoice fields take `Some(None)` to clear the stored value.
/// `amount_paid` can be replaced but not cleared.
///
/// The assigned RM is absent: moving an invoice between RMs goes through
/// reassignment so the RM counters stay consistent.
#[derive(Debug, Clone, Default)]
pub struct InvoicePatch {
    pub customer_id: Option<String>,
    pub customer_name: Option<String>,
    pub invoice_date: Option<DateTime<Utc>>,
    pub due_date: Option<DateTime<Utc>>,
    pub unit_amount: Option<Decimal>,
    pub gst_percent: Option<Decimal>,
    pub gst_amount: Option<Decimal>,
    pub tax_details: Option<Option<String>>,
    pub project: Option<Option<String>>,
    pub business_unit: Option<Option<String>>,
    pub payment_status: Option<PaymentStatus>,
    pub assignment_status: Option<AssignmentStatus>,
    pub follow_up_initiated: Option<bool>,
    pub remarks: Option<Option<String>>,
    pub payment_reference: Option<Option<String>>,
    pub amount_paid: Option<Decimal>,
    pub payment_date: Option<Option<DateTime<Utc>>>,
    pub payment_mode: Option<Option<PaymentMode>>,
}

impl InvoicePatch {
    fn touches_amounts(&self) -> bool {
        self.unit_amount.is_some() || self.gst_percent.is_some() || self.gst_amount.is_some()
    }

    /// Shallow merge onto `invoice`. Derived totals and the balance are
    /// recomputed when their inputs change; payment status is never derived.
    /// Amounts are checked before anything is written, so an out-of-range
    /// patch leaves the invoice untouched.
    pub(crate) fn apply(self, invoice: &mut Invoice) -> Result<(), AmountOutOfRange> {
        let amounts = if self.touches_amounts() {
            let current = invoice.amounts();
            let unit_amount = self.unit_amount.unwrap_or(current.unit_amount);
            let gst_percent = self.gst_percent.unwrap_or(current.gst_percent);
            // A new base or rate without an explicit GST amount means recompute it.
            let gst_amount = self.gst_amount.or(
                if self.unit_amount.is_none() && self.gst_percent.is_none() {
                    Some(current.gst_amount)
                } else {
                    None
                },
            );
            Some(InvoiceAmounts::compute(unit_amount, gst_percent, gst_amount)?)
        } else {
            None
        };
        let amount_paid = self.amount_paid.map(check_amount).transpose()?;

        if let Some(amounts) = amounts {
            invoice.set_amounts(amounts);
        }
        if let Some(v) = self.customer_id {
            invoice.customer_id = v;
        }
        if let Some(v) = self.customer_name {
            invoice.customer_name = v;
        }
        if let Some(v) = self.invoice_date {
            invoice.invoice_date = v;
        }
        if let Some(v) = self.due_date {
            invoice.due_date = v;
        }
        if let Some(v) = self.tax_details {
            invoice.tax_details = v;
        }
        if let Some(v) = self.project {
            invoice.project = v;
        }
        if let Some(v) = self.business_unit {
            invoice.business_unit = v;
        }
        if let Some(v) = self.payment_status {
            invoice.payment_status = v;
        }
        if let Some(v) = self.assignment_status {
            invoice.assignment_status = Some(v);
        }
        if let Some(v) = self.follow_up_initiated {
            invoice.follow_up_initiated = v;
        }
        if let Some(v) = self.remarks {
            invoice.remarks = v;
        }
        if let Some(v) = self.payment_reference {
            invoice.payment_reference = v;
        }
        if let Some(v) = amount_paid {
            invoice.amount_paid = Some(v);
        }
        if let Some(v) = self.payment_date {
            invoice.payment_date = v;
        }
        if let Some(v) = self.payment_mode {
            invoice.payment_mode = v;
        }

        invoice.refresh_balance();
        Ok(())
    }
}

/// Filter parameters for listing invoices.
#[derive(Debug, Clone, Default)]
pub struct ListInvoicesFilter {
    /// Case-insensitive substring of the customer name or invoice id.
    pub search: Option<String>,
    pub payment_status: Option<PaymentStatus>,
    pub assigned_rm: Option<String>,
    pub overdue_only: bool,
}

impl ListInvoicesFilter {
    pub fn matches(&self, invoice: &Invoice, now: DateTime<Utc>) -> bool {
        let matches_search = self.search.as_deref().is_none_or(|term| {
            let term = term.to_lowercase();
            invoice.customer_name.to_lowercase().contains(&term)
                || invoice.id.to_lowercase().contains(&term)
        });
        let matches_status = self
            .payment_status
            .is_none_or(|status| invoice.payment_status == status);
        let matches_rm = self
            .assigned_rm
            .as_deref()
            .is_none_or(|rm_id| invoice.is_assigned_to(rm_id));
        let matches_overdue = !self.overdue_only || invoice.is_overdue(now);

        matches_search && matches_status && matches_rm && matches_overdue
    }
}
