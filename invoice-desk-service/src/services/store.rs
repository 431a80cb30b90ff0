//! In-memory invoice and relationship manager store.
//!
//! The store owns both collections, the payment history and the round-robin
//! cursor. Invoices refer to RMs only by id plus a name snapshot taken at
//! assignment time.
//!
//! Round-robin fairness is best-effort: the cursor indexes into whichever set
//! of eligible RMs exists at call time, so an RM going on leave (or coming
//! back) shifts which RM the next assignment lands on. With an unchanging
//! eligible set of K RMs, every K consecutive assignments hit each RM once.

use chrono::{DateTime, Utc};
use service_core::error::AppError;
use thiserror::Error;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::models::{
    check_amount, status_for_balance, AgingBuckets, AmountOutOfRange, AssignmentStatus,
    DashboardStats, Invoice, InvoicePatch, ListInvoicesFilter, NewInvoice,
    NewRelationshipManager, PaymentUpdate, RecordPayment, RelationshipManager, RmPatch,
    RmPerformanceReport, RmSummary, RosterSummary,
};
use crate::services::reports;

/// Errors returned by store operations. Every failing call leaves the store
/// exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Invoice {0} not found")]
    InvoiceNotFound(String),

    #[error("Relationship manager {0} not found")]
    RmNotFound(String),

    #[error(transparent)]
    AmountOutOfRange(#[from] AmountOutOfRange),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::InvoiceNotFound(_) | StoreError::RmNotFound(_) => {
                AppError::NotFound(anyhow::Error::new(err))
            }
            StoreError::AmountOutOfRange(_) => AppError::BadRequest(anyhow::Error::new(err)),
        }
    }
}

fn generate_id(prefix: &str) -> String {
    format!("{}-{}", prefix, Uuid::new_v4().simple())
}

/// Single source of truth for invoices and relationship managers.
#[derive(Debug, Default)]
pub struct InvoiceStore {
    invoices: Vec<Invoice>,
    relationship_managers: Vec<RelationshipManager>,
    payments: Vec<PaymentUpdate>,
    rm_cursor: u64,
}

impl InvoiceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with the three demo RMs, all active.
    pub fn with_demo_roster() -> Self {
        let mut store = Self::new();
        for (name, email, phone) in [
            ("John Smith", "john.smith@company.com", "+1-555-0123"),
            ("Sarah Johnson", "sarah.johnson@company.com", "+1-555-0124"),
            ("Michael Brown", "michael.brown@company.com", "+1-555-0125"),
        ] {
            store.add_rm(NewRelationshipManager {
                name: name.to_string(),
                email: email.to_string(),
                phone: Some(phone.to_string()),
                is_active: true,
                is_on_leave: None,
            });
        }
        store
    }

    /// All invoices in creation order.
    pub fn invoices(&self) -> &[Invoice] {
        &self.invoices
    }

    /// All RMs in creation order.
    pub fn relationship_managers(&self) -> &[RelationshipManager] {
        &self.relationship_managers
    }

    /// Number of round-robin assignments made so far.
    pub fn rm_cursor(&self) -> u64 {
        self.rm_cursor
    }

    pub fn get_invoice(&self, id: &str) -> Result<&Invoice, StoreError> {
        self.invoices
            .iter()
            .find(|inv| inv.id == id)
            .ok_or_else(|| StoreError::InvoiceNotFound(id.to_string()))
    }

    pub fn get_rm(&self, id: &str) -> Result<&RelationshipManager, StoreError> {
        self.relationship_managers
            .iter()
            .find(|rm| rm.id == id)
            .ok_or_else(|| StoreError::RmNotFound(id.to_string()))
    }

    fn invoice_index(&self, id: &str) -> Result<usize, StoreError> {
        self.invoices
            .iter()
            .position(|inv| inv.id == id)
            .ok_or_else(|| StoreError::InvoiceNotFound(id.to_string()))
    }

    fn rm_index(&self, id: &str) -> Result<usize, StoreError> {
        self.relationship_managers
            .iter()
            .position(|rm| rm.id == id)
            .ok_or_else(|| StoreError::RmNotFound(id.to_string()))
    }

    /// RMs that are active and not on leave, in roster order. A snapshot,
    /// not a live view.
    pub fn active_rms(&self) -> Vec<RelationshipManager> {
        self.relationship_managers
            .iter()
            .filter(|rm| rm.is_eligible())
            .cloned()
            .collect()
    }

    /// Picks the next eligible RM round-robin and returns `invoice` stamped
    /// with that assignment. With no eligible RM the invoice comes back
    /// unchanged and the cursor does not move.
    pub fn assign_invoice_to_rm(&mut self, invoice: Invoice) -> Invoice {
        self.assign_invoice_to_rm_at(invoice, Utc::now())
    }

    fn assign_invoice_to_rm_at(&mut self, mut invoice: Invoice, now: DateTime<Utc>) -> Invoice {
        let eligible: Vec<usize> = self
            .relationship_managers
            .iter()
            .enumerate()
            .filter(|(_, rm)| rm.is_eligible())
            .map(|(idx, _)| idx)
            .collect();

        if eligible.is_empty() {
            warn!(
                invoice_id = %invoice.id,
                "No eligible relationship manager; invoice left unassigned"
            );
            return invoice;
        }

        let slot = (self.rm_cursor % eligible.len() as u64) as usize;
        self.rm_cursor += 1;

        let rm = &mut self.relationship_managers[eligible[slot]];
        rm.assigned_invoices += 1;

        invoice.assigned_rm = Some(rm.id.clone());
        invoice.assigned_rm_name = Some(rm.name.clone());
        invoice.assignment_timestamp = Some(now);
        invoice.assignment_status = Some(AssignmentStatus::Pending);

        info!(
            invoice_id = %invoice.id,
            rm_id = %rm.id,
            assigned_invoices = rm.assigned_invoices,
            "Invoice assigned"
        );

        invoice
    }

    /// Creates an invoice, assigns it round-robin and appends it. Amounts are
    /// validated before the cursor moves, so a rejected invoice changes nothing.
    #[instrument(skip(self, input), fields(customer_id = %input.customer_id))]
    pub fn add_invoice(&mut self, input: NewInvoice) -> Result<Invoice, StoreError> {
        let now = Utc::now();
        let invoice = input.into_invoice(generate_id("INV"), now)?;
        let invoice = self.assign_invoice_to_rm_at(invoice, now);

        info!(invoice_id = %invoice.id, total_amount = %invoice.total_amount, "Invoice created");

        self.invoices.push(invoice.clone());
        Ok(invoice)
    }

    /// Shallow-merges `patch` onto the invoice and bumps `updated_at`.
    #[instrument(skip(self, patch))]
    pub fn update_invoice(&mut self, id: &str, patch: InvoicePatch) -> Result<Invoice, StoreError> {
        let idx = self.invoice_index(id)?;
        let invoice = &mut self.invoices[idx];

        patch.apply(invoice)?;
        invoice.updated_at = Utc::now();

        Ok(invoice.clone())
    }

    /// Invoices matching `filter`, in creation order.
    pub fn list_invoices(&self, filter: &ListInvoicesFilter, now: DateTime<Utc>) -> Vec<Invoice> {
        self.invoices
            .iter()
            .filter(|inv| filter.matches(inv, now))
            .cloned()
            .collect()
    }

    #[instrument(skip(self, input), fields(name = %input.name))]
    pub fn add_rm(&mut self, input: NewRelationshipManager) -> RelationshipManager {
        let rm = input.into_rm(generate_id("RM"), Utc::now());
        info!(rm_id = %rm.id, "Relationship manager added");
        self.relationship_managers.push(rm.clone());
        rm
    }

    #[instrument(skip(self, patch))]
    pub fn update_rm(
        &mut self,
        id: &str,
        patch: RmPatch,
    ) -> Result<RelationshipManager, StoreError> {
        let idx = self.rm_index(id)?;
        let rm = &mut self.relationship_managers[idx];
        patch.apply(rm);
        Ok(rm.clone())
    }

    /// Moves an invoice to `new_rm_id`, bypassing the round-robin cursor.
    ///
    /// The previous assignee (if any) loses one from its counter and the new
    /// one gains one, so the counter total is unchanged when the invoice was
    /// already assigned.
    #[instrument(skip(self))]
    pub fn reassign_invoice(
        &mut self,
        invoice_id: &str,
        new_rm_id: &str,
    ) -> Result<Invoice, StoreError> {
        let new_idx = self.rm_index(new_rm_id)?;
        let inv_idx = self.invoice_index(invoice_id)?;
        let previous = self.invoices[inv_idx].assigned_rm.clone();

        if let Some(prev_idx) = previous.as_deref().and_then(|id| self.rm_index(id).ok()) {
            let prev = &mut self.relationship_managers[prev_idx];
            prev.assigned_invoices = prev.assigned_invoices.saturating_sub(1);
        }

        let rm = &mut self.relationship_managers[new_idx];
        rm.assigned_invoices += 1;
        let (rm_id, rm_name) = (rm.id.clone(), rm.name.clone());

        let now = Utc::now();
        let invoice = &mut self.invoices[inv_idx];
        invoice.assigned_rm = Some(rm_id);
        invoice.assigned_rm_name = Some(rm_name);
        invoice.assignment_timestamp = Some(now);
        invoice.assignment_status = Some(AssignmentStatus::Reassigned);
        invoice.updated_at = now;

        info!(
            previous_rm = previous.as_deref().unwrap_or("-"),
            "Invoice reassigned"
        );

        Ok(invoice.clone())
    }

    /// Records a payment, updates the invoice's payment fields and derives its
    /// payment status from the resulting balance.
    #[instrument(skip(self, input), fields(amount_paid = %input.amount_paid))]
    pub fn record_payment(
        &mut self,
        invoice_id: &str,
        input: RecordPayment,
    ) -> Result<PaymentUpdate, StoreError> {
        let idx = self.invoice_index(invoice_id)?;
        check_amount(input.amount_paid)?;
        let now = Utc::now();
        let invoice = &mut self.invoices[idx];

        let balance = invoice.total_amount - input.amount_paid;
        invoice.amount_paid = Some(input.amount_paid);
        invoice.balance_amount = Some(balance);
        invoice.payment_reference = Some(input.payment_reference.clone());
        invoice.payment_date = Some(input.payment_date);
        invoice.payment_mode = Some(input.payment_mode);
        invoice.payment_status = status_for_balance(input.amount_paid, balance);
        invoice.updated_at = now;

        let payment = PaymentUpdate {
            id: generate_id("PAY"),
            invoice_id: invoice.id.clone(),
            payment_reference: input.payment_reference,
            amount_paid: input.amount_paid,
            payment_date: input.payment_date,
            balance_amount: balance,
            payment_mode: input.payment_mode,
            updated_by: input.updated_by,
            created_at: now,
        };

        info!(
            payment_id = %payment.id,
            payment_status = invoice.payment_status.as_str(),
            balance = %balance,
            "Payment recorded"
        );

        self.payments.push(payment.clone());
        Ok(payment)
    }

    /// Payment history of one invoice, oldest first.
    pub fn payments_for(&self, invoice_id: &str) -> Result<Vec<PaymentUpdate>, StoreError> {
        self.get_invoice(invoice_id)?;
        Ok(self
            .payments
            .iter()
            .filter(|p| p.invoice_id == invoice_id)
            .cloned()
            .collect())
    }

    pub fn dashboard_stats(&self) -> DashboardStats {
        self.dashboard_stats_at(Utc::now())
    }

    pub fn dashboard_stats_at(&self, now: DateTime<Utc>) -> DashboardStats {
        reports::dashboard_stats(&self.invoices, now)
    }

    pub fn aging_buckets_at(&self, now: DateTime<Utc>) -> AgingBuckets {
        reports::aging_buckets(&self.invoices, now)
    }

    pub fn rm_performance(&self) -> RmPerformanceReport {
        reports::rm_performance(&self.relationship_managers, &self.invoices)
    }

    pub fn overdue_invoices_at(&self, now: DateTime<Utc>, limit: usize) -> Vec<Invoice> {
        reports::overdue_invoices(&self.invoices, now, limit)
    }

    pub fn rm_summary_at(&self, rm_id: &str, now: DateTime<Utc>) -> Result<RmSummary, StoreError> {
        let rm = self.get_rm(rm_id)?;
        Ok(reports::rm_summary(rm, &self.invoices, now))
    }

    pub fn roster_summary(&self) -> RosterSummary {
        reports::roster_summary(&self.relationship_managers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PaymentMode, PaymentStatus, MAX_AMOUNT};
    use chrono::Duration;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn new_rm(name: &str) -> NewRelationshipManager {
        NewRelationshipManager {
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            phone: None,
            is_active: true,
            is_on_leave: None,
        }
    }

    fn new_invoice(customer: &str, due_in_days: i64) -> NewInvoice {
        let now = Utc::now();
        NewInvoice::new(
            "CUST-1",
            customer,
            dec!(1000),
            dec!(18),
            now,
            now + Duration::days(due_in_days),
        )
    }

    fn counter_total(store: &InvoiceStore) -> u32 {
        store
            .relationship_managers()
            .iter()
            .map(|rm| rm.assigned_invoices)
            .sum()
    }

    #[test]
    fn round_robin_alternates_between_two_rms() {
        let mut store = InvoiceStore::new();
        let r1 = store.add_rm(new_rm("R1"));
        let r2 = store.add_rm(new_rm("R2"));

        let assignees: Vec<Option<String>> = (0..4)
            .map(|i| {
                store
                    .add_invoice(new_invoice(&format!("C{}", i), 30))
                    .unwrap()
                    .assigned_rm
            })
            .collect();

        assert_eq!(
            assignees,
            vec![
                Some(r1.id.clone()),
                Some(r2.id.clone()),
                Some(r1.id.clone()),
                Some(r2.id.clone()),
            ]
        );
        assert_eq!(store.get_rm(&r1.id).unwrap().assigned_invoices, 2);
        assert_eq!(store.get_rm(&r2.id).unwrap().assigned_invoices, 2);
    }

    #[test]
    fn fixed_roster_gets_equal_share() {
        let mut store = InvoiceStore::new();
        for name in ["A", "B", "C"] {
            store.add_rm(new_rm(name));
        }

        for i in 0..9 {
            store
                .add_invoice(new_invoice(&format!("C{}", i), 30))
                .unwrap();
        }

        assert!(store
            .relationship_managers()
            .iter()
            .all(|rm| rm.assigned_invoices == 3));
        assert_eq!(counter_total(&store), 9);
        assert_eq!(store.rm_cursor(), 9);
    }

    #[test]
    fn assignment_sets_pending_status_and_snapshot() {
        let mut store = InvoiceStore::new();
        let rm = store.add_rm(new_rm("Asha"));

        let invoice = store.add_invoice(new_invoice("Acme", 30)).unwrap();

        assert_eq!(invoice.assigned_rm_name.as_deref(), Some("Asha"));
        assert_eq!(invoice.assigned_rm.as_deref(), Some(rm.id.as_str()));
        assert_eq!(invoice.assignment_status, Some(AssignmentStatus::Pending));
        assert!(invoice.assignment_timestamp.is_some());
        assert_eq!(invoice.created_at, invoice.updated_at);
        assert_eq!(invoice.total_amount, dec!(1180));
        assert_eq!(invoice.amount(), dec!(1180));
    }

    #[test]
    fn no_eligible_rm_leaves_invoice_unassigned() {
        let mut store = InvoiceStore::new();
        let mut away = new_rm("Away");
        away.is_on_leave = Some(true);
        store.add_rm(away);
        let mut inactive = new_rm("Gone");
        inactive.is_active = false;
        store.add_rm(inactive);

        let invoice = store.add_invoice(new_invoice("Acme", 30)).unwrap();

        assert!(invoice.assigned_rm.is_none());
        assert!(invoice.assignment_status.is_none());
        assert_eq!(store.invoices().len(), 1);
        assert_eq!(store.rm_cursor(), 0);
        assert_eq!(counter_total(&store), 0);
    }

    #[test]
    fn active_rms_skip_leave_and_inactive_in_order() {
        let mut store = InvoiceStore::new();
        let a = store.add_rm(new_rm("A"));
        let b = store.add_rm(new_rm("B"));
        let c = store.add_rm(new_rm("C"));
        store
            .update_rm(
                &b.id,
                RmPatch {
                    is_on_leave: Some(Some(true)),
                    ..Default::default()
                },
            )
            .unwrap();

        let ids: Vec<String> = store.active_rms().into_iter().map(|rm| rm.id).collect();
        assert_eq!(ids, vec![a.id, c.id]);
        assert_eq!(store.active_rms(), store.active_rms());
    }

    #[test]
    fn cursor_indexes_into_current_eligible_set() {
        let mut store = InvoiceStore::new();
        let a = store.add_rm(new_rm("A"));
        let b = store.add_rm(new_rm("B"));
        let c = store.add_rm(new_rm("C"));

        // cursor 0 -> A
        let x = store.add_invoice(new_invoice("X", 1)).unwrap();
        assert_eq!(x.assigned_rm, Some(a.id.clone()));

        store
            .update_rm(
                &b.id,
                RmPatch {
                    is_on_leave: Some(Some(true)),
                    ..Default::default()
                },
            )
            .unwrap();

        // cursor 1 over [A, C] -> C
        let y = store.add_invoice(new_invoice("Y", 1)).unwrap();
        assert_eq!(y.assigned_rm, Some(c.id.clone()));
        // cursor 2 over [A, C] -> A
        let z = store.add_invoice(new_invoice("Z", 1)).unwrap();
        assert_eq!(z.assigned_rm, Some(a.id));
    }

    #[test]
    fn invoice_ids_are_unique() {
        let mut store = InvoiceStore::with_demo_roster();
        let first = store.add_invoice(new_invoice("A", 1)).unwrap();
        let second = store.add_invoice(new_invoice("B", 1)).unwrap();
        assert_ne!(first.id, second.id);
        assert!(first.id.starts_with("INV-"));
    }

    #[test]
    fn demo_roster_has_three_active_rms() {
        let store = InvoiceStore::with_demo_roster();
        assert_eq!(store.active_rms().len(), 3);
        assert_eq!(store.relationship_managers()[0].name, "John Smith");
    }

    #[test]
    fn update_invoice_merges_and_bumps_updated_at() {
        let mut store = InvoiceStore::with_demo_roster();
        let invoice = store.add_invoice(new_invoice("Acme", 30)).unwrap();

        let updated = store
            .update_invoice(
                &invoice.id,
                InvoicePatch {
                    remarks: Some(Some("Called customer".to_string())),
                    follow_up_initiated: Some(true),
                    payment_status: Some(PaymentStatus::PartiallyPaid),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(updated.remarks.as_deref(), Some("Called customer"));
        assert!(updated.follow_up_initiated);
        assert_eq!(updated.payment_status, PaymentStatus::PartiallyPaid);
        assert_eq!(updated.customer_name, "Acme");
        assert!(updated.updated_at >= invoice.updated_at);
        assert_eq!(store.get_invoice(&invoice.id).unwrap(), &updated);
    }

    #[test]
    fn later_remark_replaces_earlier() {
        let mut store = InvoiceStore::new();
        let invoice = store.add_invoice(new_invoice("Acme", 30)).unwrap();
        for remark in ["first", "second"] {
            store
                .update_invoice(
                    &invoice.id,
                    InvoicePatch {
                        remarks: Some(Some(remark.to_string())),
                        ..Default::default()
                    },
                )
                .unwrap();
        }
        assert_eq!(
            store.get_invoice(&invoice.id).unwrap().remarks.as_deref(),
            Some("second")
        );
    }

    #[test]
    fn unknown_ids_are_reported() {
        let mut store = InvoiceStore::with_demo_roster();

        assert_eq!(
            store.update_invoice("INV-missing", InvoicePatch::default()),
            Err(StoreError::InvoiceNotFound("INV-missing".to_string()))
        );
        assert_eq!(
            store.update_rm("RM-missing", RmPatch::default()),
            Err(StoreError::RmNotFound("RM-missing".to_string()))
        );
    }

    #[test]
    fn reassign_shifts_one_unit_between_rms() {
        let mut store = InvoiceStore::new();
        let r1 = store.add_rm(new_rm("R1"));
        let r2 = store.add_rm(new_rm("R2"));
        let invoices: Vec<Invoice> = (0..4)
            .map(|i| {
                store
                    .add_invoice(new_invoice(&format!("C{}", i), 30))
                    .unwrap()
            })
            .collect();
        let cursor_before = store.rm_cursor();

        let moved = store.reassign_invoice(&invoices[0].id, &r2.id).unwrap();

        assert_eq!(store.get_rm(&r1.id).unwrap().assigned_invoices, 1);
        assert_eq!(store.get_rm(&r2.id).unwrap().assigned_invoices, 3);
        assert_eq!(counter_total(&store), 4);
        assert_eq!(moved.assignment_status, Some(AssignmentStatus::Reassigned));
        assert_eq!(moved.assigned_rm.as_deref(), Some(r2.id.as_str()));
        assert_eq!(moved.assigned_rm_name.as_deref(), Some("R2"));
        assert_eq!(store.rm_cursor(), cursor_before);
    }

    #[test]
    fn reassign_unassigned_invoice_only_increments_target() {
        let mut store = InvoiceStore::new();
        let invoice = store.add_invoice(new_invoice("Acme", 30)).unwrap();
        let rm = store.add_rm(new_rm("Late"));

        store.reassign_invoice(&invoice.id, &rm.id).unwrap();

        assert_eq!(store.get_rm(&rm.id).unwrap().assigned_invoices, 1);
    }

    #[test]
    fn failed_reassign_changes_nothing() {
        let mut store = InvoiceStore::new();
        let r1 = store.add_rm(new_rm("R1"));
        let invoice = store.add_invoice(new_invoice("Acme", 30)).unwrap();

        assert_eq!(
            store.reassign_invoice(&invoice.id, "RM-missing"),
            Err(StoreError::RmNotFound("RM-missing".to_string()))
        );
        assert_eq!(
            store.reassign_invoice("INV-missing", &r1.id),
            Err(StoreError::InvoiceNotFound("INV-missing".to_string()))
        );
        assert_eq!(store.get_rm(&r1.id).unwrap().assigned_invoices, 1);
        assert_eq!(
            store.get_invoice(&invoice.id).unwrap().assignment_status,
            Some(AssignmentStatus::Pending)
        );
    }

    #[test]
    fn partial_payment_then_full_payment() {
        let mut store = InvoiceStore::with_demo_roster();
        let invoice = store.add_invoice(new_invoice("Acme", 30)).unwrap();

        let first = store
            .record_payment(
                &invoice.id,
                RecordPayment {
                    payment_reference: "UTR-1".to_string(),
                    amount_paid: dec!(500),
                    payment_date: Utc::now(),
                    payment_mode: PaymentMode::Upi,
                    updated_by: "ops".to_string(),
                },
            )
            .unwrap();
        assert_eq!(first.balance_amount, dec!(680));
        assert_eq!(
            store.get_invoice(&invoice.id).unwrap().payment_status,
            PaymentStatus::PartiallyPaid
        );

        store
            .record_payment(
                &invoice.id,
                RecordPayment {
                    payment_reference: "UTR-2".to_string(),
                    amount_paid: dec!(1180),
                    payment_date: Utc::now(),
                    payment_mode: PaymentMode::BankTransfer,
                    updated_by: "ops".to_string(),
                },
            )
            .unwrap();

        let paid = store.get_invoice(&invoice.id).unwrap();
        assert_eq!(paid.payment_status, PaymentStatus::Paid);
        assert_eq!(paid.balance_amount, Some(Decimal::ZERO));
        assert_eq!(paid.payment_mode, Some(PaymentMode::BankTransfer));

        let history = store.payments_for(&invoice.id).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].payment_reference, "UTR-1");
    }

    #[test]
    fn payments_for_unknown_invoice_is_not_found() {
        let store = InvoiceStore::new();
        assert!(matches!(
            store.payments_for("INV-x"),
            Err(StoreError::InvoiceNotFound(_))
        ));
    }

    #[test]
    fn stats_follow_store_contents() {
        let mut store = InvoiceStore::with_demo_roster();
        let overdue = store.add_invoice(new_invoice("Late Co", -1)).unwrap();
        store.add_invoice(new_invoice("Future Co", 10)).unwrap();

        let stats = store.dashboard_stats();
        assert_eq!(stats.total_invoices, 2);
        assert_eq!(stats.total_amount, dec!(2360));
        assert_eq!(stats.overdue_invoices, 1);
        assert_eq!(stats.assigned_today, 2);

        store
            .update_invoice(
                &overdue.id,
                InvoicePatch {
                    payment_status: Some(PaymentStatus::Paid),
                    ..Default::default()
                },
            )
            .unwrap();

        let stats = store.dashboard_stats();
        assert_eq!(stats.overdue_invoices, 0);
        assert_eq!(stats.paid_amount, dec!(1180));
        assert_eq!(stats.pending_amount, dec!(1180));
    }

    #[test]
    fn list_filters_by_rm_and_status() {
        let mut store = InvoiceStore::new();
        let r1 = store.add_rm(new_rm("R1"));
        store.add_rm(new_rm("R2"));
        let a = store.add_invoice(new_invoice("Alpha", 5)).unwrap();
        store.add_invoice(new_invoice("Beta", 5)).unwrap();
        store.add_invoice(new_invoice("Gamma", -5)).unwrap();

        let mine = store.list_invoices(
            &ListInvoicesFilter {
                assigned_rm: Some(r1.id.clone()),
                ..Default::default()
            },
            Utc::now(),
        );
        assert_eq!(mine.len(), 2);
        assert_eq!(mine[0].id, a.id);

        let overdue = store.list_invoices(
            &ListInvoicesFilter {
                overdue_only: true,
                ..Default::default()
            },
            Utc::now(),
        );
        assert_eq!(overdue.len(), 1);
        assert_eq!(overdue[0].customer_name, "Gamma");

        let paid = store.list_invoices(
            &ListInvoicesFilter {
                payment_status: Some(PaymentStatus::Paid),
                ..Default::default()
            },
            Utc::now(),
        );
        assert!(paid.is_empty());
    }

    #[test]
    fn oversized_invoice_is_rejected_without_side_effects() {
        let mut store = InvoiceStore::new();
        store.add_rm(new_rm("R1"));
        // 5 * 10^28 fits in a Decimal but not once GST is applied.
        let whale = Decimal::from_i128_with_scale(50_000_000_000_000_000_000_000_000_000, 0);
        let mut huge = new_invoice("Whale Corp", 30);
        huge.unit_amount = whale;

        assert_eq!(
            store.add_invoice(huge),
            Err(StoreError::AmountOutOfRange(AmountOutOfRange))
        );
        assert!(store.invoices().is_empty());
        assert_eq!(store.rm_cursor(), 0);
        assert_eq!(counter_total(&store), 0);
    }

    #[test]
    fn stats_survive_invoices_at_the_maximum() {
        let mut store = InvoiceStore::new();
        for name in ["Big A", "Big B"] {
            let mut input = new_invoice(name, -3);
            input.unit_amount = MAX_AMOUNT;
            input.gst_percent = Decimal::ZERO;
            store.add_invoice(input).unwrap();
        }

        let stats = store.dashboard_stats();
        assert_eq!(stats.total_amount, MAX_AMOUNT * dec!(2));
        assert_eq!(stats.pending_amount, MAX_AMOUNT * dec!(2));
        assert_eq!(stats.overdue_invoices, 2);
    }

    #[test]
    fn oversized_patch_and_payment_are_rejected() {
        let mut store = InvoiceStore::new();
        let invoice = store.add_invoice(new_invoice("Acme", 30)).unwrap();

        let patched = store.update_invoice(
            &invoice.id,
            InvoicePatch {
                unit_amount: Some(Decimal::MAX),
                ..Default::default()
            },
        );
        assert_eq!(
            patched,
            Err(StoreError::AmountOutOfRange(AmountOutOfRange))
        );

        let paid = store.record_payment(
            &invoice.id,
            RecordPayment {
                payment_reference: "UTR-9".to_string(),
                amount_paid: Decimal::MAX,
                payment_date: Utc::now(),
                payment_mode: PaymentMode::Gateway,
                updated_by: "ops".to_string(),
            },
        );
        assert!(matches!(paid, Err(StoreError::AmountOutOfRange(_))));

        assert_eq!(store.get_invoice(&invoice.id).unwrap(), &invoice);
        assert!(store.payments_for(&invoice.id).unwrap().is_empty());
    }

    #[test]
    fn amount_errors_map_to_bad_request() {
        use axum::http::StatusCode;

        let not_found = AppError::from(StoreError::InvoiceNotFound("INV-x".to_string()));
        let too_large = AppError::from(StoreError::AmountOutOfRange(AmountOutOfRange));

        assert_eq!(not_found.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(too_large.status_code(), StatusCode::BAD_REQUEST);
    }
}
