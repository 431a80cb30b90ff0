//! Report queries over the invoice and RM collections.
//!
//! Every function here is pure: it takes the collections and the reference
//! time as input and builds a fresh value, so repeated calls without an
//! intervening mutation return identical results.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::models::{
    AgingBuckets, DashboardStats, Invoice, RelationshipManager, RmPerformance,
    RmPerformanceReport, RmSummary, RosterSummary,
};

fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

/// Saturates at `Decimal::MAX` instead of panicking on overflow.
fn sum_amounts<'a>(invoices: impl IntoIterator<Item = &'a Invoice>) -> Decimal {
    invoices
        .into_iter()
        .map(Invoice::amount)
        .fold(Decimal::ZERO, Decimal::saturating_add)
}

/// Dashboard headline numbers as of `now`.
pub fn dashboard_stats(invoices: &[Invoice], now: DateTime<Utc>) -> DashboardStats {
    let total_amount = sum_amounts(invoices);
    let paid_amount = sum_amounts(invoices.iter().filter(|inv| inv.is_paid()));
    let today = now.date_naive();

    DashboardStats {
        total_invoices: invoices.len(),
        total_amount,
        paid_amount,
        pending_amount: total_amount.saturating_sub(paid_amount),
        overdue_invoices: invoices.iter().filter(|inv| inv.is_overdue(now)).count(),
        assigned_today: invoices.iter().filter(|inv| inv.assigned_on(today)).count(),
    }
}

/// Buckets unpaid invoices by whole days past due. Anything less than a full
/// day past due counts as current.
pub fn aging_buckets(invoices: &[Invoice], now: DateTime<Utc>) -> AgingBuckets {
    invoices
        .iter()
        .filter(|inv| !inv.is_paid())
        .fold(AgingBuckets::default(), |mut buckets, inv| {
            match inv.days_past_due(now) {
                i64::MIN..=0 => buckets.current += 1,
                1..=30 => buckets.days_1_30 += 1,
                31..=60 => buckets.days_31_60 += 1,
                _ => buckets.days_over_60 += 1,
            }
            buckets
        })
}

/// Per-RM collection performance, best collection rate first. RMs with equal
/// rates keep roster order.
pub fn rm_performance(rms: &[RelationshipManager], invoices: &[Invoice]) -> RmPerformanceReport {
    let mut managers: Vec<RmPerformance> = rms
        .iter()
        .map(|rm| {
            let assigned: Vec<&Invoice> = invoices
                .iter()
                .filter(|inv| inv.is_assigned_to(&rm.id))
                .collect();
            let paid: Vec<&Invoice> = assigned
                .iter()
                .copied()
                .filter(|inv| inv.is_paid())
                .collect();

            RmPerformance {
                rm_id: rm.id.clone(),
                name: rm.name.clone(),
                total_invoices: assigned.len(),
                paid_invoices: paid.len(),
                collection_rate: percentage(paid.len(), assigned.len()),
                total_amount: sum_amounts(assigned.iter().copied()),
                collected_amount: sum_amounts(paid.iter().copied()),
            }
        })
        .collect();

    // sort_by is stable, which keeps roster order for ties.
    managers.sort_by(|a, b| b.collection_rate.total_cmp(&a.collection_rate));

    let paid_total = invoices.iter().filter(|inv| inv.is_paid()).count();

    RmPerformanceReport {
        overall_collection_rate: percentage(paid_total, invoices.len()),
        managers,
    }
}

/// Oldest overdue invoices first, at most `limit`.
pub fn overdue_invoices(invoices: &[Invoice], now: DateTime<Utc>, limit: usize) -> Vec<Invoice> {
    let mut overdue: Vec<Invoice> = invoices
        .iter()
        .filter(|inv| inv.is_overdue(now))
        .cloned()
        .collect();
    overdue.sort_by_key(|inv| inv.due_date);
    overdue.truncate(limit);
    overdue
}

/// Workload of one RM, judged by each invoice's current assignee.
pub fn rm_summary(rm: &RelationshipManager, invoices: &[Invoice], now: DateTime<Utc>) -> RmSummary {
    let assigned: Vec<&Invoice> = invoices
        .iter()
        .filter(|inv| inv.is_assigned_to(&rm.id))
        .collect();

    RmSummary {
        rm_id: rm.id.clone(),
        total_assigned: assigned.len(),
        total_amount: sum_amounts(assigned.iter().copied()),
        paid_invoices: assigned.iter().filter(|inv| inv.is_paid()).count(),
        overdue_invoices: assigned.iter().filter(|inv| inv.is_overdue(now)).count(),
    }
}

pub fn roster_summary(rms: &[RelationshipManager]) -> RosterSummary {
    RosterSummary {
        total: rms.len(),
        active: rms.iter().filter(|rm| rm.is_active).count(),
        inactive: rms.iter().filter(|rm| !rm.is_active).count(),
        on_leave: rms.iter().filter(|rm| rm.is_on_leave == Some(true)).count(),
        eligible: rms.iter().filter(|rm| rm.is_eligible()).count(),
    }
}
