//! Derived report values. None of these are stored; they are rebuilt from the
//! current collections on every request.

use rust_decimal::Decimal;
use serde::Serialize;

/// Headline numbers for the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardStats {
    pub total_invoices: usize,
    pub total_amount: Decimal,
    pub paid_amount: Decimal,
    pub pending_amount: Decimal,
    pub overdue_invoices: usize,
    pub assigned_today: usize,
}

/// Count of unpaid invoices per days-past-due range.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AgingBuckets {
    pub current: usize,
    #[serde(rename = "1-30")]
    pub days_1_30: usize,
    #[serde(rename = "31-60")]
    pub days_31_60: usize,
    #[serde(rename = "60+")]
    pub days_over_60: usize,
}

/// Collection performance of one relationship manager.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RmPerformance {
    pub rm_id: String,
    pub name: String,
    pub total_invoices: usize,
    pub paid_invoices: usize,
    /// Paid invoices as a percentage of assigned invoices.
    pub collection_rate: f64,
    pub total_amount: Decimal,
    pub collected_amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RmPerformanceReport {
    pub overall_collection_rate: f64,
    pub managers: Vec<RmPerformance>,
}

/// Workload of a single relationship manager.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RmSummary {
    pub rm_id: String,
    pub total_assigned: usize,
    pub total_amount: Decimal,
    pub paid_invoices: usize,
    pub overdue_invoices: usize,
}

/// Head counts across the relationship manager roster.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RosterSummary {
    pub total: usize,
    pub active: usize,
    pub inactive: usize,
    pub on_leave: usize,
    pub eligible: usize,
}
