//! Prometheus metrics for invoice-desk-service.
//!
//! HTTP request metrics come from the `metrics` facade (see
//! `service_core::middleware::metrics`) rendered by the Prometheus recorder;
//! domain counters live in the default `prometheus` registry. `/metrics`
//! serves both.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::Lazy;
use prometheus::{register_int_counter_vec, IntCounterVec, TextEncoder};
use std::sync::OnceLock;

static METRICS_HANDLE: OnceLock<Option<PrometheusHandle>> = OnceLock::new();

/// Invoices created, by whether they were auto-assigned.
pub static INVOICES_CREATED_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "invoice_desk_invoices_created_total",
        "Total number of invoices created",
        &["outcome"] // assigned, unassigned
    )
    .expect("Failed to register invoices_created_total")
});

/// Round-robin assignments by RM.
pub static ASSIGNMENTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "invoice_desk_assignments_total",
        "Total number of round-robin assignments by relationship manager",
        &["rm_id"]
    )
    .expect("Failed to register assignments_total")
});

/// Manual reassignments by target RM.
pub static REASSIGNMENTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "invoice_desk_reassignments_total",
        "Total number of manual reassignments by target relationship manager",
        &["rm_id"]
    )
    .expect("Failed to register reassignments_total")
});

/// Recorded payments by mode.
pub static PAYMENTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "invoice_desk_payments_total",
        "Total number of recorded payments by payment mode",
        &["payment_mode"]
    )
    .expect("Failed to register payments_total")
});

/// Initialize all metrics. Safe to call more than once.
pub fn init_metrics() {
    METRICS_HANDLE.get_or_init(|| match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => Some(handle),
        Err(e) => {
            tracing::warn!(error = %e, "Prometheus recorder not installed");
            None
        }
    });

    Lazy::force(&INVOICES_CREATED_TOTAL);
    Lazy::force(&ASSIGNMENTS_TOTAL);
    Lazy::force(&REASSIGNMENTS_TOTAL);
    Lazy::force(&PAYMENTS_TOTAL);
}

pub fn record_invoice_created(assigned_rm: Option<&str>) {
    match assigned_rm {
        Some(rm_id) => {
            INVOICES_CREATED_TOTAL.with_label_values(&["assigned"]).inc();
            ASSIGNMENTS_TOTAL.with_label_values(&[rm_id]).inc();
        }
        None => INVOICES_CREATED_TOTAL.with_label_values(&["unassigned"]).inc(),
    }
}

pub fn record_reassignment(rm_id: &str) {
    REASSIGNMENTS_TOTAL.with_label_values(&[rm_id]).inc();
}

pub fn record_payment(payment_mode: &str) {
    PAYMENTS_TOTAL.with_label_values(&[payment_mode]).inc();
}

/// Get metrics in Prometheus text format.
pub fn get_metrics() -> String {
    let mut output = METRICS_HANDLE
        .get()
        .and_then(|handle| handle.as_ref())
        .map(|handle| handle.render())
        .unwrap_or_default();

    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    output.push_str(&encoder.encode_to_string(&metric_families).unwrap_or_default());
    output
}
