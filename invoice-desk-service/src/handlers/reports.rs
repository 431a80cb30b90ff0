//! Dashboard and reporting handlers. Everything is recomputed per request.

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::Utc;

use crate::{
    dtos::{InvoiceResponse, OverdueQuery},
    models::{AgingBuckets, DashboardStats, RmPerformanceReport},
    startup::AppState,
};

pub async fn dashboard_stats(State(state): State<AppState>) -> Json<DashboardStats> {
    Json(state.store.read().await.dashboard_stats())
}

pub async fn aging_report(State(state): State<AppState>) -> Json<AgingBuckets> {
    Json(state.store.read().await.aging_buckets_at(Utc::now()))
}

pub async fn rm_performance(State(state): State<AppState>) -> Json<RmPerformanceReport> {
    Json(state.store.read().await.rm_performance())
}

pub async fn overdue_report(
    State(state): State<AppState>,
    Query(query): Query<OverdueQuery>,
) -> Json<Vec<InvoiceResponse>> {
    let limit = query
        .limit
        .unwrap_or(state.config.store.overdue_report_limit);
    let invoices = state.store.read().await.overdue_invoices_at(Utc::now(), limit);

    Json(invoices.into_iter().map(InvoiceResponse::from).collect())
}
