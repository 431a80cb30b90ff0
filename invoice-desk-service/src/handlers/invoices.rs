//! Invoice handlers: creation with auto-assignment, updates, reassignment
//! and payment recording.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use service_core::error::AppError;
use validator::Validate;

use crate::{
    dtos::{
        CreateInvoiceRequest, InvoiceListQuery, InvoiceResponse, PaymentResponse,
        ReassignInvoiceRequest, RecordPaymentRequest, UpdateInvoiceRequest,
    },
    models::ListInvoicesFilter,
    services::metrics,
    startup::AppState,
};

/// Create an invoice and assign it to the next eligible RM.
#[tracing::instrument(skip(state, payload), fields(customer_name = %payload.customer_name))]
pub async fn create_invoice(
    State(state): State<AppState>,
    Json(payload): Json<CreateInvoiceRequest>,
) -> Result<(StatusCode, Json<InvoiceResponse>), AppError> {
    payload.validate()?;

    let new_invoice = payload.into_new_invoice(Utc::now());
    let invoice = state.store.write().await.add_invoice(new_invoice)?;

    metrics::record_invoice_created(invoice.assigned_rm.as_deref());

    Ok((StatusCode::CREATED, Json(InvoiceResponse::from(invoice))))
}

pub async fn list_invoices(
    State(state): State<AppState>,
    Query(query): Query<InvoiceListQuery>,
) -> Result<Json<Vec<InvoiceResponse>>, AppError> {
    let filter = ListInvoicesFilter::from(query);
    let invoices = state.store.read().await.list_invoices(&filter, Utc::now());

    Ok(Json(invoices.into_iter().map(InvoiceResponse::from).collect()))
}

pub async fn get_invoice(
    State(state): State<AppState>,
    Path(invoice_id): Path<String>,
) -> Result<Json<InvoiceResponse>, AppError> {
    let invoice = state.store.read().await.get_invoice(&invoice_id)?.clone();
    Ok(Json(InvoiceResponse::from(invoice)))
}

#[tracing::instrument(skip(state, payload))]
pub async fn update_invoice(
    State(state): State<AppState>,
    Path(invoice_id): Path<String>,
    Json(payload): Json<UpdateInvoiceRequest>,
) -> Result<Json<InvoiceResponse>, AppError> {
    payload.validate()?;

    let invoice = state
        .store
        .write()
        .await
        .update_invoice(&invoice_id, payload.into())?;

    tracing::info!(invoice_id = %invoice.id, "Invoice updated");

    Ok(Json(InvoiceResponse::from(invoice)))
}

/// Move an invoice to a specific RM, outside the round-robin rotation.
#[tracing::instrument(skip(state, payload), fields(rm_id = %payload.rm_id))]
pub async fn reassign_invoice(
    State(state): State<AppState>,
    Path(invoice_id): Path<String>,
    Json(payload): Json<ReassignInvoiceRequest>,
) -> Result<Json<InvoiceResponse>, AppError> {
    payload.validate()?;

    let invoice = state
        .store
        .write()
        .await
        .reassign_invoice(&invoice_id, &payload.rm_id)?;

    metrics::record_reassignment(&payload.rm_id);

    Ok(Json(InvoiceResponse::from(invoice)))
}

#[tracing::instrument(skip(state, payload))]
pub async fn record_payment(
    State(state): State<AppState>,
    Path(invoice_id): Path<String>,
    Json(payload): Json<RecordPaymentRequest>,
) -> Result<(StatusCode, Json<PaymentResponse>), AppError> {
    payload.validate()?;

    let payment = state
        .store
        .write()
        .await
        .record_payment(&invoice_id, payload.into_record(Utc::now()))?;

    metrics::record_payment(payment.payment_mode.as_str());

    Ok((StatusCode::CREATED, Json(PaymentResponse::from(payment))))
}

pub async fn list_payments(
    State(state): State<AppState>,
    Path(invoice_id): Path<String>,
) -> Result<Json<Vec<PaymentResponse>>, AppError> {
    let payments = state.store.read().await.payments_for(&invoice_id)?;
    Ok(Json(payments.into_iter().map(PaymentResponse::from).collect()))
}
