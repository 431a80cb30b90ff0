//! Application startup and lifecycle management.

use crate::config::InvoiceDeskConfig;
use crate::handlers::{self, invoices, reports, rms};
use crate::services::{init_metrics, InvoiceStore};
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::metrics::metrics_middleware;
use service_core::middleware::tracing::{make_request_span, request_id_middleware};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tower_http::trace::TraceLayer;

/// Shared application state.
///
/// The store sits behind one lock so every operation, including the
/// round-robin cursor advance, runs to completion before the next begins.
#[derive(Clone)]
pub struct AppState {
    pub config: InvoiceDeskConfig,
    pub store: Arc<RwLock<InvoiceStore>>,
}

impl AppState {
    pub fn new(config: InvoiceDeskConfig) -> Self {
        let store = if config.store.seed_demo_rms {
            InvoiceStore::with_demo_roster()
        } else {
            InvoiceStore::new()
        };

        Self {
            config,
            store: Arc::new(RwLock::new(store)),
        }
    }
}

/// Build the HTTP router for the given state.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/metrics", get(handlers::metrics_handler))
        .route(
            "/invoices",
            get(invoices::list_invoices).post(invoices::create_invoice),
        )
        .route(
            "/invoices/:id",
            get(invoices::get_invoice).patch(invoices::update_invoice),
        )
        .route("/invoices/:id/reassign", post(invoices::reassign_invoice))
        .route(
            "/invoices/:id/payments",
            get(invoices::list_payments).post(invoices::record_payment),
        )
        .route("/rms", get(rms::list_rms).post(rms::create_rm))
        .route("/rms/active", get(rms::list_active_rms))
        .route("/rms/roster", get(rms::roster_summary))
        .route("/rms/:id", get(rms::get_rm).patch(rms::update_rm))
        .route("/rms/:id/summary", get(rms::rm_summary))
        .route("/stats", get(reports::dashboard_stats))
        .route("/reports/aging", get(reports::aging_report))
        .route("/reports/rm-performance", get(reports::rm_performance))
        .route("/reports/overdue", get(reports::overdue_report))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
        .with_state(state)
}

/// Application container for managing server lifecycle.
pub struct Application {
    http_port: u16,
    http_listener: TcpListener,
    state: AppState,
}

impl Application {
    /// Build the application with the given configuration.
    pub async fn build(config: InvoiceDeskConfig) -> Result<Self, AppError> {
        init_metrics();

        let state = AppState::new(config.clone());

        if config.store.seed_demo_rms {
            let roster = state.store.read().await.roster_summary();
            tracing::info!(rms = roster.total, "Seeded demo relationship managers");
        }

        // Port 0 binds a random port (used by tests)
        let http_addr = config.common.socket_addr();
        let http_listener = TcpListener::bind(http_addr).await.map_err(|e| {
            tracing::error!(error = %e, addr = %http_addr, "Failed to bind HTTP listener");
            AppError::from(e)
        })?;
        let http_port = http_listener.local_addr()?.port();

        tracing::info!(http_port = http_port, "Invoice desk listener bound");

        Ok(Self {
            http_port,
            http_listener,
            state,
        })
    }

    /// Get the HTTP port the server is listening on.
    pub fn http_port(&self) -> u16 {
        self.http_port
    }

    /// Get the application state (shares the same store as the server).
    pub fn state(&self) -> AppState {
        self.state.clone()
    }

    /// Run the application until stopped.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        let app = router(self.state);
        axum::serve(self.http_listener, app).await.map_err(|e| {
            tracing::error!("HTTP server error: {}", e);
            std::io::Error::other(format!("HTTP server error: {}", e))
        })
    }
}
