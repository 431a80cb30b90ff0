//! Test helper module for invoice-desk-service integration tests.
//!
//! Each test spawns its own application on a random port with a fresh store.

#![allow(dead_code)]

use invoice_desk_service::config::{InvoiceDeskConfig, StoreConfig};
use invoice_desk_service::startup::{AppState, Application};
use reqwest::{Client, Response};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use service_core::config::Config as CoreConfig;
use std::net::{IpAddr, Ipv4Addr};

/// Test application wrapper for integration tests.
pub struct TestApp {
    pub http_address: String,
    pub http_port: u16,
    pub state: AppState,
    pub client: Client,
}

impl TestApp {
    /// Spawn an application with an empty roster.
    pub async fn spawn() -> Self {
        Self::spawn_with(false).await
    }

    /// Spawn an application seeded with the demo roster.
    pub async fn spawn_seeded() -> Self {
        Self::spawn_with(true).await
    }

    async fn spawn_with(seed_demo_rms: bool) -> Self {
        let config = InvoiceDeskConfig {
            common: CoreConfig {
                host: IpAddr::V4(Ipv4Addr::LOCALHOST),
                port: 0, // Random port
            },
            service_name: "invoice-desk-service".to_string(),
            service_version: "0.1.0".to_string(),
            log_level: "warn".to_string(),
            otlp_endpoint: None,
            store: StoreConfig {
                seed_demo_rms,
                overdue_report_limit: 10,
            },
        };

        let app = Application::build(config)
            .await
            .expect("Failed to build test application");

        let http_port = app.http_port();
        let http_address = format!("http://127.0.0.1:{}", http_port);
        let state = app.state();

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for HTTP server to be ready by polling health endpoint
        let client = Client::new();
        let health_url = format!("{}/health", http_address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        TestApp {
            http_address,
            http_port,
            state,
            client,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.http_address, path)
    }

    pub async fn get(&self, path: &str) -> Response {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn post(&self, path: &str, body: &Value) -> Response {
        self.client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn patch(&self, path: &str, body: &Value) -> Response {
        self.client
            .patch(self.url(path))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Create an RM and return its JSON representation.
    pub async fn create_rm(&self, name: &str) -> Value {
        let response = self
            .post(
                "/rms",
                &json!({
                    "name": name,
                    "email": format!("{}@company.com", name.to_lowercase().replace(' ', ".")),
                }),
            )
            .await;
        assert_eq!(response.status().as_u16(), 201);
        response.json().await.expect("Failed to parse RM")
    }

    /// Create an invoice due `due_in_days` from now and return its JSON.
    pub async fn create_invoice(&self, customer_name: &str, due_in_days: i64) -> Value {
        let response = self
            .post("/invoices", &invoice_body(customer_name, due_in_days))
            .await;
        assert_eq!(response.status().as_u16(), 201);
        response.json().await.expect("Failed to parse invoice")
    }
}

/// Request body for a 1000 + 18% GST invoice.
pub fn invoice_body(customer_name: &str, due_in_days: i64) -> Value {
    let due = chrono::Utc::now() + chrono::Duration::days(due_in_days);
    json!({
        "customer_name": customer_name,
        "due_date": due.to_rfc3339(),
        "unit_amount": 1000,
        "gst_percent": 18,
    })
}

/// Parse a decimal serialized as a JSON string.
pub fn decimal(value: &Value) -> Decimal {
    value
        .as_str()
        .expect("decimal should be serialized as a string")
        .parse()
        .expect("invalid decimal")
}
