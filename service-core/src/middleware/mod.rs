//! HTTP middleware shared by every service router.

pub mod metrics;
pub mod tracing;
