//! Logging and trace export setup.

pub mod logging;

pub use logging::init_tracing;
