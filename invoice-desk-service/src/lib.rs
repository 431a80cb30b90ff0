//! Invoice Desk Service - invoice intake, round-robin relationship manager
//! assignment and collections reporting over an in-memory store.

pub mod config;
pub mod dtos;
pub mod handlers;
pub mod models;
pub mod services;
pub mod startup;
