//! Core domain types and logic.

pub mod align;
pub mod bar;
pub mod config;
pub mod config_validation;
pub mod engine;
pub mod error;
pub mod execution;
pub mod ledger;
pub mod metrics;
pub mod position;
pub mod signal;
