//! Core domain types and logic.

pub mod analytics;
pub mod config_validation;
pub mod error;
pub mod market;
pub mod pipeline;
pub mod price;
pub mod signal;
pub mod trade;
pub mod universe;
