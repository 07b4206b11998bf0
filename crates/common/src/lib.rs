//! Common utilities and types shared across obsreport components.

#![warn(clippy::pedantic)]

/// Module for common error types
pub mod error;

/// Module for common data types (component identity, data kinds)
pub mod types;

/// Module for common telemetry configuration
pub mod config;
