//! Condition-based buyback pricing for used devices.
//!
//! The [`pricing`] module holds the calculator and its rule-store port; the
//! remaining modules carry the configuration, telemetry, and error plumbing
//! shared with the `buyback-api` service.

pub mod config;
pub mod error;
pub mod pricing;
pub mod telemetry;
