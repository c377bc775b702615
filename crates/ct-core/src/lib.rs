//! Consultation triage core library.
//!
//! This crate provides the triage engine and the operations built on it,
//! including:
//! - Region classification and SLA urgency for consultation requests
//! - Partitioning, totals, and most-recent selection for the dashboard
//! - The multi-step public intake form
//! - Request store adapters
//! - Output formatting, logging setup, and CLI exit codes

pub mod dashboard;
pub mod exit_codes;
pub mod intake;
pub mod logging;
pub mod output;
pub mod store;
pub mod triage;

pub use dashboard::{Dashboard, DashboardReport, PurgeMode, PurgeOutcome, PURGE_CONFIRMATION};
pub use exit_codes::ExitCode;
