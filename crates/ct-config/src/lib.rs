//! Consultation triage configuration loading and validation.
//!
//! This crate provides:
//! - Typed Rust structs for the triage policy (SLA thresholds, business
//!   calendar, intake rules)
//! - Config resolution (CLI → env → XDG → defaults)
//! - Data directory resolution for the local request store
//! - Semantic validation

pub mod policy;
pub mod resolve;
pub mod validate;

pub use policy::{BusinessCalendar, IntakePolicy, Policy, SlaPolicy};
pub use resolve::{resolve_config, resolve_data_dir, ConfigError, ConfigPaths, ConfigSource, ResolvedConfig};
pub use validate::{validate_policy, ValidationError, ValidationResult};

/// Schema version for configuration files.
pub const CONFIG_SCHEMA_VERSION: &str = "1.0.0";
