//! Consultation triage common types, IDs, and errors.
//!
//! This crate provides foundational types shared across ct-core modules:
//! - The consultation request record as it comes out of the document store
//! - Timestamp handling for native and store-deferred `createdAt` values
//! - Request identity and schema versioning
//! - Common error types
//! - Output format selection

pub mod error;
pub mod id;
pub mod output;
pub mod request;
pub mod schema;
pub mod timestamp;

pub use error::{Error, Result};
pub use id::RequestId;
pub use output::OutputFormat;
pub use request::{ConsultationRequest, Coordinates, Location, NewRequest, RequestStatus};
pub use schema::SCHEMA_VERSION;
pub use timestamp::{CreatedAt, ResolveInstant, StoreTimestamp};
