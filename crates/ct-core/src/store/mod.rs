//! Request store collaborator.
//!
//! The document store lives outside this crate; [`RequestStore`] is the seam.
//! Two adapters ship here: a JSONL file store for the CLI and an in-memory
//! store for tests and dry runs.

pub mod jsonl;
pub mod memory;

pub use jsonl::JsonlRequestStore;
pub use memory::MemoryRequestStore;

use chrono::{DateTime, Utc};
use ct_common::{ConsultationRequest, NewRequest, RequestId, RequestStatus, ResolveInstant};
use std::path::PathBuf;
use thiserror::Error;

/// Errors from store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse record at {}:{line}: {source}", path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize record: {source}")]
    Serialize {
        #[source]
        source: serde_json::Error,
    },

    #[error("request not found: {0}")]
    NotFound(RequestId),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl From<StoreError> for ct_common::Error {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => ct_common::Error::RequestNotFound { id: id.0 },
            other => ct_common::Error::Store(other.to_string()),
        }
    }
}

/// Operations the dashboard and intake form need from the document store.
pub trait RequestStore {
    /// All requests, newest first.
    fn fetch_all(&self) -> Result<Vec<ConsultationRequest>, StoreError>;

    /// Insert a submission as a pending request created at `now`.
    fn add(&self, submission: NewRequest, now: DateTime<Utc>) -> Result<RequestId, StoreError>;

    /// Change the status of one request.
    fn update_status(&self, id: &RequestId, status: RequestStatus) -> Result<(), StoreError>;

    /// Remove every request, returning how many were removed.
    fn delete_all(&self) -> Result<u32, StoreError>;
}

impl<S: RequestStore + ?Sized> RequestStore for &S {
    fn fetch_all(&self) -> Result<Vec<ConsultationRequest>, StoreError> {
        (**self).fetch_all()
    }

    fn add(&self, submission: NewRequest, now: DateTime<Utc>) -> Result<RequestId, StoreError> {
        (**self).add(submission, now)
    }

    fn update_status(&self, id: &RequestId, status: RequestStatus) -> Result<(), StoreError> {
        (**self).update_status(id, status)
    }

    fn delete_all(&self) -> Result<u32, StoreError> {
        (**self).delete_all()
    }
}

/// Order requests newest first by resolved `createdAt`.
///
/// Requests without a usable timestamp go last; the sort is stable.
pub fn sort_newest_first(requests: &mut [ConsultationRequest]) {
    requests.sort_by(|a, b| {
        let a = a.created_at.resolve_instant();
        let b = b.created_at.resolve_instant();
        // None < Some for Option, so reversing puts undated records last.
        b.cmp(&a)
    });
}
