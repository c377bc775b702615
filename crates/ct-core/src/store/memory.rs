//! In-memory request store.

use super::{sort_newest_first, RequestStore, StoreError};
use chrono::{DateTime, Utc};
use ct_common::{ConsultationRequest, CreatedAt, NewRequest, RequestId, RequestStatus};
use std::sync::{Mutex, MutexGuard};

/// Request store held in process memory.
///
/// A store built with [`MemoryRequestStore::unavailable`] fails every
/// operation, standing in for an unreachable backend.
#[derive(Debug, Default)]
pub struct MemoryRequestStore {
    requests: Mutex<Vec<ConsultationRequest>>,
    outage: Option<String>,
}

impl MemoryRequestStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-filled with `requests`.
    pub fn with_requests(requests: Vec<ConsultationRequest>) -> Self {
        Self {
            requests: Mutex::new(requests),
            outage: None,
        }
    }

    /// A store whose every call fails with `message`.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            outage: Some(message.into()),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Vec<ConsultationRequest>>, StoreError> {
        if let Some(message) = &self.outage {
            return Err(StoreError::Unavailable(message.clone()));
        }
        self.requests
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))
    }
}

impl RequestStore for MemoryRequestStore {
    fn fetch_all(&self) -> Result<Vec<ConsultationRequest>, StoreError> {
        let mut requests = self.lock()?.clone();
        sort_newest_first(&mut requests);
        Ok(requests)
    }

    fn add(&self, submission: NewRequest, now: DateTime<Utc>) -> Result<RequestId, StoreError> {
        let id = RequestId::new();
        let record = submission.into_record(id.clone(), CreatedAt::deferred(now));
        self.lock()?.push(record);
        Ok(id)
    }

    fn update_status(&self, id: &RequestId, status: RequestStatus) -> Result<(), StoreError> {
        let mut requests = self.lock()?;
        let request = requests
            .iter_mut()
            .find(|r| &r.id == id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        request.status = status;
        Ok(())
    }

    fn delete_all(&self) -> Result<u32, StoreError> {
        let mut requests = self.lock()?;
        let count = requests.len();
        requests.clear();
        Ok(u32::try_from(count).unwrap_or(u32::MAX))
    }
}
