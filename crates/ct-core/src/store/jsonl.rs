//! JSON Lines request store.
//!
//! One record per line in `<data_dir>/requests/requests.jsonl`. Inserts
//! append; status changes and purges rewrite the file.

use super::{sort_newest_first, RequestStore, StoreError};
use chrono::{DateTime, Utc};
use ct_common::{ConsultationRequest, CreatedAt, NewRequest, RequestId, RequestStatus};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const REQUESTS_DIR: &str = "requests";
const REQUESTS_FILE: &str = "requests.jsonl";

/// File-backed store for consultation requests.
#[derive(Debug, Clone)]
pub struct JsonlRequestStore {
    path: PathBuf,
}

impl JsonlRequestStore {
    /// Create a store under a data directory.
    pub fn from_data_dir(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(REQUESTS_DIR).join(REQUESTS_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Records in file order.
    fn read_all(&self) -> Result<Vec<ConsultationRequest>, StoreError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&self.path).map_err(|e| self.io_error(e))?;

        let mut requests = Vec::new();
        for (index, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let request: ConsultationRequest =
                serde_json::from_str(line).map_err(|e| StoreError::Parse {
                    path: self.path.clone(),
                    line: index + 1,
                    source: e,
                })?;
            requests.push(request);
        }
        Ok(requests)
    }

    /// Replace the file content with `requests`.
    fn write_all(&self, requests: &[ConsultationRequest]) -> Result<(), StoreError> {
        self.ensure_parent()?;

        let mut content = String::new();
        for request in requests {
            content.push_str(&encode(request)?);
            content.push('\n');
        }

        fs::write(&self.path, content).map_err(|e| self.io_error(e))
    }

    fn ensure_parent(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| StoreError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        Ok(())
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

fn encode(request: &ConsultationRequest) -> Result<String, StoreError> {
    serde_json::to_string(request).map_err(|e| StoreError::Serialize { source: e })
}

impl RequestStore for JsonlRequestStore {
    fn fetch_all(&self) -> Result<Vec<ConsultationRequest>, StoreError> {
        let mut requests = self.read_all()?;
        sort_newest_first(&mut requests);
        debug!(path = %self.path.display(), count = requests.len(), "fetched requests");
        Ok(requests)
    }

    fn add(&self, submission: NewRequest, now: DateTime<Utc>) -> Result<RequestId, StoreError> {
        self.ensure_parent()?;

        let id = RequestId::new();
        let record = submission.into_record(id.clone(), CreatedAt::deferred(now));
        let line = encode(&record)?;

        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| self.io_error(e))?;
        writeln!(file, "{}", line).map_err(|e| self.io_error(e))?;

        info!(%id, "consultation request submitted");
        Ok(id)
    }

    fn update_status(&self, id: &RequestId, status: RequestStatus) -> Result<(), StoreError> {
        let mut requests = self.read_all()?;
        let Some(request) = requests.iter_mut().find(|r| &r.id == id) else {
            return Err(StoreError::NotFound(id.clone()));
        };
        request.status = status;
        self.write_all(&requests)?;
        info!(%id, %status, "request status updated");
        Ok(())
    }

    fn delete_all(&self) -> Result<u32, StoreError> {
        let count = self.read_all()?.len();
        if self.path.exists() {
            fs::remove_file(&self.path).map_err(|e| self.io_error(e))?;
        }
        info!(count, "all requests deleted");
        Ok(u32::try_from(count).unwrap_or(u32::MAX))
    }
}
