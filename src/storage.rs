//! Append-only persistence for submissions.
//!
//! [`SubmissionStore`] is the seam the pipeline and handlers depend on. The
//! JSON file store keeps every submission in one pretty-printed array and
//! serializes its read-modify-write cycles, so concurrent submissions cannot
//! overwrite each other.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::sync::Mutex;

use crate::submission::model::Submission;

pub const SUBMISSIONS_FILE: &str = "submissions.json";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access submission file: {0}")]
    Io(#[from] std::io::Error),
    #[error("submission file is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
    #[error("submission '{0}' already exists")]
    Duplicate(String),
}

#[async_trait]
pub trait SubmissionStore: Send + Sync {
    /// Persist a new submission and return its id.
    async fn append(&self, submission: &Submission) -> Result<String, StoreError>;
    async fn get(&self, id: &str) -> Result<Option<Submission>, StoreError>;
    async fn list(&self) -> Result<Vec<Submission>, StoreError>;
    /// False for deployments without durable local storage.
    fn is_durable(&self) -> bool {
        true
    }
}

/// Submissions kept as a JSON array in a single file.
pub struct JsonFileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Store at `<data_dir>/submissions.json`.
    pub fn in_dir(data_dir: impl AsRef<Path>) -> Self {
        Self::new(data_dir.as_ref().join(SUBMISSIONS_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SubmissionStore for JsonFileStore {
    async fn append(&self, submission: &Submission) -> Result<String, StoreError> {
        let _guard = self.lock.lock().await;

        let mut submissions: Vec<Submission> = read_json_array(&self.path).await?;
        if submissions.iter().any(|s| s.id == submission.id) {
            return Err(StoreError::Duplicate(submission.id.clone()));
        }
        submissions.push(submission.clone());
        write_json_atomically(&self.path, &submissions).await?;

        log::debug!(
            "Appended submission {} ({} stored)",
            submission.id,
            submissions.len()
        );
        Ok(submission.id.clone())
    }

    async fn get(&self, id: &str) -> Result<Option<Submission>, StoreError> {
        let _guard = self.lock.lock().await;
        let submissions: Vec<Submission> = read_json_array(&self.path).await?;
        Ok(submissions.into_iter().find(|s| s.id == id))
    }

    async fn list(&self) -> Result<Vec<Submission>, StoreError> {
        let _guard = self.lock.lock().await;
        read_json_array(&self.path).await
    }
}

/// Store for deployments without durable local storage.
///
/// Appends are accepted and only logged; nothing can be read back.
#[derive(Debug, Default)]
pub struct EphemeralStore;

#[async_trait]
impl SubmissionStore for EphemeralStore {
    async fn append(&self, submission: &Submission) -> Result<String, StoreError> {
        log::info!(
            "Local storage disabled, submission {} is only delivered by email",
            submission.id
        );
        Ok(submission.id.clone())
    }

    async fn get(&self, _id: &str) -> Result<Option<Submission>, StoreError> {
        Ok(None)
    }

    async fn list(&self) -> Result<Vec<Submission>, StoreError> {
        Ok(Vec::new())
    }

    fn is_durable(&self) -> bool {
        false
    }
}

/// Read a JSON array from `path`; a missing file is an empty array.
pub(crate) async fn read_json_array<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, StoreError> {
    match tokio::fs::read(path).await {
        Ok(raw) if raw.iter().all(u8::is_ascii_whitespace) => Ok(Vec::new()),
        Ok(raw) => Ok(serde_json::from_slice(&raw)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
        Err(e) => Err(StoreError::Io(e)),
    }
}

/// Write `value` as pretty JSON through a temp file in the same directory.
pub(crate) async fn write_json_atomically<T: Serialize>(
    path: &Path,
    value: &T,
) -> Result<(), StoreError> {
    let json = serde_json::to_vec_pretty(value)?;
    let path = path.to_path_buf();

    tokio::task::spawn_blocking(move || -> std::io::Result<()> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir)?;

        let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
        tmp.write_all(&json)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&path).map_err(|e| e.error)?;
        Ok(())
    })
    .await
    .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))??;

    Ok(())
}
