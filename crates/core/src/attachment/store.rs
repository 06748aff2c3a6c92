//! Object store trait, upload batches and attachment cleanup.

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::attachment::kind::file_extension;
use crate::ticket::Attachment;

/// A file queued for upload.
#[derive(Debug, Clone)]
pub struct UploadFile {
    /// Original file name as chosen by the user.
    pub name: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

fn megabytes(bytes: &u64) -> f64 {
    *bytes as f64 / (1024.0 * 1024.0)
}

/// Errors from object storage.
#[derive(Debug, Error)]
pub enum StorageError {
    /// File exceeds the configured size limit. Raised before any upload.
    #[error(
        "File {name} is too large ({:.1} MB). Maximum size is {:.0} MB",
        megabytes(.size),
        megabytes(.limit)
    )]
    TooLarge { name: String, size: u64, limit: u64 },

    /// Object key would resolve outside the store.
    #[error("Invalid object path: {0}")]
    InvalidPath(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Hosted storage rejected the request or could not be reached.
    #[error("Storage backend error: {0}")]
    Remote(String),
}

/// Trait for attachment object storage.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Short backend name for logs.
    fn name(&self) -> &str;

    /// Store a file and return its attachment reference.
    ///
    /// Size limits are the caller's concern; see [`upload_all`].
    async fn upload(&self, file: &UploadFile) -> Result<Attachment, StorageError>;

    /// Delete a stored object by its path.
    async fn delete(&self, path: &str) -> Result<(), StorageError>;
}

/// Generate a collision-resistant object key for an uploaded file.
///
/// Format: `uploads/<unix millis>-<6 random chars>.<ext>`. The extension is
/// dropped unless it is plain ASCII alphanumeric, so keys never need escaping.
pub fn generate_object_key(original_name: &str) -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let random: String = uuid::Uuid::new_v4()
        .simple()
        .to_string()
        .chars()
        .take(6)
        .collect();

    let ext = file_extension(original_name);
    if original_name.contains('.')
        && !ext.is_empty()
        && ext.chars().all(|c| c.is_ascii_alphanumeric())
    {
        format!("uploads/{}-{}.{}", millis, random, ext)
    } else {
        format!("uploads/{}-{}", millis, random)
    }
}

/// Upload batch stopped at a failing file.
#[derive(Debug, Error)]
#[error("Upload of {file} failed: {source}")]
pub struct UploadBatchError {
    /// Name of the file that failed.
    pub file: String,
    /// Attachments stored before the failure.
    pub uploaded: Vec<Attachment>,
    #[source]
    pub source: StorageError,
}

/// Upload files one after another, stopping at the first failure.
///
/// Each file is checked against `max_size` before its upload starts. Files
/// after the failing one are never attempted.
pub async fn upload_all(
    store: &dyn ObjectStore,
    files: &[UploadFile],
    max_size: u64,
) -> Result<Vec<Attachment>, UploadBatchError> {
    let mut uploaded = Vec::with_capacity(files.len());

    for file in files {
        let result = if file.size() > max_size {
            Err(StorageError::TooLarge {
                name: file.name.clone(),
                size: file.size(),
                limit: max_size,
            })
        } else {
            store.upload(file).await
        };

        match result {
            Ok(attachment) => {
                debug!(file = %file.name, path = %attachment.path, "Uploaded attachment");
                uploaded.push(attachment);
            }
            Err(source) => {
                warn!(
                    file = %file.name,
                    uploaded = uploaded.len(),
                    remaining = files.len() - uploaded.len() - 1,
                    error = %source,
                    "Upload batch aborted"
                );
                return Err(UploadBatchError {
                    file: file.name.clone(),
                    uploaded,
                    source,
                });
            }
        }
    }

    Ok(uploaded)
}

/// A stored object that could not be deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CleanupWarning {
    pub path: String,
    pub error: String,
}

/// Outcome of a best-effort attachment cleanup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CleanupReport {
    /// Objects deleted.
    pub removed: usize,
    /// Attachments without a stored object.
    pub skipped: usize,
    pub warnings: Vec<CleanupWarning>,
}

impl CleanupReport {
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }

    /// Fold another report into this one.
    pub fn merge(&mut self, other: CleanupReport) {
        self.removed += other.removed;
        self.skipped += other.skipped;
        self.warnings.extend(other.warnings);
    }
}

/// Delete the stored objects behind `attachments`.
///
/// Never fails: delete errors become warnings in the report.
pub async fn delete_attachments(
    store: &dyn ObjectStore,
    attachments: &[Attachment],
) -> CleanupReport {
    let mut report = CleanupReport::default();

    for attachment in attachments {
        if !attachment.is_stored() {
            report.skipped += 1;
            continue;
        }
        match store.delete(&attachment.path).await {
            Ok(()) => report.removed += 1,
            Err(e) => {
                warn!(path = %attachment.path, error = %e, "Failed to delete attachment");
                report.warnings.push(CleanupWarning {
                    path: attachment.path.clone(),
                    error: e.to_string(),
                });
            }
        }
    }

    report
}
