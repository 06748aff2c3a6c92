//! Mock object store for testing.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::attachment::{ObjectStore, StorageError, UploadFile};
use crate::ticket::Attachment;

/// A recorded upload for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedUpload {
    /// Original file name.
    pub name: String,
    /// Size of the uploaded bytes.
    pub size: u64,
    /// Key the object was stored under.
    pub path: String,
}

/// Mock implementation of the ObjectStore trait.
///
/// Provides controllable behavior for testing:
/// - Track uploads and deletes for assertions
/// - Fail the upload of a specific file name
/// - Fail the delete of a specific path
///
/// # Example
///
/// ```rust,ignore
/// use ticketdesk_core::testing::MockObjectStore;
///
/// let store = MockObjectStore::new();
/// store.fail_upload_of("broken.png").await;
///
/// let result = upload_all(&store, &files, limit).await;
///
/// assert_eq!(store.uploaded_names().await, vec!["ok.png"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockObjectStore {
    uploads: Arc<RwLock<Vec<RecordedUpload>>>,
    deletes: Arc<RwLock<Vec<String>>>,
    failing_uploads: Arc<RwLock<HashSet<String>>>,
    failing_deletes: Arc<RwLock<HashSet<String>>>,
}

impl MockObjectStore {
    /// Create a new mock object store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make uploads of `file_name` fail with a backend error.
    pub async fn fail_upload_of(&self, file_name: &str) {
        self.failing_uploads
            .write()
            .await
            .insert(file_name.to_string());
    }

    /// Make deletes of `path` fail with a backend error.
    pub async fn fail_delete_of(&self, path: &str) {
        self.failing_deletes.write().await.insert(path.to_string());
    }

    /// Get all recorded uploads.
    pub async fn recorded_uploads(&self) -> Vec<RecordedUpload> {
        self.uploads.read().await.clone()
    }

    /// Names of uploaded files, in upload order.
    pub async fn uploaded_names(&self) -> Vec<String> {
        self.uploads
            .read()
            .await
            .iter()
            .map(|u| u.name.clone())
            .collect()
    }

    /// Paths successfully deleted, in order.
    pub async fn deleted_paths(&self) -> Vec<String> {
        self.deletes.read().await.clone()
    }

    /// Clear all recorded operations.
    pub async fn clear(&self) {
        self.uploads.write().await.clear();
        self.deletes.write().await.clear();
    }
}

#[async_trait]
impl ObjectStore for MockObjectStore {
    fn name(&self) -> &str {
        "mock"
    }

    async fn upload(&self, file: &UploadFile) -> Result<Attachment, StorageError> {
        if self.failing_uploads.read().await.contains(&file.name) {
            return Err(StorageError::Remote(format!(
                "mock upload failure for {}",
                file.name
            )));
        }

        let mut uploads = self.uploads.write().await;
        let path = format!("uploads/mock-{}-{}", uploads.len(), file.name);
        uploads.push(RecordedUpload {
            name: file.name.clone(),
            size: file.size(),
            path: path.clone(),
        });

        Ok(Attachment::new(
            format!("mock://{}", path),
            file.name.clone(),
            path,
        ))
    }

    async fn delete(&self, path: &str) -> Result<(), StorageError> {
        if self.failing_deletes.read().await.contains(path) {
            return Err(StorageError::Remote(format!("mock delete failure for {}", path)));
        }
        self.deletes.write().await.push(path.to_string());
        Ok(())
    }
}
