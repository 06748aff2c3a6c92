//! Object store backed by a Supabase storage bucket.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde_json::json;
use tracing::debug;

use crate::config::SupabaseConfig;
use crate::ticket::Attachment;

use super::store::{generate_object_key, ObjectStore, StorageError, UploadFile};

/// Supabase storage client for one bucket.
pub struct SupabaseObjectStore {
    client: Client,
    base_url: String,
    api_key: String,
    bucket: String,
}

impl SupabaseObjectStore {
    pub fn new(config: &SupabaseConfig, bucket: impl Into<String>) -> Result<Self, StorageError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()
            .map_err(|e| StorageError::Remote(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            bucket: bucket.into(),
        })
    }

    fn object_url(&self, key: &str) -> String {
        format!("{}/storage/v1/object/{}/{}", self.base_url, self.bucket, key)
    }

    fn public_url(&self, key: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url, self.bucket, key
        )
    }

    fn bucket_url(&self) -> String {
        format!("{}/storage/v1/object/{}", self.base_url, self.bucket)
    }

    async fn check(response: Response) -> Result<Response, StorageError> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Err(StorageError::Remote(format!(
            "HTTP {}: {}",
            status,
            body.chars().take(200).collect::<String>()
        )))
    }
}

#[async_trait]
impl ObjectStore for SupabaseObjectStore {
    fn name(&self) -> &str {
        "supabase"
    }

    async fn upload(&self, file: &UploadFile) -> Result<Attachment, StorageError> {
        let key = generate_object_key(&file.name);
        let content_type = mime_guess::from_path(&file.name).first_or_octet_stream();

        let response = self
            .client
            .post(self.object_url(&key))
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .header(reqwest::header::CONTENT_TYPE, content_type.as_ref())
            .body(file.bytes.clone())
            .send()
            .await
            .map_err(|e| StorageError::Remote(e.to_string()))?;
        Self::check(response).await?;

        debug!(key = %key, bucket = %self.bucket, "Uploaded object");
        Ok(Attachment::new(self.public_url(&key), file.name.clone(), key))
    }

    async fn delete(&self, path: &str) -> Result<(), StorageError> {
        let response = self
            .client
            .delete(self.bucket_url())
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .json(&json!({ "prefixes": [path] }))
            .send()
            .await
            .map_err(|e| StorageError::Remote(e.to_string()))?;
        Self::check(response).await?;
        Ok(())
    }
}
