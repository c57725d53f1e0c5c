use reqwest::Method;
use serde_json::json;
use supabase_client_core::{ApiRequest, Blocking, Mode, NonBlocking};

use crate::client::StorageClient;
use crate::error::StorageError;
use crate::types::*;

/// File operations API scoped to a specific bucket.
///
/// Created via `StorageClient::from("bucket_name")`.
#[derive(Debug, Clone)]
pub struct StorageBucketApi<M: Mode> {
    client: StorageClient<M>,
    bucket_id: String,
}

impl<M: Mode> StorageBucketApi<M> {
    pub(crate) fn new(client: StorageClient<M>, bucket_id: String) -> Self {
        Self { client, bucket_id }
    }

    pub fn bucket_id(&self) -> &str {
        &self.bucket_id
    }

    /// Get the public URL for a file (no HTTP call, just URL construction).
    ///
    /// Only works for files in public buckets. Fails with
    /// [`StorageError::InvalidPath`] when the bucket id or `path` is empty or
    /// contains `.` or `..`.
    pub fn get_public_url(&self, path: &str) -> Result<String, StorageError> {
        self.client
            .url(&["object", "public", &self.bucket_id, path])
    }

    fn list_request(
        &self,
        path: Option<&str>,
        options: &SearchOptions,
    ) -> Result<ApiRequest, StorageError> {
        let body = ListBody {
            prefix: path.unwrap_or(""),
            options,
        };
        Ok(ApiRequest::post(self.client.url(&["object", "list", &self.bucket_id])?).json(&body)?)
    }

    fn remove_request(&self, paths: &[&str]) -> Result<ApiRequest, StorageError> {
        Ok(
            ApiRequest::new(Method::DELETE, self.client.url(&["object", &self.bucket_id])?)
                .json(&json!({ "prefixes": paths }))?,
        )
    }

    fn move_request(&self, from: &str, to: &str) -> Result<ApiRequest, StorageError> {
        Ok(ApiRequest::post(self.client.url(&["object", "move"])?).json(&json!({
            "bucketId": self.bucket_id,
            "sourceKey": from,
            "destinationKey": to,
        }))?)
    }

    fn signed_url_request(&self, path: &str, expires_in: u64) -> Result<ApiRequest, StorageError> {
        Ok(
            ApiRequest::post(self.client.url(&["object", "sign", &self.bucket_id, path])?)
                .json(&json!({ "expiresIn": expires_in }))?,
        )
    }

    /// Make a server-relative signed URL absolute.
    fn absolute(&self, mut result: SignedUrlResponse) -> SignedUrlResponse {
        if result.signed_url.starts_with('/') {
            let base = self.client.base_url().as_str().trim_end_matches('/');
            result.signed_url = format!("{}{}", base, result.signed_url);
        }
        result
    }
}

impl StorageBucketApi<Blocking> {
    /// List files in the bucket under `path` (the root when `None`).
    pub fn list(
        &self,
        path: Option<&str>,
        options: Option<SearchOptions>,
    ) -> Result<Vec<FileObject>, StorageError> {
        let request = self.list_request(path, &options.unwrap_or_default())?;
        StorageClient::<Blocking>::parse_json(self.client.fetch(request)?)
    }

    /// Remove files from the bucket.
    pub fn remove(&self, paths: &[&str]) -> Result<Vec<FileObject>, StorageError> {
        StorageClient::<Blocking>::parse_json(self.client.fetch(self.remove_request(paths)?)?)
    }

    /// Move a file within the bucket.
    pub fn move_file(&self, from: &str, to: &str) -> Result<(), StorageError> {
        StorageClient::<Blocking>::parse_empty(self.client.fetch(self.move_request(from, to)?)?)
    }

    /// Create a signed URL valid for `expires_in` seconds.
    pub fn create_signed_url(
        &self,
        path: &str,
        expires_in: u64,
    ) -> Result<SignedUrlResponse, StorageError> {
        let resp = self.client.fetch(self.signed_url_request(path, expires_in)?)?;
        Ok(self.absolute(StorageClient::<Blocking>::parse_json(resp)?))
    }
}

impl StorageBucketApi<NonBlocking> {
    /// List files in the bucket under `path` (the root when `None`).
    pub async fn list(
        &self,
        path: Option<&str>,
        options: Option<SearchOptions>,
    ) -> Result<Vec<FileObject>, StorageError> {
        let request = self.list_request(path, &options.unwrap_or_default())?;
        StorageClient::<NonBlocking>::parse_json(self.client.fetch(request).await?)
    }

    /// Remove files from the bucket.
    pub async fn remove(&self, paths: &[&str]) -> Result<Vec<FileObject>, StorageError> {
        StorageClient::<NonBlocking>::parse_json(
            self.client.fetch(self.remove_request(paths)?).await?,
        )
    }

    /// Move a file within the bucket.
    pub async fn move_file(&self, from: &str, to: &str) -> Result<(), StorageError> {
        StorageClient::<NonBlocking>::parse_empty(
            self.client.fetch(self.move_request(from, to)?).await?,
        )
    }

    /// Create a signed URL valid for `expires_in` seconds.
    pub async fn create_signed_url(
        &self,
        path: &str,
        expires_in: u64,
    ) -> Result<SignedUrlResponse, StorageError> {
        let resp = self
            .client
            .fetch(self.signed_url_request(path, expires_in)?)
            .await?;
        Ok(self.absolute(StorageClient::<NonBlocking>::parse_json(resp)?))
    }
}
