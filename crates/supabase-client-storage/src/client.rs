use std::collections::HashMap;
use std::time::Duration;

use reqwest::Method;
use serde::de::DeserializeOwned;
use supabase_client_core::headers::to_header_map;
use supabase_client_core::{ApiRequest, ApiResponse, Blocking, Mode, NonBlocking};
use url::Url;

use crate::bucket_api::StorageBucketApi;
use crate::error::StorageError;
use crate::types::*;

/// HTTP client for Supabase Storage API.
///
/// Communicates with Storage REST endpoints at `/storage/v1/...`.
///
/// # Example
/// ```ignore
/// let buckets = storage.list_buckets().await?;
/// let avatars = storage.from("avatars");
/// let url = avatars.get_public_url("me.png");
/// ```
#[derive(Debug, Clone)]
pub struct StorageClient<M: Mode> {
    http: M::Http,
    base_url: Url,
    headers: HashMap<String, String>,
}

impl<M: Mode> StorageClient<M> {
    /// Create a new storage client.
    ///
    /// `url` is the storage endpoint (e.g. `https://your-project.supabase.co/storage/v1`).
    pub fn new(
        url: &str,
        headers: &HashMap<String, String>,
        timeout: Option<Duration>,
    ) -> Result<Self, StorageError> {
        let base_url = Url::parse(url.trim_end_matches('/'))?;
        let http = M::build_http(to_header_map(headers)?, timeout)?;
        Ok(Self {
            http,
            base_url,
            headers: headers.clone(),
        })
    }

    /// Get the base URL for the storage API.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Headers every request carries.
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Create a file operations API scoped to a bucket.
    pub fn from(&self, bucket: &str) -> StorageBucketApi<M> {
        StorageBucketApi::new(self.clone(), bucket.to_string())
    }

    // ─── Request Builders ───────────────────────────────────────

    fn create_bucket_request(
        &self,
        id: &str,
        options: &BucketOptions,
    ) -> Result<ApiRequest, StorageError> {
        let body = BucketBody {
            id,
            name: id,
            options,
        };
        Ok(ApiRequest::post(self.url(&["bucket"])?).json(&body)?)
    }

    fn update_bucket_request(
        &self,
        id: &str,
        options: &BucketOptions,
    ) -> Result<ApiRequest, StorageError> {
        let body = BucketBody {
            id,
            name: id,
            options,
        };
        Ok(ApiRequest::new(Method::PUT, self.url(&["bucket", id])?).json(&body)?)
    }

    // ─── Internal Helpers ───────────────────────────────────────

    /// Append path segments to the base URL, percent-encoding each one.
    ///
    /// An entry may hold `/`-separated components. Repeated slashes collapse,
    /// but an entry with no components or with a `.` or `..` component
    /// (percent-encoded or not) is rejected.
    pub(crate) fn url(&self, segments: &[&str]) -> Result<String, StorageError> {
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| StorageError::InvalidPath(self.base_url.to_string()))?;
            path.pop_if_empty();
            for segment in segments {
                let parts: Vec<&str> = segment.split('/').filter(|s| !s.is_empty()).collect();
                if parts.is_empty() || parts.iter().any(|p| is_dot_segment(p)) {
                    return Err(StorageError::InvalidPath(segment.to_string()));
                }
                path.extend(parts);
            }
        }
        Ok(url.to_string())
    }

    pub(crate) fn parse_json<T: DeserializeOwned>(resp: ApiResponse) -> Result<T, StorageError> {
        if !resp.is_success() {
            return Err(StorageError::from_response(&resp));
        }
        Ok(resp.json()?)
    }

    pub(crate) fn parse_empty(resp: ApiResponse) -> Result<(), StorageError> {
        if !resp.is_success() {
            return Err(StorageError::from_response(&resp));
        }
        Ok(())
    }
}

fn is_dot_segment(part: &str) -> bool {
    matches!(part.to_ascii_lowercase().replace("%2e", ".").as_str(), "." | "..")
}

// ─── Blocking ──────────────────────────────────────────────────

impl StorageClient<Blocking> {
    pub(crate) fn fetch(&self, request: ApiRequest) -> Result<ApiResponse, StorageError> {
        Ok(request.send_blocking(&self.http)?)
    }

    /// List all buckets.
    pub fn list_buckets(&self) -> Result<Vec<Bucket>, StorageError> {
        Self::parse_json(self.fetch(ApiRequest::get(self.url(&["bucket"])?))?)
    }

    /// Get a bucket by ID.
    pub fn get_bucket(&self, id: &str) -> Result<Bucket, StorageError> {
        Self::parse_json(self.fetch(ApiRequest::get(self.url(&["bucket", id])?))?)
    }

    /// Create a new bucket.
    pub fn create_bucket(
        &self,
        id: &str,
        options: BucketOptions,
    ) -> Result<CreateBucketResponse, StorageError> {
        Self::parse_json(self.fetch(self.create_bucket_request(id, &options)?)?)
    }

    /// Update a bucket.
    pub fn update_bucket(&self, id: &str, options: BucketOptions) -> Result<(), StorageError> {
        Self::parse_empty(self.fetch(self.update_bucket_request(id, &options)?)?)
    }

    /// Empty a bucket (remove all files).
    pub fn empty_bucket(&self, id: &str) -> Result<(), StorageError> {
        let request = ApiRequest::post(self.url(&["bucket", id, "empty"])?).json(&serde_json::json!({}))?;
        Self::parse_empty(self.fetch(request)?)
    }

    /// Delete a bucket. The bucket must be empty first.
    pub fn delete_bucket(&self, id: &str) -> Result<(), StorageError> {
        let request = ApiRequest::new(Method::DELETE, self.url(&["bucket", id])?);
        Self::parse_empty(self.fetch(request)?)
    }
}

// ─── Non-blocking ──────────────────────────────────────────────

impl StorageClient<NonBlocking> {
    pub(crate) async fn fetch(&self, request: ApiRequest) -> Result<ApiResponse, StorageError> {
        Ok(request.send(&self.http).await?)
    }

    /// List all buckets.
    pub async fn list_buckets(&self) -> Result<Vec<Bucket>, StorageError> {
        Self::parse_json(self.fetch(ApiRequest::get(self.url(&["bucket"])?)).await?)
    }

    /// Get a bucket by ID.
    pub async fn get_bucket(&self, id: &str) -> Result<Bucket, StorageError> {
        Self::parse_json(self.fetch(ApiRequest::get(self.url(&["bucket", id])?)).await?)
    }

    /// Create a new bucket.
    pub async fn create_bucket(
        &self,
        id: &str,
        options: BucketOptions,
    ) -> Result<CreateBucketResponse, StorageError> {
        Self::parse_json(self.fetch(self.create_bucket_request(id, &options)?).await?)
    }

    /// Update a bucket.
    pub async fn update_bucket(&self, id: &str, options: BucketOptions) -> Result<(), StorageError> {
        Self::parse_empty(self.fetch(self.update_bucket_request(id, &options)?).await?)
    }

    /// Empty a bucket (remove all files).
    pub async fn empty_bucket(&self, id: &str) -> Result<(), StorageError> {
        let request = ApiRequest::post(self.url(&["bucket", id, "empty"])?).json(&serde_json::json!({}))?;
        Self::parse_empty(self.fetch(request).await?)
    }

    /// Delete a bucket. The bucket must be empty first.
    pub async fn delete_bucket(&self, id: &str) -> Result<(), StorageError> {
        let request = ApiRequest::new(Method::DELETE, self.url(&["bucket", id])?);
        Self::parse_empty(self.fetch(request).await?)
    }
}
