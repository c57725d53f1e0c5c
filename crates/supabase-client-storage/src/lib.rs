//! Supabase Storage HTTP client.
//!
//! Bucket management and bucket-scoped file operations against the Storage
//! REST endpoints at `/storage/v1/...`.
//!
//! # Usage
//!
//! ```ignore
//! let buckets = storage.list_buckets().await?;
//! storage.create_bucket("photos", BucketOptions::new().public(true)).await?;
//!
//! let photos = storage.from("photos");
//! let files = photos.list(None, Some(SearchOptions::new().limit(10))).await?;
//! let signed = photos.create_signed_url("cat.png", 60).await?;
//! ```

pub mod bucket_api;
pub mod client;
pub mod error;
pub mod types;

pub use bucket_api::StorageBucketApi;
pub use client::StorageClient;
pub use error::{StorageApiErrorResponse, StorageError};
pub use types::*;
