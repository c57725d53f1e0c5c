//! Supabase client for Rust.
//!
//! One [`SupabaseClient`] is built from a project URL and an API key and hands
//! out the database, auth, storage and functions clients, all configured with
//! the derived endpoints and the current credentials.
//!
//! ```ignore
//! use supabase_client::prelude::*;
//!
//! let client = create_async_client(
//!     "https://your-project.supabase.co",
//!     "your-anon-key",
//!     None,
//! ).await?;
//!
//! let cities = client
//!     .from("cities")?
//!     .select("name,population")
//!     .gt("population", 1_000_000)
//!     .execute()
//!     .await?;
//!
//! client.auth().sign_in_with_password("user@example.com", "password").await?;
//! // Services built from now on carry the user's access token.
//! let buckets = client.storage()?.list_buckets().await?;
//! ```
//!
//! The blocking variant ([`SyncClient`], [`create_client`]) has the same
//! surface with plain, non-`async` calls.

mod cache;
pub mod client;
pub mod realtime;
mod services;

pub use client::SupabaseClient;
pub use realtime::RealtimeClient;

pub use supabase_client_core::*;

pub use supabase_client_auth;
pub use supabase_client_functions;
pub use supabase_client_query;
pub use supabase_client_storage;

/// A client whose network calls block the calling thread.
pub type SyncClient = SupabaseClient<Blocking>;

/// A client whose network calls are `async`.
pub type AsyncClient = SupabaseClient<NonBlocking>;

/// Environment variable holding the project URL.
pub const SUPABASE_URL_ENV: &str = "SUPABASE_URL";

/// Environment variable holding the API key.
pub const SUPABASE_KEY_ENV: &str = "SUPABASE_KEY";

/// Create a blocking client. `None` uses [`ClientOptions::new`].
pub fn create_client(
    supabase_url: &str,
    supabase_key: &str,
    options: Option<ClientOptions>,
) -> Result<SyncClient, ConfigurationError> {
    SyncClient::create(supabase_url, supabase_key, options.unwrap_or_default())
}

/// Create an async client. `None` uses [`ClientOptions::new_async`].
pub async fn create_async_client(
    supabase_url: &str,
    supabase_key: &str,
    options: Option<ClientOptions>,
) -> Result<AsyncClient, ConfigurationError> {
    let options = options.unwrap_or_else(ClientOptions::new_async);
    AsyncClient::create(supabase_url, supabase_key, options).await
}

/// Create a blocking client from `SUPABASE_URL` and `SUPABASE_KEY`.
pub fn create_client_from_env(
    options: Option<ClientOptions>,
) -> Result<SyncClient, ConfigurationError> {
    let (url, key) = credentials_from_env()?;
    create_client(&url, &key, options)
}

/// Create an async client from `SUPABASE_URL` and `SUPABASE_KEY`.
pub async fn create_async_client_from_env(
    options: Option<ClientOptions>,
) -> Result<AsyncClient, ConfigurationError> {
    let (url, key) = credentials_from_env()?;
    create_async_client(&url, &key, options).await
}

fn credentials_from_env() -> Result<(String, String), ConfigurationError> {
    let url = std::env::var(SUPABASE_URL_ENV).map_err(|_| ConfigurationError::MissingUrl)?;
    let key = std::env::var(SUPABASE_KEY_ENV).map_err(|_| ConfigurationError::MissingKey)?;
    Ok((url, key))
}

/// Prelude module for convenient imports.
///
/// ```ignore
/// use supabase_client::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        create_async_client, create_async_client_from_env, create_client,
        create_client_from_env, AsyncClient, RealtimeClient, SupabaseClient, SyncClient,
    };
    pub use supabase_client_core::{
        Blocking, ClientOptions, ClientOptionsOverrides, ConfigurationError, ExecutionMode,
        FlowType, NonBlocking, SessionStorage, SupabaseError, SupabaseResult,
    };

    pub use supabase_client_query::{
        CountOption, FilterBuilder, Filterable, IsValue, Modifiable, NullsPosition,
        OrderDirection, PostgrestClient, PostgrestError, PostgrestResponse, QueryBuilder,
    };

    pub use supabase_client_auth::{
        AuthChangeEvent, AuthClient, AuthError, AuthSubscription, OAuthProvider, Session,
        SignOutScope, User,
    };

    pub use supabase_client_storage::{
        Bucket, BucketOptions, FileObject, SearchOptions, SignedUrlResponse, SortOrder,
        StorageBucketApi, StorageClient, StorageError,
    };

    pub use supabase_client_functions::{
        FunctionRegion, FunctionResponse, FunctionsClient, FunctionsError, InvokeBody,
        InvokeOptions,
    };
}
