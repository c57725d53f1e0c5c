//! Factories turning resolved endpoints and headers into collaborator clients.
//!
//! The execution mode is carried by `M`; each factory builds the variant of its
//! collaborator that belongs to that mode and nothing else.

use std::collections::HashMap;
use std::time::Duration;

use supabase_client_auth::{AuthClient, AuthClientConfig};
use supabase_client_core::{ClientOptions, ConfigurationError, Mode, SessionStorage};
use supabase_client_functions::FunctionsClient;
use supabase_client_query::{PostgrestClient, PostgrestConfig};
use supabase_client_storage::StorageClient;

/// Build the auth client, persisting sessions in `storage`.
///
/// Fails with `StorageMismatch` when `storage` belongs to the other mode.
pub(crate) fn create_auth<M: Mode>(
    url: &str,
    headers: HashMap<String, String>,
    options: &ClientOptions,
    storage: &SessionStorage,
) -> Result<AuthClient<M>, ConfigurationError> {
    let store = M::session_store(storage)?;
    let config = AuthClientConfig {
        url: url.to_string(),
        headers,
        storage_key: options.storage_key.clone(),
        auto_refresh_token: options.auto_refresh_token,
        persist_session: options.persist_session,
        flow_type: options.flow_type,
    };
    AuthClient::new(config, store).map_err(|e| ConfigurationError::client("auth", e))
}

pub(crate) fn create_postgrest<M: Mode>(
    url: &str,
    headers: HashMap<String, String>,
    schema: &str,
    timeout: Duration,
) -> Result<PostgrestClient<M>, ConfigurationError> {
    PostgrestClient::new(PostgrestConfig {
        url: url.to_string(),
        headers,
        schema: schema.to_string(),
        timeout: Some(timeout),
    })
    .map_err(|e| ConfigurationError::client("database", e))
}

pub(crate) fn create_storage<M: Mode>(
    url: &str,
    headers: &HashMap<String, String>,
    timeout: Duration,
) -> Result<StorageClient<M>, ConfigurationError> {
    StorageClient::new(url, headers, Some(timeout))
        .map_err(|e| ConfigurationError::client("storage", e))
}

pub(crate) fn create_functions<M: Mode>(
    url: &str,
    headers: &HashMap<String, String>,
    timeout: Duration,
) -> Result<FunctionsClient<M>, ConfigurationError> {
    FunctionsClient::new(url, headers, Some(timeout))
        .map_err(|e| ConfigurationError::client("functions", e))
}
