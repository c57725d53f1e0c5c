use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;
use crate::mode::ExecutionMode;
use crate::persistence::SessionStorage;

/// Default request timeout for the database client.
pub const DEFAULT_POSTGREST_CLIENT_TIMEOUT: Duration = Duration::from_secs(120);
/// Default request timeout for the storage client.
pub const DEFAULT_STORAGE_CLIENT_TIMEOUT: Duration = Duration::from_secs(20);
/// Default request timeout for the functions client.
pub const DEFAULT_FUNCTION_CLIENT_TIMEOUT: Duration = Duration::from_secs(5);
/// Key under which the auth client persists its session.
pub const DEFAULT_STORAGE_KEY: &str = "supabase.auth.token";

/// `X-Client-Info` header sent with every request.
pub fn default_headers() -> HashMap<String, String> {
    HashMap::from([(
        "X-Client-Info".to_string(),
        format!("supabase-client-rs/{}", env!("CARGO_PKG_VERSION")),
    )])
}

/// Authentication flow used by the auth client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowType {
    /// Tokens are returned directly in the redirect.
    #[default]
    Implicit,
    /// Authorization code exchange with a PKCE verifier.
    Pkce,
}

impl fmt::Display for FlowType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Implicit => write!(f, "implicit"),
            Self::Pkce => write!(f, "pkce"),
        }
    }
}

/// Connection options shared by every service of one client.
///
/// Cloning is cheap; the session store is held behind an `Arc`, so a clone
/// (or a [`replace`](Self::replace)d copy) keeps pointing at the same store.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Postgres schema the database client targets.
    pub schema: String,
    /// Extra headers sent with every request. Merged, never replaced.
    pub headers: HashMap<String, String>,
    /// Let the auth client refresh expired sessions on lookup.
    pub auto_refresh_token: bool,
    /// Persist sessions through `storage`.
    pub persist_session: bool,
    /// Session persistence. `None` allocates a fresh in-memory store of the
    /// matching mode when the client is built.
    pub storage: Option<SessionStorage>,
    /// Key under which sessions are persisted.
    pub storage_key: String,
    pub postgrest_client_timeout: Duration,
    pub storage_client_timeout: Duration,
    pub function_client_timeout: Duration,
    pub flow_type: FlowType,
    pub execution_mode: ExecutionMode,
}

/// Named overrides for [`ClientOptions::replace`]. Unset fields keep the
/// original's value.
#[derive(Debug, Clone, Default)]
pub struct ClientOptionsOverrides {
    pub schema: Option<String>,
    pub headers: Option<HashMap<String, String>>,
    pub auto_refresh_token: Option<bool>,
    pub persist_session: Option<bool>,
    pub storage: Option<SessionStorage>,
    pub storage_key: Option<String>,
    pub postgrest_client_timeout: Option<Duration>,
    pub storage_client_timeout: Option<Duration>,
    pub function_client_timeout: Option<Duration>,
    pub flow_type: Option<FlowType>,
    pub execution_mode: Option<ExecutionMode>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self::for_mode(ExecutionMode::Sync)
    }
}

impl ClientOptions {
    /// Options for a blocking client.
    pub fn new() -> Self {
        Self::default()
    }

    /// Options for an async client.
    pub fn new_async() -> Self {
        Self::for_mode(ExecutionMode::Async)
    }

    pub fn for_mode(execution_mode: ExecutionMode) -> Self {
        Self {
            schema: "public".to_string(),
            headers: default_headers(),
            auto_refresh_token: true,
            persist_session: true,
            storage: None,
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            postgrest_client_timeout: DEFAULT_POSTGREST_CLIENT_TIMEOUT,
            storage_client_timeout: DEFAULT_STORAGE_CLIENT_TIMEOUT,
            function_client_timeout: DEFAULT_FUNCTION_CLIENT_TIMEOUT,
            flow_type: FlowType::Implicit,
            execution_mode,
        }
    }

    /// Set the default schema.
    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = schema.into();
        self
    }

    /// Add or overwrite one header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Merge a set of headers into the existing ones.
    pub fn headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.headers
            .extend(headers.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn auto_refresh_token(mut self, enabled: bool) -> Self {
        self.auto_refresh_token = enabled;
        self
    }

    pub fn persist_session(mut self, enabled: bool) -> Self {
        self.persist_session = enabled;
        self
    }

    pub fn storage(mut self, storage: SessionStorage) -> Self {
        self.storage = Some(storage);
        self
    }

    pub fn storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    pub fn postgrest_client_timeout(mut self, timeout: Duration) -> Self {
        self.postgrest_client_timeout = timeout;
        self
    }

    pub fn storage_client_timeout(mut self, timeout: Duration) -> Self {
        self.storage_client_timeout = timeout;
        self
    }

    pub fn function_client_timeout(mut self, timeout: Duration) -> Self {
        self.function_client_timeout = timeout;
        self
    }

    pub fn flow_type(mut self, flow_type: FlowType) -> Self {
        self.flow_type = flow_type;
        self
    }

    /// Switch the execution mode. An explicitly supplied `storage` of the
    /// other mode is left alone and will be rejected at construction.
    pub fn execution_mode(mut self, mode: ExecutionMode) -> Self {
        self.execution_mode = mode;
        self
    }

    pub fn is_async(&self) -> bool {
        self.execution_mode.is_async()
    }

    /// Copy these options, overriding only the fields named in `overrides`.
    ///
    /// Unnamed fields are cloned from `self`; the session store is shared by
    /// reference with the original.
    pub fn replace(&self, overrides: ClientOptionsOverrides) -> Self {
        let base = self.clone();
        Self {
            schema: overrides.schema.unwrap_or(base.schema),
            headers: overrides.headers.unwrap_or(base.headers),
            auto_refresh_token: overrides
                .auto_refresh_token
                .unwrap_or(base.auto_refresh_token),
            persist_session: overrides.persist_session.unwrap_or(base.persist_session),
            storage: overrides.storage.or(base.storage),
            storage_key: overrides.storage_key.unwrap_or(base.storage_key),
            postgrest_client_timeout: overrides
                .postgrest_client_timeout
                .unwrap_or(base.postgrest_client_timeout),
            storage_client_timeout: overrides
                .storage_client_timeout
                .unwrap_or(base.storage_client_timeout),
            function_client_timeout: overrides
                .function_client_timeout
                .unwrap_or(base.function_client_timeout),
            flow_type: overrides.flow_type.unwrap_or(base.flow_type),
            execution_mode: overrides.execution_mode.unwrap_or(base.execution_mode),
        }
    }

    /// Check that an explicitly supplied session store matches the execution mode.
    pub fn check_storage_mode(&self) -> Result<(), ConfigurationError> {
        match &self.storage {
            Some(storage) if storage.mode() != self.execution_mode => {
                Err(ConfigurationError::StorageMismatch {
                    mode: self.execution_mode,
                    found: storage.mode(),
                })
            }
            _ => Ok(()),
        }
    }

    /// The configured store, or a fresh in-memory one for the execution mode.
    pub fn resolve_storage(&self) -> Result<SessionStorage, ConfigurationError> {
        self.check_storage_mode()?;
        Ok(self
            .storage
            .clone()
            .unwrap_or_else(|| SessionStorage::for_mode(self.execution_mode)))
    }
}
