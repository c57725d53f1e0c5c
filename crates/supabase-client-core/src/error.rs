use crate::mode::ExecutionMode;

/// Raised while building a client: bad URL or key, or options that disagree
/// with the requested execution mode.
///
/// Construction either yields a fully usable client or fails with exactly one
/// of these; nothing is left half-built.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
    #[error("supabase url is required")]
    MissingUrl,

    #[error("supabase key is required")]
    MissingKey,

    #[error("Invalid URL: {0:?}")]
    InvalidUrl(String),

    #[error("Invalid API key")]
    InvalidApiKey,

    /// The persistence store does not match the client's execution mode.
    #[error("{mode} client requires {mode}-capable session storage, got {found} storage")]
    StorageMismatch {
        mode: ExecutionMode,
        found: ExecutionMode,
    },

    /// The options ask for one execution mode but a client of the other was built.
    #[error("options request {requested} execution but the client is {actual}")]
    ModeMismatch {
        requested: ExecutionMode,
        actual: ExecutionMode,
    },

    #[error("Invalid header {name:?}: {reason}")]
    InvalidHeader { name: String, reason: String },

    /// A collaborator could not be initialised with the derived settings.
    #[error("Failed to initialise {service} client: {reason}")]
    Client { service: &'static str, reason: String },
}

impl ConfigurationError {
    pub fn client(service: &'static str, reason: impl ToString) -> Self {
        Self::Client {
            service,
            reason: reason.to_string(),
        }
    }
}

/// Umbrella error for applications that want a single error type.
///
/// The client itself never wraps collaborator errors; these conversions only
/// exist so callers can use `?` across services.
#[derive(Debug, thiserror::Error)]
pub enum SupabaseError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigurationError),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Auth error: {0}")]
    Auth(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Functions error: {0}")]
    Functions(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for SupabaseError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

/// Result alias using SupabaseError.
pub type SupabaseResult<T> = Result<T, SupabaseError>;
