use serde::Deserialize;
use supabase_client_core::{ConfigurationError, SupabaseError};

/// Error response format from Supabase Edge Functions.
#[derive(Debug, Clone, Deserialize)]
pub struct FunctionsApiErrorResponse {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl FunctionsApiErrorResponse {
    /// Extract the most informative error message from the response.
    pub fn error_message(&self) -> String {
        self.message
            .as_deref()
            .or(self.error.as_deref())
            .unwrap_or("Unknown error")
            .to_string()
    }
}

/// Edge Functions-specific errors.
#[derive(Debug, thiserror::Error)]
pub enum FunctionsError {
    /// HTTP transport error from reqwest.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Function returned non-2xx status (JS: FunctionsHttpError).
    #[error("Functions HTTP error ({status}): {message}")]
    HttpError { status: u16, message: String },

    /// Relay/infrastructure error, detected via `x-relay-error: true` header (JS: FunctionsRelayError).
    #[error("Functions relay error ({status}): {message}")]
    RelayError { status: u16, message: String },

    /// The client or a request header could not be built.
    #[error("Invalid functions configuration: {0}")]
    InvalidConfig(#[from] ConfigurationError),

    /// The function name was empty or contained a path separator.
    #[error("Invalid function name: {0:?}")]
    InvalidFunctionName(String),

    /// The response body was requested as text but is not UTF-8.
    #[error("Response body is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// JSON serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// URL parsing error.
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),
}

impl From<FunctionsError> for SupabaseError {
    fn from(err: FunctionsError) -> Self {
        SupabaseError::Functions(err.to_string())
    }
}
