use serde::Deserialize;
use supabase_client_core::{ApiResponse, ConfigurationError, SupabaseError};

/// PostgREST error body: `{ "message", "code", "details", "hint" }`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostgrestErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub hint: Option<String>,
}

/// Database-specific errors.
#[derive(Debug, thiserror::Error)]
pub enum PostgrestError {
    /// HTTP transport error from reqwest.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// PostgREST returned an error response.
    #[error("PostgREST error ({status}): {message}")]
    Api {
        status: u16,
        message: String,
        code: Option<String>,
        details: Option<String>,
        hint: Option<String>,
    },

    /// The builder was used with an invalid identifier or argument.
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// `single()` was requested but the result was not exactly one row.
    #[error("Expected a single row, got {0}")]
    NotSingle(usize),

    #[error("Invalid database client configuration: {0}")]
    InvalidConfig(#[from] ConfigurationError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),
}

impl PostgrestError {
    pub(crate) fn from_response(resp: &ApiResponse) -> Self {
        let body = resp.json::<PostgrestErrorBody>().unwrap_or_default();
        PostgrestError::Api {
            status: resp.status,
            message: body.message.unwrap_or_else(|| {
                let text = resp.text();
                if text.is_empty() {
                    format!("HTTP {}", resp.status)
                } else {
                    text
                }
            }),
            code: body.code,
            details: body.details,
            hint: body.hint,
        }
    }
}

impl From<PostgrestError> for SupabaseError {
    fn from(err: PostgrestError) -> Self {
        SupabaseError::Database(err.to_string())
    }
}
