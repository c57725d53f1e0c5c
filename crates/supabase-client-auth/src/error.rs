use serde::Deserialize;
use supabase_client_core::{ApiResponse, ConfigurationError, SupabaseError};

/// Error response format from the GoTrue API.
///
/// GoTrue may return errors in different shapes; this covers the common fields.
#[derive(Debug, Clone, Deserialize)]
pub struct GoTrueErrorResponse {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub error_description: Option<String>,
    #[serde(default)]
    pub msg: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error_code: Option<String>,
}

impl GoTrueErrorResponse {
    /// Extract the most informative error message from the response.
    pub fn error_message(&self) -> String {
        self.msg
            .as_deref()
            .or(self.message.as_deref())
            .or(self.error_description.as_deref())
            .or(self.error.as_deref())
            .unwrap_or("Unknown error")
            .to_string()
    }
}

/// Auth-specific errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// HTTP transport error from reqwest.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// GoTrue API returned an error response.
    #[error("Auth API error ({status}): {message}")]
    Api {
        status: u16,
        message: String,
        error_code: Option<String>,
    },

    /// The client could not be built from the given settings.
    #[error("Invalid auth configuration: {0}")]
    InvalidConfig(#[from] ConfigurationError),

    /// No active session.
    #[error("No active session")]
    NoSession,

    /// A PKCE code exchange was attempted without a stored code verifier.
    #[error("No PKCE code verifier found in storage")]
    MissingCodeVerifier,

    /// JSON serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// URL parsing error.
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),
}

impl AuthError {
    /// Build an [`AuthError::Api`] from a non-2xx response.
    pub(crate) fn from_response(resp: &ApiResponse) -> Self {
        match resp.json::<GoTrueErrorResponse>() {
            Ok(body) => AuthError::Api {
                status: resp.status,
                message: body.error_message(),
                error_code: body.error_code,
            },
            Err(_) => AuthError::Api {
                status: resp.status,
                message: format!("HTTP {}", resp.status),
                error_code: None,
            },
        }
    }
}

impl From<AuthError> for SupabaseError {
    fn from(err: AuthError) -> Self {
        SupabaseError::Auth(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderMap;

    fn response(status: u16, body: &str) -> ApiResponse {
        ApiResponse {
            status,
            headers: HeaderMap::new(),
            body: body.as_bytes().to_vec(),
        }
    }

    #[test]
    fn api_error_prefers_msg_field() {
        let err = AuthError::from_response(&response(
            400,
            r#"{"msg":"Invalid login credentials","error_code":"invalid_credentials"}"#,
        ));
        match err {
            AuthError::Api {
                status,
                message,
                error_code,
            } => {
                assert_eq!(status, 400);
                assert_eq!(message, "Invalid login credentials");
                assert_eq!(error_code.as_deref(), Some("invalid_credentials"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn api_error_falls_back_to_status() {
        let err = AuthError::from_response(&response(502, "<html>bad gateway</html>"));
        assert_eq!(err.to_string(), "Auth API error (502): HTTP 502");
    }
}
