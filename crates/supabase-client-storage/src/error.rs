use serde::Deserialize;
use supabase_client_core::{ApiResponse, ConfigurationError, SupabaseError};

/// Error response format from the Supabase Storage API.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageApiErrorResponse {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, rename = "statusCode")]
    pub status_code: Option<String>,
}

impl StorageApiErrorResponse {
    /// Extract the most informative error message from the response.
    pub fn error_message(&self) -> String {
        self.message
            .as_deref()
            .or(self.error.as_deref())
            .unwrap_or("Unknown error")
            .to_string()
    }
}

/// Storage-specific errors.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// HTTP transport error from reqwest.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Storage API returned an error response.
    #[error("Storage API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The client could not be built from the given settings.
    #[error("Invalid storage configuration: {0}")]
    InvalidConfig(#[from] ConfigurationError),

    /// JSON serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// URL parsing error.
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// A bucket id or object path was empty or contained `.` or `..`.
    #[error("Invalid storage path: {0:?}")]
    InvalidPath(String),
}

impl StorageError {
    pub(crate) fn from_response(resp: &ApiResponse) -> Self {
        let message = match resp.json::<StorageApiErrorResponse>() {
            Ok(body) => body.error_message(),
            Err(_) => format!("HTTP {}", resp.status),
        };
        StorageError::Api {
            status: resp.status,
            message,
        }
    }
}

impl From<StorageError> for SupabaseError {
    fn from(err: StorageError) -> Self {
        SupabaseError::Storage(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_api() {
        let err = StorageError::Api {
            status: 404,
            message: "Not found".into(),
        };
        assert_eq!(err.to_string(), "Storage API error (404): Not found");
    }

    #[test]
    fn error_display_invalid_config() {
        let err = StorageError::InvalidConfig(ConfigurationError::MissingUrl);
        assert!(err.to_string().starts_with("Invalid storage configuration: "));
    }

    #[test]
    fn error_display_invalid_path() {
        let err = StorageError::InvalidPath("../x".into());
        assert_eq!(err.to_string(), "Invalid storage path: \"../x\"");
    }

    #[test]
    fn non_json_error_body_falls_back_to_status() {
        let resp = ApiResponse {
            status: 502,
            headers: reqwest::header::HeaderMap::new(),
            body: b"<html>".to_vec(),
        };
        assert_eq!(
            StorageError::from_response(&resp).to_string(),
            "Storage API error (502): HTTP 502"
        );
    }

    #[test]
    fn error_converts_to_supabase_error() {
        let err = StorageError::Api {
            status: 500,
            message: "Internal".into(),
        };
        let supa: SupabaseError = err.into();
        match supa {
            SupabaseError::Storage(msg) => assert!(msg.contains("Internal")),
            other => panic!("Expected Storage variant, got: {:?}", other),
        }
    }

    #[test]
    fn api_error_response_deserialization() {
        let json = r#"{"error":"Bucket not found","message":"The resource was not found","statusCode":"404"}"#;
        let resp: StorageApiErrorResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.error.as_deref(), Some("Bucket not found"));
        assert_eq!(
            resp.message.as_deref(),
            Some("The resource was not found")
        );
        assert_eq!(resp.status_code.as_deref(), Some("404"));
        // message takes priority
        assert_eq!(resp.error_message(), "The resource was not found");
    }

    #[test]
    fn api_error_response_fallback_to_error() {
        let json = r#"{"error":"Something went wrong"}"#;
        let resp: StorageApiErrorResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.error_message(), "Something went wrong");
    }

    #[test]
    fn api_error_response_unknown() {
        let json = r#"{}"#;
        let resp: StorageApiErrorResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.error_message(), "Unknown error");
    }
}
