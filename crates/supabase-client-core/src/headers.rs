use std::collections::HashMap;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use crate::error::ConfigurationError;

pub const AUTHORIZATION: &str = "Authorization";
pub const API_KEY: &str = "apiKey";

/// `Bearer <token>`.
pub fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}

/// The single-entry `Authorization` mapping for `token`.
pub fn auth_header(token: &str) -> HashMap<String, String> {
    HashMap::from([(AUTHORIZATION.to_string(), bearer(token))])
}

/// Headers identifying the project: the API key and a bearer built from it.
pub fn identity_headers(api_key: &str) -> HashMap<String, String> {
    HashMap::from([
        (API_KEY.to_string(), api_key.to_string()),
        (AUTHORIZATION.to_string(), bearer(api_key)),
    ])
}

/// Convert a string mapping into a `HeaderMap`, rejecting names or values
/// that are not valid HTTP.
pub fn to_header_map(headers: &HashMap<String, String>) -> Result<HeaderMap, ConfigurationError> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let header_name =
            HeaderName::from_bytes(name.as_bytes()).map_err(|e| ConfigurationError::InvalidHeader {
                name: name.clone(),
                reason: e.to_string(),
            })?;
        let header_value =
            HeaderValue::from_str(value).map_err(|e| ConfigurationError::InvalidHeader {
                name: name.clone(),
                reason: e.to_string(),
            })?;
        map.insert(header_name, header_value);
    }
    Ok(map)
}
