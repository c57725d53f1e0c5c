//! Syntactic checks on the project URL and API key.
//!
//! Nothing here touches the network or verifies a signature; the key is only
//! checked to look like a compact `header.payload.signature` token.

use crate::error::ConfigurationError;

/// Check that `url` is an `http://` or `https://` URL with something after the scheme.
pub fn validate_url(url: &str) -> Result<(), ConfigurationError> {
    if url.is_empty() {
        return Err(ConfigurationError::MissingUrl);
    }
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .ok_or_else(|| ConfigurationError::InvalidUrl(url.to_string()))?;
    match rest.chars().next() {
        Some(c) if c != '\n' => Ok(()),
        _ => Err(ConfigurationError::InvalidUrl(url.to_string())),
    }
}

fn is_segment_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '=')
}

fn is_signature_char(c: char) -> bool {
    is_segment_char(c) || matches!(c, '.' | '+' | '/')
}

/// Check that `key` has compact token syntax.
///
/// Two non-empty segments of `[A-Za-z0-9-_=]` joined by `.`, then an optional
/// `.` and a possibly empty signature of `[A-Za-z0-9-_.+/=]`.
pub fn validate_api_key(key: &str) -> Result<(), ConfigurationError> {
    if key.is_empty() {
        return Err(ConfigurationError::MissingKey);
    }
    let (header, rest) = key
        .split_once('.')
        .ok_or(ConfigurationError::InvalidApiKey)?;
    if header.is_empty() || !header.chars().all(is_segment_char) {
        return Err(ConfigurationError::InvalidApiKey);
    }

    let payload_len = rest
        .find(|c: char| !is_segment_char(c))
        .unwrap_or(rest.len());
    if payload_len == 0 {
        return Err(ConfigurationError::InvalidApiKey);
    }
    let tail = &rest[payload_len..];
    let signature = tail.strip_prefix('.').unwrap_or(tail);
    if !signature.chars().all(is_signature_char) {
        return Err(ConfigurationError::InvalidApiKey);
    }
    Ok(())
}

/// Run both checks; the URL is checked first.
pub fn validate_credentials(url: &str, key: &str) -> Result<(), ConfigurationError> {
    if url.is_empty() {
        return Err(ConfigurationError::MissingUrl);
    }
    if key.is_empty() {
        return Err(ConfigurationError::MissingKey);
    }
    validate_url(url)?;
    validate_api_key(key)
}
