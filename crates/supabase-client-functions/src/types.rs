use std::collections::HashMap;
use std::fmt;

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;
use supabase_client_core::ApiResponse;

use crate::error::FunctionsError;

/// Supabase Edge Function deployment regions.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FunctionRegion {
    #[default]
    Any,
    UsEast1,
    UsWest1,
    EuWest1,
    EuWest2,
    EuCentral1,
    ApSoutheast1,
    ApNortheast1,
    ApSouth1,
    SaEast1,
    CaCentral1,
    Custom(String),
}

impl fmt::Display for FunctionRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => write!(f, "any"),
            Self::UsEast1 => write!(f, "us-east-1"),
            Self::UsWest1 => write!(f, "us-west-1"),
            Self::EuWest1 => write!(f, "eu-west-1"),
            Self::EuWest2 => write!(f, "eu-west-2"),
            Self::EuCentral1 => write!(f, "eu-central-1"),
            Self::ApSoutheast1 => write!(f, "ap-southeast-1"),
            Self::ApNortheast1 => write!(f, "ap-northeast-1"),
            Self::ApSouth1 => write!(f, "ap-south-1"),
            Self::SaEast1 => write!(f, "sa-east-1"),
            Self::CaCentral1 => write!(f, "ca-central-1"),
            Self::Custom(s) => write!(f, "{}", s),
        }
    }
}

/// Body types for Edge Function invocation.
#[derive(Debug, Clone, Default)]
pub enum InvokeBody {
    #[default]
    None,
    Json(Value),
    Bytes(Vec<u8>),
    Text(String),
}

impl InvokeBody {
    /// Default content type for this body kind.
    pub(crate) fn content_type(&self) -> Option<&'static str> {
        match self {
            Self::None => None,
            Self::Json(_) => Some("application/json"),
            Self::Bytes(_) => Some("application/octet-stream"),
            Self::Text(_) => Some("text/plain"),
        }
    }
}

/// Options for invoking an Edge Function.
///
/// # Example
/// ```
/// use supabase_client_functions::InvokeOptions;
/// use serde_json::json;
///
/// let opts = InvokeOptions::new()
///     .body(json!({"name": "World"}))
///     .header("x-custom", "value");
/// ```
#[derive(Debug, Clone)]
pub struct InvokeOptions {
    pub(crate) body: InvokeBody,
    pub(crate) method: Method,
    pub(crate) headers: HashMap<String, String>,
    pub(crate) region: FunctionRegion,
    pub(crate) content_type: Option<String>,
}

impl Default for InvokeOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl InvokeOptions {
    /// POST with no body.
    pub fn new() -> Self {
        Self {
            body: InvokeBody::None,
            method: Method::POST,
            headers: HashMap::new(),
            region: FunctionRegion::Any,
            content_type: None,
        }
    }

    /// Set a JSON body.
    pub fn body(mut self, value: Value) -> Self {
        self.body = InvokeBody::Json(value);
        self
    }

    pub fn body_bytes(mut self, bytes: Vec<u8>) -> Self {
        self.body = InvokeBody::Bytes(bytes);
        self
    }

    pub fn body_text(mut self, text: impl Into<String>) -> Self {
        self.body = InvokeBody::Text(text.into());
        self
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Add a header for this call only. Overrides the client's headers,
    /// including `Authorization`.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    pub fn headers(mut self, headers: HashMap<String, String>) -> Self {
        self.headers.extend(headers);
        self
    }

    /// Route the call to a region; `Any` sends no region header.
    pub fn region(mut self, region: FunctionRegion) -> Self {
        self.region = region;
        self
    }

    /// Override the Content-Type header explicitly.
    pub fn content_type(mut self, ct: impl Into<String>) -> Self {
        self.content_type = Some(ct.into());
        self
    }
}

/// Response from an Edge Function invocation.
#[derive(Debug, Clone)]
pub struct FunctionResponse {
    inner: ApiResponse,
}

impl FunctionResponse {
    pub(crate) fn new(inner: ApiResponse) -> Self {
        Self { inner }
    }

    pub fn status(&self) -> u16 {
        self.inner.status
    }

    /// Get a response header (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.inner.header(name)
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// Deserialize the response body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, FunctionsError> {
        Ok(self.inner.json()?)
    }

    /// The body as a UTF-8 string.
    pub fn text(&self) -> Result<String, FunctionsError> {
        Ok(String::from_utf8(self.inner.body.clone())?)
    }

    pub fn bytes(&self) -> &[u8] {
        &self.inner.body
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.inner.body
    }
}
