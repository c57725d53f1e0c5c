//! Transport-neutral request and response values.
//!
//! Collaborators build an [`ApiRequest`] once and hand it to either
//! [`ApiRequest::send`] or [`ApiRequest::send_blocking`], depending on mode.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::trace;

/// A fully-built HTTP request, not yet bound to a transport.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
}

impl ApiRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::POST, url)
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Serialize `body` as JSON and set the content type.
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self, serde_json::Error> {
        self.body = Some(serde_json::to_vec(body)?);
        self.headers
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(self)
    }

    pub fn body(mut self, body: Vec<u8>) -> Self {
        self.body = Some(body);
        self
    }

    /// Send through an async transport.
    pub async fn send(self, http: &reqwest::Client) -> Result<ApiResponse, reqwest::Error> {
        trace!(method = %self.method, url = %self.url, "sending request");
        let mut request = http.request(self.method, self.url.as_str()).headers(self.headers);
        if let Some(body) = self.body {
            request = request.body(body);
        }
        let response = request.send().await?;
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.bytes().await?.to_vec();
        Ok(ApiResponse {
            status,
            headers,
            body,
        })
    }

    /// Send through a blocking transport.
    pub fn send_blocking(
        self,
        http: &reqwest::blocking::Client,
    ) -> Result<ApiResponse, reqwest::Error> {
        trace!(method = %self.method, url = %self.url, "sending blocking request");
        let mut request = http.request(self.method, self.url.as_str()).headers(self.headers);
        if let Some(body) = self.body {
            request = request.body(body);
        }
        let response = request.send()?;
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.bytes()?.to_vec();
        Ok(ApiResponse {
            status,
            headers,
            body,
        })
    }
}

/// A received HTTP response with its body already read.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Header value as a string, if present and valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_body_sets_content_type() {
        let req = ApiRequest::post("http://localhost/x")
            .json(&serde_json::json!({"a": 1}))
            .unwrap();
        assert_eq!(req.headers.get(CONTENT_TYPE).unwrap(), "application/json");
        assert_eq!(req.body.as_deref(), Some(br#"{"a":1}"#.as_slice()));
    }

    #[test]
    fn response_helpers() {
        let mut headers = HeaderMap::new();
        headers.insert("content-range", HeaderValue::from_static("0-1/2"));
        let resp = ApiResponse {
            status: 206,
            headers,
            body: br#"[1,2]"#.to_vec(),
        };
        assert!(resp.is_success());
        assert_eq!(resp.json::<Vec<i32>>().unwrap(), vec![1, 2]);
        assert_eq!(resp.header("content-range"), Some("0-1/2"));
        assert_eq!(resp.text(), "[1,2]");
    }
}
