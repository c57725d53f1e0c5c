use std::collections::HashMap;
use std::time::Duration;

use reqwest::header::{HeaderValue, CONTENT_TYPE};
use supabase_client_core::headers::to_header_map;
use supabase_client_core::{ApiRequest, ApiResponse, Blocking, Mode, NonBlocking};
use tracing::debug;
use url::Url;

use crate::error::{FunctionsApiErrorResponse, FunctionsError};
use crate::types::*;

const REGION_HEADER: &str = "x-region";
const RELAY_ERROR_HEADER: &str = "x-relay-error";

/// HTTP client for Supabase Edge Functions.
///
/// Communicates with Edge Functions at `/functions/v1/{function_name}`.
///
/// # Example
/// ```ignore
/// use supabase_client_functions::InvokeOptions;
/// use serde_json::json;
///
/// let response = functions.invoke("hello", InvokeOptions::new()
///     .body(json!({"name": "World"}))
/// ).await?;
/// let data: serde_json::Value = response.json()?;
/// ```
#[derive(Debug, Clone)]
pub struct FunctionsClient<M: Mode> {
    http: M::Http,
    base_url: Url,
    headers: HashMap<String, String>,
}

impl<M: Mode> FunctionsClient<M> {
    /// Create a new Edge Functions client.
    ///
    /// `url` is the functions endpoint (e.g. `https://your-project.supabase.co/functions/v1`).
    pub fn new(
        url: &str,
        headers: &HashMap<String, String>,
        timeout: Option<Duration>,
    ) -> Result<Self, FunctionsError> {
        let base_url = Url::parse(url.trim_end_matches('/'))?;
        let http = M::build_http(to_header_map(headers)?, timeout)?;
        Ok(Self {
            http,
            base_url,
            headers: headers.clone(),
        })
    }

    /// Get the base URL for the functions endpoint.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Headers every invocation carries.
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Render an invocation without sending it.
    pub fn build_request(
        &self,
        function_name: &str,
        options: InvokeOptions,
    ) -> Result<ApiRequest, FunctionsError> {
        if function_name.is_empty() || function_name.contains('/') {
            return Err(FunctionsError::InvalidFunctionName(function_name.to_string()));
        }
        let url = format!("{}/{}", self.base_url.as_str().trim_end_matches('/'), function_name);
        debug!(function = function_name, method = %options.method, "invoking edge function");

        let mut request = ApiRequest::new(options.method, url);

        if let Some(ct) = options.content_type.as_deref().or(options.body.content_type()) {
            request = request.header(CONTENT_TYPE, content_type_value(ct)?);
        }

        if options.region != FunctionRegion::Any {
            let region = HashMap::from([(REGION_HEADER.to_string(), options.region.to_string())]);
            request.headers.extend(to_header_map(&region)?);
        }

        request.headers.extend(to_header_map(&options.headers)?);

        let body = match options.body {
            InvokeBody::None => None,
            InvokeBody::Json(value) => Some(serde_json::to_vec(&value)?),
            InvokeBody::Bytes(bytes) => Some(bytes),
            InvokeBody::Text(text) => Some(text.into_bytes()),
        };
        if let Some(body) = body {
            request = request.body(body);
        }

        Ok(request)
    }
}

fn content_type_value(ct: &str) -> Result<HeaderValue, FunctionsError> {
    HeaderValue::from_str(ct).map_err(|e| {
        FunctionsError::InvalidConfig(supabase_client_core::ConfigurationError::InvalidHeader {
            name: CONTENT_TYPE.to_string(),
            reason: e.to_string(),
        })
    })
}

/// Classify the response: relay errors first, then non-2xx statuses.
fn into_result(resp: ApiResponse) -> Result<FunctionResponse, FunctionsError> {
    let is_relay_error = resp.header(RELAY_ERROR_HEADER) == Some("true");
    if is_relay_error {
        let message = parse_error_message(&resp.body);
        debug!(status = resp.status, message = %message, "relay error from edge function");
        return Err(FunctionsError::RelayError {
            status: resp.status,
            message,
        });
    }
    if resp.status >= 400 {
        let message = parse_error_message(&resp.body);
        debug!(status = resp.status, message = %message, "HTTP error from edge function");
        return Err(FunctionsError::HttpError {
            status: resp.status,
            message,
        });
    }
    Ok(FunctionResponse::new(resp))
}

/// Try to parse an error message from the response body (JSON first, then plain text).
fn parse_error_message(body: &[u8]) -> String {
    if let Ok(api_err) = serde_json::from_slice::<FunctionsApiErrorResponse>(body) {
        return api_err.error_message();
    }
    String::from_utf8_lossy(body).into_owned()
}

impl FunctionsClient<Blocking> {
    /// Invoke an Edge Function.
    ///
    /// # Errors
    /// * [`FunctionsError::RelayError`] if Supabase infrastructure returned an error (`x-relay-error: true`).
    /// * [`FunctionsError::HttpError`] if the function returned a non-2xx status.
    /// * [`FunctionsError::Http`] on network failure.
    pub fn invoke(
        &self,
        function_name: &str,
        options: InvokeOptions,
    ) -> Result<FunctionResponse, FunctionsError> {
        let request = self.build_request(function_name, options)?;
        into_result(request.send_blocking(&self.http)?)
    }
}

impl FunctionsClient<NonBlocking> {
    /// Invoke an Edge Function.
    ///
    /// # Errors
    /// * [`FunctionsError::RelayError`] if Supabase infrastructure returned an error (`x-relay-error: true`).
    /// * [`FunctionsError::HttpError`] if the function returned a non-2xx status.
    /// * [`FunctionsError::Http`] on network failure.
    pub async fn invoke(
        &self,
        function_name: &str,
        options: InvokeOptions,
    ) -> Result<FunctionResponse, FunctionsError> {
        let request = self.build_request(function_name, options)?;
        into_result(request.send(&self.http).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderMap;
    use reqwest::Method;

    fn client() -> FunctionsClient<NonBlocking> {
        FunctionsClient::new(
            "https://example.supabase.co/functions/v1/",
            &HashMap::from([("apiKey".to_string(), "test-key".to_string())]),
            Some(Duration::from_secs(5)),
        )
        .unwrap()
    }

    fn api_response(status: u16, relay: bool, body: &str) -> ApiResponse {
        let mut headers = HeaderMap::new();
        if relay {
            headers.insert(RELAY_ERROR_HEADER, HeaderValue::from_static("true"));
        }
        ApiResponse {
            status,
            headers,
            body: body.as_bytes().to_vec(),
        }
    }

    #[test]
    fn client_base_url_trailing_slash() {
        assert_eq!(client().base_url().path(), "/functions/v1");
    }

    #[test]
    fn json_invocation() {
        let req = client()
            .build_request(
                "hello",
                InvokeOptions::new()
                    .body(serde_json::json!({"name": "World"}))
                    .region(FunctionRegion::EuWest1),
            )
            .unwrap();
        assert_eq!(req.method, Method::POST);
        assert_eq!(req.url, "https://example.supabase.co/functions/v1/hello");
        assert_eq!(req.headers.get("content-type").unwrap(), "application/json");
        assert_eq!(req.headers.get("x-region").unwrap(), "eu-west-1");
        assert_eq!(req.body.as_deref(), Some(br#"{"name":"World"}"#.as_slice()));
    }

    #[test]
    fn per_call_headers_override() {
        let req = client()
            .build_request(
                "hello",
                InvokeOptions::new()
                    .method(Method::GET)
                    .header("Authorization", "Bearer user-jwt")
                    .content_type("text/csv"),
            )
            .unwrap();
        assert_eq!(req.method, Method::GET);
        assert_eq!(req.headers.get("authorization").unwrap(), "Bearer user-jwt");
        assert_eq!(req.headers.get("content-type").unwrap(), "text/csv");
        assert!(req.headers.get("x-region").is_none());
        assert!(req.body.is_none());
    }

    #[test]
    fn invalid_function_names() {
        for name in ["", "a/b"] {
            assert!(matches!(
                client().build_request(name, InvokeOptions::new()),
                Err(FunctionsError::InvalidFunctionName(_))
            ));
        }
    }

    #[test]
    fn relay_error_takes_precedence() {
        let err = into_result(api_response(502, true, r#"{"message":"boot failure"}"#)).unwrap_err();
        assert!(matches!(err, FunctionsError::RelayError { status: 502, ref message } if message == "boot failure"));

        let err = into_result(api_response(404, false, "not here")).unwrap_err();
        assert!(matches!(err, FunctionsError::HttpError { status: 404, ref message } if message == "not here"));

        assert_eq!(into_result(api_response(200, false, "ok")).unwrap().status(), 200);
    }

    #[test]
    fn parse_error_message_json() {
        let body = br#"{"message":"Function not found"}"#;
        assert_eq!(parse_error_message(body), "Function not found");
    }

    #[test]
    fn parse_error_message_plain_text() {
        let body = b"Something went wrong";
        assert_eq!(parse_error_message(body), "Something went wrong");
    }
}
