use std::collections::HashMap;
use std::time::Duration;

use serde::Serialize;
use supabase_client_core::headers::to_header_map;
use supabase_client_core::Mode;

use crate::builder::{FilterBuilder, QueryBuilder};
use crate::error::PostgrestError;
use crate::parts::{Operation, QueryParts};

/// Settings the database client is built from.
#[derive(Debug, Clone)]
pub struct PostgrestConfig {
    /// The REST endpoint, e.g. `https://your-project.supabase.co/rest/v1`.
    pub url: String,
    /// Headers sent with every request.
    pub headers: HashMap<String, String>,
    /// Default schema for requests.
    pub schema: String,
    pub timeout: Option<Duration>,
}

/// HTTP client for the Supabase PostgREST API.
///
/// `PostgrestClient<Blocking>` builders expose a plain `execute`,
/// `PostgrestClient<NonBlocking>` builders an `async fn execute`.
#[derive(Debug, Clone)]
pub struct PostgrestClient<M: Mode> {
    pub(crate) http: M::Http,
    url: String,
    headers: HashMap<String, String>,
    schema: String,
}

impl<M: Mode> PostgrestClient<M> {
    pub fn new(config: PostgrestConfig) -> Result<Self, PostgrestError> {
        let header_map = to_header_map(&config.headers)?;
        let http = M::build_http(header_map, config.timeout)?;
        tracing::debug!(url = %config.url, schema = %config.schema, mode = %M::EXECUTION, "created postgrest client");
        Ok(Self {
            http,
            url: config.url.trim_end_matches('/').to_string(),
            headers: config.headers,
            schema: config.schema,
        })
    }

    /// The REST endpoint.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Headers every request carries.
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    pub fn schema_name(&self) -> &str {
        &self.schema
    }

    /// A client sharing this one's transport but targeting another schema.
    pub fn schema(&self, schema: &str) -> Self {
        Self {
            http: self.http.clone(),
            url: self.url.clone(),
            headers: self.headers.clone(),
            schema: schema.to_string(),
        }
    }

    /// Start a query on a table or view.
    pub fn from(&self, table: &str) -> QueryBuilder<M> {
        QueryBuilder::new(self.clone(), table)
    }

    /// Call a stored function. The result can be filtered like a table.
    pub fn rpc<T: Serialize + ?Sized>(&self, function: &str, params: &T) -> FilterBuilder<M> {
        let mut parts = QueryParts::new(function, Operation::Rpc);
        match serde_json::to_value(params) {
            Ok(body) => parts.body = Some(body),
            Err(e) => parts.reject(format!("rpc params are not serializable: {e}")),
        }
        FilterBuilder::new(self.clone(), parts)
    }
}
