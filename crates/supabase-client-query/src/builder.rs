use serde::Serialize;
use supabase_client_core::{ApiRequest, Blocking, Mode, NonBlocking};

use crate::client::PostgrestClient;
use crate::error::PostgrestError;
use crate::filter::Filterable;
use crate::modifier::Modifiable;
use crate::parts::{validate_identifier, Operation, QueryParts};
use crate::render::build_request;
use crate::response::PostgrestResponse;

/// Entry point for a table query; pick the operation.
#[derive(Debug, Clone)]
pub struct QueryBuilder<M: Mode> {
    client: PostgrestClient<M>,
    table: String,
}

impl<M: Mode> QueryBuilder<M> {
    pub(crate) fn new(client: PostgrestClient<M>, table: &str) -> Self {
        Self {
            client,
            table: table.to_string(),
        }
    }

    fn start(self, operation: Operation) -> FilterBuilder<M> {
        let mut parts = QueryParts::new(&self.table, operation);
        if let Err(e) = validate_identifier(&self.table, "Table") {
            parts.reject(e);
        }
        FilterBuilder::new(self.client, parts)
    }

    fn start_with_body<T: Serialize + ?Sized>(
        self,
        operation: Operation,
        values: &T,
    ) -> FilterBuilder<M> {
        let mut builder = self.start(operation);
        match serde_json::to_value(values) {
            Ok(body) => builder.parts.body = Some(body),
            Err(e) => builder.parts.reject(format!("values are not serializable: {e}")),
        }
        builder
    }

    /// Select columns, e.g. `"*"` or `"id,name"`.
    pub fn select(self, columns: &str) -> FilterBuilder<M> {
        let mut builder = self.start(Operation::Select);
        builder.parts.columns = Some(columns.to_string());
        builder
    }

    /// Insert one row (object) or many (array).
    pub fn insert<T: Serialize + ?Sized>(self, values: &T) -> FilterBuilder<M> {
        self.start_with_body(Operation::Insert, values)
    }

    /// Insert, merging rows that collide on the primary key
    /// (or on [`on_conflict`](FilterBuilder::on_conflict) columns).
    pub fn upsert<T: Serialize + ?Sized>(self, values: &T) -> FilterBuilder<M> {
        self.start_with_body(Operation::Upsert { on_conflict: None }, values)
    }

    /// Update the rows matched by the following filters.
    pub fn update<T: Serialize + ?Sized>(self, values: &T) -> FilterBuilder<M> {
        self.start_with_body(Operation::Update, values)
    }

    /// Delete the rows matched by the following filters.
    pub fn delete(self) -> FilterBuilder<M> {
        self.start(Operation::Delete)
    }
}

/// A query with its operation chosen; add filters and modifiers, then execute.
#[derive(Debug, Clone)]
pub struct FilterBuilder<M: Mode> {
    client: PostgrestClient<M>,
    parts: QueryParts,
}

impl<M: Mode> Filterable for FilterBuilder<M> {
    fn parts_mut(&mut self) -> &mut QueryParts {
        &mut self.parts
    }
}

impl<M: Mode> Modifiable for FilterBuilder<M> {}

impl<M: Mode> FilterBuilder<M> {
    pub(crate) fn new(client: PostgrestClient<M>, parts: QueryParts) -> Self {
        Self { client, parts }
    }

    /// Columns that decide an upsert conflict.
    pub fn on_conflict(mut self, columns: &str) -> Self {
        match &mut self.parts.operation {
            Operation::Upsert { on_conflict } => *on_conflict = Some(columns.to_string()),
            _ => self
                .parts
                .reject("on_conflict is only valid for upsert".to_string()),
        }
        self
    }

    /// Whether writes return the affected rows (the default) or nothing.
    pub fn returning(mut self, representation: bool) -> Self {
        self.parts.returning = representation;
        self
    }

    /// The parts this builder will render.
    pub fn parts(&self) -> &QueryParts {
        &self.parts
    }

    /// Render the HTTP request without sending it.
    pub fn build(&self) -> Result<ApiRequest, PostgrestError> {
        build_request(self.client.url(), self.client.schema_name(), &self.parts)
    }
}

impl FilterBuilder<Blocking> {
    /// Send the request and wait for the response.
    pub fn execute(self) -> Result<PostgrestResponse, PostgrestError> {
        let request = self.build()?;
        tracing::debug!(method = %request.method, url = %request.url, "executing PostgREST request");
        let resp = request.send_blocking(&self.client.http)?;
        PostgrestResponse::from_api(resp, &self.parts)
    }
}

impl FilterBuilder<NonBlocking> {
    /// Send the request.
    pub async fn execute(self) -> Result<PostgrestResponse, PostgrestError> {
        let request = self.build()?;
        tracing::debug!(method = %request.method, url = %request.url, "executing PostgREST request");
        let resp = request.send(&self.client.http).await?;
        PostgrestResponse::from_api(resp, &self.parts)
    }
}
