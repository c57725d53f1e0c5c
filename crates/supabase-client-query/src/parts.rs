use serde_json::Value as JsonValue;

use crate::error::PostgrestError;

/// A single `column=operator.value` query parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterCondition {
    pub column: String,
    pub expression: String,
}

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOperator {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl FilterOperator {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Neq => "neq",
            Self::Gt => "gt",
            Self::Gte => "gte",
            Self::Lt => "lt",
            Self::Lte => "lte",
        }
    }
}

/// Pattern matching operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternOperator {
    Like,
    ILike,
}

impl PatternOperator {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Like => "like",
            Self::ILike => "ilike",
        }
    }
}

/// Right-hand side of an `is` filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IsValue {
    Null,
    NotNull,
    True,
    False,
}

impl IsValue {
    pub(crate) fn render(self) -> &'static str {
        match self {
            Self::Null => "is.null",
            Self::NotNull => "not.is.null",
            Self::True => "is.true",
            Self::False => "is.false",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderClause {
    pub column: String,
    pub direction: OrderDirection,
    pub nulls: Option<NullsPosition>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderDirection {
    #[default]
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NullsPosition {
    First,
    Last,
}

/// Row counting strategy, sent through the `Prefer` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CountOption {
    #[default]
    None,
    Exact,
    Planned,
    Estimated,
}

impl CountOption {
    pub(crate) fn prefer(self) -> Option<&'static str> {
        match self {
            Self::None => None,
            Self::Exact => Some("count=exact"),
            Self::Planned => Some("count=planned"),
            Self::Estimated => Some("count=estimated"),
        }
    }
}

/// What kind of request the builder will send.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    Select,
    Insert,
    Upsert { on_conflict: Option<String> },
    Update,
    Delete,
    Rpc,
}

impl Operation {
    /// Reads carry the schema in `Accept-Profile`, writes in `Content-Profile`.
    pub fn is_read(&self) -> bool {
        matches!(self, Self::Select)
    }
}

/// Everything a PostgREST request is rendered from.
#[derive(Debug, Clone)]
pub struct QueryParts {
    /// Table name, or function name for RPC.
    pub target: String,
    pub operation: Operation,
    pub columns: Option<String>,
    pub filters: Vec<FilterCondition>,
    pub orders: Vec<OrderClause>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub single: bool,
    pub maybe_single: bool,
    pub count: CountOption,
    pub body: Option<JsonValue>,
    pub returning: bool,
    /// First builder misuse, reported when the request is executed.
    pub invalid: Option<String>,
}

impl QueryParts {
    pub fn new(target: impl Into<String>, operation: Operation) -> Self {
        Self {
            target: target.into(),
            operation,
            columns: None,
            filters: Vec::new(),
            orders: Vec::new(),
            limit: None,
            offset: None,
            single: false,
            maybe_single: false,
            count: CountOption::None,
            body: None,
            returning: true,
            invalid: None,
        }
    }

    /// Remember the first misuse; later ones are dropped.
    pub fn reject(&mut self, reason: String) {
        tracing::error!(target = %self.target, %reason, "invalid query builder call");
        self.invalid.get_or_insert(reason);
    }

    pub fn check(&self) -> Result<(), PostgrestError> {
        match &self.invalid {
            Some(reason) => Err(PostgrestError::InvalidQuery(reason.clone())),
            None => Ok(()),
        }
    }
}

/// Validate a column name used in a filter or order clause.
pub fn validate_column_name(name: &str) -> Result<(), String> {
    validate_identifier(name, "Column")
}

/// Validate a table, function or schema name.
pub fn validate_identifier(name: &str, kind: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err(format!("{kind} name cannot be empty"));
    }
    if name.contains('"') || name.contains(';') || name.contains("--") || name.contains('&') {
        return Err(format!(
            "Invalid {kind} name: {name:?} (contains prohibited characters)"
        ));
    }
    Ok(())
}

/// Quote a filter value when it contains PostgREST reserved characters.
pub fn sanitize_value(value: &str) -> String {
    if value.contains([',', '.', ':', '(', ')']) {
        format!("\"{value}\"")
    } else {
        value.to_string()
    }
}
