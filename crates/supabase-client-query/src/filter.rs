use std::fmt::Display;

use crate::parts::{
    sanitize_value, validate_column_name, FilterCondition, FilterOperator, IsValue,
    PatternOperator, QueryParts,
};

/// Trait providing all filter methods for query builders.
///
/// Filters render to PostgREST query parameters (`column=op.value`). An
/// invalid column name is recorded on the builder and reported by `execute`.
pub trait Filterable: Sized {
    /// Get a mutable reference to the request parts.
    fn parts_mut(&mut self) -> &mut QueryParts;

    /// Append a raw `column=expression` filter.
    fn filter(mut self, column: &str, operator: &str, value: impl Display) -> Self {
        if let Err(e) = validate_column_name(column) {
            self.parts_mut().reject(e);
            return self;
        }
        self.parts_mut().filters.push(FilterCondition {
            column: column.to_string(),
            expression: format!("{operator}.{value}"),
        });
        self
    }

    /// Filter: column = value
    fn eq(self, column: &str, value: impl Display) -> Self {
        self.compare(column, FilterOperator::Eq, value)
    }

    /// Filter: column != value
    fn neq(self, column: &str, value: impl Display) -> Self {
        self.compare(column, FilterOperator::Neq, value)
    }

    /// Filter: column > value
    fn gt(self, column: &str, value: impl Display) -> Self {
        self.compare(column, FilterOperator::Gt, value)
    }

    /// Filter: column >= value
    fn gte(self, column: &str, value: impl Display) -> Self {
        self.compare(column, FilterOperator::Gte, value)
    }

    /// Filter: column < value
    fn lt(self, column: &str, value: impl Display) -> Self {
        self.compare(column, FilterOperator::Lt, value)
    }

    /// Filter: column <= value
    fn lte(self, column: &str, value: impl Display) -> Self {
        self.compare(column, FilterOperator::Lte, value)
    }

    fn compare(self, column: &str, operator: FilterOperator, value: impl Display) -> Self {
        self.filter(column, operator.as_str(), value)
    }

    /// Filter: column LIKE pattern (`*` is the wildcard)
    fn like(self, column: &str, pattern: impl Display) -> Self {
        self.filter(column, PatternOperator::Like.as_str(), pattern)
    }

    /// Filter: column ILIKE pattern (case-insensitive)
    fn ilike(self, column: &str, pattern: impl Display) -> Self {
        self.filter(column, PatternOperator::ILike.as_str(), pattern)
    }

    /// Filter: column IS NULL / IS NOT NULL / IS TRUE / IS FALSE
    fn is(mut self, column: &str, value: IsValue) -> Self {
        if let Err(e) = validate_column_name(column) {
            self.parts_mut().reject(e);
            return self;
        }
        self.parts_mut().filters.push(FilterCondition {
            column: column.to_string(),
            expression: value.render().to_string(),
        });
        self
    }

    /// Filter: column IN (values)
    fn in_<I, V>(self, column: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Display,
    {
        let list = values
            .into_iter()
            .map(|v| sanitize_value(&v.to_string()))
            .collect::<Vec<_>>()
            .join(",");
        self.filter(column, "in", format!("({list})"))
    }

    /// Negate a comparison: `column=not.op.value`.
    fn not(self, column: &str, operator: FilterOperator, value: impl Display) -> Self {
        self.filter(column, &format!("not.{}", operator.as_str()), value)
    }

    /// Raw PostgREST `or` group, e.g. `"id.eq.1,name.eq.bob"`.
    fn or(mut self, filters: &str) -> Self {
        self.parts_mut().filters.push(FilterCondition {
            column: "or".to_string(),
            expression: format!("({filters})"),
        });
        self
    }
}
