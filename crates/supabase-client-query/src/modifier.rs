use crate::filter::Filterable;
use crate::parts::{validate_column_name, CountOption, NullsPosition, OrderClause, OrderDirection};

/// Trait providing modifier methods (order, limit, range, single, count).
pub trait Modifiable: Filterable {
    /// Order by a column.
    fn order(mut self, column: &str, direction: OrderDirection) -> Self {
        if let Err(e) = validate_column_name(column) {
            self.parts_mut().reject(e);
            return self;
        }
        self.parts_mut().orders.push(OrderClause {
            column: column.to_string(),
            direction,
            nulls: None,
        });
        self
    }

    /// Order by a column with explicit nulls positioning.
    fn order_with_nulls(
        mut self,
        column: &str,
        direction: OrderDirection,
        nulls: NullsPosition,
    ) -> Self {
        if let Err(e) = validate_column_name(column) {
            self.parts_mut().reject(e);
            return self;
        }
        self.parts_mut().orders.push(OrderClause {
            column: column.to_string(),
            direction,
            nulls: Some(nulls),
        });
        self
    }

    /// Limit the number of rows returned.
    fn limit(mut self, count: i64) -> Self {
        if count < 0 {
            self.parts_mut().reject(format!("Invalid limit: {count}"));
            return self;
        }
        self.parts_mut().limit = Some(count);
        self
    }

    /// Rows `from..=to`, zero-based.
    ///
    /// A negative start, an empty range or one whose length overflows `i64`
    /// is rejected.
    fn range(mut self, from: i64, to: i64) -> Self {
        let len = (from >= 0)
            .then(|| to.checked_sub(from).and_then(|d| d.checked_add(1)))
            .flatten()
            .filter(|len| *len > 0);
        let Some(len) = len else {
            self.parts_mut()
                .reject(format!("Invalid range: {from}..={to}"));
            return self;
        };
        self.parts_mut().offset = Some(from);
        self.parts_mut().limit = Some(len);
        self
    }

    /// Expect exactly one row, returned as an object.
    fn single(mut self) -> Self {
        self.parts_mut().single = true;
        self
    }

    /// Expect zero or one row.
    fn maybe_single(mut self) -> Self {
        self.parts_mut().maybe_single = true;
        self
    }

    /// Request an exact row count.
    fn count(mut self) -> Self {
        self.parts_mut().count = CountOption::Exact;
        self
    }

    /// Request a row count with a specific counting strategy.
    fn count_option(mut self, option: CountOption) -> Self {
        self.parts_mut().count = option;
        self
    }
}
