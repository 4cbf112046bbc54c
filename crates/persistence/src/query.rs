//! Query model shared by the gateway and all backends.
//!
//! A [`SelectRequest`] names a table, the relations to embed, a list of
//! filters and an optional ordering. Backends translate it into their own
//! dialect (PostgREST query strings, in-memory scans).

#![allow(missing_docs)]

use std::fmt;

use serde::{Deserialize, Serialize};

/// Tables exposed by the hosted store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    Labs,
    Tests,
    LabTestPrices,
    Bookings,
}

impl Table {
    /// Returns the table name as used in backend URLs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Table::Labs => "labs",
            Table::Tests => "tests",
            Table::LabTestPrices => "lab_test_prices",
            Table::Bookings => "bookings",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A relation embedded into each returned row through a foreign key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Embed {
    /// `lab_id -> labs`, embedded as `lab`.
    Lab,
    /// `test_id -> tests`, embedded as `test`.
    Test,
}

impl Embed {
    /// Key under which the embedded row appears.
    pub fn alias(&self) -> &'static str {
        match self {
            Embed::Lab => "lab",
            Embed::Test => "test",
        }
    }

    /// Foreign key column on the parent row.
    pub fn foreign_key(&self) -> &'static str {
        match self {
            Embed::Lab => "lab_id",
            Embed::Test => "test_id",
        }
    }

    /// Table the foreign key points at.
    pub fn target(&self) -> Table {
        match self {
            Embed::Lab => Table::Labs,
            Embed::Test => Table::Tests,
        }
    }
}

/// A row filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    /// Exact match on a column.
    Eq { column: String, value: String },
    /// Case-insensitive substring match on a text column.
    Contains { column: String, needle: String },
}

impl Filter {
    /// `column = value`.
    pub fn eq(column: impl Into<String>, value: impl Into<String>) -> Self {
        Filter::Eq {
            column: column.into(),
            value: value.into(),
        }
    }

    /// `column ILIKE %needle%`.
    pub fn contains(column: impl Into<String>, needle: impl Into<String>) -> Self {
        Filter::Contains {
            column: column.into(),
            needle: needle.into(),
        }
    }

    /// The filtered column.
    pub fn column(&self) -> &str {
        match self {
            Filter::Eq { column, .. } | Filter::Contains { column, .. } => column,
        }
    }
}

/// Ascending order on a named column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub column: String,
}

impl Order {
    /// Orders ascending by `column`.
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
        }
    }
}

/// A read against one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectRequest {
    pub table: Table,
    pub embeds: Vec<Embed>,
    pub filters: Vec<Filter>,
    pub order: Option<Order>,
    /// Maximum number of rows to return.
    pub limit: Option<usize>,
}

impl SelectRequest {
    /// Selects every column of `table` with no filters.
    pub fn new(table: Table) -> Self {
        Self {
            table,
            embeds: Vec::new(),
            filters: Vec::new(),
            order: None,
            limit: None,
        }
    }

    /// Adds an embedded relation.
    pub fn with_embed(mut self, embed: Embed) -> Self {
        if !self.embeds.contains(&embed) {
            self.embeds.push(embed);
        }
        self
    }

    /// Adds embedded relations.
    pub fn with_embeds(mut self, embeds: &[Embed]) -> Self {
        for embed in embeds {
            self = self.with_embed(*embed);
        }
        self
    }

    /// Adds a filter.
    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Adds filters.
    pub fn with_filters(mut self, filters: impl IntoIterator<Item = Filter>) -> Self {
        self.filters.extend(filters);
        self
    }

    /// Sets the ordering.
    pub fn with_order(mut self, order: Option<Order>) -> Self {
        self.order = order;
        self
    }

    /// Caps the number of rows returned.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Builds the PostgREST `select` expression, e.g. `*,lab:labs(*)`.
    pub fn select_expression(&self) -> String {
        let mut expr = String::from("*");
        for embed in &self.embeds {
            expr.push_str(&format!(",{}:{}(*)", embed.alias(), embed.target()));
        }
        expr
    }
}

/// A write of one or more rows into a table.
#[derive(Debug, Clone, PartialEq)]
pub struct InsertRequest {
    pub table: Table,
    pub rows: Vec<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_expression_plain() {
        let request = SelectRequest::new(Table::Tests);
        assert_eq!(request.select_expression(), "*");
    }

    #[test]
    fn test_select_expression_two_level_join() {
        let request = SelectRequest::new(Table::LabTestPrices)
            .with_embeds(&[Embed::Lab, Embed::Test, Embed::Lab]);
        assert_eq!(request.embeds.len(), 2);
        assert_eq!(
            request.select_expression(),
            "*,lab:labs(*),test:tests(*)"
        );
    }

    #[test]
    fn test_filter_column() {
        assert_eq!(Filter::eq("city", "Jaipur").column(), "city");
        assert_eq!(Filter::contains("name", "sugar").column(), "name");
    }
}
