//! Typed selection and ordering for listing queries
//!
//! Column names only ever come from [`Column`]; every value is passed to
//! SQLite as a bound parameter.

use rusqlite::types::Value;

use crate::models::{HomeType, ListingId};

/// A column of the listings table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Id,
    Address,
    County,
    Type,
    Income,
}

impl Column {
    pub fn name(self) -> &'static str {
        match self {
            Column::Id => "_id",
            Column::Address => "address",
            Column::County => "county",
            Column::Type => "type",
            Column::Income => "income",
        }
    }

    /// Parse a user-facing column name
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "id" | "_id" => Some(Column::Id),
            "address" => Some(Column::Address),
            "county" => Some(Column::County),
            "type" => Some(Column::Type),
            "income" => Some(Column::Income),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Like,
    IsNull,
    IsNotNull,
}

impl Comparison {
    fn operator(self) -> &'static str {
        match self {
            Comparison::Eq => "=",
            Comparison::Ne => "<>",
            Comparison::Lt => "<",
            Comparison::Le => "<=",
            Comparison::Gt => ">",
            Comparison::Ge => ">=",
            Comparison::Like => "LIKE",
            Comparison::IsNull => "IS NULL",
            Comparison::IsNotNull => "IS NOT NULL",
        }
    }

    fn takes_value(self) -> bool {
        !matches!(self, Comparison::IsNull | Comparison::IsNotNull)
    }
}

/// One `column <op> ?` term
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub column: Column,
    pub comparison: Comparison,
    pub value: Value,
}

/// Conjunction of conditions; an empty filter matches every row
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: Vec<Condition>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, column: Column, comparison: Comparison, value: impl Into<Value>) -> Self {
        self.conditions.push(Condition {
            column,
            comparison,
            value: value.into(),
        });
        self
    }

    pub fn eq(self, column: Column, value: impl Into<Value>) -> Self {
        self.with(column, Comparison::Eq, value)
    }

    pub fn is_null(self, column: Column) -> Self {
        self.with(column, Comparison::IsNull, Value::Null)
    }

    pub fn id(self, id: ListingId) -> Self {
        self.eq(Column::Id, id.get())
    }

    pub fn home_type(self, home_type: HomeType) -> Self {
        self.eq(Column::Type, home_type.code())
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Append the conditions of `other`
    pub fn and(mut self, other: &Filter) -> Self {
        self.conditions.extend(other.conditions.iter().cloned());
        self
    }

    /// Render as a `WHERE` clause (empty when there are no conditions)
    /// and the parameters to bind, in order
    pub fn to_sql(&self) -> (String, Vec<Value>) {
        self.to_sql_from(1)
    }

    /// Like [`Filter::to_sql`], numbering placeholders from `first`
    pub fn to_sql_from(&self, first: usize) -> (String, Vec<Value>) {
        if self.conditions.is_empty() {
            return (String::new(), Vec::new());
        }

        let mut terms = Vec::with_capacity(self.conditions.len());
        let mut params = Vec::new();

        for condition in &self.conditions {
            let column = quote(condition.column);
            let op = condition.comparison.operator();
            if condition.comparison.takes_value() {
                params.push(condition.value.clone());
                terms.push(format!("{} {} ?{}", column, op, first + params.len() - 1));
            } else {
                terms.push(format!("{} {}", column, op));
            }
        }

        (format!(" WHERE {}", terms.join(" AND ")), params)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortOrder {
    pub column: Column,
    pub direction: Direction,
}

impl SortOrder {
    pub fn asc(column: Column) -> Self {
        Self {
            column,
            direction: Direction::Ascending,
        }
    }

    pub fn desc(column: Column) -> Self {
        Self {
            column,
            direction: Direction::Descending,
        }
    }

    /// Render as an `ORDER BY` clause; `_id` breaks ties so order is stable
    pub fn to_sql(&self) -> String {
        let dir = match self.direction {
            Direction::Ascending => "ASC",
            Direction::Descending => "DESC",
        };
        if self.column == Column::Id {
            format!(" ORDER BY _id {}", dir)
        } else {
            format!(" ORDER BY {} {}, _id ASC", quote(self.column), dir)
        }
    }
}

fn quote(column: Column) -> String {
    format!("\"{}\"", column.name())
}
