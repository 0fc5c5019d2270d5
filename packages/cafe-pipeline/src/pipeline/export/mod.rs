//! Relational export of collected and curated tables.

pub mod bean_scores;
pub mod format;
pub mod schema;
pub mod sql;

pub use format::{escape_sql_string, format_value};
pub use schema::{check_dependency_order, Column, ColumnType, OrderViolation, RawTable, TableKind};
pub use sql::{Dataset, RelationalExporter, SqlScript};
