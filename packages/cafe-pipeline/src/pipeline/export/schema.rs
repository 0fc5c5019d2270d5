//! Table schemas for the relational export and the raw tables fed into it.

use std::fmt;

use crate::error::{ExportError, ExportResult};

/// Declared type of an exported column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Int,
    Float,
    Bool,
    Text,
}

impl ColumnType {
    pub fn name(self) -> &'static str {
        match self {
            ColumnType::Int => "int",
            ColumnType::Float => "float",
            ColumnType::Bool => "bool",
            ColumnType::Text => "text",
        }
    }
}

/// One column of a target table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub ty: ColumnType,

    /// Input tables must carry this column; others default to NULL
    pub required: bool,
}

const fn key(name: &'static str) -> Column {
    Column {
        name,
        ty: ColumnType::Int,
        required: true,
    }
}

const fn col(name: &'static str, ty: ColumnType) -> Column {
    Column {
        name,
        ty,
        required: false,
    }
}

use ColumnType::{Bool, Float, Int, Text};

const ROASTERIES: &[Column] = &[
    key("id"),
    col("name", Text),
    col("logo_url", Text),
    col("website_url", Text),
];

const BEANS: &[Column] = &[
    key("id"),
    col("roastery_id", Int),
    col("name", Text),
    col("country", Text),
    col("farm", Text),
    col("variety", Text),
    col("processing_method", Text),
    col("roasting_level", Text),
];

const STORES: &[Column] = &[
    key("id"),
    col("roastery_id", Int),
    col("owner_id", Int),
    col("name", Text),
    col("description", Text),
    col("address", Text),
    col("latitude", Float),
    col("longitude", Float),
    col("phone_number", Text),
    col("category", Text),
    col("thumbnail_url", Text),
    col("open_time", Text),
    col("close_time", Text),
    col("average_rating", Float),
    col("review_count", Int),
    col("visit_count", Int),
    col("is_closed", Bool),
];

const MENUS: &[Column] = &[
    key("id"),
    key("store_id"),
    col("name", Text),
    col("description", Text),
    col("price", Int),
    col("category", Text),
    col("image_url", Text),
];

const BEAN_FLAVOR_NOTES: &[Column] = &[key("bean_id"), key("flavor_id")];

const MENU_BEAN_MAPPINGS: &[Column] = &[
    key("id"),
    key("menu_id"),
    key("bean_id"),
    col("is_blended", Bool),
];

/// The exported tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TableKind {
    Roasteries,
    Beans,
    Stores,
    Menus,
    BeanFlavorNotes,
    MenuBeanMappings,
}

impl TableKind {
    /// Order in which INSERT blocks are written.
    pub const EMISSION_ORDER: [TableKind; 6] = [
        TableKind::Roasteries,
        TableKind::Beans,
        TableKind::Stores,
        TableKind::Menus,
        TableKind::BeanFlavorNotes,
        TableKind::MenuBeanMappings,
    ];

    /// SQL table name (also the CSV file stem).
    pub fn name(self) -> &'static str {
        match self {
            TableKind::Roasteries => "roasteries",
            TableKind::Beans => "beans",
            TableKind::Stores => "stores",
            TableKind::Menus => "menus",
            TableKind::BeanFlavorNotes => "bean_flavor_notes",
            TableKind::MenuBeanMappings => "menu_bean_mappings",
        }
    }

    /// Section title used in the generated script.
    pub fn title(self) -> &'static str {
        match self {
            TableKind::Roasteries => "Roasteries",
            TableKind::Beans => "Beans",
            TableKind::Stores => "Stores",
            TableKind::Menus => "Menus",
            TableKind::BeanFlavorNotes => "Bean Flavor Notes",
            TableKind::MenuBeanMappings => "Menu Bean Mappings",
        }
    }

    pub fn file_name(self) -> String {
        format!("{}.csv", self.name())
    }

    pub fn columns(self) -> &'static [Column] {
        match self {
            TableKind::Roasteries => ROASTERIES,
            TableKind::Beans => BEANS,
            TableKind::Stores => STORES,
            TableKind::Menus => MENUS,
            TableKind::BeanFlavorNotes => BEAN_FLAVOR_NOTES,
            TableKind::MenuBeanMappings => MENU_BEAN_MAPPINGS,
        }
    }

    /// Tables this one holds foreign keys into.
    pub fn depends_on(self) -> &'static [TableKind] {
        match self {
            TableKind::Roasteries => &[],
            TableKind::Beans => &[TableKind::Roasteries],
            TableKind::Stores => &[TableKind::Roasteries],
            TableKind::Menus => &[TableKind::Stores],
            TableKind::BeanFlavorNotes => &[TableKind::Beans],
            TableKind::MenuBeanMappings => &[TableKind::Menus, TableKind::Beans],
        }
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A dependent table placed before (or without) a table it references.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderViolation {
    pub table: TableKind,
    pub depends_on: TableKind,
}

/// Check that every table appears after all of its dependencies.
pub fn check_dependency_order(order: &[TableKind]) -> Result<(), OrderViolation> {
    for (i, table) in order.iter().enumerate() {
        for dep in table.depends_on() {
            if !order[..i].contains(dep) {
                return Err(OrderViolation {
                    table: *table,
                    depends_on: *dep,
                });
            }
        }
    }
    Ok(())
}

/// A table as read from CSV: header names plus string cells.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    /// Build from string literals (handy in tests).
    pub fn from_rows(headers: &[&str], rows: &[&[&str]]) -> Self {
        Self {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: rows
                .iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
        }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h.trim() == name)
    }

    /// Cell text, or "" when the row is short.
    pub fn cell(&self, row: usize, column: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Resolve `columns` against the header, failing on a missing
    /// required column. Missing optional columns resolve to `None`.
    pub fn layout(&self, table: TableKind, columns: &[Column]) -> ExportResult<Vec<Option<usize>>> {
        columns
            .iter()
            .map(|column| match self.column_index(column.name) {
                Some(i) => Ok(Some(i)),
                None if column.required => Err(ExportError::MissingColumn {
                    table: table.name().to_string(),
                    column: column.name.to_string(),
                }),
                None => Ok(None),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emission_order_respects_dependencies() {
        assert_eq!(check_dependency_order(&TableKind::EMISSION_ORDER), Ok(()));
    }

    #[test]
    fn test_detects_dependent_first() {
        let order = [
            TableKind::Roasteries,
            TableKind::Menus,
            TableKind::Stores,
        ];
        assert_eq!(
            check_dependency_order(&order),
            Err(OrderViolation {
                table: TableKind::Menus,
                depends_on: TableKind::Stores,
            })
        );
    }

    #[test]
    fn test_layout_requires_keys_only() {
        let table = RawTable::from_rows(&["name", "id"], &[&["a", "1"]]);
        let layout = table.layout(TableKind::Roasteries, ROASTERIES).unwrap();
        assert_eq!(layout, vec![Some(1), Some(0), None, None]);

        let err = RawTable::from_rows(&["name"], &[]).layout(TableKind::Roasteries, ROASTERIES);
        assert!(matches!(err, Err(ExportError::MissingColumn { .. })));
    }

    #[test]
    fn test_short_rows_read_as_empty() {
        let table = RawTable::from_rows(&["id", "name"], &[&["1"]]);
        assert_eq!(table.cell(0, 1), "");
        assert_eq!(table.cell(5, 0), "");
    }
}
