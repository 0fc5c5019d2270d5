//! Relational export - CSV tables to foreign-key-ordered INSERT statements.
//!
//! Store categories are always recomputed here from each store's own menu
//! names; whatever category the input carries is ignored.

use indexmap::IndexMap;
use std::collections::HashMap;
use tracing::{debug, info};

use super::format::{format_value, is_null, parse_int, NULL};
use super::schema::{Column, RawTable, TableKind};
use crate::error::{ExportError, ExportResult};
use crate::pipeline::category::CategoryClassifier;
use crate::types::category::Category;

/// The six input tables, keyed by kind. Absent tables export as empty.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    tables: HashMap<TableKind, RawTable>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, kind: TableKind, table: RawTable) {
        self.tables.insert(kind, table);
    }

    pub fn with_table(mut self, kind: TableKind, table: RawTable) -> Self {
        self.insert(kind, table);
        self
    }

    pub fn table(&self, kind: TableKind) -> Option<&RawTable> {
        self.tables.get(&kind)
    }
}

/// Generated script plus what went into it.
#[derive(Debug, Clone)]
pub struct SqlScript {
    pub sql: String,

    /// Rows written per table, in emission order
    pub row_counts: Vec<(TableKind, usize)>,

    /// Stores per recomputed category, in first-seen order
    pub category_distribution: IndexMap<Category, usize>,
}

impl SqlScript {
    pub fn total_rows(&self) -> usize {
        self.row_counts.iter().map(|(_, n)| n).sum()
    }
}

/// Renders a [`Dataset`] as an import script.
#[derive(Debug, Clone, Default)]
pub struct RelationalExporter {
    classifier: CategoryClassifier,
}

impl RelationalExporter {
    pub fn new(classifier: CategoryClassifier) -> Self {
        Self { classifier }
    }

    /// Category per store id from the menus table.
    ///
    /// Menu rows whose store id is blank are ignored.
    pub fn store_categories(&self, menus: &RawTable) -> ExportResult<HashMap<i64, Category>> {
        let store_col = menus
            .column_index("store_id")
            .ok_or_else(|| missing(TableKind::Menus, "store_id"))?;
        let name_col = menus.column_index("name");

        let mut names: IndexMap<i64, Vec<&str>> = IndexMap::new();
        for row in 0..menus.len() {
            let raw = menus.cell(row, store_col);
            let Some(store_id) = read_key(TableKind::Menus, "store_id", row, raw)? else {
                continue;
            };
            let name = name_col.map(|c| menus.cell(row, c)).unwrap_or("");
            names.entry(store_id).or_default().push(name);
        }

        Ok(names
            .into_iter()
            .map(|(id, menu_names)| (id, self.classifier.aggregate(menu_names)))
            .collect())
    }

    /// Render the full script.
    pub fn render(&self, dataset: &Dataset) -> ExportResult<SqlScript> {
        let empty = RawTable::default();
        let table = |kind: TableKind| dataset.table(kind).unwrap_or(&empty);

        let menus = table(TableKind::Menus);
        let categories = if menus.is_empty() {
            HashMap::new()
        } else {
            self.store_categories(menus)?
        };

        let mut blocks = Vec::new();
        let mut row_counts = Vec::new();
        let mut category_distribution: IndexMap<Category, usize> = IndexMap::new();

        for kind in TableKind::EMISSION_ORDER {
            let input = table(kind);
            let rows = match kind {
                _ if input.is_empty() => Vec::new(),
                TableKind::Stores => self.store_rows(input, &categories, &mut category_distribution)?,
                TableKind::Menus => self.menu_rows(input)?,
                _ => plain_rows(kind, input)?,
            };

            debug!(table = %kind, rows = rows.len(), "Rendered table");
            row_counts.push((kind, rows.len()));
            blocks.push(insert_block(kind, kind.columns(), &rows));
        }

        info!(
            stores = category_distribution.values().sum::<usize>(),
            "Store categories: {:?}",
            category_distribution
        );

        Ok(SqlScript {
            sql: assemble(&blocks),
            row_counts,
            category_distribution,
        })
    }

    fn store_rows(
        &self,
        input: &RawTable,
        categories: &HashMap<i64, Category>,
        distribution: &mut IndexMap<Category, usize>,
    ) -> ExportResult<Vec<Vec<String>>> {
        let kind = TableKind::Stores;
        let columns = kind.columns();
        let layout = input.layout(kind, columns)?;

        (0..input.len())
            .map(|row| {
                let mut values = format_row(kind, input, columns, &layout, row)?;

                let id = read_key(kind, "id", row, cell(input, &layout, 0, row))?;
                let category = id
                    .and_then(|id| categories.get(&id).copied())
                    .unwrap_or(self.classifier.fallback());
                *distribution.entry(category).or_insert(0) += 1;

                set(columns, &mut values, "category", format!("'{}'", category.code()));
                Ok(values)
            })
            .collect()
    }

    fn menu_rows(&self, input: &RawTable) -> ExportResult<Vec<Vec<String>>> {
        let kind = TableKind::Menus;
        let columns = kind.columns();
        let layout = input.layout(kind, columns)?;
        let name_idx = position(columns, "name");
        let price_idx = position(columns, "price");

        (0..input.len())
            .map(|row| {
                let mut values = format_row(kind, input, columns, &layout, row)?;

                let category = self
                    .classifier
                    .classify(cell(input, &layout, name_idx, row))
                    .map(|c| format!("'{}'", c.code()))
                    .unwrap_or_else(|| NULL.to_string());
                set(columns, &mut values, "category", category);

                if values[price_idx] == NULL {
                    values[price_idx] = "0".to_string();
                }
                Ok(values)
            })
            .collect()
    }
}

fn plain_rows(kind: TableKind, input: &RawTable) -> ExportResult<Vec<Vec<String>>> {
    let columns = kind.columns();
    let layout = input.layout(kind, columns)?;
    (0..input.len())
        .map(|row| format_row(kind, input, columns, &layout, row))
        .collect()
}

fn format_row(
    kind: TableKind,
    input: &RawTable,
    columns: &[Column],
    layout: &[Option<usize>],
    row: usize,
) -> ExportResult<Vec<String>> {
    columns
        .iter()
        .enumerate()
        .map(|(i, column)| {
            let raw = cell(input, layout, i, row);
            format_value(raw, column.ty).ok_or_else(|| ExportError::InvalidValue {
                table: kind.name().to_string(),
                column: column.name.to_string(),
                row: row + 1,
                value: raw.to_string(),
                expected: column.ty.name(),
            })
        })
        .collect()
}

fn cell<'a>(input: &'a RawTable, layout: &[Option<usize>], column: usize, row: usize) -> &'a str {
    layout[column].map(|c| input.cell(row, c)).unwrap_or("")
}

fn read_key(kind: TableKind, column: &str, row: usize, raw: &str) -> ExportResult<Option<i64>> {
    if is_null(raw) {
        return Ok(None);
    }
    parse_int(raw).map(Some).ok_or_else(|| ExportError::InvalidValue {
        table: kind.name().to_string(),
        column: column.to_string(),
        row: row + 1,
        value: raw.to_string(),
        expected: "int",
    })
}

fn position(columns: &[Column], name: &str) -> usize {
    columns.iter().position(|c| c.name == name).unwrap_or(0)
}

fn set(columns: &[Column], values: &mut [String], name: &str, value: String) {
    if let Some(i) = columns.iter().position(|c| c.name == name) {
        values[i] = value;
    }
}

fn missing(kind: TableKind, column: &str) -> ExportError {
    ExportError::MissingColumn {
        table: kind.name().to_string(),
        column: column.to_string(),
    }
}

/// One `INSERT ... VALUES` statement, or a comment when there are no rows.
pub fn insert_block(kind: TableKind, columns: &[Column], rows: &[Vec<String>]) -> String {
    let mut block = format!("-- {}\n", kind.title());

    if rows.is_empty() {
        block.push_str(&format!("-- no rows for {}", kind.name()));
        return block;
    }

    let names: Vec<&str> = columns.iter().map(|c| c.name).collect();
    block.push_str(&format!(
        "INSERT INTO {} ({}) VALUES\n",
        kind.name(),
        names.join(", ")
    ));

    let values: Vec<String> = rows.iter().map(|r| format!("({})", r.join(", "))).collect();
    block.push_str(&values.join(",\n"));
    block.push(';');
    block
}

fn assemble(blocks: &[String]) -> String {
    let order: Vec<&str> = TableKind::EMISSION_ORDER.iter().map(|k| k.name()).collect();

    let mut parts = vec![
        "-- Café dataset import".to_string(),
        "-- Generated by cafe-pipeline".to_string(),
        format!("-- Dependency order: {}", order.join(" -> ")),
        String::new(),
        "SET FOREIGN_KEY_CHECKS = 0;".to_string(),
        String::new(),
    ];
    for block in blocks {
        parts.push(block.clone());
        parts.push(String::new());
    }
    parts.push("SET FOREIGN_KEY_CHECKS = 1;".to_string());
    parts.push(String::new());

    parts.join("\n")
}
