//! SQL literal formatting.

use super::schema::ColumnType;

pub const NULL: &str = "NULL";

/// True for cells that export as NULL: empty, whitespace, or "nan".
pub fn is_null(value: &str) -> bool {
    let trimmed = value.trim();
    trimmed.is_empty() || trimmed.eq_ignore_ascii_case("nan")
}

/// Quote a string literal: single quotes doubled, backslashes escaped.
pub fn escape_sql_string(value: &str) -> String {
    if is_null(value) {
        return NULL.to_string();
    }
    format!("'{}'", value.replace('\'', "''").replace('\\', "\\\\"))
}

/// Integer cell: parsed as a number and truncated toward zero.
///
/// Values outside the `i64` range are rejected rather than clamped.
pub fn parse_int(value: &str) -> Option<i64> {
    let trimmed = value.trim();
    if let Ok(i) = trimmed.parse::<i64>() {
        return Some(i);
    }
    trimmed
        .parse::<f64>()
        .ok()
        .map(f64::trunc)
        .filter(|f| f.is_finite() && *f >= i64::MIN as f64 && *f < i64::MAX as f64)
        .map(|f| f as i64)
}

pub fn parse_float(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|f| f.is_finite())
}

/// "true", "1" and "yes" (any case) are true; everything else is false.
pub fn parse_bool(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "yes"
    )
}

/// Render one cell as a SQL literal of the declared type.
///
/// Returns `None` when a numeric cell cannot be read as a number.
pub fn format_value(value: &str, ty: ColumnType) -> Option<String> {
    if is_null(value) {
        return Some(NULL.to_string());
    }

    match ty {
        ColumnType::Int => parse_int(value).map(|i| i.to_string()),
        ColumnType::Float => parse_float(value).map(|f| format!("{:?}", f)),
        ColumnType::Bool => Some(if parse_bool(value) { "TRUE" } else { "FALSE" }.to_string()),
        ColumnType::Text => Some(escape_sql_string(value)),
    }
}
