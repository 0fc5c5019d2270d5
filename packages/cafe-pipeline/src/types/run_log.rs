//! Run log produced by the collector.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Per-query counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryLog {
    pub query: String,

    /// Result handles listed
    pub found: usize,

    /// Stores accepted from this query
    pub added: usize,

    /// Places dropped for having no coffee menu
    pub skipped: usize,
}

impl QueryLog {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }
}

/// A query that failed and was skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryError {
    pub query: String,
    pub error: String,
}

/// Summary of one collection run, written as crawl_log.json.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunLog {
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub queries: Vec<QueryLog>,
    pub errors: Vec<QueryError>,
    pub skipped_no_menu: usize,
    pub total_stores: usize,
    pub total_menus: usize,
}

impl RunLog {
    /// Start a log now.
    pub fn start() -> Self {
        Self {
            start_time: Utc::now(),
            end_time: None,
            queries: Vec::new(),
            errors: Vec::new(),
            skipped_no_menu: 0,
            total_stores: 0,
            total_menus: 0,
        }
    }

    pub fn record_error(&mut self, query: impl Into<String>, error: impl ToString) {
        self.errors.push(QueryError {
            query: query.into(),
            error: error.to_string(),
        });
    }

    /// Stamp the end time and totals.
    pub fn finish(&mut self, total_stores: usize, total_menus: usize) {
        self.end_time = Some(Utc::now());
        self.total_stores = total_stores;
        self.total_menus = total_menus;
    }

    /// True when every query completed without error.
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}
