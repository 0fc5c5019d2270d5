//! Extraction, classification, collection and export.

pub mod category;
pub mod coffee;
pub mod collect;
pub mod export;
pub mod extract;
pub mod sensory;

pub use category::{default_rules, CategoryClassifier, CategoryRule};
pub use coffee::{CoffeeClassifier, CoffeeVerdict};
pub use collect::{CollectOutcome, CollectionState, Collector, Decision, RejectReason};
pub use export::{Dataset, RelationalExporter, SqlScript, TableKind};
pub use extract::{parse_price, Extracted, StateExtractor};
