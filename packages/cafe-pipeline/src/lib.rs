//! Café Collection and Export Library
//!
//! Collects cafés and their menus from a map application's embedded state,
//! keeps only coffee listings, and turns the accumulated tables into a
//! foreign-key-ordered SQL import.
//!
//! # Design
//!
//! - The browser is somebody else's problem: everything goes through the
//!   [`PageFetcher`] seam
//! - Extraction is total; missing data degrades to empty fields
//! - Classification is keyword based and order sensitive
//! - The exporter owns final category assignment
//!
//! # Usage
//!
//! ```rust,ignore
//! use cafe_pipeline::{CollectConfig, Collector, ReplayFetcher, FetcherExt};
//!
//! let config = CollectConfig::from_env()?;
//! let fetcher = ReplayFetcher::new("fixtures").paced(&config.pacing);
//! let outcome = Collector::new(fetcher, config).run().await;
//!
//! cafe_pipeline::tables::write_collection("out".as_ref(), &outcome.stores, &outcome.log)?;
//! ```
//!
//! # Modules
//!
//! - [`traits`] - The PageFetcher / SearchSession seam
//! - [`types`] - Places, menus, beans, categories, config, run log
//! - [`pipeline`] - Extraction, classification, collection, export
//! - [`fetchers`] - Mock, replay and paced fetchers
//! - [`tables`] - CSV/JSON files at the pipeline edges
//! - [`testing`] - Builders for synthetic state blobs

pub mod error;
pub mod fetchers;
pub mod pipeline;
pub mod tables;
pub mod testing;
pub mod traits;
pub mod types;

// Re-export core types at crate root
pub use error::{ExportError, FetchError, PipelineError};
pub use traits::fetcher::{PageFetcher, ResultHandle, SearchSession};
pub use types::{
    bean::{Bean, RoastLevel, SensoryScore, SourceScore},
    category::Category,
    config::{CoffeeFilterConfig, CollectConfig, PacingConfig, PriceBand, RetryConfig},
    place::{MenuCandidate, MenuItem, Place, Store},
    run_log::{QueryLog, RunLog},
    state::RawState,
};

pub use pipeline::{
    CategoryClassifier, CoffeeClassifier, CollectOutcome, Collector, Dataset,
    RelationalExporter, StateExtractor, TableKind,
};

pub use fetchers::{FetcherExt, MockFetcher, PacedFetcher, ReplayFetcher};
