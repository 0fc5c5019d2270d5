//! PageFetcher implementations.

pub mod mock;
pub mod paced;
pub mod replay;

pub use mock::MockFetcher;
pub use paced::{FetcherExt, PacedFetcher, Pacer};
pub use replay::ReplayFetcher;
