//! Trait abstractions for pluggable collaborators.

pub mod fetcher;
