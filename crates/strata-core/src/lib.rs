//! Strata Core - Domain types shared by the extraction engines and the pipeline.

mod types;

pub use types::*;
