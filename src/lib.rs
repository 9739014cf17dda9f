// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod config;
pub mod filters;
pub mod ingest;
pub mod normalize;
pub mod pipeline;
pub mod product;
pub mod scoring;

// ---- Re-exports for stable public API ----
pub use crate::ingest::error::IngestError;
pub use crate::ingest::types::{OperatingMode, SourceAdapter};
pub use crate::pipeline::{Pipeline, PipelineReport};
pub use crate::product::{FieldRef, Product};
pub use crate::scoring::{Ranked, ScoreBreakdown, ScoringProfile};
