// src/scoring/mod.rs
//! Scoring and ranking: profiles, strategy evaluation, dedup + rank, and the
//! preference boost applied on top.

pub mod engine;
pub mod generator;
pub mod preferences;
pub mod profile;
pub mod rank;

// Re-export convenient types.
pub use crate::scoring::engine::{score_product, ScoreBreakdown};
pub use crate::scoring::generator::{resolve_profile, DisabledGenerator, ProfileGenerator};
pub use crate::scoring::preferences::apply_preferences;
pub use crate::scoring::profile::{default_profile, Dimension, KeywordRule, ScoringProfile, Strategy};
pub use crate::scoring::rank::{dedup_cheapest, rank_products, Ranked};
