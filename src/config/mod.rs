// src/config/mod.rs
pub mod generator;
pub mod pipeline;

pub use generator::GeneratorConfig;
pub use pipeline::{load_pipeline_config_default, load_pipeline_config_from, PipelineConfig};
