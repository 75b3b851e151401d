//! Pipeline orchestration

pub mod engine;

pub use engine::{PipelineOutcome, PrivacyPipeline};
