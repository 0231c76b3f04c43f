pub mod apis;
pub mod config;
pub mod constants;
pub mod domain;
pub mod error;
pub mod legend;
pub mod logging;
pub mod metrics;
pub mod pipeline;
pub mod types;

pub use domain::{MapObject, ObjectKind, Priority, PriorityLevel, TechnicalCondition};
pub use pipeline::processing::aggregate::{aggregate, FilterSpec};
pub use pipeline::processing::normalize::{DefaultNormalizer, Normalizer};
pub use pipeline::processing::priority::{classify, compute_priority};
pub use pipeline::{MapPipeline, PipelineResult};
