//! Services for normalization, bucketing and aggregation

pub mod aggregator;
pub mod bucketer;
pub mod normalizer;
pub mod pipeline;

pub use aggregator::Aggregator;
pub use pipeline::{Pipeline, PipelineOutput, Report};
