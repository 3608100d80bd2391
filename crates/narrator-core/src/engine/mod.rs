pub mod pipeline;

pub use pipeline::{Outcome, Pipeline, PipelineOptions, PipelineReport, Source};
