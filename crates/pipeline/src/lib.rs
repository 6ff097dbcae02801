//! Analysis pipeline: ingestion and dedup, the bounded job queue with its
//! worker pool, the parser boundary, and the processor that drives each
//! file through parse → analyze → score.

pub mod config;
pub mod error;
pub mod ingest;
pub mod parser;
pub mod processor;
pub mod queue;
pub mod store;

pub use config::PipelineConfig;
pub use error::PipelineError;
