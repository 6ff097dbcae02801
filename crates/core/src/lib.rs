//! Pure domain logic for the configuration compliance analyzer.
//!
//! Everything in this crate is side-effect free: no database access, no
//! async, no clocks inside decision paths. The pipeline crate wires these
//! functions to persistence and the worker pool.

pub mod catalog;
pub mod engine;
pub mod error;
pub mod hashing;
pub mod scoring;
pub mod severity;
pub mod sniff;
pub mod types;
pub mod validation;

pub use error::CoreError;
