//! Row models and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A create DTO for inserts
//! - Query-parameter structs for the read surface

pub mod config_analysis;
pub mod config_file;
pub mod config_finding;
pub mod config_standard;
pub mod status;
