//! Domain error type shared by all crates.

/// Domain-level errors.
///
/// `Validation` and `Duplicate` are returned synchronously from the
/// ingestion path and nothing is persisted when they occur. `Parse` and
/// `Analysis` are recorded as terminal statuses on the config file row;
/// they are never retried automatically.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// An entity lookup by id came back empty.
    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: String },

    /// Bad or missing metadata, empty content, or oversized content.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Identical bytes were already uploaded by the same tenant.
    #[error("Duplicate upload: {0}")]
    Duplicate(String),

    /// The parser could not produce a structured document.
    #[error("Parse error: {0}")]
    Parse(String),

    /// The rule engine or scorer failed mid-run.
    #[error("Analysis error: {0}")]
    Analysis(String),

    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}
