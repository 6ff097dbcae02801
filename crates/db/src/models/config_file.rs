//! Config file entity models and DTOs.

use cfgaudit_core::types::Timestamp;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::status::{AnalysisStatus, ParsingStatus};

/// A row from the `config_files` table.
///
/// `file_content` is the raw uploaded bytes (BYTEA); it is never
/// serialized into API responses.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ConfigFile {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub uploaded_by: Option<Uuid>,
    pub filename: String,
    pub file_size: i64,
    /// SHA-256 hex digest of `file_content`; `(tenant_id, file_hash)` is
    /// unique.
    pub file_hash: String,
    pub mime_type: String,
    #[serde(skip_serializing)]
    pub file_content: Vec<u8>,
    pub device_type: String,
    pub manufacturer: String,
    pub model: String,
    pub firmware_version: String,
    pub config_type: String,
    /// Sniffed format hint handed to the parser (text/json/xml).
    pub config_format: String,
    pub parsing_status: String,
    pub parsing_error: Option<String>,
    pub parsed_data: Option<serde_json::Value>,
    pub analysis_status: String,
    pub analysis_started_at: Option<Timestamp>,
    pub analysis_completed_at: Option<Timestamp>,
    pub tags: serde_json::Value,
    pub notes: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl ConfigFile {
    pub fn parsing_status(&self) -> Option<ParsingStatus> {
        ParsingStatus::parse(&self.parsing_status)
    }

    pub fn analysis_status(&self) -> Option<AnalysisStatus> {
        AnalysisStatus::parse(&self.analysis_status)
    }

    pub fn is_parsed(&self) -> bool {
        self.parsing_status() == Some(ParsingStatus::Parsed)
    }
}

/// Listing row: everything except the raw content and parsed document, so
/// list queries stay cheap.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ConfigFileSummary {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub filename: String,
    pub file_size: i64,
    pub file_hash: String,
    pub device_type: String,
    pub manufacturer: String,
    pub model: String,
    pub config_type: String,
    pub config_format: String,
    pub parsing_status: String,
    pub analysis_status: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Insert DTO for a new upload. Both statuses start `pending`.
#[derive(Debug, Clone)]
pub struct NewConfigFile {
    pub tenant_id: Uuid,
    pub uploaded_by: Option<Uuid>,
    pub filename: String,
    pub file_hash: String,
    pub mime_type: String,
    pub file_content: Vec<u8>,
    pub device_type: String,
    pub manufacturer: String,
    pub model: String,
    pub firmware_version: String,
    pub config_type: String,
    pub config_format: String,
    pub tags: Vec<String>,
    pub notes: String,
}

/// Query parameters for listing a tenant's config files.
#[derive(Debug, Default, Deserialize)]
pub struct FileListQuery {
    pub manufacturer: Option<String>,
    pub device_type: Option<String>,
    /// Filter on `analysis_status`.
    pub status: Option<String>,
    /// Maximum number of results. Defaults to 50, capped at 100.
    pub limit: Option<i64>,
    /// Number of results to skip. Defaults to 0.
    pub offset: Option<i64>,
}
