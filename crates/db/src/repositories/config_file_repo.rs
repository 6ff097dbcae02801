//! Repository for the `config_files` table.
//!
//! Uses the status enums from `models::status` for all stage transitions.
//! No status literal appears inline.

use sqlx::PgPool;
use uuid::Uuid;

use crate::models::config_file::{ConfigFile, ConfigFileSummary, FileListQuery, NewConfigFile};
use crate::models::status::{AnalysisStatus, ParsingStatus};

/// Column list for `config_files` queries.
const COLUMNS: &str = "\
    id, tenant_id, uploaded_by, filename, file_size, file_hash, mime_type, \
    file_content, device_type, manufacturer, model, firmware_version, \
    config_type, config_format, parsing_status, parsing_error, parsed_data, \
    analysis_status, analysis_started_at, analysis_completed_at, \
    tags, notes, created_at, updated_at";

/// Column list for listing rows (no content or parsed document).
const SUMMARY_COLUMNS: &str = "\
    id, tenant_id, filename, file_size, file_hash, device_type, \
    manufacturer, model, config_type, config_format, \
    parsing_status, analysis_status, created_at, updated_at";

/// Maximum page size for file listing.
const MAX_LIMIT: i64 = 100;

/// Default page size for file listing.
const DEFAULT_LIMIT: i64 = 50;

/// Provides CRUD operations for uploaded config files.
pub struct ConfigFileRepo;

impl ConfigFileRepo {
    /// Insert a new upload. Both stage markers start `pending`; `file_size`
    /// is computed from the content, never taken from the caller.
    pub async fn create(pool: &PgPool, input: &NewConfigFile) -> Result<ConfigFile, sqlx::Error> {
        let query = format!(
            "INSERT INTO config_files \
                 (tenant_id, uploaded_by, filename, file_size, file_hash, mime_type, \
                  file_content, device_type, manufacturer, model, firmware_version, \
                  config_type, config_format, parsing_status, analysis_status, tags, notes) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ConfigFile>(&query)
            .bind(input.tenant_id)
            .bind(input.uploaded_by)
            .bind(&input.filename)
            .bind(input.file_content.len() as i64)
            .bind(&input.file_hash)
            .bind(&input.mime_type)
            .bind(&input.file_content)
            .bind(&input.device_type)
            .bind(&input.manufacturer)
            .bind(&input.model)
            .bind(&input.firmware_version)
            .bind(&input.config_type)
            .bind(&input.config_format)
            .bind(ParsingStatus::Pending.as_str())
            .bind(AnalysisStatus::Pending.as_str())
            .bind(serde_json::json!(input.tags))
            .bind(&input.notes)
            .fetch_one(pool)
            .await
    }

    /// Find a config file by its ID, across tenants. Used by the worker,
    /// which receives bare file ids off the queue.
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<ConfigFile>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM config_files WHERE id = $1");
        sqlx::query_as::<_, ConfigFile>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a config file by ID scoped to a tenant.
    pub async fn find_by_id_for_tenant(
        pool: &PgPool,
        tenant_id: Uuid,
        id: Uuid,
    ) -> Result<Option<ConfigFile>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM config_files WHERE id = $1 AND tenant_id = $2");
        sqlx::query_as::<_, ConfigFile>(&query)
            .bind(id)
            .bind(tenant_id)
            .fetch_optional(pool)
            .await
    }

    /// Look up a tenant's file by content hash. Backs the duplicate check
    /// at upload time; `(tenant_id, file_hash)` also carries a unique
    /// constraint as the race-proof backstop.
    pub async fn find_by_hash(
        pool: &PgPool,
        tenant_id: Uuid,
        file_hash: &str,
    ) -> Result<Option<ConfigFile>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM config_files WHERE tenant_id = $1 AND file_hash = $2");
        sqlx::query_as::<_, ConfigFile>(&query)
            .bind(tenant_id)
            .bind(file_hash)
            .fetch_optional(pool)
            .await
    }

    /// Set the parse stage marker, with an error message on failure and a
    /// cleared one otherwise.
    pub async fn update_parsing_status(
        pool: &PgPool,
        id: Uuid,
        status: ParsingStatus,
        error: Option<&str>,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE config_files \
             SET parsing_status = $2, parsing_error = $3, updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(status.as_str())
        .bind(error)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Store the parsed document and mark the file parsed in one statement.
    pub async fn store_parsed_document(
        pool: &PgPool,
        id: Uuid,
        document: &serde_json::Value,
        config_format: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE config_files \
             SET parsed_data = $2, config_format = $3, parsing_status = $4, \
                 parsing_error = NULL, updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(document)
        .bind(config_format)
        .bind(ParsingStatus::Parsed.as_str())
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Set the analysis stage marker. `analysis_started_at` is stamped on
    /// the transition into `Analyzing`; `analysis_completed_at` on either
    /// terminal state.
    pub async fn update_analysis_status(
        pool: &PgPool,
        id: Uuid,
        status: AnalysisStatus,
    ) -> Result<(), sqlx::Error> {
        let sql = match status {
            AnalysisStatus::Analyzing => {
                "UPDATE config_files \
                 SET analysis_status = $2, analysis_started_at = NOW(), \
                     analysis_completed_at = NULL, updated_at = NOW() \
                 WHERE id = $1"
            }
            AnalysisStatus::Completed | AnalysisStatus::Failed => {
                "UPDATE config_files \
                 SET analysis_status = $2, analysis_completed_at = NOW(), updated_at = NOW() \
                 WHERE id = $1"
            }
            AnalysisStatus::Pending => {
                "UPDATE config_files \
                 SET analysis_status = $2, updated_at = NOW() \
                 WHERE id = $1"
            }
        };
        sqlx::query(sql)
            .bind(id)
            .bind(status.as_str())
            .execute(pool)
            .await?;
        Ok(())
    }

    /// List a tenant's files with optional filters and pagination, newest
    /// first.
    pub async fn list_for_tenant(
        pool: &PgPool,
        tenant_id: Uuid,
        params: &FileListQuery,
    ) -> Result<Vec<ConfigFileSummary>, sqlx::Error> {
        let limit = params.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT);
        let offset = params.offset.unwrap_or(0);

        // Build the WHERE clause and track the next bind parameter index.
        let mut conditions = vec!["tenant_id = $1".to_string()];
        let mut bind_idx: u32 = 2;

        if params.manufacturer.is_some() {
            conditions.push(format!("LOWER(manufacturer) = LOWER(${bind_idx})"));
            bind_idx += 1;
        }
        if params.device_type.is_some() {
            conditions.push(format!("device_type = ${bind_idx}"));
            bind_idx += 1;
        }
        if params.status.is_some() {
            conditions.push(format!("analysis_status = ${bind_idx}"));
            bind_idx += 1;
        }

        let query = format!(
            "SELECT {SUMMARY_COLUMNS} FROM config_files \
             WHERE {} \
             ORDER BY created_at DESC \
             LIMIT ${bind_idx} OFFSET ${}",
            conditions.join(" AND "),
            bind_idx + 1,
        );

        let mut q = sqlx::query_as::<_, ConfigFileSummary>(&query).bind(tenant_id);

        if let Some(manufacturer) = &params.manufacturer {
            q = q.bind(manufacturer);
        }
        if let Some(device_type) = &params.device_type {
            q = q.bind(device_type);
        }
        if let Some(status) = &params.status {
            q = q.bind(status);
        }

        q.bind(limit).bind(offset).fetch_all(pool).await
    }

    /// Ids of files awaiting analysis, oldest first. The worker polls this
    /// to pick up rows whose enqueue was shed by a full queue.
    pub async fn list_pending_analysis(
        pool: &PgPool,
        limit: i64,
    ) -> Result<Vec<Uuid>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT id FROM config_files \
             WHERE analysis_status = $1 \
             ORDER BY created_at ASC \
             LIMIT $2",
        )
        .bind(AnalysisStatus::Pending.as_str())
        .bind(limit)
        .fetch_all(pool)
        .await
    }

    /// Delete a tenant's config file. Findings and analysis results go with
    /// it via `ON DELETE CASCADE`. Returns `false` if no row matched.
    pub async fn delete(pool: &PgPool, tenant_id: Uuid, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM config_files WHERE id = $1 AND tenant_id = $2")
            .bind(id)
            .bind(tenant_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
