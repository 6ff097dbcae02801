//! Repository for the `config_standards` table.

use sqlx::PgPool;
use uuid::Uuid;

use crate::models::config_standard::{ConfigStandard, NewConfigStandard};
use crate::models::status::StandardStatus;

/// Column list for `config_standards` queries.
const COLUMNS: &str = "\
    id, standard_name, standard_version, manufacturer, device_type, category, \
    requirement_id, requirement_title, requirement_description, \
    compliance_frameworks, check_type, check_config_path, check_pattern, \
    expected_value, default_severity, priority, remediation_guidance, \
    status, created_at, updated_at";

/// Provides read and seed operations for the compliance catalog.
pub struct ConfigStandardRepo;

impl ConfigStandardRepo {
    /// Insert a new catalog standard in `Active` status.
    pub async fn create(
        pool: &PgPool,
        input: &NewConfigStandard,
    ) -> Result<ConfigStandard, sqlx::Error> {
        let query = format!(
            "INSERT INTO config_standards \
                 (standard_name, standard_version, manufacturer, device_type, category, \
                  requirement_id, requirement_title, requirement_description, \
                  compliance_frameworks, check_type, check_config_path, check_pattern, \
                  expected_value, default_severity, priority, remediation_guidance, status) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ConfigStandard>(&query)
            .bind(&input.standard_name)
            .bind(&input.standard_version)
            .bind(&input.manufacturer)
            .bind(&input.device_type)
            .bind(&input.category)
            .bind(&input.requirement_id)
            .bind(&input.requirement_title)
            .bind(&input.requirement_description)
            .bind(serde_json::json!(input.compliance_frameworks))
            .bind(&input.check_type)
            .bind(&input.check_config_path)
            .bind(&input.check_pattern)
            .bind(&input.expected_value)
            .bind(&input.default_severity)
            .bind(&input.priority)
            .bind(&input.remediation_guidance)
            .bind(StandardStatus::Active.as_str())
            .fetch_one(pool)
            .await
    }

    /// Seed a batch of standards in one transaction. Used by catalog
    /// loaders; a failed row aborts the whole batch.
    pub async fn create_batch(
        pool: &PgPool,
        inputs: &[NewConfigStandard],
    ) -> Result<Vec<ConfigStandard>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let mut created = Vec::with_capacity(inputs.len());
        let query = format!(
            "INSERT INTO config_standards \
                 (standard_name, standard_version, manufacturer, device_type, category, \
                  requirement_id, requirement_title, requirement_description, \
                  compliance_frameworks, check_type, check_config_path, check_pattern, \
                  expected_value, default_severity, priority, remediation_guidance, status) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17) \
             RETURNING {COLUMNS}"
        );
        for input in inputs {
            let row = sqlx::query_as::<_, ConfigStandard>(&query)
                .bind(&input.standard_name)
                .bind(&input.standard_version)
                .bind(&input.manufacturer)
                .bind(&input.device_type)
                .bind(&input.category)
                .bind(&input.requirement_id)
                .bind(&input.requirement_title)
                .bind(&input.requirement_description)
                .bind(serde_json::json!(input.compliance_frameworks))
                .bind(&input.check_type)
                .bind(&input.check_config_path)
                .bind(&input.check_pattern)
                .bind(&input.expected_value)
                .bind(&input.default_severity)
                .bind(&input.priority)
                .bind(&input.remediation_guidance)
                .bind(StandardStatus::Active.as_str())
                .fetch_one(&mut *tx)
                .await?;
            created.push(row);
        }
        tx.commit().await?;
        Ok(created)
    }

    /// Find a standard by its ID.
    pub async fn find_by_id(
        pool: &PgPool,
        id: Uuid,
    ) -> Result<Option<ConfigStandard>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM config_standards WHERE id = $1");
        sqlx::query_as::<_, ConfigStandard>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Active standards applicable to a device, ordered by requirement id
    /// so evaluation order (and finding order) is deterministic.
    ///
    /// Matches on manufacturer case-insensitively; a standard with
    /// device_type `any` applies to every device type.
    pub async fn list_active_for_device(
        pool: &PgPool,
        manufacturer: &str,
        device_type: &str,
    ) -> Result<Vec<ConfigStandard>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM config_standards \
             WHERE status = $1 \
               AND LOWER(manufacturer) = LOWER($2) \
               AND (device_type = $3 OR device_type = 'any') \
             ORDER BY requirement_id ASC"
        );
        sqlx::query_as::<_, ConfigStandard>(&query)
            .bind(StandardStatus::Active.as_str())
            .bind(manufacturer)
            .bind(device_type)
            .fetch_all(pool)
            .await
    }

    /// Active standards tagged with a compliance framework.
    pub async fn list_by_framework(
        pool: &PgPool,
        framework: &str,
    ) -> Result<Vec<ConfigStandard>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM config_standards \
             WHERE status = $1 AND compliance_frameworks @> $2 \
             ORDER BY requirement_id ASC"
        );
        sqlx::query_as::<_, ConfigStandard>(&query)
            .bind(StandardStatus::Active.as_str())
            .bind(serde_json::json!([framework]))
            .fetch_all(pool)
            .await
    }

    /// Mark a standard deprecated so new analysis runs skip it. Returns
    /// `false` if no row matched.
    pub async fn deprecate(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE config_standards SET status = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(StandardStatus::Deprecated.as_str())
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
