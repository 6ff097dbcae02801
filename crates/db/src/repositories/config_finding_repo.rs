//! Repository for the `config_findings` table.

use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::models::config_finding::{ConfigFinding, FindingListQuery, NewConfigFinding};
use crate::models::status::FindingStatus;

/// Column list for `config_findings` queries.
const COLUMNS: &str = "\
    id, config_file_id, tenant_id, finding_type, severity, category, \
    title, description, affected_component, config_snippet, line_numbers, \
    standard_id, compliance_frameworks, remediation, remediation_priority, \
    risk_score, status, resolved_at, resolved_by, created_at, updated_at";

/// Maximum page size for finding listing.
const MAX_LIMIT: i64 = 100;

/// Default page size for finding listing.
const DEFAULT_LIMIT: i64 = 50;

/// Provides CRUD operations for analysis findings.
pub struct ConfigFindingRepo;

impl ConfigFindingRepo {
    /// Replace a file's findings inside the caller's transaction: delete
    /// the previous set, insert the new one in `Open` status. A failed row
    /// aborts the whole batch so a run never persists partially.
    pub(crate) async fn replace_for_file(
        conn: &mut PgConnection,
        config_file_id: Uuid,
        inputs: &[NewConfigFinding],
    ) -> Result<Vec<ConfigFinding>, sqlx::Error> {
        sqlx::query("DELETE FROM config_findings WHERE config_file_id = $1")
            .bind(config_file_id)
            .execute(&mut *conn)
            .await?;

        let mut created = Vec::with_capacity(inputs.len());
        let query = format!(
            "INSERT INTO config_findings \
                 (config_file_id, tenant_id, finding_type, severity, category, \
                  title, description, affected_component, config_snippet, \
                  line_numbers, standard_id, compliance_frameworks, remediation, \
                  remediation_priority, risk_score, status) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16) \
             RETURNING {COLUMNS}"
        );
        for input in inputs {
            let row = sqlx::query_as::<_, ConfigFinding>(&query)
                .bind(input.config_file_id)
                .bind(input.tenant_id)
                .bind(&input.finding_type)
                .bind(&input.severity)
                .bind(&input.category)
                .bind(&input.title)
                .bind(&input.description)
                .bind(&input.affected_component)
                .bind(&input.config_snippet)
                .bind(&input.line_numbers)
                .bind(input.standard_id)
                .bind(&input.compliance_frameworks)
                .bind(&input.remediation)
                .bind(&input.remediation_priority)
                .bind(input.risk_score)
                .bind(FindingStatus::Open.as_str())
                .fetch_one(&mut *conn)
                .await?;
            created.push(row);
        }
        Ok(created)
    }

    /// Find a finding by ID scoped to a tenant.
    pub async fn find_by_id_for_tenant(
        pool: &PgPool,
        tenant_id: Uuid,
        id: Uuid,
    ) -> Result<Option<ConfigFinding>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM config_findings WHERE id = $1 AND tenant_id = $2");
        sqlx::query_as::<_, ConfigFinding>(&query)
            .bind(id)
            .bind(tenant_id)
            .fetch_optional(pool)
            .await
    }

    /// List a file's findings with optional filters, highest risk first.
    pub async fn list_for_file(
        pool: &PgPool,
        config_file_id: Uuid,
        params: &FindingListQuery,
    ) -> Result<Vec<ConfigFinding>, sqlx::Error> {
        let limit = params.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT);
        let offset = params.offset.unwrap_or(0);

        // Build the WHERE clause and track the next bind parameter index.
        let mut conditions = vec!["config_file_id = $1".to_string()];
        let mut bind_idx: u32 = 2;

        if params.severity.is_some() {
            conditions.push(format!("severity = ${bind_idx}"));
            bind_idx += 1;
        }
        if params.category.is_some() {
            conditions.push(format!("category = ${bind_idx}"));
            bind_idx += 1;
        }
        if params.status.is_some() {
            conditions.push(format!("status = ${bind_idx}"));
            bind_idx += 1;
        }
        if params.finding_type.is_some() {
            conditions.push(format!("finding_type = ${bind_idx}"));
            bind_idx += 1;
        }

        let query = format!(
            "SELECT {COLUMNS} FROM config_findings \
             WHERE {} \
             ORDER BY risk_score DESC, created_at ASC \
             LIMIT ${bind_idx} OFFSET ${}",
            conditions.join(" AND "),
            bind_idx + 1,
        );

        let mut q = sqlx::query_as::<_, ConfigFinding>(&query).bind(config_file_id);

        if let Some(severity) = &params.severity {
            q = q.bind(severity);
        }
        if let Some(category) = &params.category {
            q = q.bind(category);
        }
        if let Some(status) = &params.status {
            q = q.bind(status);
        }
        if let Some(finding_type) = &params.finding_type {
            q = q.bind(finding_type);
        }

        q.bind(limit).bind(offset).fetch_all(pool).await
    }

    /// Reviewer status transition. `resolved_at`/`resolved_by` are stamped
    /// on `Resolved` and cleared on any other transition. Returns `false`
    /// if no row matched.
    pub async fn update_status(
        pool: &PgPool,
        tenant_id: Uuid,
        id: Uuid,
        status: FindingStatus,
        resolved_by: Option<Uuid>,
    ) -> Result<bool, sqlx::Error> {
        let result = if status == FindingStatus::Resolved {
            sqlx::query(
                "UPDATE config_findings \
                 SET status = $3, resolved_at = NOW(), resolved_by = $4, updated_at = NOW() \
                 WHERE id = $1 AND tenant_id = $2",
            )
            .bind(id)
            .bind(tenant_id)
            .bind(status.as_str())
            .bind(resolved_by)
            .execute(pool)
            .await?
        } else {
            sqlx::query(
                "UPDATE config_findings \
                 SET status = $3, resolved_at = NULL, resolved_by = NULL, updated_at = NOW() \
                 WHERE id = $1 AND tenant_id = $2",
            )
            .bind(id)
            .bind(tenant_id)
            .bind(status.as_str())
            .execute(pool)
            .await?
        };
        Ok(result.rows_affected() > 0)
    }

    /// Per-severity open-finding counts for a file.
    pub async fn counts_by_severity(
        pool: &PgPool,
        config_file_id: Uuid,
    ) -> Result<Vec<(String, i64)>, sqlx::Error> {
        sqlx::query_as::<_, (String, i64)>(
            "SELECT severity, COUNT(*) FROM config_findings \
             WHERE config_file_id = $1 AND status = $2 \
             GROUP BY severity",
        )
        .bind(config_file_id)
        .bind(FindingStatus::Open.as_str())
        .fetch_all(pool)
        .await
    }
}
