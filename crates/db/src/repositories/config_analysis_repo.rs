//! Repository for the `config_analysis_results` table.

use sqlx::PgPool;
use uuid::Uuid;

use crate::models::config_analysis::{ConfigAnalysisResult, NewAnalysisResult};
use crate::models::config_finding::{ConfigFinding, NewConfigFinding};
use crate::repositories::ConfigFindingRepo;

/// Column list for `config_analysis_results` queries.
const COLUMNS: &str = "\
    id, config_file_id, tenant_id, analysis_version, \
    total_findings, critical_findings, high_findings, medium_findings, \
    low_findings, info_findings, compliance_scores, security_score, \
    overall_risk_score, risk_level, checks_performed, checks_passed, \
    checks_failed, standards_checked, created_at";

/// Provides persistence for per-file analysis aggregates.
pub struct ConfigAnalysisRepo;

impl ConfigAnalysisRepo {
    /// Commit a finished run atomically: replace the file's findings and
    /// its analysis result in one transaction, so a reader never sees the
    /// new findings against the old aggregate, or an empty finding set
    /// mid-swap, and a failure keeps the previous run intact.
    pub async fn replace_run(
        pool: &PgPool,
        config_file_id: Uuid,
        findings: &[NewConfigFinding],
        input: &NewAnalysisResult,
    ) -> Result<(ConfigAnalysisResult, Vec<ConfigFinding>), sqlx::Error> {
        let mut tx = pool.begin().await?;

        let created =
            ConfigFindingRepo::replace_for_file(&mut tx, config_file_id, findings).await?;

        sqlx::query("DELETE FROM config_analysis_results WHERE config_file_id = $1")
            .bind(config_file_id)
            .execute(&mut *tx)
            .await?;

        let query = format!(
            "INSERT INTO config_analysis_results \
                 (config_file_id, tenant_id, analysis_version, total_findings, \
                  critical_findings, high_findings, medium_findings, low_findings, \
                  info_findings, compliance_scores, security_score, overall_risk_score, \
                  risk_level, checks_performed, checks_passed, checks_failed, \
                  standards_checked) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17) \
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, ConfigAnalysisResult>(&query)
            .bind(input.config_file_id)
            .bind(input.tenant_id)
            .bind(&input.analysis_version)
            .bind(input.total_findings)
            .bind(input.critical_findings)
            .bind(input.high_findings)
            .bind(input.medium_findings)
            .bind(input.low_findings)
            .bind(input.info_findings)
            .bind(&input.compliance_scores)
            .bind(input.security_score)
            .bind(input.overall_risk_score)
            .bind(&input.risk_level)
            .bind(input.checks_performed)
            .bind(input.checks_passed)
            .bind(input.checks_failed)
            .bind(&input.standards_checked)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok((row, created))
    }

    /// Latest (and only) result for a file.
    pub async fn find_by_file(
        pool: &PgPool,
        config_file_id: Uuid,
    ) -> Result<Option<ConfigAnalysisResult>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM config_analysis_results WHERE config_file_id = $1");
        sqlx::query_as::<_, ConfigAnalysisResult>(&query)
            .bind(config_file_id)
            .fetch_optional(pool)
            .await
    }
}
