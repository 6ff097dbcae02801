//! Analysis result entity models.

use cfgaudit_core::scoring::{ScoreSummary, ANALYSIS_VERSION};
use cfgaudit_core::types::Timestamp;
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// A row from the `config_analysis_results` table.
///
/// One row per config file; re-analysis replaces the row rather than
/// appending history.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ConfigAnalysisResult {
    pub id: Uuid,
    pub config_file_id: Uuid,
    pub tenant_id: Uuid,
    pub analysis_version: String,
    pub total_findings: i32,
    pub critical_findings: i32,
    pub high_findings: i32,
    pub medium_findings: i32,
    pub low_findings: i32,
    pub info_findings: i32,
    /// JSON object: framework name → compliance percentage.
    pub compliance_scores: serde_json::Value,
    pub security_score: f64,
    pub overall_risk_score: f64,
    pub risk_level: String,
    pub checks_performed: i32,
    pub checks_passed: i32,
    pub checks_failed: i32,
    /// JSON array of the requirement ids evaluated in this run.
    pub standards_checked: serde_json::Value,
    pub created_at: Timestamp,
}

/// Insert DTO for an analysis result.
#[derive(Debug, Clone)]
pub struct NewAnalysisResult {
    pub config_file_id: Uuid,
    pub tenant_id: Uuid,
    pub analysis_version: String,
    pub total_findings: i32,
    pub critical_findings: i32,
    pub high_findings: i32,
    pub medium_findings: i32,
    pub low_findings: i32,
    pub info_findings: i32,
    pub compliance_scores: serde_json::Value,
    pub security_score: f64,
    pub overall_risk_score: f64,
    pub risk_level: String,
    pub checks_performed: i32,
    pub checks_passed: i32,
    pub checks_failed: i32,
    pub standards_checked: serde_json::Value,
}

impl NewAnalysisResult {
    /// Build the insert DTO from the scorer's aggregate.
    pub fn from_summary(config_file_id: Uuid, tenant_id: Uuid, summary: &ScoreSummary) -> Self {
        Self {
            config_file_id,
            tenant_id,
            analysis_version: ANALYSIS_VERSION.to_string(),
            total_findings: summary.total_findings,
            critical_findings: summary.critical_findings,
            high_findings: summary.high_findings,
            medium_findings: summary.medium_findings,
            low_findings: summary.low_findings,
            info_findings: summary.info_findings,
            compliance_scores: serde_json::json!(summary.compliance_scores),
            security_score: summary.security_score,
            overall_risk_score: summary.overall_risk_score,
            risk_level: summary.risk_level.as_str().to_string(),
            checks_performed: summary.checks_performed,
            checks_passed: summary.checks_passed,
            checks_failed: summary.checks_failed,
            standards_checked: serde_json::json!(summary.standards_checked),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
