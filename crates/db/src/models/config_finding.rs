//! Config finding entity models and DTOs.

use cfgaudit_core::engine::FindingDraft;
use cfgaudit_core::types::Timestamp;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::status::FindingStatus;

/// A row from the `config_findings` table.
///
/// Written once by an analysis run; immutable afterwards except for
/// reviewer status transitions.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ConfigFinding {
    pub id: Uuid,
    pub config_file_id: Uuid,
    pub tenant_id: Uuid,
    pub finding_type: String,
    pub severity: String,
    pub category: String,
    pub title: String,
    pub description: String,
    pub affected_component: String,
    pub config_snippet: String,
    /// JSON array of 1-based line numbers; empty when no line matched.
    pub line_numbers: serde_json::Value,
    /// `None` for built-in heuristic findings.
    pub standard_id: Option<Uuid>,
    pub compliance_frameworks: serde_json::Value,
    pub remediation: String,
    pub remediation_priority: String,
    /// 0.0–1.0.
    pub risk_score: f64,
    pub status: String,
    pub resolved_at: Option<Timestamp>,
    pub resolved_by: Option<Uuid>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl ConfigFinding {
    pub fn status(&self) -> Option<FindingStatus> {
        FindingStatus::parse(&self.status)
    }
}

/// Insert DTO, produced from the rule engine's output.
#[derive(Debug, Clone)]
pub struct NewConfigFinding {
    pub config_file_id: Uuid,
    pub tenant_id: Uuid,
    pub finding_type: String,
    pub severity: String,
    pub category: String,
    pub title: String,
    pub description: String,
    pub affected_component: String,
    pub config_snippet: String,
    pub line_numbers: serde_json::Value,
    pub standard_id: Option<Uuid>,
    pub compliance_frameworks: serde_json::Value,
    pub remediation: String,
    pub remediation_priority: String,
    pub risk_score: f64,
}

impl NewConfigFinding {
    /// Build the insert DTO from one engine finding.
    pub fn from_draft(config_file_id: Uuid, tenant_id: Uuid, draft: &FindingDraft) -> Self {
        Self {
            config_file_id,
            tenant_id,
            finding_type: draft.finding_type.as_str().to_string(),
            severity: draft.severity.as_str().to_string(),
            category: draft.category.clone(),
            title: draft.title.clone(),
            description: draft.description.clone(),
            affected_component: draft.affected_component.clone(),
            config_snippet: draft.config_snippet.clone(),
            line_numbers: serde_json::json!(draft.line_numbers),
            standard_id: draft.standard_id,
            compliance_frameworks: serde_json::json!(draft.frameworks),
            remediation: draft.remediation.clone(),
            remediation_priority: draft.remediation_priority.clone(),
            risk_score: draft.risk_score,
        }
    }
}

/// Query parameters for listing a file's findings.
#[derive(Debug, Default, Deserialize)]
pub struct FindingListQuery {
    pub severity: Option<String>,
    pub category: Option<String>,
    pub status: Option<String>,
    pub finding_type: Option<String>,
    /// Maximum number of results. Defaults to 50, capped at 100.
    pub limit: Option<i64>,
    /// Number of results to skip. Defaults to 0.
    pub offset: Option<i64>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use cfgaudit_core::engine::FindingType;
    use cfgaudit_core::severity::Severity;

    #[test]
    fn from_draft_maps_enums_to_strings() {
        let draft = FindingDraft {
            standard_id: None,
            finding_type: FindingType::InsecureProtocol,
            severity: Severity::High,
            category: "network".into(),
            title: "Telnet Protocol Enabled".into(),
            description: "d".into(),
            affected_component: String::new(),
            config_snippet: String::new(),
            line_numbers: vec![3, 9],
            frameworks: vec!["PCI DSS".into()],
            remediation: "Disable Telnet".into(),
            remediation_priority: "high".into(),
            risk_score: 0.7,
        };

        let new = NewConfigFinding::from_draft(Uuid::new_v4(), Uuid::new_v4(), &draft);
        assert_eq!(new.finding_type, "insecure_protocol");
        assert_eq!(new.severity, "high");
        assert_eq!(new.line_numbers, serde_json::json!([3, 9]));
        assert_eq!(new.compliance_frameworks, serde_json::json!(["PCI DSS"]));
        assert_eq!(new.standard_id, None);
    }
}
