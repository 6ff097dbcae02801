//! Compliance standard entity models.

use cfgaudit_core::catalog::{CatalogStandard, CheckKind};
use cfgaudit_core::severity::Severity;
use cfgaudit_core::types::Timestamp;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A row from the `config_standards` table.
///
/// Immutable during an analysis run; the pipeline only reads active rows.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ConfigStandard {
    pub id: Uuid,
    pub standard_name: String,
    pub standard_version: String,
    pub manufacturer: String,
    pub device_type: String,
    pub category: String,
    pub requirement_id: String,
    pub requirement_title: String,
    pub requirement_description: String,
    /// JSON array of framework tags, e.g. `["PCI DSS", "SOC2"]`.
    pub compliance_frameworks: serde_json::Value,
    pub check_type: String,
    pub check_config_path: String,
    pub check_pattern: String,
    pub expected_value: String,
    pub default_severity: String,
    pub priority: String,
    pub remediation_guidance: String,
    pub status: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl ConfigStandard {
    /// Convert the stored row into the engine's catalog form.
    ///
    /// Returns `None` when the row carries an unknown check type or
    /// severity; such rows are skipped (and logged by the caller) rather
    /// than failing the whole analysis run.
    pub fn to_catalog(&self) -> Option<CatalogStandard> {
        let check = CheckKind::from_row(
            &self.check_type,
            &self.check_config_path,
            &self.check_pattern,
            &self.expected_value,
        )?;
        let severity: Severity = self.default_severity.parse().ok()?;
        let frameworks: Vec<String> =
            serde_json::from_value(self.compliance_frameworks.clone()).unwrap_or_default();

        Some(CatalogStandard {
            id: self.id,
            requirement_id: self.requirement_id.clone(),
            title: self.requirement_title.clone(),
            description: self.requirement_description.clone(),
            category: self.category.clone(),
            severity,
            frameworks,
            remediation: self.remediation_guidance.clone(),
            priority: self.priority.clone(),
            check,
        })
    }
}

/// Insert DTO for a new standard.
#[derive(Debug, Clone, Deserialize)]
pub struct NewConfigStandard {
    pub standard_name: String,
    pub standard_version: String,
    pub manufacturer: String,
    pub device_type: String,
    pub category: String,
    pub requirement_id: String,
    pub requirement_title: String,
    pub requirement_description: String,
    pub compliance_frameworks: Vec<String>,
    pub check_type: String,
    pub check_config_path: String,
    pub check_pattern: String,
    pub expected_value: String,
    pub default_severity: String,
    pub priority: String,
    pub remediation_guidance: String,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn row(check_type: &str, severity: &str) -> ConfigStandard {
        ConfigStandard {
            id: Uuid::new_v4(),
            standard_name: "CIS Cisco IOS Benchmark".into(),
            standard_version: "1.0".into(),
            manufacturer: "Cisco".into(),
            device_type: "router".into(),
            category: "network".into(),
            requirement_id: "CIS-1.1".into(),
            requirement_title: "Disable telnet".into(),
            requirement_description: "Remote access must use SSH".into(),
            compliance_frameworks: serde_json::json!(["PCI DSS"]),
            check_type: check_type.into(),
            check_config_path: "telnet.enabled".into(),
            check_pattern: String::new(),
            expected_value: String::new(),
            default_severity: severity.into(),
            priority: "high".into(),
            remediation_guidance: "no telnet".into(),
            status: "active".into(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn to_catalog_maps_row_fields() {
        let catalog = row("absence", "high").to_catalog().unwrap();
        assert_eq!(catalog.severity, Severity::High);
        assert_eq!(catalog.frameworks, vec!["PCI DSS".to_string()]);
        assert_eq!(
            catalog.check,
            CheckKind::Absence {
                path: "telnet.enabled".into()
            }
        );
    }

    #[test]
    fn unknown_check_type_is_skipped() {
        assert!(row("check_script", "high").to_catalog().is_none());
    }

    #[test]
    fn unknown_severity_is_skipped() {
        assert!(row("absence", "severe").to_catalog().is_none());
    }
}
