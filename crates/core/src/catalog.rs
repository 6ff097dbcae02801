//! In-memory snapshot of compliance standards for one analysis run.
//!
//! The catalog is read-only while the rule engine runs. Rows come from the
//! `config_standards` table; [`CheckKind`] replaces the stored `check_type`
//! string with a closed set of variants so the engine dispatch is
//! exhaustive at compile time.

use uuid::Uuid;

use crate::severity::Severity;

/// Upper bound on the length of a check pattern before compilation.
/// Oversized patterns are skipped whole, never half-evaluated.
pub const MAX_PATTERN_LEN: usize = 1000;

// ---------------------------------------------------------------------------
// CheckKind
// ---------------------------------------------------------------------------

/// The condition a standard asserts over a configuration file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckKind {
    /// The config path must resolve to a value; absence is a violation.
    Presence { path: String },

    /// The config path must resolve to nothing; presence is a violation.
    /// Used for "must not configure X".
    Absence { path: String },

    /// The pattern must match at least once in the raw text, and every
    /// match must additionally satisfy the expected sub-pattern (when set).
    PatternMatch {
        pattern: String,
        expected: Option<String>,
    },

    /// The value at the config path must string-equal `expected`.
    ValueMatch { path: String, expected: String },
}

impl CheckKind {
    /// Build a check from the stored row columns.
    ///
    /// Returns `None` for check types this engine does not know; the
    /// caller skips such standards instead of failing the whole run.
    pub fn from_row(
        check_type: &str,
        config_path: &str,
        pattern: &str,
        expected_value: &str,
    ) -> Option<CheckKind> {
        match check_type {
            "presence" => Some(CheckKind::Presence {
                path: config_path.to_string(),
            }),
            "absence" => Some(CheckKind::Absence {
                path: config_path.to_string(),
            }),
            "pattern_match" => Some(CheckKind::PatternMatch {
                pattern: pattern.to_string(),
                expected: if expected_value.is_empty() {
                    None
                } else {
                    Some(expected_value.to_string())
                },
            }),
            "value_match" => Some(CheckKind::ValueMatch {
                path: config_path.to_string(),
                expected: expected_value.to_string(),
            }),
            _ => None,
        }
    }

    /// The config path this check targets, if it has one. Used to fill the
    /// finding's `affected_component`.
    pub fn config_path(&self) -> Option<&str> {
        match self {
            CheckKind::Presence { path }
            | CheckKind::Absence { path }
            | CheckKind::ValueMatch { path, .. } => Some(path),
            CheckKind::PatternMatch { .. } => None,
        }
    }
}

// ---------------------------------------------------------------------------
// CatalogStandard
// ---------------------------------------------------------------------------

/// One compliance rule, scoped to a `(manufacturer, device_type)` pair.
#[derive(Debug, Clone)]
pub struct CatalogStandard {
    pub id: Uuid,
    /// Stable identifier like "CIS-CISCO-1.2.3"; reported in the analysis
    /// result's `standards_checked` list.
    pub requirement_id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub severity: Severity,
    /// Compliance framework tags, e.g. `["PCI DSS", "SOC2"]`.
    pub frameworks: Vec<String>,
    pub remediation: String,
    pub priority: String,
    pub check: CheckKind,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
