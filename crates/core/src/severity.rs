//! Severity tiers, score weights, and risk bucketing.
//!
//! The weights and thresholds here feed the scorer; changing them changes
//! every security score the pipeline produces, so they are named constants
//! rather than inline literals.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Severity
// ---------------------------------------------------------------------------

/// Finding severity tier, highest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
    Info,
}

impl Severity {
    /// Database / wire representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
            Severity::Info => "info",
        }
    }

    /// Weight used in the overall security score. Critical findings drag
    /// the score down twenty times harder than informational ones.
    pub fn weight(self) -> f64 {
        match self {
            Severity::Critical => WEIGHT_CRITICAL,
            Severity::High => WEIGHT_HIGH,
            Severity::Medium => WEIGHT_MEDIUM,
            Severity::Low => WEIGHT_LOW,
            Severity::Info => WEIGHT_INFO,
        }
    }

    /// Default 0.0–1.0 risk score assigned to a finding of this severity.
    pub fn default_risk_score(self) -> f64 {
        match self {
            Severity::Critical => RISK_SCORE_CRITICAL,
            Severity::High => RISK_SCORE_HIGH,
            Severity::Medium => RISK_SCORE_MEDIUM,
            Severity::Low => RISK_SCORE_LOW,
            Severity::Info => RISK_SCORE_INFO,
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "critical" => Ok(Severity::Critical),
            "high" => Ok(Severity::High),
            "medium" => Ok(Severity::Medium),
            "low" => Ok(Severity::Low),
            "info" => Ok(Severity::Info),
            other => Err(CoreError::Validation(format!(
                "Unknown severity '{other}'"
            ))),
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Score weights
// ---------------------------------------------------------------------------

pub const WEIGHT_CRITICAL: f64 = 10.0;
pub const WEIGHT_HIGH: f64 = 5.0;
pub const WEIGHT_MEDIUM: f64 = 2.0;
pub const WEIGHT_LOW: f64 = 1.0;
pub const WEIGHT_INFO: f64 = 0.5;

// ---------------------------------------------------------------------------
// Risk scores by severity
// ---------------------------------------------------------------------------

pub const RISK_SCORE_CRITICAL: f64 = 0.9;
pub const RISK_SCORE_HIGH: f64 = 0.7;
pub const RISK_SCORE_MEDIUM: f64 = 0.5;
pub const RISK_SCORE_LOW: f64 = 0.3;
pub const RISK_SCORE_INFO: f64 = 0.1;

// ---------------------------------------------------------------------------
// Risk level bucketing
// ---------------------------------------------------------------------------

pub const RISK_THRESHOLD_CRITICAL: f64 = 0.8;
pub const RISK_THRESHOLD_HIGH: f64 = 0.6;
pub const RISK_THRESHOLD_MEDIUM: f64 = 0.4;

/// Bucket a mean 0.0–1.0 risk score into an overall risk level.
pub fn risk_level(mean_risk: f64) -> Severity {
    if mean_risk >= RISK_THRESHOLD_CRITICAL {
        Severity::Critical
    } else if mean_risk >= RISK_THRESHOLD_HIGH {
        Severity::High
    } else if mean_risk >= RISK_THRESHOLD_MEDIUM {
        Severity::Medium
    } else {
        Severity::Low
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
