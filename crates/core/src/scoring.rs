//! Aggregation of findings into compliance percentages and an overall
//! security score.
//!
//! Uses `BTreeMap` for the per-framework map so serialized results are
//! stable across runs.

use std::collections::{BTreeMap, HashSet};

use uuid::Uuid;

use crate::catalog::CatalogStandard;
use crate::engine::FindingDraft;
use crate::severity::{risk_level, Severity};

/// Version tag recorded on every analysis result.
pub const ANALYSIS_VERSION: &str = "1.0";

pub const MAX_SECURITY_SCORE: f64 = 100.0;
pub const MIN_SECURITY_SCORE: f64 = 0.0;

// ---------------------------------------------------------------------------
// ScoreSummary
// ---------------------------------------------------------------------------

/// Everything the analysis result row needs, computed in one pass.
#[derive(Debug, Clone)]
pub struct ScoreSummary {
    pub total_findings: i32,
    pub critical_findings: i32,
    pub high_findings: i32,
    pub medium_findings: i32,
    pub low_findings: i32,
    pub info_findings: i32,
    /// Framework name → compliance percentage. Frameworks with zero
    /// applicable standards are omitted, not reported as 100%.
    pub compliance_scores: BTreeMap<String, f64>,
    /// Severity-weighted overall score in [0, 100]; 100 with no findings.
    pub security_score: f64,
    /// Mean of the findings' 0.0–1.0 risk scores; 0.0 with no findings.
    pub overall_risk_score: f64,
    pub risk_level: Severity,
    pub checks_performed: i32,
    pub checks_passed: i32,
    pub checks_failed: i32,
    /// Requirement ids of every standard evaluated.
    pub standards_checked: Vec<String>,
}

/// Compute the full aggregate for one analysis run.
pub fn summarize(findings: &[FindingDraft], standards: &[CatalogStandard]) -> ScoreSummary {
    let mut by_severity = [0i32; 5];
    for finding in findings {
        let idx = match finding.severity {
            Severity::Critical => 0,
            Severity::High => 1,
            Severity::Medium => 2,
            Severity::Low => 3,
            Severity::Info => 4,
        };
        by_severity[idx] += 1;
    }

    let overall_risk_score = mean_risk(findings);

    let checks_performed = standards.len() as i32;
    let checks_failed = violated_standard_count(findings) as i32;

    ScoreSummary {
        total_findings: findings.len() as i32,
        critical_findings: by_severity[0],
        high_findings: by_severity[1],
        medium_findings: by_severity[2],
        low_findings: by_severity[3],
        info_findings: by_severity[4],
        compliance_scores: compliance_scores(findings, standards),
        security_score: security_score(findings),
        overall_risk_score,
        risk_level: risk_level(overall_risk_score),
        checks_performed,
        checks_passed: checks_performed - checks_failed,
        checks_failed,
        standards_checked: standards.iter().map(|s| s.requirement_id.clone()).collect(),
    }
}

// ---------------------------------------------------------------------------
// Security score
// ---------------------------------------------------------------------------

/// Severity-weighted security score in [0, 100].
///
/// With no findings the score is the maximum. Otherwise
/// `100 · Σ w·(1 − risk) / Σ w` over all findings, clamped — the clamp is a
/// defensive bound, not expected to trigger with in-range weights and risks.
pub fn security_score(findings: &[FindingDraft]) -> f64 {
    if findings.is_empty() {
        return MAX_SECURITY_SCORE;
    }

    let mut total_weight = 0.0;
    let mut weighted = 0.0;
    for finding in findings {
        let weight = finding.severity.weight();
        total_weight += weight;
        weighted += weight * (1.0 - finding.risk_score);
    }

    if total_weight == 0.0 {
        return MAX_SECURITY_SCORE;
    }

    ((weighted / total_weight) * 100.0).clamp(MIN_SECURITY_SCORE, MAX_SECURITY_SCORE)
}

// ---------------------------------------------------------------------------
// Per-framework compliance
// ---------------------------------------------------------------------------

/// Percentage of evaluated standards per framework that produced no
/// violation.
pub fn compliance_scores(
    findings: &[FindingDraft],
    standards: &[CatalogStandard],
) -> BTreeMap<String, f64> {
    let violated = violated_standard_ids(findings);

    let mut totals: BTreeMap<&str, (u32, u32)> = BTreeMap::new();
    for standard in standards {
        let passed = !violated.contains(&standard.id);
        for framework in &standard.frameworks {
            let entry = totals.entry(framework).or_insert((0, 0));
            entry.0 += 1;
            if passed {
                entry.1 += 1;
            }
        }
    }

    totals
        .into_iter()
        .map(|(framework, (total, passed))| {
            (
                framework.to_string(),
                f64::from(passed) / f64::from(total) * 100.0,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Risk helpers
// ---------------------------------------------------------------------------

fn mean_risk(findings: &[FindingDraft]) -> f64 {
    if findings.is_empty() {
        return 0.0;
    }
    findings.iter().map(|f| f.risk_score).sum::<f64>() / findings.len() as f64
}

fn violated_standard_ids(findings: &[FindingDraft]) -> HashSet<Uuid> {
    findings.iter().filter_map(|f| f.standard_id).collect()
}

/// Number of distinct standards with at least one violation. Heuristic
/// findings carry no standard id and do not count against the catalog.
fn violated_standard_count(findings: &[FindingDraft]) -> usize {
    violated_standard_ids(findings).len()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
