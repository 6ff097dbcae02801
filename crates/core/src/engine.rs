//! Rule engine: evaluates catalog standards and built-in heuristic checks
//! against one parsed configuration document.
//!
//! Deterministic by construction — no randomness, no clock reads. Given the
//! same file content and the same catalog snapshot the finding set is
//! identical across runs, which is what makes re-analysis idempotent.

use regex::Regex;
use serde_json::Value;
use uuid::Uuid;

use crate::catalog::{CatalogStandard, CheckKind, MAX_PATTERN_LEN};
use crate::severity::Severity;

/// Well-known account names flagged when present in parsed user lists.
pub const DEFAULT_USER_ACCOUNTS: &[&str] = &["admin", "root", "cisco", "user", "guest"];

// ---------------------------------------------------------------------------
// Finding types
// ---------------------------------------------------------------------------

/// Origin class of a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FindingType {
    /// A catalog standard was violated.
    ComplianceViolation,
    /// Built-in heuristic: default/well-known account name present.
    DefaultCredentials,
    /// Built-in heuristic: clear-text remote-access protocol enabled.
    InsecureProtocol,
    /// Built-in heuristic: weak cryptographic primitive configured.
    WeakCipher,
}

impl FindingType {
    pub fn as_str(self) -> &'static str {
        match self {
            FindingType::ComplianceViolation => "compliance_violation",
            FindingType::DefaultCredentials => "default_credentials",
            FindingType::InsecureProtocol => "insecure_protocol",
            FindingType::WeakCipher => "weak_cipher",
        }
    }
}

// ---------------------------------------------------------------------------
// FindingDraft
// ---------------------------------------------------------------------------

/// One detected violation, not yet persisted.
///
/// `standard_id` is `None` for built-in heuristic findings.
#[derive(Debug, Clone)]
pub struct FindingDraft {
    pub standard_id: Option<Uuid>,
    pub finding_type: FindingType,
    pub severity: Severity,
    pub category: String,
    pub title: String,
    pub description: String,
    pub affected_component: String,
    pub config_snippet: String,
    /// 1-based line numbers, best effort; empty when no line matched.
    pub line_numbers: Vec<i64>,
    pub frameworks: Vec<String>,
    pub remediation: String,
    pub remediation_priority: String,
    /// 0.0–1.0, derived from severity.
    pub risk_score: f64,
}

/// Location evidence for one violation.
#[derive(Debug, Default)]
struct Violation {
    line_numbers: Vec<i64>,
    snippet: String,
}

// ---------------------------------------------------------------------------
// Evaluation entry point
// ---------------------------------------------------------------------------

/// Evaluate every standard plus the built-in heuristics against one file.
///
/// `document` is the parsed key-path document, `raw_text` the original file
/// content. Standards whose check cannot be evaluated (oversized or
/// ill-formed pattern) are skipped whole, never half-evaluated.
pub fn evaluate(
    standards: &[CatalogStandard],
    document: &Value,
    raw_text: &str,
) -> Vec<FindingDraft> {
    let lines: Vec<&str> = raw_text.lines().collect();

    let mut findings: Vec<FindingDraft> = standards
        .iter()
        .filter_map(|standard| {
            check_standard(&standard.check, document, raw_text, &lines)
                .map(|violation| draft_from_standard(standard, violation))
        })
        .collect();

    findings.extend(builtin_checks(document, raw_text));
    findings
}

fn draft_from_standard(standard: &CatalogStandard, violation: Violation) -> FindingDraft {
    FindingDraft {
        standard_id: Some(standard.id),
        finding_type: FindingType::ComplianceViolation,
        severity: standard.severity,
        category: standard.category.clone(),
        title: standard.title.clone(),
        description: standard.description.clone(),
        affected_component: standard.check.config_path().unwrap_or_default().to_string(),
        config_snippet: violation.snippet,
        line_numbers: violation.line_numbers,
        frameworks: standard.frameworks.clone(),
        remediation: standard.remediation.clone(),
        remediation_priority: standard.priority.clone(),
        risk_score: standard.severity.default_risk_score(),
    }
}

// ---------------------------------------------------------------------------
// Check dispatch
// ---------------------------------------------------------------------------

/// Returns `Some(violation)` if the check fails, `None` if it passes or
/// cannot be evaluated.
fn check_standard(
    check: &CheckKind,
    document: &Value,
    raw_text: &str,
    lines: &[&str],
) -> Option<Violation> {
    match check {
        CheckKind::Presence { path } => {
            if lookup_path(document, path).is_some() {
                return None;
            }
            // Point at lines mentioning the path, but the evidence is the
            // absence itself — no snippet.
            let (line_numbers, _) = lines_containing(lines, path, true);
            Some(Violation {
                line_numbers,
                snippet: String::new(),
            })
        }

        CheckKind::Absence { path } => {
            lookup_path(document, path)?;
            let (line_numbers, snippet) = lines_containing(lines, path, true);
            Some(Violation {
                line_numbers,
                snippet,
            })
        }

        CheckKind::PatternMatch { pattern, expected } => {
            if pattern.is_empty() || pattern.len() > MAX_PATTERN_LEN {
                return None;
            }
            let regex = Regex::new(pattern).ok()?;

            let matches: Vec<&str> = regex.find_iter(raw_text).map(|m| m.as_str()).collect();
            if matches.is_empty() {
                // The pattern was required to appear at least once.
                return Some(Violation::default());
            }

            let expected_pattern = expected.as_deref()?;
            if expected_pattern.len() > MAX_PATTERN_LEN {
                return None;
            }
            let expected_regex = Regex::new(expected_pattern).ok()?;

            for matched in matches {
                if !expected_regex.is_match(matched) {
                    let (line_numbers, snippet) = lines_containing(lines, matched, false);
                    return Some(Violation {
                        line_numbers,
                        snippet,
                    });
                }
            }
            None
        }

        CheckKind::ValueMatch { path, expected } => {
            let value = lookup_path(document, path)?;
            if value_as_string(value) == *expected {
                return None;
            }
            let (line_numbers, snippet) = lines_containing(lines, path, false);
            Some(Violation {
                line_numbers,
                snippet,
            })
        }
    }
}

// ---------------------------------------------------------------------------
// Document helpers
// ---------------------------------------------------------------------------

/// Resolve a dotted key path (`"snmp.version"`) in the parsed document.
pub fn lookup_path<'a>(document: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = document;
    for part in path.split('.') {
        current = current.as_object()?.get(part)?;
    }
    Some(current)
}

/// Render a JSON value the way it appears in config text: strings without
/// quotes, everything else via its JSON form.
fn value_as_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Find 1-based line numbers containing `needle`, concatenating matched
/// lines into a snippet.
fn lines_containing(lines: &[&str], needle: &str, case_insensitive: bool) -> (Vec<i64>, String) {
    let needle_lower = needle.to_lowercase();
    let mut line_numbers = Vec::new();
    let mut snippet = String::new();

    for (i, line) in lines.iter().enumerate() {
        let hit = if case_insensitive {
            line.to_lowercase().contains(&needle_lower)
        } else {
            line.contains(needle)
        };
        if hit {
            line_numbers.push((i + 1) as i64);
            snippet.push_str(line);
            snippet.push('\n');
        }
    }

    (line_numbers, snippet)
}

// ---------------------------------------------------------------------------
// Built-in heuristic checks
// ---------------------------------------------------------------------------

/// Catalog-independent checks that run on every analysis.
fn builtin_checks(document: &Value, raw_text: &str) -> Vec<FindingDraft> {
    let mut findings = Vec::new();

    // Default/well-known account names in parsed user lists.
    if let Some(users) = document.get("user_accounts").and_then(Value::as_array) {
        for user in users {
            let Some(username) = user.get("username").and_then(Value::as_str) else {
                continue;
            };
            if DEFAULT_USER_ACCOUNTS.contains(&username.to_lowercase().as_str()) {
                findings.push(FindingDraft {
                    standard_id: None,
                    finding_type: FindingType::DefaultCredentials,
                    severity: Severity::High,
                    category: "authentication".to_string(),
                    title: "Default User Account Detected".to_string(),
                    description: format!(
                        "Default user account '{username}' is present in configuration"
                    ),
                    affected_component: format!("user: {username}"),
                    config_snippet: String::new(),
                    line_numbers: Vec::new(),
                    frameworks: Vec::new(),
                    remediation: "Remove default user accounts or change default passwords"
                        .to_string(),
                    remediation_priority: "high".to_string(),
                    risk_score: Severity::High.default_risk_score(),
                });
            }
        }
    }

    // Clear-text remote access: telnet enabled and not explicitly disabled.
    let text_lower = raw_text.to_lowercase();
    if text_lower.contains("telnet") && !text_lower.contains("no telnet") {
        findings.push(FindingDraft {
            standard_id: None,
            finding_type: FindingType::InsecureProtocol,
            severity: Severity::High,
            category: "network".to_string(),
            title: "Telnet Protocol Enabled".to_string(),
            description: "Telnet is an insecure protocol that transmits data in plaintext"
                .to_string(),
            affected_component: String::new(),
            config_snippet: String::new(),
            line_numbers: Vec::new(),
            frameworks: Vec::new(),
            remediation: "Disable Telnet and use SSH instead".to_string(),
            remediation_priority: "high".to_string(),
            risk_score: Severity::High.default_risk_score(),
        });
    }

    // Weak cryptographic primitives inside the parsed crypto block.
    if let Some(crypto_lines) = lookup_path(document, "crypto.config").and_then(Value::as_array) {
        for line in crypto_lines.iter().filter_map(Value::as_str) {
            let line_lower = line.to_lowercase();
            if line_lower.contains("md5") || line_lower.contains("des") {
                findings.push(FindingDraft {
                    standard_id: None,
                    finding_type: FindingType::WeakCipher,
                    severity: Severity::Medium,
                    category: "encryption".to_string(),
                    title: "Weak Encryption Algorithm Detected".to_string(),
                    description: format!("Weak encryption algorithm found: {line}"),
                    affected_component: String::new(),
                    config_snippet: line.to_string(),
                    line_numbers: Vec::new(),
                    frameworks: Vec::new(),
                    remediation: "Use strong encryption algorithms (AES-256, SHA-256)".to_string(),
                    remediation_priority: "medium".to_string(),
                    risk_score: Severity::Medium.default_risk_score(),
                });
            }
        }
    }

    findings
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn standard(check: CheckKind, severity: Severity) -> CatalogStandard {
        CatalogStandard {
            id: Uuid::new_v4(),
            requirement_id: "REQ-1".into(),
            title: "Test requirement".into(),
            description: "A test requirement".into(),
            category: "network".into(),
            severity,
            frameworks: vec!["PCI DSS".into()],
            remediation: "Fix it".into(),
            priority: "high".into(),
            check,
        }
    }

    // -- lookup_path ---------------------------------------------------------

    #[test]
    fn lookup_path_walks_nested_objects() {
        let doc = json!({"snmp": {"version": "2c", "enabled": true}});
        assert_eq!(lookup_path(&doc, "snmp.version"), Some(&json!("2c")));
        assert_eq!(lookup_path(&doc, "snmp.enabled"), Some(&json!(true)));
    }

    #[test]
    fn lookup_path_missing_key_is_none() {
        let doc = json!({"snmp": {"version": "2c"}});
        assert_eq!(lookup_path(&doc, "snmp.community"), None);
        assert_eq!(lookup_path(&doc, "ntp.server"), None);
    }

    #[test]
    fn lookup_path_through_non_object_is_none() {
        let doc = json!({"snmp": "enabled"});
        assert_eq!(lookup_path(&doc, "snmp.version"), None);
    }

    // -- presence ------------------------------------------------------------

    #[test]
    fn presence_violated_when_path_missing() {
        let doc = json!({"logging": {"enabled": true}});
        let standards = vec![standard(
            CheckKind::Presence {
                path: "ntp.server".into(),
            },
            Severity::Medium,
        )];
        let findings = evaluate(&standards, &doc, "logging host 10.0.0.1\n");
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::Medium);
        assert_eq!(findings[0].finding_type, FindingType::ComplianceViolation);
    }

    #[test]
    fn presence_satisfied_when_path_resolves() {
        let doc = json!({"ntp": {"server": "10.0.0.5"}});
        let standards = vec![standard(
            CheckKind::Presence {
                path: "ntp.server".into(),
            },
            Severity::Medium,
        )];
        assert!(evaluate(&standards, &doc, "ntp server 10.0.0.5\n").is_empty());
    }

    // -- absence -------------------------------------------------------------

    #[test]
    fn absence_violated_with_line_evidence() {
        let doc = json!({"telnet": {"enabled": true}});
        let raw = "hostname edge-router\nno telnet timeout\ntelnet.enabled true\n";
        let standards = vec![standard(
            CheckKind::Absence {
                path: "telnet.enabled".into(),
            },
            Severity::High,
        )];
        let findings = evaluate(&standards, &doc, raw);

        // One catalog violation; the raw text also trips the telnet
        // heuristic, which is catalog-independent.
        let catalog: Vec<_> = findings
            .iter()
            .filter(|f| f.standard_id.is_some())
            .collect();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog[0].severity, Severity::High);
        assert_eq!(catalog[0].category, "network");
        assert_eq!(catalog[0].line_numbers, vec![3]);
        assert!(catalog[0].config_snippet.contains("telnet.enabled true"));
    }

    #[test]
    fn absence_satisfied_when_path_missing() {
        let doc = json!({"ssh": {"enabled": true}});
        let standards = vec![standard(
            CheckKind::Absence {
                path: "telnet.enabled".into(),
            },
            Severity::High,
        )];
        assert!(evaluate(&standards, &doc, "ssh enabled\n").is_empty());
    }

    // -- pattern_match -------------------------------------------------------

    #[test]
    fn pattern_match_missing_pattern_is_a_violation() {
        let standards = vec![standard(
            CheckKind::PatternMatch {
                pattern: "aaa new-model".into(),
                expected: None,
            },
            Severity::High,
        )];
        let findings = evaluate(&standards, &json!({}), "hostname core\n");
        assert_eq!(findings.len(), 1);
        assert!(findings[0].line_numbers.is_empty());
    }

    #[test]
    fn pattern_match_every_match_must_satisfy_expected() {
        let raw = "snmp-server community public\nsnmp-server community s3cr3t\n";
        let standards = vec![standard(
            CheckKind::PatternMatch {
                pattern: r"snmp-server community \S+".into(),
                expected: Some(r"community (?:s3cr3t|private)".into()),
            },
            Severity::Critical,
        )];
        let findings = evaluate(&standards, &json!({}), raw);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].line_numbers, vec![1]);
    }

    #[test]
    fn pattern_match_passes_when_all_matches_satisfy_expected() {
        let raw = "snmp-server community s3cr3t\n";
        let standards = vec![standard(
            CheckKind::PatternMatch {
                pattern: r"snmp-server community \S+".into(),
                expected: Some("s3cr3t".into()),
            },
            Severity::Critical,
        )];
        assert!(evaluate(&standards, &json!({}), raw).is_empty());
    }

    #[test]
    fn oversized_pattern_is_skipped() {
        let standards = vec![standard(
            CheckKind::PatternMatch {
                pattern: "a".repeat(MAX_PATTERN_LEN + 1),
                expected: None,
            },
            Severity::Critical,
        )];
        assert!(evaluate(&standards, &json!({}), "anything").is_empty());
    }

    #[test]
    fn invalid_pattern_is_skipped() {
        let standards = vec![standard(
            CheckKind::PatternMatch {
                pattern: "[unclosed".into(),
                expected: None,
            },
            Severity::Critical,
        )];
        assert!(evaluate(&standards, &json!({}), "anything").is_empty());
    }

    // -- value_match ---------------------------------------------------------

    #[test]
    fn value_match_mismatch_is_a_violation() {
        let doc = json!({"snmp": {"version": "2c"}});
        let standards = vec![standard(
            CheckKind::ValueMatch {
                path: "snmp.version".into(),
                expected: "3".into(),
            },
            Severity::High,
        )];
        let findings = evaluate(&standards, &doc, "snmp.version 2c\n");
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].line_numbers, vec![1]);
    }

    #[test]
    fn value_match_accepts_equal_value_and_missing_path() {
        let doc = json!({"snmp": {"version": "3"}});
        let check = CheckKind::ValueMatch {
            path: "snmp.version".into(),
            expected: "3".into(),
        };
        assert!(evaluate(&[standard(check.clone(), Severity::High)], &doc, "").is_empty());

        // Missing path is not a value mismatch.
        assert!(evaluate(&[standard(check, Severity::High)], &json!({}), "").is_empty());
    }

    #[test]
    fn value_match_renders_booleans_without_quotes() {
        let doc = json!({"ssh": {"enabled": true}});
        let standards = vec![standard(
            CheckKind::ValueMatch {
                path: "ssh.enabled".into(),
                expected: "true".into(),
            },
            Severity::High,
        )];
        assert!(evaluate(&standards, &doc, "ssh enabled\n").is_empty());
    }

    // -- built-in heuristics -------------------------------------------------

    #[test]
    fn default_account_flagged_case_insensitively() {
        let doc = json!({"user_accounts": [
            {"username": "Admin"},
            {"username": "operator-7"},
        ]});
        let findings = evaluate(&[], &doc, "");
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].finding_type, FindingType::DefaultCredentials);
        assert_eq!(findings[0].standard_id, None);
        assert_eq!(findings[0].affected_component, "user: Admin");
    }

    #[test]
    fn telnet_heuristic_respects_explicit_disable() {
        let flagged = evaluate(&[], &json!({}), "line vty 0 4\n transport input telnet\n");
        assert_eq!(flagged.len(), 1);
        assert_eq!(flagged[0].finding_type, FindingType::InsecureProtocol);

        let disabled = evaluate(&[], &json!({}), "no telnet\n");
        assert!(disabled.is_empty());
    }

    #[test]
    fn weak_cipher_flagged_inside_crypto_block() {
        let doc = json!({"crypto": {"config": [
            "crypto ikev1 policy 10 hash md5",
            "crypto ipsec transform-set strong esp-aes-256",
        ]}});
        let findings = evaluate(&[], &doc, "");
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].finding_type, FindingType::WeakCipher);
        assert_eq!(findings[0].severity, Severity::Medium);
    }

    // -- determinism ---------------------------------------------------------

    #[test]
    fn evaluation_is_deterministic() {
        let doc = json!({
            "telnet": {"enabled": true},
            "user_accounts": [{"username": "admin"}],
        });
        let raw = "telnet.enabled true\nusername admin password x\n";
        let standards = vec![standard(
            CheckKind::Absence {
                path: "telnet.enabled".into(),
            },
            Severity::High,
        )];

        let first = evaluate(&standards, &doc, raw);
        let second = evaluate(&standards, &doc, raw);

        assert_eq!(first.len(), second.len());
        for (a, b) in first.iter().zip(&second) {
            assert_eq!(a.standard_id, b.standard_id);
            assert_eq!(a.finding_type, b.finding_type);
            assert_eq!(a.severity, b.severity);
            assert_eq!(a.line_numbers, b.line_numbers);
        }
    }
}
