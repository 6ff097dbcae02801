//! Parser boundary: turns raw uploaded bytes into the key-path document
//! the rule engine consumes.
//!
//! The document shape is the contract — the engine resolves dotted paths
//! like `telnet.enabled` or `crypto.config` against it. Per-vendor grammar
//! fidelity is not a goal of the text parser; it extracts the sections the
//! compliance checks care about.

use cfgaudit_core::sniff::ConfigFormat;
use cfgaudit_core::CoreError;
use regex::Regex;
use serde_json::{json, Map, Value};

/// Format-specific parsing, the only outbound call the processor makes
/// that is not persistence.
pub trait ConfigParse: Send + Sync {
    fn parse(&self, raw: &[u8], format: ConfigFormat) -> Result<Value, CoreError>;
}

/// Default parser for device configuration exports.
#[derive(Debug, Default)]
pub struct DeviceConfigParser;

impl ConfigParse for DeviceConfigParser {
    fn parse(&self, raw: &[u8], format: ConfigFormat) -> Result<Value, CoreError> {
        match format {
            ConfigFormat::Json => parse_json(raw),
            ConfigFormat::Xml => parse_xml(raw),
            ConfigFormat::Text => parse_text(raw),
        }
    }
}

// ---------------------------------------------------------------------------
// JSON
// ---------------------------------------------------------------------------

fn parse_json(raw: &[u8]) -> Result<Value, CoreError> {
    let value: Value = serde_json::from_slice(raw)
        .map_err(|e| CoreError::Parse(format!("invalid JSON configuration: {e}")))?;
    if !value.is_object() {
        return Err(CoreError::Parse(
            "JSON configuration must be an object at the top level".to_string(),
        ));
    }
    Ok(value)
}

// ---------------------------------------------------------------------------
// XML
// ---------------------------------------------------------------------------

/// Shallow extraction of named entries and zones. Enough for path checks
/// over exported firewall policies; a full XML tree is not modeled.
fn parse_xml(raw: &[u8]) -> Result<Value, CoreError> {
    let content = std::str::from_utf8(raw)
        .map_err(|_| CoreError::Parse("XML configuration is not valid UTF-8".to_string()))?;

    let entry_re = Regex::new(r#"<entry name="([^"]+)""#).map_err(internal)?;
    let zone_re = Regex::new(r#"<zone name="([^"]+)""#).map_err(internal)?;

    let entries: Vec<Value> = entry_re
        .captures_iter(content)
        .map(|c| json!({"name": c[1].to_string()}))
        .collect();
    let zones: Vec<Value> = zone_re
        .captures_iter(content)
        .map(|c| json!({"name": c[1].to_string()}))
        .collect();

    Ok(json!({
        "format": "xml",
        "entries": entries,
        "zones": zones,
    }))
}

fn internal(e: regex::Error) -> CoreError {
    CoreError::Internal(e.to_string())
}

// ---------------------------------------------------------------------------
// Line-oriented text
// ---------------------------------------------------------------------------

/// Parse a line-oriented config export (IOS/ASA style).
///
/// Produces the sections the engine's checks and heuristics resolve:
/// `hostname`, `version`, `domain_name`, `interfaces`, `access_lists`,
/// `user_accounts`, `logging`, `snmp`, `ssh`, `telnet`, `http_server`,
/// `crypto.config`.
fn parse_text(raw: &[u8]) -> Result<Value, CoreError> {
    let content = String::from_utf8_lossy(raw);

    let mut hostname = String::new();
    let mut version = String::new();
    let mut domain_name = String::new();
    let mut interfaces: Vec<Value> = Vec::new();
    let mut access_lists: Vec<Value> = Vec::new();
    let mut user_accounts: Vec<Value> = Vec::new();
    let mut logging = Map::new();
    let mut snmp = Map::new();
    let mut snmp_config: Vec<String> = Vec::new();
    let mut ssh = Map::new();
    let mut telnet = Map::new();
    let mut http_server = Map::new();
    let mut crypto_config: Vec<String> = Vec::new();

    for (i, raw_line) in content.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('!') {
            continue;
        }
        let line_number = (i + 1) as i64;

        if let Some(rest) = line.strip_prefix("hostname ") {
            hostname = rest.trim().to_string();
        } else if let Some(rest) = line.strip_prefix("ASA Version") {
            version = rest.trim().to_string();
        } else if let Some(rest) = line.strip_prefix("version ") {
            version = rest.trim().to_string();
        } else if let Some(rest) = line.strip_prefix("domain-name ") {
            domain_name = rest.trim().to_string();
        } else if line.starts_with("interface ") {
            if let Some(name) = line.split_whitespace().nth(1) {
                interfaces.push(json!({
                    "name": name,
                    "line_number": line_number,
                    "config": line,
                }));
            }
        } else if line.starts_with("access-list ") {
            if let Some(name) = line.split_whitespace().nth(1) {
                access_lists.push(json!({
                    "name": name,
                    "line_number": line_number,
                    "rule": line,
                }));
            }
        } else if line.starts_with("username ") {
            if let Some(username) = line.split_whitespace().nth(1) {
                user_accounts.push(json!({
                    "username": username,
                    "line_number": line_number,
                    "config": line,
                }));
            }
        } else if line.starts_with("logging ") {
            logging.insert("enabled".into(), Value::Bool(true));
            logging.insert("config".into(), Value::String(line.to_string()));
        } else if line.starts_with("snmp-server ") {
            snmp.insert("enabled".into(), Value::Bool(true));
            snmp_config.push(line.to_string());
        } else if line.starts_with("ssh ") {
            ssh.insert("enabled".into(), Value::Bool(true));
            ssh.insert("config".into(), Value::String(line.to_string()));
        } else if line.starts_with("telnet ") || line == "telnet" {
            telnet.insert("enabled".into(), Value::Bool(true));
            telnet.insert("config".into(), Value::String(line.to_string()));
        } else if line.starts_with("http server enable") {
            http_server.insert("enabled".into(), Value::Bool(true));
        } else if line.starts_with("crypto ") {
            crypto_config.push(line.to_string());
        }
    }

    if !snmp_config.is_empty() {
        snmp.insert("config".into(), json!(snmp_config));
    }

    let mut crypto = Map::new();
    if !crypto_config.is_empty() {
        crypto.insert("config".into(), json!(crypto_config));
    }

    let mut doc = Map::new();
    doc.insert("hostname".into(), Value::String(hostname));
    doc.insert("version".into(), Value::String(version));
    doc.insert("domain_name".into(), Value::String(domain_name));
    doc.insert("interfaces".into(), Value::Array(interfaces));
    doc.insert("access_lists".into(), Value::Array(access_lists));
    doc.insert("user_accounts".into(), Value::Array(user_accounts));
    doc.insert("logging".into(), Value::Object(logging));
    doc.insert("snmp".into(), Value::Object(snmp));
    doc.insert("ssh".into(), Value::Object(ssh));
    doc.insert("telnet".into(), Value::Object(telnet));
    doc.insert("http_server".into(), Value::Object(http_server));
    doc.insert("crypto".into(), Value::Object(crypto));
    Ok(Value::Object(doc))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
