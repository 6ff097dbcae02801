//! Upload metadata validation: enumerated whitelists and content size
//! bounds.
//!
//! This is a hard input-validation boundary — unknown values fail the
//! submission, they are never downgraded to warnings.

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Size limits
// ---------------------------------------------------------------------------

/// Default maximum upload size (10 MiB); overridable via configuration.
pub const DEFAULT_MAX_FILE_SIZE: usize = 10 * 1024 * 1024;

// ---------------------------------------------------------------------------
// Enumerated whitelists
// ---------------------------------------------------------------------------

pub const VALID_DEVICE_TYPES: &[&str] = &[
    "firewall",
    "router",
    "switch",
    "load_balancer",
    "waf",
    "ids",
    "ips",
    "vpn_gateway",
    "wireless_controller",
    "other",
];

pub const VALID_CONFIG_TYPES: &[&str] = &[
    "running_config",
    "startup_config",
    "backup_config",
    "export_config",
    "other",
];

/// Manufacturers the parser and standard catalog know about. Compared
/// case-insensitively; the value is stored as uploaded.
pub const VALID_MANUFACTURERS: &[&str] = &[
    "cisco",
    "palo alto",
    "paloalto",
    "palo alto networks",
    "fortinet",
    "fortigate",
    "juniper",
    "other",
];

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Reject empty content and content over `max_size` bytes.
pub fn validate_content_size(len: usize, max_size: usize) -> Result<(), CoreError> {
    if len == 0 {
        return Err(CoreError::Validation(
            "File content cannot be empty".to_string(),
        ));
    }
    if len > max_size {
        return Err(CoreError::Validation(format!(
            "File size exceeds maximum allowed size of {max_size} bytes"
        )));
    }
    Ok(())
}

pub fn validate_device_type(device_type: &str) -> Result<(), CoreError> {
    if device_type.is_empty() {
        return Err(CoreError::Validation(
            "device_type is required".to_string(),
        ));
    }
    if !VALID_DEVICE_TYPES.contains(&device_type) {
        return Err(CoreError::Validation(format!(
            "Invalid device_type '{device_type}'. Must be one of: {}",
            VALID_DEVICE_TYPES.join(", ")
        )));
    }
    Ok(())
}

pub fn validate_config_type(config_type: &str) -> Result<(), CoreError> {
    if config_type.is_empty() {
        return Err(CoreError::Validation(
            "config_type is required".to_string(),
        ));
    }
    if !VALID_CONFIG_TYPES.contains(&config_type) {
        return Err(CoreError::Validation(format!(
            "Invalid config_type '{config_type}'. Must be one of: {}",
            VALID_CONFIG_TYPES.join(", ")
        )));
    }
    Ok(())
}

pub fn validate_manufacturer(manufacturer: &str) -> Result<(), CoreError> {
    if manufacturer.is_empty() {
        return Err(CoreError::Validation(
            "manufacturer is required".to_string(),
        ));
    }
    let lower = manufacturer.to_lowercase();
    if !VALID_MANUFACTURERS.contains(&lower.as_str()) {
        return Err(CoreError::Validation(format!(
            "Invalid manufacturer '{manufacturer}'. Must be one of: {}",
            VALID_MANUFACTURERS.join(", ")
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
