//! Lightweight content sniffing for the parser format hint.
//!
//! Advisory only — the parser may still fail on content that sniffed as a
//! given format, and that failure is what gets persisted.

use serde::{Deserialize, Serialize};

/// Sniffed configuration file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigFormat {
    Text,
    Json,
    Xml,
}

impl ConfigFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            ConfigFormat::Text => "text",
            ConfigFormat::Json => "json",
            ConfigFormat::Xml => "xml",
        }
    }
}

/// How many leading bytes to examine when the extension is inconclusive.
const SNIFF_WINDOW: usize = 100;

/// Detect the configuration format from the filename extension, falling
/// back to the first non-whitespace byte of the content.
pub fn detect_format(content: &[u8], filename: &str) -> ConfigFormat {
    match extension(filename) {
        Some("xml") => return ConfigFormat::Xml,
        Some("json") => return ConfigFormat::Json,
        Some("txt") | Some("cfg") | Some("conf") => return ConfigFormat::Text,
        _ => {}
    }

    let window = &content[..content.len().min(SNIFF_WINDOW)];
    match window.iter().find(|b| !b.is_ascii_whitespace()) {
        Some(b'<') => ConfigFormat::Xml,
        Some(b'{') | Some(b'[') => ConfigFormat::Json,
        _ => ConfigFormat::Text,
    }
}

fn extension(filename: &str) -> Option<&str> {
    std::path::Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
