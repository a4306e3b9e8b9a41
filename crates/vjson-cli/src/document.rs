//! # Document Loading
//!
//! Reads schema and instance files into [`Value`] trees. The format is
//! chosen by extension: `.yaml` and `.yml` are YAML, everything else is
//! JSON.

use std::path::Path;

use anyhow::{Context, Result};
use vjson_core::Value;

/// Serialization format of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Yaml,
}

impl Format {
    /// Pick a format from the extension of a path or URL.
    pub fn from_path(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or(path);
        match Path::new(path).extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
                Format::Yaml
            }
            _ => Format::Json,
        }
    }
}

/// Parse `text` as a document in `format`.
pub fn parse(text: &str, format: Format) -> Result<Value> {
    match format {
        Format::Json => serde_json::from_str(text).context("invalid JSON"),
        Format::Yaml => {
            let yaml: serde_yaml::Value = serde_yaml::from_str(text).context("invalid YAML")?;
            Value::try_from(yaml).context("YAML document is not representable as JSON")
        }
    }
}

/// Read and parse the file at `path`.
pub fn load(path: &Path) -> Result<Value> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    parse(&text, Format::from_path(&path.to_string_lossy()))
        .with_context(|| format!("failed to parse {}", path.display()))
}
