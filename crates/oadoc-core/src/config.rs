use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;

/// Options for a single extraction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadOptions {
    /// Replaces the document-level `servers[0].url` as the base for every link.
    pub base_url: Option<String>,
}

/// Top-level project configuration loaded from `.oadoc.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct OadocConfig {
    pub input: String,
    pub format: OutputFormat,
    /// Refuse to extract documents that fail the structural grammar.
    pub strict: bool,
    pub base_url: Option<String>,
}

impl Default for OadocConfig {
    fn default() -> Self {
        Self {
            input: "openapi.yaml".to_string(),
            format: OutputFormat::Yaml,
            strict: false,
            base_url: None,
        }
    }
}

impl OadocConfig {
    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            base_url: self.base_url.clone(),
        }
    }
}

/// Serialization used when printing an extracted document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Yaml,
    Json,
}

/// Default config file name.
pub const CONFIG_FILE_NAME: &str = ".oadoc.yaml";

/// Load config from a YAML file. Returns `None` if the file doesn't exist.
pub fn load_config(path: &Path) -> Result<Option<OadocConfig>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config: OadocConfig =
        serde_yaml_ng::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(Some(config))
}

/// Generate the default config file content.
pub fn default_config_content() -> &'static str {
    r#"# oadoc configuration
input: openapi.yaml
format: yaml          # yaml | json
strict: false         # refuse documents that fail structural validation
# base_url: https://api.example.com
"#
}
