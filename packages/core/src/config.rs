use crate::error::{EditorError, EditorResult};
use quire_engine::html::DEFAULT_MAX_DEPTH;
use quire_engine::view::MatcherPattern;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_CONFIG_NAME: &str = "quire.config.json";

/// Editor configuration file format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorConfig {
    /// Names of the roots created with the editor
    #[serde(default = "default_roots")]
    pub roots: Vec<String>,

    #[serde(default)]
    pub paste_from_office: PasteFromOfficeConfig,

    #[serde(default)]
    pub html_support: HtmlSupportConfig,
}

fn default_roots() -> Vec<String> {
    vec!["main".to_string()]
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasteFromOfficeConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Element nesting depth past which pasted Word content is given up on
    #[serde(default = "default_max_nesting_depth")]
    pub max_nesting_depth: usize,
}

fn default_enabled() -> bool {
    true
}

fn default_max_nesting_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

impl Default for PasteFromOfficeConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            max_nesting_depth: default_max_nesting_depth(),
        }
    }
}

/// Elements and properties let through (or stripped by) the HTML filter
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HtmlSupportConfig {
    #[serde(default)]
    pub allow: Vec<MatcherPattern>,

    #[serde(default)]
    pub disallow: Vec<MatcherPattern>,
}

impl EditorConfig {
    /// Load config from a directory, falling back to defaults when the
    /// directory has no config file
    pub fn load(cwd: impl AsRef<Path>) -> EditorResult<Self> {
        let config_path = cwd.as_ref().join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            Self::from_json(&content)
        } else {
            Ok(Self::default())
        }
    }

    pub fn from_json(json: &str) -> EditorResult<Self> {
        serde_json::from_str(json).map_err(|e| EditorError::Config(e.to_string()))
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            roots: default_roots(),
            paste_from_office: PasteFromOfficeConfig::default(),
            html_support: HtmlSupportConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let json = r#"{
            "roots": ["main", "sidebar"],
            "pasteFromOffice": { "maxNestingDepth": 64 },
            "htmlSupport": {
                "allow": [{ "name": "/^(div|section)$/", "classes": true }],
                "disallow": [{ "name": "div", "attributes": { "/^on/": true } }]
            }
        }"#;

        // `classes` must be a list
        assert!(EditorConfig::from_json(json).is_err());

        let json = json.replace(r#""classes": true"#, r#""classes": [true]"#);
        let config = EditorConfig::from_json(&json).unwrap();
        assert_eq!(config.roots, vec!["main", "sidebar"]);
        assert!(config.paste_from_office.enabled);
        assert_eq!(config.paste_from_office.max_nesting_depth, 64);
        assert_eq!(config.html_support.allow.len(), 1);
        assert_eq!(config.html_support.disallow[0].attributes.len(), 1);
    }

    #[test]
    fn test_default_config() {
        let config = EditorConfig::from_json("{}").unwrap();
        assert_eq!(config, EditorConfig::default());
        assert_eq!(config.roots, vec!["main"]);
        assert_eq!(config.paste_from_office.max_nesting_depth, DEFAULT_MAX_DEPTH);
        assert!(config.html_support.allow.is_empty());
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = std::env::temp_dir().join("quire-config-missing");
        let config = EditorConfig::load(&dir).unwrap();
        assert_eq!(config, EditorConfig::default());
    }

    #[test]
    fn test_load_from_directory() {
        let dir = std::env::temp_dir().join(format!("quire-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join(DEFAULT_CONFIG_NAME),
            r#"{ "pasteFromOffice": { "enabled": false } }"#,
        )
        .unwrap();

        let config = EditorConfig::load(&dir).unwrap();
        assert!(!config.paste_from_office.enabled);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_invalid_pattern_is_a_config_error() {
        let result = EditorConfig::from_json(r#"{ "htmlSupport": { "allow": [{ "name": "/(/" }] } }"#);
        assert!(matches!(result, Err(EditorError::Config(_))));
    }
}
