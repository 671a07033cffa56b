use anyhow::{Context, Result};
use quire_core::{EditorConfig, DEFAULT_CONFIG_NAME};
use std::path::Path;

/// Load the editor config from an explicit file, or from
/// `quire.config.json` in `cwd` when there is one
pub fn load_config(cwd: &Path, explicit: Option<&Path>) -> Result<EditorConfig> {
    match explicit {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Cannot read config {}", path.display()))?;
            Ok(EditorConfig::from_json(&content)?)
        }
        None => EditorConfig::load(cwd)
            .with_context(|| format!("Cannot load {} from {}", DEFAULT_CONFIG_NAME, cwd.display())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("quire-cli-{}-{}", name, std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_missing_config_gives_defaults() {
        let dir = scratch_dir("missing");
        let config = load_config(&dir, None).unwrap();
        assert_eq!(config, EditorConfig::default());
    }

    #[test]
    fn test_config_from_cwd() {
        let dir = scratch_dir("cwd");
        std::fs::write(
            dir.join(DEFAULT_CONFIG_NAME),
            r#"{ "pasteFromOffice": { "enabled": false } }"#,
        )
        .unwrap();

        let config = load_config(&dir, None).unwrap();
        assert!(!config.paste_from_office.enabled);
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_explicit_config_must_exist() {
        let dir = scratch_dir("explicit");
        let result = load_config(&dir, Some(&dir.join("nope.json")));
        assert!(result.is_err());
    }
}
