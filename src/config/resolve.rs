use std::path::{Path, PathBuf};

use crate::config::{ConfigError, FileConfig, DEFAULT_CONFIG_FILE};

/// An explicit path must exist; otherwise `depviz.toml` in `start` is used
/// when present.
pub fn resolve_config_path(
    start: impl AsRef<Path>,
    explicit: Option<PathBuf>,
) -> Result<Option<PathBuf>, ConfigError> {
    if let Some(path) = explicit {
        if !path.is_file() {
            return Err(ConfigError::ConfigNotFound(path));
        }
        return Ok(Some(path));
    }

    let candidate = start.as_ref().join(DEFAULT_CONFIG_FILE);
    Ok(candidate.is_file().then_some(candidate))
}

pub fn load_file_config(path: &Path) -> Result<FileConfig, ConfigError> {
    if !path.is_file() {
        return Err(ConfigError::ConfigNotFound(path.to_path_buf()));
    }

    let contents = std::fs::read_to_string(path)?;
    toml::from_str(&contents).map_err(|source| ConfigError::Toml {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::time::{SystemTime, UNIX_EPOCH};

    use crate::config::resolve::{load_file_config, resolve_config_path};
    use crate::config::ConfigError;

    fn unique_temp_dir(prefix: &str) -> std::path::PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock before epoch")
            .as_nanos();
        let pid = std::process::id();
        std::env::temp_dir().join(format!("depviz-{prefix}-{pid}-{nanos}"))
    }

    #[test]
    fn explicit_missing_path_is_an_error() {
        let root = unique_temp_dir("config-missing");
        let err = resolve_config_path(&root, Some(root.join("nope.toml")))
            .expect_err("missing explicit config");
        assert!(matches!(err, ConfigError::ConfigNotFound(_)));
    }

    #[test]
    fn discovers_default_file_in_start_dir() {
        let root = unique_temp_dir("config-discover");
        fs::create_dir_all(&root).expect("create root");
        assert_eq!(resolve_config_path(&root, None).expect("resolve"), None);

        fs::write(root.join("depviz.toml"), "mode = \"test\"\n").expect("write config");
        let found = resolve_config_path(&root, None).expect("resolve");
        assert_eq!(found, Some(root.join("depviz.toml")));

        let config = load_file_config(&root.join("depviz.toml")).expect("load config");
        assert_eq!(config.mode.as_deref(), Some("test"));

        let _ = fs::remove_dir_all(root);
    }

    #[test]
    fn invalid_toml_reports_path() {
        let root = unique_temp_dir("config-invalid");
        fs::create_dir_all(&root).expect("create root");
        let path = root.join("depviz.toml");
        fs::write(&path, "name = [unterminated\n").expect("write config");

        let err = load_file_config(&path).expect_err("invalid toml");
        match err {
            ConfigError::Toml { path: reported, .. } => assert_eq!(reported, path),
            other => panic!("unexpected error: {other}"),
        }

        let _ = fs::remove_dir_all(root);
    }
}
