use serde::Deserialize;

use crate::config::RawSettings;

/// Optional `depviz.toml` holding defaults for any command-line option.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub repo: Option<String>,
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub fetch_errors: Option<String>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl From<FileConfig> for RawSettings {
    fn from(file: FileConfig) -> Self {
        RawSettings {
            name: file.name,
            repo: file.repo,
            mode: file.mode,
            version: file.version,
            fetch_errors: file.fetch_errors,
            timeout_secs: file.timeout_secs,
        }
    }
}
