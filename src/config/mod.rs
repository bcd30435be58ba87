pub mod file;
pub mod resolve;
pub mod validate;

pub use file::FileConfig;
pub use validate::{validate, ValidationError};

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::core::package::PackageId;
use crate::graph::builder::FetchPolicy;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    ConfigNotFound(PathBuf),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config at {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

pub type Result<T> = std::result::Result<T, ConfigError>;

pub const DEFAULT_CONFIG_FILE: &str = "depviz.toml";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Which supplier backs the traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Off,
    Local,
    Remote,
    Test,
}

impl Mode {
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "off" => Some(Self::Off),
            "local" => Some(Self::Local),
            "remote" => Some(Self::Remote),
            "test" => Some(Self::Test),
            _ => None,
        }
    }

    /// Local and test modes read a mock repository file instead of a registry.
    pub fn uses_mock_repository(self) -> bool {
        matches!(self, Self::Local | Self::Test)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Off => "off",
            Self::Local => "local",
            Self::Remote => "remote",
            Self::Test => "test",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepoLocation {
    Registry(String),
    File(PathBuf),
}

impl fmt::Display for RepoLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Registry(url) => f.write_str(url),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Values gathered from flags, environment and config file before
/// validation. Every field is optional at this stage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawSettings {
    pub name: Option<String>,
    pub repo: Option<String>,
    pub mode: Option<String>,
    pub version: Option<String>,
    pub fetch_errors: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl RawSettings {
    /// Fills every unset field from `fallback`.
    pub fn or(self, fallback: RawSettings) -> RawSettings {
        RawSettings {
            name: self.name.or(fallback.name),
            repo: self.repo.or(fallback.repo),
            mode: self.mode.or(fallback.mode),
            version: self.version.or(fallback.version),
            fetch_errors: self.fetch_errors.or(fallback.fetch_errors),
            timeout_secs: self.timeout_secs.or(fallback.timeout_secs),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub name: PackageId,
    pub repo: RepoLocation,
    pub mode: Mode,
    pub version: String,
    pub fetch_policy: FetchPolicy,
    pub timeout: Duration,
}

#[cfg(test)]
mod tests {
    use crate::config::{Mode, RawSettings};

    #[test]
    fn parses_modes_case_insensitively() {
        assert_eq!(Mode::parse("OFF"), Some(Mode::Off));
        assert_eq!(Mode::parse(" test "), Some(Mode::Test));
        assert_eq!(Mode::parse("online"), None);
        assert!(Mode::Local.uses_mock_repository());
        assert!(!Mode::Remote.uses_mock_repository());
    }

    #[test]
    fn earlier_source_wins_when_merging() {
        let cli = RawSettings {
            name: Some("cli-name".into()),
            ..RawSettings::default()
        };
        let file = RawSettings {
            name: Some("file-name".into()),
            version: Some("latest".into()),
            ..RawSettings::default()
        };
        let merged = cli.or(file);
        assert_eq!(merged.name.as_deref(), Some("cli-name"));
        assert_eq!(merged.version.as_deref(), Some("latest"));
        assert_eq!(merged.repo, None);
    }
}
