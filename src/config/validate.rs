use std::path::PathBuf;
use std::sync::OnceLock;
use std::time::Duration;

use regex::Regex;
use reqwest::Url;
use thiserror::Error;

use crate::config::{Mode, RawSettings, RepoLocation, Settings, DEFAULT_TIMEOUT_SECS};
use crate::core::package::PackageId;
use crate::graph::builder::FetchPolicy;

const VERSION_PATTERN: &str = r"^\d+\.\d+\.\d+(-[0-9A-Za-z.-]+)?(\+[0-9A-Za-z.-]+)?$";

fn version_regex() -> Result<&'static Regex, ValidationError> {
    static VERSION_RE: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();
    VERSION_RE
        .get_or_init(|| Regex::new(VERSION_PATTERN))
        .as_ref()
        .map_err(|err| ValidationError::VersionPattern(err.to_string()))
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("missing required parameter --name")]
    MissingName,
    #[error("invalid package name '{0}' (must not contain path separators)")]
    InvalidName(String),
    #[error("missing required parameter --repo")]
    MissingRepo,
    #[error("mode '{mode}' needs an http(s) registry URL, got '{repo}'")]
    RepoNotUrl { mode: Mode, repo: String },
    #[error("repo path does not exist: {0}")]
    RepoPathMissing(PathBuf),
    #[error("repo path is not a file: {0}")]
    RepoNotFile(PathBuf),
    #[error("invalid --mode: {0} (allowed: off, local, remote, test)")]
    InvalidMode(String),
    #[error("missing required parameter --version")]
    MissingVersion,
    #[error("invalid --version: {0} (expected semver like 1.2.3 or 'latest')")]
    InvalidVersion(String),
    #[error("version pattern failed to compile: {0}")]
    VersionPattern(String),
    #[error("invalid --fetch-errors: {0} (allowed: abort, leaf)")]
    InvalidFetchPolicy(String),
    #[error("--timeout must be at least one second")]
    InvalidTimeout,
}

/// Turns merged raw values into settings the core can run with. Checks run
/// in a fixed order and the first failure is returned.
pub fn validate(raw: RawSettings) -> Result<Settings, ValidationError> {
    let name = name(raw.name.as_deref())?;
    let mode = mode(raw.mode.as_deref())?;
    let repo = repo(raw.repo.as_deref(), mode)?;
    let version = version(raw.version.as_deref())?;
    let fetch_policy = fetch_policy(raw.fetch_errors.as_deref())?;
    let timeout = timeout(raw.timeout_secs)?;

    Ok(Settings {
        name,
        repo,
        mode,
        version,
        fetch_policy,
        timeout,
    })
}

pub fn name(input: Option<&str>) -> Result<PackageId, ValidationError> {
    let name = input.map(str::trim).unwrap_or_default();
    if name.is_empty() {
        return Err(ValidationError::MissingName);
    }
    if name.contains(['/', '\\']) || name == "." || name == ".." {
        return Err(ValidationError::InvalidName(name.to_string()));
    }
    Ok(PackageId::new(name))
}

pub fn mode(input: Option<&str>) -> Result<Mode, ValidationError> {
    match input {
        None => Ok(Mode::Off),
        Some(raw) => Mode::parse(raw).ok_or_else(|| ValidationError::InvalidMode(raw.to_string())),
    }
}

pub fn repo(input: Option<&str>, mode: Mode) -> Result<RepoLocation, ValidationError> {
    let repo = input.map(str::trim).unwrap_or_default();
    if repo.is_empty() {
        return Err(ValidationError::MissingRepo);
    }

    if mode.uses_mock_repository() {
        let path = PathBuf::from(repo);
        if !path.exists() {
            return Err(ValidationError::RepoPathMissing(path));
        }
        if !path.is_file() {
            return Err(ValidationError::RepoNotFile(path));
        }
        return Ok(RepoLocation::File(path));
    }

    match Url::parse(repo) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.has_host() => {
            Ok(RepoLocation::Registry(repo.to_string()))
        }
        _ => Err(ValidationError::RepoNotUrl {
            mode,
            repo: repo.to_string(),
        }),
    }
}

pub fn version(input: Option<&str>) -> Result<String, ValidationError> {
    let version = input.map(str::trim).unwrap_or_default();
    if version.is_empty() {
        return Err(ValidationError::MissingVersion);
    }
    if version == "latest" {
        return Ok(version.to_string());
    }

    if !version_regex()?.is_match(version) {
        return Err(ValidationError::InvalidVersion(version.to_string()));
    }
    Ok(version.to_string())
}

pub fn fetch_policy(input: Option<&str>) -> Result<FetchPolicy, ValidationError> {
    match input.map(|raw| raw.trim().to_ascii_lowercase()).as_deref() {
        None | Some("abort") => Ok(FetchPolicy::Abort),
        Some("leaf") => Ok(FetchPolicy::TreatAsLeaf),
        Some(_) => Err(ValidationError::InvalidFetchPolicy(
            input.unwrap_or_default().to_string(),
        )),
    }
}

pub fn timeout(input: Option<u64>) -> Result<Duration, ValidationError> {
    match input.unwrap_or(DEFAULT_TIMEOUT_SECS) {
        0 => Err(ValidationError::InvalidTimeout),
        secs => Ok(Duration::from_secs(secs)),
    }
}
