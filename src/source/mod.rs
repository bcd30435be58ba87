pub mod mock;
pub mod nuget;
pub mod traits;

pub use mock::MockRepository;
pub use nuget::NuGetSource;
pub use traits::DependencySource;

use std::path::PathBuf;

use thiserror::Error;

use crate::core::package::PackageId;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("cannot read mock repository {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{path}:{line}: malformed line '{content}' (expected 'name: dep1 dep2 ...')")]
    Format {
        path: PathBuf,
        line: usize,
        content: String,
    },
    #[error("registry request failed for {url}: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("registry returned {status} for {url}")]
    Status { url: String, status: u16 },
    #[error("failed to parse registry response from {url}: {source}")]
    Json {
        url: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("version {version} of {package} not found in registry")]
    VersionNotFound { package: PackageId, version: String },
    #[error("registry lists no versions for {0}")]
    NoVersions(PackageId),
}
