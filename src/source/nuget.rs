use std::collections::HashMap;
use std::time::Duration;

use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::core::package::PackageId;
use crate::source::traits::DependencySource;
use crate::source::SourceError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionSelector {
    Latest,
    Exact(String),
}

impl VersionSelector {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.is_empty() || raw.eq_ignore_ascii_case("latest") {
            Self::Latest
        } else {
            Self::Exact(raw.to_string())
        }
    }

    /// Picks the version NuGet itself would start from for a range: the
    /// inclusive lower bound. Exclusive or open lower bounds fall back to
    /// the latest listed version.
    pub fn from_range(range: Option<&str>) -> Self {
        let Some(range) = range.map(str::trim).filter(|range| !range.is_empty()) else {
            return Self::Latest;
        };
        if range.starts_with('(') {
            return Self::Latest;
        }
        let lower = range
            .trim_start_matches('[')
            .split(',')
            .next()
            .unwrap_or_default()
            .trim_end_matches(']')
            .trim();
        Self::parse(lower)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    pub id: PackageId,
    pub range: Option<String>,
}

/// Client for the NuGet V3 registration API. Each lookup resolves one
/// concrete version of a package and returns the dependencies that version
/// declares across all target frameworks.
#[derive(Debug, Clone)]
pub struct NuGetSource {
    pub base_url: String,
    root: PackageId,
    root_version: VersionSelector,
    pinned: HashMap<PackageId, VersionSelector>,
    client: Client,
}

impl NuGetSource {
    pub fn new(
        base_url: impl Into<String>,
        root: PackageId,
        root_version: VersionSelector,
        timeout: Duration,
    ) -> Result<Self, SourceError> {
        let base_url = base_url.into().trim().trim_end_matches('/').to_string();
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("depviz/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|source| SourceError::Request {
                url: base_url.clone(),
                source,
            })?;
        Ok(Self {
            base_url,
            root,
            root_version,
            pinned: HashMap::new(),
            client,
        })
    }

    fn index_url(&self, package: &PackageId) -> String {
        format!(
            "{}/{}/index.json",
            self.base_url,
            package.as_str().to_ascii_lowercase()
        )
    }

    fn selector_for(&self, package: &PackageId) -> VersionSelector {
        if package == &self.root {
            return self.root_version.clone();
        }
        self.pinned
            .get(package)
            .cloned()
            .unwrap_or(VersionSelector::Latest)
    }

    pub fn direct_dependencies(
        &self,
        package: &PackageId,
        selector: &VersionSelector,
    ) -> Result<Vec<Dependency>, SourceError> {
        let index: RegistrationIndex = self.get_json(&self.index_url(package))?;
        let mut entries = Vec::new();
        for page in index.items {
            match page.items {
                Some(leaves) => entries.extend(leaves.into_iter().map(|leaf| leaf.catalog_entry)),
                None => {
                    let Some(page_url) = page.id else {
                        continue;
                    };
                    let page: RegistrationPage = self.get_json(&page_url)?;
                    entries.extend(
                        page.items
                            .unwrap_or_default()
                            .into_iter()
                            .map(|leaf| leaf.catalog_entry),
                    );
                }
            }
        }

        if entries.is_empty() {
            return Err(SourceError::NoVersions(package.clone()));
        }
        let entry = select_entry(&entries, selector).ok_or_else(|| {
            let version = match selector {
                VersionSelector::Latest => "latest".to_string(),
                VersionSelector::Exact(version) => version.clone(),
            };
            SourceError::VersionNotFound {
                package: package.clone(),
                version,
            }
        })?;
        debug!(package = %package, version = %entry.version, "resolved registry version");

        Ok(entry
            .dependency_groups
            .iter()
            .flat_map(|group| group.dependencies.iter().flatten())
            .map(|dep| Dependency {
                id: PackageId::new(dep.id.clone()),
                range: dep.range.clone(),
            })
            .collect())
    }

    fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, SourceError> {
        debug!(url, "registry request");
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|source| SourceError::Request {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().map_err(|source| SourceError::Request {
            url: url.to_string(),
            source,
        })?;
        serde_json::from_str(&body).map_err(|source| SourceError::Json {
            url: url.to_string(),
            source,
        })
    }
}

impl DependencySource for NuGetSource {
    fn dependencies(&mut self, package: &PackageId) -> Result<Vec<PackageId>, SourceError> {
        let selector = self.selector_for(package);
        let deps = self.direct_dependencies(package, &selector)?;
        let mut ids = Vec::with_capacity(deps.len());
        for dep in deps {
            self.pinned
                .entry(dep.id.clone())
                .or_insert_with(|| VersionSelector::from_range(dep.range.as_deref()));
            ids.push(dep.id);
        }
        Ok(ids)
    }
}

fn select_entry<'a>(
    entries: &'a [CatalogEntry],
    selector: &VersionSelector,
) -> Option<&'a CatalogEntry> {
    match selector {
        VersionSelector::Exact(version) => entries
            .iter()
            .find(|entry| entry.version.eq_ignore_ascii_case(version)),
        VersionSelector::Latest => entries
            .iter()
            .filter_map(|entry| {
                semver::Version::parse(&entry.version)
                    .ok()
                    .map(|parsed| (parsed, entry))
            })
            .max_by(|a, b| a.0.cmp(&b.0))
            .map(|(_, entry)| entry)
            .or_else(|| entries.last()),
    }
}

#[derive(Debug, Deserialize)]
struct RegistrationIndex {
    #[serde(default)]
    items: Vec<RegistrationPage>,
}

#[derive(Debug, Deserialize)]
struct RegistrationPage {
    #[serde(rename = "@id", default)]
    id: Option<String>,
    #[serde(default)]
    items: Option<Vec<RegistrationLeaf>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegistrationLeaf {
    catalog_entry: CatalogEntry,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CatalogEntry {
    version: String,
    #[serde(default)]
    dependency_groups: Vec<DependencyGroup>,
}

#[derive(Debug, Deserialize)]
struct DependencyGroup {
    #[serde(default)]
    dependencies: Option<Vec<RegistryDependency>>,
}

#[derive(Debug, Deserialize)]
struct RegistryDependency {
    id: String,
    #[serde(default)]
    range: Option<String>,
}
