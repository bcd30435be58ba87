use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::core::package::PackageId;
use crate::source::traits::DependencySource;
use crate::source::SourceError;

/// Local stand-in for a registry, read from a plain-text file of
/// `name: dep1 dep2 ...` lines.
#[derive(Debug, Clone, Default)]
pub struct MockRepository {
    pub path: PathBuf,
    packages: HashMap<PackageId, Vec<PackageId>>,
}

impl MockRepository {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| SourceError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(path, &content)
    }

    /// Parses the whole file up front so a malformed line fails the load
    /// instead of surfacing halfway through a traversal.
    pub fn parse(path: impl AsRef<Path>, content: &str) -> Result<Self, SourceError> {
        let path = path.as_ref().to_path_buf();
        let mut packages = HashMap::new();

        for (idx, raw) in content.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }
            let format_error = || SourceError::Format {
                path: path.clone(),
                line: idx + 1,
                content: line.to_string(),
            };

            if line.matches(':').count() != 1 {
                return Err(format_error());
            }
            let (name, deps) = line.split_once(':').ok_or_else(format_error)?;
            let name = name.trim();
            if name.is_empty() {
                return Err(format_error());
            }

            let deps: Vec<PackageId> = deps.split_whitespace().map(PackageId::from).collect();
            if packages.insert(PackageId::from(name), deps).is_some() {
                debug!(package = name, line = idx + 1, "later mock repository entry wins");
            }
        }

        Ok(Self { path, packages })
    }

    pub fn contains(&self, package: &PackageId) -> bool {
        self.packages.contains_key(package)
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}

impl DependencySource for MockRepository {
    fn dependencies(&mut self, package: &PackageId) -> Result<Vec<PackageId>, SourceError> {
        match self.packages.get(package) {
            Some(deps) => Ok(deps.clone()),
            None => {
                debug!(package = %package, "package not listed in mock repository");
                Ok(Vec::new())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::time::{SystemTime, UNIX_EPOCH};

    use crate::core::package::PackageId;
    use crate::source::mock::MockRepository;
    use crate::source::traits::DependencySource;
    use crate::source::SourceError;

    fn id(name: &str) -> PackageId {
        PackageId::from(name)
    }

    #[test]
    fn parses_names_and_dependency_lists() {
        let mut repo = MockRepository::parse("repo.txt", "A: B C\nB: D\n\n  C:D  \nD:\n")
            .expect("parse mock repository");
        assert_eq!(repo.len(), 4);
        assert_eq!(repo.dependencies(&id("A")).expect("deps"), vec![id("B"), id("C")]);
        assert_eq!(repo.dependencies(&id("C")).expect("deps"), vec![id("D")]);
        assert!(repo.dependencies(&id("D")).expect("deps").is_empty());
    }

    #[test]
    fn line_without_colon_is_a_format_error() {
        let err = MockRepository::parse("repo.txt", "A: B\nfoo-bar\n").expect_err("must reject");
        match err {
            SourceError::Format { line, content, .. } => {
                assert_eq!(line, 2);
                assert_eq!(content, "foo-bar");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn line_with_two_colons_is_a_format_error() {
        let err = MockRepository::parse("repo.txt", "A: B: C\n").expect_err("must reject");
        assert!(matches!(err, SourceError::Format { line: 1, .. }));
    }

    #[test]
    fn empty_package_name_is_a_format_error() {
        let err = MockRepository::parse("repo.txt", ": B\n").expect_err("must reject");
        assert!(matches!(err, SourceError::Format { line: 1, .. }));
    }

    #[test]
    fn hash_prefixed_line_without_colon_is_a_format_error() {
        let err = MockRepository::parse("repo.txt", "A: B\n#foo-bar\n").expect_err("must reject");
        match err {
            SourceError::Format { line, content, .. } => {
                assert_eq!(line, 2);
                assert_eq!(content, "#foo-bar");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unlisted_package_has_no_dependencies() {
        let mut repo = MockRepository::parse("repo.txt", "A: B\n").expect("parse");
        assert!(!repo.contains(&id("B")));
        assert!(repo.dependencies(&id("B")).expect("deps").is_empty());
    }

    #[test]
    fn duplicate_dependencies_on_one_line_are_kept() {
        let mut repo = MockRepository::parse("repo.txt", "A: B B\n").expect("parse");
        assert_eq!(repo.dependencies(&id("A")).expect("deps"), vec![id("B"), id("B")]);
    }

    #[test]
    fn load_reports_missing_file() {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock before epoch")
            .as_nanos();
        let path = std::env::temp_dir().join(format!("depviz-missing-{nanos}.txt"));
        let err = MockRepository::load(&path).expect_err("missing file");
        assert!(matches!(err, SourceError::Io { .. }));
    }

    #[test]
    fn load_reads_file_from_disk() {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock before epoch")
            .as_nanos();
        let path = std::env::temp_dir().join(format!(
            "depviz-mock-{}-{nanos}.txt",
            std::process::id()
        ));
        fs::write(&path, "app: core\ncore:\n").expect("write mock repository");
        let repo = MockRepository::load(&path).expect("load mock repository");
        assert!(repo.contains(&id("app")));
        assert_eq!(repo.path, path);
        let _ = fs::remove_file(&path);
    }
}
