use crate::core::package::PackageId;
use crate::source::SourceError;

/// Answers "what does this package directly depend on?".
///
/// Implementations may hit the network or a file; the graph builder only sees
/// the returned list. Closures with the same shape implement the trait too,
/// which keeps ad-hoc suppliers in tests short.
pub trait DependencySource {
    fn dependencies(&mut self, package: &PackageId) -> Result<Vec<PackageId>, SourceError>;
}

impl<F> DependencySource for F
where
    F: FnMut(&PackageId) -> Result<Vec<PackageId>, SourceError>,
{
    fn dependencies(&mut self, package: &PackageId) -> Result<Vec<PackageId>, SourceError> {
        self(package)
    }
}
