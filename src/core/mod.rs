pub mod package;

pub use package::{Node, NodeState, PackageId};
