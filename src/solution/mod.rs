//! Solution model: the path normalizer and the project registry.

pub mod paths;
pub mod registry;

pub use registry::{Project, ProjectGroup, ProjectRegistry};
