//! Core data models
//!
//! - `ProjectFile`: one discovered build descriptor and the artifact it
//!   builds
//! - `DependencyEdge`: a resolved build-order relation

use std::path::PathBuf;

use crate::descriptor;
use crate::error::BuildorResult;

/// One build-descriptor file and the artifact it builds.
///
/// The path is the identity. Everything else is re-read from disk on
/// demand, so an in-place rewrite never leaves stale state behind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectFile {
    /// Path of the descriptor, unique across a run.
    pub path: PathBuf,

    /// Artifact name, e.g. `basis.lib` or `nechung.exe`.
    pub asset: String,
}

impl ProjectFile {
    pub fn new(path: impl Into<PathBuf>, asset: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            asset: asset.into(),
        }
    }

    /// GUID recorded in the descriptor, when present.
    pub fn guid(&self) -> BuildorResult<Option<String>> {
        descriptor::project_guid(&self.path)
    }

    /// Declared library dependencies.
    pub fn dependencies(&self) -> BuildorResult<Vec<String>> {
        descriptor::dependencies(&self.path)
    }
}

/// Build-order relation from a consuming project to the project that
/// produces one of its dependencies. Derived on each resolution pass,
/// never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyEdge {
    pub consumer: PathBuf,
    pub producer: PathBuf,
}
