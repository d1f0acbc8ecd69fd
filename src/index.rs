//! Asset index construction
//!
//! Maps every artifact name to the project that builds it and narrows the
//! working project list down to projects whose artifact could be
//! determined. Candidates are examined first and the final list is built
//! in a second pass; nothing is removed from a list while it is walked.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::descriptor::{self, AssetResolution};
use crate::error::{BuildorError, BuildorResult};
use crate::fs;
use crate::models::ProjectFile;

/// What to do when two projects claim the same artifact name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicatePolicy {
    /// The project indexed later replaces the earlier one.
    #[default]
    LastWins,
    /// The project indexed first is kept.
    FirstWins,
    /// A collision aborts index construction.
    Error,
}

/// Reverse map from artifact name to the project that builds it.
///
/// Built once per run and read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssetIndex {
    entries: HashMap<String, PathBuf>,
}

impl AssetIndex {
    /// Project that produces `asset`, when one is indexed.
    pub fn get(&self, asset: &str) -> Option<&Path> {
        self.entries.get(asset).map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Path)> {
        self.entries
            .iter()
            .map(|(asset, path)| (asset.as_str(), path.as_path()))
    }
}

/// Non-fatal problem found while indexing, surfaced to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexWarning {
    /// The descriptor could not be read; the project is skipped.
    Unreadable { file: PathBuf, message: String },
    /// The configuration kind was not one we understand; the project is
    /// treated as producing no asset.
    UnknownKind { file: PathBuf, kind: String },
    /// Two projects claimed the same artifact and the policy picked one.
    DuplicateAsset {
        asset: String,
        kept: PathBuf,
        dropped: PathBuf,
    },
}

impl fmt::Display for IndexWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unreadable { file, message } => {
                write!(f, "skipping {}: {message}", file.display())
            }
            Self::UnknownKind { file, kind } => {
                write!(f, "unknown configuration kind '{kind}' in {}", file.display())
            }
            Self::DuplicateAsset { asset, kept, dropped } => write!(
                f,
                "asset '{asset}' claimed twice; keeping {}, dropping {}",
                kept.display(),
                dropped.display()
            ),
        }
    }
}

/// Index plus the filtered working set it was built from.
#[derive(Debug)]
pub struct IndexOutcome {
    pub index: AssetIndex,
    /// Projects that produce an artifact; everything else is filtered
    /// out because it cannot be a dependency target.
    pub projects: Vec<ProjectFile>,
    pub warnings: Vec<IndexWarning>,
}

/// Build the asset index for a candidate project list.
///
/// Only fails under [`DuplicatePolicy::Error`] when two projects claim
/// the same artifact; every other problem is a warning and the build
/// continues.
pub fn build_index(
    candidates: &[PathBuf],
    policy: DuplicatePolicy,
) -> BuildorResult<IndexOutcome> {
    let mut warnings = Vec::new();
    let mut resolved: Vec<ProjectFile> = Vec::new();

    for path in candidates {
        let lines = match fs::read_lines(path) {
            Ok(lines) => lines,
            Err(err) => {
                warnings.push(IndexWarning::Unreadable {
                    file: path.clone(),
                    message: err.to_string(),
                });
                continue;
            }
        };
        match descriptor::produced_asset_in_lines(&lines) {
            AssetResolution::Produces(asset) => {
                resolved.push(ProjectFile::new(path.clone(), asset));
            }
            AssetResolution::UnknownKind(kind) => {
                warnings.push(IndexWarning::UnknownKind {
                    file: path.clone(),
                    kind,
                });
            }
            AssetResolution::NoArtifact | AssetResolution::Undetermined => {}
        }
    }

    let mut entries: HashMap<String, PathBuf> = HashMap::new();
    for project in &resolved {
        let Some(existing) = entries.get(&project.asset).cloned() else {
            entries.insert(project.asset.clone(), project.path.clone());
            continue;
        };
        match policy {
            DuplicatePolicy::LastWins => {
                warnings.push(IndexWarning::DuplicateAsset {
                    asset: project.asset.clone(),
                    kept: project.path.clone(),
                    dropped: existing,
                });
                entries.insert(project.asset.clone(), project.path.clone());
            }
            DuplicatePolicy::FirstWins => {
                warnings.push(IndexWarning::DuplicateAsset {
                    asset: project.asset.clone(),
                    kept: existing,
                    dropped: project.path.clone(),
                });
            }
            DuplicatePolicy::Error => {
                return Err(BuildorError::DuplicateAsset {
                    asset: project.asset.clone(),
                    first: existing,
                    second: project.path.clone(),
                });
            }
        }
    }

    Ok(IndexOutcome {
        index: AssetIndex { entries },
        projects: resolved,
        warnings,
    })
}
