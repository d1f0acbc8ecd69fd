//! Dependency resolution
//!
//! Maps a project's declared library dependencies back to the projects
//! that build them, and computes the relative paths used when a new
//! reference has to be written.

use std::path::{Path, PathBuf};

use crate::descriptor;
use crate::error::BuildorResult;
use crate::index::AssetIndex;
use crate::models::DependencyEdge;

const STATIC_LIB_SUFFIX: &str = ".lib";
const DYNAMIC_LIB_SUFFIX: &str = ".dll";

/// Resolve each declared dependency of `project` to the project that
/// produces it.
///
/// A `.lib` dependency with no producer is retried as a `.dll` of the
/// same base name before being given up on; dependencies on libraries
/// outside the indexed set (system libraries, third-party binaries) are
/// omitted, not errors. Order follows the declaration order and
/// duplicates are possible; de-duplication is the caller's business.
pub fn resolve_dependencies(project: &Path, index: &AssetIndex) -> BuildorResult<Vec<PathBuf>> {
    let mut producers = Vec::new();
    for dependency in descriptor::dependencies(project)? {
        if let Some(producer) = lookup(&dependency, index) {
            producers.push(producer.to_path_buf());
        }
    }
    Ok(producers)
}

/// The same resolution, shaped as explicit consumer-to-producer edges.
pub fn resolve_edges(project: &Path, index: &AssetIndex) -> BuildorResult<Vec<DependencyEdge>> {
    Ok(resolve_dependencies(project, index)?
        .into_iter()
        .map(|producer| DependencyEdge {
            consumer: project.to_path_buf(),
            producer,
        })
        .collect())
}

fn lookup<'a>(dependency: &str, index: &'a AssetIndex) -> Option<&'a Path> {
    if let Some(producer) = index.get(dependency) {
        return Some(producer);
    }
    // A static-library dependency is satisfiable by a dynamic library of
    // the same base name.
    let base = dependency.strip_suffix(STATIC_LIB_SUFFIX)?;
    index.get(&format!("{base}{DYNAMIC_LIB_SUFFIX}"))
}

/// Path from the directory at `source_dir` to `target_project`, assuming
/// both are rooted at the same place.
///
/// Both paths are canonicalized to forward-slash form, the longest common
/// leading-directory prefix is stripped, and the result climbs out of the
/// remaining source directories before descending to the target file.
pub fn relative_path(source_dir: &Path, target_project: &Path) -> String {
    let source = source_dir.to_string_lossy().replace('\\', "/");
    let target = target_project.to_string_lossy().replace('\\', "/");

    let mut source_segments: Vec<&str> = source.split('/').collect();
    let mut target_segments: Vec<&str> = target.split('/').collect();
    let file_name = target_segments.pop().unwrap_or_default();

    while !source_segments.is_empty()
        && !target_segments.is_empty()
        && source_segments[0] == target_segments[0]
    {
        source_segments.remove(0);
        target_segments.remove(0);
    }

    let mut relative = String::new();
    for _ in &source_segments {
        relative.push_str("../");
    }
    for segment in &target_segments {
        relative.push_str(segment);
        relative.push('/');
    }
    relative.push_str(file_name);
    relative
}
