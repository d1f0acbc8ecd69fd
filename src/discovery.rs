//! Project discovery
//!
//! Walks a source tree and collects every build-descriptor file, staying
//! out of version-control metadata directories.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{BuildorError, BuildorResult};

/// Version-control metadata directories that are never descended into.
const EXCLUDED_DIRS: [&str; 2] = ["CVS", ".svn"];

/// Case-insensitive suffix shared by all descriptor flavors
/// (`.vcxproj`, `.csproj`, ...).
const PROJECT_SUFFIX: &str = "proj";

/// Collect every descriptor file under `root`.
///
/// The root is an explicit argument; there is no ambient default. The
/// returned list is sorted so repeated scans of the same tree are
/// deterministic.
pub fn discover_projects(root: &Path) -> BuildorResult<Vec<PathBuf>> {
    if !root.is_dir() {
        return Err(BuildorError::DirectoryNotFound {
            path: root.to_path_buf(),
        });
    }

    let mut projects = Vec::new();
    discover_recursive(root, &mut projects)?;

    projects.sort();
    Ok(projects)
}

fn discover_recursive(current: &Path, projects: &mut Vec<PathBuf>) -> BuildorResult<()> {
    for entry in fs::read_dir(current)? {
        let entry = entry?;
        let path = entry.path();

        if path.is_dir() {
            let excluded = path
                .file_name()
                .and_then(|n| n.to_str())
                .map(|n| EXCLUDED_DIRS.contains(&n))
                .unwrap_or(false);
            if !excluded {
                discover_recursive(&path, projects)?;
            }
        } else {
            let name = entry.file_name().to_string_lossy().to_ascii_lowercase();
            if name.ends_with(PROJECT_SUFFIX) {
                projects.push(path);
            }
        }
    }

    Ok(())
}
