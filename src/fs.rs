//! Shared file I/O primitives
//!
//! Every component that reads or rewrites a file goes through these
//! helpers, so a rewrite is always a full read, an in-memory edit, and a
//! single atomic replace. No component ever holds a file open across an
//! operation.

use std::io::Write;
use std::path::Path;

use sha2::{Digest, Sha256};

use crate::error::{BuildorError, BuildorResult};

/// Read a whole file, attaching the path to any failure.
pub fn read_to_string(path: &Path) -> BuildorResult<String> {
    std::fs::read_to_string(path).map_err(|source| BuildorError::FileRead {
        file: path.to_path_buf(),
        source,
    })
}

/// Read a file as a line sequence. Line terminators are dropped; writers
/// re-join with `\n`.
pub fn read_lines(path: &Path) -> BuildorResult<Vec<String>> {
    Ok(read_to_string(path)?.lines().map(str::to_owned).collect())
}

/// Write content atomically via tempfile + rename in the target's
/// directory.
pub fn write_atomic(path: &Path, content: &str) -> BuildorResult<()> {
    let write_err = |source: std::io::Error| BuildorError::FileWrite {
        file: path.to_path_buf(),
        source,
    };

    let parent = path.parent().filter(|p| !p.as_os_str().is_empty());
    let mut tmp = tempfile::NamedTempFile::new_in(parent.unwrap_or_else(|| Path::new(".")))
        .map_err(write_err)?;
    tmp.write_all(content.as_bytes()).map_err(write_err)?;
    tmp.persist(path).map_err(|e| write_err(e.error))?;
    Ok(())
}

/// SHA-256 hash of a content buffer, used to detect no-op rewrites.
pub fn hash_content(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    format!("sha256:{:x}", hasher.finalize())
}
