//! Reference rewriting
//!
//! Brings a descriptor's `ProjectReference` declarations in line with its
//! resolved dependencies: stale declarations pointing at a resolved
//! project are removed, declarations that already match are kept, and
//! missing ones are inserted with the producing project's GUID. All file
//! mutation goes through the shared read/write primitives, so each
//! descriptor is rewritten as one atomic replace.

use std::path::{Path, PathBuf};

use crate::descriptor;
use crate::error::BuildorResult;
use crate::fs;
use crate::resolve;

/// Planned edit for one descriptor. Nothing touches disk until the plan
/// is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewritePlan {
    pub project: PathBuf,
    /// `Include` values of the declarations being removed.
    pub removed: Vec<String>,
    /// Relative paths of the declarations being inserted.
    pub inserted: Vec<String>,
    /// File content before the edit, newline-normalized.
    pub original: String,
    /// File content after the edit.
    pub updated: String,
}

impl RewritePlan {
    /// True when applying the plan would change nothing.
    pub fn is_noop(&self) -> bool {
        fs::hash_content(self.updated.as_bytes()) == fs::hash_content(self.original.as_bytes())
    }
}

/// A dependency the plan wants referenced from the descriptor.
struct Candidate {
    path: PathBuf,
    relative: String,
    file_name: String,
    satisfied: bool,
}

/// Compute the edit that aligns `project`'s references with `resolved`.
///
/// A declaration matching a resolved dependency by file name but not by
/// path is stale and gets removed; one matching by full path is current
/// and suppresses re-insertion. Declarations pointing outside the
/// resolved set are left alone.
pub fn plan_rewrite(project: &Path, resolved: &[PathBuf]) -> BuildorResult<RewritePlan> {
    let lines = fs::read_lines(project)?;
    let project_dir = match project.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut candidates: Vec<Candidate> = Vec::new();
    for dep in resolved {
        let relative = resolve::relative_path(project_dir, dep);
        if candidates.iter().any(|c| c.relative == relative) {
            continue;
        }
        candidates.push(Candidate {
            path: dep.clone(),
            file_name: file_name_of(&relative),
            relative,
            satisfied: false,
        });
    }

    let mut keep = vec![true; lines.len()];
    let mut removed = Vec::new();
    let mut last_kept_reference: Option<usize> = None;

    let mut i = 0;
    while i < lines.len() {
        let Some(include) = descriptor::extract_attribute(&lines[i], "ProjectReference", "Include")
        else {
            i += 1;
            continue;
        };
        let span_end = reference_span_end(&lines, i);
        let normalized = include.replace('\\', "/");
        let name = file_name_of(&normalized);
        match candidates.iter_mut().find(|c| c.file_name == name) {
            Some(candidate) if candidate.relative == normalized => {
                candidate.satisfied = true;
                last_kept_reference = Some(span_end);
            }
            Some(_) => {
                for flag in &mut keep[i..=span_end] {
                    *flag = false;
                }
                removed.push(include.to_string());
            }
            None => {
                last_kept_reference = Some(span_end);
            }
        }
        i = span_end + 1;
    }

    let pending: Vec<&Candidate> = candidates.iter().filter(|c| !c.satisfied).collect();
    let inserted: Vec<String> = pending.iter().map(|c| c.relative.clone()).collect();

    let updated_lines = assemble(&lines, &keep, last_kept_reference, &pending);

    Ok(RewritePlan {
        project: project.to_path_buf(),
        removed,
        inserted,
        original: join_lines(&lines),
        updated: join_lines(&updated_lines),
    })
}

/// Write the planned edit back to disk. Returns `false` when the plan
/// changes nothing and the file is left untouched.
pub fn apply_plan(plan: &RewritePlan) -> BuildorResult<bool> {
    if plan.is_noop() {
        return Ok(false);
    }
    fs::write_atomic(&plan.project, &plan.updated)?;
    Ok(true)
}

/// Last line index of the reference declaration starting at `start`:
/// the start line itself when self-closing, otherwise the line carrying
/// the closing tag.
fn reference_span_end(lines: &[String], start: usize) -> usize {
    if lines[start].contains("/>") {
        return start;
    }
    lines[start..]
        .iter()
        .position(|line| line.contains("</ProjectReference"))
        .map_or(start, |offset| start + offset)
}

fn assemble(
    lines: &[String],
    keep: &[bool],
    last_kept_reference: Option<usize>,
    pending: &[&Candidate],
) -> Vec<String> {
    let insertion = insertion_block(lines, last_kept_reference, pending);
    let mut updated = Vec::with_capacity(lines.len() + insertion.len());
    let mut inserted = insertion.is_empty();

    for (idx, line) in lines.iter().enumerate() {
        if !keep[idx] {
            continue;
        }
        // A fresh item group lands just above the document's closing tag.
        if !inserted && last_kept_reference.is_none() && line.trim() == "</Project>" {
            updated.extend(insertion.iter().cloned());
            inserted = true;
        }
        updated.push(line.clone());
        // New declarations follow the last one that survived.
        if !inserted && last_kept_reference == Some(idx) {
            updated.extend(insertion.iter().cloned());
            inserted = true;
        }
    }
    if !inserted {
        updated.extend(insertion);
    }
    updated
}

fn insertion_block(
    lines: &[String],
    last_kept_reference: Option<usize>,
    pending: &[&Candidate],
) -> Vec<String> {
    if pending.is_empty() {
        return Vec::new();
    }

    match last_kept_reference {
        Some(anchor) => {
            let indent = leading_whitespace(&lines[anchor]);
            pending
                .iter()
                .flat_map(|candidate| reference_element(&indent, candidate))
                .collect()
        }
        None => {
            let mut block = vec!["  <ItemGroup>".to_string()];
            for candidate in pending {
                block.extend(reference_element("    ", candidate));
            }
            block.push("  </ItemGroup>".to_string());
            block
        }
    }
}

/// Render one reference declaration. The producing project's GUID is
/// recorded as a child element when the descriptor yields one.
fn reference_element(indent: &str, candidate: &Candidate) -> Vec<String> {
    let guid = descriptor::project_guid(&candidate.path).ok().flatten();
    match guid {
        Some(guid) => vec![
            format!("{indent}<ProjectReference Include=\"{}\">", candidate.relative),
            format!("{indent}  <Project>{guid}</Project>"),
            format!("{indent}</ProjectReference>"),
        ],
        None => vec![format!(
            "{indent}<ProjectReference Include=\"{}\" />",
            candidate.relative
        )],
    }
}

fn leading_whitespace(line: &str) -> String {
    line.chars().take_while(|c| c.is_whitespace()).collect()
}

fn file_name_of(path: &str) -> String {
    path.rsplit('/').next().unwrap_or(path).to_ascii_lowercase()
}

fn join_lines(lines: &[String]) -> String {
    let mut text = lines.join("\n");
    text.push('\n');
    text
}
