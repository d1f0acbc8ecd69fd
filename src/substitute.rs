//! Safe text substitution engine
//!
//! Replaces complete occurrences of a phrase in source-like text while
//! leaving `//` and `/* ... */` comments untouched. A match only counts
//! when the characters on both sides are non-alphanumeric, so `Goop` is
//! found in `*Goop` or `Goop[32]` but never inside `rGoop` or `Goop23`.
//!
//! Comment handling works line by line: once a comment opens, the rest of
//! that physical line is treated as comment text, and block-comment state
//! is re-evaluated at the next line. Code trailing a `*/` on the same
//! line is therefore also skipped.

use std::path::{Path, PathBuf};

use crate::error::BuildorResult;
use crate::fs;

/// One phrase-to-replacement rewrite, applied to whole files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubstitutionRequest {
    pub phrase: String,
    pub replacement: String,
}

/// Result of rewriting a single buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewritten {
    pub text: String,
    pub replacements: usize,
    /// The buffer ended while still inside a block comment.
    pub unclosed_comment: bool,
}

/// Outcome of one file in a batch run. Failures are carried, not raised,
/// so one bad file never stops the rest.
#[derive(Debug)]
pub struct FileOutcome {
    pub file: PathBuf,
    pub result: BuildorResult<Rewritten>,
}

/// Rewrite a whole buffer, honoring comments and phrase boundaries.
///
/// Output is reconstructed line by line and always ends in a newline.
pub fn rewrite_text(text: &str, request: &SubstitutionRequest) -> Rewritten {
    let mut out = String::with_capacity(text.len());
    let mut normal = String::new();
    let mut replacements = 0usize;
    let mut in_block = false;

    for line in text.lines() {
        if in_block {
            out.push_str(line);
            out.push('\n');
            if line.contains("*/") {
                in_block = false;
            }
            continue;
        }
        match comment_start(line) {
            Some((code, comment, opens_block)) => {
                normal.push_str(code);
                replacements += flush_normal(&mut normal, &mut out, request);
                out.push_str(comment);
                out.push('\n');
                if opens_block && !comment.contains("*/") {
                    in_block = true;
                }
            }
            None => {
                normal.push_str(line);
                normal.push('\n');
            }
        }
    }

    replacements += flush_normal(&mut normal, &mut out, request);
    Rewritten {
        text: out,
        replacements,
        unclosed_comment: in_block,
    }
}

/// Rewrite one file in place. The write is skipped when the buffer comes
/// back unchanged.
pub fn replace_in_file(path: &Path, request: &SubstitutionRequest) -> BuildorResult<Rewritten> {
    let original = fs::read_to_string(path)?;
    let rewritten = rewrite_text(&original, request);
    if fs::hash_content(rewritten.text.as_bytes()) != fs::hash_content(original.as_bytes()) {
        fs::write_atomic(path, &rewritten.text)?;
    }
    Ok(rewritten)
}

/// Apply one request across many files. A file that cannot be read or
/// written back is recorded and the batch moves on.
pub fn replace_in_files(paths: &[PathBuf], request: &SubstitutionRequest) -> Vec<FileOutcome> {
    paths
        .iter()
        .map(|path| FileOutcome {
            file: path.clone(),
            result: replace_in_file(path, request),
        })
        .collect()
}

/// Locate the first `//` or `/*` on a line of normal text.
///
/// Returns the code before it, the comment text from it onward, and
/// whether it opens a block comment. A lone `/` (division, closing tags)
/// is not a comment.
fn comment_start(line: &str) -> Option<(&str, &str, bool)> {
    let bytes = line.as_bytes();
    let mut i = 0;
    while i + 1 < bytes.len() {
        if bytes[i] == b'/' {
            match bytes[i + 1] {
                b'/' => return Some((&line[..i], &line[i..], false)),
                b'*' => return Some((&line[..i], &line[i..], true)),
                _ => {}
            }
        }
        i += 1;
    }
    None
}

/// Substitute the pending normal text and move it to the output buffer.
fn flush_normal(normal: &mut String, out: &mut String, request: &SubstitutionRequest) -> usize {
    let (replaced, count) = replace_complete(normal, request);
    out.push_str(&replaced);
    normal.clear();
    count
}

/// Replace every complete occurrence of the phrase in `text`.
///
/// An occurrence is complete when the characters on both sides are
/// non-alphanumeric (`[A-Za-z0-9_]`); buffer edges count as
/// non-alphanumeric. Scanning resumes one character past each match
/// start, so adjacent candidates are still seen.
fn replace_complete(text: &str, request: &SubstitutionRequest) -> (String, usize) {
    let phrase = request.phrase.as_str();
    if phrase.is_empty() {
        return (text.to_string(), 0);
    }

    let mut buffer = text.to_string();
    let mut count = 0usize;
    let mut at = 0usize;
    while at < buffer.len() {
        let Some(found) = buffer[at..].find(phrase) else {
            break;
        };
        at += found;
        let end = at + phrase.len();
        let clear_before = at == 0 || !is_word_byte(buffer.as_bytes()[at - 1]);
        let clear_after = end >= buffer.len() || !is_word_byte(buffer.as_bytes()[end]);
        if clear_before && clear_after {
            buffer.replace_range(at..end, &request.replacement);
            count += 1;
        }
        at += buffer[at..].chars().next().map_or(1, char::len_utf8);
    }
    (buffer, count)
}

fn is_word_byte(byte: u8) -> bool {
    byte == b'_' || byte.is_ascii_alphanumeric()
}
