//! Solver message files (`*.msg`).
//!
//! Extracts run-level information like convergence and error blocks.

use aview_highlight::{highlight, DisplayClass, HighlightSpan, Language};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use std::time::SystemTime;
use thiserror::Error;

/// Extension of solver message files.
pub const MESSAGE_EXTENSION: &str = "msg";

#[derive(Error, Debug)]
pub enum MessageError {
    #[error("No .{MESSAGE_EXTENSION} file in {0}")]
    NotFound(Utf8PathBuf),
    #[error("Failed to read {path}: {source}")]
    Read {
        path: Utf8PathBuf,
        source: std::io::Error,
    },
}

/// Whether `path` has the message file extension.
pub fn is_message_file(path: &Utf8Path) -> bool {
    path.extension() == Some(MESSAGE_EXTENSION)
}

/// Whether two paths name the same file.
///
/// Watcher events carry absolute paths; paths from the command line or a
/// job table may be relative.
pub fn same_path(a: &Utf8Path, b: &Utf8Path) -> bool {
    if a == b {
        return true;
    }
    match (a.canonicalize_utf8(), b.canonicalize_utf8()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Find the most recently modified message file in a job's working directory.
pub fn find_latest_message_file(work_dir: &Utf8Path) -> Option<Utf8PathBuf> {
    let entries = fs::read_dir(work_dir).ok()?;

    let mut latest: Option<(SystemTime, Utf8PathBuf)> = None;
    for entry in entries.flatten() {
        let Ok(path) = Utf8PathBuf::try_from(entry.path()) else {
            continue;
        };
        if !is_message_file(&path) || !path.is_file() {
            continue;
        }
        let modified = match entry.metadata().and_then(|m| m.modified()) {
            Ok(modified) => modified,
            Err(e) => {
                tracing::warn!("Failed to get mtime for {}: {}", path, e);
                continue;
            }
        };
        if latest.as_ref().is_none_or(|(newest, _)| modified > *newest) {
            latest = Some((modified, path));
        }
    }

    latest.map(|(_, path)| path)
}

/// Read a message file.
///
/// A directory is searched for its newest message file first.
pub fn load_message_file(path: &Utf8Path) -> Result<(Utf8PathBuf, String), MessageError> {
    let path = if path.is_dir() {
        find_latest_message_file(path).ok_or_else(|| MessageError::NotFound(path.to_owned()))?
    } else {
        path.to_owned()
    };

    match fs::read_to_string(&path) {
        Ok(content) => Ok((path, content)),
        Err(source) => Err(MessageError::Read { path, source }),
    }
}

/// Overall outcome reported by a message file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MessageStatus {
    /// Last convergence message was a success and no errors were reported
    Converged,
    /// Last convergence message was a failure
    Failed,
    /// Error blocks without a failed convergence
    Errors,
    /// Nothing conclusive yet
    #[default]
    Unknown,
}

impl MessageStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Converged => "converged",
            Self::Failed => "failed to converge",
            Self::Errors => "errors",
            Self::Unknown => "no result",
        }
    }
}

/// Information summarized from a message file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageSummary {
    /// Number of `start: error` .. `end: error` blocks
    pub error_blocks: usize,
    /// Lines reporting a converged solution
    pub converged: usize,
    /// Lines reporting a failed convergence
    pub failed_to_converge: usize,
    /// First line of text inside each error block
    pub errors: Vec<String>,
    /// Whether the last convergence message was a success
    pub last_convergence: Option<bool>,
}

impl MessageSummary {
    /// Highlight `text` with `language` and summarize the result.
    pub fn from_text(language: &Language, text: &str) -> Self {
        Self::from_spans(text, &highlight(language, text))
    }

    /// Summarize already highlighted text.
    pub fn from_spans(text: &str, spans: &[HighlightSpan]) -> Self {
        let mut summary = Self::default();

        for span in spans {
            let span_text = span.text(text);
            match span.class {
                DisplayClass::Addition => {
                    summary.converged += 1;
                    summary.last_convergence = Some(true);
                }
                DisplayClass::Deletion if is_error_block(span_text) => {
                    summary.error_blocks += 1;
                    if let Some(first) = block_body(span_text).next() {
                        summary.errors.push(first.to_string());
                    }
                }
                DisplayClass::Deletion => {
                    summary.failed_to_converge += 1;
                    summary.last_convergence = Some(false);
                }
                _ => {}
            }
        }

        summary
    }

    pub fn status(&self) -> MessageStatus {
        match self.last_convergence {
            Some(false) => MessageStatus::Failed,
            _ if self.error_blocks > 0 => MessageStatus::Errors,
            Some(true) => MessageStatus::Converged,
            None => MessageStatus::Unknown,
        }
    }
}

fn is_error_block(span_text: &str) -> bool {
    span_text
        .lines()
        .next()
        .is_some_and(|line| line.to_lowercase().contains("start: error"))
}

/// Non-empty lines between an error block's delimiter lines.
fn block_body(span_text: &str) -> impl Iterator<Item = &str> {
    let lines: Vec<&str> = span_text.lines().collect();
    let inner = if lines.len() > 2 {
        lines[1..lines.len() - 1].to_vec()
    } else {
        Vec::new()
    };
    inner
        .into_iter()
        .map(str::trim)
        .filter(|line| !line.is_empty())
}
