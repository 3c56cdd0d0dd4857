//! Rendering display records as highlighted `file:line:text` lines.

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::Error;
use crate::paths::Simplifier;
use crate::types::{DisplayRecord, Span};

const RED: &str = "\x1b[31m";
const RESET: &str = "\x1b[0m";

/// Writes display records, reading each source file at most once.
pub struct Renderer {
    /// Wrap matched tokens in ANSI red.
    highlight: bool,
    /// Lines of every file read so far, split on `\n`.
    lines: HashMap<PathBuf, Vec<Vec<u8>>>,
    simplifier: Simplifier,
}

impl Renderer {
    /// Create a renderer with an empty line cache.
    pub fn new(simplifier: Simplifier, highlight: bool) -> Self {
        return Self {
            highlight,
            lines: HashMap::new(),
            simplifier,
        };
    }

    /// Write one record as `<file>:<line>:[<column>:]<text>`.
    /// The column is printed when the record holds a single match.
    ///
    /// # Errors
    ///
    /// Returns `Error::SourceUnreadable` if the file cannot be read,
    /// `Error::LineOutOfRange` if the record points outside it,
    /// or `Error::Io` if writing fails.
    pub fn render(&mut self, record: &DisplayRecord, out: &mut impl Write) -> Result<(), Error> {
        let text = self.annotate_record(record)?;
        let name = self.simplifier.display(&record.filename);
        match record.spans.as_slice() {
            [only] => writeln!(out, "{name}:{}:{}:{text}", record.line, only.start)?,
            _ => writeln!(out, "{name}:{}:{text}", record.line)?,
        }
        return Ok(());
    }

    /// Display name of a file, for filename-only output.
    pub fn display_name(&self, path: &Path) -> String {
        return self.simplifier.display(path);
    }

    /// Highlighted text of the record's line.
    fn annotate_record(&mut self, record: &DisplayRecord) -> Result<String, Error> {
        let highlight = self.highlight;
        let lines = self.file_lines(&record.filename)?;
        let out_of_range = || {
            return Error::LineOutOfRange {
                file: record.filename.clone(),
                line: record.line,
            };
        };
        let index = usize::try_from(record.line)
            .ok()
            .and_then(|l| return l.checked_sub(1))
            .ok_or_else(out_of_range)?;
        let line = lines.get(index).ok_or_else(out_of_range)?;
        return annotate(line, &record.spans, highlight).ok_or_else(out_of_range);
    }

    /// Cached lines of `path`, loading the file on first use.
    fn file_lines(&mut self, path: &Path) -> Result<&Vec<Vec<u8>>, Error> {
        if !self.lines.contains_key(path) {
            let bytes = std::fs::read(path).map_err(|source| {
                return Error::SourceUnreadable { file: path.to_path_buf(), source };
            })?;
            let split = bytes.split(|&b| return b == b'\n').map(<[u8]>::to_vec).collect();
            self.lines.insert(path.to_path_buf(), split);
        }
        return self.lines.get(path).ok_or_else(|| {
            return Error::SourceUnreadable {
                file: path.to_path_buf(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            };
        });
    }
}

/// Slice `line` at each one-based byte-column span and join the pieces,
/// wrapping spans in emphasis markers when `highlight` is set.
///
/// A span whose token continues onto later lines is highlighted to the end
/// of this one. Returns `None` if a span starts past the end of the line or
/// runs backwards.
pub fn annotate(line: &[u8], spans: &[Span], highlight: bool) -> Option<String> {
    let mut out = String::with_capacity(line.len().saturating_add(spans.len().saturating_mul(9)));
    let mut cursor = 0_usize;

    for span in spans {
        let start = usize::try_from(span.start).ok()?.checked_sub(1)?;
        let end = usize::try_from(span.end).ok()?.checked_sub(1)?.min(line.len());
        out.push_str(&String::from_utf8_lossy(line.get(cursor..start)?));
        let token = String::from_utf8_lossy(line.get(start..end)?);
        if highlight {
            out.push_str(RED);
            out.push_str(&token);
            out.push_str(RESET);
        } else {
            out.push_str(&token);
        }
        cursor = end;
    }

    out.push_str(&String::from_utf8_lossy(line.get(cursor..)?));
    return Some(out);
}
