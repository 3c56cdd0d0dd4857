/// Core domain types shared by the scanners, the grouper and the renderer.
use std::cmp::Ordering;
use std::path::PathBuf;

/// A confirmed occurrence of the queried type, resolved to its source position.
/// Columns and offsets are byte based, as reported by the type checker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    /// One-based byte column of the token's first byte.
    pub column: u32,
    /// Absolute path of the file containing the token.
    pub filename: PathBuf,
    /// Byte length of the matched token.
    pub length: u32,
    /// One-based line number.
    pub line: u32,
    /// Byte offset of the token from the start of the file.
    pub offset: u32,
}

impl Ord for Match {
    /// Order by (filename, byte offset). Filenames compare bytewise so the
    /// output order is independent of path component parsing.
    fn cmp(&self, other: &Self) -> Ordering {
        return self
            .filename
            .as_os_str()
            .cmp(other.filename.as_os_str())
            .then(self.offset.cmp(&other.offset))
            .then(self.length.cmp(&other.length));
    }
}

impl PartialOrd for Match {
    /// Delegate to `Ord` implementation.
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        return Some(self.cmp(other));
    }
}

/// Half-open byte column range `[start, end)` of a highlighted token, one based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    /// Column one past the token's last byte.
    pub end: u32,
    /// Column of the token's first byte.
    pub start: u32,
}

/// One output line: every match sharing a file and line, left to right.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayRecord {
    /// Absolute path of the source file.
    pub filename: PathBuf,
    /// One-based line number.
    pub line: u32,
    /// Highlight spans in ascending, non-overlapping column order.
    pub spans: Vec<Span>,
}
