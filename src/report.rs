//! Ordering and same-line grouping of collected matches.

use std::path::PathBuf;

use crate::types::{DisplayRecord, Match, Span};

/// Sort matches by (filename, byte offset).
/// Arrival order from the collector is arbitrary; output order is not.
pub fn sort(mut matches: Vec<Match>) -> Vec<Match> {
    matches.sort();
    return matches;
}

/// Merge consecutive matches on the same file and line into one record.
///
/// Input must already be sorted, which keeps spans left to right. A token
/// reported by more than one plane is highlighted once.
pub fn group(sorted: &[Match]) -> Vec<DisplayRecord> {
    let mut records: Vec<DisplayRecord> = Vec::new();

    for found in sorted {
        let span = Span {
            end: found.column.saturating_add(found.length),
            start: found.column,
        };

        match records.last_mut() {
            Some(record) if record.filename == found.filename && record.line == found.line => {
                let overlaps = record.spans.last().is_some_and(|last| return span.start < last.end);
                if !overlaps {
                    record.spans.push(span);
                }
            },
            _ => records.push(DisplayRecord {
                filename: found.filename.clone(),
                line: found.line,
                spans: vec![span],
            }),
        }
    }

    return records;
}

/// Distinct files that hold at least one record, in record order.
pub fn files(records: &[DisplayRecord]) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = Vec::new();
    for record in records {
        if files.last() != Some(&record.filename) {
            files.push(record.filename.clone());
        }
    }
    return files;
}
