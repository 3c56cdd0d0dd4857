//! The search command: load, scan, sort, group, render.

use std::io::Write;

use tracing::{debug, warn};

use crate::config::Settings;
use crate::error::Error;
use crate::frontend::FrontEnd;
use crate::model::Program;
use crate::paths::Simplifier;
use crate::query::Descriptor;
use crate::render::Renderer;
use crate::report;
use crate::scanner;
use crate::types::DisplayRecord;

/// What to print for the collected records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Output {
    /// Display filenames only, one per line.
    FilesWithMatches,
    /// One highlighted line per record.
    Lines,
}

/// Run one search and write its results to `out`.
///
/// A malformed query is logged and matches nothing; the packages are still
/// loaded so load errors surface.
///
/// # Errors
///
/// Returns front end load errors, source read errors while rendering, or
/// `Error::Io` if writing fails.
pub fn search(
    query: &str,
    packages: &[String],
    front_end: &impl FrontEnd,
    settings: &Settings,
    output: Output,
    out: &mut impl Write,
) -> Result<(), Error> {
    let descriptor = match Descriptor::parse(query) {
        Ok(d) => Some(d),
        Err(e) => {
            warn!(%e, "query matches nothing");
            None
        },
    };

    let program = front_end.load(packages)?;
    report_type_errors(&program, settings.suppress_errors);

    let records = match &descriptor {
        Some(d) => find(&program, d),
        None => Vec::new(),
    };

    let simplifier = Simplifier::new(settings.display, settings.roots.clone());
    let mut renderer = Renderer::new(simplifier, settings.highlight);
    match output {
        Output::FilesWithMatches => {
            for file in report::files(&records) {
                writeln!(out, "{}", renderer.display_name(&file))?;
            }
        },
        Output::Lines => {
            for record in &records {
                renderer.render(record, out)?;
            }
        },
    }
    out.flush()?;

    return Ok(());
}

/// Scan, sort and group: the deterministic record list for a descriptor.
pub fn find(program: &Program, descriptor: &Descriptor) -> Vec<DisplayRecord> {
    let matches = scanner::collect(program, descriptor);
    debug!(query = %descriptor, matches = matches.len(), "scan complete");
    return report::group(&report::sort(matches));
}

/// Log packages the type checker rejected. They are excluded from scanning
/// either way.
fn report_type_errors(program: &Program, suppress: bool) {
    for package in program.packages.iter().filter(|p| return !p.is_checked()) {
        if suppress {
            debug!(package = %package.path, errors = package.errors.len(), "skipping package with type errors");
            continue;
        }
        for message in &package.errors {
            warn!(package = %package.path, "{message}");
        }
    }
    return;
}
