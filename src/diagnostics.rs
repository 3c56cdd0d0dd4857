use crate::error::Error;
use crate::frontend::FACTS_SUFFIX;

const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// Render a fatal error as markdown with bold headings and print to stderr.
pub fn print_error(e: &Error) {
    let md = render_error(e);
    for line in md.lines() {
        if line.starts_with('#') {
            eprintln!("{BOLD}{line}{RESET}");
        } else {
            eprintln!("{line}");
        }
    }
}

/// Render an error as a structured markdown diagnostic: what happened and,
/// where there is one, how to fix it.
pub fn render_error(e: &Error) -> String {
    match e {
        Error::FactsNotFound { argument, looked_in } => {
            render_facts_not_found(argument, &looked_in.display().to_string())
        },
        Error::NoPackages => render_no_packages(),
        Error::SourceUnreadable { file, source } => format!("\
# Error: Source Unreadable

`{}` backs a match but cannot be read: {source}

## Fix

Regenerate the package facts; the sources moved since they were written.
", file.display()),
        _ => render_generic(e),
    }
}

fn render_generic(e: &Error) -> String {
    match e {
        Error::FactsCorrupt { path, reason } => format!("\
# Error: Package Facts Corrupt

`{}`: {reason}
", path.display()),

        Error::Json { path, source } => format!("\
# Error: Invalid Package Facts

`{}` is not valid JSON facts: {source}
", path.display()),

        Error::LineOutOfRange { file, line } => format!("\
# Error: Position Out Of Range

A match points at `{}:{line}`, which the file does not contain.

## Fix

Regenerate the package facts for this file.
", file.display()),

        Error::TomlDe(e) => format!("\
# Error: Invalid .gofind.toml

{e}
"),
        _ => format!("\
# Error

{e}
"),
    }
}

fn render_facts_not_found(argument: &str, looked_in: &str) -> String {
    format!("\
# Error: Package Not Loaded

No package facts for `{argument}` (looked in `{looked_in}`).

## Fix

Pass a facts file, a directory holding `*{FACTS_SUFFIX}` files, or dump the
package's facts under the facts directory:

    gofind --facts-dir <dir> <query> {argument}
")
}

fn render_no_packages() -> String {
    "\
# Error: No Packages

Every package argument expanded to nothing.
"
    .to_string()
}
