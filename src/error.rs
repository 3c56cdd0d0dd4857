/// Crate-level error types for gofind diagnostics.
use std::path::PathBuf;

/// Every error names the query, package argument, or file it concerns so a
/// diagnostic can be printed without a debugger.
#[allow(clippy::error_impl_error, reason = "crate-internal error type in binary")]
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A facts file exists but does not describe a usable package.
    #[error("package facts corrupt: {}: {reason}", path.display())]
    FactsCorrupt {
        /// Facts file that failed validation.
        path: PathBuf,
        /// Description of the problem.
        reason: String,
    },

    /// A package argument resolved to no facts file.
    #[error("cannot load package `{argument}`: no facts at {}", looked_in.display())]
    FactsNotFound {
        /// The package argument as given on the command line.
        argument: String,
        /// Where the loader expected the facts to be.
        looked_in: PathBuf,
    },

    /// Underlying I/O error from the filesystem or stdout.
    #[error("io: {0}")]
    Io(
        /// The wrapped I/O error.
        #[from]
        std::io::Error,
    ),

    /// Facts JSON could not be deserialized.
    #[error("invalid package facts in {}: {source}", path.display())]
    Json {
        /// Facts file being parsed.
        path: PathBuf,
        /// The wrapped JSON error.
        source: serde_json::Error,
    },

    /// A match points past the end of its file or line.
    #[error("position out of range: {}:{line}", file.display())]
    LineOutOfRange {
        /// Source file the match belongs to.
        file: PathBuf,
        /// One-based line number that could not be sliced.
        line: u32,
    },

    /// Query string lacks the `<pkg>.<name>` shape.
    #[error("malformed query `{query}`: {reason}")]
    MalformedQuery {
        /// The query as given.
        query: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// Every package argument expanded to nothing.
    #[error("no packages to search")]
    NoPackages,

    /// The file backing a match cannot be read for display.
    #[error("cannot read source {}: {source}", file.display())]
    SourceUnreadable {
        /// File that failed to read.
        file: PathBuf,
        /// The wrapped I/O error.
        source: std::io::Error,
    },

    /// TOML deserialization of `.gofind.toml` failed.
    #[error("toml deserialize: {0}")]
    TomlDe(
        /// The wrapped TOML deserialization error.
        #[from]
        toml::de::Error,
    ),
}
