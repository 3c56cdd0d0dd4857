//! Semantic front end: turns package arguments into type-checked packages.
//!
//! Type checking itself happens outside this crate. `FactsLoader` reads the
//! package facts a Go type checker dumped as JSON, one file per package.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use crate::error::Error;
use crate::model::{Package, Program};
use crate::paths::normalize_path;

/// Suffix of package facts files found by directory walks and import-path lookup.
pub const FACTS_SUFFIX: &str = ".facts.json";

/// Source of type-checked packages.
pub trait FrontEnd {
    /// Load every package named by `args`. Packages that fail to type-check
    /// are returned with their errors rather than failing the load.
    ///
    /// # Errors
    ///
    /// Returns an error if an argument cannot be resolved or loaded at all.
    fn load(&self, args: &[String]) -> Result<Program, Error>;
}

/// Loads package facts from disk.
pub struct FactsLoader {
    /// Working directory; relative arguments and facts paths resolve against it.
    cwd: PathBuf,
    /// Root under which import paths map to `<path>.facts.json`.
    facts_dir: PathBuf,
}

impl FactsLoader {
    /// Create a loader resolving import paths under `facts_dir`.
    pub const fn new(cwd: PathBuf, facts_dir: PathBuf) -> Self {
        return Self { cwd, facts_dir };
    }

    /// Facts files an argument stands for.
    ///
    /// A `.json` file is taken as is, a directory contributes every facts
    /// file beneath it, anything else is an import path under `facts_dir`.
    /// A `/...` pattern walks its prefix, first as a directory and then as
    /// an import path prefix under `facts_dir`.
    ///
    /// # Errors
    ///
    /// Returns `Error::FactsNotFound` if the argument matches nothing.
    fn resolve_argument(&self, arg: &str) -> Result<Vec<PathBuf>, Error> {
        if let Some(prefix) = pattern_prefix(arg) {
            let as_dir = normalize_path(&self.cwd.join(prefix));
            let under_facts = normalize_path(&self.cwd.join(&self.facts_dir).join(prefix));
            let root = if as_dir.is_dir() { as_dir } else { under_facts };
            return walk_facts(arg, &root);
        }

        let as_path = normalize_path(&self.cwd.join(arg));

        if as_path.is_file() && as_path.extension().is_some_and(|e| return e == "json") {
            return Ok(vec![as_path]);
        }

        if as_path.is_dir() {
            return walk_facts(arg, &as_path);
        }

        let by_import_path = normalize_path(
            &self.cwd.join(&self.facts_dir).join(format!("{arg}{FACTS_SUFFIX}")),
        );
        if by_import_path.is_file() {
            return Ok(vec![by_import_path]);
        }

        return Err(Error::FactsNotFound {
            argument: arg.to_string(),
            looked_in: by_import_path,
        });
    }
}

impl FrontEnd for FactsLoader {
    fn load(&self, args: &[String]) -> Result<Program, Error> {
        let mut files = Vec::new();
        for arg in args {
            files.extend(self.resolve_argument(arg)?);
        }
        let mut seen = HashSet::new();
        files.retain(|f| return seen.insert(f.clone()));
        if files.is_empty() {
            return Err(Error::NoPackages);
        }

        let mut packages = Vec::with_capacity(files.len());
        for path in &files {
            let package = read_package(path)?;
            debug!(
                package = %package.path,
                name = %package.name,
                facts = %path.display(),
                files = package.files.len(),
                errors = package.errors.len(),
                "loaded package facts"
            );
            packages.push(package);
        }

        return Ok(Program { packages });
    }
}

/// Directory part of a `<dir>/...` package pattern; `...` alone is `.`.
fn pattern_prefix(arg: &str) -> Option<&str> {
    if arg == "..." {
        return Some(".");
    }
    return arg.strip_suffix("/...");
}

/// Every facts file beneath `root`, sorted.
///
/// # Errors
///
/// Returns `Error::FactsNotFound` if `root` holds none.
fn walk_facts(arg: &str, root: &Path) -> Result<Vec<PathBuf>, Error> {
    let mut found: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| return e.file_type().is_file() && is_facts_file(e.path()))
        .map(walkdir::DirEntry::into_path)
        .collect();
    found.sort();
    if found.is_empty() {
        return Err(Error::FactsNotFound {
            argument: arg.to_string(),
            looked_in: root.to_path_buf(),
        });
    }
    return Ok(found);
}

/// Whether a path names a package facts file.
fn is_facts_file(path: &Path) -> bool {
    return path
        .file_name()
        .and_then(|n| return n.to_str())
        .is_some_and(|n| return n.ends_with(FACTS_SUFFIX));
}

/// Parse and validate one facts file.
/// Source paths inside it are made absolute relative to the facts file's directory.
///
/// # Errors
///
/// Returns `Error::Io` if the file cannot be read, `Error::Json` if it is not
/// valid facts, or `Error::FactsCorrupt` if a node names an unknown file.
pub fn read_package(path: &Path) -> Result<Package, Error> {
    let content = std::fs::read_to_string(path)?;
    let mut package: Package = serde_json::from_str(&content).map_err(|source| {
        return Error::Json { path: path.to_path_buf(), source };
    })?;

    if package.path.is_empty() {
        return Err(Error::FactsCorrupt {
            path: path.to_path_buf(),
            reason: "missing package path".to_string(),
        });
    }

    let base = path.parent().unwrap_or_else(|| return Path::new(""));
    for file in &mut package.files {
        *file = normalize_path(&base.join(&*file));
    }

    let file_count = package.files.len();
    let stray = package
        .nodes()
        .find(|n| return usize::try_from(n.file).map_or(true, |i| return i >= file_count));
    if let Some(node) = stray {
        return Err(Error::FactsCorrupt {
            path: path.to_path_buf(),
            reason: format!("node at offset {} refers to file #{} of {file_count}", node.offset, node.file),
        });
    }

    return Ok(package);
}
