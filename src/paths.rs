//! Filename simplification for display.

use std::path::{Path, PathBuf};

/// How filenames are printed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayMode {
    /// Base name only.
    Base,
    /// Absolute path.
    Full,
    /// Shortest path relative to a known source root.
    #[default]
    Shortest,
}

/// Picks the display form of a matched file's path.
#[derive(Debug, Clone)]
pub struct Simplifier {
    mode: DisplayMode,
    roots: Vec<PathBuf>,
}

impl Simplifier {
    /// Create a simplifier over the given source roots.
    pub const fn new(mode: DisplayMode, roots: Vec<PathBuf>) -> Self {
        return Self { mode, roots };
    }

    /// Display form of `path`. Falls back to the path as given when no root
    /// contains it.
    pub fn display(&self, path: &Path) -> String {
        return match self.mode {
            DisplayMode::Base => path
                .file_name()
                .map_or_else(|| return path.display().to_string(), |n| return n.to_string_lossy().into_owned()),
            DisplayMode::Full => path.display().to_string(),
            DisplayMode::Shortest => self
                .roots
                .iter()
                .filter_map(|root| return path.strip_prefix(root).ok())
                .filter(|rel| return !rel.as_os_str().is_empty())
                .map(|rel| return rel.display().to_string())
                .min_by_key(String::len)
                .unwrap_or_else(|| return path.display().to_string()),
        };
    }
}

/// Source roots of the Go installation: `$GOROOT/src` and `src` under every
/// `$GOPATH` entry. Unset variables contribute nothing.
pub fn go_roots(goroot: Option<&str>, gopath: Option<&str>) -> Vec<PathBuf> {
    let mut roots = Vec::new();
    if let Some(goroot) = goroot.filter(|g| return !g.is_empty()) {
        roots.push(Path::new(goroot).join("src"));
    }
    if let Some(gopath) = gopath {
        roots.extend(
            std::env::split_paths(gopath)
                .filter(|p| return !p.as_os_str().is_empty())
                .map(|p| return p.join("src")),
        );
    }
    return roots;
}

/// Whether a package argument refers to the working directory tree
/// (`.`, `..`, `./x`, `../x`) rather than an import path.
pub fn is_local_argument(arg: &str) -> bool {
    return arg == "."
        || arg == ".."
        || arg.starts_with("./")
        || arg.starts_with("../");
}

/// Collapse `.` and `..` components in a path without touching the filesystem.
/// Preserves leading `..` when there is nothing left to pop.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut components: Vec<std::path::Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            std::path::Component::CurDir => {},
            std::path::Component::ParentDir => {
                let can_pop = matches!(
                    components.last(),
                    Some(c) if !matches!(c, std::path::Component::ParentDir | std::path::Component::RootDir)
                );
                if can_pop {
                    components.pop();
                } else if !matches!(components.last(), Some(std::path::Component::RootDir)) {
                    components.push(component);
                }
            },
            other => components.push(other),
        }
    }
    return components.iter().collect();
}
