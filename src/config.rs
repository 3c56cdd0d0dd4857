use std::path::{Path, PathBuf};

use crate::error::Error;
use crate::paths::{self, DisplayMode};

/// Config file looked up in the working directory.
pub const CONFIG_FILE: &str = ".gofind.toml";

/// Default root for import-path lookups of package facts.
const DEFAULT_FACTS_DIR: &str = ".gofind/facts";

/// Project configuration loaded from `.gofind.toml`.
#[derive(Debug, Default)]
pub struct Config {
    /// Filename display mode unless overridden on the command line.
    pub display: Option<DisplayMode>,
    /// Root for import-path lookups of package facts.
    pub facts_dir: Option<PathBuf>,
    /// Extra source roots for filename simplification.
    pub roots: Vec<PathBuf>,
}

/// Raw TOML structure for `.gofind.toml`.
#[derive(serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct GofindTomlConfig {
    #[serde(default)]
    display: Option<DisplayMode>,
    #[serde(default)]
    facts_dir: Option<PathBuf>,
    #[serde(default)]
    roots: Vec<PathBuf>,
}

impl Config {
    /// Load config from `.gofind.toml` in the given root directory.
    /// Returns defaults if the file doesn't exist. Returns an error if the
    /// file exists but is malformed: a written config is never silently
    /// replaced by defaults.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if reading fails (other than not-found),
    /// or `Error::TomlDe` if the TOML is malformed.
    pub fn load(root: &Path) -> Result<Self, Error> {
        let path = root.join(CONFIG_FILE);
        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(Error::Io(e)),
        };

        let raw: GofindTomlConfig = toml::from_str(&content)?;
        let roots = raw.roots.into_iter().map(|r| return root.join(r)).collect();
        return Ok(Self {
            display: raw.display,
            facts_dir: raw.facts_dir.map(|d| return root.join(d)),
            roots,
        });
    }
}

/// Whether `--color` emphasis is written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum ColorChoice {
    /// Always write ANSI emphasis.
    #[default]
    Always,
    /// Only when stdout is a terminal.
    Auto,
    /// Never.
    Never,
}

/// Command-line choices that feed into `Settings`.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    /// `--base-name` was given.
    pub base_name: bool,
    /// `--color` value.
    pub color: ColorChoice,
    /// `--facts-dir` value.
    pub facts_dir: Option<PathBuf>,
    /// `--full-path` was given.
    pub full_path: bool,
    /// Package arguments, to detect local ones.
    pub packages: Vec<String>,
    /// `--suppress-errors` was given.
    pub suppress_errors: bool,
}

/// Go installation environment relevant to display.
#[derive(Debug, Clone, Default)]
pub struct GoEnv {
    /// `$GOPATH`, possibly a list.
    pub gopath: Option<String>,
    /// `$GOROOT`.
    pub goroot: Option<String>,
}

impl GoEnv {
    /// Read from the process environment.
    pub fn from_env() -> Self {
        return Self {
            gopath: std::env::var("GOPATH").ok(),
            goroot: std::env::var("GOROOT").ok(),
        };
    }
}

/// Everything the run needs, resolved once at startup and passed explicitly.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Working directory.
    pub cwd: PathBuf,
    /// Filename display mode.
    pub display: DisplayMode,
    /// Root for import-path lookups of package facts.
    pub facts_dir: PathBuf,
    /// Wrap matched tokens in ANSI emphasis.
    pub highlight: bool,
    /// Source roots for the shortest display mode.
    pub roots: Vec<PathBuf>,
    /// Skip logging per-package type errors.
    pub suppress_errors: bool,
}

impl Settings {
    /// Combine config file, command line and environment. Command line wins.
    /// The working directory becomes a display root only when a package
    /// argument is local, mirroring how such arguments are resolved.
    pub fn resolve(
        cwd: PathBuf,
        config: Config,
        overrides: Overrides,
        go: &GoEnv,
        stdout_is_terminal: bool,
    ) -> Self {
        let display = if overrides.full_path {
            DisplayMode::Full
        } else if overrides.base_name {
            DisplayMode::Base
        } else {
            config.display.unwrap_or_default()
        };

        let highlight = match overrides.color {
            ColorChoice::Always => true,
            ColorChoice::Auto => stdout_is_terminal,
            ColorChoice::Never => false,
        };

        let mut roots = paths::go_roots(go.goroot.as_deref(), go.gopath.as_deref());
        roots.extend(config.roots);
        if overrides.packages.iter().any(|p| return paths::is_local_argument(p)) {
            roots.push(cwd.clone());
        }

        let facts_dir = overrides
            .facts_dir
            .or(config.facts_dir)
            .unwrap_or_else(|| return PathBuf::from(DEFAULT_FACTS_DIR));

        return Self {
            cwd,
            display,
            facts_dir,
            highlight,
            roots,
            suppress_errors: overrides.suppress_errors,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert!(config.display.is_none());
        assert!(config.roots.is_empty());
    }

    #[test]
    fn reads_roots_and_display_relative_to_root() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            "display = \"base\"\nfacts_dir = \"out/facts\"\nroots = [\"vendor\"]\n",
        )
        .unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.display, Some(DisplayMode::Base));
        assert_eq!(config.facts_dir, Some(dir.path().join("out/facts")));
        assert_eq!(config.roots, vec![dir.path().join("vendor")]);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "display = 3").unwrap();
        assert!(matches!(Config::load(dir.path()), Err(Error::TomlDe(_))));
    }

    #[test]
    fn command_line_overrides_config() {
        let config = Config { display: Some(DisplayMode::Base), ..Config::default() };
        let overrides = Overrides { full_path: true, ..Overrides::default() };
        let settings =
            Settings::resolve(PathBuf::from("/w"), config, overrides, &GoEnv::default(), false);
        assert_eq!(settings.display, DisplayMode::Full);
        assert_eq!(settings.facts_dir, PathBuf::from(DEFAULT_FACTS_DIR));
    }

    #[test]
    fn local_argument_adds_working_directory_root() {
        let go = GoEnv { gopath: None, goroot: Some("/usr/local/go".to_string()) };
        let overrides = Overrides { packages: vec!["./...".to_string()], ..Overrides::default() };
        let settings = Settings::resolve(PathBuf::from("/w"), Config::default(), overrides, &go, false);
        assert_eq!(settings.roots, vec![PathBuf::from("/usr/local/go/src"), PathBuf::from("/w")]);

        let remote = Overrides { packages: vec!["net/http".to_string()], ..Overrides::default() };
        let settings = Settings::resolve(PathBuf::from("/w"), Config::default(), remote, &go, false);
        assert_eq!(settings.roots, vec![PathBuf::from("/usr/local/go/src")]);
    }

    #[test]
    fn auto_color_follows_terminal() {
        let overrides = Overrides { color: ColorChoice::Auto, ..Overrides::default() };
        let on_tty = Settings::resolve(PathBuf::new(), Config::default(), overrides.clone(), &GoEnv::default(), true);
        let piped = Settings::resolve(PathBuf::new(), Config::default(), overrides, &GoEnv::default(), false);
        assert!(on_tty.highlight);
        assert!(!piped.highlight);
    }
}
