mod commands;
mod config;
mod diagnostics;
mod error;
mod frontend;
mod model;
mod paths;
mod query;
mod render;
mod report;
mod scanner;
mod types;

use std::io::{self, IsTerminal as _};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt as _, util::SubscriberInitExt as _};

use crate::commands::Output;
use crate::config::{ColorChoice, Config, GoEnv, Overrides, Settings};
use crate::frontend::FactsLoader;

/// Environment variable that turns on debug logging.
const DEBUG_ENV: &str = "GOFIND_DEBUG";

const EXAMPLE: &str = "\
Example:

   % gofind encoding/json.Encoder.Encode ./...
   handlers.go:145:21:        json.NewEncoder(w).Encode(resp)
   socket.go:125:22:                  if err := enc.Encode(m); err != nil {";

#[derive(Parser)]
#[command(
    name = "gofind",
    version,
    about = "Search Go source code by type",
    after_help = EXAMPLE
)]
struct Cli {
    /// Target expression: <pkg>.<name>[.<sel>], e.g. net/http.Client.Do
    query: String,

    /// Packages to search: facts files, directories of facts, or import paths.
    #[arg(required = true)]
    packages: Vec<String>,

    /// Print absolute filenames.
    #[arg(long, conflicts_with = "base_name")]
    full_path: bool,

    /// Print base filenames only.
    #[arg(long)]
    base_name: bool,

    /// Highlight matched tokens.
    #[arg(long, value_enum, default_value_t = ColorChoice::Always)]
    color: ColorChoice,

    /// Print only the names of files containing matches.
    #[arg(short = 'l', long)]
    files_with_matches: bool,

    /// Directory holding `<import path>.facts.json` files.
    #[arg(long, value_name = "DIR")]
    facts_dir: Option<PathBuf>,

    /// Do not report packages with type errors.
    #[arg(short = 'e', long)]
    suppress_errors: bool,
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            diagnostics::print_error(&e);
            ExitCode::FAILURE
        },
    }
}

/// Resolve settings, then search.
///
/// # Errors
///
/// Returns config, load, render, or output errors.
fn run(cli: Cli) -> Result<(), error::Error> {
    let cwd = std::env::current_dir()?;
    let config = Config::load(&cwd)?;
    let output = if cli.files_with_matches { Output::FilesWithMatches } else { Output::Lines };

    let overrides = Overrides {
        base_name: cli.base_name,
        color: cli.color,
        facts_dir: cli.facts_dir,
        full_path: cli.full_path,
        packages: cli.packages.clone(),
        suppress_errors: cli.suppress_errors,
    };
    let settings = Settings::resolve(
        cwd,
        config,
        overrides,
        &GoEnv::from_env(),
        io::stdout().is_terminal(),
    );

    let front_end = FactsLoader::new(settings.cwd.clone(), settings.facts_dir.clone());
    let stdout = io::stdout();
    let mut out = stdout.lock();
    return commands::search(&cli.query, &cli.packages, &front_end, &settings, output, &mut out);
}

/// Log to stderr. `RUST_LOG` wins; otherwise `GOFIND_DEBUG` picks debug over warn.
fn init_tracing() {
    let debug = std::env::var(DEBUG_ENV).is_ok_and(|v| return !v.is_empty() && v != "0");
    let default_filter = if debug { "gofind=debug" } else { "gofind=warn" };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| return default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}
