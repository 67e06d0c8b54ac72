//! pg-sqlite-shim CLI
//!
//! Entry point for the command-line tool.
//!
//! Exit codes:
//! - 0: Success, no violations
//! - 1: `lint` found one or more violations
//! - 2: Tool error (config error, I/O error, etc.)

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use pg_sqlite_shim::lint::collect_migration_files;
use pg_sqlite_shim::output::OutputFormat;
use pg_sqlite_shim::{Config, MigrationLinter, rewrite_schema_file};

/// Default config file name used when --config is not explicitly provided.
const DEFAULT_CONFIG_FILE: &str = "pg-sqlite-shim.toml";

#[derive(Parser, Debug)]
#[command(name = "pg-sqlite-shim")]
#[command(about = "Load PostgreSQL-first Rails schemas and migrations on SQLite", long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, global = true, env = "PG_SQLITE_SHIM_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Rewrite a PostgreSQL schema dump into a SQLite-loadable one
    RewriteSchema {
        /// Schema dump to read (overrides schema.input)
        #[arg(long)]
        input: Option<PathBuf>,

        /// Destination file (overrides schema.output)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Check migrations for PostgreSQL-only constructs
    Lint {
        /// Migration files or directories (overrides lint.paths)
        files: Vec<PathBuf>,

        /// Override output format (text, json)
        #[arg(long)]
        format: Option<String>,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    match run(args) {
        Ok(has_violations) => {
            if has_violations {
                std::process::exit(1);
            }
        }
        Err(err) => {
            eprintln!("Error: {:#}", err);
            std::process::exit(2);
        }
    }
}

/// Run the selected subcommand.
///
/// Returns `Ok(true)` if lint violations were found.
fn run(args: Args) -> Result<bool> {
    let config = load_config(&args.config)?;

    match args.command {
        Command::RewriteSchema { input, output } => {
            let input = input.unwrap_or(config.schema.input);
            let output = output.unwrap_or(config.schema.output);
            rewrite_schema_file(&input, &output).context("Failed to rewrite schema")?;
            eprintln!(
                "pg-sqlite-shim: wrote {} from {}",
                output.display(),
                input.display()
            );
            Ok(false)
        }
        Command::Lint { files, format } => {
            let format_name = format.unwrap_or(config.output.format);
            let format = OutputFormat::parse(&format_name).with_context(|| {
                format!(
                    "Unknown output format '{}'. Valid values: text, json",
                    format_name
                )
            })?;

            let paths = if files.is_empty() {
                config.lint.paths
            } else {
                files
            };
            let files = collect_migration_files(&paths, &config.lint.extensions)
                .context("Failed to collect migration files")?;

            let mut linter = MigrationLinter::new(files);
            if let Some(root) = config.lint.root {
                linter = linter.with_root(root);
            }
            let violations = linter.violations().context("Failed to lint migrations")?;

            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            format
                .reporter()
                .emit(&violations, &mut handle)
                .context("Failed to write report")?;

            eprintln!(
                "pg-sqlite-shim: {} violation(s) found",
                violations.len()
            );
            Ok(!violations.is_empty())
        }
    }
}

/// Load configuration.
///
/// An explicitly provided `--config` must exist. A missing default config
/// file falls back to defaults with a warning.
fn load_config(config_path: &Option<PathBuf>) -> Result<Config> {
    match config_path {
        Some(path) => {
            if !path.exists() {
                anyhow::bail!("Config file not found: {}", path.display());
            }
            Config::from_file(path).context("Failed to load configuration")
        }
        None => {
            let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
            if default_path.exists() {
                Config::from_file(&default_path).context("Failed to load configuration")
            } else {
                eprintln!(
                    "Warning: Config file {} not found, using defaults",
                    default_path.display()
                );
                Ok(Config::default())
            }
        }
    }
}
