// Resource catalog CLI - replays the submission log into the current catalog

mod exit_codes;
mod recon;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use exit_codes::EXIT_SUCCESS;
use recon::ConfigCommands;

#[derive(Parser)]
#[command(name = "catalog")]
#[command(about = "Rebuild the educational resource catalog from form submissions")]
#[command(version)]
struct Cli {
    /// More logging on stderr (-v debug, -vv trace). RUST_LOG overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a submission log and print the current catalog
    #[command(after_help = "\
Examples:
  catalog reconcile responses.csv
  catalog reconcile responses.csv --json > catalog.json
  catalog reconcile responses.csv --output catalog.json --explain
  catalog reconcile responses.csv --config form.headers.toml --strict")]
    Reconcile {
        /// CSV export of the form responses (header row first)
        log: PathBuf,

        /// Header config (.toml); defaults to the built-in form tables
        #[arg(long, short = 'c', env = "CATALOG_HEADERS")]
        config: Option<PathBuf>,

        /// Output JSON to stdout instead of only the human summary
        #[arg(long)]
        json: bool,

        /// Write JSON output to file
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Include why each excluded submission was rejected
        #[arg(long)]
        explain: bool,

        /// Exit non-zero when any submission was rejected
        #[arg(long)]
        strict: bool,
    },

    /// Show how each column header of a log maps to a catalog field
    #[command(after_help = "\
Examples:
  catalog headers responses.csv
  catalog headers responses.csv --config form.headers.toml")]
    Headers {
        /// CSV export of the form responses
        log: PathBuf,

        /// Header config (.toml); defaults to the built-in form tables
        #[arg(long, short = 'c', env = "CATALOG_HEADERS")]
        config: Option<PathBuf>,
    },

    /// Counts by platform, license, type, level and area for the catalog
    Stats {
        /// CSV export of the form responses
        log: PathBuf,

        /// Header config (.toml); defaults to the built-in form tables
        #[arg(long, short = 'c', env = "CATALOG_HEADERS")]
        config: Option<PathBuf>,

        /// Output JSON
        #[arg(long)]
        json: bool,
    },

    /// Inspect header configs
    #[command(subcommand)]
    Config(ConfigCommands),
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Reconcile {
            log,
            config,
            json,
            output,
            explain,
            strict,
        } => recon::cmd_reconcile(log, config, json, output, explain, strict),
        Commands::Headers { log, config } => recon::cmd_headers(log, config),
        Commands::Stats { log, config, json } => recon::cmd_stats(log, config, json),
        Commands::Config(cmd) => recon::cmd_config(cmd),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            tracing::debug!(code, "command failed");
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}
