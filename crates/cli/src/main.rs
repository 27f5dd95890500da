// tablesync CLI - reconcile a provided table against a current table

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use tablesync_cli::exit_codes::{EXIT_SUCCESS, EXIT_SYNC_INVALID_CONFIG, EXIT_SYNC_RUNTIME};
use tablesync_cli::logging::init_logging;
use tablesync_cli::pipeline::{check_pipeline, load_config, run_pipeline, PipelineError, RunOptions};

#[derive(Parser)]
#[command(name = "tablesync")]
#[command(about = "Reconcile provided data against current data into ADD/UPDATE/DELETE/KEEP rows")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    /// Debug-level logging (overridden by RUST_LOG)
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ingest, reconcile and export per a TOML config file
    #[command(after_help = "\
Examples:
  tablesync run sync.toml
  tablesync run sync.toml --json
  tablesync run sync.toml --db work/sync.db")]
    Run {
        /// Path to the sync config (.toml)
        config: PathBuf,

        /// Print the run report as JSON on stdout
        #[arg(long)]
        json: bool,

        /// SQLite database path, overrides [database] path
        #[arg(long, env = "TABLESYNC_DB")]
        db: Option<String>,
    },

    /// Validate a config without reading any data
    #[command(after_help = "\
Examples:
  tablesync validate sync.toml")]
    Validate {
        /// Path to the sync config (.toml)
        config: PathBuf,
    },

    /// Ingest both tables and check key uniqueness without reconciling
    #[command(after_help = "\
Examples:
  tablesync check sync.toml")]
    Check {
        /// Path to the sync config (.toml)
        config: PathBuf,

        /// SQLite database path, overrides [database] path
        #[arg(long, env = "TABLESYNC_DB")]
        db: Option<String>,
    },
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("GIT_COMMIT_HASH"), ")",
        "\nengine:  tablesync-recon ", env!("CARGO_PKG_VERSION"),
    )
}

#[derive(Debug)]
struct CliError {
    code: u8,
    message: String,
    hint: Option<String>,
}

impl From<PipelineError> for CliError {
    fn from(err: PipelineError) -> Self {
        let code = err.exit_code();
        let hint = match code {
            EXIT_SYNC_INVALID_CONFIG => Some("run `tablesync validate <config>` to check the config".to_string()),
            _ => None,
        };
        Self {
            code,
            message: err.to_string(),
            hint,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Run { config, json, db } => cmd_run(config, json, db),
        Commands::Validate { config } => cmd_validate(config),
        Commands::Check { config, db } => cmd_check(config, db),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
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

fn cmd_run(config: PathBuf, json: bool, db: Option<String>) -> Result<(), CliError> {
    let report = run_pipeline(&config, &RunOptions { database: db })?;

    if json {
        let out = serde_json::to_string_pretty(&report).map_err(|e| CliError {
            code: EXIT_SYNC_RUNTIME,
            message: format!("JSON serialization error: {e}"),
            hint: None,
        })?;
        println!("{out}");
    }

    // Human summary to stderr
    let s = &report.summary;
    eprintln!(
        "{}: {} rows - {} add, {} update, {} delete, {} keep ({} re-admitted)",
        report.meta.config_name, s.total_rows, s.add, s.update, s.delete, s.keep, s.readmitted_keep,
    );
    eprintln!("exported {} rows to {}", report.export.row_count, report.export.path.display());
    if let Some(ref archived) = report.export.archived {
        eprintln!("archived {}", archived.display());
    }
    Ok(())
}

fn cmd_validate(config: PathBuf) -> Result<(), CliError> {
    let parsed = load_config(&config)?;
    eprintln!("config OK: {}", parsed.name);
    Ok(())
}

fn cmd_check(config: PathBuf, db: Option<String>) -> Result<(), CliError> {
    let report = check_pipeline(&config, &RunOptions { database: db })?;
    let (p, c) = (&report.filters.provided_data, &report.filters.current_data);
    eprintln!(
        "{}: keys unique - provided_data {} rows ({} excluded), current_data {} rows ({} excluded)",
        report.config_name, p.filtered_count, p.excluded_count, c.filtered_count, c.excluded_count,
    );
    Ok(())
}
