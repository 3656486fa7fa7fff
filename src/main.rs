//! ueindex - Static project indexer for Unreal-style game projects
//!
//! Command line entry point.
//!
//! # Execution Flow
//!
//! 1. Parse arguments
//! 2. Load layered settings (`ueindex.yaml` + `UEINDEX_*` environment)
//! 3. Initialize logging -> `<log_dir>/ueindex.<date>` plus stderr
//! 4. Create a tokio runtime and scan the project through [`SessionManager`]
//! 5. Run the requested query and print JSON to stdout
//!
//! Exit status is 0 on success, 1 when `validate` finds issues, and non-zero
//! with an error message for fatal failures (no manifest, unknown type, cycle).

use anyhow::{Context, Result};
use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::process::ExitCode;
use ueindex::{ConfigManager, SessionManager, APP_NAME, VERSION};

#[derive(Parser, Debug)]
#[command(name = "ueindex", version, about = "Index and query an Unreal-style game project")]
struct Cli {
    /// Project root containing the .uproject manifest
    root: Utf8PathBuf,

    /// Directory holding ueindex.yaml
    #[arg(long, default_value = ".")]
    config_dir: Utf8PathBuf,

    /// Log at debug level
    #[arg(long)]
    debug: bool,

    /// Don't mirror log output to stderr
    #[arg(long, short)]
    quiet: bool,

    /// Run the sub-scans one after another
    #[arg(long)]
    sequential: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Project name, counts and scan statistics
    Summary,

    /// Case-insensitive substring search over types and assets
    Search { query: String },

    /// Parent chain of a type
    Hierarchy { name: String },

    /// Subclasses and referencing files of a type
    Usages { name: String },

    /// Cross-check the manifest against the file system
    Validate,

    /// List catalogued assets
    Assets {
        /// Only assets with this type tag
        #[arg(long = "type")]
        asset_type: Option<String>,
    },

    /// Non-fatal issues recorded during the scan
    Issues,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let config_manager = ConfigManager::new(&cli.config_dir)?;
    let mut settings = config_manager.load_settings()?;
    settings.debug_mode |= cli.debug;
    if cli.sequential {
        settings.concurrent_scan = false;
    }

    let _guard = ueindex::logging::setup_logging(
        Utf8PathBuf::from(&settings.log_dir).as_path(),
        APP_NAME,
        settings.debug_mode,
        !cli.quiet,
    )?;

    tracing::info!("Starting {} v{}", APP_NAME, VERSION);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("ueindex-worker")
        .build()?;

    let session = SessionManager::new(settings);
    let index = runtime
        .block_on(session.scan_async(cli.root.clone()))
        .with_context(|| format!("Failed to scan {}", cli.root))?;

    let status = match cli.command {
        Command::Summary => print_json(&index.summary())?,
        Command::Search { query } => print_json(&index.search(&query))?,
        Command::Hierarchy { name } => print_json(&index.hierarchy(&name)?)?,
        Command::Usages { name } => print_json(&index.usages(&name))?,
        Command::Validate => {
            let report = index.validate();
            print_json(&report)?;
            if report.valid { ExitCode::SUCCESS } else { ExitCode::from(1) }
        }
        Command::Assets { asset_type } => match asset_type {
            Some(tag) => print_json(&index.assets_of_type(&tag))?,
            None => print_json(&index.assets)?,
        },
        Command::Issues => print_json(&index.issues)?,
    };

    runtime.shutdown_timeout(std::time::Duration::from_secs(5));
    tracing::info!("Done");

    Ok(status)
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<ExitCode> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", json);
    Ok(ExitCode::SUCCESS)
}
