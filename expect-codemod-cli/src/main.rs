//! expect-codemod CLI
//!
//! Migrates test files written against the `expect` 1.x API to Jest.
//!
//! # Exit Codes
//!
//! - `ExitCode::Success` (0): every file was processed. Diagnostics about
//!   constructs left unrewritten do not change the exit code.
//! - `ExitCode::Error` (2): at least one file failed, or the invocation was
//!   rejected (missing files, unknown language)
//!
//! See `types::ExitCode` for the enum definition.

use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use expect_codemod_transform::api::{transform_files, FileReport, TransformFilesConfig};
use log::{info, trace};

mod output;
mod types;

use types::ExitCode;

#[derive(Parser, Debug)]
#[command(
    name = "expect-codemod",
    author,
    version,
    about = "Migrate expect 1.x assertions and spies to Jest",
    long_about = "Rewrites test files written against the expect 1.x assertion and spy API \
into their Jest equivalents. Files are rewritten in place unless --dry-run or --print is given. \
Constructs that cannot be migrated are left untouched and reported on stderr as \
file:line.col-line.col: message.\n\n\
expect-codemod test/**/*.test.js\n  \
expect-codemod --dry-run --json --pretty test/api.test.ts\n  \
expect-codemod --print --standalone test/api.test.js"
)]
struct Cli {
    /// Test files to migrate
    #[arg(required = true, num_args = 1.., long_help = "One or more test files to migrate. \
The language is detected from the extension (.js, .jsx, .mjs, .cjs, .ts, .mts, .cts, .tsx) \
unless --language is given. Files are processed concurrently.")]
    files: Vec<PathBuf>,

    /// Keep the legacy expect import and call sites' binding name
    #[arg(
        short = 's',
        long = "standalone",
        long_help = "Leaves the expect import in place and keeps the local name \
call sites use, for projects that run the standalone expect package instead of Jest's global. \
Mock factories are not retargeted to the jest global in this mode."
    )]
    standalone: bool,

    /// Do not write changed files
    #[arg(short = 'n', long = "dry-run")]
    dry_run: bool,

    /// Write migrated sources to stdout instead of the files
    #[arg(long = "print", conflicts_with = "json")]
    print: bool,

    /// Print a JSON report of the run to stdout
    #[arg(long = "json")]
    json: bool,

    /// Format JSON output with indentation for readability
    #[arg(short = 'p', long = "pretty", requires = "json")]
    pretty: bool,

    /// Override language detection
    #[arg(
        short = 'l',
        long = "language",
        long_help = "Parse every file as the given language instead of detecting it from \
the file extension. Supported languages: javascript, typescript, tsx."
    )]
    language: Option<String>,

    /// Enable debug logging output to stderr (most verbose)
    #[arg(hide = true, short = 'd', long = "debug")]
    debug: bool,
}

impl Cli {
    /// Reject files that do not exist before any work starts
    fn validate(&self) -> Result<()> {
        for file in &self.files {
            if !file.exists() {
                anyhow::bail!("Source file does not exist: {}", file.display());
            }
            if !file.is_file() {
                anyhow::bail!("Path is not a file: {}", file.display());
            }
        }
        Ok(())
    }

    fn writes_files(&self) -> bool {
        !self.dry_run && !self.print
    }
}

/// Initialize logging based on configuration
fn init_logging(debug: bool) {
    let log_level = if debug {
        log::LevelFilter::Trace
    } else {
        // Diagnostics are printed by the CLI itself
        log::LevelFilter::Error
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .format_target(false)
        .format_timestamp_secs()
        .init();
}

async fn run(cli: &Cli) -> Result<Vec<FileReport>> {
    info!("Migrating {} files", cli.files.len());

    cli.validate().context("Configuration validation failed")?;

    let reports = transform_files(&TransformFilesConfig {
        source_files: cli.files.clone(),
        standalone: cli.standalone,
        language: cli.language.clone(),
        write: cli.writes_files(),
    })
    .await?;

    output::print_diagnostics(&reports);
    if cli.json {
        output::print_json(&reports, cli.pretty).context("Failed to output report")?;
    } else if cli.print {
        output::print_sources(&reports)?;
    }
    if !cli.json {
        let summary = output::Summary::of(&reports);
        eprintln!("{}", output::summary_line(&summary, cli.writes_files()));
    }

    trace!("Finished");
    Ok(reports)
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.debug);

    let code = match run(&cli).await {
        Ok(reports) if reports.iter().any(FileReport::is_error) => ExitCode::Error,
        Ok(_) => ExitCode::Success,
        Err(e) => {
            print_cli_command_error(&e);
            ExitCode::Error
        }
    };

    process::exit(code.into());
}

fn print_cli_command_error(e: &anyhow::Error) {
    eprintln!("Error: {e}");
    let mut source = e.source();
    while let Some(err) = source {
        eprintln!("  Caused by: {err}");
        source = err.source();
    }
}
