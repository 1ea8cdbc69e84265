//! dupfind - duplicate file finder
//!
//! Walks one or more roots depth-first, buckets regular files by size and
//! digests only the files whose size collides with another one. Files that
//! share a digest are reported as a duplicate group.

pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;
pub mod scanner;
pub mod signal;

use std::io::{self, Write};
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::cli::{Cli, OutputFormat};
use crate::config::{ScanConfig, Settings, SettingsOverrides};
use crate::duplicates::{DuplicateFinder, FinderConfig};
use crate::error::ExitCode;
use crate::output::{JsonOutput, TextOutput};
use crate::progress::Progress;

/// Run the application with parsed arguments.
///
/// Returns the exit code for a completed scan.
///
/// # Errors
///
/// Returns an error for invalid configuration, a missing root, an
/// interrupted scan or a failure to write the results.
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);

    let overrides = SettingsOverrides {
        io_threads: cli.io_threads,
        buffer_size: cli.buffer_size,
        output: cli.output,
    };
    let settings =
        Settings::load(cli.config.as_deref(), &overrides).context("Failed to load settings")?;
    let scan_config = ScanConfig::parse(cli.mindepth, cli.maxdepth, cli.size.as_deref())?;

    log::debug!("Settings: {:?}", settings);
    log::debug!("Scan configuration: {:?}", scan_config);

    let shutdown = signal::install_handler()?;

    let mut finder_config = FinderConfig::default()
        .with_scan_config(scan_config)
        .with_io_threads(settings.io_threads)
        .with_buffer_size(settings.buffer_size)
        .with_shutdown_flag(shutdown.get_flag());
    if !cli.quiet && !cli.no_progress {
        finder_config = finder_config.with_progress_callback(Arc::new(Progress::new()));
    }

    let finder = DuplicateFinder::new(finder_config);
    let (groups, summary) = finder.find_duplicates(&cli.paths)?;

    if !summary.scan_errors.is_empty() {
        log::warn!(
            "{} path(s) could not be read during traversal",
            summary.scan_errors.len()
        );
    }
    if summary.digest_failures > 0 {
        log::warn!("{} file(s) could not be digested", summary.digest_failures);
    }

    let exit_code = ExitCode::from_outcome(!groups.is_empty());

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match settings.output {
        OutputFormat::Text => TextOutput::new(&groups)
            .write_to(&mut out)
            .context("Failed to write results")?,
        OutputFormat::Json => JsonOutput::new(&groups, &summary, exit_code)
            .write_to(&mut out, true)
            .context("Failed to write results")?,
    }
    out.flush().context("Failed to write results")?;

    Ok(exit_code)
}
