//! Mauka Tables - command line entrypoint.
//!
//! Validates configuration, writes a default configuration file, or builds every
//! container from configuration and drives it through the synthetic workload.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use mauka_tables::config::{ConfigLoader, LogConfig, TablesConfig, ENV_PREFIX};
use mauka_tables::error::{ErrorContext, ErrorReporter, MaukaError, TracingErrorReporter};
use mauka_tables::workload;

/// Command line arguments for Mauka Tables.
#[derive(Parser, Debug)]
#[clap(name = "mauka-tables", version, author, about)]
struct Args {
    /// Path to configuration file
    #[clap(short, long, value_parser)]
    config: Option<PathBuf>,

    /// Command to execute
    #[clap(subcommand)]
    command: Option<Command>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Command {
    /// Validate the configuration file
    Validate,

    /// Generate a default configuration file
    GenConfig {
        /// Path to output configuration file
        #[clap(short, long, value_parser)]
        output: PathBuf,
    },

    /// Build every container and run the synthetic workload
    Exercise {
        /// Print the report as JSON instead of log lines
        #[clap(long)]
        json: bool,
    },
}

/// Initialize the logging system.
///
/// `RUST_LOG` takes precedence over the configured level.
fn init_logging(log: &LogConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&log.level))
        .context("Invalid log filter")?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(log.source_location)
        .with_line_number(log.source_location)
        .with_thread_names(true)
        .with_writer(std::io::stderr);

    let installed = if log.json {
        tracing::subscriber::set_global_default(builder.json().finish())
    } else {
        tracing::subscriber::set_global_default(builder.finish())
    };
    installed.context("Failed to set global tracing subscriber")
}

fn main() -> Result<()> {
    let args = Args::parse();
    let loader = ConfigLoader::new(args.config.as_deref(), ENV_PREFIX);

    match args.command.unwrap_or(Command::Validate) {
        Command::Validate => {
            let config = loader.load();
            let log = config.as_ref().map(|c| c.log.clone()).unwrap_or_default();
            init_logging(&log)?;
            info!("Validating configuration");
            let config = config.context("Configuration validation failed")?;
            info!(
                containers = config.container_sections().len(),
                "Configuration validated successfully"
            );
            Ok(())
        }
        Command::GenConfig { output } => {
            init_logging(&LogConfig::default())?;
            info!("Generating default configuration");

            if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Cannot create {}", parent.display()))?;
            }
            TablesConfig::default()
                .write_toml(&output)
                .context("Failed to write configuration")?;

            info!("Default configuration written to {:?}", output);
            Ok(())
        }
        Command::Exercise { json } => {
            let config = loader.load().context("Failed to load configuration")?;
            init_logging(&config.log)?;

            let report = match workload::run(&config) {
                Ok(report) => report,
                Err(error) => {
                    let message = error.to_string();
                    TracingErrorReporter.report(
                        ErrorContext::new(error, "workload")
                            .with_details(format!("{} operations", config.workload.operations)),
                    );
                    return Err(MaukaError::Custom(message)).context("Workload failed");
                }
            };

            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&report).context("Failed to render report")?
                );
            } else {
                for container in &report.containers {
                    info!(
                        container = container.name,
                        hits = container.hits,
                        misses = container.misses,
                        inserts = container.inserts,
                        removals = container.removals,
                        len = container.final_len,
                        evictions = container.evictions,
                        elapsed_ms = container.elapsed_ms,
                        consistent = container.consistent,
                        "Container exercised"
                    );
                }
                info!(
                    bits = report.bloom.bit_count,
                    hash_count = report.bloom.hash_count,
                    fill_ratio = report.bloom.fill_ratio,
                    false_positives = report.bloom.false_positives,
                    probes = report.bloom.probes,
                    "Bloom filter exercised"
                );
            }
            Ok(())
        }
    }
}
