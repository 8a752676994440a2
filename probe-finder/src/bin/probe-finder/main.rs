//! Command line front end listing the attached debug probes.

mod report;

use std::{fs::File, path::PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use probe_finder::{Lister, ProbeSelector, ScanOptions};
use tracing::metadata::LevelFilter;
use tracing_subscriber::{
    fmt::format::FmtSpan, prelude::__tracing_subscriber_SubscriberExt, util::SubscriberInitExt,
    EnvFilter, Layer,
};

use crate::report::OutputFormat;

#[derive(clap::Parser)]
#[clap(
    name = "probe-finder",
    about = "Lists the debug probes attached over USB",
    version
)]
struct Cli {
    /// Location for a JSON log file
    #[clap(long)]
    log_file: Option<PathBuf>,

    /// How to print the probes found
    #[clap(value_enum, ignore_case = true, default_value = "table", long)]
    format: OutputFormat,

    /// Only list probes matching VID:PID or VID:PID:SERIAL
    #[clap(long)]
    probe: Option<ProbeSelector>,

    #[clap(flatten)]
    scan: ScanArgs,
}

/// Options of the probe scan
#[derive(clap::Args)]
struct ScanArgs {
    /// Maximum number of probes to list before giving up
    #[clap(long, env = "PROBE_FINDER_MAX_PROBES", default_value_t = ScanOptions::default().max_probes)]
    max_probes: usize,

    /// List FTDI devices through the vendor driver (requires the `ftdi-d2xx` feature)
    #[clap(long, env = "PROBE_FINDER_VENDOR_BRIDGE", default_value_t = ScanOptions::default().vendor_bridge, action = clap::ArgAction::Set)]
    vendor_bridge: bool,
}

impl From<&ScanArgs> for ScanOptions {
    fn from(args: &ScanArgs) -> Self {
        ScanOptions {
            max_probes: args.max_probes,
            vendor_bridge: args.vendor_bridge,
        }
    }
}

fn setup_logging(log_file: Option<&PathBuf>) -> Result<()> {
    let stderr_subscriber = tracing_subscriber::fmt::layer()
        .compact()
        .without_time()
        .with_writer(std::io::stderr)
        .with_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::ERROR.into())
                .from_env_lossy(),
        );

    let file_subscriber = match log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create log file {}", path.display()))?;
            Some(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_file(true)
                    .with_line_number(true)
                    .with_span_events(FmtSpan::FULL)
                    .with_writer(file),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(stderr_subscriber)
        .with(file_subscriber)
        .init();

    if let Some(path) = log_file {
        tracing::info!("Writing log to {:?}", path);
    }

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.log_file.as_ref())?;

    let lister = Lister::from_options(&ScanOptions::from(&cli.scan));
    let registry = lister
        .scan_filtered(cli.probe.as_ref())
        .context("Failed to scan for debug probes")?;

    let mut stdout = std::io::stdout().lock();
    report::write(&mut stdout, &registry, cli.format)?;

    Ok(())
}
