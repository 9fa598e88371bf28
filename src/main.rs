// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use daqchain::config::{load_and_validate_config, Config, RuntimeBuilder};
use daqchain::engine::RunSummary;
use daqchain::event::{EventWindow, JsonLinesSource};
use daqchain::modules::AsciiWriter;
use daqchain::traits::ModuleType;

/// Run the per-event analysis chain over recorded event files.
#[derive(Parser, Debug)]
#[command(name = "daqchain", version, about)]
struct Args {
    /// Run configuration (.yaml, .yml or .toml)
    #[arg(long = "cfg", short = 'c')]
    cfg: PathBuf,

    /// Index of the first event to process
    #[arg(long, default_value_t = 0)]
    min: u64,

    /// Stop before this event index; 0 processes to the end of the file
    #[arg(long, default_value_t = 0)]
    max: u64,

    /// Debug-level logging unless RUST_LOG is set
    #[arg(short, long)]
    verbose: bool,

    /// Event files, one JSON-encoded event per line
    #[arg(required = true)]
    files: Vec<PathBuf>,
}

fn init_logging(verbose: bool) {
    // RUST_LOG always wins over -v
    let env_filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_writer(std::io::stderr)
                .with_ansi(std::env::var("NO_COLOR").is_err()),
        )
        .with(env_filter)
        .init();
}

/// Text output name for an event file: its basename with the extension
/// replaced by `.txt`.
fn ascii_filename(events: &Path) -> String {
    let stem = events
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "events".to_string());
    format!("{}.txt", stem)
}

/// Point an `AsciiWriter` without an explicit `filename` at `filename`.
fn inject_ascii_filename(cfg: &mut Config, explicit: bool, filename: &str) {
    if explicit {
        return;
    }
    for module_cfg in cfg
        .modules
        .iter_mut()
        .filter(|m| m.module == AsciiWriter::KIND.as_str())
    {
        module_cfg
            .options
            .insert("filename".to_string(), filename.into());
    }
}

fn process_file(cfg: &Config, events: &Path, args: &Args) -> Result<RunSummary> {
    let mut runtime = RuntimeBuilder::from_config(cfg)
        .with_context(|| format!("failed to build the module chain for {}", events.display()))?;

    let source = JsonLinesSource::open(events)
        .with_context(|| format!("failed to open event file {}", events.display()))?;
    let mut source = EventWindow::new(source, args.min, args.max);

    let summary = runtime
        .engine
        .run(&mut source)
        .with_context(|| format!("run over {} failed", events.display()))?;
    Ok(summary)
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let mut cfg = load_and_validate_config(&args.cfg)
        .with_context(|| format!("invalid configuration {}", args.cfg.display()))?;
    let explicit_filename = cfg
        .modules
        .iter()
        .any(|m| m.module == AsciiWriter::KIND.as_str() && m.options.contains_key("filename"));

    for events in &args.files {
        let started = Instant::now();
        inject_ascii_filename(&mut cfg, explicit_filename, &ascii_filename(events));

        let summary = process_file(&cfg, events, &args)?;
        println!(
            "{}: {} events processed, {} abandoned, {} unreadable, {} module failures in {:.2?}",
            events.display(),
            summary.events_processed,
            summary.events_abandoned,
            summary.source_errors,
            summary.total_failures(),
            started.elapsed()
        );
        for (module, failures) in &summary.failures_per_module {
            println!("  {}: {} failures", module, failures);
        }
    }

    Ok(())
}
