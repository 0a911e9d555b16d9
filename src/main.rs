// src/main.rs

mod cli;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use cli::{Args, Format};
use indicatif::ProgressBar;
use issue_tracking::batch::{track_batch, BatchInput, FsSource, GitSource, SourceProvider};
use issue_tracking::report::BatchReport;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::time::Instant;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    init_logging();
    let args = Args::parse();
    let start_time = Instant::now();

    if args.threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(args.threads)
            .build_global()
            .context("failed to configure worker threads")?;
    }

    let input = BatchInput::load(&args.input).with_context(|| format!("failed to load {}", args.input.display()))?;
    let sources: Box<dyn SourceProvider> = match &args.repo {
        Some(repo) => Box::new(
            GitSource::open(repo, &args.revision)
                .with_context(|| format!("failed to open {} at {}", repo.display(), args.revision))?,
        ),
        None => Box::new(FsSource::new(&args.source_root)),
    };

    let analysis_date = args.analysis_date.unwrap_or_else(Utc::now);
    let bar = if args.progress { ProgressBar::new(0) } else { ProgressBar::hidden() };
    let reports = track_batch(&input, sources.as_ref(), analysis_date, bar);
    let report = BatchReport::new(analysis_date, reports);
    info!(
        files = report.totals.files,
        failed = report.totals.failed,
        elapsed = ?start_time.elapsed(),
        "tracking finished"
    );

    let out: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(File::create(path).with_context(|| format!("failed to create {}", path.display()))?),
        None => Box::new(io::stdout().lock()),
    };
    let mut out = BufWriter::new(out);
    match args.format {
        Format::Json => {
            report.write_json(&mut out).context("failed to write report")?;
            writeln!(out)?;
        }
        Format::Text => report.write_text(&mut out).context("failed to write report")?,
    }
    out.flush()?;
    Ok(())
}

/// Logs go to stderr so the report can be piped. `ISSUE_TRACK_LOG` takes
/// precedence over `RUST_LOG`.
fn init_logging() {
    let filter = EnvFilter::try_from_env("ISSUE_TRACK_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).init();
}
