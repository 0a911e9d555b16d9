// src/cli.rs

use chrono::{DateTime, Utc};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// JSON batch holding the previous and raw issues of each file
    #[arg(short, long)]
    pub input: PathBuf,

    /// Directory the file paths of the batch are relative to
    #[arg(long, conflicts_with = "repo", default_value = ".")]
    pub source_root: PathBuf,

    /// Read file contents from this git repository instead of the working tree
    #[arg(long)]
    pub repo: Option<PathBuf>,

    /// Revision of the repository to read file contents at
    #[arg(long, default_value = "HEAD")]
    pub revision: String,

    /// Where to write the report (stdout when omitted)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Report format
    #[arg(long, value_enum, default_value_t = Format::Json)]
    pub format: Format,

    /// Date given to new issues (RFC 3339, defaults to now)
    #[arg(long)]
    pub analysis_date: Option<DateTime<Utc>>,

    /// Number of worker threads, 0 for one per CPU
    #[arg(long, env = "ISSUE_TRACK_THREADS", default_value_t = 0)]
    pub threads: usize,

    /// Show a progress bar on stderr
    #[arg(long)]
    pub progress: bool,
}

#[derive(clap::ValueEnum, Clone, Debug, Copy, PartialEq, Eq)]
pub enum Format {
    /// Full report as pretty-printed JSON
    Json,
    /// One summary line per file
    Text,
}
