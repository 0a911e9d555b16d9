// src/batch.rs

use crate::error::{InputError, Result};
use crate::line_hashes::LineHashIndex;
use crate::model::{PreviousIssue, RawIssue};
use crate::report::FileReport;
use crate::tracking::track;
use chrono::{DateTime, Utc};
use git2::{ErrorCode, Oid, Repository};
use indicatif::{ParallelProgressIterator, ProgressBar};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Previous and raw issues of one component. A component without a path is
/// not a file (a directory or the project) and has no line hashes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileIssues {
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub previous: Vec<PreviousIssue>,
    #[serde(default)]
    pub raw: Vec<RawIssue>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchInput {
    pub files: Vec<FileIssues>,
}

impl BatchInput {
    pub fn from_reader(reader: impl Read) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|source| InputError::Io { path: path.to_path_buf(), source })?;
        Self::from_reader(BufReader::new(file))
    }
}

/// Where the current content of the files of a batch comes from. Content is
/// raw bytes; sources in any encoding hash the same way.
pub trait SourceProvider {
    fn read(&self, path: &str) -> Result<Vec<u8>>;

    fn line_hashes(&self, path: &str) -> Result<LineHashIndex> {
        self.read(path).map(|content| LineHashIndex::from_bytes(&content))
    }
}

/// Reads files below a directory of the working tree.
#[derive(Debug, Clone)]
pub struct FsSource {
    root: PathBuf,
}

impl FsSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl SourceProvider for FsSource {
    fn read(&self, path: &str) -> Result<Vec<u8>> {
        let full = self.root.join(path);
        fs::read(&full).map_err(|source| InputError::Io { path: full, source })
    }
}

/// Reads files as committed at one revision of a git repository.
pub struct GitSource {
    repo: Repository,
    revision: String,
    tree: Oid,
}

impl GitSource {
    pub fn open(repo_path: &Path, revision: &str) -> Result<Self> {
        let repo = Repository::open(repo_path)?;
        let tree = repo.revparse_single(revision)?.peel_to_tree()?.id();
        info!(repo = %repo_path.display(), revision, %tree, "reading sources from git");
        Ok(Self { repo, revision: revision.to_string(), tree })
    }
}

impl SourceProvider for GitSource {
    fn read(&self, path: &str) -> Result<Vec<u8>> {
        let tree = self.repo.find_tree(self.tree)?;
        let entry = tree.get_path(Path::new(path)).map_err(|e| match e.code() {
            ErrorCode::NotFound => InputError::MissingSource { path: path.to_string(), revision: self.revision.clone() },
            _ => InputError::Git(e),
        })?;
        let blob = entry.to_object(&self.repo)?.peel_to_blob()?;
        Ok(blob.content().to_vec())
    }
}

/// Tracks every file of `input`, one tracking call per file, in parallel.
///
/// Sources are read up front on the calling thread. A file whose source
/// cannot be read or whose issues do not fit its content gets a failed
/// report; the other files are unaffected.
pub fn track_batch(
    input: &BatchInput,
    sources: &dyn SourceProvider,
    analysis_date: DateTime<Utc>,
    bar: ProgressBar,
) -> Vec<FileReport> {
    let indexes: Vec<Result<Option<LineHashIndex>>> = input
        .files
        .iter()
        .map(|file| file.path.as_deref().map(|path| sources.line_hashes(path)).transpose())
        .collect();

    bar.set_length(input.files.len() as u64);
    bar.set_message("Tracking issues");

    let reports: Vec<FileReport> = input
        .files
        .par_iter()
        .zip(indexes.into_par_iter())
        .progress_with(bar.clone())
        .map(|(file, index)| track_file(file, index, analysis_date))
        .collect();

    bar.finish_with_message("Tracking complete");
    reports
}

fn track_file(file: &FileIssues, index: Result<Option<LineHashIndex>>, analysis_date: DateTime<Utc>) -> FileReport {
    let outcome = index
        .and_then(|index| track(index.as_ref(), &file.previous, &file.raw).map_err(InputError::from));
    match outcome {
        Ok(result) => FileReport::tracked(file.path.clone(), &result, analysis_date),
        Err(err) => {
            warn!(path = file.path.as_deref().unwrap_or("<component>"), error = %err, "issue tracking failed");
            FileReport::failed(file.path.clone(), &err)
        }
    }
}
