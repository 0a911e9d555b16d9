use chrono::{DateTime, TimeZone, Utc};
use git2::{Repository, Signature};
use indicatif::ProgressBar;
use issue_tracking::batch::{track_batch, BatchInput, FsSource, GitSource, SourceProvider};
use issue_tracking::report::BatchReport;
use issue_tracking::{InputError, LineHashIndex};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const BEFORE: &str = "class Foo {\n  void run() {\n    System.exit(0);\n  }\n}\n";
const AFTER: &str = "import java.util.List;\n\nclass Foo {\n  void run() {\n    System.exit(0);\n  }\n}\n";

fn analysis_date() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
}

fn batch_json() -> String {
    let checksum = LineHashIndex::from_content(BEFORE).hash(3).unwrap().to_string();
    format!(
        r#"{{
          "files": [
            {{
              "path": "src/Foo.java",
              "previous": [
                {{ "key": "AX-1", "rule": {{ "repository": "java", "rule": "S1147" }}, "line": 3,
                   "message": "Remove this call to exit", "checksum": "{checksum}",
                   "assignee": "bob", "creation_date": "2023-01-02T03:04:05Z" }},
                {{ "key": "AX-2", "rule": {{ "repository": "java", "rule": "S106" }}, "line": 1,
                   "message": "Use a logger", "checksum": "gone" }}
              ],
              "raw": [
                {{ "rule": {{ "repository": "java", "rule": "S1147" }}, "line": 5,
                   "message": "Remove this call to exit" }},
                {{ "rule": {{ "repository": "java", "rule": "S1128" }}, "line": 1,
                   "message": "Remove unused import" }}
              ]
            }},
            {{
              "previous": [ {{ "key": "AX-3", "rule": {{ "repository": "common", "rule": "dup" }}, "message": "3 duplicated blocks" }} ],
              "raw": [ {{ "rule": {{ "repository": "common", "rule": "dup" }}, "message": "3 duplicated blocks" }} ]
            }}
          ]
        }}"#
    )
}

fn assert_tracked(report: &BatchReport) {
    assert_eq!(report.totals.failed, 0);
    assert_eq!(report.totals.matched, 2);
    assert_eq!(report.totals.new, 1);
    assert_eq!(report.totals.closed, 1);

    let foo = &report.files[0];
    assert_eq!(foo.matched[0].key, "AX-1");
    assert_eq!(foo.matched[0].line, Some(5));
    assert_eq!(foo.matched[0].previous_line, Some(3));
    assert_eq!(foo.matched[0].assignee.as_deref(), Some("bob"));
    assert_eq!(foo.new[0].rule.to_string(), "java:S1128");
    assert_eq!(foo.closed[0].key, "AX-2");

    assert_eq!(report.files[1].matched[0].key, "AX-3");
}

fn commit_file(repo: &Repository, path: &str, content: impl AsRef<[u8]>) {
    let workdir = repo.workdir().unwrap();
    let full = workdir.join(path);
    fs::create_dir_all(full.parent().unwrap()).unwrap();
    fs::write(&full, content).unwrap();

    let mut index = repo.index().unwrap();
    index.add_path(Path::new(path)).unwrap();
    index.write().unwrap();
    let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();
    let sig = Signature::now("Tracker", "tracker@example.com").unwrap();
    let parent = repo.head().ok().map(|head| head.peel_to_commit().unwrap());
    let parents: Vec<_> = parent.iter().collect();
    repo.commit(Some("HEAD"), &sig, &sig, "update", &tree, &parents).unwrap();
}

#[test]
fn tracks_files_from_the_working_tree() {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("src")).unwrap();
    fs::write(dir.path().join("src/Foo.java"), AFTER).unwrap();
    let input = BatchInput::from_reader(batch_json().as_bytes()).unwrap();

    let reports = track_batch(&input, &FsSource::new(dir.path()), analysis_date(), ProgressBar::hidden());
    let report = BatchReport::new(analysis_date(), reports);

    assert_tracked(&report);
}

#[test]
fn tracks_files_at_a_git_revision() {
    let dir = TempDir::new().unwrap();
    let repo = Repository::init(dir.path()).unwrap();
    commit_file(&repo, "src/Foo.java", AFTER);
    let head = repo.head().unwrap().peel_to_commit().unwrap().id().to_string();
    commit_file(&repo, "src/Foo.java", "rewritten\n");

    let source = GitSource::open(dir.path(), &head).unwrap();
    assert_eq!(source.read("src/Foo.java").unwrap(), AFTER.as_bytes());

    let input = BatchInput::from_reader(batch_json().as_bytes()).unwrap();
    let reports = track_batch(&input, &source, analysis_date(), ProgressBar::hidden());
    assert_tracked(&BatchReport::new(analysis_date(), reports));
}

#[test]
fn missing_git_path_is_reported_per_file() {
    let dir = TempDir::new().unwrap();
    let repo = Repository::init(dir.path()).unwrap();
    commit_file(&repo, "README", "hello\n");

    let source = GitSource::open(dir.path(), "HEAD").unwrap();
    assert!(matches!(source.read("src/Foo.java"), Err(InputError::MissingSource { .. })));

    let input = BatchInput::from_reader(batch_json().as_bytes()).unwrap();
    let report = BatchReport::new(analysis_date(), track_batch(&input, &source, analysis_date(), ProgressBar::hidden()));
    assert_eq!(report.totals.failed, 1);
    assert_eq!(report.totals.matched, 1);
    assert!(report.files[0].failure.as_deref().unwrap().contains("src/Foo.java"));
}

const LATIN1: &[u8] = b"class A {\n  caf\xe9();\n}\n";

fn latin1_batch_json() -> String {
    let checksum = LineHashIndex::from_bytes(LATIN1).hash(2).unwrap().to_string();
    format!(
        r#"{{ "files": [ {{
              "path": "A.java",
              "previous": [ {{ "key": "L-1", "rule": {{ "repository": "java", "rule": "S100" }}, "line": 2, "checksum": "{checksum}" }} ],
              "raw": [ {{ "rule": {{ "repository": "java", "rule": "S100" }}, "line": 2 }} ]
        }} ] }}"#
    )
}

#[test]
fn non_utf8_sources_are_tracked_the_same_from_disk_and_git() {
    let dir = TempDir::new().unwrap();
    let repo = Repository::init(dir.path()).unwrap();
    commit_file(&repo, "A.java", LATIN1);
    let input = BatchInput::from_reader(latin1_batch_json().as_bytes()).unwrap();

    let from_disk = BatchReport::new(
        analysis_date(),
        track_batch(&input, &FsSource::new(dir.path()), analysis_date(), ProgressBar::hidden()),
    );
    let source = GitSource::open(dir.path(), "HEAD").unwrap();
    let from_git = BatchReport::new(analysis_date(), track_batch(&input, &source, analysis_date(), ProgressBar::hidden()));

    assert_eq!(from_disk.files[0].failure, None);
    assert_eq!(from_disk.totals.matched, 1);
    assert_eq!(from_disk.files[0].matched[0].key, "L-1");
    assert_eq!(from_git.files, from_disk.files);
}

#[test]
fn missing_batch_file_is_an_io_error() {
    let dir = TempDir::new().unwrap();
    let err = BatchInput::load(&dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, InputError::Io { .. }));
}
