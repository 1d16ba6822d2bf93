//! End-to-end report runs against `fixtures/status/`.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use pretty_assertions::assert_eq;

use crtrack_core::pipeline::{ReportRequest, SilentProgress, run_report};
use crtrack_shared::{CrTrackError, ReportSettings};

const FIXTURE_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../../../fixtures/status");

/// Copy the fixture folder and add a broken UTF-16 status file for Carol.
fn status_folder() -> tempfile::TempDir {
    let dir = tempfile::tempdir().expect("tempdir");
    for entry in std::fs::read_dir(FIXTURE_DIR).expect("read fixtures") {
        let path = entry.expect("entry").path();
        let name = path.file_name().expect("file name");
        std::fs::copy(&path, dir.path().join(name)).expect("copy fixture");
    }
    std::fs::write(dir.path().join("Carol White.txt"), [0xFF, 0xFE, 0x41]).expect("write");
    dir
}

fn request(folder: &Path, settings: ReportSettings) -> ReportRequest {
    ReportRequest {
        folder: folder.to_path_buf(),
        output_dir: None,
        settings,
        generated_at: NaiveDate::from_ymd_opt(2026, 10, 16)
            .and_then(|d| d.and_hms_opt(9, 30, 0))
            .expect("valid timestamp"),
    }
}

fn read(path: &PathBuf) -> String {
    std::fs::read_to_string(path).expect("read output")
}

#[test]
fn matrix_csv_matches_fixture() {
    let folder = status_folder();
    let outcome =
        run_report(&request(folder.path(), ReportSettings::default()), &SilentProgress)
            .expect("report");

    let expected = "\
,CR FOD01 Foreign object debris sweep,CR 500,CR 777 [Found in status emails],CR 1234 Sensor model refresh,CR 86193 Implementation: Artemis III Training Systems\r
NAME,CR FOD01,CR 500,CR 777,CR 1234,CR 86193\r
Alice Smith, , , ,X,X\r
Bob Jones, , ,X,X, \r
Carol White, , , , , \r
";
    assert_eq!(read(&outcome.matrix_path), expected);
    assert_eq!(outcome.cr_count, 5);
    assert_eq!(outcome.team_size, 3);
}

#[test]
fn digest_groups_blocks_by_cr() {
    let folder = status_folder();
    let outcome =
        run_report(&request(folder.path(), ReportSettings::default()), &SilentProgress)
            .expect("report");

    let digest = read(&outcome.digest_path);
    assert!(digest.contains("Generated: October 16, 2026 at 09:30 AM\n"));
    assert!(digest.contains("Total CRs with Activity: 4\n"));
    assert!(digest.contains("Team Members: 3\n"));

    let rule = "-".repeat(53);
    let body = format!(
        "{rule}\n\n\
         CR FOD01 - Foreign object debris sweep\n\
         Dave Green -\n    CR fod01 Swept hangar bay 3.\n\
         \n\
         {rule}\n\n\
         CR 777\n\
         Bob Jones -\n    CR 777 Prototype telemetry parser.\n\
         \n\
         {rule}\n\n\
         CR 1234 - Sensor model refresh\n\
         Alice Smith -\n    CR 1234 Reviewed sensor model changes with Bob.\n\
         Bob Jones -\n    CR 1234 Final tuning and sign-off.\n\
         \n\
         {rule}\n\n\
         CR 86193 - Implementation: Artemis III Training Systems\n\
         Alice Smith -\n    CR 86193 Integrated the new trainer build.\n\
         \x20   Ran the regression suite overnight.\n\
         \x20   \n\
         \x20   Two failures traced to config drift.\n\
         \n\
         {rule}\n"
    );
    assert!(digest.ends_with(&body), "unexpected digest:\n{digest}");
}

#[test]
fn degraded_inputs_are_reported_not_fatal() {
    let folder = status_folder();
    let outcome =
        run_report(&request(folder.path(), ReportSettings::default()), &SilentProgress)
            .expect("report");

    let unreadable: Vec<String> = outcome
        .unreadable
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(unreadable, ["Carol White.txt"]);
    assert_eq!(outcome.unlisted_people, ["Dave Green"]);

    let carol = outcome
        .assignments
        .iter()
        .find(|p| p.name == "Carol White")
        .expect("Carol in summary");
    assert!(carol.crs.is_empty());
}

#[test]
fn new_crs_persist_once() {
    let folder = status_folder();
    let settings = ReportSettings {
        persist_new_crs: true,
        ..ReportSettings::default()
    };

    let first = run_report(&request(folder.path(), settings.clone()), &SilentProgress)
        .expect("first run");
    assert!(first.new_crs_persisted);
    assert_eq!(first.new_crs.len(), 1);
    assert!(
        read(&folder.path().join("Models_CR_List.txt"))
            .ends_with("CR 500\nCR 777 [Found in status emails]\n")
    );

    // The previous run's outputs sit in the folder; they must not be scanned.
    let second =
        run_report(&request(folder.path(), settings), &SilentProgress).expect("second run");
    assert!(second.new_crs.is_empty());
    assert!(!second.new_crs_persisted);
    assert_eq!(second.active_cr_count, 4);
}

#[test]
fn output_dir_overrides_folder() {
    let folder = status_folder();
    let out = tempfile::tempdir().expect("out dir");
    let mut req = request(folder.path(), ReportSettings::default());
    req.output_dir = Some(out.path().join("reports"));
    req.settings.titles_row = false;

    let outcome = run_report(&req, &SilentProgress).expect("report");
    assert!(outcome.matrix_path.starts_with(out.path()));
    assert!(read(&outcome.matrix_path).starts_with("NAME,"));
    assert!(!folder.path().join("Models_CR_Worked.csv").exists());
}

#[test]
fn missing_cr_list_fails_before_processing() {
    let folder = status_folder();
    std::fs::remove_file(folder.path().join("Models_CR_List.txt")).expect("remove");

    let err = run_report(&request(folder.path(), ReportSettings::default()), &SilentProgress)
        .unwrap_err();
    assert!(matches!(err, CrTrackError::MissingInput { .. }));
    assert!(!folder.path().join("Models_CR_Worked.csv").exists());
}
