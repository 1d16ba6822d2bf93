//! End-to-end report pipeline: folder → scan → index → consolidate → files.

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use chrono::NaiveDateTime;
use serde::Serialize;
use tracing::{info, instrument, warn};

use crtrack_scanner::{PersonBlocks, scan_person};
use crtrack_shared::{CrId, CrRegistry, Document, ReportSettings, Result, TeamRoster};

use crate::assignments::{AssignmentIndex, AssignmentMatrix, build_matrix, index_assignments};
use crate::digest::{ConsolidatedView, DigestHeader, consolidate, render_document};
use crate::matrix::{matrix_rows, to_csv};
use crate::sources::{self, person_name};
use crate::writer;

/// One person's document after scanning and last-write-wins collapse.
#[derive(Debug, Clone)]
pub struct ScannedDocument {
    pub person: String,
    pub blocks: PersonBlocks,
}

impl ScannedDocument {
    pub fn scan(doc: &Document) -> Self {
        Self {
            person: doc.person.clone(),
            blocks: scan_person(doc),
        }
    }
}

/// Everything derived from one snapshot of documents.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub scanned: Vec<ScannedDocument>,
    pub index: AssignmentIndex,
    pub matrix: AssignmentMatrix,
    pub view: ConsolidatedView,
    /// Trackable CRs found in documents but absent from the CR list.
    pub new_crs: BTreeSet<CrId>,
}

/// Scan every document and derive the matrix and the consolidated view.
///
/// `documents` must already be in merge order, which fixes the order of
/// contributors inside each CR.
pub fn analyze(documents: &[Document], registry: &CrRegistry, roster: &TeamRoster) -> Analysis {
    let scanned: Vec<ScannedDocument> = documents.iter().map(ScannedDocument::scan).collect();
    let index = index_assignments(&scanned);
    let matrix = build_matrix(roster, registry, &index);
    let view = consolidate(&scanned);
    let new_crs = index.new_crs(registry);

    Analysis {
        scanned,
        index,
        matrix,
        view,
        new_crs,
    }
}

// ---------------------------------------------------------------------------
// Report run
// ---------------------------------------------------------------------------

/// Configuration for a `run_report` invocation.
#[derive(Debug, Clone)]
pub struct ReportRequest {
    /// Folder holding the CR list, roster, and status documents.
    pub folder: PathBuf,
    /// Where report files go (defaults to `folder`).
    pub output_dir: Option<PathBuf>,
    /// Merged config + CLI settings.
    pub settings: ReportSettings,
    /// Timestamp printed in the digest banner.
    pub generated_at: NaiveDateTime,
}

/// Assigned CRs for one roster person.
#[derive(Debug, Clone, Serialize)]
pub struct PersonSummary {
    pub name: String,
    pub crs: Vec<CrId>,
}

/// Result of a report run.
#[derive(Debug, Clone, Serialize)]
pub struct ReportOutcome {
    /// Written assignment matrix.
    pub matrix_path: PathBuf,
    /// Written digest.
    pub digest_path: PathBuf,
    /// Roster size.
    pub team_size: usize,
    /// Columns in the matrix (CR list ∪ discovered).
    pub cr_count: usize,
    /// CRs with at least one work block.
    pub active_cr_count: usize,
    /// Discovered CRs missing from the CR list, in report order.
    pub new_crs: Vec<CrId>,
    /// Whether new CRs were appended to the CR list.
    pub new_crs_persisted: bool,
    /// Documents that could not be read; their owners have no assignments.
    pub unreadable: Vec<PathBuf>,
    /// Document owners missing from the roster.
    pub unlisted_people: Vec<String>,
    /// Per roster person, assigned CRs.
    pub assignments: Vec<PersonSummary>,
    /// Total elapsed time.
    pub elapsed: Duration,
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called after each document is read.
    fn document_read(&self, person: &str, current: usize, total: usize);
    /// Called when the pipeline completes.
    fn done(&self, outcome: &ReportOutcome);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn document_read(&self, _person: &str, _current: usize, _total: usize) {}
    fn done(&self, _outcome: &ReportOutcome) {}
}

/// Run the full report pipeline.
///
/// 1. Load CR list, roster, titles; list documents
/// 2. Read documents (unreadable ones degrade to empty)
/// 3. Scan, index, consolidate
/// 4. Write matrix CSV and digest
/// 5. Optionally append new CRs to the CR list
#[instrument(skip_all, fields(folder = %request.folder.display()))]
pub fn run_report(
    request: &ReportRequest,
    progress: &dyn ProgressReporter,
) -> Result<ReportOutcome> {
    let start = Instant::now();
    let settings = &request.settings;

    // --- Phase 1: Inputs ---
    progress.phase("Loading CR list and roster");
    let inputs = sources::load_inputs(&request.folder, settings)?;

    // --- Phase 2: Read documents ---
    progress.phase("Reading status files");
    let total = inputs.documents.len();
    let mut documents = Vec::with_capacity(total);
    let mut unreadable = Vec::new();

    for (i, path) in inputs.documents.iter().enumerate() {
        let doc = match sources::read_document(path) {
            Ok(doc) if doc.text.trim().is_empty() => {
                warn!(path = %path.display(), "status file is empty");
                doc
            }
            Ok(doc) => doc,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "could not read status file");
                unreadable.push(path.clone());
                Document::empty(person_name(path))
            }
        };
        progress.document_read(&doc.person, i + 1, total);
        documents.push(doc);
    }

    let unlisted_people: Vec<String> = documents
        .iter()
        .map(|d| d.person.clone())
        .filter(|person| !inputs.roster.contains(person))
        .collect();
    for person in &unlisted_people {
        warn!(person = %person, "status file owner is not on the roster");
    }

    // --- Phase 3: Analyze ---
    progress.phase("Extracting CR work blocks");
    let analysis = analyze(&documents, &inputs.registry, &inputs.roster);
    if !analysis.new_crs.is_empty() {
        info!(
            new = %join_labels(&analysis.new_crs),
            "discovered CRs missing from the CR list"
        );
    }

    // --- Phase 4: Render and write ---
    progress.phase("Writing reports");
    let rows = matrix_rows(
        &analysis.matrix,
        &inputs.registry,
        &analysis.new_crs,
        settings.titles_row,
    );
    let header = DigestHeader {
        team_name: settings.team_name.clone(),
        generated_at: request.generated_at,
        team_size: inputs.roster.len(),
    };
    let digest = render_document(&header, &analysis.view, &inputs.registry);

    let out_dir = request.output_dir.as_ref().unwrap_or(&request.folder);
    let written = writer::write_report(
        out_dir,
        &settings.matrix_file,
        &to_csv(&rows),
        &settings.digest_file,
        &digest,
    )?;

    // --- Phase 5: Persist new CRs ---
    let new_crs_persisted = settings.persist_new_crs && !analysis.new_crs.is_empty();
    if new_crs_persisted {
        progress.phase("Updating CR list");
        writer::append_new_crs(&inputs.registry_path, &analysis.new_crs)?;
    }

    let assignments = inputs
        .roster
        .iter()
        .map(|name| PersonSummary {
            name: name.to_string(),
            crs: analysis.matrix.assigned(name).into_iter().cloned().collect(),
        })
        .collect();

    let outcome = ReportOutcome {
        matrix_path: written.matrix_path,
        digest_path: written.digest_path,
        team_size: inputs.roster.len(),
        cr_count: analysis.matrix.columns().len(),
        active_cr_count: analysis.view.len(),
        new_crs: analysis.new_crs.into_iter().collect(),
        new_crs_persisted,
        unreadable,
        unlisted_people,
        assignments,
        elapsed: start.elapsed(),
    };

    progress.done(&outcome);

    info!(
        team_size = outcome.team_size,
        crs = outcome.cr_count,
        active = outcome.active_cr_count,
        elapsed_ms = outcome.elapsed.as_millis(),
        "report pipeline complete"
    );

    Ok(outcome)
}

fn join_labels(crs: &BTreeSet<CrId>) -> String {
    crs.iter().map(CrId::label).collect::<Vec<_>>().join(", ")
}
