//! Who touched which CR: the person × CR presence matrix.
//!
//! Indexing collects the trackable CRs of each scanned document. The matrix
//! then spans every roster person and every CR in the reference list or
//! discovered in documents, with an explicit entry for each pair.

use std::collections::{BTreeMap, BTreeSet};

use indexmap::IndexMap;
use tracing::{debug, instrument};

use crtrack_shared::{CrId, CrRegistry, TeamRoster};

use crate::pipeline::ScannedDocument;

/// Distinct trackable CRs per person, plus everything discovered.
#[derive(Debug, Clone, Default)]
pub struct AssignmentIndex {
    /// Person → CRs with at least one block, in document order of persons.
    pub assignments: IndexMap<String, BTreeSet<CrId>>,
    /// Union of all trackable CRs found in documents.
    pub discovered: BTreeSet<CrId>,
}

impl AssignmentIndex {
    /// Discovered CRs missing from the reference list.
    ///
    /// Only reported; persisting them is the caller's decision.
    pub fn new_crs(&self, registry: &CrRegistry) -> BTreeSet<CrId> {
        self.discovered
            .iter()
            .filter(|id| !registry.contains(id))
            .cloned()
            .collect()
    }
}

/// Build the per-person CR sets, dropping untrackable identifiers.
#[instrument(skip_all, fields(documents = scanned.len()))]
pub fn index_assignments(scanned: &[ScannedDocument]) -> AssignmentIndex {
    let mut index = AssignmentIndex::default();

    for doc in scanned {
        let crs = index.assignments.entry(doc.person.clone()).or_default();
        for cr in doc.blocks.keys() {
            if !cr.is_trackable() {
                debug!(person = %doc.person, cr = %cr, "untrackable identifier dropped");
                continue;
            }
            crs.insert(cr.clone());
            index.discovered.insert(cr.clone());
        }
    }

    debug!(
        people = index.assignments.len(),
        discovered = index.discovered.len(),
        "assignments indexed"
    );
    index
}

// ---------------------------------------------------------------------------
// AssignmentMatrix
// ---------------------------------------------------------------------------

/// Presence of every roster person on every reported CR.
#[derive(Debug, Clone, Default)]
pub struct AssignmentMatrix {
    columns: Vec<CrId>,
    rows: IndexMap<String, BTreeMap<CrId, bool>>,
}

impl AssignmentMatrix {
    /// Reported CRs in report order.
    pub fn columns(&self) -> &[CrId] {
        &self.columns
    }

    /// Person → CR → presence, in roster order.
    pub fn rows(&self) -> &IndexMap<String, BTreeMap<CrId, bool>> {
        &self.rows
    }

    /// Presence of one pair; `None` only for a person or CR outside the matrix.
    pub fn get(&self, person: &str, cr: &CrId) -> Option<bool> {
        self.rows.get(person).and_then(|row| row.get(cr)).copied()
    }

    /// CRs marked present for a person, in report order.
    pub fn assigned(&self, person: &str) -> Vec<&CrId> {
        self.rows
            .get(person)
            .map(|row| {
                row.iter()
                    .filter(|(_, present)| **present)
                    .map(|(cr, _)| cr)
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Build the matrix over roster × (reference list ∪ discovered).
///
/// Every pair defaults to absent; documents from people outside the roster
/// contribute columns but no rows.
pub fn build_matrix(
    roster: &TeamRoster,
    registry: &CrRegistry,
    index: &AssignmentIndex,
) -> AssignmentMatrix {
    let columns: BTreeSet<CrId> = registry
        .ids()
        .cloned()
        .chain(index.discovered.iter().cloned())
        .collect();

    let rows = roster
        .iter()
        .map(|person| {
            let touched = index.assignments.get(person);
            let row = columns
                .iter()
                .map(|cr| {
                    let present = touched.is_some_and(|crs| crs.contains(cr));
                    (cr.clone(), present)
                })
                .collect();
            (person.to_string(), row)
        })
        .collect();

    AssignmentMatrix {
        columns: columns.into_iter().collect(),
        rows,
    }
}
