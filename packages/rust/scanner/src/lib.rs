//! Work-block scanning for free-form status documents.
//!
//! Carves one person's status text into `(CR, text)` blocks. A block starts
//! at a line beginning with a CR mention and runs until the next such line,
//! a section break (two or more blank lines), or the end of the document.
//! A single blank line inside a block is kept as a paragraph separator.
//!
//! Scanning is pure: no I/O, no shared state, one document at a time.

mod machine;

use indexmap::IndexMap;
use tracing::{debug, instrument};

use crtrack_shared::{CrId, Document, WorkBlock};

/// Blocks of one document, one per CR, after last-write-wins collapse.
pub type PersonBlocks = IndexMap<CrId, WorkBlock>;

/// Scan pre-split lines into blocks in document order.
///
/// The same CR may appear in several blocks; see [`collapse`].
pub fn scan_lines(lines: &[&str], person: &str) -> Vec<WorkBlock> {
    machine::scan(lines, person)
}

/// Scan a whole document into ordered blocks.
#[instrument(skip_all, fields(person = %doc.person))]
pub fn scan_document(doc: &Document) -> Vec<WorkBlock> {
    let lines: Vec<&str> = doc.text.lines().collect();
    let blocks = machine::scan(&lines, &doc.person);
    debug!(lines = lines.len(), blocks = blocks.len(), "document scanned");
    blocks
}

/// Keep one block per CR; a later block replaces an earlier one.
///
/// The replaced block is discarded, not merged: a CR mentioned twice in
/// one document reports only its last write-up.
pub fn collapse(blocks: Vec<WorkBlock>) -> PersonBlocks {
    let mut by_cr = PersonBlocks::new();
    for block in blocks {
        if let Some(previous) = by_cr.insert(block.cr.clone(), block) {
            debug!(cr = %previous.cr, person = %previous.person, "earlier block replaced");
        }
    }
    by_cr
}

/// Scan a document and collapse it to one block per CR.
pub fn scan_person(doc: &Document) -> PersonBlocks {
    collapse(scan_document(doc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crtrack_shared::canonicalize;
    use pretty_assertions::assert_eq;

    fn pairs(blocks: &[WorkBlock]) -> Vec<(&str, &str)> {
        blocks
            .iter()
            .map(|b| (b.cr.as_str(), b.text.as_str()))
            .collect()
    }

    #[test]
    fn single_header_yields_one_block() {
        let lines = ["CR 86193 Implemented the loader", "Tested on the sim rig"];
        let blocks = scan_lines(&lines, "Alice");
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].person, "Alice");
        assert_eq!(blocks[0].cr, canonicalize("86193"));
        assert!(blocks[0].text.starts_with("CR 86193 Implemented the loader\n"));
    }

    #[test]
    fn double_blank_separates_blocks() {
        let lines = ["CR 5 did X", "", "", "CR 6 did Y"];
        let blocks = scan_lines(&lines, "Alice");
        assert_eq!(pairs(&blocks), [("5", "CR 5 did X"), ("6", "CR 6 did Y")]);
    }

    #[test]
    fn single_blank_is_kept_inside_block() {
        let lines = ["CR 5 did X", "", "more on X", "CR 6 did Y"];
        let blocks = scan_lines(&lines, "Alice");
        assert_eq!(
            pairs(&blocks),
            [("5", "CR 5 did X\n\nmore on X"), ("6", "CR 6 did Y")]
        );
    }

    #[test]
    fn section_break_drops_trailing_prose() {
        let lines = [
            "CR 5 did X",
            "details",
            "",
            "",
            "",
            "Out of office Friday.",
            "Thanks,",
        ];
        let blocks = scan_lines(&lines, "Bob");
        assert_eq!(pairs(&blocks), [("5", "CR 5 did X\ndetails")]);
    }

    #[test]
    fn preamble_before_first_header_is_ignored() {
        let lines = ["Hi team,", "Status below.", "", "CR 12 wrote tests"];
        let blocks = scan_lines(&lines, "Bob");
        assert_eq!(pairs(&blocks), [("12", "CR 12 wrote tests")]);
    }

    #[test]
    fn header_line_is_kept_verbatim() {
        let lines = ["  CR 0042 - tuned thresholds  ", "  indented detail"];
        let blocks = scan_lines(&lines, "Carol");
        assert_eq!(blocks[0].cr.as_str(), "42");
        assert_eq!(
            blocks[0].text,
            "CR 0042 - tuned thresholds  \n  indented detail"
        );
    }

    #[test]
    fn bare_marker_line_is_content_not_header() {
        let lines = ["CR 7 started", "CR", "still CR 7"];
        let blocks = scan_lines(&lines, "Carol");
        assert_eq!(pairs(&blocks), [("7", "CR 7 started\nCR\nstill CR 7")]);
    }

    #[test]
    fn lowercase_header_starts_block() {
        let lines = ["cr fod01 cleared debris log", "cr 3 reviewed"];
        let blocks = scan_lines(&lines, "Dave");
        assert_eq!(
            pairs(&blocks),
            [("FOD01", "cr fod01 cleared debris log"), ("3", "cr 3 reviewed")]
        );
    }

    #[test]
    fn trailing_blanks_are_trimmed() {
        let lines = ["CR 9 wrapped up", ""];
        let blocks = scan_lines(&lines, "Dave");
        assert_eq!(pairs(&blocks), [("9", "CR 9 wrapped up")]);
    }

    #[test]
    fn empty_document_yields_nothing() {
        assert!(scan_lines(&[], "Eve").is_empty());
        assert!(scan_document(&Document::empty("Eve")).is_empty());
    }

    #[test]
    fn crlf_documents_scan_like_lf() {
        let doc = Document::new("Eve", "CR 5 did X\r\n\r\nmore on X\r\n");
        let blocks = scan_document(&doc);
        assert_eq!(pairs(&blocks), [("5", "CR 5 did X\n\nmore on X")]);
    }

    #[test]
    fn last_write_wins_per_cr() {
        let lines = ["CR 5 first", "CR 5 second"];
        let collapsed = collapse(scan_lines(&lines, "Alice"));
        assert_eq!(collapsed.len(), 1);
        assert_eq!(collapsed[&canonicalize("5")].text, "CR 5 second");
    }

    #[test]
    fn repeat_after_section_break_replaces_first_write() {
        let doc = Document::new(
            "Alice",
            "CR 5 first pass\n\n\nCR 6 other work\n\n\nCR 005 second pass\nwith notes",
        );
        let collapsed = scan_person(&doc);
        let order: Vec<&str> = collapsed.keys().map(CrId::as_str).collect();
        assert_eq!(order, ["5", "6"]);
        assert_eq!(
            collapsed[&canonicalize("5")].text,
            "CR 005 second pass\nwith notes"
        );
    }
}
