//! Line-scanning state machine that carves a document into work blocks.
//!
//! Two states over an immutable line slice and a cursor:
//! - `Scanning`: outside any block, looking for a CR header line.
//! - `Collecting`: appending lines to the block opened by the last header.
//!
//! A block ends at the next CR header (which is then re-read as a start),
//! at a run of two or more blank lines, or at end of input.

use crtrack_shared::{CrId, WorkBlock, canonicalize, recognize};

/// Blank lines in a row that end the current block.
const SECTION_BREAK_BLANKS: usize = 2;

enum State<'a> {
    Scanning,
    Collecting(OpenBlock<'a>),
}

struct OpenBlock<'a> {
    cr: CrId,
    lines: Vec<&'a str>,
}

/// Run the state machine over `lines`, emitting blocks in document order.
pub(crate) fn scan(lines: &[&str], person: &str) -> Vec<WorkBlock> {
    let mut blocks = Vec::new();
    let mut state = State::Scanning;
    let mut cursor = 0;

    while cursor < lines.len() {
        let line = lines[cursor];
        state = match state {
            State::Scanning => {
                cursor += 1;
                match block_start(line) {
                    Some(cr) => State::Collecting(OpenBlock {
                        cr,
                        lines: vec![line],
                    }),
                    None => State::Scanning,
                }
            }
            State::Collecting(mut block) => {
                if block_start(line).is_some() {
                    // Leave the cursor here so Scanning reopens on this header.
                    close(block, person, &mut blocks);
                    State::Scanning
                } else if is_blank(line) && blank_run(lines, cursor) >= SECTION_BREAK_BLANKS {
                    close(block, person, &mut blocks);
                    State::Scanning
                } else {
                    block.lines.push(line);
                    cursor += 1;
                    State::Collecting(block)
                }
            }
        };
    }

    if let State::Collecting(block) = state {
        close(block, person, &mut blocks);
    }

    blocks
}

/// Canonical identifier if `line` opens a block.
///
/// The trimmed line must begin with `CR` (any case) and contain a full
/// CR mention; a bare `CR` or `CR:` line opens nothing.
pub(crate) fn block_start(line: &str) -> Option<CrId> {
    let trimmed = line.trim();
    let starts_with_marker = trimmed
        .get(..2)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("CR"));
    if !starts_with_marker {
        return None;
    }
    recognize(trimmed).map(canonicalize)
}

fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

/// Number of consecutive blank lines starting at `from`.
fn blank_run(lines: &[&str], from: usize) -> usize {
    lines[from..].iter().take_while(|l| is_blank(l)).count()
}

fn close(block: OpenBlock<'_>, person: &str, out: &mut Vec<WorkBlock>) {
    let text = block.lines.join("\n");
    let text = text.trim();
    if text.is_empty() {
        return;
    }
    out.push(WorkBlock {
        cr: block.cr,
        person: person.to_string(),
        text: text.to_string(),
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_start_needs_marker_and_mention() {
        assert_eq!(block_start("CR 5 did X"), Some(canonicalize("5")));
        assert_eq!(block_start("   cr007 notes"), Some(canonicalize("7")));
        assert_eq!(block_start("CR"), None);
        assert_eq!(block_start("CR: nothing yet"), None);
        assert_eq!(block_start("Reviewed CR 5"), None);
        assert_eq!(block_start(""), None);
    }

    #[test]
    fn block_start_accepts_untrackable_words() {
        // Recognized syntactically; trackability is decided downstream.
        assert_eq!(block_start("CRITICAL path review"), Some(canonicalize("ITICAL")));
    }

    #[test]
    fn blank_run_counts_whitespace_only_lines() {
        let lines = ["a", "", "  ", "\t", "b"];
        assert_eq!(blank_run(&lines, 1), 3);
        assert_eq!(blank_run(&lines, 0), 0);
        assert_eq!(blank_run(&lines, 5), 0);
    }

    #[test]
    fn multibyte_first_char_is_not_a_start() {
        assert_eq!(block_start("é CR 5"), None);
    }
}
