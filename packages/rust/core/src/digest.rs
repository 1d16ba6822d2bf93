//! CR-grouped digest of everyone's work blocks.
//!
//! Regroups per-person blocks by CR and renders a plain-text document:
//! one section per CR (non-numeric identifiers first, then numeric in
//! ascending order), each listing every contributor's write-up indented by
//! four spaces.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use indexmap::IndexMap;
use tracing::{debug, instrument};

use crtrack_shared::{CrId, CrRegistry};

use crate::pipeline::ScannedDocument;

/// CR → person → work text, persons in first-seen order.
pub type ConsolidatedView = BTreeMap<CrId, IndexMap<String, String>>;

const SECTION_RULE_WIDTH: usize = 53;
const BANNER_RULE_WIDTH: usize = 65;
const INDENT: &str = "    ";

/// Group all trackable blocks by CR.
///
/// Documents are visited in the given order, which fixes the order of
/// contributors inside each CR.
#[instrument(skip_all, fields(documents = scanned.len()))]
pub fn consolidate(scanned: &[ScannedDocument]) -> ConsolidatedView {
    let mut view = ConsolidatedView::new();

    for doc in scanned {
        for block in doc.blocks.values() {
            if !block.cr.is_trackable() {
                continue;
            }
            view.entry(block.cr.clone())
                .or_default()
                .insert(block.person.clone(), block.text.clone());
        }
    }

    debug!(crs = view.len(), "blocks consolidated");
    view
}

/// Render the per-CR sections, closed by a final rule.
pub fn render_body(view: &ConsolidatedView, registry: &CrRegistry) -> String {
    let rule = "-".repeat(SECTION_RULE_WIDTH);
    let mut out = String::new();

    for (cr, contributors) in view {
        out.push_str(&rule);
        out.push_str("\n\n");

        match registry.title(cr) {
            Some(title) => out.push_str(&format!("{} - {title}\n", cr.label())),
            None => out.push_str(&format!("{}\n", cr.label())),
        }

        for (person, text) in contributors {
            out.push_str(&format!("{person} -\n"));
            for line in text.split('\n') {
                out.push_str(INDENT);
                out.push_str(line);
                out.push('\n');
            }
        }

        out.push('\n');
    }

    out.push_str(&rule);
    out.push('\n');
    out
}

/// Heading facts for the full digest document.
#[derive(Debug, Clone)]
pub struct DigestHeader {
    /// Team name for the title line.
    pub team_name: String,
    /// Local time the report was produced.
    pub generated_at: NaiveDateTime,
    /// Roster size.
    pub team_size: usize,
}

/// Render the complete digest: banner, introduction, then [`render_body`].
pub fn render_document(
    header: &DigestHeader,
    view: &ConsolidatedView,
    registry: &CrRegistry,
) -> String {
    let banner = "=".repeat(BANNER_RULE_WIDTH);
    let generated = header.generated_at.format("%B %d, %Y at %I:%M %p");

    let mut out = String::new();
    out.push_str(&format!("{banner}\n"));
    out.push_str(&format!(
        "{} - Consolidated CR Status Report\n",
        header.team_name
    ));
    out.push_str(&format!("Generated: {generated}\n"));
    out.push_str("Source: Weekly Status Reports\n");
    out.push_str(&format!("Total CRs with Activity: {}\n", view.len()));
    out.push_str(&format!("Team Members: {}\n", header.team_size));
    out.push_str(&format!("{banner}\n\n"));
    out.push_str("This report consolidates individual status updates by CR number,\n");
    out.push_str("showing all team member contributions for each active CR.\n\n");
    out.push_str(&render_body(view, registry));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use crtrack_shared::{CrEntry, Document, canonicalize};
    use crtrack_scanner::scan_person;
    use pretty_assertions::assert_eq;

    fn scanned(person: &str, text: &str) -> ScannedDocument {
        ScannedDocument {
            person: person.to_string(),
            blocks: scan_person(&Document::new(person, text)),
        }
    }

    #[test]
    fn view_orders_codes_before_numbers() {
        let docs = [scanned("Alice", "CR 10 ten\nCR A_III alpha\nCR 2 two")];
        let view = consolidate(&docs);
        let order: Vec<&str> = view.keys().map(CrId::as_str).collect();
        assert_eq!(order, ["A_III", "2", "10"]);
    }

    #[test]
    fn view_skips_untrackable() {
        let docs = [scanned("Alice", "CR 5 real\nCRITICAL stray note")];
        let view = consolidate(&docs);
        assert_eq!(view.len(), 1);
        assert!(view.contains_key(&canonicalize("5")));
    }

    #[test]
    fn contributors_follow_document_order() {
        let docs = [
            scanned("Zoe", "CR 5 from Zoe"),
            scanned("Adam", "CR 5 from Adam"),
        ];
        let view = consolidate(&docs);
        let people: Vec<&str> = view[&canonicalize("5")].keys().map(String::as_str).collect();
        assert_eq!(people, ["Zoe", "Adam"]);
    }

    #[test]
    fn body_layout_is_exact() {
        let docs = [
            scanned("Alice", "CR 5 did X\n\nmore on X"),
            scanned("Bob", "CR 005 reviewed X\nCR FOD01 swept bay"),
        ];
        let mut registry = CrRegistry::new();
        registry.insert(CrEntry {
            id: canonicalize("5"),
            title: Some("Loader rewrite".into()),
        });

        let body = render_body(&consolidate(&docs), &registry);
        let rule = "-".repeat(53);
        let expected = format!(
            "{rule}\n\n\
             CR FOD01\n\
             Bob -\n    CR FOD01 swept bay\n\
             \n\
             {rule}\n\n\
             CR 5 - Loader rewrite\n\
             Alice -\n    CR 5 did X\n    \n    more on X\n\
             Bob -\n    CR 005 reviewed X\n\
             \n\
             {rule}\n"
        );
        assert_eq!(body, expected);
    }

    #[test]
    fn empty_view_renders_closing_rule_only() {
        let body = render_body(&ConsolidatedView::new(), &CrRegistry::new());
        assert_eq!(body, format!("{}\n", "-".repeat(53)));
    }

    #[test]
    fn document_banner() {
        let header = DigestHeader {
            team_name: "Models Team".into(),
            generated_at: NaiveDate::from_ymd_opt(2026, 10, 16)
                .and_then(|d| d.and_hms_opt(14, 5, 0))
                .expect("valid timestamp"),
            team_size: 3,
        };
        let docs = [scanned("Alice", "CR 5 did X")];
        let doc = render_document(&header, &consolidate(&docs), &CrRegistry::new());

        let banner = "=".repeat(65);
        assert!(doc.starts_with(&format!(
            "{banner}\nModels Team - Consolidated CR Status Report\n\
             Generated: October 16, 2026 at 02:05 PM\n\
             Source: Weekly Status Reports\n\
             Total CRs with Activity: 1\n\
             Team Members: 3\n\
             {banner}\n\n"
        )));
        assert!(doc.contains("CR 5\nAlice -\n    CR 5 did X\n"));
        assert!(doc.ends_with(&format!("{}\n", "-".repeat(53))));
    }
}
