//! Core domain types for crtrack reports.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::Serialize;

use crate::identifier::CrId;

// ---------------------------------------------------------------------------
// Document / WorkBlock
// ---------------------------------------------------------------------------

/// One person's decoded status file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Owner of the document (the status file's stem).
    pub person: String,
    /// Full decoded text, line endings already normalized.
    pub text: String,
}

impl Document {
    pub fn new(person: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            person: person.into(),
            text: text.into(),
        }
    }

    /// A document that contributes no blocks (unreadable source).
    pub fn empty(person: impl Into<String>) -> Self {
        Self::new(person, String::new())
    }
}

/// A contiguous span of one person's document attributed to one CR mention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkBlock {
    /// Canonical identifier the block was opened for.
    pub cr: CrId,
    /// Owner of the document the block came from.
    pub person: String,
    /// Block text, trimmed, never empty.
    pub text: String,
}

// ---------------------------------------------------------------------------
// CR registry
// ---------------------------------------------------------------------------

/// A known CR from the reference list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrEntry {
    /// Canonical identifier.
    pub id: CrId,
    /// Title text following the identifier, if the list carries one.
    pub title: Option<String>,
}

/// Known CRs plus optional title metadata, keyed by canonical identifier.
///
/// Entries keep the order in which the reference list first names them.
/// Titles from a separate metadata source live in an overlay that takes
/// precedence over list titles and may describe CRs the list lacks.
#[derive(Debug, Clone, Default)]
pub struct CrRegistry {
    entries: IndexMap<CrId, CrEntry>,
    metadata: BTreeMap<CrId, String>,
}

impl CrRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a known CR. A repeated identifier keeps its position; a newer
    /// non-empty title replaces the old one.
    pub fn insert(&mut self, entry: CrEntry) {
        match self.entries.get_mut(&entry.id) {
            Some(existing) => {
                if entry.title.is_some() {
                    existing.title = entry.title;
                }
            }
            None => {
                self.entries.insert(entry.id.clone(), entry);
            }
        }
    }

    /// Merge titles from a metadata source.
    pub fn apply_titles(&mut self, titles: impl IntoIterator<Item = (CrId, String)>) {
        self.metadata.extend(titles);
    }

    /// Whether the reference list names this CR.
    pub fn contains(&self, id: &CrId) -> bool {
        self.entries.contains_key(id)
    }

    /// Best known title: metadata overlay first, then the list's own text.
    pub fn title(&self, id: &CrId) -> Option<&str> {
        self.metadata
            .get(id)
            .map(String::as_str)
            .or_else(|| self.entries.get(id).and_then(|e| e.title.as_deref()))
    }

    /// Known identifiers in list order.
    pub fn ids(&self) -> impl Iterator<Item = &CrId> {
        self.entries.keys()
    }

    pub fn entries(&self) -> impl Iterator<Item = &CrEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Team roster
// ---------------------------------------------------------------------------

/// Ordered set of team member names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeamRoster {
    names: Vec<String>,
}

impl TeamRoster {
    /// Build a roster, trimming names and dropping blanks and repeats.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut roster = Self::default();
        for name in names {
            let name = name.as_ref().trim();
            if !name.is_empty() && !roster.contains(name) {
                roster.names.push(name.to_string());
            }
        }
        roster
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identifier::canonicalize;

    fn entry(raw: &str, title: Option<&str>) -> CrEntry {
        CrEntry {
            id: canonicalize(raw),
            title: title.map(String::from),
        }
    }

    #[test]
    fn registry_keeps_first_position_and_latest_title() {
        let mut registry = CrRegistry::new();
        registry.insert(entry("86193", Some("Artemis III training")));
        registry.insert(entry("FOD01", None));
        registry.insert(entry("086193", Some("Artemis III training, rev B")));

        let ids: Vec<&str> = registry.ids().map(CrId::as_str).collect();
        assert_eq!(ids, ["86193", "FOD01"]);
        assert_eq!(
            registry.title(&canonicalize("86193")),
            Some("Artemis III training, rev B")
        );
        assert_eq!(registry.title(&canonicalize("FOD01")), None);
    }

    #[test]
    fn metadata_titles_take_precedence() {
        let mut registry = CrRegistry::new();
        registry.insert(entry("5", Some("list title")));
        registry.apply_titles([
            (canonicalize("5"), "metadata title".to_string()),
            (canonicalize("9"), "unlisted".to_string()),
        ]);

        assert_eq!(registry.title(&canonicalize("5")), Some("metadata title"));
        assert_eq!(registry.title(&canonicalize("9")), Some("unlisted"));
        assert!(!registry.contains(&canonicalize("9")));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn roster_preserves_order_and_drops_duplicates() {
        let roster = TeamRoster::from_names(["  Carol ", "Alice", "", "Carol", "Bob"]);
        let names: Vec<&str> = roster.iter().collect();
        assert_eq!(names, ["Carol", "Alice", "Bob"]);
        assert!(roster.contains("Alice"));
        assert!(!roster.contains("Dave"));
    }
}
