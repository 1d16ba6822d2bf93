//! CR identifier recognition and normalization.
//!
//! Status files mention work items as `CR` followed by a code (`CR 86193`,
//! `cr007`, `CR FOD01`). Every mention is reduced to a canonical [`CrId`],
//! which is the only key used for lookups and report ordering.

use std::cmp::Ordering;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

/// Matches `CR`, optional whitespace, then the raw code.
static CR_MENTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bCR\s*([A-Za-z0-9_]+)").expect("CR mention regex")
});

/// Non-numeric codes that are real work items.
pub const TRACKABLE_CODES: [&str; 4] = ["FOD01", "FOD02", "A_III", "A__II"];

// ---------------------------------------------------------------------------
// CrId
// ---------------------------------------------------------------------------

/// A canonical CR identifier.
///
/// Always uppercase; purely numeric identifiers carry no leading zeros.
/// Only [`canonicalize`] builds one, so two mentions of the same work item
/// always compare equal.
///
/// `Ord` follows report order: non-numeric identifiers first (by string),
/// then numeric identifiers by integer value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct CrId(String);

impl CrId {
    /// The canonical token, without the `CR` prefix.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the identifier consists of decimal digits only.
    pub fn is_numeric(&self) -> bool {
        is_all_digits(&self.0)
    }

    /// Whether this identifier may appear in reports. See [`is_trackable`].
    pub fn is_trackable(&self) -> bool {
        is_trackable(&self.0)
    }

    /// Human-facing label, e.g. `CR 86193`.
    pub fn label(&self) -> String {
        format!("CR {}", self.0)
    }
}

impl fmt::Display for CrId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CrId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Ord for CrId {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.is_numeric(), other.is_numeric()) {
            (false, true) => Ordering::Less,
            (true, false) => Ordering::Greater,
            // No leading zeros, so a longer digit string is a larger number.
            (true, true) => self
                .0
                .len()
                .cmp(&other.0.len())
                .then_with(|| self.0.cmp(&other.0)),
            (false, false) => self.0.cmp(&other.0),
        }
    }
}

impl PartialOrd for CrId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// ---------------------------------------------------------------------------
// Normalizer operations
// ---------------------------------------------------------------------------

/// Find the first CR mention in `text` and return its raw code.
///
/// Matching is case-insensitive and needs a word boundary before `CR`,
/// so `"see CR 42"` yields `"42"` while `"SCR 42"` yields nothing.
pub fn recognize(text: &str) -> Option<&str> {
    CR_MENTION_RE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Reduce a raw code to its canonical identifier.
///
/// Uppercases the token; a digits-only token loses its leading zeros
/// (`"007"` becomes `"7"`, `"000"` becomes `"0"`).
pub fn canonicalize(raw: &str) -> CrId {
    let upper = raw.to_uppercase();
    if is_all_digits(&upper) {
        let stripped = upper.trim_start_matches('0');
        if stripped.is_empty() {
            return CrId("0".to_string());
        }
        return CrId(stripped.to_string());
    }
    CrId(upper)
}

/// Whether an identifier should be tracked in reports.
///
/// True when it contains at least one digit or is one of
/// [`TRACKABLE_CODES`]. Stray matches such as `CR` followed by an ordinary
/// word (`"CRITICAL"` recognizes as `"ITICAL"`) are rejected.
pub fn is_trackable(identifier: &str) -> bool {
    if identifier.chars().any(|c| c.is_ascii_digit()) {
        return true;
    }
    let upper = identifier.to_uppercase();
    TRACKABLE_CODES.contains(&upper.as_str())
}

fn is_all_digits(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}
