//! Input loading from a status folder.
//!
//! The folder holds the CR reference list, the team roster, an optional
//! title metadata file, and one status document per person. Files may be
//! UTF-8, BOM-marked UTF-16, or a legacy single-byte encoding.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, info, instrument, warn};

use crtrack_shared::{
    CrEntry, CrId, CrRegistry, CrTrackError, Document, ReportSettings, Result, TeamRoster,
    canonicalize,
};

/// Matches `CR <code> <title...>` in the reference list.
static REGISTRY_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^CR\s+(\w+)\s*(.*)$").expect("registry line regex")
});

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];
const UTF16_LE_BOM: &[u8] = &[0xFF, 0xFE];
const UTF16_BE_BOM: &[u8] = &[0xFE, 0xFF];

/// Everything loaded from the folder before documents are read.
#[derive(Debug, Clone)]
pub struct Inputs {
    /// Reference list path (target for new-CR persistence).
    pub registry_path: PathBuf,
    /// Known CRs with titles.
    pub registry: CrRegistry,
    /// Team members in file order.
    pub roster: TeamRoster,
    /// Status documents, sorted by file name.
    pub documents: Vec<PathBuf>,
}

/// Load the reference list, roster, optional titles, and document paths.
///
/// Fails before touching any document when the folder, the reference list,
/// or the roster is missing.
#[instrument(skip_all, fields(folder = %folder.display()))]
pub fn load_inputs(folder: &Path, settings: &ReportSettings) -> Result<Inputs> {
    if !folder.is_dir() {
        return Err(CrTrackError::missing_input("status folder", folder));
    }

    let registry_path = folder.join(&settings.cr_list);
    let roster_path = folder.join(&settings.roster);
    require_file("CR list", &registry_path)?;
    require_file("team roster", &roster_path)?;

    let mut registry = load_registry(&registry_path)?;
    info!(known = registry.len(), "CR list loaded");

    if let Some(titles) = &settings.titles {
        let titles_path = folder.join(titles);
        if titles_path.is_file() {
            let overlay = load_titles(&titles_path)?;
            info!(titles = overlay.len(), "CR titles loaded");
            registry.apply_titles(overlay);
        } else {
            warn!(path = %titles_path.display(), "titles file not found, using CR list titles");
        }
    }

    let roster = load_roster(&roster_path)?;
    info!(members = roster.len(), "team roster loaded");

    let documents = discover_documents(folder, settings)?;
    info!(documents = documents.len(), "status documents found");

    Ok(Inputs {
        registry_path,
        registry,
        roster,
        documents,
    })
}

fn require_file(what: &str, path: &Path) -> Result<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(CrTrackError::missing_input(what, path))
    }
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// Decode raw file bytes to text with `\n` line endings.
///
/// Tries UTF-8 (BOM stripped), then UTF-16 when a BOM declares it, then
/// Latin-1. Returns `None` only when a UTF-16 BOM is present but the body
/// is not valid UTF-16.
pub fn decode_text(bytes: &[u8]) -> Option<String> {
    let text = if let Some(rest) = bytes.strip_prefix(UTF8_BOM) {
        String::from_utf8_lossy(rest).into_owned()
    } else if let Ok(text) = std::str::from_utf8(bytes) {
        text.to_string()
    } else if let Some(rest) = bytes.strip_prefix(UTF16_LE_BOM) {
        decode_utf16(rest, u16::from_le_bytes)?
    } else if let Some(rest) = bytes.strip_prefix(UTF16_BE_BOM) {
        decode_utf16(rest, u16::from_be_bytes)?
    } else {
        bytes.iter().map(|&b| char::from(b)).collect()
    };

    Some(normalize_newlines(&text))
}

fn decode_utf16(bytes: &[u8], unit: fn([u8; 2]) -> u16) -> Option<String> {
    if bytes.len() % 2 != 0 {
        return None;
    }
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| unit([pair[0], pair[1]]))
        .collect();
    String::from_utf16(&units).ok()
}

fn normalize_newlines(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

fn read_text(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path).map_err(|e| CrTrackError::io(path, e))?;
    decode_text(&bytes).ok_or_else(|| CrTrackError::Decode {
        path: path.to_path_buf(),
    })
}

// ---------------------------------------------------------------------------
// Reference list, titles, roster
// ---------------------------------------------------------------------------

/// Parse reference list text: each `CR <code> <title>` line is a known CR.
pub fn parse_registry(text: &str) -> Vec<CrEntry> {
    text.lines()
        .filter_map(|line| {
            let line = line.trim();
            if !line.starts_with("CR ") {
                return None;
            }
            let caps = REGISTRY_LINE_RE.captures(line)?;
            let title = caps[2].trim();
            Some(CrEntry {
                id: canonicalize(&caps[1]),
                title: (!title.is_empty()).then(|| title.to_string()),
            })
        })
        .collect()
}

/// Load the CR reference list.
pub fn load_registry(path: &Path) -> Result<CrRegistry> {
    let text = read_text(path)?;
    let mut registry = CrRegistry::new();
    for entry in parse_registry(&text) {
        registry.insert(entry);
    }
    Ok(registry)
}

/// Load title metadata; untitled lines are skipped.
pub fn load_titles(path: &Path) -> Result<Vec<(CrId, String)>> {
    let text = read_text(path)?;
    Ok(parse_registry(&text)
        .into_iter()
        .filter_map(|entry| entry.title.map(|title| (entry.id, title)))
        .collect())
}

/// Load the roster: one name per non-blank line.
pub fn load_roster(path: &Path) -> Result<TeamRoster> {
    let text = read_text(path)?;
    Ok(TeamRoster::from_names(text.lines()))
}

// ---------------------------------------------------------------------------
// Status documents
// ---------------------------------------------------------------------------

/// List status documents in `folder`, sorted by file name.
///
/// Skips files with the reserved prefix and the configured input/output
/// files, so a previous run's digest is never read back as a status file.
pub fn discover_documents(folder: &Path, settings: &ReportSettings) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(folder).map_err(|e| CrTrackError::io(folder, e))?;

    let mut excluded = vec![
        settings.cr_list.as_str(),
        settings.roster.as_str(),
        settings.matrix_file.as_str(),
        settings.digest_file.as_str(),
    ];
    if let Some(titles) = &settings.titles {
        excluded.push(titles.as_str());
    }

    let mut documents = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| CrTrackError::io(folder, e))?.path();
        if !path.is_file() {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            debug!(path = %path.display(), "skipping non-UTF-8 file name");
            continue;
        };
        let matches_extension = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e == settings.extension);
        let reserved =
            !settings.reserved_prefix.is_empty() && name.starts_with(&settings.reserved_prefix);
        if !matches_extension || reserved || excluded.contains(&name) {
            continue;
        }
        documents.push(path);
    }

    documents.sort();
    Ok(documents)
}

/// Person name for a status document: its file stem.
pub fn person_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Read and decode one status document.
pub fn read_document(path: &Path) -> Result<Document> {
    let text = read_text(path)?;
    Ok(Document::new(person_name(path), text))
}
