//! Report file writer.
//!
//! Writes the matrix CSV and the digest into the output directory, and
//! optionally extends the CR list with newly discovered CRs.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};

use crtrack_shared::{CrId, CrTrackError, Result};

use crate::matrix::DISCOVERED_TITLE;
use crate::sources::decode_text;

/// Paths of the files a report run produced.
#[derive(Debug, Clone)]
pub struct WrittenReport {
    pub matrix_path: PathBuf,
    pub digest_path: PathBuf,
}

/// Write both report files into `out_dir`.
#[instrument(skip_all, fields(out_dir = %out_dir.display()))]
pub fn write_report(
    out_dir: &Path,
    matrix_file: &str,
    matrix_csv: &str,
    digest_file: &str,
    digest: &str,
) -> Result<WrittenReport> {
    std::fs::create_dir_all(out_dir).map_err(|e| CrTrackError::io(out_dir, e))?;

    let matrix_path = out_dir.join(matrix_file);
    let digest_path = out_dir.join(digest_file);
    write_atomic(&matrix_path, matrix_csv)?;
    write_atomic(&digest_path, digest)?;

    info!(
        matrix = %matrix_path.display(),
        digest = %digest_path.display(),
        "report files written"
    );

    Ok(WrittenReport {
        matrix_path,
        digest_path,
    })
}

/// Write to a temp file beside `target`, then rename over it.
pub fn write_atomic(target: &Path, content: &str) -> Result<()> {
    let file_name = target
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| CrTrackError::validation(format!("invalid output path {target:?}")))?;
    let temp = target.with_file_name(format!(".{file_name}.tmp"));

    std::fs::write(&temp, content).map_err(|e| CrTrackError::io(&temp, e))?;
    std::fs::rename(&temp, target).map_err(|e| CrTrackError::io(target, e))?;

    debug!(path = %target.display(), size = content.len(), "wrote file");
    Ok(())
}

/// Append `CR <id> [Found in status emails]` lines to the CR list.
///
/// The list is rewritten as UTF-8 whatever its original encoding.
/// Returns the number of lines appended.
#[instrument(skip_all, fields(path = %registry_path.display(), new = new_crs.len()))]
pub fn append_new_crs(registry_path: &Path, new_crs: &BTreeSet<CrId>) -> Result<usize> {
    if new_crs.is_empty() {
        return Ok(0);
    }

    let bytes = std::fs::read(registry_path).map_err(|e| CrTrackError::io(registry_path, e))?;
    let mut content = decode_text(&bytes).ok_or_else(|| CrTrackError::Decode {
        path: registry_path.to_path_buf(),
    })?;

    if !content.is_empty() && !content.ends_with('\n') {
        content.push('\n');
    }
    for cr in new_crs {
        content.push_str(&format!("{} {DISCOVERED_TITLE}\n", cr.label()));
    }

    write_atomic(registry_path, &content)?;
    info!(count = new_crs.len(), "new CRs appended to CR list");
    Ok(new_crs.len())
}
