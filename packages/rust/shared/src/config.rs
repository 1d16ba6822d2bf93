//! Application configuration for crtrack.
//!
//! User config lives at `~/.crtrack/crtrack.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{CrTrackError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "crtrack.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".crtrack";

// ---------------------------------------------------------------------------
// Config structs (matching crtrack.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Input file naming inside the status folder.
    #[serde(default)]
    pub inputs: InputsConfig,

    /// Output file naming and options.
    #[serde(default)]
    pub outputs: OutputsConfig,

    /// Digest presentation.
    #[serde(default)]
    pub report: ReportConfig,
}

/// `[inputs]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputsConfig {
    /// Reference list of known CRs.
    #[serde(default = "default_cr_list")]
    pub cr_list: String,

    /// Team member names, one per line.
    #[serde(default = "default_roster")]
    pub roster: String,

    /// Optional CR title metadata (`CR <id> <title>` per line).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub titles: Option<String>,

    /// Files starting with this prefix are inputs, not status documents.
    #[serde(default = "default_reserved_prefix")]
    pub reserved_prefix: String,

    /// Extension of status documents (without the dot).
    #[serde(default = "default_extension")]
    pub extension: String,
}

impl Default for InputsConfig {
    fn default() -> Self {
        Self {
            cr_list: default_cr_list(),
            roster: default_roster(),
            titles: None,
            reserved_prefix: default_reserved_prefix(),
            extension: default_extension(),
        }
    }
}

fn default_cr_list() -> String {
    "Models_CR_List.txt".into()
}
fn default_roster() -> String {
    "Models_Group.txt".into()
}
fn default_reserved_prefix() -> String {
    "Models_".into()
}
fn default_extension() -> String {
    "txt".into()
}

/// `[outputs]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputsConfig {
    /// Assignment matrix CSV.
    #[serde(default = "default_matrix_file")]
    pub matrix_file: String,

    /// CR-grouped digest text.
    #[serde(default = "default_digest_file")]
    pub digest_file: String,

    /// Whether the matrix starts with a row of full CR titles.
    #[serde(default = "default_true")]
    pub titles_row: bool,

    /// Append newly discovered CRs to the CR list.
    #[serde(default)]
    pub persist_new_crs: bool,
}

impl Default for OutputsConfig {
    fn default() -> Self {
        Self {
            matrix_file: default_matrix_file(),
            digest_file: default_digest_file(),
            titles_row: true,
            persist_new_crs: false,
        }
    }
}

fn default_matrix_file() -> String {
    "Models_CR_Worked.csv".into()
}
fn default_digest_file() -> String {
    "Consolidated_Status_Report.txt".into()
}
fn default_true() -> bool {
    true
}

/// `[report]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Team name shown in the digest heading.
    #[serde(default = "default_team_name")]
    pub team_name: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            team_name: default_team_name(),
        }
    }
}

fn default_team_name() -> String {
    "Models Team".into()
}

// ---------------------------------------------------------------------------
// Report settings (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime report configuration, merged from config file + CLI flags.
#[derive(Debug, Clone)]
pub struct ReportSettings {
    /// CR list file name.
    pub cr_list: String,
    /// Roster file name.
    pub roster: String,
    /// Optional title metadata file name.
    pub titles: Option<String>,
    /// Prefix marking non-document input files.
    pub reserved_prefix: String,
    /// Status document extension.
    pub extension: String,
    /// Matrix CSV file name.
    pub matrix_file: String,
    /// Digest file name.
    pub digest_file: String,
    /// Emit the full-title row above the matrix header.
    pub titles_row: bool,
    /// Append new CRs to the CR list after the run.
    pub persist_new_crs: bool,
    /// Team name for the digest heading.
    pub team_name: String,
}

impl From<&AppConfig> for ReportSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            cr_list: config.inputs.cr_list.clone(),
            roster: config.inputs.roster.clone(),
            titles: config.inputs.titles.clone(),
            reserved_prefix: config.inputs.reserved_prefix.clone(),
            extension: config.inputs.extension.trim_start_matches('.').to_string(),
            matrix_file: config.outputs.matrix_file.clone(),
            digest_file: config.outputs.digest_file.clone(),
            titles_row: config.outputs.titles_row,
            persist_new_crs: config.outputs.persist_new_crs,
            team_name: config.report.team_name.clone(),
        }
    }
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.crtrack/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| CrTrackError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.crtrack/crtrack.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| CrTrackError::io(path, e))?;

    let config: AppConfig = toml::from_str(&content).map_err(|e| {
        CrTrackError::config(format!("failed to parse {}: {e}", path.display()))
    })?;

    if config.inputs.extension.trim_start_matches('.').is_empty() {
        return Err(CrTrackError::config("inputs.extension must not be empty"));
    }

    Ok(config)
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| CrTrackError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| CrTrackError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| CrTrackError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}
