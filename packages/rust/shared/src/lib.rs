//! Shared types, error model, and configuration for crtrack.
//!
//! This crate is the foundation depended on by all other crtrack crates.
//! It provides:
//! - [`CrTrackError`]: the unified error type
//! - CR identifier recognition and normalization ([`CrId`], [`recognize`])
//! - Domain types ([`WorkBlock`], [`CrRegistry`], [`TeamRoster`], [`Document`])
//! - Configuration ([`AppConfig`], [`ReportSettings`], config loading)

pub mod config;
pub mod error;
pub mod identifier;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, InputsConfig, OutputsConfig, ReportConfig, ReportSettings, config_dir,
    config_file_path, init_config, load_config, load_config_from,
};
pub use error::{CrTrackError, Result};
pub use identifier::{CrId, TRACKABLE_CODES, canonicalize, is_trackable, recognize};
pub use types::{CrEntry, CrRegistry, Document, TeamRoster, WorkBlock};
