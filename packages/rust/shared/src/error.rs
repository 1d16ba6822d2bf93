//! Error types for crtrack.
//!
//! Library crates use [`CrTrackError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all crtrack operations.
#[derive(Debug, thiserror::Error)]
pub enum CrTrackError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// A required input (status folder, CR list, roster) is absent.
    #[error("missing required input: {what} not found at {path:?}")]
    MissingInput { what: String, path: PathBuf },

    /// A status file could not be decoded as text.
    #[error("could not decode {path:?} as text")]
    Decode { path: PathBuf },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Data validation error (malformed input file, bad output target, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, CrTrackError>;

impl CrTrackError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a missing-input error naming the absent collaborator.
    pub fn missing_input(what: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self::MissingInput {
            what: what.into(),
            path: path.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = CrTrackError::config("bad team_name");
        assert_eq!(err.to_string(), "config error: bad team_name");

        let err = CrTrackError::missing_input("CR list", "/tmp/status/Models_CR_List.txt");
        assert!(err.to_string().contains("CR list not found"));
        assert!(err.to_string().contains("Models_CR_List.txt"));
    }

    #[test]
    fn decode_error_names_file() {
        let err = CrTrackError::Decode {
            path: PathBuf::from("status/Alice.txt"),
        };
        assert!(err.to_string().contains("Alice.txt"));
    }
}
