//! Error types for CLI operations.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    /// Input file not found
    #[error("Input file not found: {}", path.display())]
    InputNotFound { path: PathBuf },

    /// Telemetry bundle is not valid JSON of the expected shape
    #[error("Failed to decode telemetry bundle {}: {source}", path.display())]
    TelemetryDecode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Loading was interrupted by a shutdown signal
    #[error("Interrupted while loading {}", path.display())]
    Interrupted { path: PathBuf },

    /// Configuration or master track error
    #[error(transparent)]
    Contract(#[from] contracts::ContractError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub fn input_not_found(path: &Path) -> Self {
        Self::InputNotFound {
            path: path.to_path_buf(),
        }
    }

    pub fn telemetry_decode(path: &Path, source: serde_json::Error) -> Self {
        Self::TelemetryDecode {
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn interrupted(path: &Path) -> Self {
        Self::Interrupted {
            path: path.to_path_buf(),
        }
    }
}

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
