//! Layered error definitions
//!
//! Categorized by source: config, track, session and io.
//!
//! The analysis pipeline does not produce errors for well-typed input;
//! structurally empty input yields empty results instead.

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Track Errors =====
    /// Persisted master track is malformed
    #[error("master track load error: {message}")]
    TrackLoad {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    // ===== Session Errors =====
    /// Car id not present in the session
    #[error("unknown car: {car_id}")]
    UnknownCar { car_id: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create master track load error
    pub fn track_load(message: impl Into<String>) -> Self {
        Self::TrackLoad {
            message: message.into(),
            source: None,
        }
    }

    /// Create unknown car error
    pub fn unknown_car(car_id: impl Into<String>) -> Self {
        Self::UnknownCar {
            car_id: car_id.into(),
        }
    }
}
