//! Control resolution error types

use thiserror::Error;

/// Errors raised while parsing or validating control-related values
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ControlsError {
    #[error("Invalid {kind} ID: {message}")]
    InvalidId { kind: String, message: String },

    #[error("Unknown control level: {0}")]
    UnknownLevel(String),

    #[error("Illegal job transition from {from} to {to}")]
    IllegalTransition { from: String, to: String },
}

impl ControlsError {
    pub fn invalid_id(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidId {
            kind: kind.into(),
            message: message.into(),
        }
    }

    pub fn unknown_level(level: impl Into<String>) -> Self {
        Self::UnknownLevel(level.into())
    }

    pub fn illegal_transition(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self::IllegalTransition {
            from: from.into(),
            to: to.into(),
        }
    }
}
