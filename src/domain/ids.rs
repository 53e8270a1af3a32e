//! Validated identifiers for tenancy, workflow and job scope

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::domain::controls::ControlsError;
use crate::domain::storage::StorageKey;

/// Maximum length for identifiers
pub const MAX_ID_LENGTH: usize = 64;

/// Alphanumeric start, then alphanumerics, underscores or hyphens
static ID_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_-]*$").unwrap());

/// Validate an identifier string, `kind` is used in the error message
pub fn validate_id(kind: &str, id: &str) -> Result<(), ControlsError> {
    if id.is_empty() {
        return Err(ControlsError::invalid_id(kind, "cannot be empty"));
    }

    if id.len() > MAX_ID_LENGTH {
        return Err(ControlsError::invalid_id(
            kind,
            format!("exceeds maximum length of {} characters", MAX_ID_LENGTH),
        ));
    }

    if !ID_PATTERN.is_match(id) {
        return Err(ControlsError::invalid_id(
            kind,
            format!(
                "'{}' must start with an alphanumeric and contain only alphanumerics, '_' or '-'",
                id
            ),
        ));
    }

    Ok(())
}

macro_rules! scoped_id {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Create a new validated identifier
            pub fn new(id: impl Into<String>) -> Result<Self, ControlsError> {
                let id = id.into();
                validate_id($kind, &id)?;
                Ok(Self(id))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = ControlsError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl StorageKey for $name {}
    };
}

scoped_id!(
    /// Environment (tenant deployment stage) identifier
    EnvironmentId,
    "environment"
);
scoped_id!(
    /// Organization identifier
    OrganizationId,
    "organization"
);
scoped_id!(
    /// Workflow identifier
    WorkflowId,
    "workflow"
);
scoped_id!(
    /// Step identifier, unique within a workflow
    StepId,
    "step"
);
scoped_id!(
    /// Persisted control-values bundle identifier
    ControlValuesId,
    "control values"
);
scoped_id!(
    /// Job identifier
    JobId,
    "job"
);

impl ControlValuesId {
    /// Generate a fresh random identifier
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().simple().to_string())
    }
}

impl JobId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().simple().to_string())
    }
}
