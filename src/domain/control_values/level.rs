//! Control precedence levels

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::controls::ControlsError;

/// Tier at which a control-values bundle was set
///
/// Variants are declared from least to most specific; the ordinal breaks
/// priority ties so that the more specific level is folded last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ControlLevel {
    /// Organization-wide default
    OrganizationDefault,

    /// Default declared on the workflow
    WorkflowDefault,

    /// Override stored for a single step
    StepOverride,
}

impl ControlLevel {
    pub const ALL: [ControlLevel; 3] = [
        ControlLevel::OrganizationDefault,
        ControlLevel::WorkflowDefault,
        ControlLevel::StepOverride,
    ];

    pub fn ordinal(&self) -> u8 {
        match self {
            ControlLevel::OrganizationDefault => 0,
            ControlLevel::WorkflowDefault => 1,
            ControlLevel::StepOverride => 2,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ControlLevel::OrganizationDefault => "organization-default",
            ControlLevel::WorkflowDefault => "workflow-default",
            ControlLevel::StepOverride => "step-override",
        }
    }
}

impl fmt::Display for ControlLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ControlLevel {
    type Err = ControlsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|level| level.as_str() == s)
            .ok_or_else(|| ControlsError::unknown_level(s))
    }
}
