//! Resolution output with per-control provenance

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::Controls;
use crate::domain::control_values::ControlLevel;
use crate::domain::ids::{ControlValuesId, StepId};

/// Layer that supplied the effective value of a control
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ControlSource {
    /// A persisted control-values row
    Persisted {
        id: ControlValuesId,
        level: ControlLevel,
        priority: i32,
    },

    /// The job's stateless override map
    Stateless,
}

impl ControlSource {
    pub fn is_stateless(&self) -> bool {
        matches!(self, ControlSource::Stateless)
    }
}

/// Effective controls of one step, plus where each value came from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedControls {
    pub step_id: StepId,
    pub controls: Controls,
    pub sources: BTreeMap<String, ControlSource>,
}

impl ResolvedControls {
    pub fn empty(step_id: StepId) -> Self {
        Self {
            step_id,
            controls: Controls::new(),
            sources: BTreeMap::new(),
        }
    }

    pub fn get(&self, control_id: &str) -> Option<&serde_json::Value> {
        self.controls.get(control_id)
    }

    pub fn source_of(&self, control_id: &str) -> Option<&ControlSource> {
        self.sources.get(control_id)
    }

    pub fn is_empty(&self) -> bool {
        self.controls.is_empty()
    }

    pub fn len(&self) -> usize {
        self.controls.len()
    }
}
