//! JSON fixtures used by the CLI to seed persisted control layers

use std::path::Path;

use anyhow::Context;
use serde::Deserialize;
use serde_json::Value;

use crate::domain::controls::validate_stateless_controls;
use crate::domain::{ControlLevel, ControlScope, StatelessControls, StepId};
use crate::infrastructure::services::UpsertControlValuesRequest;
use crate::AppState;

/// A persisted layer; `step_id` defaults to the fixture scope's step
#[derive(Debug, Clone, Deserialize)]
pub struct FixtureLayer {
    #[serde(default)]
    pub step_id: Option<StepId>,
    pub level: ControlLevel,
    #[serde(default)]
    pub priority: i32,
    pub controls: Value,
}

/// Layers to seed, plus optional stateless overrides
#[derive(Debug, Clone, Deserialize)]
pub struct ControlsFixture {
    pub scope: ControlScope,
    #[serde(default)]
    pub layers: Vec<FixtureLayer>,
    #[serde(default)]
    pub overrides: Option<StatelessControls>,
}

impl ControlsFixture {
    /// Reads a fixture, rejecting overrides with invalid control ids
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let fixture: Self = read_json(path)?;

        if let Some(overrides) = &fixture.overrides {
            validate_stateless_controls(overrides)
                .with_context(|| format!("Invalid overrides in {}", path.display()))?;
        }

        Ok(fixture)
    }

    /// Stores every layer; a later layer at the same level replaces an earlier one
    pub async fn seed(&self, state: &AppState) -> anyhow::Result<()> {
        for layer in &self.layers {
            let scope = match &layer.step_id {
                Some(step_id) => self.scope.for_step(step_id.clone()),
                None => self.scope.clone(),
            };

            state
                .control_values
                .upsert(
                    UpsertControlValuesRequest::new(scope, layer.level, layer.controls.clone())
                        .with_priority(layer.priority),
                )
                .await
                .with_context(|| format!("Invalid {} layer", layer.level))?;
        }

        Ok(())
    }
}

pub fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    serde_json::from_str(&raw).with_context(|| format!("Failed to parse {}", path.display()))
}
