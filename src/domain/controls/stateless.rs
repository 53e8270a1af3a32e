//! Per-trigger control overrides supplied by stateless triggers

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use validator::ValidationError;

use super::Controls;
use crate::domain::ids::StepId;

/// Maximum length of a single control id
pub const MAX_CONTROL_ID_LENGTH: usize = 128;

/// Inline overrides keyed by step id, then control id
///
/// Owned by one job for its lifetime and never persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatelessControls {
    #[serde(default)]
    steps: BTreeMap<StepId, Controls>,
}

impl StatelessControls {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_step(mut self, step_id: StepId, controls: Controls) -> Self {
        self.steps.insert(step_id, controls);
        self
    }

    /// Overrides for a step, `None` when the trigger did not mention it
    pub fn for_step(&self, step_id: &StepId) -> Option<&Controls> {
        self.steps.get(step_id)
    }

    pub fn steps(&self) -> &BTreeMap<StepId, Controls> {
        &self.steps
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl From<BTreeMap<StepId, Controls>> for StatelessControls {
    fn from(steps: BTreeMap<StepId, Controls>) -> Self {
        Self { steps }
    }
}

/// Checks the control ids of a control map
pub fn validate_controls(controls: &Controls) -> Result<(), ValidationError> {
    for key in controls.keys() {
        if key.is_empty() {
            return Err(ValidationError::new("empty_control_id")
                .with_message("control id cannot be empty".into()));
        }

        if key.len() > MAX_CONTROL_ID_LENGTH {
            return Err(ValidationError::new("control_id_too_long").with_message(
                format!(
                    "control id '{}...' exceeds {} characters",
                    key.chars().take(16).collect::<String>(),
                    MAX_CONTROL_ID_LENGTH
                )
                .into(),
            ));
        }
    }

    Ok(())
}

/// Checks every step entry of an override map
pub fn validate_stateless_controls(controls: &StatelessControls) -> Result<(), ValidationError> {
    controls.steps.values().try_for_each(validate_controls)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn step(id: &str) -> StepId {
        StepId::new(id).unwrap()
    }

    #[test]
    fn test_for_step() {
        let overrides = StatelessControls::new().with_step(
            step("email"),
            json!({"subject": "C"}).as_object().cloned().unwrap(),
        );

        assert_eq!(overrides.for_step(&step("email")).unwrap()["subject"], json!("C"));
        assert!(overrides.for_step(&step("sms")).is_none());
        assert!(!overrides.is_empty());
        assert!(StatelessControls::new().is_empty());
    }

    #[test]
    fn test_deserialize() {
        let overrides: StatelessControls = serde_json::from_value(json!({
            "steps": {
                "email": {"subject": "Hello", "body": "World"},
                "push": {}
            }
        }))
        .unwrap();

        assert_eq!(overrides.steps().len(), 2);
        assert_eq!(overrides.for_step(&step("email")).unwrap().len(), 2);

        let empty: StatelessControls = serde_json::from_value(json!({})).unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn test_deserialize_rejects_bad_step_id() {
        let result: Result<StatelessControls, _> =
            serde_json::from_value(json!({"steps": {"bad step": {}}}));
        assert!(result.is_err());

        let result: Result<StatelessControls, _> =
            serde_json::from_value(json!({"steps": {"email": "not an object"}}));
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_control_ids() {
        let ok = StatelessControls::new().with_step(
            step("email"),
            json!({"subject": 1}).as_object().cloned().unwrap(),
        );
        assert!(validate_stateless_controls(&ok).is_ok());

        let mut empty_key = Controls::new();
        empty_key.insert(String::new(), json!(true));
        let bad = StatelessControls::new().with_step(step("email"), empty_key);
        assert_eq!(
            validate_stateless_controls(&bad).unwrap_err().code,
            "empty_control_id"
        );

        let mut long_key = Controls::new();
        long_key.insert("k".repeat(MAX_CONTROL_ID_LENGTH + 1), json!(1));
        assert_eq!(
            validate_controls(&long_key).unwrap_err().code,
            "control_id_too_long"
        );
    }
}
