//! Control-value resolver
//!
//! Folds the persisted control-values rows of a step in precedence order,
//! later rows overwriting earlier keys, then applies the job's stateless
//! overrides for that step on top. Resolution is pure: it reads already
//! fetched rows and never mutates them.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::resolved::{ControlSource, ResolvedControls};
use super::stateless::StatelessControls;
use super::Controls;
use crate::domain::control_values::ControlValuesEntity;
use crate::domain::ids::StepId;

/// Which end of the priority scale takes precedence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PriorityOrder {
    /// Larger priority values override smaller ones
    #[default]
    HigherWins,

    /// Smaller priority values override larger ones
    LowerWins,
}

impl PriorityOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            PriorityOrder::HigherWins => "higher-wins",
            PriorityOrder::LowerWins => "lower-wins",
        }
    }
}

impl std::str::FromStr for PriorityOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "higher-wins" => Ok(PriorityOrder::HigherWins),
            "lower-wins" => Ok(PriorityOrder::LowerWins),
            other => Err(format!(
                "Unknown priority order '{}', expected 'higher-wins' or 'lower-wins'",
                other
            )),
        }
    }
}

/// Resolver configuration, passed in at construction time
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolverConfig {
    pub priority_order: PriorityOrder,
}

impl ResolverConfig {
    pub fn with_priority_order(mut self, priority_order: PriorityOrder) -> Self {
        self.priority_order = priority_order;
        self
    }
}

/// Merges layered control values into the effective set for one step
#[derive(Debug, Clone, Default)]
pub struct ControlValueResolver {
    config: ResolverConfig,
}

impl ControlValueResolver {
    pub fn new(config: ResolverConfig) -> Self {
        Self { config }
    }

    /// Compares two rows in fold order: the row that sorts last wins.
    ///
    /// Ties on priority go to the more specific level, then to the row id so
    /// the order never depends on how the rows were fetched.
    pub fn fold_order(&self, a: &ControlValuesEntity, b: &ControlValuesEntity) -> Ordering {
        let by_priority = match self.config.priority_order {
            PriorityOrder::HigherWins => a.priority().cmp(&b.priority()),
            PriorityOrder::LowerWins => b.priority().cmp(&a.priority()),
        };

        by_priority
            .then_with(|| a.level().ordinal().cmp(&b.level().ordinal()))
            .then_with(|| a.id().cmp(b.id()))
    }

    /// Rows of a step sorted in fold order
    pub fn ordered<'a>(&self, rows: &'a [ControlValuesEntity]) -> Vec<&'a ControlValuesEntity> {
        let mut ordered: Vec<&ControlValuesEntity> = rows.iter().collect();
        ordered.sort_by(|a, b| self.fold_order(a, b));
        ordered
    }

    /// Effective controls for `step_id`
    ///
    /// `rows` are the persisted rows of that step. Without rows or overrides
    /// the result is empty.
    pub fn resolve(
        &self,
        step_id: &StepId,
        rows: &[ControlValuesEntity],
        overrides: Option<&StatelessControls>,
    ) -> Controls {
        self.resolve_with_sources(step_id, rows, overrides).controls
    }

    /// Same as [`resolve`](Self::resolve), keeping the layer each value came from
    pub fn resolve_with_sources(
        &self,
        step_id: &StepId,
        rows: &[ControlValuesEntity],
        overrides: Option<&StatelessControls>,
    ) -> ResolvedControls {
        let mut resolved = ResolvedControls::empty(step_id.clone());

        for row in self.ordered(rows) {
            let source = ControlSource::Persisted {
                id: row.id().clone(),
                level: row.level(),
                priority: row.priority(),
            };

            for (key, value) in row.controls() {
                resolved.controls.insert(key.clone(), value.clone());
                resolved.sources.insert(key.clone(), source.clone());
            }
        }

        if let Some(step_overrides) = overrides.and_then(|o| o.for_step(step_id)) {
            for (key, value) in step_overrides {
                resolved.controls.insert(key.clone(), value.clone());
                resolved.sources.insert(key.clone(), ControlSource::Stateless);
            }
        }

        resolved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::control_values::{ControlLevel, ControlScope};
    use crate::domain::ids::{ControlValuesId, EnvironmentId, OrganizationId, WorkflowId};
    use serde_json::{json, Value};

    fn scope() -> ControlScope {
        ControlScope::new(
            EnvironmentId::new("env-1").unwrap(),
            OrganizationId::new("org-1").unwrap(),
            WorkflowId::new("welcome").unwrap(),
            step_id(),
        )
    }

    fn step_id() -> StepId {
        StepId::new("email").unwrap()
    }

    fn controls(value: Value) -> Controls {
        value.as_object().cloned().unwrap()
    }

    fn row(id: &str, level: ControlLevel, priority: i32, value: Value) -> ControlValuesEntity {
        ControlValuesEntity::new(scope(), level, controls(value))
            .with_id(ControlValuesId::new(id).unwrap())
            .with_priority(priority)
    }

    fn example_rows() -> Vec<ControlValuesEntity> {
        vec![
            row("a", ControlLevel::WorkflowDefault, 0, json!({"subject": "A"})),
            row(
                "b",
                ControlLevel::StepOverride,
                1,
                json!({"subject": "B", "body": "X"}),
            ),
        ]
    }

    fn override_subject(subject: &str) -> StatelessControls {
        StatelessControls::new().with_step(step_id(), controls(json!({"subject": subject})))
    }

    #[test]
    fn test_example_without_overrides() {
        let resolver = ControlValueResolver::default();

        let result = resolver.resolve(&step_id(), &example_rows(), None);

        assert_eq!(Value::Object(result), json!({"subject": "B", "body": "X"}));
    }

    #[test]
    fn test_example_with_overrides() {
        let resolver = ControlValueResolver::default();
        let overrides = override_subject("C");

        let result = resolver.resolve(&step_id(), &example_rows(), Some(&overrides));

        assert_eq!(Value::Object(result), json!({"subject": "C", "body": "X"}));
    }

    #[test]
    fn test_empty_inputs_resolve_to_empty() {
        let resolver = ControlValueResolver::default();

        assert!(resolver.resolve(&step_id(), &[], None).is_empty());
        assert!(resolver
            .resolve(&step_id(), &[], Some(&StatelessControls::new()))
            .is_empty());
    }

    #[test]
    fn test_overrides_only() {
        let resolver = ControlValueResolver::default();
        let overrides = override_subject("Only");

        let result = resolver.resolve(&step_id(), &[], Some(&overrides));

        assert_eq!(Value::Object(result), json!({"subject": "Only"}));
    }

    #[test]
    fn test_override_for_other_step_is_ignored() {
        let resolver = ControlValueResolver::default();
        let overrides = StatelessControls::new().with_step(
            StepId::new("sms").unwrap(),
            controls(json!({"subject": "ignored"})),
        );

        let result = resolver.resolve(&step_id(), &example_rows(), Some(&overrides));

        assert_eq!(Value::Object(result), json!({"subject": "B", "body": "X"}));
    }

    #[test]
    fn test_overrides_always_win() {
        let resolver = ControlValueResolver::default();
        let rows = vec![
            row("a", ControlLevel::StepOverride, i32::MAX, json!({"subject": "persisted", "cta": 1})),
            row("b", ControlLevel::OrganizationDefault, i32::MIN, json!({"subject": "low"})),
        ];
        let overrides = StatelessControls::new().with_step(
            step_id(),
            controls(json!({"subject": null, "extra": [1, 2]})),
        );

        let result = resolver.resolve_with_sources(&step_id(), &rows, Some(&overrides));

        assert_eq!(result.get("subject"), Some(&Value::Null));
        assert_eq!(result.get("extra"), Some(&json!([1, 2])));
        assert_eq!(result.get("cta"), Some(&json!(1)));
        assert!(result.source_of("subject").unwrap().is_stateless());
        assert!(result.source_of("extra").unwrap().is_stateless());
        assert!(!result.source_of("cta").unwrap().is_stateless());
    }

    #[test]
    fn test_input_order_does_not_matter() {
        let resolver = ControlValueResolver::default();
        let rows = vec![
            row("a", ControlLevel::OrganizationDefault, 5, json!({"x": "org", "y": "org"})),
            row("b", ControlLevel::WorkflowDefault, 5, json!({"x": "wf"})),
            row("c", ControlLevel::StepOverride, 2, json!({"y": "step", "z": "step"})),
            row("d", ControlLevel::StepOverride, 2, json!({"z": "step-d"})),
        ];

        let expected = resolver.resolve(&step_id(), &rows, None);

        let mut reversed = rows.clone();
        reversed.reverse();
        assert_eq!(resolver.resolve(&step_id(), &reversed, None), expected);

        let rotated: Vec<_> = rows[2..].iter().chain(rows[..2].iter()).cloned().collect();
        assert_eq!(resolver.resolve(&step_id(), &rotated, None), expected);

        // priority 5 beats 2, level breaks the tie at 5, id breaks the tie at 2
        assert_eq!(
            Value::Object(expected),
            json!({"x": "wf", "y": "org", "z": "step-d"})
        );
    }

    #[test]
    fn test_priority_tie_goes_to_more_specific_level() {
        let resolver = ControlValueResolver::default();
        let rows = vec![
            row("z", ControlLevel::StepOverride, 0, json!({"subject": "step"})),
            row("a", ControlLevel::OrganizationDefault, 0, json!({"subject": "org"})),
        ];

        let result = resolver.resolve(&step_id(), &rows, None);

        assert_eq!(result["subject"], json!("step"));
    }

    #[test]
    fn test_lower_wins_order() {
        let resolver = ControlValueResolver::new(
            ResolverConfig::default().with_priority_order(PriorityOrder::LowerWins),
        );

        let result = resolver.resolve(&step_id(), &example_rows(), None);

        assert_eq!(Value::Object(result), json!({"subject": "A", "body": "X"}));
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let resolver = ControlValueResolver::default();
        let rows = example_rows();
        let snapshot = rows.clone();
        let overrides = override_subject("C");

        let first = resolver.resolve_with_sources(&step_id(), &rows, Some(&overrides));
        let second = resolver.resolve_with_sources(&step_id(), &rows, Some(&overrides));

        assert_eq!(first, second);
        assert_eq!(rows, snapshot);
    }

    #[test]
    fn test_sources_name_the_winning_row() {
        let resolver = ControlValueResolver::default();

        let result = resolver.resolve_with_sources(&step_id(), &example_rows(), None);

        assert_eq!(
            result.source_of("subject"),
            Some(&ControlSource::Persisted {
                id: ControlValuesId::new("b").unwrap(),
                level: ControlLevel::StepOverride,
                priority: 1,
            })
        );
        assert_eq!(result.len(), 2);
        assert_eq!(result.step_id, step_id());
    }

    #[test]
    fn test_priority_order_parse() {
        assert_eq!("higher-wins".parse::<PriorityOrder>().unwrap(), PriorityOrder::HigherWins);
        assert_eq!("lower-wins".parse::<PriorityOrder>().unwrap(), PriorityOrder::LowerWins);
        assert!("ascending".parse::<PriorityOrder>().is_err());
        assert_eq!(PriorityOrder::LowerWins.as_str(), "lower-wins");
    }
}
