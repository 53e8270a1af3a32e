//! Resolution service - fetches persisted layers and resolves step controls

use std::collections::HashSet;
use std::sync::Arc;

use futures::future::try_join_all;
use tracing::{debug, warn};

use crate::domain::{
    ControlLevel, ControlScope, ControlValueResolver, ControlValuesEntity,
    ControlValuesRepository, DomainError, ResolvedControls, StatelessControls, StepId,
};

/// Resolves the effective controls of workflow steps
pub struct ResolutionService {
    repository: Arc<dyn ControlValuesRepository>,
    resolver: ControlValueResolver,
}

impl std::fmt::Debug for ResolutionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolutionService")
            .field("resolver", &self.resolver)
            .finish()
    }
}

impl ResolutionService {
    pub fn new(repository: Arc<dyn ControlValuesRepository>, resolver: ControlValueResolver) -> Self {
        Self {
            repository,
            resolver,
        }
    }

    /// Effective controls of the step named by `scope`
    pub async fn resolve_step(
        &self,
        scope: &ControlScope,
        overrides: Option<&StatelessControls>,
    ) -> Result<ResolvedControls, DomainError> {
        let rows = self.repository.find_for_step(scope).await?;
        Ok(self.resolve_rows(scope, &rows, overrides))
    }

    /// Effective controls of several steps of one workflow
    ///
    /// Rows are fetched concurrently; results follow the order of `step_ids`.
    pub async fn resolve_steps(
        &self,
        base: &ControlScope,
        step_ids: &[StepId],
        overrides: Option<&StatelessControls>,
    ) -> Result<Vec<ResolvedControls>, DomainError> {
        let mut seen = HashSet::new();
        if let Some(duplicate) = step_ids.iter().find(|id| !seen.insert(*id)) {
            return Err(DomainError::validation(format!(
                "Duplicate step id: '{}'",
                duplicate
            )));
        }

        let scopes: Vec<ControlScope> = step_ids.iter().map(|id| base.for_step(id.clone())).collect();
        let fetched = try_join_all(
            scopes
                .iter()
                .map(|scope| self.repository.find_for_step(scope)),
        )
        .await?;

        Ok(scopes
            .iter()
            .zip(fetched)
            .map(|(scope, rows)| self.resolve_rows(scope, &rows, overrides))
            .collect())
    }

    fn resolve_rows(
        &self,
        scope: &ControlScope,
        rows: &[ControlValuesEntity],
        overrides: Option<&StatelessControls>,
    ) -> ResolvedControls {
        warn_on_shared_levels(scope, rows);

        let resolved = self
            .resolver
            .resolve_with_sources(&scope.step_id, rows, overrides);

        debug!(
            scope = %scope,
            rows = rows.len(),
            controls = resolved.len(),
            stateless = overrides.is_some_and(|o| o.for_step(&scope.step_id).is_some()),
            "Resolved step controls"
        );

        resolved
    }
}

fn warn_on_shared_levels(scope: &ControlScope, rows: &[ControlValuesEntity]) {
    let mut levels: HashSet<ControlLevel> = HashSet::new();

    for row in rows {
        if !levels.insert(row.level()) {
            warn!(
                scope = %scope,
                level = %row.level(),
                "Multiple control-values rows share a level"
            );
        }
    }
}
