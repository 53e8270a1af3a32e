//! Workflow Controls
//!
//! Resolves the control values a workflow step executes with:
//! - Persisted layers (organization default, workflow default, step override)
//!   folded by priority
//! - Stateless per-job overrides that always win and are never stored
//! - Job intake through `AddJobCommand`, validated at the boundary

pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use domain::{ControlValueResolver, ControlValuesEntity, JobEntity};
use infrastructure::{
    control_values::StorageControlValuesRepository,
    services::{ControlValuesService, JobService, ResolutionService},
    storage::InMemoryStorage,
};

/// Services wired over one storage backend
#[derive(Debug, Clone)]
pub struct AppState {
    pub control_values: Arc<ControlValuesService>,
    pub resolution: Arc<ResolutionService>,
    pub jobs: Arc<JobService>,
}

/// Create the application state over in-memory storage
pub fn create_app_state(config: &AppConfig) -> AppState {
    let control_storage = Arc::new(InMemoryStorage::<ControlValuesEntity>::new());
    let job_storage = Arc::new(InMemoryStorage::<JobEntity>::new());

    let repository = Arc::new(StorageControlValuesRepository::new(control_storage));
    let resolver = ControlValueResolver::new(config.resolver_config());

    let control_values = Arc::new(ControlValuesService::new(repository.clone()));
    let resolution = Arc::new(ResolutionService::new(repository, resolver));
    let jobs = Arc::new(JobService::new(job_storage, resolution.clone()));

    AppState {
        control_values,
        resolution,
        jobs,
    }
}
