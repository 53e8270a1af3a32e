//! Domain layer - Core entities, resolution logic and persistence seams

pub mod control_values;
pub mod controls;
pub mod error;
pub mod ids;
pub mod job;
pub mod storage;

pub use control_values::{ControlLevel, ControlScope, ControlValuesEntity, ControlValuesRepository};
pub use controls::{
    ControlSource, ControlValueResolver, Controls, ControlsError, PriorityOrder, ResolvedControls,
    ResolverConfig, StatelessControls,
};
pub use error::DomainError;
pub use ids::{ControlValuesId, EnvironmentId, JobId, OrganizationId, StepId, WorkflowId};
pub use job::{AddJobCommand, JobEntity, JobStatus};
pub use storage::{Storage, StorageEntity, StorageKey};
