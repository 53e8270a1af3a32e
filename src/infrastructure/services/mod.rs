//! Infrastructure services

mod control_values_service;
mod job_service;
mod resolution_service;

pub use control_values_service::{ControlValuesService, UpsertControlValuesRequest};
pub use job_service::{JobService, PreparedJob};
pub use resolution_service::ResolutionService;
