//! Jobs - one execution of a workflow step, fed into the pipeline by `AddJobCommand`

mod command;
mod entity;

pub use command::AddJobCommand;
pub use entity::{JobEntity, JobStatus};
