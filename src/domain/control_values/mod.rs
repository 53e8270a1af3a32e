//! Persisted control values, layered per step by level and priority

mod entity;
mod level;
mod repository;

pub use entity::{ControlScope, ControlValuesEntity};
pub use level::ControlLevel;
pub use repository::ControlValuesRepository;

#[cfg(test)]
pub use repository::MockControlValuesRepository;
