//! Infrastructure layer - Storage backends, repositories and services

pub mod control_values;
pub mod logging;
pub mod services;
pub mod storage;
