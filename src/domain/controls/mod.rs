//! Control values domain
//!
//! A workflow step executes with a set of named control values (email
//! subject, SMS body, digest window, ...). Values come from persisted layers:
//! - organization default
//! - workflow default
//! - step override
//!
//! plus, for stateless triggers, per-job overrides that always win and are
//! never stored.

mod error;
mod resolved;
mod resolver;
mod stateless;

pub use error::ControlsError;
pub use resolved::{ControlSource, ResolvedControls};
pub use resolver::{ControlValueResolver, PriorityOrder, ResolverConfig};
pub use stateless::{
    validate_controls, validate_stateless_controls, StatelessControls, MAX_CONTROL_ID_LENGTH,
};

/// Mapping from control id to an arbitrary JSON value
pub type Controls = serde_json::Map<String, serde_json::Value>;
