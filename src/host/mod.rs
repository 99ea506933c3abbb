//! # Host Framework Adapters
//!
//! Thin stand-ins for the home automation host the estimator lives in:
//!
//! - **State**: current entity states plus change notifications
//! - **Registry**: where sibling components register override controls

pub mod registry;
pub mod state;

pub use registry::{ControlRegistry, Platform};
pub use state::{
    parse_numeric, Attributes, EntityState, StateChanged, StateReader, StateStore,
    STATE_UNAVAILABLE, STATE_UNKNOWN,
};
