//! Hover-suspension locomotion solver for dynamic rigid-body characters.
//!
//! Each fixed physics step runs the same pipeline:
//! tunneling guard, ground estimation, hover stabilization (or fallback gravity),
//! then ground or air acceleration. The physics engine is reached only through
//! the [`SpatialQuery`] and [`DynamicBody`] capabilities.

pub mod accelerator;
pub mod agent;
pub mod backend;
pub mod config;
pub mod error;
pub mod ground;
pub mod hover;
pub mod intent;
pub mod sensor;
pub mod tunneling;

#[cfg(test)]
pub(crate) mod testing;

pub use agent::*;
pub use backend::*;
pub use config::*;
pub use error::*;
pub use ground::{GroundSample, GroundState};
pub use intent::*;
pub use tunneling::TunnelingCorrection;
