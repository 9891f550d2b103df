//! Core engine types shared by the locomotion solver, the physics backend and the sandbox.
//!
//! This crate provides the foundational types used across all systems:
//! - Transform (pose) and world-space bounds
//! - Fixed-timestep time management
//! - Tag components for the ECS

pub mod components;
pub mod time;
pub mod transform;

pub use components::*;
pub use time::*;
pub use transform::*;

// Re-export commonly used types
pub use glam::{Quat, Vec3};
pub use hecs::{Entity, World};
