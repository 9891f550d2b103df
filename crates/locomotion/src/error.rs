//! Setup-time failures. Per-step code never fails.

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum LocomotionError {
    #[error("invalid locomotion config: `{field}` {reason}")]
    InvalidConfig {
        field: &'static str,
        reason: &'static str,
    },
    #[error("rigid body handle does not refer to a live body")]
    MissingBody,
    #[error("rigid body has no collider to derive bounds from")]
    MissingCollider,
}

impl LocomotionError {
    pub(crate) fn invalid(field: &'static str, reason: &'static str) -> Self {
        Self::InvalidConfig { field, reason }
    }
}
