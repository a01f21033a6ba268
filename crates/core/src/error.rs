//! Error types for site layout operations.
//!
//! Every variant is recoverable: a rejected operation leaves the session
//! exactly as it was before the call.

use crate::id::ObjectId;
use thiserror::Error;

/// Errors and placement rejections produced by the layout engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// The candidate footprint leaves the grid.
    #[error("footprint at ({x}, {y}) sized {width}x{height} leaves the grid")]
    OutOfBounds {
        x: i32,
        y: i32,
        width: u32,
        height: u32,
    },

    /// The candidate footprint is not fully inside the enabled restriction zone.
    #[error("footprint must lie entirely inside the active zone")]
    OutsideActiveZone,

    /// The candidate's clearance area intersects an existing object's clearance area.
    #[error("too close to object {0}")]
    TooCloseTo(ObjectId),

    /// Restriction zone parameters are unusable.
    #[error("invalid zone shape: {0}")]
    InvalidZoneShape(String),

    /// A precondition on the inputs failed (zero footprint, NaN coordinate, ...).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// An entity referenced by id does not exist in the session.
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: u64 },

    /// Session state could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl Error {
    /// Returns true for the rejections a placement check can produce.
    pub fn is_placement_rejection(&self) -> bool {
        matches!(
            self,
            Self::OutOfBounds { .. } | Self::OutsideActiveZone | Self::TooCloseTo(_)
        )
    }
}

/// Result alias used throughout the engine.
pub type Result<T> = std::result::Result<T, Error>;

/// Outcome of a placement check: `Ok(())` or the first rejection reason.
pub type ValidationResult = Result<()>;
