use thiserror::Error;

use crate::overlay::OverlayId;

pub type GestureResult<T> = std::result::Result<T, GestureError>;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GestureError {
    /// A second pointer-down arrived while a gesture was running. The caller
    /// drops the new pointer-down; gestures are never queued.
    #[error("a gesture is already active for overlay {active}")]
    GestureInProgress { active: OverlayId },
}
