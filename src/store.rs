//! Working geometry overrides held between gesture start and commit ack.
//!
//! During a gesture every pointer-move writes pixels here so the overlay
//! tracks the pointer without a round-trip to the external store. The entry
//! outlives the gesture when a commit fails, keeping the displayed position
//! where the user left it until the host retries.

use std::collections::HashMap;

use crate::overlay::OverlayId;

/// Partial pixel geometry: only the fields the gesture touched.
///
/// `top`/`left` are always written; `width`/`height` only by resize gestures.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorkingGeometry {
    pub top: f64,
    pub left: f64,
    pub width: Option<f64>,
    pub height: Option<f64>,
}

impl WorkingGeometry {
    pub const fn at(top: f64, left: f64) -> Self {
        Self {
            top,
            left,
            width: None,
            height: None,
        }
    }

    pub const fn sized(top: f64, left: f64, width: f64, height: f64) -> Self {
        Self {
            top,
            left,
            width: Some(width),
            height: Some(height),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct GeometryStore {
    entries: HashMap<OverlayId, WorkingGeometry>,
}

impl GeometryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, overlay: &OverlayId) -> Option<WorkingGeometry> {
        self.entries.get(overlay).copied()
    }

    /// Replaces the override for `overlay` with the fields in `geometry`.
    pub fn set(&mut self, overlay: OverlayId, geometry: WorkingGeometry) {
        self.entries.insert(overlay, geometry);
    }

    /// Drops the override; called once the external store acknowledged the
    /// commit (or the overlay itself is gone).
    pub fn clear(&mut self, overlay: &OverlayId) {
        self.entries.remove(overlay);
    }

    /// Drops overrides whose overlay no longer exists in the committed
    /// collection.
    pub fn retain_known<'a>(&mut self, known: impl Iterator<Item = &'a OverlayId>) {
        let known = known.cloned().collect::<std::collections::HashSet<_>>();
        self.entries.retain(|id, _| known.contains(id));
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
