//! The bridge between pointer events, working geometry, and the external
//! overlay store.
//!
//! [`OverlayEngine`] owns the gesture machine and the working-geometry
//! overrides. Hosts feed it pointer events plus the committed overlay
//! collection, render from [`OverlayEngine::display_rect`], and receive the
//! final geometry of each completed gesture through a [`CommitSink`].

use thiserror::Error;

use crate::error::EngineResult;
use crate::geometry::{PxPoint, PxRect, SurfaceSize};
use crate::gesture::{GestureMachine, ResizeHandle};
use crate::overlay::{Overlay, OverlayId};
use crate::store::{GeometryStore, WorkingGeometry};
use crate::units::Length;

/// The live rendering surface the overlays are positioned against.
///
/// `size` reports `(0, 0)` while the surface is unmounted and never fails.
/// `track_pointer`/`untrack_pointer` scope the surface-wide pointer-move and
/// pointer-up listeners: the engine acquires tracking when a gesture opens
/// and releases it on every path back to idle, so both must be idempotent.
pub trait VideoSurface {
    fn size(&self) -> SurfaceSize;
    fn track_pointer(&mut self);
    fn untrack_pointer(&mut self);
}

/// Receiver for finalized geometry, typically the CRUD layer's update call.
pub trait CommitSink {
    /// Invoked exactly once per completed gesture with net movement. The
    /// engine does not retry on failure; it keeps the working override in
    /// place and leaves retry/backoff to the host.
    fn overlay_geometry_changed(
        &mut self,
        overlay: &OverlayId,
        change: &GeometryChange,
    ) -> Result<(), CommitError>;
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("geometry commit rejected: {reason}")]
pub struct CommitError {
    pub reason: String,
}

impl CommitError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Final geometry of a gesture, each field in the unit convention the
/// committed record already used for that field so the store can persist the
/// values as-is. `width`/`height` are present only after a resize.
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryChange {
    pub top: Length,
    pub left: Length,
    pub width: Option<Length>,
    pub height: Option<Length>,
}

/// What the pointer went down on.
#[derive(Debug, Clone, PartialEq)]
pub enum PointerTarget {
    /// The overlay body: starts a drag.
    Body(OverlayId),
    /// One of the eight resize grips: starts a resize.
    Handle(OverlayId, ResizeHandle),
}

#[derive(Debug, Default)]
pub struct OverlayEngine {
    gestures: GestureMachine,
    store: GeometryStore,
}

impl OverlayEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_manipulating(&self) -> bool {
        self.gestures.is_active()
    }

    pub fn manipulated_overlay(&self) -> Option<&OverlayId> {
        self.gestures.active_overlay()
    }

    /// Geometry an overlay should render at right now: the working override
    /// while one exists, the committed record otherwise.
    pub fn display_rect(&self, overlay: &Overlay, surface: SurfaceSize) -> PxRect {
        let committed = overlay.resolved_rect(surface);
        match self.store.get(&overlay.id) {
            None => committed,
            Some(working) => PxRect::new(
                working.left,
                working.top,
                working.width.unwrap_or(committed.width),
                working.height.unwrap_or(committed.height),
            ),
        }
    }

    /// Opens a gesture for the pressed target. Returns whether a gesture
    /// started; a pointer-down while another gesture is active, or on an
    /// overlay that no longer exists, is dropped.
    pub fn pointer_down(
        &mut self,
        overlays: &[Overlay],
        target: PointerTarget,
        pointer: PxPoint,
        surface: &mut impl VideoSurface,
    ) -> bool {
        let (overlay_id, handle) = match target {
            PointerTarget::Body(id) => (id, None),
            PointerTarget::Handle(id, handle) => (id, Some(handle)),
        };
        let Some(overlay) = find_overlay(overlays, &overlay_id) else {
            tracing::warn!(overlay = %overlay_id, "pointer-down on unknown overlay dropped");
            return false;
        };

        let rect = self.display_rect(overlay, surface.size());
        let opened = match handle {
            None => self.gestures.begin_drag(overlay_id, pointer, rect),
            Some(handle) => self.gestures.begin_resize(overlay_id, handle, pointer, rect),
        };
        match opened {
            Ok(()) => {
                surface.track_pointer();
                true
            }
            Err(err) => {
                tracing::debug!(%err, "pointer-down dropped");
                false
            }
        }
    }

    /// Advances the active gesture. Abandons it when the overlay under
    /// manipulation was deleted by the external store mid-gesture.
    pub fn pointer_move(
        &mut self,
        overlays: &[Overlay],
        pointer: PxPoint,
        surface: &mut impl VideoSurface,
    ) {
        let Some(active) = self.gestures.active_overlay().cloned() else {
            return;
        };
        if find_overlay(overlays, &active).is_none() {
            tracing::warn!(overlay = %active, "overlay deleted mid-gesture; abandoning");
            self.abandon(surface);
            return;
        }
        if let Some(update) = self.gestures.pointer_move(pointer, surface.size()) {
            self.store.set(active, update);
        }
    }

    /// Closes the active gesture (pointer-up) and commits its final geometry
    /// when the pointer actually moved.
    ///
    /// On commit failure the working override stays so the overlay holds its
    /// on-screen position, and the error is handed to the caller.
    pub fn pointer_up(
        &mut self,
        overlays: &[Overlay],
        surface: &mut impl VideoSurface,
        sink: &mut impl CommitSink,
    ) -> EngineResult<Option<GeometryChange>> {
        surface.untrack_pointer();
        let Some(finished) = self.gestures.finish() else {
            return Ok(None);
        };
        if !finished.moved {
            self.store.clear(&finished.overlay);
            return Ok(None);
        }
        let Some(overlay) = find_overlay(overlays, &finished.overlay) else {
            tracing::warn!(
                overlay = %finished.overlay,
                "gesture target deleted before release; nothing to commit"
            );
            self.store.clear(&finished.overlay);
            return Ok(None);
        };
        let Some(working) = self.store.get(&finished.overlay) else {
            return Ok(None);
        };

        let change = geometry_change(overlay, working, surface.size());
        match sink.overlay_geometry_changed(&finished.overlay, &change) {
            Ok(()) => {
                self.store.clear(&finished.overlay);
                Ok(Some(change))
            }
            Err(err) => {
                tracing::warn!(
                    overlay = %finished.overlay,
                    %err,
                    "geometry commit failed; keeping working override"
                );
                Err(err.into())
            }
        }
    }

    /// External teardown (pointer-cancel, surface unmount, overlay list
    /// cleared): forces idle and releases pointer tracking, committing
    /// nothing.
    pub fn cancel(&mut self, surface: &mut impl VideoSurface) {
        if let Some(overlay) = self.gestures.cancel() {
            self.store.clear(&overlay);
        }
        surface.untrack_pointer();
    }

    /// Reconciles engine state after the committed collection changed:
    /// abandons a gesture whose overlay vanished and prunes stale overrides.
    pub fn sync_overlays(&mut self, overlays: &[Overlay], surface: &mut impl VideoSurface) {
        let active_vanished = self
            .gestures
            .active_overlay()
            .is_some_and(|active| find_overlay(overlays, active).is_none());
        if active_vanished {
            tracing::warn!("overlay deleted mid-gesture; abandoning");
            self.abandon(surface);
        }
        self.store.retain_known(overlays.iter().map(|overlay| &overlay.id));
    }

    fn abandon(&mut self, surface: &mut impl VideoSurface) {
        if let Some(overlay) = self.gestures.cancel() {
            self.store.clear(&overlay);
        }
        surface.untrack_pointer();
    }
}

fn find_overlay<'a>(overlays: &'a [Overlay], id: &OverlayId) -> Option<&'a Overlay> {
    overlays.iter().find(|overlay| &overlay.id == id)
}

/// Builds the commit payload: clamps the final rect to the committed-geometry
/// invariant (non-negative origin, size within the container) and serializes
/// each field in the unit the record already uses.
fn geometry_change(
    overlay: &Overlay,
    working: WorkingGeometry,
    surface: SurfaceSize,
) -> GeometryChange {
    let top = working.top.max(0.0);
    let left = working.left.max(0.0);
    let width = working.width.map(|width| cap_to_axis(width, surface.width));
    let height = working.height.map(|height| cap_to_axis(height, surface.height));

    let geometry = &overlay.geometry;
    GeometryChange {
        top: length_in_unit_of(geometry.top.is_percent(), top, surface.height),
        left: length_in_unit_of(geometry.left.is_percent(), left, surface.width),
        width: width.map(|width| {
            length_in_unit_of(
                geometry.width.is_some_and(Length::is_percent),
                width,
                surface.width,
            )
        }),
        height: height.map(|height| {
            length_in_unit_of(
                geometry.height.is_some_and(Length::is_percent),
                height,
                surface.height,
            )
        }),
    }
}

fn cap_to_axis(value: f64, axis: f64) -> f64 {
    if axis > 0.0 {
        value.min(axis)
    } else {
        value
    }
}

fn length_in_unit_of(percent: bool, pixels: f64, axis: f64) -> Length {
    if percent {
        Length::to_percent(pixels, axis)
    } else {
        Length::px(pixels)
    }
}
