//! The single-gesture state machine mapping pointer movement to geometry.
//!
//! One machine instance exists per engine; at most one gesture is active at
//! any time. Pointer coordinates and the captured starting rect are both in
//! surface-relative pixels — unit conversion happens before entry (resolving
//! the committed geometry) and after exit (serializing the commit).

use super::error::{GestureError, GestureResult};
use super::handle::ResizeHandle;
use crate::geometry::{PxPoint, PxRect, SurfaceSize};
use crate::overlay::OverlayId;
use crate::store::WorkingGeometry;

/// Drag keeps at least this much of the overlay inside the container.
/// The window is fixed regardless of the overlay's own size, so an overlay
/// wider than this can still hang past the right/bottom edge while its
/// origin is "in bounds".
pub const DRAG_KEEP_VISIBLE_WIDTH: f64 = 50.0;
pub const DRAG_KEEP_VISIBLE_HEIGHT: f64 = 30.0;

/// Smallest size a resize can shrink an overlay to.
pub const RESIZE_MIN_WIDTH: f64 = 30.0;
pub const RESIZE_MIN_HEIGHT: f64 = 20.0;

/// Everything captured at pointer-down: where the pointer was and where the
/// overlay was, both in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureStart {
    pub pointer: PxPoint,
    pub rect: PxRect,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GestureState {
    Idle,
    Dragging {
        overlay: OverlayId,
        start: GestureStart,
        last_pointer: PxPoint,
    },
    Resizing {
        overlay: OverlayId,
        handle: ResizeHandle,
        start: GestureStart,
        last_pointer: PxPoint,
    },
}

/// Summary of a gesture that just ended, for the commit decision.
#[derive(Debug, Clone, PartialEq)]
pub struct FinishedGesture {
    pub overlay: OverlayId,
    /// Net pointer movement was non-zero. A press-and-release in place
    /// reports `false` and must not produce a commit.
    pub moved: bool,
    /// The gesture was a resize, so width/height were touched.
    pub resized: bool,
}

#[derive(Debug)]
pub struct GestureMachine {
    state: GestureState,
}

impl Default for GestureMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl GestureMachine {
    pub fn new() -> Self {
        Self {
            state: GestureState::Idle,
        }
    }

    pub fn state(&self) -> &GestureState {
        &self.state
    }

    pub fn is_active(&self) -> bool {
        !matches!(self.state, GestureState::Idle)
    }

    pub fn active_overlay(&self) -> Option<&OverlayId> {
        match &self.state {
            GestureState::Idle => None,
            GestureState::Dragging { overlay, .. } => Some(overlay),
            GestureState::Resizing { overlay, .. } => Some(overlay),
        }
    }

    pub fn begin_drag(
        &mut self,
        overlay: OverlayId,
        pointer: PxPoint,
        rect: PxRect,
    ) -> GestureResult<()> {
        self.ensure_idle()?;
        tracing::debug!(%overlay, ?pointer, ?rect, "begin drag gesture");
        self.state = GestureState::Dragging {
            overlay,
            start: GestureStart { pointer, rect },
            last_pointer: pointer,
        };
        Ok(())
    }

    pub fn begin_resize(
        &mut self,
        overlay: OverlayId,
        handle: ResizeHandle,
        pointer: PxPoint,
        rect: PxRect,
    ) -> GestureResult<()> {
        self.ensure_idle()?;
        tracing::debug!(
            %overlay,
            handle = handle.css_class(),
            ?pointer,
            ?rect,
            "begin resize gesture"
        );
        self.state = GestureState::Resizing {
            overlay,
            handle,
            start: GestureStart { pointer, rect },
            last_pointer: pointer,
        };
        Ok(())
    }

    /// Advances the active gesture to the new pointer position and returns
    /// the pixel geometry the overlay should now display. `None` while idle.
    pub fn pointer_move(
        &mut self,
        pointer: PxPoint,
        surface: SurfaceSize,
    ) -> Option<WorkingGeometry> {
        match &mut self.state {
            GestureState::Idle => None,
            GestureState::Dragging {
                start, last_pointer, ..
            } => {
                *last_pointer = pointer;
                Some(drag_geometry(*start, pointer, surface))
            }
            GestureState::Resizing {
                start,
                handle,
                last_pointer,
                ..
            } => {
                *last_pointer = pointer;
                Some(resize_geometry(*start, *handle, pointer, surface))
            }
        }
    }

    /// Ends the active gesture (pointer-up) and reports what happened.
    pub fn finish(&mut self) -> Option<FinishedGesture> {
        let ended = std::mem::replace(&mut self.state, GestureState::Idle);
        let finished = match ended {
            GestureState::Idle => return None,
            GestureState::Dragging {
                overlay,
                start,
                last_pointer,
            } => FinishedGesture {
                overlay,
                moved: last_pointer != start.pointer,
                resized: false,
            },
            GestureState::Resizing {
                overlay,
                start,
                last_pointer,
                ..
            } => FinishedGesture {
                overlay,
                moved: last_pointer != start.pointer,
                resized: true,
            },
        };
        tracing::debug!(
            overlay = %finished.overlay,
            moved = finished.moved,
            resized = finished.resized,
            "gesture finished"
        );
        Some(finished)
    }

    /// Drops the active gesture without a commit decision: pointer-cancel,
    /// surface teardown, or the overlay vanishing mid-gesture.
    pub fn cancel(&mut self) -> Option<OverlayId> {
        let ended = std::mem::replace(&mut self.state, GestureState::Idle);
        let overlay = match ended {
            GestureState::Idle => return None,
            GestureState::Dragging { overlay, .. } => overlay,
            GestureState::Resizing { overlay, .. } => overlay,
        };
        tracing::debug!(%overlay, "gesture cancelled");
        Some(overlay)
    }

    fn ensure_idle(&self) -> GestureResult<()> {
        match self.active_overlay() {
            None => Ok(()),
            Some(active) => Err(GestureError::GestureInProgress {
                active: active.clone(),
            }),
        }
    }
}

fn drag_geometry(start: GestureStart, pointer: PxPoint, surface: SurfaceSize) -> WorkingGeometry {
    let delta_x = pointer.x - start.pointer.x;
    let delta_y = pointer.y - start.pointer.y;
    let max_left = (surface.width - DRAG_KEEP_VISIBLE_WIDTH).max(0.0);
    let max_top = (surface.height - DRAG_KEEP_VISIBLE_HEIGHT).max(0.0);
    WorkingGeometry::at(
        (start.rect.top + delta_y).clamp(0.0, max_top),
        (start.rect.left + delta_x).clamp(0.0, max_left),
    )
}

fn resize_geometry(
    start: GestureStart,
    handle: ResizeHandle,
    pointer: PxPoint,
    surface: SurfaceSize,
) -> WorkingGeometry {
    let delta_x = pointer.x - start.pointer.x;
    let delta_y = pointer.y - start.pointer.y;

    let mut left = start.rect.left;
    let mut top = start.rect.top;
    let mut width = start.rect.width;
    let mut height = start.rect.height;

    if handle.moves_right_edge() {
        width = (start.rect.width + delta_x).max(RESIZE_MIN_WIDTH);
    }
    if handle.moves_left_edge() {
        // Growing from the west keeps the right edge fixed: whatever the
        // width gains, the origin loses.
        width = (start.rect.width - delta_x).max(RESIZE_MIN_WIDTH);
        left = start.rect.left + (start.rect.width - width);
    }
    if handle.moves_bottom_edge() {
        height = (start.rect.height + delta_y).max(RESIZE_MIN_HEIGHT);
    }
    if handle.moves_top_edge() {
        height = (start.rect.height - delta_y).max(RESIZE_MIN_HEIGHT);
        top = start.rect.top + (start.rect.height - height);
    }

    // The overlay must not extend past the container's right/bottom edge
    // from its (possibly shifted) origin.
    width = width.min((surface.width - left).max(0.0));
    height = height.min((surface.height - top).max(0.0));

    WorkingGeometry::sized(top, left, width, height)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SURFACE: SurfaceSize = SurfaceSize::new(800.0, 600.0);

    fn machine() -> GestureMachine {
        GestureMachine::new()
    }

    fn id(raw: &str) -> OverlayId {
        OverlayId::new(raw)
    }

    #[test]
    fn drag_follows_the_pointer_delta() {
        // 10% / 10% of an 800x600 surface.
        let mut gestures = machine();
        gestures
            .begin_drag(id("a"), PxPoint::new(100.0, 100.0), PxRect::new(80.0, 60.0, 120.0, 40.0))
            .expect("drag should begin from idle");

        let update = gestures
            .pointer_move(PxPoint::new(140.0, 120.0), SURFACE)
            .expect("active gesture should produce geometry");
        assert_eq!(update.left, 120.0);
        assert_eq!(update.top, 80.0);
        assert_eq!(update.width, None);
        assert_eq!(update.height, None);
    }

    #[test]
    fn drag_clamps_no_matter_how_far_the_pointer_travels() {
        let mut gestures = machine();
        gestures
            .begin_drag(id("a"), PxPoint::new(100.0, 100.0), PxRect::new(80.0, 60.0, 120.0, 40.0))
            .expect("drag should begin from idle");

        let update = gestures
            .pointer_move(PxPoint::new(-10_000.0, -10_000.0), SURFACE)
            .expect("active gesture should produce geometry");
        assert_eq!(update.left, 0.0);
        assert_eq!(update.top, 0.0);

        let update = gestures
            .pointer_move(PxPoint::new(10_000.0, 10_000.0), SURFACE)
            .expect("active gesture should produce geometry");
        assert_eq!(update.left, SURFACE.width - DRAG_KEEP_VISIBLE_WIDTH);
        assert_eq!(update.top, SURFACE.height - DRAG_KEEP_VISIBLE_HEIGHT);
    }

    #[test]
    fn drag_window_collapses_to_origin_on_a_tiny_surface() {
        let mut gestures = machine();
        gestures
            .begin_drag(id("a"), PxPoint::new(5.0, 5.0), PxRect::new(0.0, 0.0, 100.0, 100.0))
            .expect("drag should begin from idle");

        let update = gestures
            .pointer_move(PxPoint::new(50.0, 50.0), SurfaceSize::new(40.0, 20.0))
            .expect("active gesture should produce geometry");
        assert_eq!(update.left, 0.0);
        assert_eq!(update.top, 0.0);
    }

    #[test]
    fn south_east_resize_grows_without_moving_the_origin() {
        let mut gestures = machine();
        gestures
            .begin_resize(
                id("logo"),
                ResizeHandle::SouthEast,
                PxPoint::new(150.0, 150.0),
                PxRect::new(50.0, 50.0, 100.0, 100.0),
            )
            .expect("resize should begin from idle");

        let update = gestures
            .pointer_move(PxPoint::new(180.0, 140.0), SURFACE)
            .expect("active gesture should produce geometry");
        assert_eq!(update.left, 50.0);
        assert_eq!(update.top, 50.0);
        assert_eq!(update.width, Some(130.0));
        assert_eq!(update.height, Some(90.0));
    }

    #[test]
    fn west_resize_keeps_the_right_edge_fixed_until_the_floor() {
        let start_rect = PxRect::new(200.0, 100.0, 120.0, 60.0);
        let right_edge = start_rect.right();
        let mut gestures = machine();
        gestures
            .begin_resize(id("a"), ResizeHandle::West, PxPoint::new(200.0, 130.0), start_rect)
            .expect("resize should begin from idle");

        for delta in [-40.0, -10.0, 0.0, 25.0, 60.0] {
            let update = gestures
                .pointer_move(PxPoint::new(200.0 + delta, 130.0), SURFACE)
                .expect("active gesture should produce geometry");
            let width = update.width.expect("resize should set width");
            assert!(width >= RESIZE_MIN_WIDTH);
            assert_eq!(
                update.left + width,
                right_edge,
                "right edge drifted for delta {delta}"
            );
        }

        // Past the floor the width pins at the minimum and the origin stops.
        let update = gestures
            .pointer_move(PxPoint::new(200.0 + 500.0, 130.0), SURFACE)
            .expect("active gesture should produce geometry");
        assert_eq!(update.width, Some(RESIZE_MIN_WIDTH));
        assert_eq!(update.left, right_edge - RESIZE_MIN_WIDTH);
    }

    #[test]
    fn north_resize_floors_height_and_pins_the_bottom_edge() {
        let start_rect = PxRect::new(100.0, 200.0, 80.0, 50.0);
        let bottom_edge = start_rect.bottom();
        let mut gestures = machine();
        gestures
            .begin_resize(id("a"), ResizeHandle::North, PxPoint::new(140.0, 200.0), start_rect)
            .expect("resize should begin from idle");

        let update = gestures
            .pointer_move(PxPoint::new(140.0, 200.0 + 400.0), SURFACE)
            .expect("active gesture should produce geometry");
        assert_eq!(update.height, Some(RESIZE_MIN_HEIGHT));
        assert_eq!(update.top, bottom_edge - RESIZE_MIN_HEIGHT);
        assert_eq!(update.width, Some(80.0));
        assert_eq!(update.left, 100.0);
    }

    #[test]
    fn resize_never_extends_past_the_container_edges() {
        let mut gestures = machine();
        gestures
            .begin_resize(
                id("a"),
                ResizeHandle::SouthEast,
                PxPoint::new(700.0, 500.0),
                PxRect::new(600.0, 400.0, 100.0, 100.0),
            )
            .expect("resize should begin from idle");

        let update = gestures
            .pointer_move(PxPoint::new(2_000.0, 2_000.0), SURFACE)
            .expect("active gesture should produce geometry");
        assert_eq!(update.width, Some(SURFACE.width - 600.0));
        assert_eq!(update.height, Some(SURFACE.height - 400.0));
    }

    #[test]
    fn corner_handles_compose_both_axis_rules_independently() {
        let start_rect = PxRect::new(200.0, 200.0, 100.0, 80.0);
        let mut gestures = machine();
        gestures
            .begin_resize(
                id("a"),
                ResizeHandle::NorthWest,
                PxPoint::new(200.0, 200.0),
                start_rect,
            )
            .expect("resize should begin from idle");

        let update = gestures
            .pointer_move(PxPoint::new(180.0, 190.0), SURFACE)
            .expect("active gesture should produce geometry");
        assert_eq!(update.width, Some(120.0));
        assert_eq!(update.left, 180.0);
        assert_eq!(update.height, Some(90.0));
        assert_eq!(update.top, 190.0);
    }

    #[test]
    fn pointer_down_while_active_is_rejected_and_state_kept() {
        let mut gestures = machine();
        gestures
            .begin_drag(id("a"), PxPoint::new(10.0, 10.0), PxRect::new(0.0, 0.0, 100.0, 40.0))
            .expect("drag should begin from idle");

        let err = gestures
            .begin_drag(id("b"), PxPoint::new(20.0, 20.0), PxRect::new(5.0, 5.0, 100.0, 40.0))
            .expect_err("second pointer-down should be rejected");
        assert_eq!(err, GestureError::GestureInProgress { active: id("a") });
        assert_eq!(gestures.active_overlay(), Some(&id("a")));

        let err = gestures
            .begin_resize(
                id("b"),
                ResizeHandle::South,
                PxPoint::new(20.0, 20.0),
                PxRect::new(5.0, 5.0, 100.0, 40.0),
            )
            .expect_err("resize during drag should be rejected");
        assert!(matches!(err, GestureError::GestureInProgress { .. }));
    }

    #[test]
    fn finish_reports_zero_net_movement_as_not_moved() {
        let mut gestures = machine();
        gestures
            .begin_drag(id("a"), PxPoint::new(10.0, 10.0), PxRect::new(0.0, 0.0, 100.0, 40.0))
            .expect("drag should begin from idle");

        // Wander away and come back to the exact start point.
        gestures.pointer_move(PxPoint::new(50.0, 50.0), SURFACE);
        gestures.pointer_move(PxPoint::new(10.0, 10.0), SURFACE);

        let finished = gestures.finish().expect("active gesture should finish");
        assert!(!finished.moved);
        assert!(!finished.resized);
        assert!(!gestures.is_active());
    }

    #[test]
    fn finish_after_movement_reports_moved_and_resized() {
        let mut gestures = machine();
        gestures
            .begin_resize(
                id("a"),
                ResizeHandle::East,
                PxPoint::new(10.0, 10.0),
                PxRect::new(0.0, 0.0, 100.0, 40.0),
            )
            .expect("resize should begin from idle");
        gestures.pointer_move(PxPoint::new(40.0, 10.0), SURFACE);

        let finished = gestures.finish().expect("active gesture should finish");
        assert!(finished.moved);
        assert!(finished.resized);
    }

    #[test]
    fn finish_and_cancel_while_idle_are_no_ops() {
        let mut gestures = machine();
        assert_eq!(gestures.finish(), None);
        assert_eq!(gestures.cancel(), None);
        assert_eq!(gestures.pointer_move(PxPoint::new(1.0, 1.0), SURFACE), None);
    }

    #[test]
    fn cancel_returns_the_abandoned_overlay() {
        let mut gestures = machine();
        gestures
            .begin_drag(id("a"), PxPoint::new(10.0, 10.0), PxRect::new(0.0, 0.0, 100.0, 40.0))
            .expect("drag should begin from idle");
        gestures.pointer_move(PxPoint::new(60.0, 60.0), SURFACE);

        assert_eq!(gestures.cancel(), Some(id("a")));
        assert!(!gestures.is_active());
    }
}
