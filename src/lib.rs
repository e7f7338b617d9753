//! Drag-and-resize positioning engine for overlays on a live video surface.
//!
//! Overlay records store geometry as CSS-style lengths (`"120px"`, `"10%"`)
//! so positions survive viewport changes; interaction happens in pixels.
//! This crate owns the conversion between the two, the single-gesture state
//! machine that turns pointer movement into geometry, and the working
//! overrides that keep dragging smooth until the external store acknowledges
//! a commit. Playback, persistence, and styling live in the host.

pub mod engine;
pub mod error;
pub mod geometry;
pub mod gesture;
pub mod logging;
pub mod overlay;
pub mod store;
pub mod units;

pub use engine::{
    CommitError, CommitSink, GeometryChange, OverlayEngine, PointerTarget, VideoSurface,
};
pub use error::{EngineError, EngineResult};
pub use gesture::ResizeHandle;
pub use overlay::{Overlay, OverlayId};
