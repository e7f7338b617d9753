//! Committed overlay records as the engine sees them.
//!
//! The CRUD layer owns these; the engine only reads them and layers working
//! geometry on top during a gesture. Records arrive as loosely-typed JSON
//! (see [`record`]) and are converted once into this typed form.

mod record;

pub use record::{overlays_from_json, OverlayRecord};

use crate::geometry::{PxRect, SurfaceSize};
use crate::units::{Length, LengthUnit};

/// Square fallback applied to image overlays with no stored size.
const IMAGE_NATURAL_SIZE_PX: f64 = 100.0;

/// Font size assumed when a text overlay carries no usable `fontSize`.
const TEXT_FALLBACK_FONT_PX: f64 = 16.0;

/// Opaque identity assigned by the external store.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OverlayId(String);

impl OverlayId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for OverlayId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Position and size of an overlay, each axis in the unit its record used.
///
/// `width`/`height` stay `None` when the record never stored them; the
/// fallback comes from [`OverlayContent::natural_size`] at resolution time so
/// arithmetic always runs on a fully-populated rect.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geometry {
    pub top: Length,
    pub left: Length,
    pub width: Option<Length>,
    pub height: Option<Length>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextOverlay {
    pub text: String,
    pub font_size: Length,
    pub color: String,
    pub background_color: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImageOverlay {
    pub image_url: String,
    pub opacity: f64,
    pub border_radius: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum OverlayContent {
    Text(TextOverlay),
    Image(ImageOverlay),
}

impl OverlayContent {
    /// Size an overlay takes with no explicit width/height stored.
    ///
    /// Images default to a fixed square. Text sizes to content; without a
    /// layout pass available the engine estimates from glyph count, average
    /// glyph width and line height.
    pub fn natural_size(&self) -> (f64, f64) {
        match self {
            Self::Image(_) => (IMAGE_NATURAL_SIZE_PX, IMAGE_NATURAL_SIZE_PX),
            Self::Text(text) => estimated_text_size(text),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Overlay {
    pub id: OverlayId,
    pub geometry: Geometry,
    pub content: OverlayContent,
}

impl Overlay {
    /// Committed geometry resolved to a fully-populated pixel rect against
    /// the current surface size, defaults applied.
    pub fn resolved_rect(&self, surface: SurfaceSize) -> PxRect {
        let left = self.geometry.left.resolve(surface.width);
        let top = self.geometry.top.resolve(surface.height);
        let (natural_width, natural_height) = self.content.natural_size();
        let width = self
            .geometry
            .width
            .map(|length| length.resolve(surface.width))
            .unwrap_or(natural_width);
        let height = self
            .geometry
            .height
            .map(|length| length.resolve(surface.height))
            .unwrap_or(natural_height);
        PxRect::new(left, top, width, height)
    }
}

fn estimated_text_size(text: &TextOverlay) -> (f64, f64) {
    let font_px = match text.font_size.unit {
        LengthUnit::Px => text.font_size.magnitude.max(1.0),
        LengthUnit::Percent => TEXT_FALLBACK_FONT_PX,
    };
    let line_height = (font_px * 1.3).max(2.0);
    let glyph_width = (font_px * 0.62).max(1.0);

    let lines = if text.text.is_empty() {
        vec![""]
    } else {
        text.text.split('\n').collect::<Vec<_>>()
    };
    let width = lines
        .iter()
        .map(|line| line.chars().count() as f64 * glyph_width)
        .fold(0.0, f64::max)
        .max(8.0);
    let height = (lines.len() as f64 * line_height).max(font_px);
    (width, height)
}

#[cfg(test)]
pub(crate) fn text_overlay(id: &str, top: Length, left: Length) -> Overlay {
    Overlay {
        id: OverlayId::new(id),
        geometry: Geometry {
            top,
            left,
            width: None,
            height: None,
        },
        content: OverlayContent::Text(TextOverlay {
            text: "LIVE".to_string(),
            font_size: Length::px(16.0),
            color: "#ffffff".to_string(),
            background_color: "rgba(0,0,0,0.5)".to_string(),
        }),
    }
}

#[cfg(test)]
pub(crate) fn image_overlay(id: &str, geometry: Geometry) -> Overlay {
    Overlay {
        id: OverlayId::new(id),
        geometry,
        content: OverlayContent::Image(ImageOverlay {
            image_url: "https://example.com/logo.png".to_string(),
            opacity: 1.0,
            border_radius: "0px".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_geometry_resolves_against_surface_axes() {
        let overlay = text_overlay("a", Length::percent(10.0), Length::percent(10.0));
        let rect = overlay.resolved_rect(SurfaceSize::new(800.0, 600.0));
        assert_eq!(rect.left, 80.0);
        assert_eq!(rect.top, 60.0);
    }

    #[test]
    fn image_without_stored_size_gets_the_square_fallback() {
        let overlay = image_overlay(
            "logo",
            Geometry {
                top: Length::px(50.0),
                left: Length::px(50.0),
                width: None,
                height: None,
            },
        );
        let rect = overlay.resolved_rect(SurfaceSize::new(800.0, 600.0));
        assert_eq!(rect.width, 100.0);
        assert_eq!(rect.height, 100.0);
    }

    #[test]
    fn stored_size_wins_over_the_fallback() {
        let overlay = image_overlay(
            "logo",
            Geometry {
                top: Length::px(0.0),
                left: Length::px(0.0),
                width: Some(Length::percent(50.0)),
                height: Some(Length::px(90.0)),
            },
        );
        let rect = overlay.resolved_rect(SurfaceSize::new(800.0, 600.0));
        assert_eq!(rect.width, 400.0);
        assert_eq!(rect.height, 90.0);
    }

    #[test]
    fn text_estimate_tracks_content_and_line_count() {
        let short = TextOverlay {
            text: "Hi".to_string(),
            font_size: Length::px(16.0),
            color: String::new(),
            background_color: String::new(),
        };
        let long = TextOverlay {
            text: "Hello stream\nsecond line".to_string(),
            ..short.clone()
        };
        let (short_width, short_height) = estimated_text_size(&short);
        let (long_width, long_height) = estimated_text_size(&long);
        assert!(long_width > short_width);
        assert!(long_height > short_height);
        assert!(short_height >= 16.0);
    }

    #[test]
    fn empty_text_still_yields_a_grabbable_rect() {
        let empty = TextOverlay {
            text: String::new(),
            font_size: Length::px(16.0),
            color: String::new(),
            background_color: String::new(),
        };
        let (width, height) = estimated_text_size(&empty);
        assert!(width >= 8.0);
        assert!(height >= 16.0);
    }
}
