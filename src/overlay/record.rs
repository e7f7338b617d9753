//! Wire shape of overlay records as the CRUD layer serves them.
//!
//! Every field except `_id` is optional on the wire: legacy records predate
//! the `type` tag and image fields, and the store never rejects partial
//! documents. Conversion into [`Overlay`] resolves the kind and fills the
//! documented defaults exactly once, so nothing downstream has to re-check.

use serde::Deserialize;

use super::{Geometry, ImageOverlay, Overlay, OverlayContent, OverlayId, TextOverlay};
use crate::units::Length;

const DEFAULT_FONT_SIZE: &str = "16px";
const DEFAULT_TEXT_COLOR: &str = "#ffffff";
const DEFAULT_TEXT_BACKGROUND: &str = "rgba(0,0,0,0.5)";
const DEFAULT_IMAGE_OPACITY: f64 = 1.0;
const DEFAULT_IMAGE_BORDER_RADIUS: &str = "0px";

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayRecord {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub text: Option<String>,
    pub image_url: Option<String>,
    pub top: Option<String>,
    pub left: Option<String>,
    pub width: Option<String>,
    pub height: Option<String>,
    pub color: Option<String>,
    pub font_size: Option<String>,
    pub background_color: Option<String>,
    pub opacity: Option<f64>,
    pub border_radius: Option<String>,
}

impl OverlayRecord {
    /// Kind discrimination: the `type` tag wins; records written before the
    /// tag existed are images exactly when they carry an `imageUrl`.
    fn is_image(&self) -> bool {
        match self.kind.as_deref() {
            Some("image") => true,
            Some(_) => false,
            None => self.image_url.is_some(),
        }
    }
}

impl Overlay {
    pub fn from_record(record: &OverlayRecord) -> Self {
        let geometry = Geometry {
            top: length_or_zero(record.top.as_deref()),
            left: length_or_zero(record.left.as_deref()),
            width: record.width.as_deref().map(Length::parse_or_zero),
            height: record.height.as_deref().map(Length::parse_or_zero),
        };

        let content = if record.is_image() {
            OverlayContent::Image(ImageOverlay {
                image_url: record.image_url.clone().unwrap_or_default(),
                opacity: record.opacity.unwrap_or(DEFAULT_IMAGE_OPACITY),
                border_radius: record
                    .border_radius
                    .clone()
                    .unwrap_or_else(|| DEFAULT_IMAGE_BORDER_RADIUS.to_string()),
            })
        } else {
            OverlayContent::Text(TextOverlay {
                text: record.text.clone().unwrap_or_default(),
                font_size: Length::parse_or_zero(
                    record.font_size.as_deref().unwrap_or(DEFAULT_FONT_SIZE),
                ),
                color: record
                    .color
                    .clone()
                    .unwrap_or_else(|| DEFAULT_TEXT_COLOR.to_string()),
                background_color: record
                    .background_color
                    .clone()
                    .unwrap_or_else(|| DEFAULT_TEXT_BACKGROUND.to_string()),
            })
        };

        Self {
            id: OverlayId::new(record.id.clone()),
            geometry,
            content,
        }
    }
}

fn length_or_zero(raw: Option<&str>) -> Length {
    raw.map(Length::parse_or_zero).unwrap_or(Length::px(0.0))
}

#[derive(Debug, Deserialize)]
struct OverlayListing {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    data: Vec<OverlayRecord>,
}

/// Converts the CRUD layer's list response
/// (`{"success": true, "data": [...], "count": n}`) into typed overlays,
/// preserving arrival order.
pub fn overlays_from_json(raw: &str) -> serde_json::Result<Vec<Overlay>> {
    let listing: OverlayListing = serde_json::from_str(raw)?;
    if !listing.success {
        tracing::warn!(
            records = listing.data.len(),
            "overlay listing flagged unsuccessful; converting records anyway"
        );
    }
    Ok(listing.data.iter().map(Overlay::from_record).collect())
}
