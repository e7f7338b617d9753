//! Typed CSS-style lengths and the pixel/percent conversion rules.
//!
//! Overlay records store geometry as strings (`"120px"`, `"10%"`). Those are
//! parsed once at the boundary into [`Length`] values; all arithmetic happens
//! on the typed form and only [`Length::to_string`] goes back to the wire
//! convention.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

pub type UnitResult<T> = std::result::Result<T, UnitError>;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UnitError {
    #[error("unrecognized length value: {0:?}")]
    InvalidUnit(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthUnit {
    Px,
    Percent,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Length {
    pub magnitude: f64,
    pub unit: LengthUnit,
}

impl Length {
    pub const fn px(magnitude: f64) -> Self {
        Self {
            magnitude,
            unit: LengthUnit::Px,
        }
    }

    pub const fn percent(magnitude: f64) -> Self {
        Self {
            magnitude,
            unit: LengthUnit::Percent,
        }
    }

    /// Parses a length, falling back to `0px` when the value is malformed.
    ///
    /// A single bad field must not freeze manipulation of the overlay, so the
    /// failure is logged and swallowed here rather than propagated.
    pub fn parse_or_zero(raw: &str) -> Self {
        match raw.parse() {
            Ok(length) => length,
            Err(err) => {
                tracing::warn!(%err, raw, "treating malformed length as 0px");
                Self::px(0.0)
            }
        }
    }

    /// Absolute pixel value of this length against one container axis.
    pub fn resolve(self, axis_size: f64) -> f64 {
        match self.unit {
            LengthUnit::Px => self.magnitude,
            LengthUnit::Percent => self.magnitude * axis_size / 100.0,
        }
    }

    /// Percentage length for `pixels` of a container axis, kept to 2 decimal
    /// digits so repeated round-trips do not drift.
    ///
    /// A zero-sized axis yields `0%`: an unmounted container cannot hold a
    /// meaningful percentage, and this is a defined fallback rather than an
    /// error.
    pub fn to_percent(pixels: f64, axis_size: f64) -> Self {
        if axis_size <= 0.0 {
            return Self::percent(0.0);
        }
        Self::percent(round_to_centi(pixels * 100.0 / axis_size))
    }

    pub const fn is_percent(self) -> bool {
        matches!(self.unit, LengthUnit::Percent)
    }
}

impl FromStr for Length {
    type Err = UnitError;

    fn from_str(raw: &str) -> UnitResult<Self> {
        let trimmed = raw.trim();
        let (digits, unit) = if let Some(prefix) = trimmed.strip_suffix("px") {
            (prefix, LengthUnit::Px)
        } else if let Some(prefix) = trimmed.strip_suffix('%') {
            (prefix, LengthUnit::Percent)
        } else {
            return Err(UnitError::InvalidUnit(raw.to_string()));
        };

        digits
            .trim()
            .parse::<f64>()
            .map(|magnitude| Self { magnitude, unit })
            .map_err(|_| UnitError::InvalidUnit(raw.to_string()))
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let magnitude = format_magnitude(self.magnitude);
        match self.unit {
            LengthUnit::Px => write!(f, "{magnitude}px"),
            LengthUnit::Percent => write!(f, "{magnitude}%"),
        }
    }
}

fn round_to_centi(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Wire format keeps at most 2 decimal digits and drops trailing zeros,
/// matching how the records store values (`"15%"`, never `"15.00%"`).
fn format_magnitude(value: f64) -> String {
    let rounded = round_to_centi(value);
    if rounded == rounded.trunc() {
        format!("{}", rounded.trunc() as i64)
    } else {
        let mut formatted = format!("{rounded:.2}");
        while formatted.ends_with('0') {
            formatted.pop();
        }
        if formatted.ends_with('.') {
            formatted.pop();
        }
        formatted
    }
}
