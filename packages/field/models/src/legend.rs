//! Ten-step color ramp for heat intensity overlays and the map legend.
//!
//! Bucket boundaries are strict lower bounds: an intensity of exactly
//! `3.0` falls in the 2-3°C bucket, matching the overlay renderer.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// One step of the heat color ramp.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum HeatBucket {
    /// 0-1°C (and anything not above 1, including `NaN`)
    Negligible,
    /// 1-2°C
    VeryLow,
    /// 2-3°C
    Low,
    /// 3-4°C
    Mild,
    /// 4-5°C
    Moderate,
    /// 5-6°C
    Elevated,
    /// 6-7°C
    High,
    /// 7-8°C
    VeryHigh,
    /// 8-9°C
    Severe,
    /// Above 9°C
    Extreme,
}

impl HeatBucket {
    /// Returns all buckets, coolest first.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Negligible,
            Self::VeryLow,
            Self::Low,
            Self::Mild,
            Self::Moderate,
            Self::Elevated,
            Self::High,
            Self::VeryHigh,
            Self::Severe,
            Self::Extreme,
        ]
    }

    /// Buckets the given intensity.
    #[must_use]
    pub fn for_intensity(intensity: f64) -> Self {
        // Hottest first; each threshold is exclusive.
        Self::all()
            .iter()
            .rev()
            .find(|bucket| intensity > bucket.threshold())
            .copied()
            .unwrap_or(Self::Negligible)
    }

    /// Exclusive lower threshold in °C. [`Self::Negligible`] has none and
    /// reports `f64::INFINITY` so it never matches by threshold.
    const fn threshold(self) -> f64 {
        match self {
            Self::Negligible => f64::INFINITY,
            Self::VeryLow => 1.0,
            Self::Low => 2.0,
            Self::Mild => 3.0,
            Self::Moderate => 4.0,
            Self::Elevated => 5.0,
            Self::High => 6.0,
            Self::VeryHigh => 7.0,
            Self::Severe => 8.0,
            Self::Extreme => 9.0,
        }
    }

    /// Hex fill color.
    #[must_use]
    pub const fn color(self) -> &'static str {
        match self {
            Self::Negligible => "#FFFFFF",
            Self::VeryLow => "#FFFFCC",
            Self::Low => "#FFEDA0",
            Self::Mild => "#FED976",
            Self::Moderate => "#FEB24C",
            Self::Elevated => "#FD8D3C",
            Self::High => "#FC4E2A",
            Self::VeryHigh => "#E31A1C",
            Self::Severe => "#BD0026",
            Self::Extreme => "#800026",
        }
    }

    /// Legend caption.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Negligible => "0-1°C hotter",
            Self::VeryLow => "1-2°C hotter",
            Self::Low => "2-3°C hotter",
            Self::Mild => "3-4°C hotter",
            Self::Moderate => "4-5°C hotter",
            Self::Elevated => "5-6°C hotter",
            Self::High => "6-7°C hotter",
            Self::VeryHigh => "7-8°C hotter",
            Self::Severe => "8-9°C hotter",
            Self::Extreme => "9-10°C hotter",
        }
    }
}

/// Overlay fill color for an intensity.
#[must_use]
pub fn color_for(intensity: f64) -> &'static str {
    HeatBucket::for_intensity(intensity).color()
}
