//! Background classification.
//!
//! Decides how an image's background should be handled: images that already
//! carry alpha are left alone, images whose four corners agree get their
//! background color removed, and everything else is treated as a complex
//! (photographic or gradient) background and left untouched.

use crate::color::{all_similar, average, to_hex};
use crate::config::ClassifierConfig;
use crate::pixel_buffer::PixelBuffer;
use serde::{Deserialize, Serialize};

/// Background-handling strategy chosen for one input image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Plan {
    HasAlpha,
    #[serde(rename = "SOLID_BG")]
    SolidBackground {
        hex: String,
        r: u8,
        g: u8,
        b: u8,
    },
    #[serde(rename = "COMPLEX_BG")]
    ComplexBackground,
    Svg,
    Badge,
}

impl Plan {
    pub fn tag(&self) -> &'static str {
        match self {
            Plan::HasAlpha => "HAS_ALPHA",
            Plan::SolidBackground { .. } => "SOLID_BG",
            Plan::ComplexBackground => "COMPLEX_BG",
            Plan::Svg => "SVG",
            Plan::Badge => "BADGE",
        }
    }
}

/// Classifies a decoded raster image. Never fails; every image gets a plan.
///
/// Alpha presence is taken from the declared channel layout, so an RGBA
/// image whose pixels are all opaque is still `HasAlpha`.
pub fn classify(image: &PixelBuffer, config: &ClassifierConfig) -> Plan {
    if image.has_alpha() {
        return Plan::HasAlpha;
    }

    let corners = image.corners();
    if all_similar(&corners, config.corner_tolerance) {
        let avg = average(&corners);
        return Plan::SolidBackground {
            hex: to_hex(avg.r, avg.g, avg.b),
            r: avg.r,
            g: avg.g,
            b: avg.b,
        };
    }

    Plan::ComplexBackground
}
