//! Solid-background removal.
//!
//! A pure per-pixel operation: every pixel within a Euclidean RGB distance of
//! the background color becomes fully transparent. There is no spatial
//! dependency, so pixels are processed in parallel.

use crate::color::{average, rgb_distance};
use crate::config::EnhanceConfig;
use crate::pixel_buffer::{Channels, PixelBuffer};
use rayon::prelude::*;
use rgb::RGBA8;
use tracing::debug;

/// Returns a copy of `image` with background-colored pixels made transparent.
///
/// The result always carries alpha. Pixels outside the tolerance keep their
/// RGBA unchanged.
pub fn remove_solid_background(image: &PixelBuffer, bg: RGBA8, tolerance: f64) -> PixelBuffer {
    let pixels: Vec<RGBA8> = image
        .pixels
        .par_iter()
        .map(|&p| {
            if rgb_distance(p, bg) <= tolerance {
                RGBA8::new(p.r, p.g, p.b, 0)
            } else {
                p
            }
        })
        .collect();

    PixelBuffer {
        width: image.width,
        height: image.height,
        channels: Channels::Rgba,
        pixels,
    }
}

/// Background color of an image whose corners are light and opaque, if any.
///
/// Generative edits tend to return a white or light-gray canvas even when
/// asked for transparency.
pub fn light_corner_background(image: &PixelBuffer, config: &EnhanceConfig) -> Option<RGBA8> {
    let avg = average(&image.corners());
    let light = avg.r > config.light_threshold
        && avg.g > config.light_threshold
        && avg.b > config.light_threshold;
    (avg.a > config.opaque_threshold && light).then_some(avg)
}

/// Clears a light, opaque corner-colored background. Images without one are
/// returned unchanged (with alpha ensured).
pub fn force_transparency(image: &PixelBuffer, config: &EnhanceConfig) -> PixelBuffer {
    match light_corner_background(image, config) {
        Some(bg) => {
            debug!(r = bg.r, g = bg.g, b = bg.b, "forcing transparent background");
            remove_solid_background(image, bg, config.transparency_tolerance)
        }
        None => image.with_alpha(),
    }
}
