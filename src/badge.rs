//! Badge / emblem detection.
//!
//! Circular seals, shields and insurance badges use a saturated colored
//! background as part of the brand. Those must not go through background
//! removal, so they are detected up front and routed to a resize-only path.
//! Anything ambiguous is reported as "not a badge".

use crate::color::{all_similar, average, brightness, rgb_distance, saturation};
use crate::config::BadgeConfig;
use crate::pixel_buffer::{PixelBuffer, Rect};
use rgb::RGBA8;
use tracing::debug;

pub fn is_badge(image: &PixelBuffer, has_alpha: bool, config: &BadgeConfig) -> bool {
    if has_alpha {
        is_badge_shape(image, config)
    } else {
        is_badge_rectangle(image, config)
    }
}

/// Bounding box of pixels whose alpha exceeds `threshold`.
pub fn opaque_bounds(image: &PixelBuffer, threshold: u8) -> Option<Rect> {
    let (mut x0, mut y0) = (u32::MAX, u32::MAX);
    let (mut x1, mut y1) = (0u32, 0u32);
    let mut found = false;

    for y in 0..image.height {
        for x in 0..image.width {
            let Some(p) = image.get(x, y) else { continue };
            if p.a > threshold {
                found = true;
                x0 = x0.min(x);
                y0 = y0.min(y);
                x1 = x1.max(x);
                y1 = y1.max(y);
            }
        }
    }

    found.then(|| Rect {
        x: x0,
        y: y0,
        width: x1 - x0 + 1,
        height: y1 - y0 + 1,
    })
}

/// Transparent image: the inner edge of the opaque shape must be a saturated color.
fn is_badge_shape(image: &PixelBuffer, config: &BadgeConfig) -> bool {
    let Some(bounds) = opaque_bounds(image, config.alpha_threshold) else {
        return false;
    };

    let (cmin, rmin) = (bounds.x, bounds.y);
    let (cmax, rmax) = (bounds.right() - 1, bounds.bottom() - 1);
    let bw = cmax - cmin;
    let bh = rmax - rmin;
    if bw == 0 || bh == 0 {
        return false;
    }

    let shape_aspect = bw as f64 / bh as f64;
    if shape_aspect < config.min_shape_aspect || shape_aspect > config.max_shape_aspect {
        debug!(shape_aspect, "badge rejected: shape too elongated");
        return false;
    }

    let inset = ((bw.min(bh) as f64 * config.inset_fraction).floor() as u32).max(config.min_inset);
    let depth = inset * 4;
    let stride = config.sample_stride.max(1) as usize;
    let opaque = |x: u32, y: u32| {
        image
            .get(x, y)
            .filter(|p| p.a > config.alpha_threshold)
    };

    let mut samples: Vec<RGBA8> = Vec::new();
    for x in (cmin..=cmax).step_by(stride) {
        if let Some(p) = (rmin..=(rmin + depth).min(rmax)).find_map(|y| opaque(x, y)) {
            samples.push(p);
        }
        if let Some(p) = (rmax.saturating_sub(depth).max(rmin)..=rmax)
            .rev()
            .find_map(|y| opaque(x, y))
        {
            samples.push(p);
        }
    }
    for y in (rmin..=rmax).step_by(stride) {
        if let Some(p) = (cmin..=(cmin + depth).min(cmax)).find_map(|x| opaque(x, y)) {
            samples.push(p);
        }
        if let Some(p) = (cmax.saturating_sub(depth).max(cmin)..=cmax)
            .rev()
            .find_map(|x| opaque(x, y))
        {
            samples.push(p);
        }
    }

    if samples.len() < config.min_samples {
        debug!(samples = samples.len(), "badge rejected: too few edge samples");
        return false;
    }

    let n = samples.len() as f64;
    let avg_saturation = samples.iter().map(|&p| saturation(p)).sum::<f64>() / n;
    let avg_brightness = samples.iter().map(|&p| brightness(p)).sum::<f64>() / n;
    debug!(avg_saturation, avg_brightness, "badge edge statistics");

    avg_saturation > config.min_saturation && avg_brightness > config.min_brightness
}

/// Opaque image: a saturated, non-white frame color must dominate the perimeter
/// while the center differs from it.
fn is_badge_rectangle(image: &PixelBuffer, config: &BadgeConfig) -> bool {
    let corners = image.corners();
    if !all_similar(&corners, config.corner_tolerance) {
        return false;
    }

    let edge = average(&corners);
    if edge.r.min(edge.g).min(edge.b) > config.max_whiteness {
        return false;
    }
    if saturation(edge) < config.min_corner_saturation {
        return false;
    }

    let (w, h) = (image.width, image.height);
    let stride = config.perimeter_stride.max(1) as usize;
    let mut total = 0usize;
    let mut matches = 0usize;
    let mut tally = |p: RGBA8| {
        total += 1;
        if rgb_distance(p, edge) <= config.perimeter_match_distance {
            matches += 1;
        }
    };
    for x in (0..w).step_by(stride) {
        tally(image.get_clamped(x as i64, 0));
        tally(image.get_clamped(x as i64, h as i64 - 1));
    }
    for y in (0..h).step_by(stride) {
        tally(image.get_clamped(0, y as i64));
        tally(image.get_clamped(w as i64 - 1, y as i64));
    }

    let match_ratio = matches as f64 / total.max(1) as f64;
    if match_ratio < config.min_perimeter_match {
        debug!(match_ratio, "badge rejected: perimeter not uniform");
        return false;
    }

    rgb_distance(image.center(), edge) >= config.min_center_distance
}
