//! Trimming, padding and resizing.
//!
//! Trimming crops away border rows and columns that match the top-left
//! reference pixel (or are fully transparent). Composition puts the trimmed
//! content on a fresh opaque white canvas with a uniform margin.

use crate::error::{LogoError, Result};
use crate::pixel_buffer::{Channels, PixelBuffer, Rect};
use image::imageops::FilterType;
use image::{Rgba, Rgba32FImage};
use rgb::RGBA8;
use tracing::debug;

/// Whether `p` counts as border when the reference (top-left) pixel is `reference`.
///
/// Fully transparent pixels are always border. Against a transparent
/// reference only alpha is compared, since the RGB of hidden pixels is
/// arbitrary.
#[inline]
fn is_border(p: RGBA8, reference: RGBA8, threshold: u8) -> bool {
    if p.a == 0 {
        return true;
    }
    if reference.a == 0 {
        return p.a <= threshold;
    }
    p.r.abs_diff(reference.r) <= threshold
        && p.g.abs_diff(reference.g) <= threshold
        && p.b.abs_diff(reference.b) <= threshold
        && p.a.abs_diff(reference.a) <= threshold
}

/// Tight bounding box of non-border content, or `None` when everything is border.
pub fn content_bounds(image: &PixelBuffer, threshold: u8) -> Option<Rect> {
    let reference = image.get_clamped(0, 0);
    let (mut x0, mut y0) = (u32::MAX, u32::MAX);
    let (mut x1, mut y1) = (0u32, 0u32);
    let mut found = false;

    for y in 0..image.height {
        for x in 0..image.width {
            let Some(p) = image.get(x, y) else { continue };
            if !is_border(p, reference, threshold) {
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

/// Crops to the content bounds; fails when no content remains.
pub fn try_trim(image: &PixelBuffer, threshold: u8) -> Result<PixelBuffer> {
    let bounds = content_bounds(image, threshold).ok_or(LogoError::DegenerateGeometry {
        width: image.width,
        height: image.height,
    })?;
    image.crop(bounds)
}

/// Like [`try_trim`], but keeps the untrimmed image when trimming would
/// remove everything.
pub fn trim(image: &PixelBuffer, threshold: u8) -> PixelBuffer {
    match try_trim(image, threshold) {
        Ok(trimmed) => {
            debug!(
                from_w = image.width,
                from_h = image.height,
                to_w = trimmed.width,
                to_h = trimmed.height,
                "trimmed"
            );
            trimmed
        }
        Err(e) => {
            debug!(error = %e, "trim fell back to untrimmed image");
            image.clone()
        }
    }
}

/// Source-over blend of `p` onto opaque white.
#[inline]
fn over_white(p: RGBA8) -> RGBA8 {
    let a = p.a as u32;
    let blend = |c: u8| ((c as u32 * a + 255 * (255 - a) + 127) / 255) as u8;
    RGBA8::new(blend(p.r), blend(p.g), blend(p.b), 255)
}

/// Opaque white canvas of `(w + 2*padding) x (h + 2*padding)` with the image
/// composited at `(padding, padding)`.
pub fn compose_on_white(image: &PixelBuffer, padding: u32) -> PixelBuffer {
    let width = image.width + padding * 2;
    let height = image.height + padding * 2;
    let mut canvas = PixelBuffer::filled(width, height, Channels::Rgb, RGBA8::new(255, 255, 255, 255));

    for y in 0..image.height {
        for x in 0..image.width {
            if let Some(p) = image.get(x, y) {
                canvas.set(x + padding, y + padding, over_white(p));
            }
        }
    }
    canvas
}

/// Transparent margin of `padding` pixels on every side.
pub fn pad_transparent(image: &PixelBuffer, padding: u32) -> PixelBuffer {
    let width = image.width + padding * 2;
    let height = image.height + padding * 2;
    let mut canvas = PixelBuffer::filled(width, height, Channels::Rgba, RGBA8::new(0, 0, 0, 0));

    for y in 0..image.height {
        for x in 0..image.width {
            if let Some(p) = image.get(x, y) {
                canvas.set(x + padding, y + padding, p);
            }
        }
    }
    canvas
}

/// Dimensions that fit `width x height` inside `max_w x max_h`, keeping the
/// aspect ratio. Never smaller than 1x1.
pub fn fit_dimensions(width: u32, height: u32, max_w: u32, max_h: u32, enlarge: bool) -> (u32, u32) {
    let scale_x = max_w as f64 / width as f64;
    let scale_y = max_h as f64 / height as f64;
    let mut scale = scale_x.min(scale_y);
    if !enlarge {
        scale = scale.min(1.0);
    }
    let w = (width as f64 * scale).round().max(1.0) as u32;
    let h = (height as f64 * scale).round().max(1.0) as u32;
    (w, h)
}

/// Resizes to fit inside `max_w x max_h` with a Lanczos filter.
///
/// Images with alpha are filtered premultiplied, so the color of hidden
/// pixels never bleeds into anti-aliased edges.
pub fn resize_to_fit(image: &PixelBuffer, max_w: u32, max_h: u32, enlarge: bool) -> Result<PixelBuffer> {
    let (w, h) = fit_dimensions(image.width, image.height, max_w, max_h, enlarge);
    if (w, h) == (image.width, image.height) {
        return Ok(image.clone());
    }
    if !image.has_alpha() {
        let resized = image::imageops::resize(&image.to_rgba_image(), w, h, FilterType::Lanczos3);
        return PixelBuffer::from_rgba_image(&resized, image.channels);
    }

    let mut premultiplied = Rgba32FImage::new(image.width, image.height);
    for (x, y, px) in premultiplied.enumerate_pixels_mut() {
        let p = image.get_clamped(x as i64, y as i64);
        let a = p.a as f32 / 255.0;
        *px = Rgba([p.r as f32 / 255.0 * a, p.g as f32 / 255.0 * a, p.b as f32 / 255.0 * a, a]);
    }
    let resized = image::imageops::resize(&premultiplied, w, h, FilterType::Lanczos3);

    let to_u8 = |v: f32| (v * 255.0).round().clamp(0.0, 255.0) as u8;
    let pixels: Vec<RGBA8> = resized
        .pixels()
        .map(|px| {
            let [r, g, b, a] = px.0;
            let a = a.clamp(0.0, 1.0);
            if a <= f32::EPSILON {
                return RGBA8::new(0, 0, 0, 0);
            }
            RGBA8::new(to_u8(r / a), to_u8(g / a), to_u8(b / a), to_u8(a))
        })
        .collect();
    PixelBuffer::new(w, h, image.channels, pixels)
}
