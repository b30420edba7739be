//! Decoding uploaded bytes into [`PixelBuffer`]s and encoding results as PNG.
//!
//! PNG, JPEG and WebP are decoded with the `image` crate. SVG is rasterized
//! with resvg to fit a square box before it enters the raster pipeline.

use crate::error::{LogoError, Result};
use crate::pixel_buffer::{Channels, PixelBuffer};
use crate::trim::fit_dimensions;
use image::{DynamicImage, ImageFormat, ImageOutputFormat};
use resvg::{tiny_skia, usvg};
use rgb::RGBA8;
use std::io::Cursor;
use std::sync::{Arc, OnceLock};
use tracing::{debug, info};

/// Bytes inspected when sniffing for SVG markup.
const SVG_SNIFF_LEN: usize = 200;

/// True when the MIME hint says SVG or the leading bytes look like SVG/XML.
pub fn is_svg(bytes: &[u8], mime_hint: Option<&str>) -> bool {
    if mime_hint.is_some_and(|m| m.to_ascii_lowercase().contains("svg")) {
        return true;
    }
    let head = &bytes[..bytes.len().min(SVG_SNIFF_LEN)];
    let text = String::from_utf8_lossy(head);
    let text = text.trim_start_matches('\u{feff}').trim_start();
    text.starts_with("<svg") || text.starts_with("<?xml")
}

/// Decodes PNG, JPEG or WebP bytes.
pub fn decode_raster(bytes: &[u8]) -> Result<PixelBuffer> {
    let format = image::guess_format(bytes)
        .map_err(|_| LogoError::UnsupportedFormat("unrecognized image data".to_string()))?;
    if !matches!(format, ImageFormat::Png | ImageFormat::Jpeg | ImageFormat::WebP) {
        return Err(LogoError::UnsupportedFormat(format!("{:?}", format)));
    }

    let img = image::load_from_memory_with_format(bytes, format)?;
    let channels = if img.color().has_alpha() {
        Channels::Rgba
    } else {
        Channels::Rgb
    };
    let rgba = img.to_rgba8();
    PixelBuffer::from_rgba_image(&rgba, channels)
        .map_err(|e| LogoError::Decode(e.to_string()))
}

/// System fonts for SVG `<text>`, loaded once per process.
fn font_database() -> Arc<usvg::fontdb::Database> {
    static FONTS: OnceLock<Arc<usvg::fontdb::Database>> = OnceLock::new();
    FONTS
        .get_or_init(|| {
            let mut fontdb = usvg::fontdb::Database::new();
            fontdb.load_system_fonts();
            info!(font_count = fontdb.len(), "Loaded fonts for SVG text rendering");
            Arc::new(fontdb)
        })
        .clone()
}

/// Renders SVG markup onto a transparent canvas fitting `max_dim x max_dim`.
/// Small drawings are scaled up.
///
/// A drawing that renders no visible pixel is a decode error, not an empty logo.
pub fn rasterize_svg(bytes: &[u8], max_dim: u32) -> Result<PixelBuffer> {
    let options = usvg::Options {
        fontdb: font_database(),
        ..Default::default()
    };
    let tree = usvg::Tree::from_data(bytes, &options)
        .map_err(|e| LogoError::Decode(format!("SVG parse error: {}", e)))?;

    let size = tree.size();
    let (src_w, src_h) = (size.width().ceil().max(1.0) as u32, size.height().ceil().max(1.0) as u32);
    let (width, height) = fit_dimensions(src_w, src_h, max_dim, max_dim, true);
    let scale = (width as f32 / size.width()).min(height as f32 / size.height());

    let mut pixmap = tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| LogoError::Decode(format!("cannot allocate {}x{} canvas", width, height)))?;
    resvg::render(
        &tree,
        tiny_skia::Transform::from_scale(scale, scale),
        &mut pixmap.as_mut(),
    );

    // tiny-skia stores premultiplied alpha
    let pixels: Vec<RGBA8> = pixmap
        .pixels()
        .iter()
        .map(|p| {
            let c = p.demultiply();
            RGBA8::new(c.red(), c.green(), c.blue(), c.alpha())
        })
        .collect();
    if pixels.iter().all(|p| p.a == 0) {
        return Err(LogoError::Decode("SVG rendered no visible content".to_string()));
    }
    debug!(width, height, "rasterized SVG");
    PixelBuffer::new(width, height, Channels::Rgba, pixels)
}

/// PNG bytes; RGB images are written without an alpha channel.
pub fn encode_png(image: &PixelBuffer) -> Result<Vec<u8>> {
    let rgba = image.to_rgba_image();
    let dynamic = match image.channels {
        Channels::Rgba => DynamicImage::ImageRgba8(rgba),
        Channels::Rgb => DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(rgba).to_rgb8()),
    };

    let mut buffer = Vec::new();
    dynamic
        .write_to(&mut Cursor::new(&mut buffer), ImageOutputFormat::Png)
        .map_err(|e| LogoError::Encode(e.to_string()))?;
    Ok(buffer)
}
