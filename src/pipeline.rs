//! End-to-end logo processing.
//!
//! Upload path: decode → badge check → classify → (remove background) →
//! trim → compose on white → size bucket.
//!
//! Enhancement path: prepare (trim + downscale) → external generative edit →
//! force transparency → white outline → final trim.

use crate::background::{force_transparency, remove_solid_background};
use crate::badge::is_badge;
use crate::classifier::{classify, Plan};
use crate::codec;
use crate::config::LogoConfig;
use crate::error::Result;
use crate::outline::{detect_outline_strategy, OutlineStrategy};
use crate::pixel_buffer::PixelBuffer;
use crate::sizing::LogoBox;
use crate::trim::{compose_on_white, pad_transparent, resize_to_fit, trim};
use rgb::RGBA8;
use serde::Serialize;
use tracing::{debug, info};

/// Outcome of processing one uploaded logo.
#[derive(Debug, Clone)]
pub struct LogoResult {
    pub plan: Plan,
    /// Width / height of the logo content, before padding.
    pub trimmed_aspect_ratio: f64,
    pub logo_box: LogoBox,
    pub processed_image: PixelBuffer,
    /// SVG and badge logos are never sent for enhancement.
    pub skip_enhancement: bool,
}

/// JSON-friendly metadata of a [`LogoResult`].
#[derive(Debug, Clone, Serialize)]
pub struct LogoSummary {
    pub plan: Plan,
    pub trimmed_ar: f64,
    pub width: u32,
    pub height: u32,
    #[serde(rename = "skipEnhancement")]
    pub skip_enhancement: bool,
}

impl LogoResult {
    pub fn to_png(&self) -> Result<Vec<u8>> {
        codec::encode_png(&self.processed_image)
    }

    pub fn summary(&self) -> LogoSummary {
        LogoSummary {
            plan: self.plan.clone(),
            trimmed_ar: self.trimmed_aspect_ratio,
            width: self.logo_box.w,
            height: self.logo_box.h,
            skip_enhancement: self.skip_enhancement,
        }
    }
}

/// Processes an uploaded logo with the default configuration.
pub fn analyze_and_process(bytes: &[u8], mime_hint: Option<&str>) -> Result<LogoResult> {
    analyze_and_process_with(bytes, mime_hint, &LogoConfig::default())
}

pub fn analyze_and_process_with(
    bytes: &[u8],
    mime_hint: Option<&str>,
    config: &LogoConfig,
) -> Result<LogoResult> {
    let result = if codec::is_svg(bytes, mime_hint) {
        let raster = codec::rasterize_svg(bytes, config.process.svg_max_dimension)?;
        process_svg_raster(&raster, config)
    } else {
        let image = codec::decode_raster(bytes)?;
        process_raster(&image, config)?
    };

    info!(
        plan = result.plan.tag(),
        trimmed_ar = result.trimmed_aspect_ratio,
        box_w = result.logo_box.w,
        box_h = result.logo_box.h,
        "logo processed"
    );
    Ok(result)
}

/// Runs the raster pipeline on an already decoded image.
pub fn process_raster(image: &PixelBuffer, config: &LogoConfig) -> Result<LogoResult> {
    let process = &config.process;

    if is_badge(image, image.has_alpha(), &config.badge) {
        debug!("badge detected, keeping background");
        return process_badge(image, config);
    }

    let plan = classify(image, &config.classifier);
    debug!(plan = plan.tag(), "background classified");

    let logo = match &plan {
        Plan::HasAlpha => trim(image, process.trim_alpha),
        Plan::SolidBackground { r, g, b, .. } => {
            let bg = RGBA8::new(*r, *g, *b, 255);
            let cleared = remove_solid_background(image, bg, process.removal_tolerance);
            trim(&cleared, process.trim_solid)
        }
        _ => trim(image, process.trim_complex),
    };

    Ok(compose_result(plan, &logo, false, config))
}

/// Badges keep their background and get no padding; they are only trimmed
/// (when transparent) and resized.
fn process_badge(image: &PixelBuffer, config: &LogoConfig) -> Result<LogoResult> {
    let process = &config.process;
    let source = if image.has_alpha() {
        trim(image, process.trim_badge)
    } else {
        image.clone()
    };
    let max = process.badge_max_dimension;
    let resized = resize_to_fit(&source, max, max, true)?;
    let ar = resized.aspect_ratio();

    Ok(LogoResult {
        plan: Plan::Badge,
        trimmed_aspect_ratio: ar,
        logo_box: config.sizes.box_for(ar),
        processed_image: resized,
        skip_enhancement: true,
    })
}

fn process_svg_raster(raster: &PixelBuffer, config: &LogoConfig) -> LogoResult {
    let logo = trim(raster, config.process.trim_svg);
    compose_result(Plan::Svg, &logo, true, config)
}

fn compose_result(plan: Plan, logo: &PixelBuffer, skip_enhancement: bool, config: &LogoConfig) -> LogoResult {
    let ar = logo.aspect_ratio();
    LogoResult {
        plan,
        trimmed_aspect_ratio: ar,
        logo_box: config.sizes.box_for(ar),
        processed_image: compose_on_white(logo, config.process.padding),
        skip_enhancement,
    }
}

/// Trims aggressively and downsizes (never enlarges) before the external
/// generative call. Returns PNG bytes.
pub fn prepare_for_enhancement(bytes: &[u8]) -> Result<Vec<u8>> {
    prepare_for_enhancement_with(bytes, &LogoConfig::default())
}

pub fn prepare_for_enhancement_with(bytes: &[u8], config: &LogoConfig) -> Result<Vec<u8>> {
    let image = if codec::is_svg(bytes, None) {
        codec::rasterize_svg(bytes, config.process.svg_max_dimension)?
    } else {
        codec::decode_raster(bytes)?
    };
    let enhance = &config.enhance;
    let trimmed = trim(&image, enhance.prepare_trim_threshold);
    let max = enhance.max_prepare_dimension;
    let resized = resize_to_fit(&trimmed, max, max, false)?;
    debug!(w = resized.width, h = resized.height, "prepared for enhancement");
    codec::encode_png(&resized)
}

/// Enhanced logo after post-processing.
#[derive(Debug, Clone)]
pub struct EnhancedLogo {
    pub image: PixelBuffer,
    pub trimmed_aspect_ratio: f64,
    pub logo_box: LogoBox,
}

impl EnhancedLogo {
    pub fn to_png(&self) -> Result<Vec<u8>> {
        codec::encode_png(&self.image)
    }
}

/// Post-processes the bytes returned by the generative edit with the default
/// configuration.
pub fn enhance_postprocess(bytes: &[u8]) -> Result<EnhancedLogo> {
    enhance_postprocess_with(bytes, &LogoConfig::default())
}

pub fn enhance_postprocess_with(bytes: &[u8], config: &LogoConfig) -> Result<EnhancedLogo> {
    let strategy = detect_outline_strategy(&config.outline);
    enhance_postprocess_using(bytes, config, strategy.as_ref())
}

/// Forces a transparent background, strokes the silhouette white and trims.
pub fn enhance_postprocess_using(
    bytes: &[u8],
    config: &LogoConfig,
    strategy: &dyn OutlineStrategy,
) -> Result<EnhancedLogo> {
    let decoded = codec::decode_raster(bytes)?;
    let transparent = force_transparency(&decoded, &config.enhance);

    let stroke = config.outline.stroke_px;
    let padded = pad_transparent(&transparent, stroke);
    let outlined = strategy.outline(&padded, stroke)?;
    let image = trim(&outlined, config.enhance.final_trim_threshold);

    let ar = image.aspect_ratio();
    info!(
        strategy = strategy.name(),
        w = image.width,
        h = image.height,
        trimmed_ar = ar,
        "enhanced logo post-processed"
    );
    Ok(EnhancedLogo {
        logo_box: config.sizes.box_for(ar),
        trimmed_aspect_ratio: ar,
        image,
    })
}
