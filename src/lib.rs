//! logo-smart - Logo background normalization for email signatures
//!
//! This library takes arbitrary uploaded logos (PNG, JPEG, WebP, SVG) and turns
//! them into clean, tightly cropped images with a predictable display size.
//!
//! ## Features
//!
//! - **Background classification** by corner sampling (alpha / solid / complex)
//! - **Badge detection** so emblems keep their colored background
//! - **Solid background removal** by RGB distance
//! - **Trim & compose** onto a padded white canvas
//! - **Smart size buckets** mapping aspect ratio to a fixed display box
//! - **White outline** stroke around AI-enhanced logos
//!
//! ## Example
//!
//! ```rust,no_run
//! use logo_smart::{process_file, LogoConfig};
//! use std::path::Path;
//!
//! let result = process_file(Path::new("logo.png"), Path::new("logo.out.png"), &LogoConfig::default())
//!     .expect("Processing failed");
//! println!("{} -> {}x{}", result.plan.tag(), result.logo_box.w, result.logo_box.h);
//! ```

pub mod background;
pub mod badge;
pub mod classifier;
pub mod codec;
pub mod color;
pub mod config;
pub mod error;
pub mod outline;
pub mod pipeline;
pub mod pixel_buffer;
pub mod services;
pub mod sizing;
pub mod trim;

pub use classifier::{classify, Plan};
pub use config::LogoConfig;
pub use error::{LogoError, Result};
pub use outline::{add_white_outline, MagickOutline, OutlineStrategy, PixelOutline};
pub use pipeline::{
    analyze_and_process, analyze_and_process_with, enhance_postprocess, enhance_postprocess_using,
    enhance_postprocess_with, prepare_for_enhancement, prepare_for_enhancement_with, EnhancedLogo,
    LogoResult, LogoSummary,
};
pub use pixel_buffer::{Channels, PixelBuffer};
pub use services::{display_url, enhance_logo, upload_logo, ImageEnhancer, LogoStore, StoredAsset};
pub use sizing::{box_for_aspect_ratio, LogoBox, SizeTable};

use std::path::Path;

/// MIME hint derived from a file extension, for inputs read from disk.
pub fn mime_from_path(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "svg" => Some("image/svg+xml"),
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}

/// Process a logo file and write the resulting PNG
///
/// # Arguments
///
/// * `input_path` - Path to the uploaded logo
/// * `output_path` - Where the processed PNG is written
/// * `config` - Pipeline thresholds
pub fn process_file(input_path: &Path, output_path: &Path, config: &LogoConfig) -> anyhow::Result<LogoResult> {
    let bytes = std::fs::read(input_path)?;
    let result = analyze_and_process_with(&bytes, mime_from_path(input_path), config)?;
    std::fs::write(output_path, result.to_png()?)?;
    Ok(result)
}
