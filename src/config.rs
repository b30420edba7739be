//! Tunable thresholds for every pipeline stage.
//!
//! Defaults are the production values. A JSON file with any subset of the
//! fields can override them (missing fields keep their default).

use crate::sizing::SizeTable;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LogoConfig {
    pub classifier: ClassifierConfig,
    pub badge: BadgeConfig,
    pub process: ProcessConfig,
    pub sizes: SizeTable,
    pub enhance: EnhanceConfig,
    pub outline: OutlineConfig,
}

impl LogoConfig {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Max per-channel difference between corners for a solid background.
    pub corner_tolerance: u8,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self { corner_tolerance: 18 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BadgeConfig {
    /// Alpha above which a pixel counts as part of the opaque shape.
    pub alpha_threshold: u8,
    pub min_shape_aspect: f64,
    pub max_shape_aspect: f64,
    /// Inset into the shape, as a fraction of its shorter side.
    pub inset_fraction: f64,
    pub min_inset: u32,
    pub sample_stride: u32,
    pub min_samples: usize,
    pub min_saturation: f64,
    pub min_brightness: f64,

    // Opaque images
    pub corner_tolerance: u8,
    /// Corners whose darkest channel exceeds this are "white" and never a badge.
    pub max_whiteness: u8,
    pub min_corner_saturation: f64,
    pub perimeter_stride: u32,
    pub perimeter_match_distance: f64,
    pub min_perimeter_match: f64,
    pub min_center_distance: f64,
}

impl Default for BadgeConfig {
    fn default() -> Self {
        Self {
            alpha_threshold: 128,
            min_shape_aspect: 0.4,
            max_shape_aspect: 2.5,
            inset_fraction: 0.04,
            min_inset: 4,
            sample_stride: 8,
            min_samples: 10,
            min_saturation: 0.25,
            min_brightness: 20.0,
            corner_tolerance: 30,
            max_whiteness: 220,
            min_corner_saturation: 0.2,
            perimeter_stride: 4,
            perimeter_match_distance: 50.0,
            min_perimeter_match: 0.55,
            min_center_distance: 30.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessConfig {
    /// RGB distance under which a pixel is treated as solid background.
    pub removal_tolerance: f64,
    pub trim_alpha: u8,
    pub trim_solid: u8,
    pub trim_complex: u8,
    pub trim_badge: u8,
    pub trim_svg: u8,
    /// White margin added around processed logos.
    pub padding: u32,
    pub badge_max_dimension: u32,
    pub svg_max_dimension: u32,
}

impl Default for ProcessConfig {
    fn default() -> Self {
        Self {
            removal_tolerance: 40.0,
            trim_alpha: 20,
            trim_solid: 10,
            trim_complex: 20,
            trim_badge: 10,
            trim_svg: 10,
            padding: 20,
            badge_max_dimension: 512,
            svg_max_dimension: 512,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnhanceConfig {
    /// Corner average must be brighter than this on every channel.
    pub light_threshold: u8,
    /// Corner average alpha must exceed this.
    pub opaque_threshold: u8,
    pub transparency_tolerance: f64,
    pub final_trim_threshold: u8,
    pub prepare_trim_threshold: u8,
    pub max_prepare_dimension: u32,
}

impl Default for EnhanceConfig {
    fn default() -> Self {
        Self {
            light_threshold: 160,
            opaque_threshold: 200,
            transparency_tolerance: 45.0,
            final_trim_threshold: 10,
            prepare_trim_threshold: 30,
            max_prepare_dimension: 640,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutlineConfig {
    pub stroke_px: u32,
    /// Alpha above which a pixel belongs to the silhouette.
    pub alpha_threshold: u8,
    /// Background pixels with at least this many foreground neighbours are filled.
    pub clean_min_neighbors: u8,
    /// Try the ImageMagick binary before the built-in implementation.
    pub prefer_native: bool,
    pub native_binary: String,
}

impl Default for OutlineConfig {
    fn default() -> Self {
        Self {
            stroke_px: 4,
            alpha_threshold: 20,
            clean_min_neighbors: 7,
            prefer_native: true,
            native_binary: "magick".to_string(),
        }
    }
}

impl OutlineConfig {
    /// Built-in implementation only; no subprocess is ever spawned.
    pub fn pure() -> Self {
        Self {
            prefer_native: false,
            ..Self::default()
        }
    }
}
