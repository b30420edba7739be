//! White outline stroke around a logo's silhouette.
//!
//! Two interchangeable strategies produce the same result: the ImageMagick
//! command-line tool when it is installed, and a built-in mask pipeline
//! (silhouette → 8-neighbour clean → disk dilation → paint the new ring white).
//! [`detect_outline_strategy`] checks for the binary once and picks one.

use crate::config::OutlineConfig;
use crate::error::{LogoError, Result};
use crate::pixel_buffer::{Channels, PixelBuffer};
use rayon::prelude::*;
use rgb::RGBA8;
use std::io::Write;
use std::process::{Command, Stdio};
use tracing::{debug, info, warn};

const WHITE: RGBA8 = RGBA8::new(255, 255, 255, 255);

pub trait OutlineStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Returns a copy of `image` with a `stroke_px` wide white ring painted
    /// just outside its silhouette. Interior pixels are left untouched.
    fn outline(&self, image: &PixelBuffer, stroke_px: u32) -> Result<PixelBuffer>;
}

/// Foreground where alpha exceeds `alpha_threshold`.
pub fn silhouette_mask(image: &PixelBuffer, alpha_threshold: u8) -> Vec<bool> {
    image.pixels.iter().map(|p| p.a > alpha_threshold).collect()
}

const NEIGHBOURS: [(i64, i64); 8] = [
    (-1, -1), (0, -1), (1, -1),
    (-1, 0), (1, 0),
    (-1, 1), (0, 1), (1, 1),
];

/// Fills background pixels that have at least `min_neighbors` foreground
/// neighbours. Neighbours outside the image count as background.
pub fn clean_mask(mask: &[bool], width: u32, height: u32, min_neighbors: u8) -> Vec<bool> {
    let (w, h) = (width as i64, height as i64);
    (0..mask.len())
        .into_par_iter()
        .map(|i| {
            if mask[i] {
                return true;
            }
            let (x, y) = (i as i64 % w, i as i64 / w);
            let count = NEIGHBOURS
                .iter()
                .filter(|(dx, dy)| {
                    let (nx, ny) = (x + dx, y + dy);
                    nx >= 0 && ny >= 0 && nx < w && ny < h && mask[(ny * w + nx) as usize]
                })
                .count();
            count >= min_neighbors as usize
        })
        .collect()
}

/// Offsets of a disk-shaped structuring element of the given radius.
fn disk_offsets(radius: u32) -> Vec<(i64, i64)> {
    let r = radius as i64;
    let mut offsets = Vec::new();
    for dy in -r..=r {
        for dx in -r..=r {
            if dx * dx + dy * dy <= r * r {
                offsets.push((dx, dy));
            }
        }
    }
    offsets
}

/// Marks every pixel within Euclidean distance `radius` of a foreground pixel.
pub fn dilate_mask(mask: &[bool], width: u32, height: u32, radius: u32) -> Vec<bool> {
    if radius == 0 {
        return mask.to_vec();
    }
    let (w, h) = (width as i64, height as i64);
    let offsets = disk_offsets(radius);
    (0..mask.len())
        .into_par_iter()
        .map(|i| {
            if mask[i] {
                return true;
            }
            let (x, y) = (i as i64 % w, i as i64 / w);
            offsets.iter().any(|(dx, dy)| {
                let (nx, ny) = (x + dx, y + dy);
                nx >= 0 && ny >= 0 && nx < w && ny < h && mask[(ny * w + nx) as usize]
            })
        })
        .collect()
}

/// Built-in outline: pure per-pixel mask operations.
#[derive(Debug, Clone)]
pub struct PixelOutline {
    pub alpha_threshold: u8,
    pub clean_min_neighbors: u8,
}

impl PixelOutline {
    pub fn new(config: &OutlineConfig) -> Self {
        Self {
            alpha_threshold: config.alpha_threshold,
            clean_min_neighbors: config.clean_min_neighbors,
        }
    }
}

impl Default for PixelOutline {
    fn default() -> Self {
        Self::new(&OutlineConfig::default())
    }
}

impl OutlineStrategy for PixelOutline {
    fn name(&self) -> &'static str {
        "pixel"
    }

    fn outline(&self, image: &PixelBuffer, stroke_px: u32) -> Result<PixelBuffer> {
        let (w, h) = (image.width, image.height);
        let mask = silhouette_mask(image, self.alpha_threshold);
        let cleaned = clean_mask(&mask, w, h, self.clean_min_neighbors);
        let dilated = dilate_mask(&cleaned, w, h, stroke_px);

        let pixels: Vec<RGBA8> = image
            .pixels
            .iter()
            .zip(cleaned.iter().zip(dilated.iter()))
            .map(|(&p, (&inside, &grown))| if grown && !inside { WHITE } else { p })
            .collect();

        PixelBuffer::new(w, h, Channels::Rgba, pixels)
    }
}

/// Outline through the ImageMagick CLI, reading and writing PNG over pipes.
///
/// Any failure of the subprocess falls back to [`PixelOutline`].
#[derive(Debug, Clone)]
pub struct MagickOutline {
    pub binary: String,
    pub alpha_threshold: u8,
    pub clean_min_neighbors: u8,
    pub fallback: PixelOutline,
}

impl MagickOutline {
    pub fn new(config: &OutlineConfig) -> Self {
        Self {
            binary: config.native_binary.clone(),
            alpha_threshold: config.alpha_threshold,
            clean_min_neighbors: config.clean_min_neighbors,
            fallback: PixelOutline::new(config),
        }
    }

    /// Whether `binary -version` runs successfully.
    pub fn is_installed(binary: &str) -> bool {
        Command::new(binary)
            .arg("-version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    }

    /// Same steps as [`PixelOutline`]: `alpha > threshold` silhouette, fill
    /// background pixels with enough foreground neighbours, dilate, keep only
    /// the ring outside the filled silhouette, then put the logo over it.
    fn args(&self, stroke_px: u32) -> Vec<String> {
        // -threshold keeps values strictly above the cut, so half a level up
        // excludes alpha == alpha_threshold
        let silhouette = format!("{:.2}%", (self.alpha_threshold as f64 + 0.5) * 100.0 / 255.0);
        // neighbour sum is scaled to count/8
        let neighbours = format!("{:.2}%", (self.clean_min_neighbors as f64 - 0.5).max(0.0) * 12.5);
        let disk = format!("Disk:{}", stroke_px);
        [
            "png:-",
            "(",
            "+clone",
            "-alpha",
            "extract",
            "-threshold",
            silhouette.as_str(),
            "-write",
            "mpr:silhouette",
            "-virtual-pixel",
            "black",
            "-define",
            "convolve:scale=0.125",
            "-morphology",
            "Convolve",
            "3x3:1,1,1,1,0,1,1,1,1",
            "-threshold",
            neighbours.as_str(),
            "mpr:silhouette",
            "-compose",
            "Lighten",
            "-composite",
            "-write",
            "mpr:inside",
            "-morphology",
            "Dilate",
            disk.as_str(),
            "mpr:inside",
            "-compose",
            "MinusSrc",
            "-composite",
            "-background",
            "white",
            "-alpha",
            "shape",
            ")",
            "+swap",
            "-background",
            "none",
            "-compose",
            "over",
            "-flatten",
            "png32:-",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }

    fn run(&self, image: &PixelBuffer, stroke_px: u32) -> Result<PixelBuffer> {
        let png = crate::codec::encode_png(&image.with_alpha())?;

        let mut child = Command::new(&self.binary)
            .args(self.args(stroke_px))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| LogoError::NativeTool(format!("failed to spawn {}: {}", self.binary, e)))?;
        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| LogoError::NativeTool("stdin not captured".to_string()))?;

        let (output, written) = std::thread::scope(|s| {
            let writer = s.spawn(move || stdin.write_all(&png));
            let output = child.wait_with_output();
            (output, writer.join())
        });

        match written {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(LogoError::NativeTool(format!("write to stdin: {}", e))),
            Err(_) => return Err(LogoError::NativeTool("stdin writer panicked".to_string())),
        }
        let output = output.map_err(|e| LogoError::NativeTool(e.to_string()))?;
        if !output.status.success() {
            return Err(LogoError::NativeTool(format!(
                "{} exited with {}: {}",
                self.binary,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let result = crate::codec::decode_raster(&output.stdout)
            .map_err(|e| LogoError::NativeTool(format!("unreadable output: {}", e)))?;
        if (result.width, result.height) != (image.width, image.height) {
            return Err(LogoError::NativeTool(format!(
                "output is {}x{}, expected {}x{}",
                result.width, result.height, image.width, image.height
            )));
        }
        Ok(result.with_alpha())
    }
}

impl OutlineStrategy for MagickOutline {
    fn name(&self) -> &'static str {
        "magick"
    }

    fn outline(&self, image: &PixelBuffer, stroke_px: u32) -> Result<PixelBuffer> {
        match self.run(image, stroke_px) {
            Ok(result) => Ok(result),
            Err(e) => {
                warn!(error = %e, "native outline failed, using built-in");
                self.fallback.outline(image, stroke_px)
            }
        }
    }
}

/// Picks the native tool when preferred and installed, otherwise the built-in.
pub fn detect_outline_strategy(config: &OutlineConfig) -> Box<dyn OutlineStrategy> {
    if config.prefer_native && MagickOutline::is_installed(&config.native_binary) {
        info!(binary = %config.native_binary, "using native outline tool");
        return Box::new(MagickOutline::new(config));
    }
    debug!("using built-in outline");
    Box::new(PixelOutline::new(config))
}

/// Adds a `stroke_px` white outline with the strategy selected for `config`.
pub fn add_white_outline(image: &PixelBuffer, stroke_px: u32, config: &OutlineConfig) -> Result<PixelBuffer> {
    detect_outline_strategy(config).outline(image, stroke_px)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLEAR: RGBA8 = RGBA8::new(0, 0, 0, 0);
    const GREEN: RGBA8 = RGBA8::new(10, 160, 60, 255);

    /// 40x40 transparent canvas with an opaque 20x20 square at (10, 10).
    fn square() -> PixelBuffer {
        let mut img = PixelBuffer::filled(40, 40, Channels::Rgba, CLEAR);
        for y in 10..30 {
            for x in 10..30 {
                img.set(x, y, GREEN);
            }
        }
        img
    }

    #[test]
    fn test_ring_width_follows_stroke() {
        let out = PixelOutline::default().outline(&square(), 4).unwrap();
        // left edge of the square is x=10
        assert_eq!(out.get(9, 20), Some(WHITE));
        assert_eq!(out.get(6, 20), Some(WHITE));
        assert_eq!(out.get(5, 20).unwrap().a, 0);
        // right edge is x=29
        assert_eq!(out.get(33, 20), Some(WHITE));
        assert_eq!(out.get(34, 20).unwrap().a, 0);
    }

    #[test]
    fn test_interior_untouched() {
        let img = square();
        let out = PixelOutline::default().outline(&img, 4).unwrap();
        for y in 10..30 {
            for x in 10..30 {
                assert_eq!(out.get(x, y), Some(GREEN));
            }
        }
    }

    #[test]
    fn test_ring_follows_shape_not_bounding_box() {
        let out = PixelOutline::default().outline(&square(), 4).unwrap();
        // diagonal from corner (10,10): offset (2,2) is ~2.8px away, (3,3) is ~4.2px
        assert_eq!(out.get(8, 8), Some(WHITE));
        assert_eq!(out.get(7, 7).unwrap().a, 0);
    }

    #[test]
    fn test_zero_stroke_is_identity() {
        let img = square();
        let out = PixelOutline::default().outline(&img, 0).unwrap();
        assert_eq!(out, img);
    }

    #[test]
    fn test_clean_fills_pinholes() {
        let mut img = square();
        img.set(20, 20, CLEAR);
        let out = PixelOutline::default().outline(&img, 2).unwrap();
        // the hole is part of the cleaned silhouette, so it is not painted
        assert_eq!(out.get(20, 20).unwrap().a, 0);

        let mask = silhouette_mask(&img, 20);
        assert!(!mask[20 * 40 + 20]);
        let cleaned = clean_mask(&mask, 40, 40, 7);
        assert!(cleaned[20 * 40 + 20]);
    }

    #[test]
    fn test_clean_leaves_edges_alone() {
        let mask = silhouette_mask(&square(), 20);
        let cleaned = clean_mask(&mask, 40, 40, 7);
        assert_eq!(mask, cleaned);
    }

    #[test]
    fn test_dilate_disk() {
        let mut mask = vec![false; 11 * 11];
        mask[5 * 11 + 5] = true;
        let dilated = dilate_mask(&mask, 11, 11, 3);
        assert!(dilated[5 * 11 + 8]);
        assert!(dilated[2 * 11 + 5]);
        assert!(!dilated[2 * 11 + 2]);
        assert!(!dilated[5 * 11 + 9]);
        assert_eq!(dilated.iter().filter(|&&v| v).count(), disk_offsets(3).len());
    }

    #[test]
    fn test_missing_binary_falls_back_to_pixel() {
        let config = OutlineConfig {
            prefer_native: true,
            native_binary: "logo-smart-no-such-binary".to_string(),
            ..OutlineConfig::default()
        };
        assert!(!MagickOutline::is_installed(&config.native_binary));
        assert_eq!(detect_outline_strategy(&config).name(), "pixel");

        let img = square();
        let via_magick = MagickOutline::new(&config).outline(&img, 4).unwrap();
        let via_pixel = PixelOutline::new(&config).outline(&img, 4).unwrap();
        assert_eq!(via_magick, via_pixel);
    }

    #[test]
    fn test_pure_config_stays_builtin() {
        assert_eq!(detect_outline_strategy(&OutlineConfig::pure()).name(), "pixel");
    }

    #[test]
    fn test_add_white_outline_two_px() {
        let out = add_white_outline(&square(), 2, &OutlineConfig::pure()).unwrap();
        assert_eq!(out.get(8, 20), Some(WHITE));
        assert_eq!(out.get(7, 20).unwrap().a, 0);
        assert_eq!(out.get(15, 15), Some(GREEN));
    }

    #[test]
    fn test_magick_args_contain_stroke() {
        let args = MagickOutline::new(&OutlineConfig::default()).args(2);
        assert!(args.contains(&"Disk:2".to_string()));
        assert_eq!(args.first().map(String::as_str), Some("png:-"));
        assert_eq!(args.last().map(String::as_str), Some("png32:-"));
    }

    #[test]
    fn test_magick_args_match_pixel_steps() {
        let args = MagickOutline::new(&OutlineConfig::default()).args(4);
        let thresholds: Vec<&str> = args
            .windows(2)
            .filter(|w| w[0] == "-threshold")
            .map(|w| w[1].as_str())
            .collect();
        // alpha 20 is background, 21 is foreground
        assert_eq!(thresholds[0], "8.04%");
        let cut = thresholds[0].trim_end_matches('%').parse::<f64>().unwrap() * 2.55;
        assert!(cut > 20.0 && cut < 21.0);
        // seven of eight neighbours fill a pixel, six do not
        assert_eq!(thresholds[1], "81.25%");
        // the stroke layer is the dilation minus the silhouette
        let minus = args.iter().position(|a| a == "MinusSrc").unwrap();
        let dilate = args.iter().position(|a| a == "Dilate").unwrap();
        assert!(dilate < minus);
        assert_eq!(args[dilate + 2], "mpr:inside");
        assert!(!args.contains(&"Close".to_string()));
    }
}
