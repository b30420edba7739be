//! Decoded raster image with bounds-checked pixel access.
//!
//! Every stage of the pipeline takes a `&PixelBuffer` and returns a new one,
//! so buffers are never shared between stages.

use crate::error::{LogoError, Result};
use rgb::RGBA8;

/// Channel layout the image was decoded with.
///
/// Pixels are always stored as RGBA; `Rgb` records that the source had no
/// alpha channel (every pixel is opaque).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channels {
    Rgb,
    Rgba,
}

impl Channels {
    pub fn count(self) -> usize {
        match self {
            Channels::Rgb => 3,
            Channels::Rgba => 4,
        }
    }
}

/// Axis-aligned pixel rectangle, inclusive of `x`/`y`, exclusive of the far edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PixelBuffer {
    pub width: u32,
    pub height: u32,
    pub channels: Channels,
    pub pixels: Vec<RGBA8>,
}

impl PixelBuffer {
    pub fn new(width: u32, height: u32, channels: Channels, pixels: Vec<RGBA8>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(LogoError::InvalidInput(format!(
                "image dimensions must be non-zero, got {}x{}",
                width, height
            )));
        }
        let expected = width as usize * height as usize;
        if pixels.len() != expected {
            return Err(LogoError::InvalidInput(format!(
                "pixel count {} does not match {}x{}",
                pixels.len(),
                width,
                height
            )));
        }
        Ok(Self {
            width,
            height,
            channels,
            pixels,
        })
    }

    /// Image of a single color. Dimensions are raised to at least 1x1.
    pub fn filled(width: u32, height: u32, channels: Channels, color: RGBA8) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        Self {
            width,
            height,
            channels,
            pixels: vec![color; width as usize * height as usize],
        }
    }

    pub fn has_alpha(&self) -> bool {
        self.channels == Channels::Rgba
    }

    pub fn aspect_ratio(&self) -> f64 {
        self.width as f64 / self.height as f64
    }

    /// Length of the raw buffer for the declared channel layout.
    pub fn data_len(&self) -> usize {
        self.width as usize * self.height as usize * self.channels.count()
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    pub fn get(&self, x: u32, y: u32) -> Option<RGBA8> {
        if x < self.width && y < self.height {
            Some(self.pixels[self.index(x, y)])
        } else {
            None
        }
    }

    /// Pixel at `(x, y)` with both coordinates clamped into the image.
    pub fn get_clamped(&self, x: i64, y: i64) -> RGBA8 {
        let cx = x.clamp(0, self.width as i64 - 1) as u32;
        let cy = y.clamp(0, self.height as i64 - 1) as u32;
        self.pixels[self.index(cx, cy)]
    }

    /// Writes a pixel; out-of-bounds writes are ignored.
    pub fn set(&mut self, x: u32, y: u32, pixel: RGBA8) {
        if x < self.width && y < self.height {
            let idx = self.index(x, y);
            self.pixels[idx] = pixel;
        }
    }

    /// The four corner pixels: top-left, top-right, bottom-left, bottom-right.
    pub fn corners(&self) -> [RGBA8; 4] {
        let r = self.width as i64 - 1;
        let b = self.height as i64 - 1;
        [
            self.get_clamped(0, 0),
            self.get_clamped(r, 0),
            self.get_clamped(0, b),
            self.get_clamped(r, b),
        ]
    }

    pub fn center(&self) -> RGBA8 {
        self.get_clamped((self.width / 2) as i64, (self.height / 2) as i64)
    }

    /// Copy of the given region, clipped to the image.
    pub fn crop(&self, rect: Rect) -> Result<PixelBuffer> {
        let x0 = rect.x.min(self.width);
        let y0 = rect.y.min(self.height);
        let x1 = rect.right().min(self.width);
        let y1 = rect.bottom().min(self.height);
        if x1 <= x0 || y1 <= y0 {
            return Err(LogoError::DegenerateGeometry {
                width: self.width,
                height: self.height,
            });
        }

        let mut pixels = Vec::with_capacity(((x1 - x0) * (y1 - y0)) as usize);
        for y in y0..y1 {
            let row = self.index(x0, y);
            pixels.extend_from_slice(&self.pixels[row..row + (x1 - x0) as usize]);
        }
        PixelBuffer::new(x1 - x0, y1 - y0, self.channels, pixels)
    }

    /// Same pixels, declared as carrying alpha.
    pub fn with_alpha(&self) -> PixelBuffer {
        PixelBuffer {
            channels: Channels::Rgba,
            ..self.clone()
        }
    }

    pub fn to_rgba_image(&self) -> image::RgbaImage {
        let mut raw = Vec::with_capacity(self.pixels.len() * 4);
        for p in &self.pixels {
            raw.extend_from_slice(&[p.r, p.g, p.b, p.a]);
        }
        image::RgbaImage::from_raw(self.width, self.height, raw)
            .unwrap_or_else(|| image::RgbaImage::new(self.width, self.height))
    }

    pub fn from_rgba_image(img: &image::RgbaImage, channels: Channels) -> Result<PixelBuffer> {
        let pixels: Vec<RGBA8> = img
            .pixels()
            .map(|p| RGBA8::new(p[0], p[1], p[2], p[3]))
            .collect();
        PixelBuffer::new(img.width(), img.height(), channels, pixels)
    }
}
