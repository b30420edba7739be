//! Display-size buckets for email signatures.
//!
//! A logo's post-trim aspect ratio picks a fixed display width from a step
//! table; the height follows from the ratio. Fixed pixel sizes keep Outlook
//! and other clients from rescaling logos unpredictably.

use serde::{Deserialize, Serialize};

/// Display box in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogoBox {
    pub w: u32,
    pub h: u32,
}

/// One step of the table: ratios up to `max_ratio` get `width`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SizeBucket {
    pub max_ratio: f64,
    pub width: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizeTable {
    /// Width for ratios strictly below the first bucket boundary.
    pub narrow_width: u32,
    /// First boundary; ratios below it are "narrow".
    pub narrow_below: f64,
    /// Ascending buckets, upper bound inclusive.
    pub buckets: Vec<SizeBucket>,
    /// Width for ratios above the last bucket.
    pub widest: u32,
}

const CANONICAL: [(f64, u32); 11] = [
    (1.18, 64),
    (1.7, 96),
    (2.4, 105),
    (3.4, 117),
    (4.4, 126),
    (5.4, 136),
    (6.4, 145),
    (7.4, 154),
    (8.4, 164),
    (9.4, 173),
    (f64::INFINITY, 180),
];

const COMPACT: [(f64, u32); 11] = [
    (1.18, 64),
    (1.7, 88),
    (2.4, 96),
    (3.4, 106),
    (4.4, 114),
    (5.4, 122),
    (6.4, 130),
    (7.4, 138),
    (8.4, 146),
    (9.4, 154),
    (f64::INFINITY, 160),
];

impl SizeTable {
    fn from_steps(steps: &[(f64, u32)]) -> Self {
        let buckets: Vec<SizeBucket> = steps
            .iter()
            .filter(|(max, _)| max.is_finite())
            .map(|&(max_ratio, width)| SizeBucket { max_ratio, width })
            .collect();
        let widest = steps.last().map(|&(_, w)| w).unwrap_or(180);
        Self {
            narrow_width: 40,
            narrow_below: 0.85,
            buckets,
            widest,
        }
    }

    /// Slightly smaller widths, used by earlier signature layouts.
    pub fn compact() -> Self {
        Self::from_steps(&COMPACT)
    }

    pub fn width_for(&self, ar: f64) -> u32 {
        if ar < self.narrow_below {
            return self.narrow_width;
        }
        self.buckets
            .iter()
            .find(|b| ar <= b.max_ratio)
            .map(|b| b.width)
            .unwrap_or(self.widest)
    }

    /// Width from the bucket table, height `round(w / ar)`.
    ///
    /// Ratios so wide that the height would round to zero get a 1px height.
    pub fn box_for(&self, ar: f64) -> LogoBox {
        let ar = sanitize_ratio(ar);
        let w = self.width_for(ar);
        let h = (w as f64 / ar).round().max(1.0) as u32;
        LogoBox { w, h }
    }
}

impl Default for SizeTable {
    fn default() -> Self {
        Self::from_steps(&CANONICAL)
    }
}

/// Ratios that cannot describe a real image are treated as square.
fn sanitize_ratio(ar: f64) -> f64 {
    if ar.is_finite() && ar > 0.0 { ar } else { 1.0 }
}

/// Box for `ar` using the canonical table.
pub fn box_for_aspect_ratio(ar: f64) -> LogoBox {
    SizeTable::default().box_for(ar)
}
