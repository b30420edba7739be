//! Small color-math helpers shared by the classifier, badge detector and
//! background remover.

use rgb::RGBA8;

/// Euclidean distance over RGB, alpha ignored.
#[inline]
pub fn rgb_distance(a: RGBA8, b: RGBA8) -> f64 {
    let dr = a.r as f64 - b.r as f64;
    let dg = a.g as f64 - b.g as f64;
    let db = a.b as f64 - b.b as f64;
    (dr * dr + dg * dg + db * db).sqrt()
}

/// HSV-style saturation `(max - min) / max`, 0 for black.
#[inline]
pub fn saturation(p: RGBA8) -> f64 {
    let mx = p.r.max(p.g).max(p.b) as f64;
    let mn = p.r.min(p.g).min(p.b) as f64;
    if mx > 0.0 { (mx - mn) / mx } else { 0.0 }
}

#[inline]
pub fn brightness(p: RGBA8) -> f64 {
    (p.r as f64 + p.g as f64 + p.b as f64) / 3.0
}

/// Rounded per-channel mean, alpha included.
pub fn average(pixels: &[RGBA8]) -> RGBA8 {
    if pixels.is_empty() {
        return RGBA8::new(0, 0, 0, 0);
    }
    let (mut r, mut g, mut b, mut a) = (0u64, 0u64, 0u64, 0u64);
    for p in pixels {
        r += p.r as u64;
        g += p.g as u64;
        b += p.b as u64;
        a += p.a as u64;
    }
    let n = pixels.len() as f64;
    let round = |sum: u64| (sum as f64 / n).round() as u8;
    RGBA8::new(round(r), round(g), round(b), round(a))
}

/// True when every pixel is within `tolerance` of the first one on each RGB channel.
pub fn all_similar(pixels: &[RGBA8], tolerance: u8) -> bool {
    let Some(base) = pixels.first() else {
        return true;
    };
    pixels.iter().skip(1).all(|p| {
        p.r.abs_diff(base.r) <= tolerance
            && p.g.abs_diff(base.g) <= tolerance
            && p.b.abs_diff(base.b) <= tolerance
    })
}

/// Lowercase `rrggbb` without a leading `#`.
pub fn to_hex(r: u8, g: u8, b: u8) -> String {
    format!("{:02x}{:02x}{:02x}", r, g, b)
}
