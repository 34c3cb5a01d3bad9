//! Scalp-map helpers: 2-D interpolation and colour scales.
//!
//! Kept free of any drawing code so the geometry can be tested headless.
use plotters::style::RGBColor;

use crate::montage::project_2d;

/// Inverse-distance-weighted interpolation of `values` at `points` onto a
/// `res × res` grid spanning `[-radius, radius]²`.
///
/// Cells outside the head circle are `None`. Row 0 is the bottom edge
/// (`y = -radius`).
pub fn interpolate_idw(points: &[[f64; 2]], values: &[f64], res: usize, radius: f64) -> Vec<Vec<Option<f64>>> {
    let step = if res > 1 { 2.0 * radius / (res - 1) as f64 } else { 0.0 };
    (0..res)
        .map(|iy| {
            let y = -radius + iy as f64 * step;
            (0..res)
                .map(|ix| {
                    let x = -radius + ix as f64 * step;
                    if x * x + y * y > radius * radius {
                        return None;
                    }
                    idw_at(points, values, [x, y])
                })
                .collect()
        })
        .collect()
}

fn idw_at(points: &[[f64; 2]], values: &[f64], at: [f64; 2]) -> Option<f64> {
    let (mut num, mut den) = (0.0, 0.0);
    for (p, &v) in points.iter().zip(values) {
        let d2 = (p[0] - at[0]).powi(2) + (p[1] - at[1]).powi(2);
        if d2 < 1e-18 {
            return Some(v);
        }
        let w = 1.0 / d2;
        num += w * v;
        den += w;
    }
    (den > 0.0).then(|| num / den)
}

/// Project the channels that have a position; returns `(channel index, xy)`.
pub fn projected(positions: &[Option<[f64; 3]>]) -> Vec<(usize, [f64; 2])> {
    positions
        .iter()
        .enumerate()
        .filter_map(|(i, p)| p.as_ref().map(|p| (i, project_2d(p))))
        .collect()
}

/// Head radius in projected units: the outermost electrode, at least the equator.
pub fn head_radius(points: &[[f64; 2]]) -> f64 {
    points
        .iter()
        .map(|p| p[0].hypot(p[1]))
        .fold(1.0_f64, f64::max)
        * 1.05
}

/// Diverging blue–white–red scale for `v` in `[-1, 1]` (clamped).
pub fn rdbu(v: f64) -> RGBColor {
    const BLUE: (f64, f64, f64) = (33.0, 102.0, 172.0);
    const WHITE: (f64, f64, f64) = (247.0, 247.0, 247.0);
    const RED: (f64, f64, f64) = (178.0, 24.0, 43.0);
    let v = if v.is_nan() { 0.0 } else { v.clamp(-1.0, 1.0) };
    let (from, to, t) = if v < 0.0 { (WHITE, BLUE, -v) } else { (WHITE, RED, v) };
    let lerp = |a: f64, b: f64| (a + (b - a) * t).round() as u8;
    RGBColor(lerp(from.0, to.0), lerp(from.1, to.1), lerp(from.2, to.2))
}

/// Colour from electrode position (x→R, y→G, z→B), grey without one.
pub fn spatial_color(pos: Option<[f64; 3]>) -> RGBColor {
    match pos {
        Some([x, y, z]) => {
            let c = |v: f64| (((v.clamp(-1.0, 1.0) + 1.0) / 2.0) * 220.0).round() as u8;
            RGBColor(c(x), c(y), c(z))
        }
        None => RGBColor(128, 128, 128),
    }
}

/// Symmetric colour limit: the largest absolute value, never zero.
pub fn symmetric_limit(values: &[f64]) -> f64 {
    let m = values.iter().filter(|v| v.is_finite()).fold(0.0_f64, |a, v| a.max(v.abs()));
    if m > 0.0 { m } else { 1.0 }
}
