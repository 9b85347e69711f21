//! Shared colors and the continuous time color map.

/// Bars of individual explained variance
pub const VARIANCE_BAR: (u8, u8, u8) = (91, 155, 213);
/// Cumulative explained variance line
pub const CUMULATIVE_LINE: (u8, u8, u8) = (237, 125, 49);
/// Loading bars by sign
pub const POSITIVE_LOADING: (u8, u8, u8) = (52, 152, 219);
pub const NEGATIVE_LOADING: (u8, u8, u8) = (231, 76, 60);

// Sampled from the plasma color map at equal steps
const PLASMA: [(u8, u8, u8); 9] = [
    (13, 8, 135),
    (75, 3, 161),
    (125, 3, 168),
    (168, 34, 150),
    (203, 70, 121),
    (229, 107, 93),
    (248, 148, 65),
    (253, 195, 40),
    (240, 249, 33),
];

/// Plasma color for `t` in [0, 1] (clamped), linearly interpolated.
pub fn plasma(t: f64) -> (u8, u8, u8) {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    let scaled = t * (PLASMA.len() - 1) as f64;
    let lower = (scaled.floor() as usize).min(PLASMA.len() - 2);
    let frac = scaled - lower as f64;

    let (a, b) = (PLASMA[lower], PLASMA[lower + 1]);
    let mix = |x: u8, y: u8| (x as f64 + (y as f64 - x as f64) * frac).round() as u8;
    (mix(a.0, b.0), mix(a.1, b.1), mix(a.2, b.2))
}

/// Position of `value` within `[min, max]`, 0.5 when the range is empty.
pub fn normalize(value: f64, min: f64, max: f64) -> f64 {
    if max > min {
        (value - min) / (max - min)
    } else {
        0.5
    }
}
