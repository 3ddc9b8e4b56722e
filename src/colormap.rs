use plotters::style::RGBColor;

// ColorBrewer RdYlBu, 11 classes, red (low) to blue (high).
const RD_YL_BU: [(u8, u8, u8); 11] = [
    (165, 0, 38),
    (215, 48, 39),
    (244, 109, 67),
    (253, 174, 97),
    (254, 224, 144),
    (255, 255, 191),
    (224, 243, 248),
    (171, 217, 233),
    (116, 173, 209),
    (69, 117, 180),
    (49, 54, 149),
];

/// Linear position of `value` inside `[lo, hi]`, clamped to `[0, 1]`.
/// A degenerate range maps everything to the midpoint.
pub fn normalize(value: f64, lo: f64, hi: f64) -> f64 {
    let span = hi - lo;
    if !span.is_finite() || span.abs() < f64::EPSILON {
        return 0.5;
    }
    ((value - lo) / span).clamp(0.0, 1.0)
}

/// Diverging red-yellow-blue color at `t` in `[0, 1]`.
pub fn rd_yl_bu(t: f64) -> RGBColor {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.5 };
    let scaled = t * (RD_YL_BU.len() - 1) as f64;
    let i = (scaled.floor() as usize).min(RD_YL_BU.len() - 2);
    let frac = scaled - i as f64;
    let (r0, g0, b0) = RD_YL_BU[i];
    let (r1, g1, b1) = RD_YL_BU[i + 1];
    RGBColor(lerp(r0, r1, frac), lerp(g0, g1, frac), lerp(b0, b1, frac))
}

fn lerp(a: u8, b: u8, t: f64) -> u8 {
    (a as f64 + (b as f64 - a as f64) * t).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_and_midpoint() {
        assert_eq!(rd_yl_bu(0.0), RGBColor(165, 0, 38));
        assert_eq!(rd_yl_bu(1.0), RGBColor(49, 54, 149));
        assert_eq!(rd_yl_bu(0.5), RGBColor(255, 255, 191));
        assert_eq!(rd_yl_bu(-3.0), rd_yl_bu(0.0));
        assert_eq!(rd_yl_bu(f64::NAN), rd_yl_bu(0.5));
    }

    #[test]
    fn interpolates_between_stops() {
        // halfway between the first two stops
        assert_eq!(rd_yl_bu(0.05), RGBColor(190, 24, 39));
    }

    #[test]
    fn normalize_clamps_and_handles_flat_range() {
        assert_eq!(normalize(5.0, 0.0, 10.0), 0.5);
        assert_eq!(normalize(-1.0, 0.0, 10.0), 0.0);
        assert_eq!(normalize(3.0, 3.0, 3.0), 0.5);
    }
}
