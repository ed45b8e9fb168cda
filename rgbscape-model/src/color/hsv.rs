//! RGB ↔ HSV conversions.

/// Convert normalized RGB to `(hue 0-360, saturation 0-1, value 0-1)`.
///
/// Achromatic input (r == g == b) yields hue 0 and saturation 0.
pub fn rgb_to_hsv(r: f32, g: f32, b: f32) -> (f32, f32, f32) {
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let hue = if delta <= f32::EPSILON {
        0.0
    } else if max == r {
        60.0 * ((g - b) / delta)
    } else if max == g {
        60.0 * ((b - r) / delta + 2.0)
    } else {
        60.0 * ((r - g) / delta + 4.0)
    };
    let hue = if hue < 0.0 { hue + 360.0 } else { hue };

    let saturation = if max <= 0.0 { 0.0 } else { delta / max };

    (hue, saturation, max)
}

/// Convert `(hue in degrees, saturation 0-1, value 0-1)` to normalized RGB.
///
/// Hue wraps around a full turn; a non-finite hue is treated as 0.
pub fn hsv_to_rgb(hue: f32, saturation: f32, value: f32) -> (f32, f32, f32) {
    if saturation <= 0.0 {
        return (value, value, value);
    }

    let hue = if hue.is_finite() {
        hue.rem_euclid(360.0)
    } else {
        0.0
    };
    let hh = hue / 60.0;
    let sector = hh.floor();
    let fraction = hh - sector;

    let p = value * (1.0 - saturation);
    let q = value * (1.0 - saturation * fraction);
    let t = value * (1.0 - saturation * (1.0 - fraction));

    // Anything past 5.999.. (float error at 360) falls into the last sector
    match sector as i32 {
        0 => (value, t, p),
        1 => (q, value, p),
        2 => (p, value, t),
        3 => (p, q, value),
        4 => (t, p, value),
        _ => (value, p, q),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: (f32, f32, f32), b: (f32, f32, f32)) -> bool {
        (a.0 - b.0).abs() < 1e-5 && (a.1 - b.1).abs() < 1e-5 && (a.2 - b.2).abs() < 1e-5
    }

    #[test]
    fn test_primaries() {
        assert!(close(rgb_to_hsv(1.0, 0.0, 0.0), (0.0, 1.0, 1.0)));
        assert!(close(rgb_to_hsv(0.0, 1.0, 0.0), (120.0, 1.0, 1.0)));
        assert!(close(rgb_to_hsv(0.0, 0.0, 1.0), (240.0, 1.0, 1.0)));
        assert!(close(rgb_to_hsv(1.0, 0.0, 1.0), (300.0, 1.0, 1.0)));
    }

    #[test]
    fn test_sector_boundaries() {
        assert!(close(hsv_to_rgb(60.0, 1.0, 1.0), (1.0, 1.0, 0.0)));
        assert!(close(hsv_to_rgb(180.0, 1.0, 1.0), (0.0, 1.0, 1.0)));
        assert!(close(hsv_to_rgb(300.0, 1.0, 1.0), (1.0, 0.0, 1.0)));
        assert!(close(hsv_to_rgb(360.0, 1.0, 1.0), (1.0, 0.0, 0.0)));
        assert!(close(hsv_to_rgb(359.9999, 1.0, 1.0), (1.0, 0.0, 0.0)));
    }

    #[test]
    fn test_zero_saturation_short_circuits() {
        assert_eq!(hsv_to_rgb(f32::NAN, 0.0, 0.3), (0.3, 0.3, 0.3));
        assert_eq!(hsv_to_rgb(123.0, 0.0, 1.0), (1.0, 1.0, 1.0));
    }

    #[test]
    fn test_non_finite_hue() {
        assert!(close(hsv_to_rgb(f32::INFINITY, 1.0, 1.0), (1.0, 0.0, 0.0)));
    }
}
