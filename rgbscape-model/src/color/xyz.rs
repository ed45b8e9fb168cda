//! sRGB ↔ CIE XYZ (D65 white, 0-100 scale).

fn to_linear(c: f32) -> f32 {
    if c > 0.04045 {
        ((c + 0.055) / 1.055).powf(2.4)
    } else {
        c / 12.92
    }
}

fn from_linear(c: f32) -> f32 {
    if c > 0.003_130_8 {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    } else {
        12.92 * c
    }
}

/// Convert normalized sRGB to XYZ on the 0-100 scale.
pub fn rgb_to_xyz(r: f32, g: f32, b: f32) -> (f32, f32, f32) {
    let r = to_linear(r) * 100.0;
    let g = to_linear(g) * 100.0;
    let b = to_linear(b) * 100.0;

    (
        r * 0.412_456_4 + g * 0.357_576_1 + b * 0.180_437_5,
        r * 0.212_672_9 + g * 0.715_152_2 + b * 0.072_175,
        r * 0.019_333_9 + g * 0.119_192 + b * 0.950_304_1,
    )
}

/// Convert XYZ (0-100 scale) to sRGB. The result is not clamped.
pub fn xyz_to_rgb(x: f32, y: f32, z: f32) -> (f32, f32, f32) {
    let x = x / 100.0;
    let y = y / 100.0;
    let z = z / 100.0;

    let r = x * 3.240_454_2 + y * -1.537_138_5 + z * -0.498_531_4;
    let g = x * -0.969_266 + y * 1.876_010_8 + z * 0.041_556;
    let b = x * 0.055_643_4 + y * -0.204_025_9 + z * 1.057_225_2;

    (from_linear(r), from_linear(g), from_linear(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_white_is_d65() {
        let (x, y, z) = rgb_to_xyz(1.0, 1.0, 1.0);
        assert!((x - 95.047).abs() < 0.01, "x = {x}");
        assert!((y - 100.0).abs() < 0.01, "y = {y}");
        assert!((z - 108.883).abs() < 0.02, "z = {z}");
    }

    #[test]
    fn test_black_is_zero() {
        assert_eq!(rgb_to_xyz(0.0, 0.0, 0.0), (0.0, 0.0, 0.0));
    }

    #[test]
    fn test_round_trip() {
        let (x, y, z) = rgb_to_xyz(0.2, 0.5, 0.8);
        let (r, g, b) = xyz_to_rgb(x, y, z);
        assert!((r - 0.2).abs() < 1e-4);
        assert!((g - 0.5).abs() < 1e-4);
        assert!((b - 0.8).abs() < 1e-4);
    }
}
