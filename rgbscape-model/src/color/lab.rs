//! CIE XYZ ↔ L*a*b* referenced to the D65 white point.

/// D65 reference white on the 0-100 scale
pub const D65_WHITE: (f32, f32, f32) = (95.047, 100.0, 108.883);

const EPSILON: f32 = 0.008_856;
const KAPPA: f32 = 7.787;
const OFFSET: f32 = 16.0 / 116.0;

fn pivot(t: f32) -> f32 {
    if t > EPSILON {
        t.cbrt()
    } else {
        KAPPA * t + OFFSET
    }
}

fn unpivot(f: f32) -> f32 {
    let cube = f * f * f;
    if cube > EPSILON {
        cube
    } else {
        (f - OFFSET) / KAPPA
    }
}

/// Convert XYZ (0-100) to `(L, a, b)`.
pub fn xyz_to_lab(x: f32, y: f32, z: f32) -> (f32, f32, f32) {
    let fx = pivot(x / D65_WHITE.0);
    let fy = pivot(y / D65_WHITE.1);
    let fz = pivot(z / D65_WHITE.2);

    (116.0 * fy - 16.0, 500.0 * (fx - fy), 200.0 * (fy - fz))
}

/// Convert `(L, a, b)` to XYZ (0-100).
pub fn lab_to_xyz(l: f32, a: f32, b: f32) -> (f32, f32, f32) {
    let fy = (l + 16.0) / 116.0;
    let fx = a / 500.0 + fy;
    let fz = fy - b / 200.0;

    (
        unpivot(fx) * D65_WHITE.0,
        unpivot(fy) * D65_WHITE.1,
        unpivot(fz) * D65_WHITE.2,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_white_point() {
        let (l, a, b) = xyz_to_lab(D65_WHITE.0, D65_WHITE.1, D65_WHITE.2);
        assert!((l - 100.0).abs() < 1e-3);
        assert!(a.abs() < 1e-3);
        assert!(b.abs() < 1e-3);
    }

    #[test]
    fn test_dark_values_use_linear_segment() {
        let (x, y, z) = lab_to_xyz(2.0, 0.0, 0.0);
        let (l, a, b) = xyz_to_lab(x, y, z);
        assert!((l - 2.0).abs() < 1e-3);
        assert!(a.abs() < 1e-3);
        assert!(b.abs() < 1e-3);
    }
}
