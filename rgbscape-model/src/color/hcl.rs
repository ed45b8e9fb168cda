//! L*a*b* ↔ HCL (polar Lab).

/// Convert `(L, a, b)` to `(hue 0-360, chroma, lightness)`.
pub fn lab_to_hcl(l: f32, a: f32, b: f32) -> (f32, f32, f32) {
    let chroma = (a * a + b * b).sqrt();
    let hue = if chroma <= f32::EPSILON {
        0.0
    } else {
        b.atan2(a).to_degrees().rem_euclid(360.0)
    };
    (hue, chroma, l)
}

/// Convert `(hue in degrees, chroma, lightness)` to `(L, a, b)`.
pub fn hcl_to_lab(hue: f32, chroma: f32, lightness: f32) -> (f32, f32, f32) {
    let (sin, cos) = hue.to_radians().sin_cos();
    (lightness, chroma * cos, chroma * sin)
}
