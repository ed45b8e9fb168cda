//! Geometry value types used to place devices and LEDs on a surface.
//!
//! All types are `Copy` values with component-wise operators. Equality is
//! tolerance based. Dividing by zero yields an `INVALID` sentinel (NaN
//! components) instead of panicking, so layout code can skip the value.

mod point;
mod rectangle;
mod rotation;
mod scale;
mod size;

pub use point::Point;
pub use rectangle::Rectangle;
pub use rotation::Rotation;
pub use scale::Scale;
pub use size::Size;

/// Absolute tolerance for comparing geometry components
pub const TOLERANCE: f32 = 1e-4;

/// Tolerant float comparison; two NaNs compare equal so sentinels match.
pub(crate) fn approx_eq(a: f32, b: f32) -> bool {
    a == b || (a.is_nan() && b.is_nan()) || (a - b).abs() <= TOLERANCE
}
