//! 2D size

use std::ops::{Add, Div, Mul, Sub};

use serde::{Deserialize, Serialize};

use super::{approx_eq, Scale};

/// Width and height
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const ZERO: Self = Self {
        width: 0.0,
        height: 0.0,
    };
    /// Result of a division by zero
    pub const INVALID: Self = Self {
        width: f32::NAN,
        height: f32::NAN,
    };

    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Square size
    pub const fn uniform(edge: f32) -> Self {
        Self::new(edge, edge)
    }

    /// False if any component is NaN
    pub fn is_valid(&self) -> bool {
        !self.width.is_nan() && !self.height.is_nan()
    }

    pub fn area(&self) -> f32 {
        self.width * self.height
    }
}

impl PartialEq for Size {
    fn eq(&self, other: &Self) -> bool {
        approx_eq(self.width, other.width) && approx_eq(self.height, other.height)
    }
}

impl Add for Size {
    type Output = Size;

    fn add(self, rhs: Size) -> Size {
        Size::new(self.width + rhs.width, self.height + rhs.height)
    }
}

impl Sub for Size {
    type Output = Size;

    fn sub(self, rhs: Size) -> Size {
        Size::new(self.width - rhs.width, self.height - rhs.height)
    }
}

impl Mul<f32> for Size {
    type Output = Size;

    fn mul(self, rhs: f32) -> Size {
        Size::new(self.width * rhs, self.height * rhs)
    }
}

impl Div<f32> for Size {
    type Output = Size;

    fn div(self, rhs: f32) -> Size {
        if rhs == 0.0 {
            return Size::INVALID;
        }
        Size::new(self.width / rhs, self.height / rhs)
    }
}

impl Mul<Scale> for Size {
    type Output = Size;

    fn mul(self, rhs: Scale) -> Size {
        Size::new(self.width * rhs.horizontal, self.height * rhs.vertical)
    }
}

impl Div<Scale> for Size {
    type Output = Size;

    fn div(self, rhs: Scale) -> Size {
        if rhs.horizontal == 0.0 || rhs.vertical == 0.0 {
            return Size::INVALID;
        }
        Size::new(self.width / rhs.horizontal, self.height / rhs.vertical)
    }
}
