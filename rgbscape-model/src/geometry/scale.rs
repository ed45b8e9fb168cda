//! Horizontal/vertical scale factors

use std::ops::{Add, Div, Mul, Sub};

use serde::{Deserialize, Serialize};

use super::approx_eq;

/// Scale factors applied to sizes and locations
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Scale {
    pub horizontal: f32,
    pub vertical: f32,
}

impl Scale {
    pub const IDENTITY: Self = Self {
        horizontal: 1.0,
        vertical: 1.0,
    };
    pub const INVALID: Self = Self {
        horizontal: f32::NAN,
        vertical: f32::NAN,
    };

    pub const fn new(horizontal: f32, vertical: f32) -> Self {
        Self {
            horizontal,
            vertical,
        }
    }

    pub const fn uniform(factor: f32) -> Self {
        Self::new(factor, factor)
    }

    pub fn is_valid(&self) -> bool {
        !self.horizontal.is_nan() && !self.vertical.is_nan()
    }
}

impl Default for Scale {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl PartialEq for Scale {
    fn eq(&self, other: &Self) -> bool {
        approx_eq(self.horizontal, other.horizontal) && approx_eq(self.vertical, other.vertical)
    }
}

impl Add<f32> for Scale {
    type Output = Scale;

    fn add(self, rhs: f32) -> Scale {
        Scale::new(self.horizontal + rhs, self.vertical + rhs)
    }
}

impl Sub<f32> for Scale {
    type Output = Scale;

    fn sub(self, rhs: f32) -> Scale {
        Scale::new(self.horizontal - rhs, self.vertical - rhs)
    }
}

impl Mul<f32> for Scale {
    type Output = Scale;

    fn mul(self, rhs: f32) -> Scale {
        Scale::new(self.horizontal * rhs, self.vertical * rhs)
    }
}

impl Div<f32> for Scale {
    type Output = Scale;

    fn div(self, rhs: f32) -> Scale {
        if rhs == 0.0 {
            return Scale::INVALID;
        }
        Scale::new(self.horizontal / rhs, self.vertical / rhs)
    }
}
