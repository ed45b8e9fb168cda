//! 2D point

use std::ops::{Add, Div, Mul, Neg, Sub};

use serde::{Deserialize, Serialize};

use super::{approx_eq, Rotation, Scale};

/// Location on a surface or relative to a parent
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ORIGIN: Self = Self { x: 0.0, y: 0.0 };
    /// Result of a division by zero
    pub const INVALID: Self = Self {
        x: f32::NAN,
        y: f32::NAN,
    };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// False if any component is NaN
    pub fn is_valid(&self) -> bool {
        !self.x.is_nan() && !self.y.is_nan()
    }

    /// Rotate this point around `origin`
    pub fn rotate(self, rotation: Rotation, origin: Point) -> Point {
        let (sin, cos) = rotation.radians().sin_cos();
        let dx = self.x - origin.x;
        let dy = self.y - origin.y;
        Point::new(
            origin.x + dx * cos - dy * sin,
            origin.y + dx * sin + dy * cos,
        )
    }
}

impl PartialEq for Point {
    fn eq(&self, other: &Self) -> bool {
        approx_eq(self.x, other.x) && approx_eq(self.y, other.y)
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Neg for Point {
    type Output = Point;

    fn neg(self) -> Point {
        Point::new(-self.x, -self.y)
    }
}

impl Mul<f32> for Point {
    type Output = Point;

    fn mul(self, rhs: f32) -> Point {
        Point::new(self.x * rhs, self.y * rhs)
    }
}

impl Div<f32> for Point {
    type Output = Point;

    fn div(self, rhs: f32) -> Point {
        if rhs == 0.0 {
            return Point::INVALID;
        }
        Point::new(self.x / rhs, self.y / rhs)
    }
}

impl Mul<Scale> for Point {
    type Output = Point;

    fn mul(self, rhs: Scale) -> Point {
        Point::new(self.x * rhs.horizontal, self.y * rhs.vertical)
    }
}

impl Div<Scale> for Point {
    type Output = Point;

    fn div(self, rhs: Scale) -> Point {
        if rhs.horizontal == 0.0 || rhs.vertical == 0.0 {
            return Point::INVALID;
        }
        Point::new(self.x / rhs.horizontal, self.y / rhs.vertical)
    }
}
