//! Angle normalized to one full turn

use std::f32::consts::TAU;
use std::ops::{Add, Div, Mul, Neg, Sub};

use serde::{Deserialize, Serialize};

use super::TOLERANCE;

/// Rotation in degrees (`[0, 360)`) with the matching radians
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(from = "f32", into = "f32")]
pub struct Rotation {
    degrees: f32,
    radians: f32,
}

impl Rotation {
    pub const NONE: Self = Self {
        degrees: 0.0,
        radians: 0.0,
    };
    /// Result of a division by zero
    pub const INVALID: Self = Self {
        degrees: f32::NAN,
        radians: f32::NAN,
    };

    pub fn from_degrees(degrees: f32) -> Self {
        if !degrees.is_finite() {
            return Self::INVALID;
        }
        let degrees = degrees.rem_euclid(360.0);
        // rem_euclid may round up to exactly 360 for tiny negative input
        let degrees = if degrees >= 360.0 { 0.0 } else { degrees };
        Self {
            degrees,
            radians: degrees.to_radians(),
        }
    }

    pub fn from_radians(radians: f32) -> Self {
        if !radians.is_finite() {
            return Self::INVALID;
        }
        Self::from_degrees(radians.rem_euclid(TAU).to_degrees())
    }

    pub fn degrees(&self) -> f32 {
        self.degrees
    }

    pub fn radians(&self) -> f32 {
        self.radians
    }

    pub fn is_valid(&self) -> bool {
        !self.degrees.is_nan()
    }

    /// True for any valid angle other than (approximately) zero
    pub fn is_rotated(&self) -> bool {
        self.is_valid() && *self != Self::NONE
    }
}

impl PartialEq for Rotation {
    fn eq(&self, other: &Self) -> bool {
        if !self.is_valid() || !other.is_valid() {
            return !self.is_valid() && !other.is_valid();
        }
        let diff = (self.degrees - other.degrees).rem_euclid(360.0);
        diff <= TOLERANCE || 360.0 - diff <= TOLERANCE
    }
}

impl From<f32> for Rotation {
    fn from(degrees: f32) -> Self {
        Self::from_degrees(degrees)
    }
}

impl From<Rotation> for f32 {
    fn from(rotation: Rotation) -> Self {
        rotation.degrees
    }
}

impl Add for Rotation {
    type Output = Rotation;

    fn add(self, rhs: Rotation) -> Rotation {
        Rotation::from_degrees(self.degrees + rhs.degrees)
    }
}

impl Sub for Rotation {
    type Output = Rotation;

    fn sub(self, rhs: Rotation) -> Rotation {
        Rotation::from_degrees(self.degrees - rhs.degrees)
    }
}

impl Neg for Rotation {
    type Output = Rotation;

    fn neg(self) -> Rotation {
        Rotation::from_degrees(-self.degrees)
    }
}

impl Mul<f32> for Rotation {
    type Output = Rotation;

    fn mul(self, rhs: f32) -> Rotation {
        Rotation::from_degrees(self.degrees * rhs)
    }
}

impl Div<f32> for Rotation {
    type Output = Rotation;

    fn div(self, rhs: f32) -> Rotation {
        if rhs == 0.0 {
            return Rotation::INVALID;
        }
        Rotation::from_degrees(self.degrees / rhs)
    }
}
