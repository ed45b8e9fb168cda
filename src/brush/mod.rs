//! Brushes: rendering functions that turn render targets into colors.
//!
//! A brush receives the rectangle it paints over and one [`RenderTarget`] per
//! LED, and yields colors for any subset of them. What the rectangle means
//! depends on the brush's [`CalculationMode`]:
//!
//! - `Relative` - the bounding box of the group's LEDs, moved to (0,0)
//! - `Absolute` - the surface boundary, targets keep surface coordinates

mod gradient;
mod pulse;
mod solid;

use std::fmt;
use std::str::FromStr;

use rgbscape_model::{Color, LedRef, Point, Rectangle};
use serde::{Deserialize, Serialize};

use crate::error::{BrushError, ConfigError};

pub use gradient::{GradientStop, LinearGradientBrush};
pub use pulse::{Easing, PulseBrush, PulseKeyframe};
pub use solid::SolidColorBrush;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalculationMode {
    #[default]
    Relative,
    Absolute,
}

impl FromStr for CalculationMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "relative" => Ok(CalculationMode::Relative),
            "absolute" => Ok(CalculationMode::Absolute),
            _ => Err(ConfigError::UnknownCalculationMode(s.to_string())),
        }
    }
}

impl fmt::Display for CalculationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CalculationMode::Relative => f.write_str("relative"),
            CalculationMode::Absolute => f.write_str("absolute"),
        }
    }
}

/// One LED as seen by a brush
#[derive(Debug, Clone)]
pub struct RenderTarget {
    pub led: LedRef,
    /// LED rectangle in the brush's coordinate space
    pub rectangle: Rectangle,
}

impl RenderTarget {
    pub fn new(led: LedRef, rectangle: Rectangle) -> Self {
        Self { led, rectangle }
    }

    /// Sample point of the target
    pub fn point(&self) -> Point {
        self.rectangle.center()
    }
}

pub trait Brush: Send + Sync {
    fn is_enabled(&self) -> bool;

    fn calculation_mode(&self) -> CalculationMode;

    /// Colors for any subset of `targets`, each target at most once
    fn render(
        &self,
        rectangle: Rectangle,
        targets: &[RenderTarget],
    ) -> Result<Vec<(RenderTarget, Color)>, BrushError>;
}

/// Settings shared by the built-in brushes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrushSettings {
    pub enabled: bool,
    pub calculation_mode: CalculationMode,
    /// Multiplies the HSV value of every color, 0..=1
    pub brightness: f32,
    /// Multiplies the alpha of every color, 0..=1
    pub opacity: f32,
}

impl Default for BrushSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            calculation_mode: CalculationMode::Relative,
            brightness: 1.0,
            opacity: 1.0,
        }
    }
}

impl BrushSettings {
    /// Apply brightness and opacity to a rendered color
    pub fn finalize(&self, color: Color) -> Color {
        let mut color = color;
        if self.brightness < 1.0 {
            color = color.multiply_hsv(1.0, 1.0, self.brightness.max(0.0));
        }
        if self.opacity < 1.0 {
            color = color.multiply_alpha(self.opacity.max(0.0));
        }
        color
    }
}

fn check_rectangle(rectangle: &Rectangle) -> Result<(), BrushError> {
    if rectangle.is_valid() {
        Ok(())
    } else {
        Err(BrushError::InvalidRectangle(format!("{rectangle:?}")))
    }
}
