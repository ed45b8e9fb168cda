//! Brightness pulse driven by keyframes.
//!
//! Keyframes give a brightness at a time offset; between two keyframes the
//! brightness follows the easing of the earlier one. The sequence loops over
//! the time of the last keyframe.
//!
//! ```toml
//! type = "pulse"
//! color = "#FF0000"
//! keyframes = [
//!     { t = 0,    v = 0.0, easing = "EaseInOut" },
//!     { t = 1000, v = 1.0, easing = "EaseInOut" },
//!     { t = 2000, v = 0.0 },
//! ]
//! ```

use std::time::Instant;

use keyframe::functions as ease;
use keyframe::EasingFunction;
use rgbscape_model::{Color, Rectangle};
use serde::{Deserialize, Serialize};

use super::{check_rectangle, Brush, BrushSettings, CalculationMode, RenderTarget};
use crate::error::BrushError;

/// Easing applied from a keyframe to the next one
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Easing {
    #[default]
    Linear,
    /// Keep the keyframe's value until the next keyframe
    #[serde(alias = "Step")]
    Hold,
    #[serde(alias = "EaseInQuad")]
    EaseIn,
    #[serde(alias = "EaseOutQuad")]
    EaseOut,
    EaseInOut,
    EaseInCubic,
    EaseOutCubic,
    EaseInOutCubic,
    EaseInQuart,
    EaseOutQuart,
    EaseInOutQuart,
    EaseInQuint,
    EaseOutQuint,
    EaseInOutQuint,
}

impl Easing {
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::Hold => 0.0,
            Easing::EaseIn => ease::EaseIn.y(t),
            Easing::EaseOut => ease::EaseOut.y(t),
            Easing::EaseInOut => ease::EaseInOut.y(t),
            Easing::EaseInCubic => ease::EaseInCubic.y(t),
            Easing::EaseOutCubic => ease::EaseOutCubic.y(t),
            Easing::EaseInOutCubic => ease::EaseInOutCubic.y(t),
            Easing::EaseInQuart => ease::EaseInQuart.y(t),
            Easing::EaseOutQuart => ease::EaseOutQuart.y(t),
            Easing::EaseInOutQuart => ease::EaseInOutQuart.y(t),
            Easing::EaseInQuint => ease::EaseInQuint.y(t),
            Easing::EaseOutQuint => ease::EaseOutQuint.y(t),
            Easing::EaseInOutQuint => ease::EaseInOutQuint.y(t),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PulseKeyframe {
    /// Time in ms from the start of the cycle
    pub t: f64,
    /// Brightness 0.0-1.0
    pub v: f64,
    #[serde(default)]
    pub easing: Easing,
}

impl PulseKeyframe {
    pub fn new(t: f64, v: f64, easing: Easing) -> Self {
        Self { t, v, easing }
    }
}

#[derive(Debug, Clone)]
pub struct PulseBrush {
    pub color: Color,
    keyframes: Vec<PulseKeyframe>,
    started: Instant,
    pub settings: BrushSettings,
}

impl PulseBrush {
    pub fn new(color: Color, keyframes: Vec<PulseKeyframe>) -> Self {
        let mut keyframes: Vec<PulseKeyframe> = keyframes
            .into_iter()
            .map(|kf| PulseKeyframe {
                v: kf.v.clamp(0.0, 1.0),
                ..kf
            })
            .collect();
        keyframes.sort_by(|a, b| a.t.total_cmp(&b.t));
        Self {
            color,
            keyframes,
            started: Instant::now(),
            settings: BrushSettings::default(),
        }
    }

    /// Smooth fade in and out over `period_ms`
    pub fn breathe(color: Color, period_ms: f64) -> Self {
        let half = period_ms / 2.0;
        Self::new(
            color,
            vec![
                PulseKeyframe::new(0.0, 0.0, Easing::EaseInOut),
                PulseKeyframe::new(half, 1.0, Easing::EaseInOut),
                PulseKeyframe::new(period_ms, 0.0, Easing::Linear),
            ],
        )
    }

    pub fn with_settings(mut self, settings: BrushSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn keyframes(&self) -> &[PulseKeyframe] {
        &self.keyframes
    }

    pub fn duration_ms(&self) -> f64 {
        self.keyframes.last().map(|kf| kf.t).unwrap_or(0.0)
    }

    /// Restart the cycle
    pub fn restart(&mut self) {
        self.started = Instant::now();
    }

    /// Brightness at `elapsed_ms` into the animation
    pub fn brightness_at(&self, elapsed_ms: f64) -> f64 {
        let Some(first) = self.keyframes.first() else {
            return 1.0;
        };
        let duration = self.duration_ms();
        if duration <= 0.0 {
            return first.v;
        }

        let t = elapsed_ms.rem_euclid(duration);
        let (i, j) = self.find_segment(t);
        let (a, b) = (&self.keyframes[i], &self.keyframes[j]);
        if i == j {
            return a.v;
        }

        let segment = b.t - a.t;
        if segment <= 0.0 {
            return a.v;
        }
        let local = ((t - a.t) / segment).clamp(0.0, 1.0);
        a.v + (b.v - a.v) * a.easing.apply(local)
    }

    pub fn color_at(&self, elapsed_ms: f64) -> Color {
        let v = self.brightness_at(elapsed_ms) as f32;
        self.color.multiply_rgb(v, v, v)
    }

    fn find_segment(&self, t: f64) -> (usize, usize) {
        let n = self.keyframes.len();
        if n <= 1 {
            return (0, 0);
        }
        for i in 0..n - 1 {
            if t < self.keyframes[i + 1].t {
                return (i, i + 1);
            }
        }
        (n - 1, n - 1)
    }
}

impl Brush for PulseBrush {
    fn is_enabled(&self) -> bool {
        self.settings.enabled
    }

    fn calculation_mode(&self) -> CalculationMode {
        self.settings.calculation_mode
    }

    fn render(
        &self,
        rectangle: Rectangle,
        targets: &[RenderTarget],
    ) -> Result<Vec<(RenderTarget, Color)>, BrushError> {
        check_rectangle(&rectangle)?;
        let elapsed_ms = self.started.elapsed().as_secs_f64() * 1000.0;
        let color = self.settings.finalize(self.color_at(elapsed_ms));
        Ok(targets.iter().map(|t| (t.clone(), color)).collect())
    }
}
