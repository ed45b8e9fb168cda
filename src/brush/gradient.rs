use rgbscape_model::{Color, Point, Rectangle};
use serde::{Deserialize, Serialize};

use super::{check_rectangle, Brush, BrushSettings, CalculationMode, RenderTarget};
use crate::error::BrushError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradientStop {
    /// Position along the gradient, 0..=1
    pub offset: f32,
    pub color: Color,
}

impl GradientStop {
    pub fn new(offset: f32, color: Color) -> Self {
        Self { offset, color }
    }
}

/// Linear gradient between two points given relative to the render rectangle
/// ((0,0) top-left, (1,1) bottom-right).
#[derive(Debug, Clone)]
pub struct LinearGradientBrush {
    pub start: Point,
    pub end: Point,
    stops: Vec<GradientStop>,
    pub settings: BrushSettings,
}

impl LinearGradientBrush {
    /// Left-to-right gradient through `stops`
    pub fn new(stops: Vec<GradientStop>) -> Self {
        let mut brush = Self {
            start: Point::new(0.0, 0.5),
            end: Point::new(1.0, 0.5),
            stops: Vec::new(),
            settings: BrushSettings::default(),
        };
        brush.set_stops(stops);
        brush
    }

    pub fn with_direction(mut self, start: Point, end: Point) -> Self {
        self.start = start;
        self.end = end;
        self
    }

    pub fn with_settings(mut self, settings: BrushSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn stops(&self) -> &[GradientStop] {
        &self.stops
    }

    pub fn set_stops(&mut self, mut stops: Vec<GradientStop>) {
        stops.sort_by(|a, b| a.offset.total_cmp(&b.offset));
        self.stops = stops;
    }

    /// Color at `offset` along the gradient
    pub fn color_at(&self, offset: f32) -> Option<Color> {
        let first = self.stops.first()?;
        let last = self.stops.last()?;
        if offset <= first.offset {
            return Some(first.color);
        }
        if offset >= last.offset {
            return Some(last.color);
        }

        let upper = self.stops.iter().position(|s| s.offset >= offset)?;
        let (a, b) = (self.stops[upper - 1], self.stops[upper]);
        let span = b.offset - a.offset;
        if span <= 0.0 {
            return Some(b.color);
        }
        Some(a.color.lerp(b.color, (offset - a.offset) / span))
    }

    /// Offset of `point` (in rectangle coordinates) projected onto the gradient line
    fn offset_of(&self, rectangle: &Rectangle, point: Point) -> f32 {
        let relative = Point::new(
            relative_axis(point.x, rectangle.x(), rectangle.width()),
            relative_axis(point.y, rectangle.y(), rectangle.height()),
        );
        let dir = self.end - self.start;
        let length_sq = dir.x * dir.x + dir.y * dir.y;
        if length_sq <= f32::EPSILON {
            return 0.0;
        }
        let d = relative - self.start;
        ((d.x * dir.x + d.y * dir.y) / length_sq).clamp(0.0, 1.0)
    }
}

fn relative_axis(value: f32, origin: f32, extent: f32) -> f32 {
    if extent > 0.0 {
        (value - origin) / extent
    } else {
        0.5
    }
}

impl Brush for LinearGradientBrush {
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
        if self.stops.is_empty() {
            return Err(BrushError::EmptyGradient);
        }

        let mut out = Vec::with_capacity(targets.len());
        for target in targets {
            let offset = self.offset_of(&rectangle, target.point());
            if let Some(color) = self.color_at(offset) {
                out.push((target.clone(), self.settings.finalize(color)));
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rgbscape_model::{Led, LedId, LedRef, Size};

    fn red_to_blue() -> LinearGradientBrush {
        LinearGradientBrush::new(vec![
            GradientStop::new(1.0, Color::BLUE),
            GradientStop::new(0.0, Color::RED),
        ])
    }

    #[test]
    fn test_stops_sorted_and_interpolated() {
        let brush = red_to_blue();
        assert_eq!(brush.stops()[0].color, Color::RED);
        assert_eq!(brush.color_at(-1.0), Some(Color::RED));
        assert_eq!(brush.color_at(2.0), Some(Color::BLUE));
        let mid = brush.color_at(0.5).unwrap();
        assert!(mid.approx_eq(&Color::from_rgb(0.5, 0.0, 0.5), 1e-4));
    }

    #[test]
    fn test_render_left_to_right() {
        let targets: Vec<RenderTarget> = [0.0, 90.0]
            .iter()
            .enumerate()
            .map(|(i, x)| {
                let led = LedRef::new(Led::new(LedId(i as u32), Point::ORIGIN, Size::uniform(10.0)));
                RenderTarget::new(led, Rectangle::from_xywh(*x, 0.0, 10.0, 10.0))
            })
            .collect();

        let out = red_to_blue()
            .render(Rectangle::from_xywh(0.0, 0.0, 100.0, 10.0), &targets)
            .unwrap();
        // centers at 5% and 95%
        assert!(out[0].1.r() > 0.9 && out[0].1.b() < 0.1);
        assert!(out[1].1.b() > 0.9 && out[1].1.r() < 0.1);
    }

    #[test]
    fn test_empty_gradient_fails() {
        let brush = LinearGradientBrush::new(Vec::new());
        assert_eq!(
            brush
                .render(Rectangle::from_xywh(0.0, 0.0, 1.0, 1.0), &[])
                .unwrap_err(),
            BrushError::EmptyGradient
        );
    }
}
