use rgbscape_model::{Color, Rectangle};

use super::{check_rectangle, Brush, BrushSettings, CalculationMode, RenderTarget};
use crate::error::BrushError;

/// Paints every target with one color
#[derive(Debug, Clone)]
pub struct SolidColorBrush {
    pub color: Color,
    pub settings: BrushSettings,
}

impl SolidColorBrush {
    pub fn new(color: Color) -> Self {
        Self {
            color,
            settings: BrushSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: BrushSettings) -> Self {
        self.settings = settings;
        self
    }
}

impl Brush for SolidColorBrush {
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
        let color = self.settings.finalize(self.color);
        Ok(targets.iter().map(|t| (t.clone(), color)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rgbscape_model::{Led, LedId, LedRef, Point, Size};

    #[test]
    fn test_paints_every_target() {
        let targets: Vec<RenderTarget> = (0..3)
            .map(|i| {
                let led = LedRef::new(Led::new(LedId(i), Point::ORIGIN, Size::uniform(1.0)));
                RenderTarget::new(led, Rectangle::from_xywh(i as f32, 0.0, 1.0, 1.0))
            })
            .collect();

        let brush = SolidColorBrush::new(Color::GREEN);
        let out = brush
            .render(Rectangle::from_xywh(0.0, 0.0, 3.0, 1.0), &targets)
            .unwrap();
        assert_eq!(out.len(), 3);
        assert!(out.iter().all(|(_, c)| *c == Color::GREEN));
    }

    #[test]
    fn test_invalid_rectangle_fails() {
        let brush = SolidColorBrush::new(Color::GREEN);
        let rect = Rectangle::new(Point::INVALID, Size::uniform(1.0));
        assert!(matches!(
            brush.render(rect, &[]),
            Err(BrushError::InvalidRectangle(_))
        ));
    }
}
