//! Color corrections applied to a batch right before it goes to the transport

use rgbscape_model::{Color, LedId};
use tracing::debug;

pub trait ColorCorrection: Send + Sync {
    fn apply(&self, batch: &mut [(LedId, Color)]);
}

/// WS2812B model: each channel draws `MA_PER_CHANNEL` mA at full intensity.
/// Total per LED = `(R + G + B) * MA_PER_CHANNEL` with channels in 0..=1.
pub const MA_PER_CHANNEL: f32 = 20.0;

/// Default power budget in milliamps
pub const DEFAULT_POWER_BUDGET_MA: f32 = 400.0;

/// Scale a whole batch down uniformly when its estimated current draw exceeds
/// the budget. A budget of 0 disables limiting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PowerBudget {
    pub budget_ma: f32,
}

impl Default for PowerBudget {
    fn default() -> Self {
        Self {
            budget_ma: DEFAULT_POWER_BUDGET_MA,
        }
    }
}

impl PowerBudget {
    pub fn new(budget_ma: f32) -> Self {
        Self { budget_ma }
    }

    /// Estimated draw of a color in mA
    pub fn draw_ma(color: Color) -> f32 {
        (color.r() + color.g() + color.b()) * MA_PER_CHANNEL
    }

    /// Returns (estimated total mA before limiting, whether limiting was applied).
    pub fn limit(&self, batch: &mut [(LedId, Color)]) -> (f32, bool) {
        let total_ma: f32 = batch.iter().map(|(_, c)| Self::draw_ma(*c)).sum();

        if self.budget_ma > 0.0 && total_ma > self.budget_ma {
            let scale = self.budget_ma / total_ma;
            for (_, color) in batch.iter_mut() {
                *color = color.multiply_rgb(scale, scale, scale);
            }
            (total_ma, true)
        } else {
            (total_ma, false)
        }
    }
}

impl ColorCorrection for PowerBudget {
    fn apply(&self, batch: &mut [(LedId, Color)]) {
        let (total_ma, limited) = self.limit(batch);
        if limited {
            debug!(
                "Power budget: {:.0} mA requested, scaled to {:.0} mA",
                total_ma, self.budget_ma
            );
        }
    }
}
