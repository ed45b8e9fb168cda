//! Device capability trait

use rgbscape_model::{Color, LedId, LedRef, Ownership, Rectangle};

use crate::error::DeviceError;
use crate::info::DeviceInfo;
use crate::layout::DeviceLayout;

/// A physical (or virtual) device holding LEDs.
///
/// Implementations own their LEDs through a [`DeviceLayout`] and decide how
/// committed colors reach the hardware, typically by pushing them into an
/// [`UpdateQueue`](crate::UpdateQueue).
pub trait RgbDevice: Send + Sync {
    fn info(&self) -> &DeviceInfo;

    fn layout(&self) -> &DeviceLayout;

    /// Slot claimed by the surface the device is attached to
    fn ownership(&self) -> &Ownership;

    /// Commit pending LED colors and hand them to the transport.
    ///
    /// With `flush_leds` every LED is sent, otherwise only dirty ones.
    fn update(&self, flush_leds: bool) -> Result<(), DeviceError>;

    /// Turn the device off and drop anything queued
    fn reset(&self) -> Result<(), DeviceError>;

    fn name(&self) -> &str {
        &self.info().device_name
    }

    fn leds(&self) -> Vec<LedRef> {
        self.layout().leds()
    }

    fn boundary(&self) -> Rectangle {
        self.layout().boundary()
    }
}

/// Commit LEDs for a flush and collect what has to be sent.
///
/// Every pending color is committed. The result holds dirty LEDs only, or all
/// LEDs when `flush_leds` is set, in device order.
pub fn commit_leds(leds: &[LedRef], flush_leds: bool) -> Vec<(LedId, Color)> {
    let mut batch = Vec::new();
    for led in leds {
        let mut led = led.write();
        let dirty = led.is_dirty();
        led.update();
        if dirty || flush_leds {
            batch.push((led.id(), led.color()));
        }
    }
    batch
}

#[cfg(test)]
mod tests {
    use super::*;
    use rgbscape_model::{Led, Point, Size};

    fn leds() -> Vec<LedRef> {
        (0..3)
            .map(|i| {
                LedRef::new(Led::new(
                    LedId(i),
                    Point::new(i as f32 * 10.0, 0.0),
                    Size::uniform(10.0),
                ))
            })
            .collect()
    }

    #[test]
    fn test_commit_dirty_only() {
        let leds = leds();
        leds[1].set_color(Color::RED);

        let batch = commit_leds(&leds, false);
        assert_eq!(batch, vec![(LedId(1), Color::RED)]);
        assert_eq!(leds[1].color(), Color::RED);
        assert!(!leds[1].read().is_dirty());

        assert!(commit_leds(&leds, false).is_empty());
    }

    #[test]
    fn test_commit_flush_all() {
        let leds = leds();
        leds[0].set_color(Color::BLUE);

        let batch = commit_leds(&leds, true);
        assert_eq!(
            batch,
            vec![
                (LedId(0), Color::BLUE),
                (LedId(1), Color::TRANSPARENT),
                (LedId(2), Color::TRANSPARENT),
            ]
        );
    }

    #[test]
    fn test_unchanged_write_clears_pending() {
        let leds = leds();
        leds[0].set_color(Color::GREEN);
        commit_leds(&leds, false);

        leds[0].set_color(Color::GREEN);
        assert!(commit_leds(&leds, false).is_empty());
        assert_eq!(leds[0].read().requested_color(), None);
    }
}
