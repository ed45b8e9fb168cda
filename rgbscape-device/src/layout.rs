//! Device geometry and LED list
//!
//! [`DeviceLayout`] is the shared geometry half of every device: the device's
//! own [`Placeable`], the ordered LEDs it owns, and a boundary-changed channel
//! the surface subscribes to. Geometry writes push the device transform down to
//! every LED so their absolute rectangles stay current, then notify listeners
//! with no internal lock held.

use parking_lot::RwLock;
use rgbscape_model::{
    EventHandlers, Led, LedId, LedRef, ParentTransform, Placeable, PlaceableChanges, Point,
    Rectangle, Rotation, Scale, Size, SubscriptionId,
};
use tracing::debug;

use crate::error::DeviceError;

pub struct DeviceLayout {
    placeable: RwLock<Placeable>,
    leds: RwLock<Vec<LedRef>>,
    boundary_changed: EventHandlers<Rectangle>,
}

impl Default for DeviceLayout {
    fn default() -> Self {
        Self::new(Point::ORIGIN, Size::ZERO)
    }
}

impl DeviceLayout {
    pub fn new(location: Point, size: Size) -> Self {
        Self {
            placeable: RwLock::new(Placeable::new(location, size)),
            leds: RwLock::new(Vec::new()),
            boundary_changed: EventHandlers::new("device-boundary-changed"),
        }
    }

    // ── Geometry ─────────────────────────────────────────────────────────

    pub fn location(&self) -> Point {
        self.placeable.read().location()
    }

    pub fn size(&self) -> Size {
        self.placeable.read().size()
    }

    pub fn scale(&self) -> Scale {
        self.placeable.read().scale()
    }

    pub fn rotation(&self) -> Rotation {
        self.placeable.read().rotation()
    }

    pub fn actual_size(&self) -> Size {
        self.placeable.read().actual_size()
    }

    /// Device boundary in surface coordinates
    pub fn boundary(&self) -> Rectangle {
        self.placeable.read().boundary()
    }

    pub fn set_location(&self, location: Point) -> PlaceableChanges {
        self.apply(|p| p.set_location(location))
    }

    pub fn set_size(&self, size: Size) -> PlaceableChanges {
        self.apply(|p| p.set_size(size))
    }

    pub fn set_scale(&self, scale: Scale) -> PlaceableChanges {
        self.apply(|p| p.set_scale(scale))
    }

    pub fn set_rotation(&self, rotation: Rotation) -> PlaceableChanges {
        self.apply(|p| p.set_rotation(rotation))
    }

    /// Grow or shrink the device to the extent of its LEDs (from the device origin)
    pub fn fit_to_leds(&self) -> PlaceableChanges {
        let extent = {
            let leds = self.leds.read();
            leds.iter().fold(Size::ZERO, |acc, led| {
                let led = led.read();
                let right = led.location().x + led.size().width;
                let bottom = led.location().y + led.size().height;
                Size::new(acc.width.max(right), acc.height.max(bottom))
            })
        };
        self.set_size(extent)
    }

    fn apply(&self, write: impl FnOnce(&mut Placeable) -> PlaceableChanges) -> PlaceableChanges {
        let (changes, boundary) = {
            let mut placeable = self.placeable.write();
            let changes = write(&mut placeable);
            if changes.any() {
                self.propagate(&placeable);
            }
            (changes, placeable.boundary())
        };

        if changes.boundary {
            debug!("Device boundary changed to {:?}", boundary);
            self.boundary_changed.emit(&boundary);
        }
        changes
    }

    fn propagate(&self, placeable: &Placeable) {
        let parent = ParentTransform::of(placeable);
        let origin = placeable.boundary().location();
        for led in self.leds.read().iter() {
            let mut led = led.write();
            led.set_parent(Some(parent));
            led.set_device_origin(origin);
        }
    }

    // ── LEDs ─────────────────────────────────────────────────────────────

    /// Add an LED at a device-relative location. Ids must be unique per device.
    pub fn add_led(&self, id: LedId, location: Point, size: Size) -> Result<LedRef, DeviceError> {
        let placeable = self.placeable.read();
        let mut leds = self.leds.write();
        if leds.iter().any(|led| led.id() == id) {
            return Err(DeviceError::DuplicateLed(id));
        }

        let mut led = Led::new(id, location, size);
        led.set_parent(Some(ParentTransform::of(&placeable)));
        led.set_device_origin(placeable.boundary().location());

        let led = LedRef::new(led);
        leds.push(led.clone());
        Ok(led)
    }

    pub fn remove_led(&self, id: LedId) -> Result<LedRef, DeviceError> {
        let mut leds = self.leds.write();
        let index = leds
            .iter()
            .position(|led| led.id() == id)
            .ok_or(DeviceError::LedNotFound(id))?;
        Ok(leds.remove(index))
    }

    /// Snapshot of the LEDs in insertion order
    pub fn leds(&self) -> Vec<LedRef> {
        self.leds.read().clone()
    }

    pub fn led(&self, id: LedId) -> Option<LedRef> {
        self.leds.read().iter().find(|led| led.id() == id).cloned()
    }

    pub fn led_count(&self) -> usize {
        self.leds.read().len()
    }

    // ── Notifications ────────────────────────────────────────────────────

    pub fn on_boundary_changed<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&Rectangle) + Send + Sync + 'static,
    {
        self.boundary_changed.subscribe(handler)
    }

    pub fn remove_boundary_handler(&self, id: SubscriptionId) -> bool {
        self.boundary_changed.unsubscribe(id)
    }
}

impl std::fmt::Debug for DeviceLayout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceLayout")
            .field("boundary", &self.boundary())
            .field("leds", &self.led_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    fn strip() -> DeviceLayout {
        let layout = DeviceLayout::new(Point::new(100.0, 0.0), Size::new(20.0, 10.0));
        layout
            .add_led(LedId(1), Point::ORIGIN, Size::new(10.0, 10.0))
            .unwrap();
        layout
            .add_led(LedId(2), Point::new(10.0, 0.0), Size::new(10.0, 10.0))
            .unwrap();
        layout
    }

    #[test]
    fn test_duplicate_led_rejected() {
        let layout = strip();
        assert!(matches!(
            layout.add_led(LedId(1), Point::ORIGIN, Size::uniform(1.0)),
            Err(DeviceError::DuplicateLed(LedId(1)))
        ));
        assert_eq!(layout.led_count(), 2);
    }

    #[test]
    fn test_led_absolute_boundary_tracks_device() {
        let layout = strip();
        let led = layout.led(LedId(2)).unwrap();
        assert_eq!(
            led.absolute_boundary(),
            Rectangle::from_xywh(110.0, 0.0, 10.0, 10.0)
        );

        layout.set_location(Point::new(0.0, 50.0));
        assert_eq!(
            led.absolute_boundary(),
            Rectangle::from_xywh(10.0, 50.0, 10.0, 10.0)
        );

        layout.set_scale(Scale::uniform(2.0));
        assert_eq!(
            led.absolute_boundary(),
            Rectangle::from_xywh(20.0, 50.0, 20.0, 20.0)
        );
    }

    #[test]
    fn test_rotated_device_moves_leds() {
        let layout = strip();
        layout.set_location(Point::ORIGIN);
        layout.set_rotation(Rotation::from_degrees(90.0));

        // 20x10 strip stands upright: boundary 10x20 centered on (10, 5)
        assert_eq!(layout.boundary(), Rectangle::from_xywh(5.0, -5.0, 10.0, 20.0));
        let first = layout.led(LedId(1)).unwrap().absolute_boundary();
        let second = layout.led(LedId(2)).unwrap().absolute_boundary();
        assert_eq!(first, Rectangle::from_xywh(5.0, -5.0, 10.0, 10.0));
        assert_eq!(second, Rectangle::from_xywh(5.0, 5.0, 10.0, 10.0));
    }

    #[test]
    fn test_boundary_notification() {
        let layout = strip();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let s = Arc::clone(&seen);
        let id = layout.on_boundary_changed(move |rect| s.lock().push(*rect));

        layout.set_location(Point::new(1.0, 1.0));
        layout.set_location(Point::new(1.0, 1.0));
        assert_eq!(seen.lock().len(), 1);
        assert_eq!(seen.lock()[0].location(), Point::new(1.0, 1.0));

        assert!(layout.remove_boundary_handler(id));
        layout.set_location(Point::new(2.0, 2.0));
        assert_eq!(seen.lock().len(), 1);
    }

    #[test]
    fn test_fit_to_leds() {
        let layout = DeviceLayout::default();
        layout
            .add_led(LedId(1), Point::new(0.0, 0.0), Size::new(5.0, 5.0))
            .unwrap();
        layout
            .add_led(LedId(2), Point::new(20.0, 2.0), Size::new(5.0, 5.0))
            .unwrap();
        layout.fit_to_leds();
        assert_eq!(layout.size(), Size::new(25.0, 7.0));
    }

    #[test]
    fn test_remove_led() {
        let layout = strip();
        assert_eq!(layout.remove_led(LedId(1)).unwrap().id(), LedId(1));
        assert!(matches!(
            layout.remove_led(LedId(1)),
            Err(DeviceError::LedNotFound(_))
        ));
        assert_eq!(layout.leds()[0].id(), LedId(2));
    }
}
