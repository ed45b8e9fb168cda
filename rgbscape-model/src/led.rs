//! Addressable LEDs
//!
//! An [`Led`] belongs to exactly one device. Colors written by brushes land in
//! a pending "requested" slot and only become the committed color when the
//! owning device flushes and calls [`Led::update`].
//!
//! ```text
//!   Clean ──set_color──▶ Pending ──update()──▶ Clean
//!     ▲                     │
//!     └──────reset()────────┘   (locked: set_color is a no-op)
//! ```

use std::fmt;
use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::geometry::{Point, Rectangle, Size};
use crate::placeable::{ParentTransform, Placeable, PlaceableChanges};

/// Device-local LED identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LedId(pub u32);

impl fmt::Display for LedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "led#{}", self.0)
    }
}

/// Physical outline of an LED, used by previews
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    /// Outline given by the LED's shape data
    Custom,
    #[default]
    Rectangle,
    Circle,
}

#[derive(Debug, Clone)]
pub struct Led {
    id: LedId,
    placeable: Placeable,
    shape: Shape,
    shape_data: Option<String>,
    is_locked: bool,
    color: Color,
    requested_color: Option<Color>,
    device_origin: Point,
    absolute_boundary: Rectangle,
}

impl Led {
    pub fn new(id: LedId, location: Point, size: Size) -> Self {
        let placeable = Placeable::new(location, size);
        let absolute_boundary = placeable.boundary();
        Self {
            id,
            placeable,
            shape: Shape::default(),
            shape_data: None,
            is_locked: false,
            color: Color::TRANSPARENT,
            requested_color: None,
            device_origin: Point::ORIGIN,
            absolute_boundary,
        }
    }

    pub fn id(&self) -> LedId {
        self.id
    }

    pub fn placeable(&self) -> &Placeable {
        &self.placeable
    }

    pub fn location(&self) -> Point {
        self.placeable.location()
    }

    pub fn size(&self) -> Size {
        self.placeable.size()
    }

    /// Device-relative boundary
    pub fn boundary(&self) -> Rectangle {
        self.placeable.boundary()
    }

    /// Boundary in surface coordinates
    pub fn absolute_boundary(&self) -> Rectangle {
        self.absolute_boundary
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    pub fn set_shape(&mut self, shape: Shape) {
        self.shape = shape;
    }

    pub fn shape_data(&self) -> Option<&str> {
        self.shape_data.as_deref()
    }

    pub fn set_shape_data(&mut self, data: Option<String>) {
        self.shape_data = data;
    }

    pub fn is_locked(&self) -> bool {
        self.is_locked
    }

    pub fn set_locked(&mut self, locked: bool) {
        self.is_locked = locked;
    }

    /// Last committed color
    pub fn color(&self) -> Color {
        self.color
    }

    pub fn requested_color(&self) -> Option<Color> {
        self.requested_color
    }

    pub fn is_dirty(&self) -> bool {
        self.requested_color.is_some_and(|c| c != self.color)
    }

    /// Compose `color` onto the pending color.
    ///
    /// Returns false (and changes nothing) if the LED is locked.
    pub fn set_color(&mut self, color: Color) -> bool {
        if self.is_locked {
            return false;
        }
        self.requested_color = Some(match self.requested_color {
            Some(pending) => pending.blend(color),
            None => color,
        });
        true
    }

    /// Commit the pending color. Returns the committed color if one was pending.
    pub fn update(&mut self) -> Option<Color> {
        let requested = self.requested_color.take()?;
        self.color = requested;
        Some(requested)
    }

    /// Back to clean, transparent and unlocked
    pub fn reset(&mut self) {
        self.color = Color::TRANSPARENT;
        self.requested_color = None;
        self.is_locked = false;
    }

    pub fn set_location(&mut self, location: Point) -> PlaceableChanges {
        let changes = self.placeable.set_location(location);
        self.refresh_absolute();
        changes
    }

    pub fn set_size(&mut self, size: Size) -> PlaceableChanges {
        let changes = self.placeable.set_size(size);
        self.refresh_absolute();
        changes
    }

    /// Device transform this LED's geometry is derived from
    pub fn set_parent(&mut self, parent: Option<ParentTransform>) -> PlaceableChanges {
        let changes = self.placeable.set_parent(parent);
        self.refresh_absolute();
        changes
    }

    /// Surface location of the owning device's boundary
    pub fn device_origin(&self) -> Point {
        self.device_origin
    }

    pub fn set_device_origin(&mut self, origin: Point) -> bool {
        if self.device_origin == origin {
            return false;
        }
        self.device_origin = origin;
        self.refresh_absolute();
        true
    }

    fn refresh_absolute(&mut self) {
        self.absolute_boundary = self.placeable.boundary().translate(self.device_origin);
    }
}

struct LedCell {
    id: LedId,
    led: RwLock<Led>,
}

/// Shared handle to an LED.
///
/// Devices own the LEDs; groups, brushes and the surface hold `LedRef`s.
/// Equality is identity: two handles are equal only if they point at the same LED.
#[derive(Clone)]
pub struct LedRef(Arc<LedCell>);

impl LedRef {
    pub fn new(led: Led) -> Self {
        Self(Arc::new(LedCell {
            id: led.id(),
            led: RwLock::new(led),
        }))
    }

    pub fn id(&self) -> LedId {
        self.0.id
    }

    pub fn read(&self) -> RwLockReadGuard<'_, Led> {
        self.0.led.read()
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, Led> {
        self.0.led.write()
    }

    pub fn ptr_eq(&self, other: &LedRef) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub fn color(&self) -> Color {
        self.read().color()
    }

    pub fn set_color(&self, color: Color) -> bool {
        self.write().set_color(color)
    }

    pub fn absolute_boundary(&self) -> Rectangle {
        self.read().absolute_boundary()
    }
}

impl PartialEq for LedRef {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for LedRef {}

impl fmt::Debug for LedRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let led = self.read();
        f.debug_struct("LedRef")
            .field("id", &led.id())
            .field("color", &led.color())
            .field("requested", &led.requested_color())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn led() -> Led {
        Led::new(LedId(1), Point::ORIGIN, Size::new(10.0, 10.0))
    }

    #[test]
    fn test_write_then_commit() {
        let mut led = led();
        assert!(!led.is_dirty());

        assert!(led.set_color(Color::RED));
        assert!(led.is_dirty());
        assert_eq!(led.requested_color(), Some(Color::RED));
        assert_eq!(led.color(), Color::TRANSPARENT);

        assert_eq!(led.update(), Some(Color::RED));
        assert!(!led.is_dirty());
        assert_eq!(led.color(), Color::RED);
        assert_eq!(led.update(), None);
    }

    #[test]
    fn test_writes_compose() {
        let mut led = led();
        led.set_color(Color::RED);
        led.set_color(Color::BLUE.with_alpha(0.0));
        assert_eq!(led.requested_color(), Some(Color::RED));
        led.set_color(Color::BLUE);
        assert_eq!(led.requested_color(), Some(Color::BLUE));
    }

    #[test]
    fn test_same_color_is_not_dirty() {
        let mut led = led();
        led.set_color(Color::GREEN);
        led.update();
        led.set_color(Color::GREEN);
        assert!(!led.is_dirty());
    }

    #[test]
    fn test_locked_ignores_writes() {
        let mut led = led();
        led.set_locked(true);
        assert!(!led.set_color(Color::RED));
        assert!(!led.is_dirty());
        assert_eq!(led.requested_color(), None);
    }

    #[test]
    fn test_reset() {
        let mut led = led();
        led.set_color(Color::RED);
        led.update();
        led.set_color(Color::BLUE);
        led.set_locked(true);
        led.reset();
        assert_eq!(led.color(), Color::TRANSPARENT);
        assert_eq!(led.requested_color(), None);
        assert!(!led.is_locked());
    }

    #[test]
    fn test_absolute_boundary_follows_device() {
        let mut led = Led::new(LedId(2), Point::new(10.0, 0.0), Size::new(5.0, 5.0));
        led.set_device_origin(Point::new(100.0, 50.0));
        assert_eq!(
            led.absolute_boundary(),
            Rectangle::from_xywh(110.0, 50.0, 5.0, 5.0)
        );

        led.set_location(Point::new(0.0, 0.0));
        assert_eq!(
            led.absolute_boundary(),
            Rectangle::from_xywh(100.0, 50.0, 5.0, 5.0)
        );
    }

    #[test]
    fn test_led_ref_identity() {
        let a = LedRef::new(led());
        let b = LedRef::new(led());
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
        a.set_color(Color::RED);
        assert_eq!(a.read().requested_color(), Some(Color::RED));
    }
}
