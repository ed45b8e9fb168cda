//! LED groups: z-ordered bindings of a brush to a set of LEDs.
//!
//! A group belongs to at most one surface. The surface reads the group's LEDs
//! once per frame through [`LedGroup::leds`], which returns a snapshot so
//! membership can change on another thread without tearing a frame.

use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use rgbscape_model::{LedRef, Ownership, Rectangle};
use tracing::debug;

use crate::brush::Brush;

pub trait LedGroup: Send + Sync {
    fn name(&self) -> &str;

    /// Render order on the surface, ascending. Ties keep attach order.
    fn z_index(&self) -> i32;

    fn brush(&self) -> Option<Arc<dyn Brush>>;

    /// Snapshot of the member LEDs
    fn leds(&self) -> Vec<LedRef>;

    fn ownership(&self) -> &Ownership;

    /// Called when the group is attached, with every LED of the surface
    fn on_attach(&self, _surface_leds: &[LedRef]) {}

    fn on_detach(&self) {}

    /// Called after devices were added, removed or moved
    fn on_surface_layout_changed(&self, _surface_leds: &[LedRef]) {}
}

/// State every group carries
pub struct GroupCore {
    name: String,
    z_index: AtomicI32,
    brush: RwLock<Option<Arc<dyn Brush>>>,
    ownership: Ownership,
}

impl GroupCore {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            z_index: AtomicI32::new(0),
            brush: RwLock::new(None),
            ownership: Ownership::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn z_index(&self) -> i32 {
        self.z_index.load(Ordering::Relaxed)
    }

    /// Render order. An attached group moves on the surface's next frame.
    pub fn set_z_index(&self, z_index: i32) {
        self.z_index.store(z_index, Ordering::Relaxed);
    }

    pub fn brush(&self) -> Option<Arc<dyn Brush>> {
        self.brush.read().clone()
    }

    pub fn set_brush(&self, brush: Option<Arc<dyn Brush>>) {
        *self.brush.write() = brush;
    }

    pub fn ownership(&self) -> &Ownership {
        &self.ownership
    }
}

// === ListLedGroup ===

/// Group with explicit membership
pub struct ListLedGroup {
    core: GroupCore,
    leds: RwLock<Vec<LedRef>>,
}

impl ListLedGroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            core: GroupCore::new(name),
            leds: RwLock::new(Vec::new()),
        }
    }

    pub fn with_leds(self, leds: impl IntoIterator<Item = LedRef>) -> Self {
        self.add_leds(leds);
        self
    }

    pub fn with_z_index(self, z_index: i32) -> Self {
        self.core.set_z_index(z_index);
        self
    }

    pub fn with_brush(self, brush: Arc<dyn Brush>) -> Self {
        self.core.set_brush(Some(brush));
        self
    }

    pub fn core(&self) -> &GroupCore {
        &self.core
    }

    /// Add an LED. Returns false if it already was a member.
    pub fn add_led(&self, led: LedRef) -> bool {
        let mut leds = self.leds.write();
        if leds.contains(&led) {
            return false;
        }
        leds.push(led);
        true
    }

    pub fn add_leds(&self, leds: impl IntoIterator<Item = LedRef>) {
        for led in leds {
            self.add_led(led);
        }
    }

    pub fn remove_led(&self, led: &LedRef) -> bool {
        let mut leds = self.leds.write();
        let before = leds.len();
        leds.retain(|l| l != led);
        leds.len() != before
    }

    pub fn contains(&self, led: &LedRef) -> bool {
        self.leds.read().contains(led)
    }

    pub fn clear(&self) {
        self.leds.write().clear();
    }
}

impl LedGroup for ListLedGroup {
    fn name(&self) -> &str {
        self.core.name()
    }

    fn z_index(&self) -> i32 {
        self.core.z_index()
    }

    fn brush(&self) -> Option<Arc<dyn Brush>> {
        self.core.brush()
    }

    fn leds(&self) -> Vec<LedRef> {
        self.leds.read().clone()
    }

    fn ownership(&self) -> &Ownership {
        self.core.ownership()
    }
}

// === RectangleLedGroup ===

/// Group of every surface LED whose absolute rectangle overlaps `rectangle`
/// by at least `min_overlay` of the LED's own area
pub struct RectangleLedGroup {
    core: GroupCore,
    rectangle: RwLock<Rectangle>,
    min_overlay: f32,
    leds: RwLock<Vec<LedRef>>,
    surface_leds: RwLock<Vec<LedRef>>,
}

pub const DEFAULT_MIN_OVERLAY: f32 = 0.5;

impl RectangleLedGroup {
    pub fn new(name: impl Into<String>, rectangle: Rectangle) -> Self {
        Self {
            core: GroupCore::new(name),
            rectangle: RwLock::new(rectangle),
            min_overlay: DEFAULT_MIN_OVERLAY,
            leds: RwLock::new(Vec::new()),
            surface_leds: RwLock::new(Vec::new()),
        }
    }

    pub fn with_min_overlay(mut self, min_overlay: f32) -> Self {
        self.min_overlay = min_overlay.clamp(0.0, 1.0);
        self
    }

    pub fn with_z_index(self, z_index: i32) -> Self {
        self.core.set_z_index(z_index);
        self
    }

    pub fn with_brush(self, brush: Arc<dyn Brush>) -> Self {
        self.core.set_brush(Some(brush));
        self
    }

    pub fn core(&self) -> &GroupCore {
        &self.core
    }

    pub fn rectangle(&self) -> Rectangle {
        *self.rectangle.read()
    }

    pub fn min_overlay(&self) -> f32 {
        self.min_overlay
    }

    /// Move the selection rectangle and recompute membership
    pub fn set_rectangle(&self, rectangle: Rectangle) {
        *self.rectangle.write() = rectangle;
        let surface_leds = self.surface_leds.read().clone();
        self.recompute(&surface_leds);
    }

    fn recompute(&self, surface_leds: &[LedRef]) {
        let rectangle = self.rectangle();
        let members: Vec<LedRef> = surface_leds
            .iter()
            .filter(|led| {
                let overlay = led.absolute_boundary().intersect_percentage(&rectangle);
                overlay > 0.0 && overlay >= self.min_overlay
            })
            .cloned()
            .collect();
        debug!(
            "Rectangle group {} selects {} of {} LEDs",
            self.core.name(),
            members.len(),
            surface_leds.len()
        );
        *self.leds.write() = members;
    }
}

impl LedGroup for RectangleLedGroup {
    fn name(&self) -> &str {
        self.core.name()
    }

    fn z_index(&self) -> i32 {
        self.core.z_index()
    }

    fn brush(&self) -> Option<Arc<dyn Brush>> {
        self.core.brush()
    }

    fn leds(&self) -> Vec<LedRef> {
        self.leds.read().clone()
    }

    fn ownership(&self) -> &Ownership {
        self.core.ownership()
    }

    fn on_attach(&self, surface_leds: &[LedRef]) {
        *self.surface_leds.write() = surface_leds.to_vec();
        self.recompute(surface_leds);
    }

    fn on_detach(&self) {
        self.surface_leds.write().clear();
        self.leds.write().clear();
    }

    fn on_surface_layout_changed(&self, surface_leds: &[LedRef]) {
        *self.surface_leds.write() = surface_leds.to_vec();
        self.recompute(surface_leds);
    }
}
