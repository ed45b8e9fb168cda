//! Surface: the scene owning devices, LED groups and update triggers.
//!
//! # Frame pipeline
//!
//! ```text
//!  trigger fires ──▶ updating ──▶ render groups (ascending z) ──▶ device.update()
//!                                  per-group isolation             per-device isolation
//!                                                                          │
//!                                               updated ◀──────────────────┘
//! ```
//!
//! A brush or device failing (error or panic) is reported through
//! [`Surface::exception`] and the frame continues.
//!
//! # Locking
//!
//! Frames and structural changes serialize on one reentrant frame lock, so a
//! handler running inside a frame may still attach or detach. Below it the data
//! locks are always taken in the order triggers → devices → groups and are only
//! held to copy a list out, never across a callback.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};

use parking_lot::{Mutex, ReentrantMutex};
use rgbscape_device::{
    CustomUpdateData, DeviceProvider, FailureChannel, ProviderFailure, RgbDevice, UpdateTrigger,
};
use rgbscape_model::{panic_message, EventHandlers, LedRef, OwnerId, Rectangle, SubscriptionId};
use tracing::{debug, info, warn};

use crate::brush::{CalculationMode, RenderTarget};
use crate::error::{BrushError, FrameError, SurfaceError};
use crate::group::LedGroup;

/// Passed to `updating` handlers before a frame renders
#[derive(Debug, Clone)]
pub struct UpdatingEvent {
    /// Time since the previous frame started (zero for the first frame)
    pub delta_time: Duration,
    pub data: CustomUpdateData,
}

/// Passed to `updated` handlers after a frame completed
#[derive(Debug, Clone)]
pub struct UpdatedEvent {
    pub data: CustomUpdateData,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LayoutChangedEvent {
    pub device_added: bool,
    pub device_removed: bool,
    pub device_moved: bool,
}

struct TriggerEntry {
    trigger: Arc<dyn UpdateTrigger>,
    subscription: SubscriptionId,
}

struct DeviceEntry {
    device: Arc<dyn RgbDevice>,
    subscription: SubscriptionId,
}

struct GroupEntry {
    /// Attach sequence, breaks z-index ties
    order: u64,
    group: Arc<dyn LedGroup>,
}

struct ProviderEntry {
    failures: Arc<FailureChannel>,
    subscription: SubscriptionId,
}

pub struct Surface {
    owner: OwnerId,
    self_ref: Weak<Surface>,
    frame: ReentrantMutex<()>,

    triggers: Mutex<Vec<TriggerEntry>>,
    devices: Mutex<Vec<DeviceEntry>>,
    groups: Mutex<Vec<GroupEntry>>,
    next_group_order: AtomicU64,
    providers: Mutex<Vec<ProviderEntry>>,

    // (device name, boundary) in device order; own lock so boundary handlers
    // never wait on the device list
    device_boundaries: Mutex<Vec<(String, Rectangle)>>,
    boundary: Mutex<Rectangle>,
    last_frame: Mutex<Option<Instant>>,
    disposed: AtomicBool,

    exception: EventHandlers<FrameError>,
    updating: EventHandlers<UpdatingEvent>,
    updated: EventHandlers<UpdatedEvent>,
    layout_changed: EventHandlers<LayoutChangedEvent>,
}

impl Surface {
    pub fn new() -> Arc<Self> {
        Arc::new_cyclic(|self_ref| Self {
            owner: OwnerId::next(),
            self_ref: self_ref.clone(),
            frame: ReentrantMutex::new(()),
            triggers: Mutex::new(Vec::new()),
            devices: Mutex::new(Vec::new()),
            groups: Mutex::new(Vec::new()),
            next_group_order: AtomicU64::new(0),
            providers: Mutex::new(Vec::new()),
            device_boundaries: Mutex::new(Vec::new()),
            boundary: Mutex::new(Rectangle::default()),
            last_frame: Mutex::new(None),
            disposed: AtomicBool::new(false),
            exception: EventHandlers::new("surface-exception"),
            updating: EventHandlers::new("surface-updating"),
            updated: EventHandlers::new("surface-updated"),
            layout_changed: EventHandlers::new("surface-layout-changed"),
        })
    }

    pub fn owner_id(&self) -> OwnerId {
        self.owner
    }

    // ── Notification channels ────────────────────────────────────────────

    /// Failures inside frames and from loaded providers
    pub fn exception(&self) -> &EventHandlers<FrameError> {
        &self.exception
    }

    pub fn updating(&self) -> &EventHandlers<UpdatingEvent> {
        &self.updating
    }

    pub fn updated(&self) -> &EventHandlers<UpdatedEvent> {
        &self.updated
    }

    pub fn layout_changed(&self) -> &EventHandlers<LayoutChangedEvent> {
        &self.layout_changed
    }

    // ── Read-only views ──────────────────────────────────────────────────

    /// Union of all device boundaries
    pub fn boundary(&self) -> Rectangle {
        *self.boundary.lock()
    }

    /// Attached devices in attach order
    pub fn devices(&self) -> Vec<Arc<dyn RgbDevice>> {
        self.devices
            .lock()
            .iter()
            .map(|e| Arc::clone(&e.device))
            .collect()
    }

    pub fn device(&self, name: &str) -> Option<Arc<dyn RgbDevice>> {
        self.devices
            .lock()
            .iter()
            .find(|e| e.device.name() == name)
            .map(|e| Arc::clone(&e.device))
    }

    /// Every LED of every device, in device order
    pub fn leds(&self) -> Vec<LedRef> {
        self.devices()
            .iter()
            .flat_map(|device| device.leds())
            .collect()
    }

    /// Attached groups in render order: ascending z-index, ties in attach
    /// order. Read on every frame, so z-index changes apply to the next one.
    pub fn led_groups(&self) -> Vec<Arc<dyn LedGroup>> {
        let mut ordered: Vec<(i32, u64, Arc<dyn LedGroup>)> = self
            .groups
            .lock()
            .iter()
            .map(|e| (e.group.z_index(), e.order, Arc::clone(&e.group)))
            .collect();
        ordered.sort_by_key(|(z_index, order, _)| (*z_index, *order));
        ordered.into_iter().map(|(_, _, group)| group).collect()
    }

    pub fn triggers(&self) -> Vec<Arc<dyn UpdateTrigger>> {
        self.triggers
            .lock()
            .iter()
            .map(|e| Arc::clone(&e.trigger))
            .collect()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }

    // ── Devices ──────────────────────────────────────────────────────────

    /// Attach a device. Fails for unnamed devices, devices already attached
    /// (here or to another surface) and duplicate names.
    pub fn attach_device(&self, device: Arc<dyn RgbDevice>) -> Result<(), SurfaceError> {
        let _frame = self.frame.lock();
        self.check_alive()?;

        let name = device.name().to_string();
        if name.trim().is_empty() {
            return Err(SurfaceError::UnnamedDevice);
        }

        {
            let mut devices = self.devices.lock();
            if device.ownership().is_owned_by(self.owner)
                || devices.iter().any(|e| same_device(&*e.device, &*device))
            {
                return Err(SurfaceError::DeviceAlreadyAttached(name));
            }
            if devices.iter().any(|e| e.device.name() == name) {
                return Err(SurfaceError::DeviceAlreadyAttached(name));
            }
            if device.ownership().claim(self.owner).is_err() {
                return Err(SurfaceError::DeviceOwned(name));
            }

            let weak = self.self_ref.clone();
            let handler_name = name.clone();
            let subscription = device.layout().on_boundary_changed(move |boundary| {
                if let Some(surface) = weak.upgrade() {
                    surface.on_device_boundary_changed(&handler_name, *boundary);
                }
            });

            self.device_boundaries
                .lock()
                .push((name.clone(), device.boundary()));
            devices.push(DeviceEntry {
                device,
                subscription,
            });
        }

        info!("Attached device {}", name);
        self.recompute_boundary();
        self.layout_updated(LayoutChangedEvent {
            device_added: true,
            ..LayoutChangedEvent::default()
        });
        Ok(())
    }

    /// Detach a device and reset it: LEDs go transparent and the transport
    /// is turned off. A failing reset is reported through [`Surface::exception`].
    pub fn detach_device(&self, device: &dyn RgbDevice) -> Result<(), SurfaceError> {
        let _frame = self.frame.lock();

        let entry = {
            let mut devices = self.devices.lock();
            let index = devices
                .iter()
                .position(|e| same_device(&*e.device, device))
                .ok_or_else(|| SurfaceError::DeviceNotAttached(device.name().to_string()))?;
            devices.remove(index)
        };
        self.release_device(&entry);

        info!("Detached device {}", entry.device.name());
        self.recompute_boundary();
        self.layout_updated(LayoutChangedEvent {
            device_removed: true,
            ..LayoutChangedEvent::default()
        });
        Ok(())
    }

    /// Unhook a removed device, hand it back and turn it off
    fn release_device(&self, entry: &DeviceEntry) {
        entry
            .device
            .layout()
            .remove_boundary_handler(entry.subscription);
        entry.device.ownership().release(self.owner);
        let name = entry.device.name();
        self.device_boundaries.lock().retain(|(n, _)| n != name);
        self.reset_device(&*entry.device);
    }

    /// Load every device of `provider` and forward its failures to
    /// [`Surface::exception`]. Returns the number of devices attached.
    pub fn load(&self, provider: &dyn DeviceProvider) -> Result<usize, SurfaceError> {
        let _frame = self.frame.lock();
        self.check_alive()?;

        let devices = provider
            .load_devices()
            .map_err(|source| SurfaceError::Provider {
                provider: provider.name().to_string(),
                source,
            })?;

        let failures = Arc::clone(provider.failures());
        let weak = self.self_ref.clone();
        let subscription = failures.subscribe(move |failure: &ProviderFailure| {
            if let Some(surface) = weak.upgrade() {
                surface.report(FrameError::Provider {
                    source_name: failure.source.clone(),
                    message: failure.error.to_string(),
                    critical: failure.critical,
                });
            }
        });
        self.providers.lock().push(ProviderEntry {
            failures,
            subscription,
        });

        let count = devices.len();
        for device in devices {
            self.attach_device(device)?;
        }
        info!("Loaded {} devices from {}", count, provider.name());
        Ok(count)
    }

    // ── LED groups ───────────────────────────────────────────────────────

    /// Attach a group. Fails if the group already belongs to a surface.
    pub fn attach_group(&self, group: Arc<dyn LedGroup>) -> Result<(), SurfaceError> {
        let _frame = self.frame.lock();
        self.check_alive()?;

        if group.ownership().claim(self.owner).is_err() {
            return Err(SurfaceError::GroupOwned(group.name().to_string()));
        }

        group.on_attach(&self.leds());

        let order = self.next_group_order.fetch_add(1, Ordering::Relaxed);
        let mut groups = self.groups.lock();
        groups.push(GroupEntry { order, group });
        debug!("Attached LED group ({} groups)", groups.len());
        Ok(())
    }

    pub fn detach_group(&self, group: &dyn LedGroup) -> Result<(), SurfaceError> {
        let _frame = self.frame.lock();

        let removed = {
            let mut groups = self.groups.lock();
            let index = groups
                .iter()
                .position(|e| same_group(&*e.group, group))
                .ok_or_else(|| SurfaceError::GroupNotAttached(group.name().to_string()))?;
            groups.remove(index).group
        };
        removed.ownership().release(self.owner);
        removed.on_detach();
        Ok(())
    }

    // ── Triggers ─────────────────────────────────────────────────────────

    /// Register a trigger driving frames. Returns false if already registered.
    pub fn register_trigger(&self, trigger: Arc<dyn UpdateTrigger>) -> bool {
        let _frame = self.frame.lock();
        if self.is_disposed() {
            return false;
        }

        let mut triggers = self.triggers.lock();
        if triggers.iter().any(|e| same_trigger(&*e.trigger, &*trigger)) {
            return false;
        }

        let weak = self.self_ref.clone();
        let subscription = trigger.subscribe(Box::new(move |data| {
            if let Some(surface) = weak.upgrade() {
                surface.update_with(data);
            }
        }));
        debug!("Registered trigger {}", trigger.name());
        triggers.push(TriggerEntry {
            trigger,
            subscription,
        });
        true
    }

    /// Returns false if the trigger was not registered
    pub fn unregister_trigger(&self, trigger: &dyn UpdateTrigger) -> bool {
        let _frame = self.frame.lock();
        let entry = {
            let mut triggers = self.triggers.lock();
            let Some(index) = triggers
                .iter()
                .position(|e| same_trigger(&*e.trigger, trigger))
            else {
                return false;
            };
            triggers.remove(index)
        };
        entry.trigger.unsubscribe(entry.subscription);
        debug!("Unregistered trigger {}", entry.trigger.name());
        true
    }

    // ── Frames ───────────────────────────────────────────────────────────

    /// Render every group and flush every device once.
    ///
    /// With `flush_leds` devices send all LEDs, otherwise only dirty ones.
    pub fn update(&self, flush_leds: bool) {
        self.update_with(&CustomUpdateData::default().flush_leds(flush_leds));
    }

    pub fn update_with(&self, data: &CustomUpdateData) {
        let _frame = self.frame.lock();
        if self.is_disposed() {
            return;
        }

        let now = Instant::now();
        let delta_time = self
            .last_frame
            .lock()
            .replace(now)
            .map(|previous| now.duration_since(previous))
            .unwrap_or_default();

        self.updating.emit(&UpdatingEvent {
            delta_time,
            data: data.clone(),
        });

        if data.render {
            let boundary = self.boundary();
            for group in self.led_groups() {
                self.render_group(&*group, boundary);
            }
        }

        if data.update_devices {
            for device in self.devices() {
                self.update_device(&*device, data.flush_leds);
            }
        }

        self.updated.emit(&UpdatedEvent { data: data.clone() });
    }

    fn render_group(&self, group: &dyn LedGroup, surface_boundary: Rectangle) {
        let result = catch_unwind(AssertUnwindSafe(|| -> Result<(), BrushError> {
            let Some(brush) = group.brush() else {
                return Ok(());
            };
            if !brush.is_enabled() {
                return Ok(());
            }
            let leds = group.leds();
            if leds.is_empty() {
                return Ok(());
            }

            let rects: Vec<Rectangle> = leds.iter().map(|l| l.absolute_boundary()).collect();
            let (rectangle, targets) = match brush.calculation_mode() {
                CalculationMode::Relative => {
                    let bounds = Rectangle::union_all(rects.iter().copied());
                    let offset = -bounds.location();
                    let targets = leds
                        .into_iter()
                        .zip(rects)
                        .map(|(led, rect)| RenderTarget::new(led, rect.translate(offset)))
                        .collect::<Vec<_>>();
                    (Rectangle::from_size(bounds.size()), targets)
                }
                CalculationMode::Absolute => {
                    let targets = leds
                        .into_iter()
                        .zip(rects)
                        .map(|(led, rect)| RenderTarget::new(led, rect))
                        .collect::<Vec<_>>();
                    (surface_boundary, targets)
                }
            };

            for (target, color) in brush.render(rectangle, &targets)? {
                target.led.set_color(color);
            }
            Ok(())
        }));

        let error = match result {
            Ok(Ok(())) => return,
            Ok(Err(source)) => FrameError::Render {
                group: group.name().to_string(),
                source,
            },
            Err(payload) => FrameError::RenderPanicked {
                group: group.name().to_string(),
                message: panic_message(payload.as_ref()),
            },
        };
        self.report(error);
    }

    fn update_device(&self, device: &dyn RgbDevice, flush_leds: bool) {
        let error = match catch_unwind(AssertUnwindSafe(|| device.update(flush_leds))) {
            Ok(Ok(())) => return,
            Ok(Err(source)) => FrameError::Device {
                device: device.name().to_string(),
                source,
            },
            Err(payload) => FrameError::DevicePanicked {
                device: device.name().to_string(),
                message: panic_message(payload.as_ref()),
            },
        };
        self.report(error);
    }

    fn reset_device(&self, device: &dyn RgbDevice) {
        let error = match catch_unwind(AssertUnwindSafe(|| device.reset())) {
            Ok(Ok(())) => return,
            Ok(Err(source)) => FrameError::Device {
                device: device.name().to_string(),
                source,
            },
            Err(payload) => FrameError::DevicePanicked {
                device: device.name().to_string(),
                message: panic_message(payload.as_ref()),
            },
        };
        self.report(error);
    }

    fn report(&self, error: FrameError) {
        warn!("{}", error);
        self.exception.emit(&error);
    }

    // ── Layout ───────────────────────────────────────────────────────────

    fn on_device_boundary_changed(&self, name: &str, boundary: Rectangle) {
        let _frame = self.frame.lock();
        {
            let mut boundaries = self.device_boundaries.lock();
            match boundaries.iter_mut().find(|(n, _)| n == name) {
                Some(entry) => entry.1 = boundary,
                None => return,
            }
        }
        self.recompute_boundary();
        self.layout_updated(LayoutChangedEvent {
            device_moved: true,
            ..LayoutChangedEvent::default()
        });
    }

    fn recompute_boundary(&self) {
        let boundary = Rectangle::union_all(
            self.device_boundaries
                .lock()
                .iter()
                .map(|(_, rect)| *rect),
        );
        *self.boundary.lock() = boundary;
    }

    fn layout_updated(&self, event: LayoutChangedEvent) {
        let leds = self.leds();
        for group in self.led_groups() {
            group.on_surface_layout_changed(&leds);
        }
        self.layout_changed.emit(&event);
    }

    fn check_alive(&self) -> Result<(), SurfaceError> {
        if self.is_disposed() {
            Err(SurfaceError::Disposed)
        } else {
            Ok(())
        }
    }

    // ── Lifecycle ────────────────────────────────────────────────────────

    /// Stop and drop every trigger, detach (and reset) every device and
    /// detach every group.
    ///
    /// Triggers are stopped without the frame lock held, so a frame in
    /// flight on a trigger thread completes first. Safe to call twice.
    pub fn dispose(&self) {
        if self.disposed.swap(true, Ordering::AcqRel) {
            return;
        }

        let triggers = std::mem::take(&mut *self.triggers.lock());
        for entry in &triggers {
            entry.trigger.unsubscribe(entry.subscription);
            entry.trigger.stop();
        }

        let _frame = self.frame.lock();
        let devices = std::mem::take(&mut *self.devices.lock());
        for entry in &devices {
            self.release_device(entry);
        }
        let groups = std::mem::take(&mut *self.groups.lock());
        for entry in &groups {
            entry.group.ownership().release(self.owner);
            entry.group.on_detach();
        }
        for entry in std::mem::take(&mut *self.providers.lock()) {
            entry.failures.unsubscribe(entry.subscription);
        }
        *self.boundary.lock() = Rectangle::default();
        info!(
            "Disposed surface ({} triggers, {} devices, {} groups)",
            triggers.len(),
            devices.len(),
            groups.len()
        );
    }
}

impl Drop for Surface {
    fn drop(&mut self) {
        self.dispose();
    }
}

fn same_device(a: &dyn RgbDevice, b: &dyn RgbDevice) -> bool {
    std::ptr::addr_eq(a as *const dyn RgbDevice, b as *const dyn RgbDevice)
}

fn same_group(a: &dyn LedGroup, b: &dyn LedGroup) -> bool {
    std::ptr::addr_eq(a as *const dyn LedGroup, b as *const dyn LedGroup)
}

fn same_trigger(a: &dyn UpdateTrigger, b: &dyn UpdateTrigger) -> bool {
    std::ptr::addr_eq(a as *const dyn UpdateTrigger, b as *const dyn UpdateTrigger)
}
