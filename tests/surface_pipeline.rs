//! Integration tests for the surface frame pipeline.
//!
//! These drive the public API end to end: attaching devices and groups,
//! rendering through brushes in z-order, flushing devices, and the
//! notification channels around a frame.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use rgbscape::brush::{GradientStop, LinearGradientBrush, SolidColorBrush};
use rgbscape::config::SurfaceConfig;
use rgbscape::devices::{SinkKind, VirtualDeviceProvider};
use rgbscape::{
    commit_leds, Brush, BrushError, CalculationMode, Color, CustomUpdateData, DeviceError,
    DeviceInfo, DeviceLayout, DeviceType, FrameError, LedGroup, LedId, ListLedGroup,
    ManualUpdateTrigger, Ownership, Point, RectangleLedGroup, Rectangle, RenderTarget, RgbDevice,
    Size, Surface, SurfaceError, TimerUpdateTrigger, UpdateTrigger,
};

// ── Test doubles ──

#[derive(Clone, Copy, PartialEq)]
enum Behavior {
    Ok,
    Fail,
    Panic,
}

/// Row of 10x10 LEDs with ids starting at 1
struct TestDevice {
    info: DeviceInfo,
    layout: DeviceLayout,
    ownership: Ownership,
    behavior: Behavior,
    updates: AtomicUsize,
    resets: AtomicUsize,
    sent: Mutex<Vec<(LedId, Color)>>,
}

impl TestDevice {
    fn new(name: &str, x: f32, leds: u32) -> Arc<Self> {
        Self::with_behavior(name, x, leds, Behavior::Ok)
    }

    fn with_behavior(name: &str, x: f32, leds: u32, behavior: Behavior) -> Arc<Self> {
        let layout = DeviceLayout::new(Point::new(x, 0.0), Size::new(leds as f32 * 10.0, 10.0));
        for i in 0..leds {
            layout
                .add_led(
                    LedId(i + 1),
                    Point::new(i as f32 * 10.0, 0.0),
                    Size::uniform(10.0),
                )
                .unwrap();
        }
        Arc::new(Self {
            info: DeviceInfo::new(DeviceType::LedStripe, "Test", "Strip").with_name(name),
            layout,
            ownership: Ownership::new(),
            behavior,
            updates: AtomicUsize::new(0),
            resets: AtomicUsize::new(0),
            sent: Mutex::new(Vec::new()),
        })
    }

    fn led_color(&self, id: u32) -> Color {
        self.layout.led(LedId(id)).unwrap().color()
    }
}

impl RgbDevice for TestDevice {
    fn info(&self) -> &DeviceInfo {
        &self.info
    }

    fn layout(&self) -> &DeviceLayout {
        &self.layout
    }

    fn ownership(&self) -> &Ownership {
        &self.ownership
    }

    fn update(&self, flush_leds: bool) -> Result<(), DeviceError> {
        self.updates.fetch_add(1, Ordering::SeqCst);
        match self.behavior {
            Behavior::Fail => Err(DeviceError::update_failed(self.name(), "unplugged")),
            Behavior::Panic => panic!("device exploded"),
            Behavior::Ok => {
                let batch = commit_leds(&self.layout.leds(), flush_leds);
                self.sent.lock().extend(batch);
                Ok(())
            }
        }
    }

    fn reset(&self) -> Result<(), DeviceError> {
        self.resets.fetch_add(1, Ordering::SeqCst);
        match self.behavior {
            Behavior::Fail => Err(DeviceError::update_failed(self.name(), "unplugged")),
            Behavior::Panic => panic!("device exploded on reset"),
            Behavior::Ok => {
                for led in self.layout.leds() {
                    led.write().reset();
                }
                Ok(())
            }
        }
    }
}

type RenderFn =
    dyn Fn(Rectangle, &[RenderTarget]) -> Result<Vec<(RenderTarget, Color)>, BrushError>
        + Send
        + Sync;

/// Brush backed by a closure
struct FnBrush {
    mode: CalculationMode,
    render: Box<RenderFn>,
}

impl FnBrush {
    fn new<F>(mode: CalculationMode, render: F) -> Arc<Self>
    where
        F: Fn(Rectangle, &[RenderTarget]) -> Result<Vec<(RenderTarget, Color)>, BrushError>
            + Send
            + Sync
            + 'static,
    {
        Arc::new(Self {
            mode,
            render: Box::new(render),
        })
    }
}

impl Brush for FnBrush {
    fn is_enabled(&self) -> bool {
        true
    }

    fn calculation_mode(&self) -> CalculationMode {
        self.mode
    }

    fn render(
        &self,
        rectangle: Rectangle,
        targets: &[RenderTarget],
    ) -> Result<Vec<(RenderTarget, Color)>, BrushError> {
        (self.render)(rectangle, targets)
    }
}

fn solid(color: Color) -> Arc<SolidColorBrush> {
    Arc::new(SolidColorBrush::new(color))
}

/// Short descriptions of every exception raised on `surface`
fn collect_errors(surface: &Surface) -> Arc<Mutex<Vec<String>>> {
    let errors = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&errors);
    surface.exception().subscribe(move |e: &FrameError| {
        let kind = match e {
            FrameError::Render { group, .. } => format!("render:{group}"),
            FrameError::RenderPanicked { group, .. } => format!("render-panic:{group}"),
            FrameError::Device { device, .. } => format!("device:{device}"),
            FrameError::DevicePanicked { device, .. } => format!("device-panic:{device}"),
            FrameError::Provider { source_name, .. } => format!("provider:{source_name}"),
        };
        sink.lock().push(kind);
    });
    errors
}

fn count_frames(surface: &Surface) -> Arc<AtomicUsize> {
    let frames = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&frames);
    surface.updated().subscribe(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    frames
}

// ── End to end ──

#[test]
fn pipeline_two_led_example() {
    let surface = Surface::new();
    let device = TestDevice::new("strip", 0.0, 2);
    surface.attach_device(device.clone()).unwrap();

    // Red for LED 1 only, LED 2 untouched
    let brush = FnBrush::new(CalculationMode::Absolute, |_, targets| {
        Ok(targets
            .iter()
            .filter(|t| t.led.id() == LedId(1))
            .map(|t| (t.clone(), Color::RED))
            .collect())
    });
    let group = Arc::new(
        ListLedGroup::new("first")
            .with_leds(device.leds())
            .with_brush(brush),
    );
    surface.attach_group(group).unwrap();

    surface.update(false);

    assert_eq!(device.led_color(1), Color::RED);
    assert_eq!(device.led_color(1).a(), 1.0);
    assert_eq!(device.led_color(2), Color::TRANSPARENT);
    // Only the dirty LED went to the device
    assert_eq!(*device.sent.lock(), vec![(LedId(1), Color::RED)]);
}

#[test]
fn pipeline_flush_sends_every_led() {
    let surface = Surface::new();
    let device = TestDevice::new("strip", 0.0, 3);
    surface.attach_device(device.clone()).unwrap();

    surface.update(false);
    assert!(device.sent.lock().is_empty());

    surface.update(true);
    assert_eq!(device.sent.lock().len(), 3);
}

// ── Z-order ──

#[test]
fn pipeline_z_order_is_ascending_and_stable() {
    let surface = Surface::new();
    let device = TestDevice::new("strip", 0.0, 1);
    surface.attach_device(device.clone()).unwrap();

    let order = Arc::new(Mutex::new(Vec::new()));
    for (name, z) in [("a", 3), ("b", 1), ("c", 2), ("d", 1)] {
        let log = Arc::clone(&order);
        let brush = FnBrush::new(CalculationMode::Relative, move |_, _| {
            log.lock().push(name);
            Ok(Vec::new())
        });
        let group = ListLedGroup::new(name)
            .with_leds(device.leds())
            .with_z_index(z)
            .with_brush(brush);
        surface.attach_group(Arc::new(group)).unwrap();
    }

    let names: Vec<String> = surface
        .led_groups()
        .iter()
        .map(|g| g.name().to_string())
        .collect();
    assert_eq!(names, ["b", "d", "c", "a"]);

    surface.update(false);
    assert_eq!(*order.lock(), vec!["b", "d", "c", "a"]);
}

#[test]
fn pipeline_z_index_change_applies_next_frame() {
    let surface = Surface::new();
    let device = TestDevice::new("strip", 0.0, 1);
    surface.attach_device(device.clone()).unwrap();

    let red = Arc::new(
        ListLedGroup::new("red")
            .with_leds(device.leds())
            .with_brush(solid(Color::RED)),
    );
    let green = Arc::new(
        ListLedGroup::new("green")
            .with_leds(device.leds())
            .with_brush(solid(Color::GREEN)),
    );
    surface.attach_group(red.clone()).unwrap();
    surface.attach_group(green.clone()).unwrap();

    surface.update(false);
    assert_eq!(device.led_color(1), Color::GREEN);

    red.core().set_z_index(5);
    surface.update(false);
    assert_eq!(device.led_color(1), Color::RED);
    let names: Vec<String> = surface
        .led_groups()
        .iter()
        .map(|g| g.name().to_string())
        .collect();
    assert_eq!(names, ["green", "red"]);

    // Back on a tie, attach order decides again
    red.core().set_z_index(0);
    surface.update(false);
    assert_eq!(device.led_color(1), Color::GREEN);
}

#[test]
fn pipeline_later_groups_compose_over_earlier() {
    let surface = Surface::new();
    let device = TestDevice::new("strip", 0.0, 1);
    surface.attach_device(device.clone()).unwrap();

    let overlay = Color::new(0.5, 0.0, 0.0, 1.0);
    // attached in reverse to show z-index decides, not attach order
    let top = ListLedGroup::new("top")
        .with_leds(device.leds())
        .with_z_index(1)
        .with_brush(solid(overlay));
    let base = ListLedGroup::new("base")
        .with_leds(device.leds())
        .with_z_index(0)
        .with_brush(solid(Color::RED));
    surface.attach_group(Arc::new(top)).unwrap();
    surface.attach_group(Arc::new(base)).unwrap();

    surface.update(false);
    assert_eq!(device.led_color(1), Color::RED.blend(overlay));
}

// ── Failure isolation ──

#[test]
fn pipeline_failing_brush_does_not_stop_frame() {
    let surface = Surface::new();
    let device = TestDevice::new("strip", 0.0, 3);
    surface.attach_device(device.clone()).unwrap();
    let errors = collect_errors(&surface);
    let frames = count_frames(&surface);

    let leds = device.leds();
    let failing = FnBrush::new(CalculationMode::Relative, |_, _| {
        Err(BrushError::Failed("no data".to_string()))
    });
    let groups = [
        ListLedGroup::new("one")
            .with_leds([leds[0].clone()])
            .with_brush(solid(Color::RED)),
        ListLedGroup::new("two")
            .with_leds([leds[1].clone()])
            .with_z_index(1)
            .with_brush(failing),
        ListLedGroup::new("three")
            .with_leds([leds[2].clone()])
            .with_z_index(2)
            .with_brush(solid(Color::BLUE)),
    ];
    for group in groups {
        surface.attach_group(Arc::new(group)).unwrap();
    }

    surface.update(false);

    assert_eq!(device.led_color(1), Color::RED);
    assert_eq!(device.led_color(2), Color::TRANSPARENT);
    assert_eq!(device.led_color(3), Color::BLUE);
    assert_eq!(*errors.lock(), vec!["render:two"]);
    assert_eq!(frames.load(Ordering::SeqCst), 1);
}

#[test]
fn pipeline_panicking_brush_is_isolated() {
    let surface = Surface::new();
    let device = TestDevice::new("strip", 0.0, 2);
    surface.attach_device(device.clone()).unwrap();
    let errors = collect_errors(&surface);

    let leds = device.leds();
    let panicking = FnBrush::new(CalculationMode::Relative, |_, _| panic!("brush exploded"));
    surface
        .attach_group(Arc::new(
            ListLedGroup::new("bad")
                .with_leds([leds[0].clone()])
                .with_brush(panicking),
        ))
        .unwrap();
    surface
        .attach_group(Arc::new(
            ListLedGroup::new("good")
                .with_leds([leds[1].clone()])
                .with_z_index(1)
                .with_brush(solid(Color::GREEN)),
        ))
        .unwrap();

    surface.update(false);
    assert_eq!(device.led_color(2), Color::GREEN);
    assert_eq!(*errors.lock(), vec!["render-panic:bad"]);
}

#[test]
fn pipeline_failing_devices_do_not_block_others() {
    let surface = Surface::new();
    let first = TestDevice::new("first", 0.0, 1);
    let failing = TestDevice::with_behavior("failing", 10.0, 1, Behavior::Fail);
    let panicking = TestDevice::with_behavior("panicking", 20.0, 1, Behavior::Panic);
    let last = TestDevice::new("last", 30.0, 1);
    for device in [&first, &failing, &panicking, &last] {
        surface.attach_device((*device).clone()).unwrap();
    }
    let errors = collect_errors(&surface);

    surface
        .attach_group(Arc::new(
            ListLedGroup::new("all")
                .with_leds(surface.leds())
                .with_brush(solid(Color::WHITE)),
        ))
        .unwrap();

    surface.update(false);

    for device in [&first, &failing, &panicking, &last] {
        assert_eq!(device.updates.load(Ordering::SeqCst), 1);
    }
    assert_eq!(first.led_color(1), Color::WHITE);
    assert_eq!(last.led_color(1), Color::WHITE);
    assert_eq!(*errors.lock(), vec!["device:failing", "device-panic:panicking"]);
}

#[test]
fn pipeline_panicking_exception_handler_is_contained() {
    let surface = Surface::new();
    let device = TestDevice::with_behavior("failing", 0.0, 1, Behavior::Fail);
    surface.attach_device(device).unwrap();
    surface.exception().subscribe(|_| panic!("handler exploded"));
    let errors = collect_errors(&surface);
    let frames = count_frames(&surface);

    surface.update(false);

    assert_eq!(*errors.lock(), vec!["device:failing"]);
    assert_eq!(frames.load(Ordering::SeqCst), 1);
}

// ── Attach / detach exclusivity ──

#[test]
fn pipeline_device_attach_rules() {
    let surface = Surface::new();
    let device = TestDevice::new("strip", 0.0, 2);
    surface.attach_device(device.clone()).unwrap();

    assert!(matches!(
        surface.attach_device(device.clone()),
        Err(SurfaceError::DeviceAlreadyAttached(name)) if name == "strip"
    ));
    let twin = TestDevice::new("strip", 50.0, 1);
    assert!(matches!(
        surface.attach_device(twin.clone()),
        Err(SurfaceError::DeviceAlreadyAttached(_))
    ));
    assert!(!twin.ownership().is_owned());

    let unnamed = TestDevice::new("  ", 0.0, 1);
    assert!(matches!(
        surface.attach_device(unnamed),
        Err(SurfaceError::UnnamedDevice)
    ));

    let other = Surface::new();
    assert!(matches!(
        other.attach_device(device.clone()),
        Err(SurfaceError::DeviceOwned(_))
    ));

    // Nothing changed on either surface
    assert_eq!(surface.devices().len(), 1);
    assert_eq!(surface.leds().len(), 2);
    assert!(other.devices().is_empty());

    let stranger = TestDevice::new("stranger", 0.0, 1);
    assert!(matches!(
        surface.detach_device(&*stranger),
        Err(SurfaceError::DeviceNotAttached(_))
    ));
    assert_eq!(surface.devices().len(), 1);

    surface.detach_device(&*device).unwrap();
    assert!(surface.devices().is_empty());
    assert!(!device.ownership().is_owned());
    other.attach_device(device).unwrap();
}

#[test]
fn pipeline_group_attach_rules() {
    let surface = Surface::new();
    let other = Surface::new();
    let group = Arc::new(ListLedGroup::new("g").with_brush(solid(Color::RED)));

    surface.attach_group(group.clone()).unwrap();
    assert!(matches!(
        surface.attach_group(group.clone()),
        Err(SurfaceError::GroupOwned(_))
    ));
    assert!(matches!(
        other.attach_group(group.clone()),
        Err(SurfaceError::GroupOwned(_))
    ));
    assert_eq!(surface.led_groups().len(), 1);
    assert!(other.led_groups().is_empty());

    assert!(matches!(
        other.detach_group(&*group),
        Err(SurfaceError::GroupNotAttached(_))
    ));
    assert_eq!(surface.led_groups().len(), 1);

    surface.detach_group(&*group).unwrap();
    assert!(surface.led_groups().is_empty());
    other.attach_group(group).unwrap();
}

// ── Geometry and layout ──

#[test]
fn pipeline_boundary_follows_devices() {
    let surface = Surface::new();
    let events = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&events);
    surface.layout_changed().subscribe(move |e| log.lock().push(*e));

    let left = TestDevice::new("left", 0.0, 2);
    let right = TestDevice::new("right", 100.0, 1);
    surface.attach_device(left.clone()).unwrap();
    surface.attach_device(right.clone()).unwrap();
    assert_eq!(surface.boundary(), Rectangle::from_xywh(0.0, 0.0, 110.0, 10.0));

    right.layout().set_location(Point::new(200.0, 20.0));
    assert_eq!(surface.boundary(), Rectangle::from_xywh(0.0, 0.0, 210.0, 30.0));
    assert_eq!(
        right.layout().led(LedId(1)).unwrap().absolute_boundary(),
        Rectangle::from_xywh(200.0, 20.0, 10.0, 10.0)
    );

    surface.detach_device(&*right).unwrap();
    assert_eq!(surface.boundary(), Rectangle::from_xywh(0.0, 0.0, 20.0, 10.0));

    let events = events.lock();
    assert_eq!(events.len(), 4);
    assert!(events[0].device_added && events[1].device_added);
    assert!(events[2].device_moved);
    assert!(events[3].device_removed);

    // Detached devices no longer move the surface
    right.layout().set_location(Point::new(500.0, 0.0));
    assert_eq!(surface.boundary(), Rectangle::from_xywh(0.0, 0.0, 20.0, 10.0));
}

#[test]
fn pipeline_rotated_device_boundary() {
    let surface = Surface::new();
    let device = TestDevice::new("bar", 0.0, 1);
    device.layout().set_size(Size::new(10.0, 0.0));
    surface.attach_device(device.clone()).unwrap();

    device.layout().set_rotation(rgbscape::Rotation::from_degrees(90.0));
    let boundary = surface.boundary();
    assert!((boundary.width() - 0.0).abs() < 1e-3, "{boundary:?}");
    assert!((boundary.height() - 10.0).abs() < 1e-3, "{boundary:?}");
}

#[test]
fn pipeline_rectangle_group_tracks_layout() {
    let surface = Surface::new();
    let device = TestDevice::new("strip", 0.0, 2);
    surface.attach_device(device.clone()).unwrap();

    let group = Arc::new(
        RectangleLedGroup::new("window", Rectangle::from_xywh(0.0, 0.0, 20.0, 10.0))
            .with_brush(solid(Color::RED)),
    );
    surface.attach_group(group.clone()).unwrap();
    assert_eq!(group.leds().len(), 2);

    device.layout().set_location(Point::new(50.0, 0.0));
    assert!(group.leds().is_empty());

    let late = TestDevice::new("late", 10.0, 1);
    surface.attach_device(late.clone()).unwrap();
    assert_eq!(group.leds().len(), 1);

    surface.update(false);
    assert_eq!(late.led_color(1), Color::RED);
    assert_eq!(device.led_color(1), Color::TRANSPARENT);
}

#[test]
fn pipeline_relative_and_absolute_rectangles() {
    let surface = Surface::new();
    let anchor = TestDevice::new("anchor", 0.0, 1);
    let device = TestDevice::new("strip", 100.0, 2);
    surface.attach_device(anchor).unwrap();
    surface.attach_device(device.clone()).unwrap();

    let seen = Arc::new(Mutex::new(Vec::new()));
    for mode in [CalculationMode::Relative, CalculationMode::Absolute] {
        let log = Arc::clone(&seen);
        let brush = FnBrush::new(mode, move |rect, targets| {
            log.lock()
                .push((rect, targets.iter().map(|t| t.rectangle).collect::<Vec<_>>()));
            Ok(Vec::new())
        });
        surface
            .attach_group(Arc::new(
                ListLedGroup::new(format!("{mode}"))
                    .with_leds(device.leds())
                    .with_brush(brush),
            ))
            .unwrap();
    }

    surface.update(false);
    let seen = seen.lock();

    let (relative, targets) = &seen[0];
    assert_eq!(*relative, Rectangle::from_xywh(0.0, 0.0, 20.0, 10.0));
    assert_eq!(targets[0], Rectangle::from_xywh(0.0, 0.0, 10.0, 10.0));
    assert_eq!(targets[1], Rectangle::from_xywh(10.0, 0.0, 10.0, 10.0));

    let (absolute, targets) = &seen[1];
    assert_eq!(*absolute, Rectangle::from_xywh(0.0, 0.0, 120.0, 10.0));
    assert_eq!(targets[1], Rectangle::from_xywh(110.0, 0.0, 10.0, 10.0));
}

#[test]
fn pipeline_gradient_across_group() {
    let surface = Surface::new();
    let device = TestDevice::new("strip", 40.0, 2);
    surface.attach_device(device.clone()).unwrap();

    let gradient = LinearGradientBrush::new(vec![
        GradientStop::new(0.0, Color::RED),
        GradientStop::new(1.0, Color::BLUE),
    ]);
    surface
        .attach_group(Arc::new(
            ListLedGroup::new("gradient")
                .with_leds(device.leds())
                .with_brush(Arc::new(gradient)),
        ))
        .unwrap();

    surface.update(false);
    // Centers at 25% and 75% of the group's own bounds
    assert!(device
        .led_color(1)
        .approx_eq(&Color::from_rgb(0.75, 0.0, 0.25), 1e-3));
    assert!(device
        .led_color(2)
        .approx_eq(&Color::from_rgb(0.25, 0.0, 0.75), 1e-3));
}

// ── Triggers and frame notifications ──

#[test]
fn pipeline_manual_trigger_drives_frames() {
    let surface = Surface::new();
    let frames = count_frames(&surface);
    let trigger = Arc::new(ManualUpdateTrigger::new("manual"));

    assert!(surface.register_trigger(trigger.clone()));
    assert!(!surface.register_trigger(trigger.clone()));
    assert_eq!(surface.triggers().len(), 1);

    // Not started: nothing fires
    assert!(!trigger.trigger_update());
    trigger.start().unwrap();
    assert!(trigger.trigger_update());
    assert!(trigger.trigger_update());
    assert_eq!(frames.load(Ordering::SeqCst), 2);

    assert!(surface.unregister_trigger(&*trigger));
    assert!(!surface.unregister_trigger(&*trigger));
    trigger.trigger_update();
    assert_eq!(frames.load(Ordering::SeqCst), 2);
}

#[test]
fn pipeline_timer_trigger_stops_cleanly() {
    let surface = Surface::new();
    let frames = count_frames(&surface);
    let timer = Arc::new(TimerUpdateTrigger::new("timer", Duration::from_millis(5)));
    surface.register_trigger(timer.clone());
    timer.start().unwrap();

    let deadline = Instant::now() + Duration::from_secs(5);
    while frames.load(Ordering::SeqCst) < 3 && Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(5));
    }
    timer.stop();
    assert!(!timer.is_running());

    let stopped_at = frames.load(Ordering::SeqCst);
    assert!(stopped_at >= 3);
    std::thread::sleep(Duration::from_millis(40));
    assert_eq!(frames.load(Ordering::SeqCst), stopped_at);
}

#[test]
fn pipeline_frame_data_reaches_handlers() {
    let surface = Surface::new();
    let device = TestDevice::new("strip", 0.0, 1);
    surface.attach_device(device.clone()).unwrap();

    let rendered = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&rendered);
    let brush = FnBrush::new(CalculationMode::Relative, move |_, _| {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(Vec::new())
    });
    surface
        .attach_group(Arc::new(
            ListLedGroup::new("g").with_leds(device.leds()).with_brush(brush),
        ))
        .unwrap();

    let starting = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&starting);
    surface
        .updating()
        .subscribe(move |e| log.lock().push((e.delta_time, e.data.clone())));

    surface.update(true);
    surface.update_with(&CustomUpdateData::default().render(false).with("source", "test"));
    surface.update_with(&CustomUpdateData::default().update_devices(false));

    let starting = starting.lock();
    assert_eq!(starting.len(), 3);
    assert_eq!(starting[0].0, Duration::ZERO);
    assert!(starting[0].1.flush_leds);
    assert_eq!(starting[1].1.extra.get("source").map(String::as_str), Some("test"));

    // Frame 2 skipped rendering, frame 3 skipped devices
    assert_eq!(rendered.load(Ordering::SeqCst), 2);
    assert_eq!(device.updates.load(Ordering::SeqCst), 2);
}

// ── Providers and lifecycle ──

const PROVIDER_TOML: &str = r##"
[[device]]
name = "left"
rows = 1
cols = 2

[[device]]
name = "right"
location = { x = 30.0, y = 0.0 }
rows = 1
cols = 2
"##;

#[test]
fn pipeline_provider_failures_reach_exception_channel() {
    let config = SurfaceConfig::from_toml(PROVIDER_TOML).unwrap();
    let provider = VirtualDeviceProvider::new(config.device, SinkKind::Memory);
    let surface = Surface::new();
    assert_eq!(surface.load(&provider).unwrap(), 2);
    let errors = collect_errors(&surface);

    surface
        .attach_group(Arc::new(
            ListLedGroup::new("all")
                .with_leds(surface.leds())
                .with_brush(solid(Color::GREEN)),
        ))
        .unwrap();

    let left = provider.memory_sink("left").unwrap();
    let right = provider.memory_sink("right").unwrap();
    left.fail_next("cable pulled");
    surface.update(false);

    assert_eq!(*errors.lock(), vec!["provider:left"]);
    assert!(left.batches().is_empty());
    assert_eq!(right.batches().len(), 1);
    assert_eq!(right.color(LedId(1)), Some(Color::GREEN));
}

#[test]
fn pipeline_detach_and_dispose_reset_devices() {
    let config = SurfaceConfig::from_toml(PROVIDER_TOML).unwrap();
    let provider = VirtualDeviceProvider::new(config.device, SinkKind::Memory);
    let surface = Surface::new();
    surface.load(&provider).unwrap();
    surface
        .attach_group(Arc::new(
            ListLedGroup::new("all")
                .with_leds(surface.leds())
                .with_brush(solid(Color::RED)),
        ))
        .unwrap();
    surface.update(false);

    let left = surface.device("left").unwrap();
    let right = surface.device("right").unwrap();
    let left_sink = provider.memory_sink("left").unwrap();
    let right_sink = provider.memory_sink("right").unwrap();
    assert_eq!(left_sink.color(LedId(0)), Some(Color::RED));

    surface.detach_device(&*left).unwrap();
    assert_eq!(left_sink.reset_count(), 1);
    assert_eq!(left_sink.color(LedId(0)), Some(Color::BLACK));
    for led in left.leds() {
        assert_eq!(led.color(), Color::TRANSPARENT);
        assert!(!led.read().is_dirty());
    }
    // The device still attached keeps its colors
    assert_eq!(right_sink.reset_count(), 0);
    assert_eq!(right.leds()[0].color(), Color::RED);

    surface.dispose();
    assert_eq!(left_sink.reset_count(), 1);
    assert_eq!(right_sink.reset_count(), 1);
    for led in right.leds() {
        assert_eq!(led.color(), Color::TRANSPARENT);
    }
}

#[test]
fn pipeline_failing_reset_is_reported() {
    let surface = Surface::new();
    let failing = TestDevice::with_behavior("failing", 0.0, 1, Behavior::Fail);
    let panicking = TestDevice::with_behavior("panicking", 10.0, 1, Behavior::Panic);
    surface.attach_device(failing.clone()).unwrap();
    surface.attach_device(panicking.clone()).unwrap();
    let errors = collect_errors(&surface);

    // Detach still succeeds and releases the device
    surface.detach_device(&*failing).unwrap();
    assert!(!failing.ownership().is_owned());
    assert_eq!(failing.resets.load(Ordering::SeqCst), 1);
    assert_eq!(*errors.lock(), vec!["device:failing"]);

    surface.dispose();
    assert!(!panicking.ownership().is_owned());
    assert_eq!(
        *errors.lock(),
        vec!["device:failing", "device-panic:panicking"]
    );
}

#[test]
fn pipeline_dispose_releases_everything() {
    let surface = Surface::new();
    let device = TestDevice::new("strip", 0.0, 1);
    let group = Arc::new(ListLedGroup::new("g").with_leds(device.leds()));
    let trigger = Arc::new(ManualUpdateTrigger::new("manual"));
    surface.attach_device(device.clone()).unwrap();
    surface.attach_group(group.clone()).unwrap();
    surface.register_trigger(trigger.clone());
    trigger.start().unwrap();

    surface.dispose();

    assert!(surface.is_disposed());
    assert!(!trigger.is_running());
    assert!(surface.devices().is_empty());
    assert!(surface.led_groups().is_empty());
    assert!(!device.ownership().is_owned());
    assert_eq!(device.resets.load(Ordering::SeqCst), 1);
    assert!(!group.ownership().is_owned());
    assert!(matches!(
        surface.attach_device(device.clone()),
        Err(SurfaceError::Disposed)
    ));

    // Released resources are usable elsewhere
    let next = Surface::new();
    next.attach_device(device).unwrap();
    next.attach_group(group).unwrap();
}

#[test]
fn pipeline_dropping_surface_releases_devices() {
    let device = TestDevice::new("strip", 0.0, 1);
    {
        let surface = Surface::new();
        surface.attach_device(device.clone()).unwrap();
        assert!(device.ownership().is_owned());
    }
    assert!(!device.ownership().is_owned());
}
