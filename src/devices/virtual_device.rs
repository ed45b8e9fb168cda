//! In-process device with a configurable LED grid.
//!
//! Committed colors go through the device's corrections and into an
//! [`UpdateQueue`], whose trigger hands them to the sink.

use std::fmt;
use std::sync::Arc;

use rgbscape_device::{
    commit_leds, ColorCorrection, DeviceError, DeviceInfo, DeviceLayout, FailureChannel,
    RgbDevice, UpdateQueue, UpdateSink, UpdateTrigger,
};
use rgbscape_model::{Color, LedId, Ownership, Point, Size};
use serde::{Deserialize, Serialize};
use tracing::trace;

/// LED arrangement of a grid device
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridSpec {
    pub rows: u32,
    pub cols: u32,
    pub led_size: Size,
    /// Gap between neighbouring LEDs
    #[serde(default)]
    pub spacing: f32,
}

impl GridSpec {
    pub fn new(rows: u32, cols: u32, led_size: Size) -> Self {
        Self {
            rows,
            cols,
            led_size,
            spacing: 0.0,
        }
    }

    pub fn with_spacing(mut self, spacing: f32) -> Self {
        self.spacing = spacing;
        self
    }

    pub fn led_count(&self) -> u32 {
        self.rows * self.cols
    }

    /// LED id of a cell, row-major
    pub fn led_id(&self, row: u32, col: u32) -> LedId {
        LedId(row * self.cols + col)
    }

    /// Device-local location of a cell
    pub fn led_location(&self, row: u32, col: u32) -> Point {
        Point::new(
            col as f32 * (self.led_size.width + self.spacing),
            row as f32 * (self.led_size.height + self.spacing),
        )
    }

    pub fn size(&self) -> Size {
        let extent = |n: u32, edge: f32| {
            if n == 0 {
                0.0
            } else {
                n as f32 * edge + (n - 1) as f32 * self.spacing
            }
        };
        Size::new(
            extent(self.cols, self.led_size.width),
            extent(self.rows, self.led_size.height),
        )
    }
}

pub struct VirtualDevice {
    info: DeviceInfo,
    layout: DeviceLayout,
    ownership: Ownership,
    queue: UpdateQueue<LedId, Color>,
    corrections: Vec<Box<dyn ColorCorrection>>,
}

impl VirtualDevice {
    pub fn new(
        info: DeviceInfo,
        layout: DeviceLayout,
        trigger: Arc<dyn UpdateTrigger>,
        sink: Arc<dyn UpdateSink<LedId, Color>>,
        failures: Arc<FailureChannel>,
    ) -> Self {
        let queue = UpdateQueue::new(info.device_name.clone(), trigger, sink, failures);
        Self {
            info,
            layout,
            ownership: Ownership::new(),
            queue,
            corrections: Vec::new(),
        }
    }

    /// Device at `location` with a `grid` of LEDs
    pub fn grid(
        info: DeviceInfo,
        location: Point,
        grid: GridSpec,
        trigger: Arc<dyn UpdateTrigger>,
        sink: Arc<dyn UpdateSink<LedId, Color>>,
        failures: Arc<FailureChannel>,
    ) -> Result<Self, DeviceError> {
        let layout = DeviceLayout::new(location, grid.size());
        for row in 0..grid.rows {
            for col in 0..grid.cols {
                layout.add_led(
                    grid.led_id(row, col),
                    grid.led_location(row, col),
                    grid.led_size,
                )?;
            }
        }
        Ok(Self::new(info, layout, trigger, sink, failures))
    }

    /// Append a correction; corrections run in insertion order
    pub fn with_correction(mut self, correction: impl ColorCorrection + 'static) -> Self {
        self.corrections.push(Box::new(correction));
        self
    }

    pub fn queue(&self) -> &UpdateQueue<LedId, Color> {
        &self.queue
    }
}

impl RgbDevice for VirtualDevice {
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
        let mut batch = commit_leds(&self.layout.leds(), flush_leds);
        if batch.is_empty() {
            return Ok(());
        }
        for correction in &self.corrections {
            correction.apply(&mut batch);
        }
        trace!("{}: queueing {} LEDs", self.info.device_name, batch.len());
        self.queue.set_data(batch);
        Ok(())
    }

    fn reset(&self) -> Result<(), DeviceError> {
        for led in self.layout.leds() {
            led.write().reset();
        }
        self.queue.reset()
    }
}

impl fmt::Debug for VirtualDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VirtualDevice")
            .field("info", &self.info)
            .field("leds", &self.layout.led_count())
            .finish()
    }
}
