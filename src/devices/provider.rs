//! Provider building virtual devices from configuration

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use parking_lot::Mutex;
use rgbscape_device::{
    failure_channel, DeviceError, DeviceInfo, DeviceProvider, DeviceUpdateTrigger,
    FailureChannel, ImmediateUpdateTrigger, PowerBudget, RgbDevice, UpdateSink, UpdateTrigger,
};
use rgbscape_model::{Color, LedId, Rotation, Scale, Size};
use tracing::{debug, info};

use super::{GridSpec, LogSink, MemorySink, TerminalSink, VirtualDevice};
use crate::config::DeviceConfig;
use crate::error::ConfigError;

/// Where virtual devices send their colors
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SinkKind {
    #[default]
    Memory,
    Log,
    /// Draw into the terminal; the caller owns the [`TerminalSession`](super::TerminalSession)
    Terminal,
}

impl FromStr for SinkKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "memory" => Ok(SinkKind::Memory),
            "log" => Ok(SinkKind::Log),
            "terminal" => Ok(SinkKind::Terminal),
            _ => Err(ConfigError::UnknownSink(s.to_string())),
        }
    }
}

impl fmt::Display for SinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SinkKind::Memory => "memory",
            SinkKind::Log => "log",
            SinkKind::Terminal => "terminal",
        })
    }
}

struct Loaded {
    name: String,
    trigger: Arc<dyn UpdateTrigger>,
    memory: Option<Arc<MemorySink>>,
}

pub struct VirtualDeviceProvider {
    name: String,
    devices: Vec<DeviceConfig>,
    sink: SinkKind,
    /// First terminal row used by terminal sinks
    terminal_top: u16,
    failures: Arc<FailureChannel>,
    loaded: Mutex<Vec<Loaded>>,
}

impl VirtualDeviceProvider {
    pub fn new(devices: Vec<DeviceConfig>, sink: SinkKind) -> Self {
        Self {
            name: "virtual".to_string(),
            devices,
            sink,
            terminal_top: 0,
            failures: failure_channel(),
            loaded: Mutex::new(Vec::new()),
        }
    }

    pub fn with_terminal_top(mut self, row: u16) -> Self {
        self.terminal_top = row;
        self
    }

    /// Sink of a loaded device when the provider records to memory
    pub fn memory_sink(&self, device_name: &str) -> Option<Arc<MemorySink>> {
        self.loaded
            .lock()
            .iter()
            .find(|l| l.name == device_name)
            .and_then(|l| l.memory.clone())
    }

    /// Terminal rows used by all devices in terminal mode
    pub fn terminal_height(&self) -> u16 {
        self.devices
            .iter()
            .fold(0u16, |total, d| total.saturating_add(band_height(d)))
    }

    fn build(
        &self,
        config: &DeviceConfig,
        top: u16,
    ) -> Result<(Arc<dyn RgbDevice>, Loaded), DeviceError> {
        let mut info = DeviceInfo::new(config.device_type, &config.manufacturer, &config.model);
        if let Some(name) = &config.name {
            info = info.with_name(name);
        }
        let name = info.device_name.clone();

        let trigger: Arc<dyn UpdateTrigger> = if config.max_update_rate > 0.0 {
            Arc::new(DeviceUpdateTrigger::new(&name).with_max_rate(config.max_update_rate))
        } else {
            Arc::new(ImmediateUpdateTrigger::new(&name))
        };

        let mut memory = None;
        let sink: Arc<dyn UpdateSink<LedId, Color>> = match self.sink {
            SinkKind::Memory => {
                let sink = Arc::new(MemorySink::new());
                memory = Some(Arc::clone(&sink));
                sink
            }
            SinkKind::Log => Arc::new(LogSink::new(&name)),
            SinkKind::Terminal => Arc::new(TerminalSink::new(&name, top, config.rows, config.cols)),
        };

        let grid = GridSpec::new(config.rows, config.cols, Size::uniform(config.led_size))
            .with_spacing(config.spacing);
        let mut device = VirtualDevice::grid(
            info,
            config.location,
            grid,
            Arc::clone(&trigger),
            sink,
            Arc::clone(&self.failures),
        )?;
        if let Some(budget) = config.power_budget_ma {
            device = device.with_correction(PowerBudget::new(budget));
        }
        device.layout().set_scale(Scale::uniform(config.scale));
        device
            .layout()
            .set_rotation(Rotation::from_degrees(config.rotation));

        trigger.start()?;
        debug!(
            "Built {} ({} LEDs, trigger {})",
            name,
            grid.led_count(),
            trigger.name()
        );

        let loaded = Loaded {
            name,
            trigger,
            memory,
        };
        Ok((Arc::new(device), loaded))
    }

    fn stop_loaded(&self) {
        for loaded in std::mem::take(&mut *self.loaded.lock()) {
            loaded.trigger.stop();
        }
    }
}

impl DeviceProvider for VirtualDeviceProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn load_devices(&self) -> Result<Vec<Arc<dyn RgbDevice>>, DeviceError> {
        self.stop_loaded();

        let mut devices = Vec::with_capacity(self.devices.len());
        let mut loaded: Vec<Loaded> = Vec::with_capacity(self.devices.len());
        let mut top = self.terminal_top;
        for config in &self.devices {
            let (device, entry) = match self.build(config, top) {
                Ok(built) => built,
                Err(e) => {
                    for entry in &loaded {
                        entry.trigger.stop();
                    }
                    return Err(DeviceError::Provider {
                        provider: self.name.clone(),
                        reason: e.to_string(),
                    });
                }
            };
            top = top.saturating_add(band_height(config));
            devices.push(device);
            loaded.push(entry);
        }

        info!("Virtual provider loaded {} devices ({} sink)", devices.len(), self.sink);
        *self.loaded.lock() = loaded;
        Ok(devices)
    }

    fn failures(&self) -> &Arc<FailureChannel> {
        &self.failures
    }
}

/// Terminal rows of one device: label, grid and a blank separator
fn band_height(config: &DeviceConfig) -> u16 {
    u16::try_from(config.rows)
        .unwrap_or(u16::MAX)
        .saturating_add(2)
}

impl Drop for VirtualDeviceProvider {
    fn drop(&mut self) {
        self.stop_loaded();
    }
}
