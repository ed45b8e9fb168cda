//! Surface configuration
//!
//! Devices, LED groups and their brushes described in TOML:
//!
//! ```toml
//! [surface]
//! fps = 30.0
//!
//! [[device]]
//! name = "keyboard"
//! type = "keyboard"
//! rows = 6
//! cols = 16
//!
//! [[group]]
//! name = "base"
//! leds = { type = "all" }
//! brush = { type = "solid", color = "#202040" }
//! ```
//!
//! Brush and selector tables are validated on load, so an unknown brush type
//! or calculation mode is reported before any device is touched.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use rgbscape_device::DeviceType;
use rgbscape_model::{Color, LedId, Point, Rectangle};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::brush::{
    Brush, BrushSettings, CalculationMode, GradientStop, LinearGradientBrush, PulseBrush,
    PulseKeyframe, SolidColorBrush,
};
use crate::error::ConfigError;
use crate::group::{LedGroup, ListLedGroup, RectangleLedGroup, DEFAULT_MIN_OVERLAY};
use crate::surface::Surface;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SurfaceConfig {
    #[serde(default)]
    pub surface: SurfaceSettings,
    #[serde(default)]
    pub device: Vec<DeviceConfig>,
    #[serde(default)]
    pub group: Vec<GroupConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurfaceSettings {
    /// Frames per second of the surface timer
    #[serde(default = "default_fps")]
    pub fps: f64,
    /// Send every LED each frame instead of only changed ones
    #[serde(default)]
    pub flush_leds: bool,
    /// Extra tracing directive, e.g. `"rgbscape=debug"`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_filter: Option<String>,
}

fn default_fps() -> f64 {
    30.0
}

impl Default for SurfaceSettings {
    fn default() -> Self {
        Self {
            fps: default_fps(),
            flush_leds: false,
            log_filter: None,
        }
    }
}

/// A virtual LED grid
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// Defaults to "manufacturer model"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", default)]
    pub device_type: DeviceType,
    #[serde(default)]
    pub manufacturer: String,
    #[serde(default)]
    pub model: String,
    /// Degrees, clockwise
    #[serde(default)]
    pub rotation: f32,
    #[serde(default = "default_scale")]
    pub scale: f32,
    pub rows: u32,
    pub cols: u32,
    /// Edge length of one LED
    #[serde(default = "default_led_size")]
    pub led_size: f32,
    #[serde(default)]
    pub spacing: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub power_budget_ma: Option<f32>,
    /// Flushes per second; 0 sends on the frame thread
    #[serde(default)]
    pub max_update_rate: f64,
    #[serde(default)]
    pub location: Point,
}

/// Largest LED grid a virtual device may have along either axis
pub const MAX_GRID_SIDE: u32 = 512;

fn default_scale() -> f32 {
    1.0
}

fn default_led_size() -> f32 {
    10.0
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupConfig {
    pub name: String,
    #[serde(default)]
    pub z_index: i32,
    #[serde(default)]
    pub leds: SelectorConfig,
    pub brush: BrushConfig,
}

/// Which LEDs a group holds. `type` is one of `all`, `device`, `rectangle`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectorConfig {
    #[serde(rename = "type", default = "default_selector")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,
    /// LED ids within `device`; all LEDs of the device when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ids: Option<Vec<u32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_overlay: Option<f32>,
}

fn default_selector() -> String {
    "all".to_string()
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            kind: default_selector(),
            device: None,
            ids: None,
            x: None,
            y: None,
            width: None,
            height: None,
            min_overlay: None,
        }
    }
}

/// Brush table. `type` is one of `solid`, `gradient`, `pulse`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrushConfig {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period_ms: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    /// `relative` or `absolute`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brightness: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stops: Option<Vec<GradientStop>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<Point>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<Point>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyframes: Option<Vec<PulseKeyframe>>,
}

impl BrushConfig {
    fn settings(&self) -> Result<BrushSettings, ConfigError> {
        let defaults = BrushSettings::default();
        let calculation_mode = match &self.mode {
            Some(mode) => mode.parse::<CalculationMode>()?,
            None => defaults.calculation_mode,
        };
        Ok(BrushSettings {
            enabled: self.enabled.unwrap_or(defaults.enabled),
            calculation_mode,
            brightness: self.brightness.unwrap_or(defaults.brightness),
            opacity: self.opacity.unwrap_or(defaults.opacity),
        })
    }

    fn color(&self, context: &str) -> Result<Color, ConfigError> {
        self.color.ok_or_else(|| ConfigError::MissingField {
            context: context.to_string(),
            field: "color",
        })
    }

    /// Build the brush this table describes
    pub fn build(&self, context: &str) -> Result<Arc<dyn Brush>, ConfigError> {
        let settings = self.settings()?;
        let brush: Arc<dyn Brush> = match self.kind.to_ascii_lowercase().as_str() {
            "solid" => Arc::new(SolidColorBrush::new(self.color(context)?).with_settings(settings)),
            "gradient" => {
                let stops = self.stops.clone().ok_or_else(|| ConfigError::MissingField {
                    context: context.to_string(),
                    field: "stops",
                })?;
                if stops.is_empty() {
                    return Err(ConfigError::Invalid {
                        context: context.to_string(),
                        message: "gradient needs at least one stop".to_string(),
                    });
                }
                let mut brush = LinearGradientBrush::new(stops).with_settings(settings);
                if let (Some(start), Some(end)) = (self.start, self.end) {
                    brush = brush.with_direction(start, end);
                }
                Arc::new(brush)
            }
            "pulse" => {
                let color = self.color(context)?;
                let brush = match (&self.keyframes, self.period_ms) {
                    (Some(keyframes), _) => PulseBrush::new(color, keyframes.clone()),
                    (None, Some(period_ms)) if period_ms > 0.0 => {
                        PulseBrush::breathe(color, period_ms)
                    }
                    (None, Some(_)) => {
                        return Err(ConfigError::Invalid {
                            context: context.to_string(),
                            message: "period_ms must be positive".to_string(),
                        })
                    }
                    (None, None) => {
                        return Err(ConfigError::MissingField {
                            context: context.to_string(),
                            field: "keyframes",
                        })
                    }
                };
                Arc::new(brush.with_settings(settings))
            }
            _ => return Err(ConfigError::UnknownBrush(self.kind.clone())),
        };
        Ok(brush)
    }
}

impl SelectorConfig {
    fn check(&self, context: &str) -> Result<(), ConfigError> {
        match self.kind.to_ascii_lowercase().as_str() {
            "all" => Ok(()),
            "device" => self.device.as_ref().map(|_| ()).ok_or_else(|| {
                ConfigError::MissingField {
                    context: context.to_string(),
                    field: "device",
                }
            }),
            "rectangle" => self.rectangle(context).map(|_| ()),
            _ => Err(ConfigError::UnknownSelector(self.kind.clone())),
        }
    }

    fn rectangle(&self, context: &str) -> Result<Rectangle, ConfigError> {
        let field = |value: Option<f32>, field: &'static str| {
            value.ok_or_else(|| ConfigError::MissingField {
                context: context.to_string(),
                field,
            })
        };
        Ok(Rectangle::from_xywh(
            field(self.x, "x")?,
            field(self.y, "y")?,
            field(self.width, "width")?,
            field(self.height, "height")?,
        ))
    }
}

impl GroupConfig {
    fn context(&self) -> String {
        format!("group '{}'", self.name)
    }

    fn check(&self) -> Result<(), ConfigError> {
        let context = self.context();
        self.leds.check(&context)?;
        self.brush.build(&context).map(|_| ())
    }

    /// Build the group against the devices currently on `surface`
    pub fn build(&self, surface: &Surface) -> Result<Arc<dyn LedGroup>, ConfigError> {
        let context = self.context();
        let brush = self.brush.build(&context)?;

        let group: Arc<dyn LedGroup> = match self.leds.kind.to_ascii_lowercase().as_str() {
            "all" => Arc::new(
                ListLedGroup::new(&self.name)
                    .with_leds(surface.leds())
                    .with_z_index(self.z_index)
                    .with_brush(brush),
            ),
            "device" => {
                let name = self.leds.device.as_deref().unwrap_or_default();
                let device = surface
                    .device(name)
                    .ok_or_else(|| ConfigError::UnknownDevice(name.to_string()))?;
                let leds = match &self.leds.ids {
                    None => device.leds(),
                    Some(ids) => ids
                        .iter()
                        .map(|id| {
                            device.layout().led(LedId(*id)).ok_or_else(|| ConfigError::Invalid {
                                context: context.clone(),
                                message: format!("device '{name}' has no LED {id}"),
                            })
                        })
                        .collect::<Result<Vec<_>, _>>()?,
                };
                Arc::new(
                    ListLedGroup::new(&self.name)
                        .with_leds(leds)
                        .with_z_index(self.z_index)
                        .with_brush(brush),
                )
            }
            "rectangle" => Arc::new(
                RectangleLedGroup::new(&self.name, self.leds.rectangle(&context)?)
                    .with_min_overlay(self.leds.min_overlay.unwrap_or(DEFAULT_MIN_OVERLAY))
                    .with_z_index(self.z_index)
                    .with_brush(brush),
            ),
            _ => return Err(ConfigError::UnknownSelector(self.leds.kind.clone())),
        };
        Ok(group)
    }
}

impl SurfaceConfig {
    /// Load from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: SurfaceConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Load the default configuration from the config directory.
    /// Creates the default file if it doesn't exist.
    pub fn load_default() -> Result<Self, ConfigError> {
        let path = default_path();
        if !path.exists() {
            let io_err = |source| ConfigError::Io {
                path: path.display().to_string(),
                source,
            };
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).map_err(io_err)?;
            }
            std::fs::write(&path, DEFAULT_SURFACE_TOML).map_err(io_err)?;
            info!("Created default surface config: {}", path.display());
        }
        Self::load(&path)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.surface.fps.is_nan() || self.surface.fps <= 0.0 {
            return Err(ConfigError::Invalid {
                context: "surface".to_string(),
                message: format!("fps must be positive, got {}", self.surface.fps),
            });
        }
        for (i, device) in self.device.iter().enumerate() {
            if device.rows == 0 || device.cols == 0 {
                return Err(ConfigError::Invalid {
                    context: format!("device #{i}"),
                    message: "rows and cols must be at least 1".to_string(),
                });
            }
            if device.rows > MAX_GRID_SIDE || device.cols > MAX_GRID_SIDE {
                return Err(ConfigError::Invalid {
                    context: format!("device #{i}"),
                    message: format!(
                        "grid {}x{} exceeds {MAX_GRID_SIDE} LEDs per side",
                        device.rows, device.cols
                    ),
                });
            }
        }
        for group in &self.group {
            group.check()?;
        }
        Ok(())
    }

    /// Build every configured group and attach it to `surface`.
    /// Returns the number of groups attached.
    pub fn attach_groups(&self, surface: &Surface) -> Result<usize, ConfigError> {
        for group in &self.group {
            surface.attach_group(group.build(surface)?)?;
        }
        Ok(self.group.len())
    }
}

/// Path to the default surface TOML file.
pub fn default_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("rgbscape")
        .join("surface.toml")
}

pub const DEFAULT_SURFACE_TOML: &str = r##"# rgbscape surface
#
# Devices are virtual LED grids placed on a shared surface. Groups select
# LEDs and paint them with a brush; higher z_index paints later.

[surface]
fps = 30.0
flush_leds = false

[[device]]
name = "keyboard"
type = "keyboard"
manufacturer = "Virtual"
model = "Keyboard"
rows = 6
cols = 16
led_size = 10.0
spacing = 2.0
power_budget_ma = 2000.0

[[device]]
name = "strip"
type = "led-stripe"
manufacturer = "Virtual"
model = "Strip"
location = { x = 0.0, y = 80.0 }
rows = 1
cols = 16
led_size = 10.0
spacing = 2.0
max_update_rate = 30.0

# Dim base over everything
[[group]]
name = "base"
z_index = 0
leds = { type = "all" }
brush = { type = "solid", color = "#101018" }

# Rainbow across the keyboard
[[group]]
name = "rainbow"
z_index = 1
leds = { type = "device", device = "keyboard" }

[group.brush]
type = "gradient"
stops = [
    { offset = 0.0, color = "#FF0000" },
    { offset = 0.33, color = "#00FF00" },
    { offset = 0.66, color = "#0000FF" },
    { offset = 1.0, color = "#FF00FF" },
]

# Breathing strip
[[group]]
name = "strip-pulse"
z_index = 2
leds = { type = "device", device = "strip" }
brush = { type = "pulse", color = "#00C0FF", period_ms = 2000.0 }

# Highlight the left block of the keyboard in absolute coordinates
[[group]]
name = "left-block"
z_index = 3
leds = { type = "rectangle", x = 0.0, y = 0.0, width = 48.0, height = 24.0 }
brush = { type = "solid", color = "#80FFFFFF", mode = "absolute" }
"##;
