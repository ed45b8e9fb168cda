//! Static device identity

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::UnknownDeviceType;

/// Kind of device. Names are kebab-case (`led-stripe`) in configs, JSON and
/// `Display`, all taken from [`DeviceType::as_str`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "&'static str", try_from = "String")]
pub enum DeviceType {
    Keyboard,
    Mouse,
    Headset,
    Mousepad,
    LedStripe,
    LedMatrix,
    Mainboard,
    GraphicsCard,
    Dram,
    HeadsetStand,
    Keypad,
    Fan,
    Speaker,
    Cooler,
    Monitor,
    LedController,
    GameController,
    #[default]
    Unknown,
}

impl DeviceType {
    pub const ALL: [DeviceType; 18] = [
        DeviceType::Keyboard,
        DeviceType::Mouse,
        DeviceType::Headset,
        DeviceType::Mousepad,
        DeviceType::LedStripe,
        DeviceType::LedMatrix,
        DeviceType::Mainboard,
        DeviceType::GraphicsCard,
        DeviceType::Dram,
        DeviceType::HeadsetStand,
        DeviceType::Keypad,
        DeviceType::Fan,
        DeviceType::Speaker,
        DeviceType::Cooler,
        DeviceType::Monitor,
        DeviceType::LedController,
        DeviceType::GameController,
        DeviceType::Unknown,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DeviceType::Keyboard => "keyboard",
            DeviceType::Mouse => "mouse",
            DeviceType::Headset => "headset",
            DeviceType::Mousepad => "mousepad",
            DeviceType::LedStripe => "led-stripe",
            DeviceType::LedMatrix => "led-matrix",
            DeviceType::Mainboard => "mainboard",
            DeviceType::GraphicsCard => "graphics-card",
            DeviceType::Dram => "dram",
            DeviceType::HeadsetStand => "headset-stand",
            DeviceType::Keypad => "keypad",
            DeviceType::Fan => "fan",
            DeviceType::Speaker => "speaker",
            DeviceType::Cooler => "cooler",
            DeviceType::Monitor => "monitor",
            DeviceType::LedController => "led-controller",
            DeviceType::GameController => "game-controller",
            DeviceType::Unknown => "unknown",
        }
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeviceType {
    type Err = UnknownDeviceType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        DeviceType::ALL
            .into_iter()
            .find(|t| t.as_str() == wanted)
            .ok_or_else(|| UnknownDeviceType(s.to_string()))
    }
}

impl From<DeviceType> for &'static str {
    fn from(device_type: DeviceType) -> Self {
        device_type.as_str()
    }
}

impl TryFrom<String> for DeviceType {
    type Error = UnknownDeviceType;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Identity of a device. `device_name` is the name a surface keys devices by.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub device_type: DeviceType,
    pub device_name: String,
    pub manufacturer: String,
    pub model: String,
}

impl DeviceInfo {
    pub fn new(
        device_type: DeviceType,
        manufacturer: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        let manufacturer = manufacturer.into();
        let model = model.into();
        Self {
            device_type,
            device_name: Self::create_device_name(&manufacturer, &model),
            manufacturer,
            model,
        }
    }

    /// Override the generated name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.device_name = name.into();
        self
    }

    /// "Manufacturer Model", or whichever part is non-empty
    pub fn create_device_name(manufacturer: &str, model: &str) -> String {
        match (manufacturer.trim(), model.trim()) {
            ("", m) => m.to_string(),
            (m, "") => m.to_string(),
            (a, b) => format!("{a} {b}"),
        }
    }
}

impl fmt::Display for DeviceInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.device_name, self.device_type)
    }
}
