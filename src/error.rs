//! Surface, frame, brush and configuration errors

use rgbscape_device::DeviceError;
use rgbscape_model::ColorParseError;
use thiserror::Error;

/// Invalid calls against a surface. Returned synchronously; the surface is
/// left unchanged.
#[derive(Error, Debug)]
pub enum SurfaceError {
    #[error("Device has no name")]
    UnnamedDevice,

    #[error("Device already attached: {0}")]
    DeviceAlreadyAttached(String),

    #[error("Device {0} is owned by another surface")]
    DeviceOwned(String),

    #[error("Device not attached: {0}")]
    DeviceNotAttached(String),

    #[error("LED group {0} is already attached to a surface")]
    GroupOwned(String),

    #[error("LED group not attached: {0}")]
    GroupNotAttached(String),

    #[error("Surface disposed")]
    Disposed,

    #[error("Provider {provider} failed to load: {source}")]
    Provider {
        provider: String,
        #[source]
        source: DeviceError,
    },
}

/// Failures inside a frame. Reported through the surface's exception channel,
/// never returned from `update`.
#[derive(Error, Debug)]
pub enum FrameError {
    #[error("LED group {group} failed to render: {source}")]
    Render {
        group: String,
        #[source]
        source: BrushError,
    },

    #[error("LED group {group} panicked while rendering: {message}")]
    RenderPanicked { group: String, message: String },

    #[error("Device {device} failed to update: {source}")]
    Device {
        device: String,
        #[source]
        source: DeviceError,
    },

    #[error("Device {device} panicked while updating: {message}")]
    DevicePanicked { device: String, message: String },

    #[error("Provider failure from {source_name}: {message}")]
    Provider {
        source_name: String,
        message: String,
        critical: bool,
    },
}

/// Errors raised by a brush while rendering
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BrushError {
    #[error("Brush has no gradient stops")]
    EmptyGradient,

    #[error("Invalid render rectangle: {0}")]
    InvalidRectangle(String),

    #[error("Brush failed: {0}")]
    Failed(String),
}

/// Errors while loading or applying configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("serialize TOML: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("unknown brush type: {0}")]
    UnknownBrush(String),

    #[error("unknown calculation mode: {0}")]
    UnknownCalculationMode(String),

    #[error("unknown sink: {0}")]
    UnknownSink(String),

    #[error("unknown LED selector: {0}")]
    UnknownSelector(String),

    #[error("{context}: missing field {field}")]
    MissingField {
        context: String,
        field: &'static str,
    },

    #[error("{context}: {message}")]
    Invalid { context: String, message: String },

    #[error("unknown device: {0}")]
    UnknownDevice(String),

    #[error("invalid color: {0}")]
    Color(#[from] ColorParseError),

    #[error(transparent)]
    Surface(#[from] SurfaceError),
}
