//! Device error types

use rgbscape_model::LedId;
use thiserror::Error;

/// Errors that can occur while driving a device
#[derive(Error, Debug)]
pub enum DeviceError {
    #[error("Device {device} failed to update: {reason}")]
    UpdateFailed { device: String, reason: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Device disposed: {0}")]
    Disposed(String),

    // Layout errors
    #[error("Duplicate LED id {0}")]
    DuplicateLed(LedId),

    #[error("LED not found: {0}")]
    LedNotFound(LedId),

    // Provider errors
    #[error("Provider {provider} failed: {reason}")]
    Provider { provider: String, reason: String },

    #[error("Failed to spawn worker thread: {0}")]
    Spawn(#[from] std::io::Error),
}

impl DeviceError {
    pub fn update_failed(device: impl Into<String>, reason: impl Into<String>) -> Self {
        DeviceError::UpdateFailed {
            device: device.into(),
            reason: reason.into(),
        }
    }
}

/// A device type name that matches no [`DeviceType`](crate::DeviceType)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown device type: {0}")]
pub struct UnknownDeviceType(pub String);
