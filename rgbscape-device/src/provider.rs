//! Device providers and the failure channel

use std::sync::Arc;

use rgbscape_model::EventHandlers;

use crate::device::RgbDevice;
use crate::error::DeviceError;

/// A failure reported outside of the call that caused it (transport errors
/// raised on a queue worker, for example)
#[derive(Debug)]
pub struct ProviderFailure {
    /// Device or provider the failure originated from
    pub source: String,
    pub error: DeviceError,
    /// The source is unusable until reloaded
    pub critical: bool,
}

impl ProviderFailure {
    pub fn new(source: impl Into<String>, error: DeviceError) -> Self {
        Self {
            source: source.into(),
            error,
            critical: false,
        }
    }

    pub fn critical(mut self) -> Self {
        self.critical = true;
        self
    }
}

pub type FailureChannel = EventHandlers<ProviderFailure>;

pub fn failure_channel() -> Arc<FailureChannel> {
    Arc::new(EventHandlers::new("provider-failure"))
}

/// Source of devices
pub trait DeviceProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Create (or re-create) the provider's devices and start their update triggers
    fn load_devices(&self) -> Result<Vec<Arc<dyn RgbDevice>>, DeviceError>;

    /// Failures raised by this provider's devices and queues
    fn failures(&self) -> &Arc<FailureChannel>;
}
