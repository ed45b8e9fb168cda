//! Device layer for the rgbscape lighting surface
//!
//! - [`RgbDevice`] - capability trait every device implements
//! - [`DeviceLayout`] - device geometry plus the LEDs it owns
//! - [`UpdateQueue`] - per-device dedup buffer in front of the transport
//! - [`trigger`] - timer, manual, device and immediate update triggers
//! - [`ColorCorrection`] / [`PowerBudget`] - batch corrections before sending
//! - [`DeviceProvider`] - device source with a failure channel

pub mod correction;
pub mod device;
pub mod error;
pub mod info;
pub mod layout;
pub mod provider;
pub mod trigger;
pub mod update_queue;

pub use correction::{ColorCorrection, PowerBudget};
pub use device::{commit_leds, RgbDevice};
pub use error::{DeviceError, UnknownDeviceType};
pub use info::{DeviceInfo, DeviceType};
pub use layout::DeviceLayout;
pub use provider::{failure_channel, DeviceProvider, FailureChannel, ProviderFailure};
pub use trigger::{
    CustomUpdateData, DeviceUpdateTrigger, ImmediateUpdateTrigger, ManualUpdateTrigger,
    TimerUpdateTrigger, UpdateTrigger,
};
pub use update_queue::{UpdateQueue, UpdateSink};
