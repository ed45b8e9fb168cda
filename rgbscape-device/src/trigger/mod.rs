//! Update triggers
//!
//! A trigger decides *when* something updates: a surface frame, or an update
//! queue handing its batch to the transport. Consumers subscribe a handler;
//! the trigger calls every handler with a [`CustomUpdateData`] each time it fires.
//!
//! | trigger | fires |
//! |---|---|
//! | [`TimerUpdateTrigger`] | continuously on a worker thread at a fixed frequency |
//! | [`ManualUpdateTrigger`] | synchronously when asked |
//! | [`DeviceUpdateTrigger`] | on a worker thread whenever data arrives, rate limited |
//! | [`ImmediateUpdateTrigger`] | synchronously whenever data arrives |

mod device_update;
mod immediate;
mod manual;
mod timer;

use std::collections::BTreeMap;
use std::time::Duration;

use rgbscape_model::{EventHandlers, SubscriptionId};

use crate::error::DeviceError;

pub use device_update::DeviceUpdateTrigger;
pub use immediate::ImmediateUpdateTrigger;
pub use manual::ManualUpdateTrigger;
pub use timer::TimerUpdateTrigger;

/// Flags passed along with an update
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomUpdateData {
    /// Render LED groups
    pub render: bool,
    /// Send every LED, not just dirty ones
    pub flush_leds: bool,
    /// Flush devices after rendering
    pub update_devices: bool,
    pub extra: BTreeMap<String, String>,
}

impl Default for CustomUpdateData {
    fn default() -> Self {
        Self {
            render: true,
            flush_leds: false,
            update_devices: true,
            extra: BTreeMap::new(),
        }
    }
}

impl CustomUpdateData {
    pub fn flush_leds(mut self, flush: bool) -> Self {
        self.flush_leds = flush;
        self
    }

    pub fn render(mut self, render: bool) -> Self {
        self.render = render;
        self
    }

    pub fn update_devices(mut self, update: bool) -> Self {
        self.update_devices = update;
        self
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

pub type UpdateHandlers = EventHandlers<CustomUpdateData>;

pub trait UpdateTrigger: Send + Sync {
    fn name(&self) -> &str;

    fn handlers(&self) -> &UpdateHandlers;

    fn start(&self) -> Result<(), DeviceError>;

    /// Stop firing. Returns after any in-flight update completed.
    fn stop(&self);

    fn is_running(&self) -> bool;

    /// Signal that a consumer has data waiting
    fn trigger_has_data(&self) {}

    /// How long the last update took, if the trigger measures it
    fn last_update_time(&self) -> Option<Duration> {
        None
    }

    fn subscribe(&self, handler: Box<dyn Fn(&CustomUpdateData) + Send + Sync>) -> SubscriptionId {
        self.handlers().subscribe(handler)
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.handlers().unsubscribe(id)
    }
}
