//! rgbscape: hardware-agnostic RGB lighting surface
//!
//! - [`surface`] - the scene: devices, LED groups, triggers and the frame pipeline
//! - [`group`] - z-ordered brush bindings over sets of LEDs
//! - [`brush`] - solid, gradient and pulse brushes
//! - [`devices`] - virtual LED grids with memory, log and terminal sinks
//! - [`config`] - TOML surface configuration
//!
//! The model and device layers live in `rgbscape-model` and `rgbscape-device`
//! and are re-exported here.

pub mod brush;
pub mod config;
pub mod devices;
pub mod error;
pub mod group;
pub mod surface;

pub use rgbscape_device::{
    commit_leds, failure_channel, ColorCorrection, CustomUpdateData, DeviceError, DeviceInfo,
    DeviceLayout, DeviceProvider, DeviceType, DeviceUpdateTrigger, FailureChannel,
    ImmediateUpdateTrigger, ManualUpdateTrigger, PowerBudget, ProviderFailure, RgbDevice,
    TimerUpdateTrigger, UpdateQueue, UpdateSink, UpdateTrigger,
};
pub use rgbscape_model::{
    Color, ColorParseError, EventHandlers, Led, LedId, LedRef, Ownership, Point, Rectangle,
    Rotation, Scale, Size, SubscriptionId,
};

pub use brush::{Brush, BrushSettings, CalculationMode, RenderTarget};
pub use error::{BrushError, ConfigError, FrameError, SurfaceError};
pub use group::{LedGroup, ListLedGroup, RectangleLedGroup};
pub use surface::{LayoutChangedEvent, Surface, UpdatedEvent, UpdatingEvent};
