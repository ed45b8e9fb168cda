//! Virtual devices: LED grids whose colors land in memory, the log or the terminal.
//!
//! ```text
//!  VirtualDevice::update ──▶ corrections ──▶ UpdateQueue ──trigger──▶ sink
//!                                                                      ├─ MemorySink
//!                                                                      ├─ LogSink
//!                                                                      └─ TerminalSink
//! ```

mod provider;
mod sink;
mod terminal;
mod virtual_device;

pub use provider::{SinkKind, VirtualDeviceProvider};
pub use sink::{LogSink, MemorySink};
pub use terminal::{TerminalSession, TerminalSink};
pub use virtual_device::{GridSpec, VirtualDevice};
