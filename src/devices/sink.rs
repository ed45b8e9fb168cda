//! Sinks that keep committed colors in process

use std::collections::BTreeMap;

use parking_lot::Mutex;
use rgbscape_device::{DeviceError, UpdateSink};
use rgbscape_model::{Color, LedId};
use tracing::debug;

#[derive(Default)]
struct MemoryState {
    batches: Vec<Vec<(LedId, Color)>>,
    last: BTreeMap<LedId, Color>,
    fail_next: Option<String>,
    resets: usize,
}

/// Records every batch it receives
#[derive(Default)]
pub struct MemorySink {
    state: Mutex<MemoryState>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every batch received, oldest first
    pub fn batches(&self) -> Vec<Vec<(LedId, Color)>> {
        self.state.lock().batches.clone()
    }

    /// Latest color sent per LED
    pub fn last_colors(&self) -> BTreeMap<LedId, Color> {
        self.state.lock().last.clone()
    }

    pub fn color(&self, id: LedId) -> Option<Color> {
        self.state.lock().last.get(&id).copied()
    }

    pub fn reset_count(&self) -> usize {
        self.state.lock().resets
    }

    /// Make the next update fail with `reason`
    pub fn fail_next(&self, reason: impl Into<String>) {
        self.state.lock().fail_next = Some(reason.into());
    }

    pub fn clear(&self) {
        let mut state = self.state.lock();
        state.batches.clear();
        state.last.clear();
    }
}

impl UpdateSink<LedId, Color> for MemorySink {
    fn update(&self, batch: &[(LedId, Color)]) -> Result<(), DeviceError> {
        let mut state = self.state.lock();
        if let Some(reason) = state.fail_next.take() {
            return Err(DeviceError::Transport(reason));
        }
        state.last.extend(batch.iter().copied());
        state.batches.push(batch.to_vec());
        Ok(())
    }

    fn reset(&self) -> Result<(), DeviceError> {
        let mut state = self.state.lock();
        state.resets += 1;
        for color in state.last.values_mut() {
            *color = Color::BLACK;
        }
        Ok(())
    }
}

/// Logs every batch at debug level
pub struct LogSink {
    name: String,
}

impl LogSink {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl UpdateSink<LedId, Color> for LogSink {
    fn update(&self, batch: &[(LedId, Color)]) -> Result<(), DeviceError> {
        debug!(
            "{}: {}",
            self.name,
            batch
                .iter()
                .map(|(id, color)| format!("{}={}", id.0, color.to_hex_argb()))
                .collect::<Vec<_>>()
                .join(" ")
        );
        Ok(())
    }

    fn reset(&self) -> Result<(), DeviceError> {
        debug!("{}: reset", self.name);
        Ok(())
    }
}
