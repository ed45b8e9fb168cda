use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::{debug, warn};

use super::{CustomUpdateData, UpdateHandlers, UpdateTrigger};
use crate::error::DeviceError;

/// Default frame interval (30 fps)
pub const DEFAULT_UPDATE_FREQUENCY: Duration = Duration::from_micros(33_333);

struct Worker {
    stop_tx: mpsc::Sender<()>,
    handle: JoinHandle<()>,
}

struct Shared {
    handlers: UpdateHandlers,
    frequency_us: AtomicU64,
    last_update_us: AtomicU64,
    data: Mutex<CustomUpdateData>,
}

/// Fires continuously on a dedicated thread.
///
/// The worker sleeps for whatever is left of the update frequency after each
/// update, so a slow frame is followed immediately by the next one.
pub struct TimerUpdateTrigger {
    name: String,
    shared: Arc<Shared>,
    worker: Mutex<Option<Worker>>,
}

impl TimerUpdateTrigger {
    pub fn new(name: impl Into<String>, frequency: Duration) -> Self {
        Self {
            name: name.into(),
            shared: Arc::new(Shared {
                handlers: UpdateHandlers::new("timer-update"),
                frequency_us: AtomicU64::new(duration_us(frequency)),
                last_update_us: AtomicU64::new(u64::MAX),
                data: Mutex::new(CustomUpdateData::default()),
            }),
            worker: Mutex::new(None),
        }
    }

    /// Trigger firing `fps` times per second
    pub fn with_fps(name: impl Into<String>, fps: f64) -> Self {
        let frequency = if fps.is_finite() && fps > 0.0 {
            Duration::from_secs_f64(1.0 / fps)
        } else {
            DEFAULT_UPDATE_FREQUENCY
        };
        Self::new(name, frequency)
    }

    pub fn update_frequency(&self) -> Duration {
        Duration::from_micros(self.shared.frequency_us.load(Ordering::Relaxed))
    }

    /// Takes effect from the next frame on
    pub fn set_update_frequency(&self, frequency: Duration) {
        self.shared
            .frequency_us
            .store(duration_us(frequency), Ordering::Relaxed);
    }

    /// Data passed to handlers on every frame
    pub fn set_custom_data(&self, data: CustomUpdateData) {
        *self.shared.data.lock() = data;
    }

    fn run(shared: Arc<Shared>, stop_rx: mpsc::Receiver<()>) {
        loop {
            let started = Instant::now();
            let data = shared.data.lock().clone();
            shared.handlers.emit(&data);

            let elapsed = started.elapsed();
            shared
                .last_update_us
                .store(duration_us(elapsed), Ordering::Relaxed);

            let frequency = Duration::from_micros(shared.frequency_us.load(Ordering::Relaxed));
            match stop_rx.recv_timeout(frequency.saturating_sub(elapsed)) {
                Err(RecvTimeoutError::Timeout) => continue,
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            }
        }
    }
}

impl UpdateTrigger for TimerUpdateTrigger {
    fn name(&self) -> &str {
        &self.name
    }

    fn handlers(&self) -> &UpdateHandlers {
        &self.shared.handlers
    }

    fn start(&self) -> Result<(), DeviceError> {
        let mut worker = self.worker.lock();
        if worker.is_some() {
            return Ok(());
        }

        let (stop_tx, stop_rx) = mpsc::channel();
        let shared = Arc::clone(&self.shared);
        let handle = std::thread::Builder::new()
            .name(format!("{}-timer", self.name))
            .spawn(move || Self::run(shared, stop_rx))?;

        debug!(
            "Started timer trigger {} at {:?}",
            self.name,
            self.update_frequency()
        );
        *worker = Some(Worker { stop_tx, handle });
        Ok(())
    }

    fn stop(&self) {
        let Some(Worker { stop_tx, handle }) = self.worker.lock().take() else {
            return;
        };
        let _ = stop_tx.send(());

        // A handler stopping its own trigger cannot wait for itself
        if handle.thread().id() == std::thread::current().id() {
            return;
        }
        if handle.join().is_err() {
            warn!("Timer trigger {} worker panicked", self.name);
        }
        debug!("Stopped timer trigger {}", self.name);
    }

    fn is_running(&self) -> bool {
        self.worker.lock().is_some()
    }

    fn last_update_time(&self) -> Option<Duration> {
        match self.shared.last_update_us.load(Ordering::Relaxed) {
            u64::MAX => None,
            us => Some(Duration::from_micros(us)),
        }
    }
}

impl Drop for TimerUpdateTrigger {
    fn drop(&mut self) {
        self.stop();
    }
}

fn duration_us(d: Duration) -> u64 {
    u64::try_from(d.as_micros()).unwrap_or(u64::MAX - 1)
}
