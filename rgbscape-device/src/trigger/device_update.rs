use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};
use tracing::{debug, warn};

use super::{CustomUpdateData, UpdateHandlers, UpdateTrigger};
use crate::error::DeviceError;

#[derive(Default)]
struct State {
    running: bool,
    has_data: bool,
}

struct Shared {
    handlers: UpdateHandlers,
    state: Mutex<State>,
    wake: Condvar,
    min_interval: Mutex<Option<Duration>>,
    last_update: Mutex<Option<Duration>>,
}

/// Worker-thread trigger for device update queues.
///
/// Sleeps until data is signalled, fires once per wake-up no matter how many
/// signals arrived in between, and never fires more often than `max_rate`.
pub struct DeviceUpdateTrigger {
    name: String,
    shared: Arc<Shared>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl DeviceUpdateTrigger {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            shared: Arc::new(Shared {
                handlers: UpdateHandlers::new("device-update"),
                state: Mutex::new(State::default()),
                wake: Condvar::new(),
                min_interval: Mutex::new(None),
                last_update: Mutex::new(None),
            }),
            worker: Mutex::new(None),
        }
    }

    /// Limit updates to `updates_per_second`. Zero or less removes the limit.
    pub fn with_max_rate(self, updates_per_second: f64) -> Self {
        self.set_max_rate(updates_per_second);
        self
    }

    pub fn set_max_rate(&self, updates_per_second: f64) {
        *self.shared.min_interval.lock() = (updates_per_second.is_finite()
            && updates_per_second > 0.0)
            .then(|| Duration::from_secs_f64(1.0 / updates_per_second));
    }

    pub fn max_rate(&self) -> Option<f64> {
        self.shared
            .min_interval
            .lock()
            .map(|interval| 1.0 / interval.as_secs_f64())
    }

    fn run(shared: Arc<Shared>) {
        let data = CustomUpdateData::default();
        loop {
            {
                let mut state = shared.state.lock();
                while state.running && !state.has_data {
                    shared.wake.wait(&mut state);
                }
                if !state.running {
                    break;
                }
                state.has_data = false;
            }

            let started = Instant::now();
            shared.handlers.emit(&data);
            let elapsed = started.elapsed();
            *shared.last_update.lock() = Some(elapsed);

            let min_interval = *shared.min_interval.lock();
            if let Some(remaining) = min_interval.and_then(|i| i.checked_sub(elapsed)) {
                let deadline = Instant::now() + remaining;
                let mut state = shared.state.lock();
                while state.running {
                    if shared.wake.wait_until(&mut state, deadline).timed_out() {
                        break;
                    }
                }
            }
        }
    }
}

impl UpdateTrigger for DeviceUpdateTrigger {
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

        self.shared.state.lock().running = true;
        let shared = Arc::clone(&self.shared);
        let spawned = std::thread::Builder::new()
            .name(format!("{}-update", self.name))
            .spawn(move || Self::run(shared));

        match spawned {
            Ok(handle) => {
                debug!("Started device update trigger {}", self.name);
                *worker = Some(handle);
                Ok(())
            }
            Err(e) => {
                self.shared.state.lock().running = false;
                Err(e.into())
            }
        }
    }

    fn stop(&self) {
        let Some(handle) = self.worker.lock().take() else {
            return;
        };
        self.shared.state.lock().running = false;
        self.shared.wake.notify_all();

        if handle.thread().id() == std::thread::current().id() {
            return;
        }
        if handle.join().is_err() {
            warn!("Device update trigger {} worker panicked", self.name);
        }
        debug!("Stopped device update trigger {}", self.name);
    }

    fn is_running(&self) -> bool {
        self.shared.state.lock().running
    }

    fn trigger_has_data(&self) {
        let mut state = self.shared.state.lock();
        state.has_data = true;
        self.shared.wake.notify_all();
    }

    fn last_update_time(&self) -> Option<Duration> {
        *self.shared.last_update.lock()
    }
}

impl Drop for DeviceUpdateTrigger {
    fn drop(&mut self) {
        self.stop();
    }
}
