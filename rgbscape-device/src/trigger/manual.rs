use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::ReentrantMutex;

use super::{CustomUpdateData, UpdateHandlers, UpdateTrigger};
use crate::error::DeviceError;

/// Fires on the caller's thread when asked to, as long as it is started
pub struct ManualUpdateTrigger {
    name: String,
    handlers: UpdateHandlers,
    running: AtomicBool,
    // serializes updates so `stop` can wait for one in flight
    in_flight: ReentrantMutex<()>,
}

impl ManualUpdateTrigger {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            handlers: UpdateHandlers::new("manual-update"),
            running: AtomicBool::new(false),
            in_flight: ReentrantMutex::new(()),
        }
    }

    /// Fire with default data. Returns false if the trigger is stopped.
    pub fn trigger_update(&self) -> bool {
        self.trigger_update_with(&CustomUpdateData::default())
    }

    pub fn trigger_update_with(&self, data: &CustomUpdateData) -> bool {
        let _guard = self.in_flight.lock();
        if !self.running.load(Ordering::Acquire) {
            return false;
        }
        self.handlers.emit(data);
        true
    }
}

impl UpdateTrigger for ManualUpdateTrigger {
    fn name(&self) -> &str {
        &self.name
    }

    fn handlers(&self) -> &UpdateHandlers {
        &self.handlers
    }

    fn start(&self) -> Result<(), DeviceError> {
        self.running.store(true, Ordering::Release);
        Ok(())
    }

    fn stop(&self) {
        self.running.store(false, Ordering::Release);
        // wait out an update in flight on another thread; reentrant for handlers stopping us
        drop(self.in_flight.lock());
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;

    #[test]
    fn test_fires_only_while_running() {
        let trigger = ManualUpdateTrigger::new("manual");
        let count = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&count);
        trigger.subscribe(Box::new(move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        }));

        assert!(!trigger.trigger_update());
        trigger.start().unwrap();
        assert!(trigger.trigger_update());
        assert!(trigger.trigger_update());
        trigger.stop();
        assert!(!trigger.trigger_update());
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_passes_custom_data() {
        let trigger = ManualUpdateTrigger::new("manual");
        let flushed = Arc::new(AtomicBool::new(false));
        let f = Arc::clone(&flushed);
        trigger.subscribe(Box::new(move |data| {
            f.store(data.flush_leds, Ordering::SeqCst);
        }));
        trigger.start().unwrap();
        trigger.trigger_update_with(&CustomUpdateData::default().flush_leds(true));
        assert!(flushed.load(Ordering::SeqCst));
    }
}
