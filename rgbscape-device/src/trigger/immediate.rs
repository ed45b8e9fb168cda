use std::sync::atomic::{AtomicBool, Ordering};

use super::{CustomUpdateData, UpdateHandlers, UpdateTrigger};
use crate::error::DeviceError;

/// Fires on the submitting thread as soon as data is signalled.
///
/// Suited to transports that are cheap to call from the frame thread.
pub struct ImmediateUpdateTrigger {
    name: String,
    handlers: UpdateHandlers,
    running: AtomicBool,
    data: CustomUpdateData,
}

impl ImmediateUpdateTrigger {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            handlers: UpdateHandlers::new("immediate-update"),
            running: AtomicBool::new(false),
            data: CustomUpdateData::default(),
        }
    }
}

impl UpdateTrigger for ImmediateUpdateTrigger {
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
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    fn trigger_has_data(&self) {
        if self.is_running() {
            self.handlers.emit(&self.data);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;

    #[test]
    fn test_fires_on_data() {
        let trigger = ImmediateUpdateTrigger::new("immediate");
        let count = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&count);
        trigger.subscribe(Box::new(move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        }));

        trigger.trigger_has_data();
        assert_eq!(count.load(Ordering::SeqCst), 0);

        trigger.start().unwrap();
        trigger.trigger_has_data();
        trigger.trigger_has_data();
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }
}
