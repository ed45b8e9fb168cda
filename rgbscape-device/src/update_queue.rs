//! Per-device update batching
//!
//! Devices push committed LED colors with [`UpdateQueue::set_data`]; the queue
//! keeps the last value per key and signals its trigger. When the trigger
//! fires, the pending batch is swapped out and handed to the [`UpdateSink`]
//! with no queue lock held, so submitting never waits on the transport.
//!
//! ```text
//!  device.update() ──set_data──▶ pending (last write wins)
//!                                   │ trigger fires
//!                                   ▼
//!                          swap ──▶ sink.update(batch) ──err──▶ failure channel
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use rgbscape_model::{panic_message, SubscriptionId};
use tracing::{debug, warn};

use crate::error::DeviceError;
use crate::provider::{FailureChannel, ProviderFailure};
use crate::trigger::UpdateTrigger;

/// Transport end of an update queue
pub trait UpdateSink<K, V>: Send + Sync {
    /// Send one batch. Keys are unique and ascending.
    fn update(&self, batch: &[(K, V)]) -> Result<(), DeviceError>;

    /// Turn every LED off
    fn reset(&self) -> Result<(), DeviceError> {
        Ok(())
    }
}

struct QueueInner<K, V> {
    name: String,
    pending: Mutex<BTreeMap<K, V>>,
    sink: Arc<dyn UpdateSink<K, V>>,
    failures: Arc<FailureChannel>,
}

impl<K, V> QueueInner<K, V>
where
    K: Ord + Clone + Send + 'static,
    V: Clone + Send + 'static,
{
    fn process(&self) {
        let batch: Vec<(K, V)> = std::mem::take(&mut *self.pending.lock())
            .into_iter()
            .collect();
        if batch.is_empty() {
            return;
        }

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            self.sink.update(&batch)
        }));
        let error = match result {
            Ok(Ok(())) => return,
            Ok(Err(e)) => e,
            Err(payload) => DeviceError::Transport(panic_message(payload.as_ref())),
        };

        warn!("Update queue {} failed: {}", self.name, error);
        self.failures.emit(&ProviderFailure::new(&self.name, error));
    }
}

pub struct UpdateQueue<K, V> {
    inner: Arc<QueueInner<K, V>>,
    trigger: Arc<dyn UpdateTrigger>,
    subscription: SubscriptionId,
}

impl<K, V> UpdateQueue<K, V>
where
    K: Ord + Clone + Send + 'static,
    V: Clone + Send + 'static,
{
    /// Bind a sink to a trigger. The queue processes whenever the trigger fires.
    pub fn new(
        name: impl Into<String>,
        trigger: Arc<dyn UpdateTrigger>,
        sink: Arc<dyn UpdateSink<K, V>>,
        failures: Arc<FailureChannel>,
    ) -> Self {
        let inner = Arc::new(QueueInner {
            name: name.into(),
            pending: Mutex::new(BTreeMap::new()),
            sink,
            failures,
        });

        let weak: Weak<QueueInner<K, V>> = Arc::downgrade(&inner);
        let subscription = trigger.subscribe(Box::new(move |_| {
            if let Some(inner) = weak.upgrade() {
                inner.process();
            }
        }));

        Self {
            inner,
            trigger,
            subscription,
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn trigger(&self) -> &Arc<dyn UpdateTrigger> {
        &self.trigger
    }

    /// Merge `data` into the pending batch (last write per key wins) and
    /// signal the trigger
    pub fn set_data<I>(&self, data: I)
    where
        I: IntoIterator<Item = (K, V)>,
    {
        let added = {
            let mut pending = self.inner.pending.lock();
            let mut added = false;
            for (key, value) in data {
                pending.insert(key, value);
                added = true;
            }
            added
        };
        if added {
            self.trigger.trigger_has_data();
        }
    }

    pub fn pending_len(&self) -> usize {
        self.inner.pending.lock().len()
    }

    /// Process the pending batch on the calling thread
    pub fn flush_now(&self) {
        self.inner.process();
    }

    /// Drop pending data and turn the device off
    pub fn reset(&self) -> Result<(), DeviceError> {
        self.inner.pending.lock().clear();
        debug!("Resetting update queue {}", self.inner.name);
        self.inner.sink.reset()
    }
}

impl<K, V> Drop for UpdateQueue<K, V> {
    fn drop(&mut self) {
        self.trigger.unsubscribe(self.subscription);
    }
}

impl<K, V> fmt::Debug for UpdateQueue<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpdateQueue")
            .field("name", &self.inner.name)
            .field("pending", &self.inner.pending.lock().len())
            .field("trigger", &self.trigger.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::failure_channel;
    use crate::trigger::ManualUpdateTrigger;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[derive(Default)]
    struct RecordingSink {
        batches: Mutex<Vec<Vec<(u32, u8)>>>,
        fail: AtomicBool,
        resets: Mutex<usize>,
    }

    impl UpdateSink<u32, u8> for RecordingSink {
        fn update(&self, batch: &[(u32, u8)]) -> Result<(), DeviceError> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(DeviceError::Transport("unplugged".into()));
            }
            self.batches.lock().push(batch.to_vec());
            Ok(())
        }

        fn reset(&self) -> Result<(), DeviceError> {
            *self.resets.lock() += 1;
            Ok(())
        }
    }

    fn queue() -> (
        UpdateQueue<u32, u8>,
        Arc<ManualUpdateTrigger>,
        Arc<RecordingSink>,
        Arc<FailureChannel>,
    ) {
        let trigger = Arc::new(ManualUpdateTrigger::new("queue"));
        trigger.start().unwrap();
        let sink = Arc::new(RecordingSink::default());
        let failures = failure_channel();
        let queue = UpdateQueue::new(
            "test",
            trigger.clone() as Arc<dyn UpdateTrigger>,
            sink.clone() as Arc<dyn UpdateSink<u32, u8>>,
            Arc::clone(&failures),
        );
        (queue, trigger, sink, failures)
    }

    #[test]
    fn test_last_write_wins() {
        let (queue, trigger, sink, _) = queue();
        queue.set_data([(2, 10), (1, 5)]);
        queue.set_data([(2, 20)]);
        assert_eq!(queue.pending_len(), 2);

        trigger.trigger_update();
        assert_eq!(*sink.batches.lock(), vec![vec![(1, 5), (2, 20)]]);
        assert_eq!(queue.pending_len(), 0);

        // empty queue does not call the sink
        trigger.trigger_update();
        assert_eq!(sink.batches.lock().len(), 1);
    }

    #[test]
    fn test_failure_reported_not_raised() {
        let (queue, trigger, sink, failures) = queue();
        let reported = Arc::new(Mutex::new(Vec::new()));
        let r = Arc::clone(&reported);
        failures.subscribe(move |f: &ProviderFailure| r.lock().push(f.error.to_string()));

        sink.fail.store(true, Ordering::SeqCst);
        queue.set_data([(1, 1)]);
        trigger.trigger_update();

        assert_eq!(*reported.lock(), vec!["Transport error: unplugged".to_string()]);
        assert!(sink.batches.lock().is_empty());
    }

    #[test]
    fn test_reset_drops_pending() {
        let (queue, trigger, sink, _) = queue();
        queue.set_data([(1, 1)]);
        queue.reset().unwrap();
        trigger.trigger_update();
        assert!(sink.batches.lock().is_empty());
        assert_eq!(*sink.resets.lock(), 1);
    }

    #[test]
    fn test_drop_unsubscribes() {
        let (queue, trigger, _, _) = queue();
        assert_eq!(trigger.handlers().len(), 1);
        drop(queue);
        assert!(trigger.handlers().is_empty());
    }
}
