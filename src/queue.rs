use std::collections::VecDeque;
use std::error::Error;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use tokio::sync::{oneshot, Notify};

/// Default number of waiting items a queue retains before it starts
/// discarding the oldest ones.
pub const DEFAULT_CAPACITY: usize = 100;

/// Consumer side of a [`SequentialQueue`].
///
/// The queue calls `process` from a single background task, one item at a
/// time, strictly in submission order. An `Err` return is reported and
/// counted but never stops the queue; the next item is attempted
/// regardless.
#[async_trait]
pub trait Processor<T>: Send + Sync {
    async fn process(&self, item: T) -> Result<(), Box<dyn Error + Send + Sync>>;
}

/// Error type returned when constructing a queue from invalid settings.
#[derive(thiserror::Error, Debug)]
pub enum QueueConfigError {
    #[error("queue capacity must be at least 1")]
    ZeroCapacity,
}

/// Final fate of an enqueued item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// The processor was invoked on the item (successfully or not).
    Processed,
    /// The item was discarded by the overflow policy before processing.
    Evicted,
}

/// Completion handle returned by [`SequentialQueue::enqueue`].
///
/// Settles exactly when the enqueued item has been handed to the
/// processor or evicted by the overflow policy. Dropping the receipt is
/// fine; the item is processed either way.
pub struct EnqueueReceipt {
    rx: oneshot::Receiver<Disposition>,
}

impl EnqueueReceipt {
    /// Wait for the item's fate.
    pub async fn settled(self) -> Disposition {
        // The sender is always settled before being dropped; a closed
        // channel can only mean the queue disappeared with the item.
        self.rx.await.unwrap_or(Disposition::Evicted)
    }
}

struct Waiting<T> {
    item: T,
    done: oneshot::Sender<Disposition>,
}

struct Inner<T> {
    buffer: VecDeque<Waiting<T>>,
    draining: bool,
}

struct State<T> {
    inner: Mutex<Inner<T>>,
    capacity: usize,
    processor: Arc<dyn Processor<T>>,
    drained: Notify,
    enqueued: AtomicU64,
    processed: AtomicU64,
    evicted: AtomicU64,
    failed: AtomicU64,
}

impl<T> State<T> {
    fn lock(&self) -> MutexGuard<'_, Inner<T>> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Bounded FIFO queue that funnels every item through one processor,
/// never concurrently.
///
/// The buffer and the draining flag live behind a single mutex, which is
/// the only serialization point in the pipeline: concurrent producers
/// push under the lock, and at most one drain task is ever in flight. A
/// full buffer discards its oldest waiting entries rather than blocking
/// or failing the producer.
///
/// `enqueue` must be called from within a Tokio runtime; the drain task
/// is spawned lazily on the first push into an idle queue.
pub struct SequentialQueue<T> {
    state: Arc<State<T>>,
}

impl<T> Clone for SequentialQueue<T> {
    fn clone(&self) -> Self {
        SequentialQueue { state: Arc::clone(&self.state) }
    }
}

impl<T: Send + 'static> SequentialQueue<T> {
    pub fn new(
        processor: Arc<dyn Processor<T>>,
        capacity: usize,
    ) -> Result<Self, QueueConfigError> {
        if capacity == 0 {
            return Err(QueueConfigError::ZeroCapacity);
        }

        Ok(SequentialQueue {
            state: Arc::new(State {
                inner: Mutex::new(Inner { buffer: VecDeque::new(), draining: false }),
                capacity,
                processor,
                drained: Notify::new(),
                enqueued: AtomicU64::new(0),
                processed: AtomicU64::new(0),
                evicted: AtomicU64::new(0),
                failed: AtomicU64::new(0),
            }),
        })
    }

    pub fn with_default_capacity(processor: Arc<dyn Processor<T>>) -> Self {
        Self::new(processor, DEFAULT_CAPACITY).expect("default capacity is non-zero")
    }

    /// Append an item at the tail and return its completion handle.
    ///
    /// Never blocks and never fails: when the buffer is full the oldest
    /// waiting entries are discarded (their receipts settle as
    /// [`Disposition::Evicted`]) and a warning is printed, once per
    /// eviction event.
    pub fn enqueue(&self, item: T) -> EnqueueReceipt {
        let (tx, rx) = oneshot::channel();
        let mut evicted = Vec::new();

        let start_drain = {
            let mut inner = self.state.lock();
            inner.buffer.push_back(Waiting { item, done: tx });

            if inner.buffer.len() >= self.state.capacity {
                let excess = inner.buffer.len() - self.state.capacity;
                eprintln!(
                    "log queue reached capacity ({}); discarding {} oldest item(s)",
                    self.state.capacity, excess
                );
                for _ in 0..excess {
                    if let Some(waiting) = inner.buffer.pop_front() {
                        evicted.push(waiting.done);
                    }
                }
            }

            if inner.draining {
                false
            } else {
                inner.draining = true;
                true
            }
        };

        self.state.enqueued.fetch_add(1, Ordering::Relaxed);
        for done in evicted {
            self.state.evicted.fetch_add(1, Ordering::Relaxed);
            let _ = done.send(Disposition::Evicted);
        }

        if start_drain {
            let state = Arc::clone(&self.state);
            tokio::spawn(drain(state));
        }

        EnqueueReceipt { rx }
    }

    /// Resolve once the buffer is empty and no drain task is in flight.
    pub async fn idle(&self) {
        loop {
            let notified = self.state.drained.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            {
                let inner = self.state.lock();
                if inner.buffer.is_empty() && !inner.draining {
                    return;
                }
            }

            notified.await;
        }
    }

    /// Number of items waiting in the buffer (excluding the one currently
    /// being processed, if any).
    pub fn len(&self) -> usize {
        self.state.lock().buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn enqueued_items(&self) -> u64 {
        self.state.enqueued.load(Ordering::Relaxed)
    }

    pub fn processed_items(&self) -> u64 {
        self.state.processed.load(Ordering::Relaxed)
    }

    pub fn evicted_items(&self) -> u64 {
        self.state.evicted.load(Ordering::Relaxed)
    }

    pub fn failed_items(&self) -> u64 {
        self.state.failed.load(Ordering::Relaxed)
    }
}

async fn drain<T: Send + 'static>(state: Arc<State<T>>) {
    loop {
        let next = {
            let mut inner = state.lock();
            let front = inner.buffer.pop_front();
            if front.is_none() {
                // Clearing the flag under the same lock used by enqueue
                // means a producer either sees the item we just missed or
                // sees an idle queue and starts its own drain.
                inner.draining = false;
            }
            front
        };

        let Some(Waiting { item, done }) = next else {
            state.drained.notify_waiters();
            return;
        };

        if let Err(err) = state.processor.process(item).await {
            state.failed.fetch_add(1, Ordering::Relaxed);
            eprintln!("error processing queue item: {err}");
        }
        state.processed.fetch_add(1, Ordering::Relaxed);
        let _ = done.send(Disposition::Processed);
    }
}
