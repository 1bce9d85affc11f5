//! Event delivery from the tracking thread to the UI thread.
//!
//! [`event_queue`] builds a single-consumer FIFO with a soft capacity. When
//! it is full, the oldest queued `CursorMove` makes room for the new event;
//! an incoming `CursorMove` with nothing to evict is dropped instead.
//! Discrete events are always enqueued, past capacity if necessary.
//!
//! The queue is therefore unbounded in the discrete stream: a UI that stops
//! draining during a long drag lets `DragMove` events pile up. That is
//! accepted over losing gesture structure; the sender warns once per extra
//! `capacity` events and the consumer catches up on the next pump.

use std::{
    collections::VecDeque,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Condvar, Mutex, MutexGuard, PoisonError,
    },
    time::{Duration, Instant},
};

pub use crossbeam_channel::{RecvTimeoutError, TryRecvError};
use shared::protocol::GestureEvent;
use tracing::{debug, warn};

/// Destination for events produced by the tracking loop. Implementations
/// must return quickly; the tracking thread calls this once per event.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: GestureEvent);
}

/// Smallest accepted queue capacity.
pub const MIN_QUEUE_CAPACITY: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    Queued,
    /// Queued after evicting the oldest pending `CursorMove`.
    EvictedCursorMove,
    /// The incoming `CursorMove` was discarded because the queue was full.
    DroppedCursorMove,
    /// A discrete event was queued beyond the soft capacity.
    Overflowed,
    /// The receiver is gone; the event was discarded.
    Disconnected,
}

struct QueueState {
    events: VecDeque<GestureEvent>,
    senders: usize,
    receiver_alive: bool,
}

struct Shared {
    state: Mutex<QueueState>,
    ready: Condvar,
    capacity: usize,
    dropped_cursor_moves: AtomicU64,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

pub fn event_queue(capacity: usize) -> (EventSender, EventReceiver) {
    let capacity = capacity.max(MIN_QUEUE_CAPACITY);
    let shared = Arc::new(Shared {
        state: Mutex::new(QueueState {
            events: VecDeque::with_capacity(capacity),
            senders: 1,
            receiver_alive: true,
        }),
        ready: Condvar::new(),
        capacity,
        dropped_cursor_moves: AtomicU64::new(0),
    });

    (
        EventSender {
            shared: Arc::clone(&shared),
        },
        EventReceiver { shared },
    )
}

pub struct EventSender {
    shared: Arc<Shared>,
}

impl EventSender {
    pub fn send(&self, event: GestureEvent) -> SendOutcome {
        let mut state = self.shared.lock();
        if !state.receiver_alive {
            return SendOutcome::Disconnected;
        }

        let outcome = if state.events.len() < self.shared.capacity {
            SendOutcome::Queued
        } else if let Some(stale) = state
            .events
            .iter()
            .position(|queued| !queued.is_discrete())
        {
            state.events.remove(stale);
            self.shared
                .dropped_cursor_moves
                .fetch_add(1, Ordering::Relaxed);
            SendOutcome::EvictedCursorMove
        } else if !event.is_discrete() {
            self.shared
                .dropped_cursor_moves
                .fetch_add(1, Ordering::Relaxed);
            return SendOutcome::DroppedCursorMove;
        } else {
            SendOutcome::Overflowed
        };

        state.events.push_back(event);
        let depth = state.events.len();
        drop(state);
        self.shared.ready.notify_one();

        if outcome == SendOutcome::Overflowed && depth % self.shared.capacity == 1 {
            warn!(
                depth,
                capacity = self.shared.capacity,
                event = event.name(),
                "gesture event queue over capacity; consumer is not draining"
            );
        }
        outcome
    }

    pub fn capacity(&self) -> usize {
        self.shared.capacity
    }
}

impl EventSink for EventSender {
    fn emit(&self, event: GestureEvent) {
        if self.send(event) == SendOutcome::Disconnected {
            debug!(event = event.name(), "gesture event dropped; receiver disconnected");
        }
    }
}

impl Clone for EventSender {
    fn clone(&self) -> Self {
        self.shared.lock().senders += 1;
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl Drop for EventSender {
    fn drop(&mut self) {
        let mut state = self.shared.lock();
        state.senders = state.senders.saturating_sub(1);
        let last = state.senders == 0;
        drop(state);
        if last {
            self.shared.ready.notify_all();
        }
    }
}

/// UI-side end of the queue. Events come out in exactly the order they were
/// sent.
pub struct EventReceiver {
    shared: Arc<Shared>,
}

impl EventReceiver {
    pub fn try_recv(&self) -> Result<GestureEvent, TryRecvError> {
        let mut state = self.shared.lock();
        match state.events.pop_front() {
            Some(event) => Ok(event),
            None if state.senders == 0 => Err(TryRecvError::Disconnected),
            None => Err(TryRecvError::Empty),
        }
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Result<GestureEvent, RecvTimeoutError> {
        let deadline = Instant::now() + timeout;
        let mut state = self.shared.lock();
        loop {
            if let Some(event) = state.events.pop_front() {
                return Ok(event);
            }
            if state.senders == 0 {
                return Err(RecvTimeoutError::Disconnected);
            }
            let now = Instant::now();
            if now >= deadline {
                return Err(RecvTimeoutError::Timeout);
            }
            state = self
                .shared
                .ready
                .wait_timeout(state, deadline - now)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
    }

    pub fn drain(&self) -> Vec<GestureEvent> {
        self.shared.lock().events.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.shared.lock().events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_disconnected(&self) -> bool {
        self.shared.lock().senders == 0
    }

    /// Total `CursorMove` events discarded by backpressure.
    pub fn dropped_cursor_moves(&self) -> u64 {
        self.shared.dropped_cursor_moves.load(Ordering::Relaxed)
    }
}

impl Drop for EventReceiver {
    fn drop(&mut self) {
        let mut state = self.shared.lock();
        state.receiver_alive = false;
        state.events.clear();
    }
}

#[cfg(test)]
#[path = "tests/sink_tests.rs"]
mod tests;
