//! Newest-wins single-slot handoff between one producer and one consumer.
//!
//! # Why not a channel? (for beginners)
//!
//! A camera delivers frames at a fixed rate (say 30 per second) whether or
//! not anybody is ready for them.  QR decoding of a large frame can take
//! longer than one frame interval.  With an unbounded channel the backlog
//! would grow forever and the detector would look further and further into
//! the past.  With a bounded channel the *producer* would block, and the
//! camera driver would drop frames on its own terms.
//!
//! `LatestSlot` keeps exactly one item:
//!
//! ```text
//! producer: put(f1)  put(f2)  put(f3)          put(f4)
//! slot:     [f1]     [f2]     [f3]     []      [f4]
//! consumer:                        take()->f3
//! ```
//!
//! `f1` and `f2` are discarded without ever being seen.  The consumer always
//! receives the most recent frame, and blocks only while the slot is empty.
//!
//! # Closing
//!
//! When the producer stops (device error, shutdown) it calls [`LatestSlot::close`].
//! A consumer blocked in [`LatestSlot::take`] wakes up and receives `None`
//! once any remaining item has been handed out.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

/// Result of a [`LatestSlot::put`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PutOutcome {
    /// The slot was empty; the item is now stored.
    Stored,
    /// An unread item was overwritten.
    Replaced,
    /// The slot is closed; the item was dropped.
    Closed,
}

#[derive(Debug)]
struct SlotState<T> {
    item: Option<T>,
    closed: bool,
}

/// A capacity-one buffer with overwrite-on-full semantics.
#[derive(Debug)]
pub struct LatestSlot<T> {
    state: Mutex<SlotState<T>>,
    ready: Condvar,
    discarded: AtomicU64,
}

impl<T> LatestSlot<T> {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(SlotState {
                item: None,
                closed: false,
            }),
            ready: Condvar::new(),
            discarded: AtomicU64::new(0),
        }
    }

    /// Stores `item`, replacing any unread item.
    pub fn put(&self, item: T) -> PutOutcome {
        let mut state = self.lock();
        if state.closed {
            return PutOutcome::Closed;
        }
        let outcome = if state.item.replace(item).is_some() {
            self.discarded.fetch_add(1, Ordering::Relaxed);
            PutOutcome::Replaced
        } else {
            PutOutcome::Stored
        };
        drop(state);
        self.ready.notify_one();
        outcome
    }

    /// Blocks until an item is available and takes it.
    ///
    /// Returns `None` once the slot is closed and empty.
    pub fn take(&self) -> Option<T> {
        let mut state = self.lock();
        loop {
            if let Some(item) = state.item.take() {
                return Some(item);
            }
            if state.closed {
                return None;
            }
            state = self
                .ready
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Marks the slot closed and wakes every waiting consumer.
    ///
    /// An item stored before closing can still be taken.
    pub fn close(&self) {
        self.lock().closed = true;
        self.ready.notify_all();
    }

    /// Number of items overwritten before anyone read them.
    pub fn discarded(&self) -> u64 {
        self.discarded.load(Ordering::Relaxed)
    }

    fn lock(&self) -> MutexGuard<'_, SlotState<T>> {
        // A panicking producer must not wedge the consumer.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T> Default for LatestSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_put_into_empty_slot_is_stored() {
        let slot = LatestSlot::new();
        assert_eq!(slot.put(1), PutOutcome::Stored);
        assert_eq!(slot.take(), Some(1));
    }

    #[test]
    fn test_take_returns_most_recent_item() {
        // Arrange
        let slot = LatestSlot::new();

        // Act
        for i in 0..10 {
            slot.put(i);
        }

        // Assert
        assert_eq!(slot.take(), Some(9));
        assert_eq!(slot.discarded(), 9);
        slot.close();
        assert_eq!(slot.take(), None);
    }

    #[test]
    fn test_put_reports_replacement() {
        let slot = LatestSlot::new();
        slot.put("a");
        assert_eq!(slot.put("b"), PutOutcome::Replaced);
    }

    #[test]
    fn test_put_after_close_is_dropped() {
        let slot = LatestSlot::new();
        slot.close();
        assert_eq!(slot.put(5), PutOutcome::Closed);
        assert_eq!(slot.take(), None);
    }

    #[test]
    fn test_item_stored_before_close_is_still_delivered() {
        let slot = LatestSlot::new();
        slot.put(42);
        slot.close();
        assert_eq!(slot.take(), Some(42));
        assert_eq!(slot.take(), None);
    }

    #[test]
    fn test_take_blocks_until_producer_puts() {
        // Arrange
        let slot = Arc::new(LatestSlot::new());
        let producer = Arc::clone(&slot);

        // Act
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(30));
            producer.put(7u32);
        });

        // Assert
        assert_eq!(slot.take(), Some(7));
        handle.join().unwrap();
    }

    #[test]
    fn test_close_wakes_blocked_consumer() {
        let slot: Arc<LatestSlot<u32>> = Arc::new(LatestSlot::new());
        let closer = Arc::clone(&slot);

        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(30));
            closer.close();
        });

        assert_eq!(slot.take(), None);
        handle.join().unwrap();
    }

    #[test]
    fn test_fast_producer_never_yields_stale_item() {
        // Every value the consumer sees must be newer than the previous one,
        // and the final value must be the last one produced.
        let slot = Arc::new(LatestSlot::new());
        let producer = Arc::clone(&slot);
        const LAST: u64 = 5_000;

        let handle = thread::spawn(move || {
            for i in 0..=LAST {
                producer.put(i);
            }
            producer.close();
        });

        let mut seen = Vec::new();
        while let Some(v) = slot.take() {
            seen.push(v);
        }
        handle.join().unwrap();

        assert!(seen.windows(2).all(|w| w[0] < w[1]), "values must increase");
        assert_eq!(seen.last().copied(), Some(LAST));
        assert_eq!(slot.discarded() + seen.len() as u64, LAST + 1);
    }
}
