//! Inbound event queue.
//!
//! The host bus transport snoops the addresses the remote machine reads and
//! pushes the interesting ones here. The engine pops them between frames.
//! Capacity is fixed; the producer drops values once the queue is full.

use ringbuf::HeapRb;
use ringbuf::traits::{Consumer, Observer, Producer, Split};

/// Queue capacity in 16-bit values.
pub const EVENT_CAPACITY: usize = 16;

/// Lowest address the snoop accepts.
const SNOOP_BASE: u16 = 0xF000;

/// Producer half, owned by the transport.
pub struct EventSender {
    inner: ringbuf::HeapProd<u16>,
    dropped: u64,
}

/// Consumer half, owned by the frame loop.
pub struct EventReceiver {
    inner: ringbuf::HeapCons<u16>,
}

/// Create a connected sender/receiver pair.
#[must_use]
pub fn event_queue() -> (EventSender, EventReceiver) {
    let (producer, consumer) = HeapRb::<u16>::new(EVENT_CAPACITY).split();
    (
        EventSender {
            inner: producer,
            dropped: 0,
        },
        EventReceiver { inner: consumer },
    )
}

impl EventSender {
    /// Queue a value. Returns false if the queue was full and it was lost.
    pub fn push(&mut self, value: u16) -> bool {
        if self.inner.try_push(value).is_ok() {
            true
        } else {
            self.dropped += 1;
            false
        }
    }

    /// Queue a snooped bus address. Addresses below `$F000` are not
    /// commands and are ignored.
    pub fn snoop(&mut self, address: u16) -> bool {
        address >= SNOOP_BASE && self.push(address)
    }

    /// Values lost to a full queue so far.
    #[must_use]
    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}

impl EventReceiver {
    pub fn pop(&mut self) -> Option<u16> {
        self.inner.try_pop()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.occupied_len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Discard everything queued.
    pub fn clear(&mut self) {
        while self.inner.try_pop().is_some() {}
    }
}
