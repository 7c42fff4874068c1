//! Bounded Single-Producer/Single-Consumer FIFO for Sensor Samples
#![allow(unsafe_code)] // Required for the lock-free slot storage
//!
//! ## Overview
//!
//! Each sensor channel owns one of these rings: the channel's polling task
//! writes timestamped samples in, the scheduler task reads them out. The two
//! sides run as independent preemptively-scheduled tasks, so the ring has to
//! be safe under concurrent push/pop without a mutex.
//!
//! ## Overflow Policy: Drop-New
//!
//! A push against a full ring rejects the incoming sample and leaves the
//! ring untouched. The producer reports the overflow and carries on; there
//! is no retry and no blocking. This favors keeping the polling schedule on
//! time over never losing a sample. The opposite policy (evict-oldest) would
//! silently rewrite history that the scheduler has been promised in FIFO
//! order.
//!
//! ## Layout
//!
//! ```text
//! SpscFifo<T, 8>:
//! ┌─────┬─────┬─────┬─────┬─────┬─────┬─────┬─────┐
//! │  0  │  1  │  2  │  3  │  4  │  5  │  6  │  7  │
//! └─────┴─────┴─────┴─────┴─────┴─────┴─────┴─────┘
//!          ↑                       ↑
//!        tail                    head
//!        (next pop)           (next push)
//! ```
//!
//! `head` is written only by the producer and `tail` only by the consumer;
//! neither index is used to decide full/empty. That decision belongs to the
//! shared atomic `count`, which is also what publishes slot contents between
//! the two tasks:
//!
//! - **Push**: write the slot, advance `head`, then `count += 1` with
//!   `Release`. The increment is the last step, so a consumer that observes
//!   it also observes the completed slot write.
//! - **Pop**: load `count` with `Acquire`, read the slot, advance `tail`,
//!   then `count -= 1` with `Release`. The decrement is the last step, so a
//!   producer that observes the freed slot also observes that the consumer
//!   is done reading it.
//!
//! Because full/empty comes from `count` rather than a head/tail
//! comparison, all `N` slots are usable; there is no sacrificial empty
//! slot.
//!
//! A stale `count` read is always conservative: the producer may see "full"
//! a moment after the consumer freed a slot (push rejected, safe), and the
//! consumer may see "empty" a moment after the producer published (pop
//! rejected, safe). Neither side can ever see a slot before its contents.
//!
//! ## Why Not `heapless::spsc::Queue`?
//!
//! `heapless` is already a dependency and its SPSC queue is solid, but it
//! spends one slot to distinguish full from empty (capacity `N` stores
//! `N - 1` items) and its occupancy is derived from two indices read at
//! different times. The selection policies here rank channels by exact
//! occupancy every scheduling cycle, so a single authoritative counter and
//! full use of the configured capacity are worth the ~60 lines of unsafe.
//!
//! ## Discipline
//!
//! Exactly one task may call [`SpscFifo::push`] and exactly one task may
//! call [`SpscFifo::pop`] over the ring's lifetime. This is a contract with
//! the call sites, not something the type system enforces; every ring in
//! this crate is owned by a [`SensorChannel`](crate::channel::SensorChannel)
//! that hands the push side to its producer and the pop side to the
//! scheduler.

use core::cell::UnsafeCell;
use core::mem::MaybeUninit;
use core::sync::atomic::{AtomicU32, AtomicUsize, Ordering};

use crate::errors::FifoFull;

/// Occupancy statistics, updated with relaxed atomics.
///
/// Diagnostic only; correctness never depends on these.
#[derive(Debug, Default)]
pub struct FifoStats {
    /// Samples accepted by `push`
    pub pushed: AtomicU32,
    /// Samples handed out by `pop`
    pub popped: AtomicU32,
    /// Samples rejected because the ring was full
    pub dropped: AtomicU32,
}

impl FifoStats {
    const fn new() -> Self {
        Self {
            pushed: AtomicU32::new(0),
            popped: AtomicU32::new(0),
            dropped: AtomicU32::new(0),
        }
    }
}

/// Fixed-capacity single-producer/single-consumer ring.
///
/// `N` is the usable capacity: a ring of capacity 4 holds 4 samples.
pub struct SpscFifo<T, const N: usize> {
    /// Slot storage. Per-slot `UnsafeCell` so the producer writing slot `i`
    /// never forms a reference overlapping the slot the consumer is reading.
    slots: [UnsafeCell<MaybeUninit<T>>; N],

    /// Next write position. Producer-owned; stored in an atomic only so the
    /// ring can be shared by reference, always accessed `Relaxed`.
    head: AtomicUsize,

    /// Next read position. Consumer-owned, same rules as `head`.
    tail: AtomicUsize,

    /// Occupied slot count. The one word both sides agree on; carries the
    /// Acquire/Release edge that publishes slot contents.
    count: AtomicUsize,

    stats: FifoStats,
}

// The ring synchronizes producer and consumer through `count`; sharing it
// across tasks is the whole point.
unsafe impl<T: Send, const N: usize> Send for SpscFifo<T, N> {}
unsafe impl<T: Send, const N: usize> Sync for SpscFifo<T, N> {}

impl<T, const N: usize> SpscFifo<T, N> {
    /// Create an empty ring. Usable in statics.
    pub const fn new() -> Self {
        Self {
            slots: [const { UnsafeCell::new(MaybeUninit::uninit()) }; N],
            head: AtomicUsize::new(0),
            tail: AtomicUsize::new(0),
            count: AtomicUsize::new(0),
            stats: FifoStats::new(),
        }
    }

    /// Store a sample, rejecting it if the ring is full.
    ///
    /// Single-producer side. On rejection the ring is unchanged and the
    /// sample is dropped; the caller reports the overflow.
    pub fn push(&self, item: T) -> Result<(), FifoFull> {
        // Acquire pairs with the consumer's Release decrement: if we see a
        // free slot, the consumer has finished reading it.
        if self.count.load(Ordering::Acquire) == N {
            self.stats.dropped.fetch_add(1, Ordering::Relaxed);
            return Err(FifoFull);
        }

        let head = self.head.load(Ordering::Relaxed);
        // Safe: single producer, and `count < N` guarantees this slot is
        // not owned by the consumer.
        unsafe {
            (*self.slots[head].get()).write(item);
        }
        self.head.store((head + 1) % N, Ordering::Relaxed);

        // Publish last: a consumer that sees the new count sees the slot.
        self.count.fetch_add(1, Ordering::Release);
        self.stats.pushed.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    /// Take the oldest sample, or `None` if the ring is empty.
    ///
    /// Single-consumer side. An empty ring is a normal scheduling outcome,
    /// not an error.
    pub fn pop(&self) -> Option<T> {
        // Acquire pairs with the producer's Release increment.
        if self.count.load(Ordering::Acquire) == 0 {
            return None;
        }

        let tail = self.tail.load(Ordering::Relaxed);
        // Safe: single consumer, and `count > 0` guarantees this slot was
        // fully written and published.
        let item = unsafe { (*self.slots[tail].get()).assume_init_read() };
        self.tail.store((tail + 1) % N, Ordering::Relaxed);

        // Release last: a producer that sees the freed slot sees our read
        // completed.
        self.count.fetch_sub(1, Ordering::Release);
        self.stats.popped.fetch_add(1, Ordering::Relaxed);
        Some(item)
    }

    /// Number of occupied slots.
    pub fn occupancy(&self) -> usize {
        self.count.load(Ordering::Acquire)
    }

    /// Usable capacity (`N`).
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Whether no slot is occupied.
    pub fn is_empty(&self) -> bool {
        self.occupancy() == 0
    }

    /// Whether every slot is occupied.
    pub fn is_full(&self) -> bool {
        self.occupancy() == N
    }

    /// Lifetime statistics.
    pub fn stats(&self) -> &FifoStats {
        &self.stats
    }
}

impl<T, const N: usize> Default for SpscFifo<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, const N: usize> Drop for SpscFifo<T, N> {
    fn drop(&mut self) {
        // Run destructors of any samples still queued.
        while self.pop().is_some() {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_empty() {
        let fifo: SpscFifo<u32, 4> = SpscFifo::new();
        assert!(fifo.is_empty());
        assert!(!fifo.is_full());
        assert_eq!(fifo.occupancy(), 0);
        assert_eq!(fifo.capacity(), 4);
        assert_eq!(fifo.pop(), None);
    }

    #[test]
    fn full_capacity_is_usable() {
        let fifo: SpscFifo<u32, 4> = SpscFifo::new();
        for i in 0..4 {
            fifo.push(i).unwrap();
        }
        assert!(fifo.is_full());
        assert_eq!(fifo.occupancy(), 4);
    }

    #[test]
    fn push_on_full_rejects_without_mutation() {
        let fifo: SpscFifo<u32, 2> = SpscFifo::new();
        fifo.push(1).unwrap();
        fifo.push(2).unwrap();

        assert_eq!(fifo.push(3), Err(FifoFull));
        assert_eq!(fifo.occupancy(), 2);

        // Drop-new: the rejected sample is gone, the old ones survive.
        assert_eq!(fifo.pop(), Some(1));
        assert_eq!(fifo.pop(), Some(2));
        assert_eq!(fifo.stats().dropped.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn pop_on_empty_rejects_without_mutation() {
        let fifo: SpscFifo<u32, 2> = SpscFifo::new();
        assert_eq!(fifo.pop(), None);
        assert_eq!(fifo.occupancy(), 0);

        fifo.push(7).unwrap();
        assert_eq!(fifo.pop(), Some(7));
        assert_eq!(fifo.pop(), None);
    }

    #[test]
    fn fifo_order_across_wraparound() {
        let fifo: SpscFifo<u32, 3> = SpscFifo::new();

        // Cycle the ring several times past its physical end.
        let mut next_push = 0u32;
        let mut next_pop = 0u32;
        for _ in 0..10 {
            while fifo.push(next_push).is_ok() {
                next_push += 1;
            }
            while let Some(got) = fifo.pop() {
                assert_eq!(got, next_pop);
                next_pop += 1;
            }
        }
        assert_eq!(next_push, next_pop);
    }

    #[test]
    fn concurrent_push_pop_keeps_invariants() {
        use std::sync::atomic::AtomicBool;

        static FIFO: SpscFifo<u64, 8> = SpscFifo::new();
        static DONE: AtomicBool = AtomicBool::new(false);

        let consumer = std::thread::spawn(|| {
            let mut expected = 0u64;
            loop {
                match FIFO.pop() {
                    Some(v) => {
                        // Single producer means strict FIFO order.
                        assert_eq!(v, expected);
                        expected += 1;
                    }
                    None => {
                        if DONE.load(Ordering::Acquire) && FIFO.is_empty() {
                            break;
                        }
                        std::thread::yield_now();
                    }
                }
            }
            expected
        });

        let mut sent = 0u64;
        while sent < 10_000 {
            let occupancy = FIFO.occupancy();
            assert!(occupancy <= FIFO.capacity());
            if FIFO.push(sent).is_ok() {
                sent += 1;
            } else {
                std::thread::yield_now();
            }
        }
        DONE.store(true, Ordering::Release);

        let received = consumer.join().unwrap();
        assert_eq!(received, 10_000);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Any interleaving of pushes and pops behaves like a bounded
            /// queue: occupancy stays within [0, N] and contents match a
            /// reference model with drop-new overflow.
            #[test]
            fn behaves_like_bounded_queue(ops in proptest::collection::vec(any::<bool>(), 0..256)) {
                let fifo: SpscFifo<u32, 5> = SpscFifo::new();
                let mut model: std::collections::VecDeque<u32> = Default::default();
                let mut seq = 0u32;

                for is_push in ops {
                    if is_push {
                        let accepted = fifo.push(seq).is_ok();
                        if model.len() < 5 {
                            prop_assert!(accepted);
                            model.push_back(seq);
                        } else {
                            prop_assert!(!accepted);
                        }
                        seq += 1;
                    } else {
                        prop_assert_eq!(fifo.pop(), model.pop_front());
                    }
                    prop_assert_eq!(fifo.occupancy(), model.len());
                    prop_assert!(fifo.occupancy() <= fifo.capacity());
                }
            }
        }
    }
}
