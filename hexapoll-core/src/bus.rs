//! Shared Sensor Bus Lock
//!
//! All six sensors hang off one physical bus, so the six producer tasks
//! serialize their register reads through a single mutex. The guarded
//! region is exactly the read-and-stamp sequence; threshold evaluation,
//! message formatting and the FIFO push all happen after release to keep
//! hold time to one transaction. The scheduler never touches the bus.
//!
//! Acquisition blocks with unbounded wait: the bus is never held longer
//! than one register read, so starvation is a theoretical concern only.
//! A bounded-timeout variant that fails the polling cycle and counts a
//! contention fault would slot in here if a target ever needed it.
//!
//! Under `std` this wraps `std::sync::Mutex` (poisoning recovered: a
//! panicking producer does not corrupt the bus handle, which holds no
//! invariants of its own). Without `std` it wraps `spin::Mutex`, which is
//! how a single-core preemptive target busy-waits the handful of cycles a
//! competing read takes.

#[cfg(feature = "std")]
use std::sync::{Mutex, MutexGuard};

#[cfg(not(feature = "std"))]
use spin::{Mutex, MutexGuard};

/// Mutual exclusion over the shared bus handle `B`.
///
/// `B` is whatever the sensor backends need to perform a transaction; the
/// simulator uses `()`.
pub struct BusLock<B> {
    inner: Mutex<B>,
}

impl<B> BusLock<B> {
    /// Wrap the bus handle in the lock.
    pub const fn new(bus: B) -> Self {
        Self {
            inner: Mutex::new(bus),
        }
    }

    /// Block until the bus is free, then take exclusive ownership for the
    /// guard's lifetime.
    pub fn acquire(&self) -> MutexGuard<'_, B> {
        #[cfg(feature = "std")]
        {
            self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
        }
        #[cfg(not(feature = "std"))]
        {
            self.inner.lock()
        }
    }

    /// Non-blocking attempt, for diagnostics.
    pub fn try_acquire(&self) -> Option<MutexGuard<'_, B>> {
        #[cfg(feature = "std")]
        {
            match self.inner.try_lock() {
                Ok(guard) => Some(guard),
                Err(std::sync::TryLockError::Poisoned(poisoned)) => Some(poisoned.into_inner()),
                Err(std::sync::TryLockError::WouldBlock) => None,
            }
        }
        #[cfg(not(feature = "std"))]
        {
            self.inner.try_lock()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn exclusive_while_held() {
        let lock = BusLock::new(0u32);
        let guard = lock.acquire();
        assert!(lock.try_acquire().is_none());
        drop(guard);
        assert!(lock.try_acquire().is_some());
    }

    #[test]
    fn serializes_concurrent_holders() {
        // Each thread increments, spins briefly, then checks no one else
        // got in between. Any overlap would trip the assertion.
        let lock = Arc::new(BusLock::new(0u64));
        let mut handles = Vec::new();

        for _ in 0..6 {
            let lock = Arc::clone(&lock);
            handles.push(std::thread::spawn(move || {
                for _ in 0..500 {
                    let mut bus = lock.acquire();
                    let before = *bus;
                    *bus = before + 1;
                    std::hint::spin_loop();
                    assert_eq!(*bus, before + 1);
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(*lock.acquire(), 6 * 500);
    }
}
