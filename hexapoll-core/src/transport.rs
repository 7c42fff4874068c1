//! Transport Sink
//!
//! Out-of-band delivery of formatted report lines. The contract is
//! queue-or-drop: `send` never blocks the calling task, and a congested
//! sink silently discards the line. Neither producers nor the scheduler
//! ever wait on transmission; keeping the polling and scheduling periods
//! on time always wins over delivering every message.
//!
//! [`QueuedSink`] (std) is the usual shape of such a sink: callers
//! enqueue into a bounded channel and a dedicated drain task owns the
//! actual output device, the way a UART transmit task owns its
//! peripheral.

#[cfg(feature = "std")]
use crate::events::{Message, MAX_MESSAGE_LEN};

/// Outcome of a non-blocking send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendStatus {
    /// The sink queued the message for delivery
    Accepted,
    /// The sink was congested; the message is gone
    Dropped,
}

/// A non-blocking, best-effort message sink.
///
/// Shared by all tasks, hence `Send + Sync`. There is no acknowledgement
/// and no retry path; `Dropped` is informational only.
pub trait MessageSink: Send + Sync {
    /// Queue `message` for delivery, or drop it. Never blocks.
    fn send(&self, message: &str) -> SendStatus;
}

/// Copy `message` into a bounded line, truncating at a char boundary if
/// it exceeds [`MAX_MESSAGE_LEN`].
#[cfg(feature = "std")]
fn bounded(message: &str) -> Message {
    let mut line = Message::new();
    if line.push_str(message).is_err() {
        let mut end = MAX_MESSAGE_LEN;
        while !message.is_char_boundary(end) {
            end -= 1;
        }
        // Cannot fail: end <= MAX_MESSAGE_LEN on a boundary.
        let _ = line.push_str(&message[..end]);
    }
    line
}

/// Sink that discards everything. Headless targets and benchmarks.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl MessageSink for NullSink {
    fn send(&self, _message: &str) -> SendStatus {
        SendStatus::Accepted
    }
}

/// Collecting sink for tests (std).
#[cfg(feature = "std")]
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: std::sync::Mutex<Vec<String>>,
}

#[cfg(feature = "std")]
impl MemorySink {
    /// Empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything accepted so far, in arrival order.
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Discard everything collected so far.
    pub fn clear(&self) {
        self.lines
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clear();
    }
}

#[cfg(feature = "std")]
impl MessageSink for MemorySink {
    fn send(&self, message: &str) -> SendStatus {
        self.lines
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(bounded(message).as_str().to_owned());
        SendStatus::Accepted
    }
}

/// Bounded queue in front of a dedicated drain task (std).
///
/// Callers `try_send` into a channel of fixed depth; a spawned thread owns
/// the output device and drains in FIFO order. A full queue drops the
/// message and counts it.
#[cfg(feature = "std")]
pub struct QueuedSink {
    tx: Option<std::sync::mpsc::SyncSender<Message>>,
    dropped: std::sync::atomic::AtomicU32,
    drain: Option<std::thread::JoinHandle<()>>,
}

#[cfg(feature = "std")]
impl QueuedSink {
    /// Spawn the drain task over an arbitrary line writer.
    pub fn new<W>(depth: usize, mut write: W) -> Self
    where
        W: FnMut(&str) + Send + 'static,
    {
        let (tx, rx) = std::sync::mpsc::sync_channel::<Message>(depth);
        let drain = std::thread::Builder::new()
            .name("transport-drain".into())
            .spawn(move || {
                for line in rx {
                    write(line.as_str());
                }
            })
            .expect("spawning transport drain thread");

        Self {
            tx: Some(tx),
            dropped: std::sync::atomic::AtomicU32::new(0),
            drain: Some(drain),
        }
    }

    /// Drain to standard output, one message per line.
    pub fn stdout(depth: usize) -> Self {
        Self::new(depth, |line| println!("{line}"))
    }

    /// Messages discarded because the queue was full.
    pub fn dropped(&self) -> u32 {
        self.dropped.load(std::sync::atomic::Ordering::Relaxed)
    }
}

#[cfg(feature = "std")]
impl MessageSink for QueuedSink {
    fn send(&self, message: &str) -> SendStatus {
        use std::sync::mpsc::TrySendError;

        let Some(tx) = &self.tx else {
            return SendStatus::Dropped;
        };
        match tx.try_send(bounded(message)) {
            Ok(()) => SendStatus::Accepted,
            Err(TrySendError::Full(_)) | Err(TrySendError::Disconnected(_)) => {
                self.dropped
                    .fetch_add(1, std::sync::atomic::Ordering::Relaxed);
                #[cfg(feature = "log")]
                log::debug!("transport congested, message dropped");
                SendStatus::Dropped
            }
        }
    }
}

#[cfg(feature = "std")]
impl Drop for QueuedSink {
    fn drop(&mut self) {
        // Close the channel so the drain loop ends, then let it flush.
        self.tx.take();
        if let Some(drain) = self.drain.take() {
            let _ = drain.join();
        }
    }
}
