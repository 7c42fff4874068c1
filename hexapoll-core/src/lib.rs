//! Core acquisition pipeline for hexapoll
//!
//! Six periodic producer tasks poll one sensor each over a shared bus,
//! stamp and threshold-check the readings, and push them into per-channel
//! bounded FIFOs. A scheduler task drains one sample per cycle, choosing
//! the channel through a pluggable selection policy, and forwards the
//! formatted report to a queue-or-drop transport sink.
//!
//! Key constraints:
//! - No heap allocation in the polling or scheduling hot path
//! - FIFOs are safe under concurrent producer/consumer access without locks
//! - Steady-state rejections (full ring, empty ring, congested sink) are
//!   events, never task failures
//!
//! ```
//! use hexapoll_core::channel::{Channel, SensorChannel};
//! use hexapoll_core::config::DEFAULT_CHANNELS;
//!
//! let temperature: SensorChannel<16> = SensorChannel::new(DEFAULT_CHANNELS[3]);
//! assert_eq!(temperature.occupancy(), 0);
//! // ...five more channels, producers, and the runtime; see hexapoll-sim.
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]

extern crate alloc;

pub mod alarm;
pub mod buffer;
pub mod bus;
pub mod channel;
pub mod config;
pub mod errors;
pub mod events;
pub mod policy;
pub mod producer;
pub mod sample;
pub mod scheduler;
pub mod sensor;
pub mod status;
pub mod time;
pub mod transport;

#[cfg(feature = "std")]
pub mod rt;

// Public API
pub use buffer::SpscFifo;
pub use channel::{Channel, ChannelConfig, ChannelId, SensorChannel, CHANNEL_COUNT};
pub use errors::{FifoFull, InitError, SensorError};
pub use policy::{PolicyKind, SelectionPolicy};
pub use sample::{Sample, ScalarSample, VectorSample};
pub use time::{ClockSource, Timestamp};

/// Crate version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
