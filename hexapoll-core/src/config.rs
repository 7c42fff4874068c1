//! Startup Configuration
//!
//! Everything here is fixed before the first task starts and immutable
//! afterwards: polling intervals, alarm windows, FIFO depths, the active
//! selection policy and the scheduler's own period. There is no runtime
//! reconfiguration path.
//!
//! In the default table the three inertial channels poll every second
//! into 32-deep rings, the three environmental channels every five
//! seconds into 16-deep rings, and the scheduler drains one sample per
//! second.

use crate::channel::{ChannelConfig, ChannelId, CHANNEL_COUNT};
use crate::policy::PolicyKind;

/// FIFO depth for the 1 Hz vector channels.
///
/// 32 slots at one sample per second gives the scheduler half a minute of
/// slack before a neglected channel overflows.
pub const VECTOR_FIFO_DEPTH: usize = 32;

/// FIFO depth for the 0.2 Hz scalar channels.
///
/// Slower producers need less slack; 16 slots is over a minute.
pub const SCALAR_FIFO_DEPTH: usize = 16;

/// Scheduler period in milliseconds.
pub const SCHEDULER_PERIOD_MS: u32 = 1_000;

/// Default alarm windows and polling intervals, per channel.
///
/// Thresholds are in each channel's physical unit; vector channels compare
/// the Euclidean magnitude. The accelerometer window brackets gravity
/// (±11 m/s²), the environmental windows bracket habitable indoor ranges.
pub const DEFAULT_CHANNELS: [ChannelConfig; CHANNEL_COUNT] = [
    ChannelConfig {
        id: ChannelId::Accelerometer,
        interval_ms: 1_000,
        threshold_low: -11.0,
        threshold_high: 11.0,
    },
    ChannelConfig {
        id: ChannelId::Gyroscope,
        interval_ms: 1_000,
        threshold_low: -50.0,
        threshold_high: 50.0,
    },
    ChannelConfig {
        id: ChannelId::Magnetometer,
        interval_ms: 1_000,
        threshold_low: -5.0,
        threshold_high: 5.0,
    },
    ChannelConfig {
        id: ChannelId::Temperature,
        interval_ms: 5_000,
        threshold_low: 20.0,
        threshold_high: 36.0,
    },
    ChannelConfig {
        id: ChannelId::Humidity,
        interval_ms: 5_000,
        threshold_low: 30.0,
        threshold_high: 100.0,
    },
    ChannelConfig {
        id: ChannelId::Pressure,
        interval_ms: 5_000,
        threshold_low: 950.0,
        threshold_high: 1_000.0,
    },
];

/// Whole-system startup configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SystemConfig {
    pub policy: PolicyKind,
    pub scheduler_period_ms: u32,
    pub channels: [ChannelConfig; CHANNEL_COUNT],
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            policy: PolicyKind::FullestFirst,
            scheduler_period_ms: SCHEDULER_PERIOD_MS,
            channels: DEFAULT_CHANNELS,
        }
    }
}

impl SystemConfig {
    /// Configuration for one channel.
    pub fn channel(&self, id: ChannelId) -> &ChannelConfig {
        &self.channels[id.index()]
    }
}
