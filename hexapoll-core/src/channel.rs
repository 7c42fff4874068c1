//! Sensor Channels
//!
//! A channel is one physical quantity's polling configuration, alarm
//! thresholds, alarm state, and sample FIFO. Six channels exist, fixed at
//! startup: three 3-axis quantities polled every second with deep FIFOs,
//! three scalar quantities polled every five seconds with shallower ones.
//!
//! Mutability after startup is deliberately narrow:
//! - `config` never changes
//! - `alarm_active` is flipped only by the owning producer task
//! - the FIFO mutates through its own single-producer/single-consumer
//!   contract
//!
//! The scheduler reaches channels through the [`Channel`] trait so that
//! rings of different capacities (a const-generic parameter) sit together
//! in one `[&dyn Channel; CHANNEL_COUNT]` array.

use core::sync::atomic::{AtomicBool, Ordering};

use crate::alarm::AlarmDirection;
use crate::buffer::SpscFifo;
use crate::errors::FifoFull;
use crate::sample::Sample;

/// Number of sensor channels in the system.
pub const CHANNEL_COUNT: usize = 6;

/// The six polled physical quantities.
///
/// The discriminant doubles as the channel index used by the selection
/// policies and the scheduler's enumeration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum ChannelId {
    Accelerometer = 0,
    Gyroscope = 1,
    Magnetometer = 2,
    Temperature = 3,
    Humidity = 4,
    Pressure = 5,
}

impl ChannelId {
    /// All channels in fixed enumeration order.
    pub const ALL: [ChannelId; CHANNEL_COUNT] = [
        ChannelId::Accelerometer,
        ChannelId::Gyroscope,
        ChannelId::Magnetometer,
        ChannelId::Temperature,
        ChannelId::Humidity,
        ChannelId::Pressure,
    ];

    /// Index in `[0, CHANNEL_COUNT)`.
    pub const fn index(&self) -> usize {
        *self as usize
    }

    /// Inverse of [`ChannelId::index`].
    pub const fn from_index(index: usize) -> Option<ChannelId> {
        match index {
            0 => Some(ChannelId::Accelerometer),
            1 => Some(ChannelId::Gyroscope),
            2 => Some(ChannelId::Magnetometer),
            3 => Some(ChannelId::Temperature),
            4 => Some(ChannelId::Humidity),
            5 => Some(ChannelId::Pressure),
            _ => None,
        }
    }

    /// Get human-readable name
    pub const fn name(&self) -> &'static str {
        match self {
            ChannelId::Accelerometer => "accelerometer",
            ChannelId::Gyroscope => "gyroscope",
            ChannelId::Magnetometer => "magnetometer",
            ChannelId::Temperature => "temperature",
            ChannelId::Humidity => "humidity",
            ChannelId::Pressure => "pressure",
        }
    }

    /// Short tag used in report lines
    pub const fn short_tag(&self) -> &'static str {
        match self {
            ChannelId::Accelerometer => "Acl",
            ChannelId::Gyroscope => "Gyr",
            ChannelId::Magnetometer => "Mag",
            ChannelId::Temperature => "Temp",
            ChannelId::Humidity => "Humid",
            ChannelId::Pressure => "Press",
        }
    }

    /// Unit of measurement
    pub const fn unit(&self) -> &'static str {
        match self {
            ChannelId::Accelerometer => "m/s²",
            ChannelId::Gyroscope => "dps",
            ChannelId::Magnetometer => "gauss",
            ChannelId::Temperature => "°C",
            ChannelId::Humidity => "%",
            ChannelId::Pressure => "hPa",
        }
    }

    /// Whether samples on this channel are 3-axis vectors.
    pub const fn is_vector(&self) -> bool {
        matches!(
            self,
            ChannelId::Accelerometer | ChannelId::Gyroscope | ChannelId::Magnetometer
        )
    }

    /// Advisory control action announced with a threshold alarm.
    pub const fn response_action(&self, direction: AlarmDirection) -> &'static str {
        match (self, direction) {
            (ChannelId::Accelerometer | ChannelId::Gyroscope, _) => "raising vibration alarm",
            (ChannelId::Magnetometer, _) => "engaging electromagnetic shielding",
            (ChannelId::Temperature, AlarmDirection::High) => "engaging cooling system",
            (ChannelId::Temperature, AlarmDirection::Low) => "engaging heating system",
            (ChannelId::Humidity, AlarmDirection::High) => "engaging dehumidifier",
            (ChannelId::Humidity, AlarmDirection::Low) => "engaging humidifier",
            (ChannelId::Pressure, AlarmDirection::High) => "releasing pressure valve",
            (ChannelId::Pressure, AlarmDirection::Low) => "engaging pressure pump",
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for ChannelId {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "{}", self.name());
    }
}

/// Per-channel configuration, fixed at startup.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChannelConfig {
    /// Which physical quantity this configures
    pub id: ChannelId,
    /// Polling period of the owning producer, in milliseconds
    pub interval_ms: u32,
    /// Lower alarm bound in the channel's unit (magnitude for vectors)
    pub threshold_low: f32,
    /// Upper alarm bound in the channel's unit (magnitude for vectors)
    pub threshold_high: f32,
}

/// Point-in-time view of one channel, the input to selection policies.
///
/// Snapshots are plain data so policies stay pure and unit-testable against
/// arbitrary occupancy patterns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelSnapshot {
    /// Ring capacity
    pub capacity: usize,
    /// Occupied slots at snapshot time
    pub occupancy: usize,
    /// Producer polling period
    pub interval_ms: u32,
}

impl ChannelSnapshot {
    /// Free slots remaining (`capacity - occupancy`).
    pub const fn emptiness(&self) -> usize {
        self.capacity - self.occupancy
    }
}

/// Seam between a concrete [`SensorChannel`] and the tasks that share it.
///
/// Push is reserved to the owning producer and pop to the scheduler; the
/// trait cannot express that, so the contract is upheld by the wiring code
/// that hands out the references.
pub trait Channel: Send + Sync {
    /// Which physical quantity this channel carries.
    fn id(&self) -> ChannelId;
    /// Startup configuration.
    fn config(&self) -> &ChannelConfig;
    /// Ring capacity.
    fn capacity(&self) -> usize;
    /// Occupied ring slots.
    fn occupancy(&self) -> usize;

    /// Store a sample (producer side).
    fn push(&self, sample: Sample) -> Result<(), FifoFull>;

    /// Take the oldest sample (scheduler side).
    fn try_pop(&self) -> Option<Sample>;

    /// Whether the owning producer currently holds an alarm.
    fn alarm_active(&self) -> bool;

    /// Producer-only: record the current alarm condition.
    fn set_alarm(&self, active: bool);

    /// Plain-data view for the selection policies.
    fn snapshot(&self) -> ChannelSnapshot {
        ChannelSnapshot {
            capacity: self.capacity(),
            occupancy: self.occupancy(),
            interval_ms: self.config().interval_ms,
        }
    }
}

/// One physical quantity's state: configuration, alarm flag, sample ring.
///
/// `N` is the FIFO capacity. Channels are constructed once at startup and
/// live for the whole process; the embedded lifetime model has no teardown
/// path.
pub struct SensorChannel<const N: usize> {
    config: ChannelConfig,
    alarm_active: AtomicBool,
    fifo: SpscFifo<Sample, N>,
}

impl<const N: usize> SensorChannel<N> {
    /// Channel with an empty ring and no active alarm.
    pub const fn new(config: ChannelConfig) -> Self {
        Self {
            config,
            alarm_active: AtomicBool::new(false),
            fifo: SpscFifo::new(),
        }
    }

    /// Direct access to the ring, for diagnostics.
    pub fn fifo(&self) -> &SpscFifo<Sample, N> {
        &self.fifo
    }
}

impl<const N: usize> Channel for SensorChannel<N> {
    fn id(&self) -> ChannelId {
        self.config.id
    }

    fn config(&self) -> &ChannelConfig {
        &self.config
    }

    fn capacity(&self) -> usize {
        self.fifo.capacity()
    }

    fn occupancy(&self) -> usize {
        self.fifo.occupancy()
    }

    fn push(&self, sample: Sample) -> Result<(), FifoFull> {
        self.fifo.push(sample)
    }

    fn try_pop(&self) -> Option<Sample> {
        self.fifo.pop()
    }

    fn alarm_active(&self) -> bool {
        self.alarm_active.load(Ordering::Acquire)
    }

    fn set_alarm(&self, active: bool) {
        self.alarm_active.store(active, Ordering::Release);
    }
}
