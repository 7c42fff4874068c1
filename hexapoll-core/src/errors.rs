//! Error Types for the Acquisition Pipeline
//!
//! The error surface is deliberately small. Steady-state conditions that
//! belong to normal operation (a full FIFO on push, an empty FIFO on a
//! scheduled pop, a congested transport) are NOT errors here: they are
//! reported as events and the task moves on to its next cycle. Only
//! startup can fail hard.
//!
//! Design rules, matching the rest of the crate:
//!
//! 1. **Small and `Copy`**: errors are returned in per-cycle hot paths;
//!    every variant is a couple of words at most.
//! 2. **No heap**: messages are `&'static str` or inline fields.
//! 3. **Actionable**: each variant names the component that failed so the
//!    startup code can halt with a useful diagnostic.

use thiserror_no_std::Error;

use crate::channel::ChannelId;

/// Push rejection from a full FIFO.
///
/// Carries no payload: drop-new semantics mean the incoming sample is
/// discarded either way, and the producer reports the overflow as an event.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("fifo full, sample dropped")]
pub struct FifoFull;

/// Failure reported by a sensor backend.
///
/// During initialization any of these halts the system; during steady-state
/// polling they are not expected from the supported sensor set.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// The device did not acknowledge on the shared bus
    #[error("sensor not responding on bus")]
    NotResponding,
    /// The device answered with an unusable payload
    #[error("sensor returned invalid data")]
    InvalidData,
    /// The device failed its power-on or configuration sequence
    #[error("sensor initialization failed")]
    InitFailed,
}

/// Fatal startup failure. The system halts rather than run degraded.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitError {
    /// A sensor failed its bring-up sequence
    #[error("channel {channel:?} failed to initialize: {source}")]
    Sensor {
        channel: ChannelId,
        source: SensorError,
    },
    /// The configured selection policy does not exist
    #[error("undefined selection policy")]
    UndefinedPolicy,
}

#[cfg(feature = "defmt")]
impl defmt::Format for SensorError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::NotResponding => defmt::write!(fmt, "sensor not responding"),
            Self::InvalidData => defmt::write!(fmt, "sensor returned invalid data"),
            Self::InitFailed => defmt::write!(fmt, "sensor initialization failed"),
        }
    }
}
