//! Sample types stored in the per-channel FIFOs
//!
//! Two shapes exist: scalar quantities (temperature, humidity, pressure)
//! and 3-axis vector quantities (acceleration, angular rate, magnetic
//! field). Both carry the wall-clock [`Timestamp`] taken at acquisition.
//! A sample is owned by the FIFO slot it occupies until the scheduler pops
//! it; ownership then moves to the caller.

use crate::time::Timestamp;

/// Single-value reading with its acquisition time.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScalarSample {
    /// Wall-clock acquisition time
    pub timestamp: Timestamp,
    /// Value in the channel's physical unit
    pub value: f32,
}

/// 3-axis reading with its acquisition time.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VectorSample {
    /// Wall-clock acquisition time
    pub timestamp: Timestamp,
    /// X axis, in the channel's physical unit
    pub x: f32,
    /// Y axis
    pub y: f32,
    /// Z axis
    pub z: f32,
}

impl VectorSample {
    /// Euclidean norm of the three axes.
    ///
    /// Threshold checks on vector channels compare this magnitude, not the
    /// individual components.
    pub fn magnitude(&self) -> f32 {
        libm::sqrtf(self.x * self.x + self.y * self.y + self.z * self.z)
    }
}

/// Either sample shape, as stored in a channel FIFO.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Sample {
    /// Single-value reading
    Scalar(ScalarSample),
    /// 3-axis reading
    Vector(VectorSample),
}

impl Sample {
    /// Acquisition time of the underlying reading.
    pub fn timestamp(&self) -> Timestamp {
        match self {
            Sample::Scalar(s) => s.timestamp,
            Sample::Vector(v) => v.timestamp,
        }
    }

    /// Value the alarm evaluation compares against the thresholds:
    /// the plain value for scalars, the Euclidean magnitude for vectors.
    pub fn alarm_value(&self) -> f32 {
        match self {
            Sample::Scalar(s) => s.value,
            Sample::Vector(v) => v.magnitude(),
        }
    }
}

impl From<ScalarSample> for Sample {
    fn from(s: ScalarSample) -> Self {
        Sample::Scalar(s)
    }
}

impl From<VectorSample> for Sample {
    fn from(v: VectorSample) -> Self {
        Sample::Vector(v)
    }
}
