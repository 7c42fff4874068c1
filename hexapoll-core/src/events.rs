//! Report Events and Message Formatting
//!
//! Everything the pipeline tells the outside world travels as a short text
//! line through the transport sink: per-sample data reports from the
//! scheduler, and out-of-band events (threshold alarms, alarm clears, FIFO
//! overflows, empty-notice cycles) from whichever task observed them.
//!
//! Messages are bounded [`heapless::String`]s; nothing here allocates. A
//! line that would exceed [`MAX_MESSAGE_LEN`] is truncated, which the
//! transport contract already permits, but the formats below are sized to
//! fit with room to spare.
//!
//! Typical output:
//!
//! ```text
//! 12:03:07:250 Acl XYZ:   0.12  -0.03   9.81 05/32
//! 12:03:08:103 Temp:  24.61 03/16
//! 12:03:09:000 temperature alarm: 38.20 °C out of range, engaging cooling system (latency 4 ms)
//! 12:03:09:000 humidity fifo overflow, sample dropped
//! ```

use core::fmt::Write as _;

use crate::alarm::AlarmDirection;
use crate::channel::ChannelId;
use crate::sample::Sample;
use crate::time::Timestamp;

/// Maximum transport line length, including nothing beyond the text
/// itself (no terminator).
pub const MAX_MESSAGE_LEN: usize = 96;

/// A bounded, formatted transport line.
pub type Message = heapless::String<MAX_MESSAGE_LEN>;

/// What an out-of-band event reports.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EventKind {
    /// A reading left the alarm window
    ThresholdAlarm {
        direction: AlarmDirection,
        /// The offending value (magnitude for vector channels)
        value: f32,
        /// Wall-clock delay between acquisition and evaluation
        latency_ms: u32,
    },
    /// A reading returned inside the window
    ThresholdCleared { value: f32 },
    /// A sample was rejected by a full FIFO and discarded
    BufferOverflow,
    /// A scheduled pop found the FIFO empty (normal, not a fault)
    BufferEmpty,
}

impl EventKind {
    pub const fn name(&self) -> &'static str {
        match self {
            EventKind::ThresholdAlarm { .. } => "threshold-alarm",
            EventKind::ThresholdCleared { .. } => "threshold-cleared",
            EventKind::BufferOverflow => "buffer-overflow",
            EventKind::BufferEmpty => "buffer-empty",
        }
    }
}

/// One out-of-band event, ready to format.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReportEvent {
    pub timestamp: Timestamp,
    pub channel: ChannelId,
    pub kind: EventKind,
}

impl ReportEvent {
    /// Render the transport line for this event.
    pub fn render(&self) -> Message {
        let mut line = Message::new();
        let name = self.channel.name();

        // A full buffer only truncates; the sink permits that.
        let _ = match self.kind {
            EventKind::ThresholdAlarm {
                direction,
                value,
                latency_ms,
            } => write!(
                line,
                "{} {} alarm: {:.2} {} out of range, {} (latency {} ms)",
                self.timestamp,
                name,
                value,
                self.channel.unit(),
                self.channel.response_action(direction),
                latency_ms,
            ),
            EventKind::ThresholdCleared { value } => write!(
                line,
                "{} {} back in range: {:.2} {}",
                self.timestamp,
                name,
                value,
                self.channel.unit(),
            ),
            EventKind::BufferOverflow => write!(
                line,
                "{} {} fifo overflow, sample dropped",
                self.timestamp, name,
            ),
            EventKind::BufferEmpty => {
                write!(line, "{} {} fifo empty", self.timestamp, name)
            }
        };
        line
    }
}

/// Render the scheduler's data report for one drained sample.
///
/// `occupancy` is the ring's occupancy after the pop, so the line shows
/// how much backlog the channel still carries.
pub fn render_sample(
    channel: ChannelId,
    sample: &Sample,
    occupancy: usize,
    capacity: usize,
) -> Message {
    let mut line = Message::new();
    let _ = match sample {
        Sample::Vector(v) => write!(
            line,
            "{} {} XYZ: {:6.2} {:6.2} {:6.2} {:02}/{:02}",
            v.timestamp,
            channel.short_tag(),
            v.x,
            v.y,
            v.z,
            occupancy,
            capacity,
        ),
        Sample::Scalar(s) => write!(
            line,
            "{} {}: {:6.2} {:02}/{:02}",
            s.timestamp,
            channel.short_tag(),
            s.value,
            occupancy,
            capacity,
        ),
    };
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::{ScalarSample, VectorSample};

    #[test]
    fn alarm_line_carries_value_action_and_latency() {
        let event = ReportEvent {
            timestamp: Timestamp::new(12, 3, 9, 0),
            channel: ChannelId::Temperature,
            kind: EventKind::ThresholdAlarm {
                direction: AlarmDirection::High,
                value: 38.2,
                latency_ms: 4,
            },
        };
        assert_eq!(
            event.render().as_str(),
            "12:03:09:000 temperature alarm: 38.20 °C out of range, \
             engaging cooling system (latency 4 ms)"
        );
    }

    #[test]
    fn cleared_line() {
        let event = ReportEvent {
            timestamp: Timestamp::new(0, 0, 1, 500),
            channel: ChannelId::Humidity,
            kind: EventKind::ThresholdCleared { value: 45.0 },
        };
        assert_eq!(
            event.render().as_str(),
            "00:00:01:500 humidity back in range: 45.00 %"
        );
    }

    #[test]
    fn overflow_and_empty_lines() {
        let ts = Timestamp::new(7, 30, 0, 1);
        let overflow = ReportEvent {
            timestamp: ts,
            channel: ChannelId::Gyroscope,
            kind: EventKind::BufferOverflow,
        };
        assert_eq!(
            overflow.render().as_str(),
            "07:30:00:001 gyroscope fifo overflow, sample dropped"
        );

        let empty = ReportEvent {
            timestamp: ts,
            channel: ChannelId::Pressure,
            kind: EventKind::BufferEmpty,
        };
        assert_eq!(empty.render().as_str(), "07:30:00:001 pressure fifo empty");
    }

    #[test]
    fn vector_report_line() {
        let sample = Sample::Vector(VectorSample {
            timestamp: Timestamp::new(12, 3, 7, 250),
            x: 0.12,
            y: -0.03,
            z: 9.81,
        });
        assert_eq!(
            render_sample(ChannelId::Accelerometer, &sample, 5, 32).as_str(),
            "12:03:07:250 Acl XYZ:   0.12  -0.03   9.81 05/32"
        );
    }

    #[test]
    fn scalar_report_line() {
        let sample = Sample::Scalar(ScalarSample {
            timestamp: Timestamp::new(12, 3, 8, 103),
            value: 24.61,
        });
        assert_eq!(
            render_sample(ChannelId::Temperature, &sample, 3, 16).as_str(),
            "12:03:08:103 Temp:  24.61 03/16"
        );
    }

    #[test]
    fn event_kind_names() {
        assert_eq!(EventKind::BufferEmpty.name(), "buffer-empty");
        assert_eq!(EventKind::BufferOverflow.name(), "buffer-overflow");
    }
}
