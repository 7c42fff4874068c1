//! Producer Task Cycle
//!
//! One producer exists per channel, polling on that channel's fixed
//! period. A cycle is:
//!
//! 1. Acquire the bus lock (blocking)
//! 2. Read the sensor
//! 3. Stamp with wall-clock time
//! 4. Release the lock
//! 5. Evaluate the alarm window (edge-triggered) and report transitions
//! 6. Push the sample; report an overflow if the FIFO rejects it
//! 7. Sleep until the next absolute period boundary
//!
//! Steps 5 and 6 run outside the lock so hold time stays at one register
//! read. Step 7 belongs to the runtime loop ([`crate::rt`]); the cycle
//! itself is a plain synchronous function, which is what makes it
//! unit-testable with a fixed clock and a scripted sensor.
//!
//! FIFO rejection is not a task failure. The producer reports it and
//! polls again next period; only a failed sensor `init` at startup aborts.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::alarm::{AlarmEdge, ThresholdMonitor};
use crate::bus::BusLock;
use crate::channel::Channel;
use crate::errors::{InitError, SensorError};
use crate::events::{EventKind, ReportEvent};
use crate::sample::{Sample, ScalarSample, VectorSample};
use crate::sensor::{Reading, SensorRead};
use crate::status::StatusIndicator;
use crate::time::ClockSource;
use crate::transport::MessageSink;

/// Upper bound on the per-cycle wake jitter, in milliseconds.
///
/// Desynchronizes the six producers so they do not pile onto the bus lock
/// at the same instant every period.
pub const JITTER_MAX_MS: u32 = 10;

/// What one polling cycle did, for tests and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CycleOutcome {
    /// Whether the sample made it into the FIFO
    pub pushed: bool,
    /// Alarm transition fired this cycle, if any
    pub alarm: Option<AlarmEdge>,
}

/// Periodic polling task for one channel.
///
/// Owns the sensor backend and the alarm monitor; shares the channel, bus,
/// clock, sink and indicator with the rest of the system by reference.
pub struct Producer<'a, S: SensorRead, B> {
    channel: &'a dyn Channel,
    sensor: S,
    bus: &'a BusLock<B>,
    clock: &'a dyn ClockSource,
    sink: &'a dyn MessageSink,
    indicator: &'a dyn StatusIndicator,
    monitor: ThresholdMonitor,
    jitter: SmallRng,
}

impl<'a, S: SensorRead, B> Producer<'a, S, B> {
    /// Producer for `channel`, owning its sensor backend.
    pub fn new(
        channel: &'a dyn Channel,
        sensor: S,
        bus: &'a BusLock<B>,
        clock: &'a dyn ClockSource,
        sink: &'a dyn MessageSink,
        indicator: &'a dyn StatusIndicator,
    ) -> Self {
        let config = channel.config();
        Self {
            monitor: ThresholdMonitor::new(config.threshold_low, config.threshold_high),
            // Seed by channel so the six producers jitter differently.
            jitter: SmallRng::seed_from_u64(config.id.index() as u64 + 1),
            channel,
            sensor,
            bus,
            clock,
            sink,
            indicator,
        }
    }

    /// Bring the sensor up. A failure here halts system startup.
    pub fn init(&mut self) -> Result<(), InitError> {
        self.sensor.init().map_err(|source| InitError::Sensor {
            channel: self.channel.id(),
            source,
        })
    }

    /// Polling period inherited from the channel configuration.
    pub fn interval_ms(&self) -> u32 {
        self.channel.config().interval_ms
    }

    /// Name of the channel this producer polls.
    pub fn channel_name(&self) -> &'static str {
        self.channel.id().name()
    }

    /// Bounded random wake offset for the next cycle.
    pub fn next_jitter_ms(&mut self) -> u32 {
        self.jitter.random_range(0..=JITTER_MAX_MS)
    }

    /// Execute one polling cycle (steps 1 through 6).
    pub fn run_cycle(&mut self) -> Result<CycleOutcome, SensorError> {
        // Bus held for exactly the read-and-stamp sequence.
        let (reading, timestamp) = {
            let _bus = self.bus.acquire();
            let reading = self.sensor.read()?;
            (reading, self.clock.now())
        };

        let sample: Sample = match reading {
            Reading::Scalar(value) => ScalarSample { timestamp, value }.into(),
            Reading::Vector { x, y, z } => VectorSample { timestamp, x, y, z }.into(),
        };

        let value = sample.alarm_value();
        let alarm = self.monitor.evaluate(value);
        if let Some(edge) = alarm {
            self.report_alarm(edge, value, sample.timestamp());
        }

        let pushed = match self.channel.push(sample) {
            Ok(()) => true,
            Err(_full) => {
                // Drop-new: the sample is gone, the schedule is kept.
                let event = ReportEvent {
                    timestamp,
                    channel: self.channel.id(),
                    kind: EventKind::BufferOverflow,
                };
                self.sink.send(&event.render());
                false
            }
        };

        Ok(CycleOutcome { pushed, alarm })
    }

    fn report_alarm(&self, edge: AlarmEdge, value: f32, acquired: crate::time::Timestamp) {
        let now = self.clock.now();
        let kind = match edge {
            AlarmEdge::Raised(direction) => {
                self.channel.set_alarm(true);
                self.indicator.set_alert(true);
                EventKind::ThresholdAlarm {
                    direction,
                    value,
                    // Response latency: evaluation time minus acquisition
                    // time.
                    latency_ms: now.delta_ms(acquired),
                }
            }
            AlarmEdge::Cleared => {
                self.channel.set_alarm(false);
                self.indicator.set_alert(false);
                EventKind::ThresholdCleared { value }
            }
        };
        self.sink.send(
            &ReportEvent {
                timestamp: now,
                channel: self.channel.id(),
                kind,
            }
            .render(),
        );
    }
}
