//! Scheduler Task Cycle
//!
//! The single consumer of all six channel FIFOs. Once per period it asks
//! the active selection policy for a channel, pops one sample from that
//! channel's ring and forwards the formatted report line to the transport
//! sink. An empty ring produces an empty-notice line instead; that is a
//! normal outcome of policy selection, not a fault.
//!
//! The task alternates between exactly two states, `Idle` between cycles
//! and `Servicing` inside one. The only suspension point is the
//! time-bounded sleep to the next absolute period boundary; the scheduler
//! never blocks on a lock (it does not touch the bus) and never blocks on
//! the sink.

use alloc::boxed::Box;

use crate::channel::{Channel, ChannelId, ChannelSnapshot, CHANNEL_COUNT};
use crate::events::{render_sample, EventKind, ReportEvent};
use crate::policy::SelectionPolicy;
use crate::time::ClockSource;
use crate::transport::MessageSink;

/// Operating state, observable for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// Between cycles, sleeping to the next period boundary
    Idle,
    /// Inside a cycle: select, pop, format, forward
    Servicing,
}

/// What one scheduling cycle did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceOutcome {
    /// A sample was drained and its report forwarded
    Delivered(ChannelId),
    /// The selected ring was empty; an empty notice was forwarded
    Empty(ChannelId),
    /// The policy had no defined choice this cycle
    Skipped,
}

/// The periodic drain-and-report task.
pub struct Scheduler<'a> {
    channels: [&'a dyn Channel; CHANNEL_COUNT],
    policy: Box<dyn SelectionPolicy>,
    clock: &'a dyn ClockSource,
    sink: &'a dyn MessageSink,
    period_ms: u32,
    state: SchedulerState,
}

impl<'a> Scheduler<'a> {
    /// Scheduler over the six channels with the given policy and period.
    pub fn new(
        channels: [&'a dyn Channel; CHANNEL_COUNT],
        policy: Box<dyn SelectionPolicy>,
        clock: &'a dyn ClockSource,
        sink: &'a dyn MessageSink,
        period_ms: u32,
    ) -> Self {
        Self {
            channels,
            policy,
            clock,
            sink,
            period_ms,
            state: SchedulerState::Idle,
        }
    }

    /// Cycle period, fixed at startup.
    pub fn period_ms(&self) -> u32 {
        self.period_ms
    }

    /// Current operating state.
    pub fn state(&self) -> SchedulerState {
        self.state
    }

    /// Announce the active selection scheme, once at startup.
    pub fn announce(&self) {
        use core::fmt::Write as _;

        let mut line = crate::events::Message::new();
        let _ = write!(line, "selection scheme: {}", self.policy.name());
        self.sink.send(&line);
    }

    /// Execute one scheduling cycle.
    pub fn run_cycle(&mut self) -> ServiceOutcome {
        self.state = SchedulerState::Servicing;

        let snapshots: [ChannelSnapshot; CHANNEL_COUNT] =
            core::array::from_fn(|i| self.channels[i].snapshot());

        let outcome = match self.policy.select(&snapshots) {
            None => ServiceOutcome::Skipped,
            Some(index) => self.service(index),
        };

        self.state = SchedulerState::Idle;
        outcome
    }

    fn service(&mut self, index: usize) -> ServiceOutcome {
        let channel = self.channels[index];
        let id = channel.id();

        match channel.try_pop() {
            Some(sample) => {
                let line =
                    render_sample(id, &sample, channel.occupancy(), channel.capacity());
                self.sink.send(&line);
                ServiceOutcome::Delivered(id)
            }
            None => {
                let event = ReportEvent {
                    timestamp: self.clock.now(),
                    channel: id,
                    kind: EventKind::BufferEmpty,
                };
                self.sink.send(&event.render());
                ServiceOutcome::Empty(id)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::{ChannelConfig, SensorChannel};
    use crate::policy::{FullestFirst, PolicyKind};
    use crate::sample::ScalarSample;
    use crate::time::{FixedClock, Timestamp};
    use crate::transport::MemorySink;

    struct Rig {
        channels: [SensorChannel<4>; CHANNEL_COUNT],
        clock: FixedClock,
        sink: MemorySink,
    }

    impl Rig {
        fn new() -> Self {
            Self {
                channels: core::array::from_fn(|i| {
                    SensorChannel::new(ChannelConfig {
                        id: ChannelId::from_index(i).unwrap(),
                        interval_ms: 1_000,
                        threshold_low: f32::MIN,
                        threshold_high: f32::MAX,
                    })
                }),
                clock: FixedClock::new(0),
                sink: MemorySink::new(),
            }
        }

        fn refs(&self) -> [&dyn Channel; CHANNEL_COUNT] {
            core::array::from_fn(|i| &self.channels[i] as &dyn Channel)
        }

        fn scalar(&self, value: f32) -> crate::sample::Sample {
            ScalarSample {
                timestamp: Timestamp::default(),
                value,
            }
            .into()
        }
    }

    #[test]
    fn drains_the_fullest_channel() {
        let rig = Rig::new();
        rig.channels[2].push(rig.scalar(1.0)).unwrap();
        rig.channels[2].push(rig.scalar(2.0)).unwrap();
        rig.channels[4].push(rig.scalar(3.0)).unwrap();

        let mut scheduler = Scheduler::new(
            rig.refs(),
            Box::new(FullestFirst),
            &rig.clock,
            &rig.sink,
            1_000,
        );

        assert_eq!(
            scheduler.run_cycle(),
            ServiceOutcome::Delivered(ChannelId::Magnetometer)
        );
        assert_eq!(rig.channels[2].occupancy(), 1);

        // Report line shows the post-pop backlog.
        let lines = rig.sink.lines();
        assert!(lines[0].ends_with("01/04"), "got {:?}", lines[0]);
    }

    #[test]
    fn empty_selection_emits_notice_not_error() {
        let rig = Rig::new();
        let mut scheduler = Scheduler::new(
            rig.refs(),
            Box::new(FullestFirst),
            &rig.clock,
            &rig.sink,
            1_000,
        );

        // All rings empty: fullest-first tie-breaks to channel 0.
        assert_eq!(
            scheduler.run_cycle(),
            ServiceOutcome::Empty(ChannelId::Accelerometer)
        );
        let lines = rig.sink.lines();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("accelerometer fifo empty"));
    }

    #[test]
    fn state_returns_to_idle_after_each_cycle() {
        let rig = Rig::new();
        let mut scheduler = Scheduler::new(
            rig.refs(),
            PolicyKind::FullestFirst.build(0),
            &rig.clock,
            &rig.sink,
            1_000,
        );

        assert_eq!(scheduler.state(), SchedulerState::Idle);
        scheduler.run_cycle();
        assert_eq!(scheduler.state(), SchedulerState::Idle);
    }

    #[test]
    fn announces_the_active_scheme() {
        let rig = Rig::new();
        let scheduler = Scheduler::new(
            rig.refs(),
            PolicyKind::Predictive.build(0),
            &rig.clock,
            &rig.sink,
            1_000,
        );
        scheduler.announce();
        assert_eq!(rig.sink.lines(), vec!["selection scheme: predictive"]);
    }

    #[test]
    fn samples_drain_in_fifo_order() {
        let rig = Rig::new();
        for value in [1.0, 2.0, 3.0] {
            rig.channels[0].push(rig.scalar(value)).unwrap();
        }
        let mut scheduler = Scheduler::new(
            rig.refs(),
            Box::new(FullestFirst),
            &rig.clock,
            &rig.sink,
            1_000,
        );

        for _ in 0..3 {
            scheduler.run_cycle();
        }
        let lines = rig.sink.lines();
        assert!(lines[0].contains("  1.00"));
        assert!(lines[1].contains("  2.00"));
        assert!(lines[2].contains("  3.00"));
    }
}
