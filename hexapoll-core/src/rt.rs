//! Host Runtime: Periodic Tasks on OS Threads
//!
//! On an embedded target every task would be a statically-allocated RTOS
//! task woken by the kernel at absolute tick boundaries. This module is
//! the host-side equivalent: one OS thread per task, each sleeping to
//! `start + k × period` so scheduling drift never accumulates, with the
//! producers adding their small bounded jitter on top of the boundary to
//! stay desynchronized.
//!
//! The runtime owns nothing but the loop. Task state lives in the
//! [`Producer`](crate::producer::Producer) and
//! [`Scheduler`](crate::scheduler::Scheduler) values handed in; channels,
//! bus, clock and sink are shared by reference, which is why the runner
//! uses scoped threads rather than `'static` spawns.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crate::producer::Producer;
use crate::scheduler::Scheduler;
use crate::sensor::SensorRead;

/// One independently scheduled periodic task.
pub trait PeriodicTask: Send {
    /// Task name for logs and thread names.
    fn task_name(&self) -> &'static str;

    /// Fixed period between cycle boundaries. A zero period disables the
    /// task: its thread exits without running a cycle.
    fn period_ms(&self) -> u32;

    /// Wake offset past the next boundary. Bounded and small; defaults to
    /// none.
    fn jitter_ms(&mut self) -> u32 {
        0
    }

    /// Execute one cycle. Never propagates steady-state rejections.
    fn run_cycle(&mut self);
}

impl<S, B> PeriodicTask for Producer<'_, S, B>
where
    S: SensorRead,
    B: Send,
{
    fn task_name(&self) -> &'static str {
        self.channel_name()
    }

    fn period_ms(&self) -> u32 {
        self.interval_ms()
    }

    fn jitter_ms(&mut self) -> u32 {
        self.next_jitter_ms()
    }

    fn run_cycle(&mut self) {
        // A steady-state read failure is logged and the cycle forfeited;
        // the task keeps its schedule.
        if let Err(_error) = Producer::run_cycle(self) {
            #[cfg(feature = "log")]
            log::warn!("{}: sensor read failed: {}", self.channel_name(), _error);
        }
    }
}

impl PeriodicTask for Scheduler<'_> {
    fn task_name(&self) -> &'static str {
        "scheduler"
    }

    fn period_ms(&self) -> u32 {
        Scheduler::period_ms(self)
    }

    fn run_cycle(&mut self) {
        let _ = Scheduler::run_cycle(self);
    }
}

/// Sleep to `deadline`, waking early if `stop` flips.
fn sleep_until(deadline: Instant, stop: &AtomicBool) {
    const CHECK_EVERY: Duration = Duration::from_millis(50);

    loop {
        if stop.load(Ordering::Relaxed) {
            return;
        }
        let now = Instant::now();
        if now >= deadline {
            return;
        }
        std::thread::sleep((deadline - now).min(CHECK_EVERY));
    }
}

/// Run every task on its own thread until `stop` is set.
///
/// Blocks the caller until all task threads have wound down. Cycle `k`
/// of a task executes at `start + k × period (+ jitter)`; a cycle that
/// overruns its period is followed immediately by the next one rather
/// than shifting all later boundaries.
pub fn run(tasks: Vec<Box<dyn PeriodicTask + '_>>, stop: &AtomicBool) {
    std::thread::scope(|scope| {
        for mut task in tasks {
            scope.spawn(move || {
                let period = Duration::from_millis(task.period_ms() as u64);
                if period.is_zero() {
                    #[cfg(feature = "log")]
                    log::info!("{}: zero period, task disabled", task.task_name());
                    return;
                }

                #[cfg(feature = "log")]
                log::info!(
                    "{}: task started, period {} ms",
                    task.task_name(),
                    period.as_millis()
                );

                let start = Instant::now();
                let mut cycle = 0u32;
                while !stop.load(Ordering::Relaxed) {
                    task.run_cycle();
                    cycle = cycle.wrapping_add(1);

                    let boundary = start + period * cycle;
                    let wake = boundary + Duration::from_millis(task.jitter_ms() as u64);
                    sleep_until(wake, stop);
                }
            });
        }
    });
}
