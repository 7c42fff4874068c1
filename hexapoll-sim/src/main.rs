//! Host simulator for the hexapoll acquisition pipeline.
//!
//! Wires the six default channels to simulated sensors, the host wall
//! clock and a bounded stdout transport, then runs the producer and
//! scheduler tasks on threads for a fixed duration.
//!
//! ```text
//! hexapoll-sim [POLICY] [SECONDS]
//!
//! POLICY   random | fullest-first | predictive   (default fullest-first)
//! SECONDS  how long to run                       (default 30)
//! ```
//!
//! Simulated readings sit at a plausible baseline with ±5 % multiplicative
//! noise, so alarm and overflow paths stay quiet unless the thresholds
//! are tightened.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use hexapoll_core::bus::BusLock;
use hexapoll_core::channel::{Channel, ChannelId, SensorChannel, CHANNEL_COUNT};
use hexapoll_core::config::{SystemConfig, SCALAR_FIFO_DEPTH, VECTOR_FIFO_DEPTH};
use hexapoll_core::errors::SensorError;
use hexapoll_core::policy::PolicyKind;
use hexapoll_core::producer::Producer;
use hexapoll_core::rt::{self, PeriodicTask};
use hexapoll_core::scheduler::Scheduler;
use hexapoll_core::sensor::{Reading, SensorRead};
use hexapoll_core::status::StatusIndicator;
use hexapoll_core::time::SystemClock;
use hexapoll_core::transport::QueuedSink;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Transport queue depth.
const SINK_DEPTH: usize = 20;

/// Simulated sensor: a fixed baseline with multiplicative noise.
struct SimSensor {
    baseline: Reading,
    rng: SmallRng,
}

impl SimSensor {
    fn new(id: ChannelId, seed: u64) -> Self {
        let baseline = match id {
            ChannelId::Accelerometer => Reading::Vector {
                x: 0.12,
                y: -0.08,
                z: 9.81,
            },
            ChannelId::Gyroscope => Reading::Vector {
                x: 0.4,
                y: -0.2,
                z: 0.1,
            },
            ChannelId::Magnetometer => Reading::Vector {
                x: 0.31,
                y: 0.12,
                z: -0.24,
            },
            ChannelId::Temperature => Reading::Scalar(24.5),
            ChannelId::Humidity => Reading::Scalar(45.0),
            ChannelId::Pressure => Reading::Scalar(975.0),
        };
        Self {
            baseline,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    fn noise(&mut self) -> f32 {
        1.0 + self.rng.random_range(-0.05..0.05)
    }
}

impl SensorRead for SimSensor {
    fn read(&mut self) -> Result<Reading, SensorError> {
        let factor = self.noise();
        Ok(match self.baseline {
            Reading::Scalar(value) => Reading::Scalar(value * factor),
            Reading::Vector { x, y, z } => Reading::Vector {
                x: x * factor,
                y: y * factor,
                z: z * factor,
            },
        })
    }
}

/// Status indicator that logs transitions instead of driving LEDs.
struct LogIndicator;

impl StatusIndicator for LogIndicator {
    fn set_alert(&self, on: bool) {
        if on {
            log::warn!("status: alert");
        } else {
            log::info!("status: nominal");
        }
    }
}

fn parse_args() -> (PolicyKind, Duration) {
    let mut policy = PolicyKind::FullestFirst;
    let mut seconds = 30u64;

    for arg in std::env::args().skip(1) {
        if let Ok(parsed) = arg.parse::<u64>() {
            seconds = parsed;
        } else {
            policy = PolicyKind::from_name(&arg).unwrap_or_else(|error| {
                log::error!("{error}: {arg:?}");
                std::process::exit(1);
            });
        }
    }
    (policy, Duration::from_secs(seconds))
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let (policy, duration) = parse_args();
    let config = SystemConfig {
        policy,
        ..SystemConfig::default()
    };

    let accel: SensorChannel<VECTOR_FIFO_DEPTH> = SensorChannel::new(config.channels[0]);
    let gyro: SensorChannel<VECTOR_FIFO_DEPTH> = SensorChannel::new(config.channels[1]);
    let mag: SensorChannel<VECTOR_FIFO_DEPTH> = SensorChannel::new(config.channels[2]);
    let temp: SensorChannel<SCALAR_FIFO_DEPTH> = SensorChannel::new(config.channels[3]);
    let humid: SensorChannel<SCALAR_FIFO_DEPTH> = SensorChannel::new(config.channels[4]);
    let press: SensorChannel<SCALAR_FIFO_DEPTH> = SensorChannel::new(config.channels[5]);

    let channels: [&dyn Channel; CHANNEL_COUNT] =
        [&accel, &gyro, &mag, &temp, &humid, &press];

    let bus = BusLock::new(());
    let clock = SystemClock;
    let sink = QueuedSink::stdout(SINK_DEPTH);
    let indicator = LogIndicator;

    let seed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64;

    let mut tasks: Vec<Box<dyn PeriodicTask + '_>> = Vec::new();
    for (index, channel) in channels.iter().enumerate() {
        let sensor = SimSensor::new(channel.id(), seed.wrapping_add(index as u64));
        let mut producer = Producer::new(*channel, sensor, &bus, &clock, &sink, &indicator);
        // Sensor bring-up failure halts the system before any task runs.
        if let Err(error) = producer.init() {
            log::error!("{error}");
            std::process::exit(1);
        }
        tasks.push(Box::new(producer));
    }

    let scheduler = Scheduler::new(
        channels,
        config.policy.build(seed),
        &clock,
        &sink,
        config.scheduler_period_ms,
    );
    scheduler.announce();
    tasks.push(Box::new(scheduler));

    log::info!(
        "running {} task(s) for {} s",
        tasks.len(),
        duration.as_secs()
    );

    let stop = AtomicBool::new(false);
    std::thread::scope(|scope| {
        scope.spawn(|| {
            std::thread::sleep(duration);
            stop.store(true, Ordering::Relaxed);
        });
        rt::run(tasks, &stop);
    });

    log::info!("transport dropped {} message(s)", sink.dropped());
}
