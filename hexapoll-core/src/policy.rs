//! FIFO Selection Policies
//!
//! Once per scheduling cycle the scheduler asks the active policy which
//! channel to service, handing it a point-in-time snapshot of every
//! channel's `{capacity, occupancy, interval_ms}`. Policies are pure with
//! respect to that snapshot; the only state any of them carries is the
//! Random variant's generator.
//!
//! Three strategies exist, chosen once at startup:
//!
//! | Policy         | Criterion                                   |
//! |----------------|---------------------------------------------|
//! | `Random`       | uniform draw, ignores buffer state          |
//! | `FullestFirst` | minimum emptiness (most full ring)          |
//! | `Predictive`   | minimum `emptiness × interval_ms`           |
//!
//! Both ranking policies scan in ascending channel order and replace the
//! current pick only on a strictly smaller key, so ties always resolve to
//! the lowest index. That determinism is part of the contract and is what
//! the unit tests pin down.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::channel::{ChannelSnapshot, CHANNEL_COUNT};
use crate::errors::InitError;

use alloc::boxed::Box;

/// A buffer-selection strategy.
///
/// `select` returns the index of the channel to service, or `None` when
/// the policy has no defined choice (see [`Predictive`]). Implementations
/// must not mutate anything observable besides their own generator state.
pub trait SelectionPolicy: Send {
    fn select(&mut self, channels: &[ChannelSnapshot; CHANNEL_COUNT]) -> Option<usize>;

    /// Name announced by the scheduler at startup.
    fn name(&self) -> &'static str;
}

/// Uniform random selection.
///
/// Ignores buffer state entirely; may well pick an empty ring, which the
/// scheduler reports as an empty-notice cycle.
pub struct Random {
    rng: SmallRng,
}

impl Random {
    /// Policy with a deterministic generator seeded by `seed`.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl SelectionPolicy for Random {
    fn select(&mut self, _channels: &[ChannelSnapshot; CHANNEL_COUNT]) -> Option<usize> {
        Some(self.rng.random_range(0..CHANNEL_COUNT))
    }

    fn name(&self) -> &'static str {
        "random"
    }
}

/// Service the most full ring.
///
/// Ranks channels by emptiness (`capacity - occupancy`) and picks the
/// minimum; the ascending scan with strict `<` makes the lowest index win
/// ties.
#[derive(Debug, Default, Clone, Copy)]
pub struct FullestFirst;

impl SelectionPolicy for FullestFirst {
    fn select(&mut self, channels: &[ChannelSnapshot; CHANNEL_COUNT]) -> Option<usize> {
        let mut selected = 0;
        let mut min_emptiness = channels[0].emptiness();

        for (index, snapshot) in channels.iter().enumerate().skip(1) {
            if snapshot.emptiness() < min_emptiness {
                min_emptiness = snapshot.emptiness();
                selected = index;
            }
        }
        Some(selected)
    }

    fn name(&self) -> &'static str {
        "fullest-first"
    }
}

/// Service the ring that would overflow soonest.
///
/// Estimates each channel's time-to-full as `emptiness × interval_ms`, the
/// number of milliseconds until overflow if the scheduler never serviced it
/// again, and picks the minimum with the same lowest-index tie-break as
/// [`FullestFirst`].
///
/// A channel with `interval_ms == 0` never fills on a schedule, so the
/// estimate is undefined; such channels are skipped. If every channel is
/// skipped there is no defined choice and `select` returns `None`.
#[derive(Debug, Default, Clone, Copy)]
pub struct Predictive;

impl SelectionPolicy for Predictive {
    fn select(&mut self, channels: &[ChannelSnapshot; CHANNEL_COUNT]) -> Option<usize> {
        let mut best: Option<(usize, u64)> = None;

        for (index, snapshot) in channels.iter().enumerate() {
            if snapshot.interval_ms == 0 {
                continue;
            }
            let time_to_full = snapshot.emptiness() as u64 * snapshot.interval_ms as u64;
            match best {
                Some((_, min)) if time_to_full >= min => {}
                _ => best = Some((index, time_to_full)),
            }
        }
        best.map(|(index, _)| index)
    }

    fn name(&self) -> &'static str {
        "predictive"
    }
}

/// Startup selector for the active policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PolicyKind {
    /// Uniform random selection
    Random,
    /// Minimum-emptiness selection
    FullestFirst,
    /// Minimum time-to-full selection
    Predictive,
}

impl PolicyKind {
    /// Parse a configuration name. An unrecognized scheme is fatal at
    /// startup; the system halts rather than guess.
    pub fn from_name(name: &str) -> Result<Self, InitError> {
        match name {
            "random" => Ok(PolicyKind::Random),
            "fullest-first" | "full" => Ok(PolicyKind::FullestFirst),
            "predictive" => Ok(PolicyKind::Predictive),
            _ => Err(InitError::UndefinedPolicy),
        }
    }

    /// Instantiate the policy. `seed` feeds the Random variant and is
    /// ignored by the others.
    pub fn build(self, seed: u64) -> Box<dyn SelectionPolicy> {
        match self {
            PolicyKind::Random => Box::new(Random::new(seed)),
            PolicyKind::FullestFirst => Box::new(FullestFirst),
            PolicyKind::Predictive => Box::new(Predictive),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshots(
        occupancies: [usize; CHANNEL_COUNT],
        capacities: [usize; CHANNEL_COUNT],
        intervals: [u32; CHANNEL_COUNT],
    ) -> [ChannelSnapshot; CHANNEL_COUNT] {
        core::array::from_fn(|i| ChannelSnapshot {
            capacity: capacities[i],
            occupancy: occupancies[i],
            interval_ms: intervals[i],
        })
    }

    #[test]
    fn fullest_first_picks_most_full() {
        let snaps = snapshots(
            [2, 9, 4, 0, 1, 3],
            [10, 10, 10, 10, 10, 10],
            [1_000; CHANNEL_COUNT],
        );
        assert_eq!(FullestFirst.select(&snaps), Some(1));
    }

    #[test]
    fn fullest_first_tie_breaks_to_lowest_index() {
        // Emptiness [5,5,7,5,10,9]: minimum 5 first occurs at index 0.
        let snaps = snapshots(
            [5, 5, 3, 5, 0, 1],
            [10, 10, 10, 10, 10, 10],
            [1_000; CHANNEL_COUNT],
        );
        assert_eq!(FullestFirst.select(&snaps), Some(0));
    }

    #[test]
    fn predictive_picks_earliest_overflow() {
        // time_to_full = [10000, 0, 2000, 1600, 1600, 1600]
        let snaps = snapshots(
            [0, 10, 6, 2, 2, 2],
            [10, 10, 10, 10, 10, 10],
            [1_000, 1_000, 500, 200, 200, 200],
        );
        assert_eq!(Predictive.select(&snaps), Some(1));
    }

    #[test]
    fn predictive_tie_breaks_to_lowest_index() {
        // Indexes 3..5 all share time_to_full 1600; 3 wins.
        let snaps = snapshots(
            [0, 2, 6, 2, 2, 2],
            [10, 10, 10, 10, 10, 10],
            [1_000, 2_000, 500, 200, 200, 200],
        );
        assert_eq!(Predictive.select(&snaps), Some(3));
    }

    #[test]
    fn predictive_skips_disabled_channels() {
        // Index 0 would win with time_to_full 0, but its interval is 0.
        let snaps = snapshots(
            [10, 2, 2, 2, 2, 2],
            [10, 10, 10, 10, 10, 10],
            [0, 1_000, 1_000, 1_000, 1_000, 1_000],
        );
        assert_eq!(Predictive.select(&snaps), Some(1));
    }

    #[test]
    fn predictive_with_no_eligible_channel() {
        let snaps = snapshots(
            [0; CHANNEL_COUNT],
            [10; CHANNEL_COUNT],
            [0; CHANNEL_COUNT],
        );
        assert_eq!(Predictive.select(&snaps), None);
    }

    #[test]
    fn random_is_roughly_uniform() {
        const TRIALS: usize = 60_000;
        let mut policy = Random::new(0x5eed);
        let snaps = snapshots(
            [0; CHANNEL_COUNT],
            [10; CHANNEL_COUNT],
            [1_000; CHANNEL_COUNT],
        );

        let mut counts = [0usize; CHANNEL_COUNT];
        for _ in 0..TRIALS {
            let index = policy.select(&snaps).unwrap();
            counts[index] += 1;
        }

        // Expected 10_000 per channel; a 10% tolerance is ~11 sigma for a
        // uniform draw, far beyond seeded-PRNG variation.
        let expected = TRIALS / CHANNEL_COUNT;
        for count in counts {
            assert!(
                count.abs_diff(expected) < expected / 10,
                "count {count} too far from {expected}"
            );
        }
    }

    #[test]
    fn unknown_policy_name_is_fatal() {
        assert!(matches!(
            PolicyKind::from_name("round-robin"),
            Err(InitError::UndefinedPolicy)
        ));
        assert_eq!(PolicyKind::from_name("predictive"), Ok(PolicyKind::Predictive));
    }

    #[test]
    fn policies_do_not_disturb_snapshots() {
        let snaps = snapshots(
            [5, 5, 3, 5, 0, 1],
            [10, 10, 10, 10, 10, 10],
            [1_000; CHANNEL_COUNT],
        );
        let before = snaps;
        let _ = FullestFirst.select(&snaps);
        let _ = Predictive.select(&snaps);
        let _ = Random::new(1).select(&snaps);
        assert_eq!(snaps, before);
    }
}
