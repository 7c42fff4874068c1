//! Edge-Triggered Threshold Monitoring
//!
//! Each producer task evaluates every sample against its channel's alarm
//! window. The monitor reports *transitions*, not conditions: one
//! [`AlarmEdge::Raised`] when a reading first leaves the window, one
//! [`AlarmEdge::Cleared`] when a reading first returns, and nothing while
//! the state persists. Repeating the alarm on every out-of-range poll would
//! flood the transport with duplicates of a fact it already delivered.
//!
//! Out-of-range readings are a normal operating condition of the monitored
//! environment, not a sensor fault; nothing here is an error.

/// Which bound a reading violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AlarmDirection {
    /// Reading above `threshold_high`
    High,
    /// Reading below `threshold_low`
    Low,
}

/// State transition produced by one evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlarmEdge {
    /// Reading left the window; carries the violated bound
    Raised(AlarmDirection),
    /// Reading returned inside the window
    Cleared,
}

/// Per-channel alarm window with edge detection.
///
/// Owned by exactly one producer task; no interior synchronization needed.
/// The mirrored `alarm_active` flag on the shared channel is updated by the
/// producer whenever an edge fires.
#[derive(Debug, Clone, Copy)]
pub struct ThresholdMonitor {
    low: f32,
    high: f32,
    active: bool,
    direction: Option<AlarmDirection>,
}

impl ThresholdMonitor {
    pub const fn new(low: f32, high: f32) -> Self {
        Self {
            low,
            high,
            active: false,
            direction: None,
        }
    }

    /// Whether the last evaluated reading was outside the window.
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Evaluate one reading, returning a transition if the alarm state
    /// changed.
    ///
    /// While a violation persists the monitor stays silent; switching from
    /// a high violation straight to a low one re-reports, since the bound
    /// (and the advisory action tied to it) changed.
    pub fn evaluate(&mut self, value: f32) -> Option<AlarmEdge> {
        let violation = if value > self.high {
            Some(AlarmDirection::High)
        } else if value < self.low {
            Some(AlarmDirection::Low)
        } else {
            None
        };

        match (self.active, violation) {
            (false, Some(direction)) => {
                self.active = true;
                self.direction = Some(direction);
                Some(AlarmEdge::Raised(direction))
            }
            (true, Some(direction)) => {
                if self.direction == Some(direction) {
                    None
                } else {
                    self.direction = Some(direction);
                    Some(AlarmEdge::Raised(direction))
                }
            }
            (true, None) => {
                self.active = false;
                self.direction = None;
                Some(AlarmEdge::Cleared)
            }
            (false, None) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stays_quiet_inside_window() {
        let mut monitor = ThresholdMonitor::new(20.0, 36.0);
        assert_eq!(monitor.evaluate(25.0), None);
        assert_eq!(monitor.evaluate(35.9), None);
        assert!(!monitor.is_active());
    }

    #[test]
    fn raises_once_then_clears_once() {
        let mut monitor = ThresholdMonitor::new(20.0, 36.0);

        // Crossing above fires exactly one raise.
        assert_eq!(
            monitor.evaluate(40.0),
            Some(AlarmEdge::Raised(AlarmDirection::High))
        );
        assert!(monitor.is_active());

        // Persisting violation stays silent.
        assert_eq!(monitor.evaluate(41.0), None);
        assert_eq!(monitor.evaluate(39.5), None);

        // Returning in range fires exactly one clear.
        assert_eq!(monitor.evaluate(30.0), Some(AlarmEdge::Cleared));
        assert!(!monitor.is_active());
        assert_eq!(monitor.evaluate(30.0), None);
    }

    #[test]
    fn low_violation_reports_low_direction() {
        let mut monitor = ThresholdMonitor::new(20.0, 36.0);
        assert_eq!(
            monitor.evaluate(10.0),
            Some(AlarmEdge::Raised(AlarmDirection::Low))
        );
    }

    #[test]
    fn direction_flip_re_reports() {
        let mut monitor = ThresholdMonitor::new(20.0, 36.0);
        assert_eq!(
            monitor.evaluate(50.0),
            Some(AlarmEdge::Raised(AlarmDirection::High))
        );
        // Straight from too-hot to too-cold: the advisory action changes,
        // so the raise is repeated with the new direction.
        assert_eq!(
            monitor.evaluate(5.0),
            Some(AlarmEdge::Raised(AlarmDirection::Low))
        );
        assert_eq!(monitor.evaluate(25.0), Some(AlarmEdge::Cleared));
    }

    #[test]
    fn boundary_values_are_in_range() {
        let mut monitor = ThresholdMonitor::new(20.0, 36.0);
        assert_eq!(monitor.evaluate(20.0), None);
        assert_eq!(monitor.evaluate(36.0), None);
    }
}
