//! Status Indication
//!
//! The target board drives two LEDs: green for nominal operation, orange
//! while any alarm condition is active. The trait keeps that behavior
//! available without tying the core to a GPIO layer; targets without an
//! indicator use [`NullIndicator`].

/// Board-level alert indicator, shared by all producer tasks.
pub trait StatusIndicator: Send + Sync {
    /// `true` while an alarm condition is active, `false` when nominal.
    fn set_alert(&self, on: bool);
}

/// No-op indicator for headless targets and tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullIndicator;

impl StatusIndicator for NullIndicator {
    fn set_alert(&self, _on: bool) {}
}

/// Indicator that remembers its last state, for tests.
#[derive(Debug, Default)]
pub struct LatchedIndicator {
    alert: core::sync::atomic::AtomicBool,
}

impl LatchedIndicator {
    /// Last state written by `set_alert`.
    pub fn is_alert(&self) -> bool {
        self.alert.load(core::sync::atomic::Ordering::Acquire)
    }
}

impl StatusIndicator for LatchedIndicator {
    fn set_alert(&self, on: bool) {
        self.alert.store(on, core::sync::atomic::Ordering::Release);
    }
}
