#![deny(unsafe_code)]
#![deny(warnings)]
//! One-shot millisecond timer
//!
//! The measurement loop keeps exactly one delay in flight: the sensor
//! settle time while waking, and the cadence wait while sleeping. The timer
//! does not read a clock itself; the polling adapter feeds it the current
//! tick through [`Timer::update`].
//!
//! Expiry is a single notification. [`Timer::timed_out`] returns `true` once
//! per armed window and then resets; a caller that ignores it loses it.
//! Tick comparisons use `wrapping_sub`, so the timer stays correct when the
//! 32-bit millisecond counter rolls over (every ~49.7 days).

/// One-shot timer state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Timer {
    start: u32,
    delay: u32,
    active: bool,
    event: bool,
}

impl Timer {
    /// Create a disarmed timer
    pub const fn new() -> Self {
        Self {
            start: 0,
            delay: 0,
            active: false,
            event: false,
        }
    }

    /// Arm a window of `delay_ms` starting at `now`
    ///
    /// Re-arming discards any pending, unread expiry.
    pub fn set(&mut self, now: u32, delay_ms: u32) {
        self.start = now;
        self.delay = delay_ms;
        self.active = true;
        self.event = false;
    }

    /// Disarm and discard any pending expiry
    pub fn clear(&mut self) {
        self.active = false;
        self.event = false;
    }

    /// Latch the expiry if the window has elapsed at `now`
    ///
    /// Returns `true` on the tick that latches the event.
    pub fn update(&mut self, now: u32) -> bool {
        if self.active && now.wrapping_sub(self.start) >= self.delay {
            self.active = false;
            self.event = true;
            return true;
        }
        false
    }

    /// Consume the expiry notification
    pub fn timed_out(&mut self) -> bool {
        let result = self.event;
        self.event = false;
        result
    }

    /// True while a window is armed and has not yet expired
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// True if an expiry is latched and unread
    pub fn is_pending(&self) -> bool {
        self.event
    }

    /// Milliseconds left in the armed window, `None` if disarmed
    ///
    /// A latched but unread expiry reports `Some(0)`.
    pub fn remaining(&self, now: u32) -> Option<u32> {
        if self.event {
            return Some(0);
        }
        if !self.active {
            return None;
        }
        Some(self.delay.saturating_sub(now.wrapping_sub(self.start)))
    }
}
