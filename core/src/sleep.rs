#![deny(unsafe_code)]
#![deny(warnings)]
//! Deep-sleep policy
//!
//! Decides whether the node may drop into its lowest-power mode and for how
//! long, and brackets the hardware save/restore around the sleep itself.
//!
//! ## Rules
//! - Never while a transmission is pending.
//! - Only if the operating mode allows it (see [`SleepConfig`]).
//! - Parked (inactive) loop: sleep for the configured parked duration.
//! - Active loop between cycles: sleep for the time left before the next
//!   measurement minus the entry/exit overhead, so the node never wakes
//!   after its next deadline. No deadline, or one inside the overhead,
//!   means no deep sleep.
//!
//! Light sleep needs no help from this module: the board's idle loop
//! (`wfi`) covers it between polls.

use hal_abstractions::PowerControl;

use crate::config::SleepConfig;

/// Snapshot of the loop state the policy decides on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SleepContext {
    /// Loop is producing uplinks (false = parked)
    pub active: bool,
    /// A transmission has been submitted and not completed
    pub tx_pending: bool,
    /// Time to the next scheduled wake, if one is armed
    pub remaining_ms: Option<u32>,
    /// A host console is attached
    pub console_attached: bool,
}

/// Deep-sleep policy and the one-time sleep notice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SleepPolicy {
    config: SleepConfig,
    printed_sleeping: bool,
}

impl SleepPolicy {
    /// Create a policy from its configuration
    pub const fn new(config: SleepConfig) -> Self {
        Self {
            config,
            printed_sleeping: false,
        }
    }

    /// Policy configuration
    pub fn config(&self) -> &SleepConfig {
        &self.config
    }

    /// Can the node deep-sleep now?
    pub fn check_deep_sleep(&self, ctx: &SleepContext) -> bool {
        self.deep_sleep_duration(ctx).is_some()
    }

    /// How long the node may deep-sleep now, `None` if it may not
    pub fn deep_sleep_duration(&self, ctx: &SleepContext) -> Option<u32> {
        if ctx.tx_pending || !self.mode_allows(ctx.console_attached) {
            return None;
        }
        if !ctx.active {
            return Some(self.config.parked_sleep_ms);
        }

        let remaining = ctx.remaining_ms?;
        if remaining <= self.config.overhead_ms {
            return None;
        }
        Some(remaining - self.config.overhead_ms)
    }

    fn mode_allows(&self, console_attached: bool) -> bool {
        if self.config.deep_sleep_test {
            true
        } else if self.config.disable_deep_sleep || console_attached {
            false
        } else {
            self.config.unattended
        }
    }

    /// Re-arm the sleep notice; called on every entry to sleeping
    pub fn rearm_alert(&mut self) {
        self.printed_sleeping = false;
    }

    /// Log how the node is about to sleep, once per sleep entry
    ///
    /// Returns `true` if the notice was emitted by this call.
    pub fn do_sleep_alert(&mut self, deep_sleep: bool) -> bool {
        if self.printed_sleeping {
            return false;
        }
        self.printed_sleeping = true;

        if deep_sleep {
            if self.config.deep_sleep_test {
                info!("Using deep sleep (test mode)");
            } else {
                info!("Using deep sleep");
            }
        } else {
            info!("Using light sleep");
        }
        true
    }

    /// Deep-sleep for `duration_ms`, saving and restoring peripheral state
    ///
    /// A zero duration returns without touching the hardware.
    pub fn do_deep_sleep<P: PowerControl>(&self, power: &mut P, duration_ms: u32) {
        if duration_ms == 0 {
            return;
        }

        debug!("Deep sleep for {} ms", duration_ms);
        power.deep_sleep_prepare();
        power.deep_sleep(duration_ms);
        power.deep_sleep_recovery();
    }
}
