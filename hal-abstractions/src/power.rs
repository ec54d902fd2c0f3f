#![deny(unsafe_code)]
#![deny(warnings)]
//! Power control and supply diagnostics

/// Trait for the board's power management
///
/// The deep-sleep primitives are always called as a bracket:
/// `deep_sleep_prepare()`, `deep_sleep(ms)`, `deep_sleep_recovery()`.
/// `deep_sleep` is the only call in the measurement loop that is allowed to
/// suspend execution. On return the clock must reflect the time slept.
pub trait PowerControl {
    /// Save peripheral state and gate clocks before deep sleep
    fn deep_sleep_prepare(&mut self);

    /// Enter the lowest-power mode for `duration_ms`
    fn deep_sleep(&mut self, duration_ms: u32);

    /// Restore clocks and peripheral state after deep sleep
    fn deep_sleep_recovery(&mut self);

    /// Battery voltage in volts, if the board can measure it
    fn battery_voltage(&mut self) -> Option<f32> {
        None
    }

    /// Regulated supply voltage in volts, if the board can measure it
    fn supply_voltage(&mut self) -> Option<f32> {
        None
    }

    /// Number of boots recorded by the board, if it keeps one
    fn boot_count(&self) -> Option<u32> {
        None
    }

    /// True while a host console is attached (USB CDC DTR asserted)
    ///
    /// Deep sleep would drop the console, so an attached console
    /// normally vetoes it.
    fn console_attached(&self) -> bool {
        false
    }
}
