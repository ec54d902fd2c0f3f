#![deny(unsafe_code)]
#![deny(warnings)]
//! Measurement loop configuration structures

/// Uplink port used for measurement messages
pub const UPLINK_PORT: u8 = 1;

/// Measurement loop configuration
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LoopConfig {
    /// Radio port for measurement uplinks
    pub uplink_port: u8,
    /// Request confirmed uplinks
    pub confirmed_uplink: bool,
    /// Steady-state interval between measurement cycles
    pub tx_cycle_ms: u32,
    /// Interval used for the first `fast_cycle_count` cycles after start
    pub fast_tx_cycle_ms: u32,
    /// Number of fast cycles before falling back to `tx_cycle_ms`
    pub fast_cycle_count: u32,
    /// Delay after waking the sensor before it is read
    pub settle_ms: u32,
    /// Include diagnostic fields (Vbat, Vcc, Boot) every N uplinks; 0 disables them
    pub diag_every: u16,
    /// Deep-sleep policy settings
    pub sleep: SleepConfig,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            uplink_port: UPLINK_PORT,
            confirmed_uplink: false,
            tx_cycle_ms: 6 * 60 * 1000,
            fast_tx_cycle_ms: 30 * 1000,
            fast_cycle_count: 10,
            settle_ms: 2000,
            diag_every: 1,
            sleep: SleepConfig::default(),
        }
    }
}

/// Deep-sleep policy configuration
///
/// The three mode flags mirror the node's operating flags:
/// - `deep_sleep_test` forces deep sleep even with a console attached
/// - `disable_deep_sleep` forbids it
/// - `unattended` allows it when no console is attached
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SleepConfig {
    /// Node runs without an operator; deep sleep allowed
    pub unattended: bool,
    /// Deep sleep even when a console is attached (bench testing)
    pub deep_sleep_test: bool,
    /// Never deep sleep
    pub disable_deep_sleep: bool,
    /// Combined cost of entering and leaving deep sleep
    pub overhead_ms: u32,
    /// Deep-sleep duration while the loop is parked
    pub parked_sleep_ms: u32,
}

impl Default for SleepConfig {
    fn default() -> Self {
        Self {
            unattended: true,
            deep_sleep_test: false,
            disable_deep_sleep: false,
            overhead_ms: 1500,
            parked_sleep_ms: 60 * 1000,
        }
    }
}
