#![deny(unsafe_code)]
#![deny(warnings)]
//! Uplink cadence with an optional fast-start burst

/// Interval between measurement cycles
///
/// A fast burst uses `current_ms` for a limited number of cycles, then falls
/// back to `permanent_ms`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TxCycle {
    current_ms: u32,
    permanent_ms: u32,
    fast_remaining: u32,
}

impl TxCycle {
    /// Permanent cycle `permanent_ms`, starting with `fast_count` cycles of
    /// `fast_ms`
    pub const fn new(permanent_ms: u32, fast_ms: u32, fast_count: u32) -> Self {
        let mut cycle = Self {
            current_ms: permanent_ms,
            permanent_ms,
            fast_remaining: 0,
        };
        if fast_count > 0 {
            cycle.current_ms = fast_ms;
            cycle.fast_remaining = fast_count;
        }
        cycle
    }

    /// Use `ms` for the next `count` cycles; `count == 0` makes it permanent
    pub fn set(&mut self, ms: u32, count: u32) {
        self.current_ms = ms;
        if count == 0 {
            self.permanent_ms = ms;
        }
        self.fast_remaining = count;
    }

    /// Restart the fast burst, keeping the permanent cycle
    pub fn restart(&mut self, fast_ms: u32, fast_count: u32) {
        *self = Self::new(self.permanent_ms, fast_ms, fast_count);
    }

    /// Account for one completed uplink
    ///
    /// Returns `true` when the burst ends and the permanent cycle resumes.
    pub fn advance(&mut self) -> bool {
        match self.fast_remaining {
            0 => false,
            1 => {
                self.fast_remaining = 0;
                self.current_ms = self.permanent_ms;
                true
            }
            _ => {
                self.fast_remaining -= 1;
                false
            }
        }
    }

    /// Interval for the cycle being scheduled
    pub fn current_ms(&self) -> u32 {
        self.current_ms
    }

    pub fn permanent_ms(&self) -> u32 {
        self.permanent_ms
    }

    pub fn fast_remaining(&self) -> u32 {
        self.fast_remaining
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fast_burst_falls_back_to_permanent() {
        let mut cycle = TxCycle::new(360_000, 30_000, 3);
        assert_eq!(cycle.current_ms(), 30_000);

        assert!(!cycle.advance());
        assert!(!cycle.advance());
        assert_eq!(cycle.current_ms(), 30_000);

        assert!(cycle.advance());
        assert_eq!(cycle.current_ms(), 360_000);
        assert!(!cycle.advance());
        assert_eq!(cycle.current_ms(), 360_000);
    }

    #[test]
    fn test_no_burst() {
        let mut cycle = TxCycle::new(360_000, 30_000, 0);
        assert_eq!(cycle.current_ms(), 360_000);
        assert!(!cycle.advance());
    }

    #[test]
    fn test_set_permanent() {
        let mut cycle = TxCycle::new(360_000, 30_000, 5);
        cycle.set(120_000, 0);
        assert_eq!(cycle.current_ms(), 120_000);
        assert_eq!(cycle.permanent_ms(), 120_000);
        assert_eq!(cycle.fast_remaining(), 0);
    }

    #[test]
    fn test_temporary_cycle_keeps_permanent() {
        let mut cycle = TxCycle::new(360_000, 30_000, 0);
        cycle.set(10_000, 2);
        assert_eq!(cycle.current_ms(), 10_000);
        cycle.advance();
        assert!(cycle.advance());
        assert_eq!(cycle.current_ms(), 360_000);
    }

    #[test]
    fn test_restart_keeps_permanent_setting() {
        let mut cycle = TxCycle::new(360_000, 30_000, 1);
        cycle.set(600_000, 0);
        cycle.restart(30_000, 2);
        assert_eq!(cycle.current_ms(), 30_000);
        assert_eq!(cycle.fast_remaining(), 2);
        assert_eq!(cycle.permanent_ms(), 600_000);
    }
}
