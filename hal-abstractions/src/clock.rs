#![deny(unsafe_code)]
#![deny(warnings)]
//! Millisecond tick source

/// Free-running millisecond counter
///
/// The counter is allowed to wrap. Consumers must compare ticks with
/// `wrapping_sub`, never with `<` / `>`.
pub trait Clock {
    /// Current tick count in milliseconds
    fn now_ms(&self) -> u32;
}

impl<T: Clock + ?Sized> Clock for &T {
    fn now_ms(&self) -> u32 {
        (**self).now_ms()
    }
}
