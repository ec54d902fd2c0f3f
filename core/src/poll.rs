#![deny(unsafe_code)]
#![deny(warnings)]
//! Polling adapter
//!
//! The board's driver loop owns a [`Poller`] and ticks it from its idle
//! loop. Objects register once and are polled in registration order on every
//! tick until they report themselves deregistered.
//!
//! # Example
//! ```ignore
//! let mut poller: Poller<'_, 4> = Poller::new();
//! poller.register(&mut measurement_loop)?;
//! loop {
//!     poller.poll_all();
//!     cortex_m::asm::wfi();
//! }
//! ```

use hal_abstractions::{Clock, Co2Sensor, PowerControl, UplinkRadio};
use heapless::Vec;

use crate::error::PollerError;
use crate::measurement::MeasurementLoop;

/// Anything the driver loop advances once per tick
pub trait Pollable {
    /// Do one tick's worth of non-blocking work
    fn poll(&mut self);

    /// False once the object wants no more polls
    fn is_registered(&self) -> bool {
        true
    }
}

impl<C, S, R, P> Pollable for MeasurementLoop<'_, C, S, R, P>
where
    C: Clock,
    S: Co2Sensor,
    R: UplinkRadio,
    P: PowerControl,
{
    fn poll(&mut self) {
        MeasurementLoop::poll(self);
    }

    fn is_registered(&self) -> bool {
        self.flags().registered
    }
}

/// Fixed-capacity list of pollable objects
pub struct Poller<'a, const N: usize> {
    objects: Vec<&'a mut dyn Pollable, N>,
}

impl<'a, const N: usize> Poller<'a, N> {
    /// Empty poll list with room for `N` objects
    pub const fn new() -> Self {
        Self {
            objects: Vec::new(),
        }
    }

    /// Add an object to the poll list
    pub fn register(&mut self, object: &'a mut dyn Pollable) -> Result<(), PollerError> {
        self.objects.push(object).map_err(|_| PollerError::Full)
    }

    /// Poll every registered object once
    ///
    /// Returns the number of objects polled.
    pub fn poll_all(&mut self) -> usize {
        let mut polled = 0;
        for object in self.objects.iter_mut() {
            if object.is_registered() {
                object.poll();
                polled += 1;
            }
        }
        polled
    }

    /// Number of objects in the list, registered or not
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

impl<const N: usize> Default for Poller<'_, N> {
    fn default() -> Self {
        Self::new()
    }
}
