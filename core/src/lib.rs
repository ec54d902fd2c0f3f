//! Platform-agnostic core logic for the CO2 sensor node
//!
//! This crate contains the measurement loop that decides when to wake the
//! sensor, take a reading, transmit it, and let the node sleep. It has NO
//! hardware dependencies: the sensor, radio, clock and power management are
//! reached only through the traits in `hal-abstractions`.
//!
//! - [`timer`]: one-shot, wrap-safe millisecond timer
//! - [`uplink`]: uplink payload encoder and decoder
//! - [`sleep`]: deep-sleep policy
//! - [`measurement`]: the measurement loop state machine
//! - [`poll`]: per-tick polling adapter
//! - [`config`]: configuration structs with `Default` implementations
//! - [`error`]: error enums
//!
//! ## Logging
//!
//! With the `defmt` feature, log output goes through `defmt`. Without it
//! (host builds and tests) the same call sites use the `log` facade.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]
#![deny(warnings)]

#[macro_use]
mod fmt;

pub mod config;
pub mod error;
pub mod measurement;
pub mod poll;
pub mod sleep;
pub mod timer;
pub mod uplink;

#[cfg(test)]
mod testing;

// Re-export commonly used types
pub use config::{LoopConfig, SleepConfig};
pub use error::{DecodeError, EncodeError, PollerError};
pub use measurement::{LoopFlags, MeasurementLoop, RequestFlags, State};
pub use poll::{Pollable, Poller};
pub use sleep::{SleepContext, SleepPolicy};
pub use timer::Timer;
pub use uplink::{Flags, Measurement, TxBuffer, UplinkEncoder};
