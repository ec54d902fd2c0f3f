//! Hardware abstraction traits for the sensor node
//!
//! This crate defines the narrow interfaces the measurement loop uses to
//! talk to the outside world. Board support crates implement these traits;
//! the core crate and its tests only ever see the traits.
//!
//! - [`clock`]: free-running millisecond tick counter
//! - [`sensor`]: CO2 / temperature / humidity sensor
//! - [`radio`]: low-power wide-area uplink
//! - [`power`]: deep-sleep primitives and supply diagnostics

#![no_std]
#![deny(unsafe_code)]
#![deny(warnings)]

pub mod clock;
pub mod power;
pub mod radio;
pub mod sensor;

pub use clock::Clock;
pub use power::PowerControl;
pub use radio::{RadioError, UplinkRadio};
pub use sensor::{Co2Sensor, Reading, SensorError};
