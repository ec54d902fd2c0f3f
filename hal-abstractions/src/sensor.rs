#![deny(unsafe_code)]
#![deny(warnings)]
//! CO2 / temperature / humidity sensor interface
//!
//! Modelled on an SCD30-class NDIR sensor: it can be probed once at startup,
//! put to sleep between measurements, polled for data-ready, and read.
//! I2C transaction details and calibration stay in the driver.

/// One sensor sample in engineering units
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Reading {
    /// Temperature in degrees Celsius
    pub temperature_c: f32,
    /// Relative humidity in percent (0-100)
    pub humidity_pct: f32,
    /// CO2 concentration in ppm
    pub co2_ppm: f32,
}

/// Sensor operation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorError {
    /// Bus transaction failed (NAK, arbitration loss, timeout)
    Bus,
    /// No data available yet
    NotReady,
    /// Data failed its checksum or is out of range
    InvalidData,
}

impl core::fmt::Display for SensorError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Bus => write!(f, "Sensor bus error"),
            Self::NotReady => write!(f, "Sensor data not ready"),
            Self::InvalidData => write!(f, "Sensor data invalid"),
        }
    }
}

impl core::error::Error for SensorError {}

/// Trait for the environmental sensor
///
/// All methods must return promptly; the measurement loop calls them from
/// its non-blocking dispatch.
pub trait Co2Sensor {
    /// Detect the sensor. Called once, when the loop is first started.
    fn probe(&mut self) -> bool;

    /// Bring the sensor out of its low-power mode
    fn wake(&mut self) -> Result<(), SensorError>;

    /// Put the sensor into its low-power mode
    fn sleep(&mut self) -> Result<(), SensorError>;

    /// True once a fresh sample can be read
    fn is_ready(&mut self) -> bool;

    /// Take a reading
    fn read(&mut self) -> Result<Reading, SensorError>;
}
