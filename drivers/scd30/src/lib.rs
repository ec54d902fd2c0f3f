//! Blocking driver for the Sensirion SCD30 NDIR CO2 sensor
//!
//! Talks to the sensor over any `embedded-hal` 1.0 I2C bus and implements
//! the sensor node's [`Co2Sensor`] trait on top of it:
//!
//! | `Co2Sensor` | SCD30 command |
//! |---|---|
//! | `probe` | read firmware version |
//! | `wake` | set interval, start continuous measurement |
//! | `sleep` | stop continuous measurement |
//! | `is_ready` | get data-ready status |
//! | `read` | read measurement |
//!
//! Every 16-bit word on the wire is followed by a CRC-8 (polynomial 0x31,
//! init 0xFF). Reads are a command write, a 3 ms pause, then the read.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]
#![deny(warnings)]

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use hal_abstractions::{Co2Sensor, Reading, SensorError};

/// Fixed 7-bit bus address
pub const ADDRESS: u8 = 0x61;

const CMD_START_CONTINUOUS: u16 = 0x0010;
const CMD_STOP_CONTINUOUS: u16 = 0x0104;
const CMD_SET_INTERVAL: u16 = 0x4600;
const CMD_DATA_READY: u16 = 0x0202;
const CMD_READ_MEASUREMENT: u16 = 0x0300;
const CMD_FIRMWARE_VERSION: u16 = 0xD100;
const CMD_SOFT_RESET: u16 = 0xD304;

/// Pause between a read command and the read itself
const READ_DELAY_MS: u32 = 3;

/// Allowed measurement interval, seconds
pub const INTERVAL_RANGE_S: core::ops::RangeInclusive<u16> = 2..=1800;

/// Allowed ambient pressure compensation, mbar (0 disables it)
pub const PRESSURE_RANGE_MBAR: core::ops::RangeInclusive<u16> = 700..=1400;

/// Driver errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// Bus transaction failed
    I2c(E),
    /// A received word failed its checksum
    Crc,
    /// Argument outside the range the sensor accepts
    InvalidArgument,
}

impl<E: core::fmt::Debug> core::fmt::Display for Error<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::I2c(e) => write!(f, "I2C error: {:?}", e),
            Self::Crc => write!(f, "CRC mismatch"),
            Self::InvalidArgument => write!(f, "Argument out of range"),
        }
    }
}

impl<E: core::fmt::Debug> core::error::Error for Error<E> {}

impl<E> From<Error<E>> for SensorError {
    fn from(error: Error<E>) -> Self {
        match error {
            Error::I2c(_) => SensorError::Bus,
            Error::Crc | Error::InvalidArgument => SensorError::InvalidData,
        }
    }
}

/// Sensirion CRC-8 over one word
pub fn crc8(data: &[u8]) -> u8 {
    let mut crc: u8 = 0xFF;
    for byte in data {
        crc ^= byte;
        for _ in 0..8 {
            crc = if crc & 0x80 != 0 {
                (crc << 1) ^ 0x31
            } else {
                crc << 1
            };
        }
    }
    crc
}

/// SCD30 on an I2C bus
pub struct Scd30<I2C, D> {
    i2c: I2C,
    delay: D,
    interval_s: u16,
    pressure_mbar: u16,
}

impl<I2C, D> Scd30<I2C, D>
where
    I2C: I2c,
    D: DelayNs,
{
    /// Driver with a 2 s measurement interval and no pressure compensation
    pub fn new(i2c: I2C, delay: D) -> Self {
        Self {
            i2c,
            delay,
            interval_s: *INTERVAL_RANGE_S.start(),
            pressure_mbar: 0,
        }
    }

    /// Measurement interval used by [`Co2Sensor::wake`]
    pub fn with_interval(mut self, seconds: u16) -> Result<Self, Error<I2C::Error>> {
        if !INTERVAL_RANGE_S.contains(&seconds) {
            return Err(Error::InvalidArgument);
        }
        self.interval_s = seconds;
        Ok(self)
    }

    /// Ambient pressure used by [`Co2Sensor::wake`]; 0 disables compensation
    pub fn with_pressure(mut self, mbar: u16) -> Result<Self, Error<I2C::Error>> {
        if mbar != 0 && !PRESSURE_RANGE_MBAR.contains(&mbar) {
            return Err(Error::InvalidArgument);
        }
        self.pressure_mbar = mbar;
        Ok(self)
    }

    /// Give back the bus and delay
    pub fn release(self) -> (I2C, D) {
        (self.i2c, self.delay)
    }

    /// Firmware version as (major, minor)
    pub fn firmware_version(&mut self) -> Result<(u8, u8), Error<I2C::Error>> {
        let [major, minor] = self.read_word(CMD_FIRMWARE_VERSION)?.to_be_bytes();
        Ok((major, minor))
    }

    /// Start continuous measurement with optional pressure compensation
    pub fn start_continuous(&mut self, pressure_mbar: u16) -> Result<(), Error<I2C::Error>> {
        self.write_with_arg(CMD_START_CONTINUOUS, pressure_mbar)
    }

    pub fn stop_continuous(&mut self) -> Result<(), Error<I2C::Error>> {
        self.write_command(CMD_STOP_CONTINUOUS)
    }

    /// Set the continuous measurement interval, 2..=1800 s
    pub fn set_measurement_interval(&mut self, seconds: u16) -> Result<(), Error<I2C::Error>> {
        if !INTERVAL_RANGE_S.contains(&seconds) {
            return Err(Error::InvalidArgument);
        }
        self.write_with_arg(CMD_SET_INTERVAL, seconds)
    }

    pub fn soft_reset(&mut self) -> Result<(), Error<I2C::Error>> {
        self.write_command(CMD_SOFT_RESET)
    }

    /// A new measurement can be read
    pub fn data_ready(&mut self) -> Result<bool, Error<I2C::Error>> {
        Ok(self.read_word(CMD_DATA_READY)? == 1)
    }

    /// Read the latest measurement
    pub fn read_measurement(&mut self) -> Result<Reading, Error<I2C::Error>> {
        let mut buf = [0u8; 18];
        self.read(CMD_READ_MEASUREMENT, &mut buf)?;

        let mut values = [0f32; 3];
        for (value, chunk) in values.iter_mut().zip(buf.chunks_exact(6)) {
            let high = checked_word(&chunk[..3])?;
            let low = checked_word(&chunk[3..])?;
            *value = f32::from_bits((u32::from(high) << 16) | u32::from(low));
        }

        let [co2_ppm, temperature_c, humidity_pct] = values;
        Ok(Reading {
            temperature_c,
            humidity_pct,
            co2_ppm,
        })
    }

    fn write_command(&mut self, command: u16) -> Result<(), Error<I2C::Error>> {
        self.i2c
            .write(ADDRESS, &command.to_be_bytes())
            .map_err(Error::I2c)
    }

    fn write_with_arg(&mut self, command: u16, arg: u16) -> Result<(), Error<I2C::Error>> {
        let [c0, c1] = command.to_be_bytes();
        let [a0, a1] = arg.to_be_bytes();
        let frame = [c0, c1, a0, a1, crc8(&[a0, a1])];
        self.i2c.write(ADDRESS, &frame).map_err(Error::I2c)
    }

    fn read(&mut self, command: u16, buf: &mut [u8]) -> Result<(), Error<I2C::Error>> {
        self.write_command(command)?;
        self.delay.delay_ms(READ_DELAY_MS);
        self.i2c.read(ADDRESS, buf).map_err(Error::I2c)
    }

    fn read_word(&mut self, command: u16) -> Result<u16, Error<I2C::Error>> {
        let mut buf = [0u8; 3];
        self.read(command, &mut buf)?;
        checked_word(&buf)
    }
}

fn checked_word<E>(bytes: &[u8]) -> Result<u16, Error<E>> {
    let (word, crc) = (&bytes[..2], bytes[2]);
    if crc8(word) != crc {
        return Err(Error::Crc);
    }
    Ok(u16::from_be_bytes([word[0], word[1]]))
}

impl<I2C, D> Co2Sensor for Scd30<I2C, D>
where
    I2C: I2c,
    D: DelayNs,
{
    fn probe(&mut self) -> bool {
        self.firmware_version().is_ok()
    }

    fn wake(&mut self) -> Result<(), SensorError> {
        self.set_measurement_interval(self.interval_s)?;
        self.start_continuous(self.pressure_mbar)?;
        Ok(())
    }

    fn sleep(&mut self) -> Result<(), SensorError> {
        Ok(self.stop_continuous()?)
    }

    fn is_ready(&mut self) -> bool {
        self.data_ready().unwrap_or(false)
    }

    fn read(&mut self) -> Result<Reading, SensorError> {
        Ok(self.read_measurement()?)
    }
}
