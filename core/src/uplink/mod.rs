#![deny(unsafe_code)]
#![deny(warnings)]
//! Uplink payload encoder and decoder
//!
//! Every measurement cycle produces one compact binary message:
//!
//! ```text
//! byte 0      format tag (0x1E)
//! byte 1      flags, one bit per field present
//! byte 2..    fields in ascending flag-bit order
//!
//! bit 0  Vbat    2 bytes
//! bit 1  Vcc     2 bytes
//! bit 2  Boot    1 byte
//! bit 3  TH      4 bytes (temperature, humidity)
//! bit 4  CO2ppm  2 bytes
//! ```
//!
//! Fields whose flag is clear are omitted entirely, not zero-filled.
//! Diagnostic fields (Vbat, Vcc, Boot) can be sent on a slower cadence than
//! the sensor fields to save air time; see [`UplinkEncoder`].
//!
//! If a payload would not fit the buffer, whole fields are dropped, lowest
//! priority first (Boot, Vcc, Vbat, CO2ppm, TH). A field is never truncated.

pub mod codec;
mod decode;

pub use decode::{decode, Uplink};

use hal_abstractions::Reading;
use heapless::Vec;

use crate::error::EncodeError;

/// Message format tag, first byte of every measurement uplink
pub const MESSAGE_FORMAT: u8 = 0x1E;

/// Format tag plus flags byte
pub const HEADER_LEN: usize = 2;

/// Uplink buffer capacity in bytes
pub const TX_BUFFER_SIZE: usize = 36;

/// Fixed-capacity uplink buffer
pub type TxBuffer = Vec<u8, TX_BUFFER_SIZE>;

bitflags::bitflags! {
    /// Fields present in an uplink, in wire order
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Flags: u8 {
        /// Battery voltage
        const VBAT = 1 << 0;
        /// Supply voltage
        const VCC = 1 << 1;
        /// Boot counter
        const BOOT = 1 << 2;
        /// Temperature and relative humidity
        const TH = 1 << 3;
        /// CO2 concentration
        const CO2PPM = 1 << 4;
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Flags {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "Flags({=u8:#x})", self.bits())
    }
}

/// Order in which fields are given up when the buffer is too small
const DROP_ORDER: [Flags; 5] = [
    Flags::BOOT,
    Flags::VCC,
    Flags::VBAT,
    Flags::CO2PPM,
    Flags::TH,
];

impl Flags {
    /// Diagnostic fields, sent on the slower cadence
    pub const DIAGNOSTIC: Flags = Flags::VBAT.union(Flags::VCC).union(Flags::BOOT);

    /// Sensor fields, sent whenever the measurement is valid
    pub const PRIMARY: Flags = Flags::TH.union(Flags::CO2PPM);

    /// Total encoded size of a payload carrying these fields
    pub fn payload_len(self) -> usize {
        let mut len = HEADER_LEN;
        if self.contains(Flags::VBAT) {
            len += 2;
        }
        if self.contains(Flags::VCC) {
            len += 2;
        }
        if self.contains(Flags::BOOT) {
            len += 1;
        }
        if self.contains(Flags::TH) {
            len += 4;
        }
        if self.contains(Flags::CO2PPM) {
            len += 2;
        }
        len
    }
}

/// One cycle's measurement
///
/// Overwritten every cycle. The sensor fields are only meaningful while the
/// loop reports the measurement as valid.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Measurement {
    /// Temperature in degrees Celsius
    pub temperature_c: f32,
    /// Relative humidity in percent
    pub humidity_pct: f32,
    /// CO2 concentration in ppm
    pub co2_ppm: f32,
    /// Battery voltage, if measured
    pub vbat: Option<f32>,
    /// Supply voltage, if measured
    pub vcc: Option<f32>,
    /// Boot counter, if the board keeps one
    pub boot_count: Option<u32>,
}

impl Measurement {
    /// Copy the sensor fields from a reading
    pub fn set_reading(&mut self, reading: &Reading) {
        self.temperature_c = reading.temperature_c;
        self.humidity_pct = reading.humidity_pct;
        self.co2_ppm = reading.co2_ppm;
    }

    /// Fields this measurement can supply
    ///
    /// Sensor fields are always reported as available; whether they are
    /// valid is the caller's decision.
    pub fn available(&self) -> Flags {
        let mut flags = Flags::PRIMARY;
        flags.set(Flags::VBAT, self.vbat.is_some());
        flags.set(Flags::VCC, self.vcc.is_some());
        flags.set(Flags::BOOT, self.boot_count.is_some());
        flags
    }
}

/// Builds measurement uplinks
///
/// Tracks the diagnostic cadence: with `diag_every = N`, Vbat, Vcc and Boot
/// ride along on the first uplink and every Nth one after it. `N = 0` never
/// sends them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UplinkEncoder {
    diag_every: u16,
    cycle: u16,
}

impl UplinkEncoder {
    /// Create an encoder with the given diagnostic cadence
    pub const fn new(diag_every: u16) -> Self {
        Self {
            diag_every,
            cycle: 0,
        }
    }

    /// Restart the diagnostic cadence; the next fill carries diagnostics
    pub fn reset(&mut self) {
        self.cycle = 0;
    }

    /// Clear `buf` and fill it with this cycle's payload
    ///
    /// Returns the flags written. On [`EncodeError::Overflow`] the buffer
    /// still holds a valid, reduced payload that can be sent.
    pub fn fill<const N: usize>(
        &mut self,
        buf: &mut Vec<u8, N>,
        measurement: &Measurement,
        measurement_valid: bool,
    ) -> Result<Flags, EncodeError> {
        let mut wanted = Flags::empty();
        if self.take_diagnostic_slot() {
            wanted |= Flags::DIAGNOSTIC;
        }
        if measurement_valid {
            wanted |= Flags::PRIMARY;
        }
        encode(buf, measurement, wanted)
    }

    fn take_diagnostic_slot(&mut self) -> bool {
        if self.diag_every == 0 {
            return false;
        }
        let due = self.cycle == 0;
        self.cycle = (self.cycle + 1) % self.diag_every;
        due
    }
}

/// Clear `buf` and encode the `wanted` fields of `measurement`
///
/// Diagnostic fields the measurement does not have are left out silently.
/// Fields that do not fit are dropped in priority order and reported through
/// [`EncodeError::Overflow`].
pub fn encode<const N: usize>(
    buf: &mut Vec<u8, N>,
    measurement: &Measurement,
    wanted: Flags,
) -> Result<Flags, EncodeError> {
    buf.clear();
    if N < HEADER_LEN {
        return Err(EncodeError::NoRoom);
    }

    let mut sent = wanted & measurement.available();
    let mut dropped = Flags::empty();
    for flag in DROP_ORDER {
        if sent.payload_len() <= N {
            break;
        }
        if sent.contains(flag) {
            sent.remove(flag);
            dropped.insert(flag);
        }
    }

    put(buf, &[MESSAGE_FORMAT, sent.bits()])?;

    if let (true, Some(vbat)) = (sent.contains(Flags::VBAT), measurement.vbat) {
        put(buf, &codec::encode_volts(vbat))?;
    }
    if let (true, Some(vcc)) = (sent.contains(Flags::VCC), measurement.vcc) {
        put(buf, &codec::encode_volts(vcc))?;
    }
    if let (true, Some(boot)) = (sent.contains(Flags::BOOT), measurement.boot_count) {
        put(buf, &[(boot & 0xFF) as u8])?;
    }
    if sent.contains(Flags::TH) {
        put(buf, &codec::encode_temperature(measurement.temperature_c))?;
        put(buf, &codec::encode_humidity(measurement.humidity_pct))?;
    }
    if sent.contains(Flags::CO2PPM) {
        put(buf, &codec::encode_co2(measurement.co2_ppm))?;
    }

    if dropped.is_empty() {
        Ok(sent)
    } else {
        Err(EncodeError::Overflow { sent, dropped })
    }
}

fn put<const N: usize>(buf: &mut Vec<u8, N>, bytes: &[u8]) -> Result<(), EncodeError> {
    buf.extend_from_slice(bytes)
        .map_err(|_| EncodeError::NoRoom)
}
