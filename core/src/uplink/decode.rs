#![deny(unsafe_code)]
#![deny(warnings)]
//! Uplink payload parser
//!
//! Inverse of [`super::encode`]. Fields are kept in their raw wire units so
//! a decoded payload can be compared bit-exactly; the accessor methods
//! convert to engineering units.

use super::{codec, Flags, MESSAGE_FORMAT};
use crate::error::DecodeError;

/// A parsed measurement uplink, raw field values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Uplink {
    /// Flags byte
    pub flags: Flags,
    /// Battery voltage, 1/4096 V
    pub vbat: Option<i16>,
    /// Supply voltage, 1/4096 V
    pub vcc: Option<i16>,
    /// Low byte of the boot counter
    pub boot: Option<u8>,
    /// Temperature, 0.005 degC
    pub temperature: Option<i16>,
    /// Relative humidity, 0xFFFF = 100 %
    pub humidity: Option<u16>,
    /// CO2 as uflt16 of ppm / 40000
    pub co2: Option<u16>,
}

impl Uplink {
    /// Temperature in degrees Celsius
    pub fn temperature_c(&self) -> Option<f32> {
        self.temperature.map(codec::decode_temperature)
    }

    /// Relative humidity in percent
    pub fn humidity_pct(&self) -> Option<f32> {
        self.humidity.map(codec::decode_humidity)
    }

    /// CO2 concentration in ppm
    pub fn co2_ppm(&self) -> Option<f32> {
        self.co2.map(codec::decode_co2)
    }

    /// Battery voltage in volts
    pub fn vbat_volts(&self) -> Option<f32> {
        self.vbat.map(codec::decode_volts)
    }

    /// Supply voltage in volts
    pub fn vcc_volts(&self) -> Option<f32> {
        self.vcc.map(codec::decode_volts)
    }
}

/// Parse a measurement uplink
///
/// The payload must be exactly as long as its flags say: missing bytes give
/// [`DecodeError::Truncated`], extra bytes [`DecodeError::TrailingBytes`].
pub fn decode(payload: &[u8]) -> Result<Uplink, DecodeError> {
    let mut reader = Reader { bytes: payload };

    let [format] = reader.take::<1>()?;
    if format != MESSAGE_FORMAT {
        return Err(DecodeError::UnknownFormat(format));
    }
    let [bits] = reader.take::<1>()?;
    let flags = Flags::from_bits(bits).ok_or(DecodeError::UnknownFlags(bits))?;

    let mut uplink = Uplink {
        flags,
        vbat: None,
        vcc: None,
        boot: None,
        temperature: None,
        humidity: None,
        co2: None,
    };

    if flags.contains(Flags::VBAT) {
        uplink.vbat = Some(i16::from_be_bytes(reader.take()?));
    }
    if flags.contains(Flags::VCC) {
        uplink.vcc = Some(i16::from_be_bytes(reader.take()?));
    }
    if flags.contains(Flags::BOOT) {
        let [boot] = reader.take::<1>()?;
        uplink.boot = Some(boot);
    }
    if flags.contains(Flags::TH) {
        uplink.temperature = Some(i16::from_be_bytes(reader.take()?));
        uplink.humidity = Some(u16::from_be_bytes(reader.take()?));
    }
    if flags.contains(Flags::CO2PPM) {
        uplink.co2 = Some(u16::from_be_bytes(reader.take()?));
    }

    if !reader.bytes.is_empty() {
        return Err(DecodeError::TrailingBytes(reader.bytes.len()));
    }
    Ok(uplink)
}

struct Reader<'a> {
    bytes: &'a [u8],
}

impl Reader<'_> {
    fn take<const K: usize>(&mut self) -> Result<[u8; K], DecodeError> {
        let (head, rest) = self
            .bytes
            .split_first_chunk::<K>()
            .ok_or(DecodeError::Truncated)?;
        self.bytes = rest;
        Ok(*head)
    }
}
