#![deny(unsafe_code)]
#![deny(warnings)]
//! Field encodings for the uplink payload
//!
//! All multi-byte fields are big-endian.
//!
//! ```text
//! Vbat / Vcc   i16   volts * 4096
//! Boot         u8    low byte of the boot counter
//! TH           i16   temperature, 0.005 degC per LSB
//!              u16   relative humidity, 0xFFFF = 100 %
//! CO2ppm       uflt16 of ppm / 40000
//! ```
//!
//! `uflt16` is a small unsigned float for values in `[0, 1)`: bits 15..12
//! hold a biased exponent (bias 15), bits 11..0 the mantissa. The value is
//! `mantissa / 4096 * 2^(exponent - 15)`.

use libm::{frexpf, ldexpf, roundf};

/// Temperature scale: LSBs per degree Celsius (0.005 degC resolution)
pub const TEMPERATURE_SCALE: f32 = 200.0;

/// Voltage scale: LSBs per volt
pub const VOLTS_SCALE: f32 = 4096.0;

/// CO2 value that maps to a uflt16 of 1.0
pub const CO2_FULL_SCALE_PPM: f32 = 40_000.0;

/// Encode a temperature as signed 0.005 degC units
///
/// Out-of-range values saturate at the `i16` limits.
pub fn encode_temperature(celsius: f32) -> [u8; 2] {
    // `as` saturates, NaN becomes 0
    let raw = roundf(celsius * TEMPERATURE_SCALE) as i16;
    raw.to_be_bytes()
}

/// Decode a raw temperature field to degrees Celsius
pub fn decode_temperature(raw: i16) -> f32 {
    raw as f32 / TEMPERATURE_SCALE
}

/// Encode relative humidity as a fraction of 0xFFFF
pub fn encode_humidity(percent: f32) -> [u8; 2] {
    let percent = percent.clamp(0.0, 100.0);
    let raw = roundf(percent * 65535.0 / 100.0) as u16;
    raw.to_be_bytes()
}

/// Decode a raw humidity field to percent
pub fn decode_humidity(raw: u16) -> f32 {
    raw as f32 * 100.0 / 65535.0
}

/// Encode a voltage as signed 1/4096 V units
pub fn encode_volts(volts: f32) -> [u8; 2] {
    let raw = roundf(volts * VOLTS_SCALE) as i16;
    raw.to_be_bytes()
}

/// Decode a raw voltage field to volts
pub fn decode_volts(raw: i16) -> f32 {
    raw as f32 / VOLTS_SCALE
}

/// Encode a CO2 concentration as uflt16 of `ppm / 40000`
pub fn encode_co2(ppm: f32) -> [u8; 2] {
    f32_to_uflt16(ppm / CO2_FULL_SCALE_PPM).to_be_bytes()
}

/// Decode a raw CO2 field to ppm
pub fn decode_co2(raw: u16) -> f32 {
    uflt16_to_f32(raw) * CO2_FULL_SCALE_PPM
}

/// Convert a value in `[0, 1)` to uflt16
///
/// Zero, negative and NaN inputs give 0; inputs of 1.0 or more give 0xFFFF.
pub fn f32_to_uflt16(value: f32) -> u16 {
    if value.is_nan() || value <= 0.0 {
        return 0;
    }
    if value >= 1.0 {
        return 0xFFFF;
    }

    // value = normal * 2^exp, normal in [0.5, 1)
    let (mut normal, exp) = frexpf(value);
    let mut exp = exp + 15;
    if exp < 0 {
        // Below the smallest normal exponent: denormalize
        normal = ldexpf(normal, exp);
        exp = 0;
    }

    let mut mantissa = (ldexpf(normal, 12) + 0.5) as u32;
    if mantissa >= 1 << 12 {
        // Rounded up into the next binade
        mantissa = 1 << 11;
        exp += 1;
    }
    if exp > 15 {
        return 0xFFFF;
    }

    ((exp as u16) << 12) | mantissa as u16
}

/// Convert a uflt16 back to `f32`
pub fn uflt16_to_f32(raw: u16) -> f32 {
    let exp = i32::from(raw >> 12);
    let mantissa = f32::from(raw & 0x0FFF);
    ldexpf(mantissa, exp - 15 - 12)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temperature_encoding() {
        assert_eq!(encode_temperature(21.5), [0x10, 0xCC]); // 4300
        assert_eq!(encode_temperature(-10.0), [0xF8, 0x30]); // -2000
        assert_eq!(encode_temperature(500.0), i16::MAX.to_be_bytes());
        assert_eq!(decode_temperature(4300), 21.5);
    }

    #[test]
    fn test_humidity_encoding_clamps() {
        assert_eq!(encode_humidity(0.0), [0x00, 0x00]);
        assert_eq!(encode_humidity(100.0), [0xFF, 0xFF]);
        assert_eq!(encode_humidity(120.0), [0xFF, 0xFF]);
        assert_eq!(encode_humidity(-3.0), [0x00, 0x00]);
        assert_eq!(encode_humidity(50.0), [0x80, 0x00]);
    }

    #[test]
    fn test_volts_encoding() {
        assert_eq!(encode_volts(3.3), [0x34, 0xCD]); // 13517
        assert!((decode_volts(13517) - 3.3).abs() < 1.0 / VOLTS_SCALE);
    }

    #[test]
    fn test_uflt16_known_values() {
        assert_eq!(f32_to_uflt16(0.0), 0);
        assert_eq!(f32_to_uflt16(-1.0), 0);
        assert_eq!(f32_to_uflt16(f32::NAN), 0);
        assert_eq!(f32_to_uflt16(1.0), 0xFFFF);
        assert_eq!(f32_to_uflt16(0.5), 0xF800);
        assert_eq!(f32_to_uflt16(0.999_999), 0xFFFF);
        assert_eq!(uflt16_to_f32(0xF800), 0.5);
    }

    #[test]
    fn test_co2_encoding_precision() {
        assert_eq!(encode_co2(400.0), [0x9A, 0x3D]);
        let decoded = decode_co2(0x9A3D);
        assert!((decoded - 400.0).abs() < 0.2);

        // 12-bit mantissa keeps relative error under 1/4096
        for ppm in [250.0_f32, 1234.0, 5000.0, 39_000.0] {
            let raw = u16::from_be_bytes(encode_co2(ppm));
            let back = decode_co2(raw);
            assert!((back - ppm).abs() / ppm < 1.0 / 4096.0, "{ppm} -> {back}");
        }
    }

    #[test]
    fn test_uflt16_denormal_range() {
        let tiny = ldexpf(1.0, -20);
        let raw = f32_to_uflt16(tiny);
        assert_eq!(raw >> 12, 0);
        assert_eq!(uflt16_to_f32(raw), tiny);
    }
}
