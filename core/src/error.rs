#![deny(unsafe_code)]
#![deny(warnings)]
//! Error types for the core crate
//!
//! None of these is fatal to the node. The measurement loop logs them and
//! carries on with the next cycle.

use crate::uplink::Flags;

/// Uplink buffer fill errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EncodeError {
    /// Buffer cannot hold even the format and flags bytes
    NoRoom,
    /// Payload did not fit; whole fields were dropped
    ///
    /// The buffer still holds a valid payload carrying `sent`.
    Overflow {
        /// Fields present in the buffer
        sent: Flags,
        /// Fields left out, lowest priority first
        dropped: Flags,
    },
}

impl core::fmt::Display for EncodeError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NoRoom => write!(f, "Uplink buffer too small for header"),
            Self::Overflow { sent, dropped } => write!(
                f,
                "Uplink buffer overflow: sent {:#04x}, dropped {:#04x}",
                sent.bits(),
                dropped.bits()
            ),
        }
    }
}

impl core::error::Error for EncodeError {}

/// Uplink payload parse errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DecodeError {
    /// Payload ended before the header or a field was complete
    Truncated,
    /// First byte is not the measurement message format
    UnknownFormat(u8),
    /// Flags byte has bits with no defined field
    UnknownFlags(u8),
    /// Bytes left over after the last flagged field
    TrailingBytes(usize),
}

impl core::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Truncated => write!(f, "Payload truncated"),
            Self::UnknownFormat(tag) => write!(f, "Unknown message format {:#04x}", tag),
            Self::UnknownFlags(bits) => write!(f, "Unknown flag bits {:#04x}", bits),
            Self::TrailingBytes(n) => write!(f, "{} trailing bytes after payload", n),
        }
    }
}

impl core::error::Error for DecodeError {}

/// Poll list errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PollerError {
    /// No free slot for another pollable object
    Full,
}

impl core::fmt::Display for PollerError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Full => write!(f, "Poll list full"),
        }
    }
}

impl core::error::Error for PollerError {}
