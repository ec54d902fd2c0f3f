#![deny(unsafe_code)]
#![deny(warnings)]
//! Uplink radio interface

/// Radio operation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RadioError {
    /// Device has no network session (not provisioned or not joined)
    NotJoined,
    /// A previous transmission is still in flight
    Busy,
    /// The stack refused the payload (size, duty cycle)
    Rejected,
    /// The transmission was attempted and failed
    LinkFailed,
}

impl core::fmt::Display for RadioError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotJoined => write!(f, "Radio not joined"),
            Self::Busy => write!(f, "Radio busy"),
            Self::Rejected => write!(f, "Payload rejected"),
            Self::LinkFailed => write!(f, "Transmission failed"),
        }
    }
}

impl core::error::Error for RadioError {}

/// Trait for the low-power wide-area uplink
///
/// Transmission is split into submit and completion so the caller never
/// blocks on the air time.
///
/// # Example Implementation
/// ```ignore
/// impl UplinkRadio for LoraRadio {
///     fn send(&mut self, port: u8, payload: &[u8], confirmed: bool) -> Result<(), RadioError> {
///         self.stack.queue(port, payload, confirmed).map_err(|_| RadioError::Rejected)
///     }
///
///     fn poll_complete(&mut self) -> Option<Result<(), RadioError>> {
///         self.stack.take_tx_result()
///     }
/// }
/// ```
pub trait UplinkRadio {
    /// Submit a payload for transmission on `port`
    ///
    /// `Ok` means the payload was accepted; completion is reported later
    /// through [`UplinkRadio::poll_complete`].
    fn send(&mut self, port: u8, payload: &[u8], confirmed: bool) -> Result<(), RadioError>;

    /// Collect the result of the submitted transmission, once
    ///
    /// Returns `None` while the transmission is still in flight.
    fn poll_complete(&mut self) -> Option<Result<(), RadioError>>;
}

#[cfg(test)]
mod tests {
    extern crate std;
    use super::*;
    use std::string::ToString;

    #[test]
    fn test_error_display() {
        assert_eq!(RadioError::NotJoined.to_string(), "Radio not joined");
        assert_eq!(RadioError::LinkFailed.to_string(), "Transmission failed");
    }
}
