#![deny(unsafe_code)]
#![deny(warnings)]
//! Activate/deactivate request signals
//!
//! Requests may be raised from any context that can reach the flags, an
//! interrupt handler included, so they are atomics rather than plain fields
//! of the loop. Raising a request only sets a flag; the loop consumes it on
//! its next poll in a state that accepts requests. Repeated requests before
//! then coalesce into one.

use core::sync::atomic::{AtomicBool, Ordering};

use super::fsm::Request;

/// Pending request flags shared with the measurement loop
#[derive(Debug, Default)]
pub struct RequestFlags {
    active: AtomicBool,
    inactive: AtomicBool,
}

impl RequestFlags {
    /// No request pending; usable in a `static`
    pub const fn new() -> Self {
        Self {
            active: AtomicBool::new(false),
            inactive: AtomicBool::new(false),
        }
    }

    /// Ask the loop to start (`true`) or stop (`false`) producing uplinks
    pub fn request_active(&self, enable: bool) {
        if enable {
            self.active.store(true, Ordering::Release);
        } else {
            self.inactive.store(true, Ordering::Release);
        }
    }

    /// An activate request is waiting
    pub fn activate_pending(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// A deactivate request is waiting
    pub fn deactivate_pending(&self) -> bool {
        self.inactive.load(Ordering::Acquire)
    }

    /// Consume both flags; activate wins when both were raised
    pub(crate) fn take(&self) -> Option<Request> {
        let activate = self.active.swap(false, Ordering::AcqRel);
        let deactivate = self.inactive.swap(false, Ordering::AcqRel);

        if activate {
            Some(Request::Activate)
        } else if deactivate {
            Some(Request::Deactivate)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requests_coalesce() {
        let flags = RequestFlags::new();
        flags.request_active(true);
        flags.request_active(true);
        flags.request_active(true);

        assert_eq!(flags.take(), Some(Request::Activate));
        assert_eq!(flags.take(), None);
    }

    #[test]
    fn test_activate_wins_and_clears_both() {
        let flags = RequestFlags::new();
        flags.request_active(false);
        flags.request_active(true);

        assert!(flags.activate_pending());
        assert!(flags.deactivate_pending());
        assert_eq!(flags.take(), Some(Request::Activate));
        assert!(!flags.deactivate_pending());
    }

    #[test]
    fn test_deactivate_alone() {
        let flags = RequestFlags::default();
        flags.request_active(false);
        assert_eq!(flags.take(), Some(Request::Deactivate));
        assert_eq!(flags.take(), None);
    }
}
