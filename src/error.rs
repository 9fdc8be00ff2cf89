use core::fmt;

use crate::drivers::hc06::commands::{MAX_DEVICE_NAME, PIN_LENGTH};

/// Reasons a controller operation did nothing (or stopped halfway).
///
/// Rejected calls never touch the serial line or the cached name/PIN, so a
/// caller that ignores the result sees the module's usual fire-and-forget
/// behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error<E> {
    /// `begin()` has not completed yet
    NotInitialized,
    /// Name length in bytes, longer than `MAX_DEVICE_NAME`
    NameTooLong(usize),
    /// PIN length in bytes, anything but `PIN_LENGTH`
    InvalidPinLength(usize),
    /// First PIN byte outside of 0x30..=0x90
    InvalidPinCharacter(u8),
    /// Rendered command did not fit the command buffer
    CommandOverflow,
    /// Module did not answer the probe with `OK`
    UnexpectedReply,
    /// Error from the underlying serial transport
    Serial(E),
}

impl<E: fmt::Debug> fmt::Display for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::NotInitialized => write!(f, "controller not initialized, call begin() first"),
            Error::NameTooLong(len) => write!(
                f,
                "device name is {} bytes, at most {} allowed",
                len, MAX_DEVICE_NAME
            ),
            Error::InvalidPinLength(len) => write!(
                f,
                "device pin is {} bytes, exactly {} required",
                len, PIN_LENGTH
            ),
            Error::InvalidPinCharacter(c) => write!(f, "invalid pin character 0x{:02x}", c),
            Error::CommandOverflow => write!(f, "command does not fit the command buffer"),
            Error::UnexpectedReply => write!(f, "module did not reply OK"),
            Error::Serial(e) => write!(f, "serial transport error: {:?}", e),
        }
    }
}
