//! Engine error taxonomy

use crate::hal::HalError;

/// How the input driver broke the event ordering contract
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Violation {
    /// Key-down while the key is already down
    DoubleKeyDown,
    /// Key-up without a preceding key-down
    KeyUpWithoutKeyDown,
    /// Event timestamp earlier than the previous event
    TimestampRegression,
}

/// Errors surfaced by the keying engine
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MorseError {
    /// Character outside the supported alphabet. Recoverable: skip or abort
    /// is the caller's choice.
    UnsupportedCharacter(char),
    /// Keyed pattern matches no character. Recoverable, reported as a miss.
    UnknownPattern,
    /// Malformed event ordering from the input driver. Fatal to the current
    /// session; the decoder has already been reset to idle.
    InputContractViolation(Violation),
    /// Rejected configuration value
    InvalidConfig(&'static str),
    /// Output driver failure while sending
    Output(HalError),
}

impl core::fmt::Display for Violation {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Violation::DoubleKeyDown => write!(f, "key-down while key already down"),
            Violation::KeyUpWithoutKeyDown => write!(f, "key-up without key-down"),
            Violation::TimestampRegression => write!(f, "event timestamp went backwards"),
        }
    }
}

impl core::fmt::Display for MorseError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            MorseError::UnsupportedCharacter(c) => write!(f, "unsupported character {:?}", c),
            MorseError::UnknownPattern => write!(f, "unknown Morse pattern"),
            MorseError::InputContractViolation(v) => write!(f, "input contract violation: {}", v),
            MorseError::InvalidConfig(reason) => write!(f, "invalid configuration: {}", reason),
            MorseError::Output(e) => write!(f, "output driver failed: {}", e),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for MorseError {}

impl From<HalError> for MorseError {
    fn from(e: HalError) -> Self {
        MorseError::Output(e)
    }
}

impl From<Violation> for MorseError {
    fn from(v: Violation) -> Self {
        MorseError::InputContractViolation(v)
    }
}
