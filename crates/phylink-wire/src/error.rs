//! Error types for wire encoding and decoding

use thiserror::Error;

/// Errors produced while decoding records or parsing unit values
///
/// `FrequencyOutOfRange` carries the rejected `f64`, so the enum is
/// `PartialEq` but not `Eq`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WireError {
    /// Record body had the wrong length
    #[error("record of {got} bytes where {expected} were expected")]
    Length {
        /// Expected record size in bytes
        expected: usize,
        /// Actual number of bytes available
        got: usize,
    },

    /// Rx status field held a value outside the defined set
    #[error("invalid rx status value {0:#x}")]
    InvalidRxStatus(u16),

    /// CCA stop condition field held a value outside the defined set
    #[error("invalid cca stop condition value {0:#x}")]
    InvalidStopCondition(u8),

    /// Modulation name not recognized
    #[error("unknown modulation name {0:?}")]
    UnknownModulation(String),

    /// Frequency too far from the 2400 MHz band center to represent
    #[error("frequency {0} MHz cannot be represented as an offset from 2400 MHz")]
    FrequencyOutOfRange(f64),

    /// Channel index outside the BLE channel set
    #[error("invalid BLE channel index {0}")]
    InvalidBleChannel(u32),
}
