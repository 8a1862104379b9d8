//! Phylink Wire Protocol Library
//!
//! This crate defines the binary records exchanged between a simulated radio
//! device and the discrete-event physical-layer simulator ("the phy"):
//!
//! - **Message headers**: 32-bit tags identifying each record on the wire
//! - **Request/result records**: fixed-layout, packed, little-endian
//!   structures for the Tx, Rx, RSSI, CCA and time-advance exchanges
//! - **Unit types**: fixed-point power, frequency and RSSI representations
//!   with dBm/MHz conversions
//! - **Modulation identifiers**: the 2.4 GHz band modulations the phy models
//!
//! # Wire format
//!
//! Every message is a header followed by an optional record body; Tx requests
//! and Rx address-found results are additionally followed by the raw packet
//! payload. Records contain no padding and every multi-byte field is encoded
//! little-endian, so both ends agree on the layout regardless of host.
//!
//! # Example
//!
//! ```rust
//! use phylink_wire::{AbortSchedule, Record, TxRequest, TIME_NEVER};
//!
//! let req = TxRequest {
//!     start_time: 100,
//!     end_time: 200,
//!     abort: AbortSchedule { abort_time: 150, recheck_time: TIME_NEVER },
//!     ..TxRequest::default()
//! };
//! let bytes = req.encode();
//! assert_eq!(bytes.len(), TxRequest::SIZE);
//! assert_eq!(TxRequest::decode(&bytes).unwrap(), req);
//! ```

pub mod error;
pub mod header;
pub mod modulation;
pub mod records;
pub mod units;

pub use error::WireError;
pub use modulation::Modulation;
pub use records::{
    AbortSchedule, CcaRequest, CcaResult, RadioParams, Record, RssiRequest, RssiResult, RxRequest,
    RxResult, RxStatus, StopCondition, TxRequest, TxResult, WaitRequest,
};
pub use units::{Frequency, Power, RssiPower};

/// Simulated time in microseconds since the start of the simulation
pub type SimTime = u64;

/// Sentinel for "never": abort schedules and scan windows use this instead of
/// a wall-clock timeout
pub const TIME_NEVER: SimTime = u64::MAX;
