//! Phylink Device Engine
//!
//! This crate implements the device side of the phylink protocol: it lets
//! simulated radio firmware run deterministic transmit, receive, RSSI
//! measurement, clear-channel assessment and time-advance exchanges against
//! an external discrete-event physical-layer simulator ("the phy") in place
//! of real radio hardware.
//!
//! # Architecture
//!
//! A [`Connection`] owns one ordered, reliable byte channel to the phy (the
//! [`Transport`]) and drives one exchange at a time over it. Every exchange
//! is a short state machine:
//!
//! - the request record is sent, then responses are read in a loop
//! - "abort reevaluation" pokes from the phy are answered transparently by
//!   consulting the connection's [`DecisionStrategy`]
//! - the terminal record populates the result handed back to the caller
//!
//! The Rx exchange additionally embeds an address-evaluation sub-phase: when
//! the phy reports a matched address, the packet bytes are read into either
//! a caller-supplied buffer or a fresh allocation ([`PacketBuffer`]), the
//! strategy decides accept or reject, and only on accept does the exchange
//! run on to its final result.
//!
//! At most one exchange is outstanding per connection; the state machine
//! enforces this and surfaces violations as typed [`UsageError`]s. Multiple
//! simulated devices are simply multiple independent `Connection` values.
//!
//! # Example
//!
//! ```rust,no_run
//! use phylink_device::{Connection, UnixTransport};
//! use phylink_wire::{AbortSchedule, TxRequest};
//!
//! let mut conn = Connection::<UnixTransport>::connect(0, "/tmp/phy", "sim-1")?;
//! let req = TxRequest {
//!     start_time: 100,
//!     end_time: 200,
//!     abort: AbortSchedule::never(),
//!     packet_size: 3,
//!     ..TxRequest::default()
//! };
//! let done = conn.transmit(&req, b"abc")?;
//! println!("tx ended at {}", done.end_time);
//! # Ok::<(), phylink_device::DeviceError>(())
//! ```

pub mod buffer;
pub mod connection;
pub mod error;
mod reeval;
pub mod strategy;
pub mod transport;

pub use buffer::PacketBuffer;
pub use connection::{Connection, Exchange, LinkState, RxCompletion, RxPhase};
pub use error::{DeviceError, UsageError};
pub use strategy::{DecisionStrategy, DefaultStrategy};
pub use transport::{StreamTransport, Transport, UnixTransport};
