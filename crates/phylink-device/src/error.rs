//! Error types for the device engine

use std::io;

use thiserror::Error;

use phylink_wire::{header, WireError};

/// Errors surfaced by connection and exchange operations
///
/// Everything except [`DeviceError::Usage`] and [`DeviceError::NotConnected`]
/// is fatal to the connection: the link flips to disconnected and later
/// operations fail fast with `NotConnected`.
#[derive(Debug, Error)]
pub enum DeviceError {
    /// I/O failure on the transport. Always fatal to the connection.
    #[error("transport failure: {0}")]
    Io(#[from] io::Error),

    /// Operation attempted while not connected; nothing was sent.
    #[error("not connected to the phy")]
    NotConnected,

    /// The phy ended the session with a Disconnect record.
    ///
    /// This is the normal end-of-simulation signal, not a fault; the
    /// connection is reusable only after a fresh connect.
    #[error("the phy ended the session")]
    SessionEnded,

    /// The phy sent a record not valid for the current protocol state.
    /// Treated as a remote fault: the engine disconnects in an orderly way.
    #[error("unexpected {} header ({header:#x}) while {context}", header::name(*header))]
    UnexpectedHeader {
        /// The offending header value
        header: u32,
        /// What the engine was waiting for
        context: &'static str,
    },

    /// The caller's buffer cannot hold the incoming packet. Truncating
    /// would silently lose packet data, so the engine disconnects instead.
    #[error("buffer of {capacity} bytes cannot hold an incoming packet of {packet_size} bytes")]
    BufferTooSmall {
        /// Packet size the phy reported
        packet_size: usize,
        /// Capacity of the caller-supplied buffer
        capacity: usize,
    },

    /// A record from the phy failed to decode. Treated like an unexpected
    /// header: remote fault, orderly disconnect.
    #[error("malformed record from the phy: {0}")]
    Wire(#[from] WireError),

    /// Caller bug, see [`UsageError`]. The connection state is untouched.
    #[error("usage error: {0}")]
    Usage(#[from] UsageError),
}

/// Local programming defects in how the caller drives the engine
///
/// These indicate a bug in the embedding application, not a runtime
/// condition of the protocol. They are typed (rather than panics) so the
/// application can decide how to react.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UsageError {
    /// A new exchange was started while another was outstanding
    #[error("a {0} exchange is already outstanding on this connection")]
    ExchangeOutstanding(&'static str),

    /// A pick-up operation was invoked with no matching exchange outstanding
    #[error("no outstanding {expected} exchange to pick up")]
    NoMatchingExchange {
        /// Exchange kind the pick-up expected
        expected: &'static str,
    },

    /// A Tx request declared a packet size different from the payload given
    #[error("tx request declares {declared} packet bytes but {provided} were provided")]
    PacketSizeMismatch {
        /// `packet_size` field of the request
        declared: u16,
        /// Length of the payload slice
        provided: usize,
    },
}
