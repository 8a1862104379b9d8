//! Packet buffer acquisition for Rx exchanges
//!
//! When the phy reports a matched address it also reports the packet length.
//! The engine then needs somewhere to put the bytes: either the caller
//! supplied a fixed buffer up front, or the engine allocates one sized to
//! the reported length and transfers ownership to the caller on return.

use crate::error::DeviceError;

/// Storage for the bytes of one received packet
#[derive(Debug, PartialEq, Eq)]
pub enum PacketBuffer<'a> {
    /// Caller-supplied storage, trimmed to the packet length
    Caller(&'a mut [u8]),
    /// Engine-allocated storage, exactly the packet length; ownership
    /// transfers to the caller with the Rx result
    Engine(Vec<u8>),
}

impl PacketBuffer<'_> {
    /// The packet bytes
    pub fn as_slice(&self) -> &[u8] {
        match self {
            PacketBuffer::Caller(slice) => slice,
            PacketBuffer::Engine(vec) => vec,
        }
    }

    /// The packet bytes, writable
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        match self {
            PacketBuffer::Caller(slice) => slice,
            PacketBuffer::Engine(vec) => vec,
        }
    }

    /// Packet length in bytes
    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    /// Whether the packet was empty
    pub fn is_empty(&self) -> bool {
        self.as_slice().is_empty()
    }
}

/// Decide where an incoming packet of `packet_size` bytes goes.
///
/// No caller buffer (or an empty one) means the engine allocates exactly
/// `packet_size` bytes. A caller buffer large enough is used in place, with
/// only `packet_size` bytes of it handed back. A caller buffer that is too
/// small is a protocol-level fault: truncating would silently lose packet
/// data, so the caller gets an error (and the engine disconnects) instead.
pub fn acquire(
    packet_size: usize,
    caller: Option<&mut [u8]>,
) -> Result<PacketBuffer<'_>, DeviceError> {
    match caller {
        Some(buf) if !buf.is_empty() => {
            if buf.len() < packet_size {
                return Err(DeviceError::BufferTooSmall {
                    packet_size,
                    capacity: buf.len(),
                });
            }
            Ok(PacketBuffer::Caller(&mut buf[..packet_size]))
        }
        _ => Ok(PacketBuffer::Engine(vec![0; packet_size])),
    }
}
