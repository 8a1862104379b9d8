//! Raw transport to the phy
//!
//! The transport is an ordered, reliable byte channel. The engine only needs
//! three things from it: send bytes, receive an exact number of bytes, and
//! tear the channel down. [`UnixTransport`] is the production implementation
//! (one Unix socket per device, accepted by the phy process);
//! [`StreamTransport`] adapts any `Read + Write` stream for tests and
//! embedding.

use std::io::{self, Read, Write};
use std::net::Shutdown;
use std::os::unix::net::UnixStream;
use std::path::Path;

use tracing::{debug, info};

use phylink_wire::{header, Record};

use crate::error::DeviceError;

/// An ordered, reliable byte channel to the phy
pub trait Transport {
    /// Send bytes; partial writes are completed internally
    fn send(&mut self, bytes: &[u8]) -> io::Result<()>;

    /// Receive exactly `buf.len()` bytes, blocking until available
    fn recv_exact(&mut self, buf: &mut [u8]) -> io::Result<()>;

    /// Best-effort teardown of the channel
    fn shutdown(&mut self) {}
}

/// Send a bare message header
pub fn send_header<T: Transport + ?Sized>(transport: &mut T, header: u32) -> io::Result<()> {
    transport.send(&header.to_le_bytes())
}

/// Send a header followed by an encoded record body
pub fn send_message<T: Transport + ?Sized>(
    transport: &mut T,
    header: u32,
    body: &[u8],
) -> io::Result<()> {
    transport.send(&header.to_le_bytes())?;
    transport.send(body)
}

/// Receive one message header
pub fn recv_header<T: Transport + ?Sized>(transport: &mut T) -> io::Result<u32> {
    let mut bytes = [0u8; header::SIZE];
    transport.recv_exact(&mut bytes)?;
    Ok(u32::from_le_bytes(bytes))
}

/// Receive and decode one record body
pub fn recv_record<T: Transport + ?Sized, R: Record>(transport: &mut T) -> Result<R, DeviceError> {
    let mut bytes = vec![0u8; R::SIZE];
    transport.recv_exact(&mut bytes)?;
    Ok(R::decode(&bytes)?)
}

/// Adapts any blocking stream into a [`Transport`]
#[derive(Debug)]
pub struct StreamTransport<S> {
    stream: S,
}

impl<S: Read + Write> StreamTransport<S> {
    /// Wrap a stream
    pub fn new(stream: S) -> Self {
        StreamTransport { stream }
    }

    /// Get the inner stream back
    pub fn into_inner(self) -> S {
        self.stream
    }
}

impl<S: Read + Write> Transport for StreamTransport<S> {
    fn send(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.stream.write_all(bytes)?;
        self.stream.flush()
    }

    fn recv_exact(&mut self, buf: &mut [u8]) -> io::Result<()> {
        self.stream.read_exact(buf)
    }
}

/// Production transport: one Unix socket per device, accepted by the phy
#[derive(Debug)]
pub struct UnixTransport {
    stream: UnixStream,
}

impl UnixTransport {
    /// Connect to the phy's per-device endpoint.
    ///
    /// The socket path is derived as `<endpoint>/<session_id>/dev<device_id>.phy`.
    /// Blocks until the phy accepts; no exchange may be issued before this
    /// returns.
    pub fn connect(
        endpoint: impl AsRef<Path>,
        session_id: &str,
        device_id: u32,
    ) -> io::Result<Self> {
        let path = endpoint
            .as_ref()
            .join(session_id)
            .join(format!("dev{device_id}.phy"));
        debug!(path = %path.display(), "connecting to phy");
        let stream = UnixStream::connect(&path)?;
        info!(device_id, path = %path.display(), "connected to phy");
        Ok(UnixTransport { stream })
    }

    /// Wrap an already-connected stream (e.g. one end of a socket pair)
    pub fn from_stream(stream: UnixStream) -> Self {
        UnixTransport { stream }
    }
}

impl Transport for UnixTransport {
    fn send(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.stream.write_all(bytes)
    }

    fn recv_exact(&mut self, buf: &mut [u8]) -> io::Result<()> {
        self.stream.read_exact(buf)
    }

    fn shutdown(&mut self) {
        let _ = self.stream.shutdown(Shutdown::Both);
    }
}
