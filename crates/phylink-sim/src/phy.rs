//! Scripted phy
//!
//! Plays the phy's half of the protocol from a test script. Each `expect_*`
//! method blocks until the device sends the named message and fails if
//! anything else arrives; each `send_*` method emits one phy message. The
//! script decides the interleaving, so a test can inject abort-reevaluation
//! pokes, disconnects or garbage at any point of an exchange.

use std::io::{self, Read, Write};
use std::os::unix::net::UnixStream;
use std::thread::{self, JoinHandle};

use thiserror::Error;
use tracing::debug;

use phylink_device::UnixTransport;
use phylink_wire::{
    header, AbortSchedule, CcaRequest, CcaResult, Record, RssiRequest, RssiResult, RxRequest,
    RxResult, TxRequest, TxResult, WaitRequest, WireError,
};

/// Failures of a phy script
#[derive(Debug, Error)]
pub enum SimError {
    /// I/O failure on the channel to the device
    #[error("channel failure: {0}")]
    Io(#[from] io::Error),

    /// A record from the device failed to decode
    #[error("malformed record from the device: {0}")]
    Wire(#[from] WireError),

    /// The device sent a different message than the script expected
    #[error(
        "expected {} header ({expected:#x}), device sent {} ({got:#x})",
        header::name(*expected),
        header::name(*got)
    )]
    UnexpectedHeader {
        /// Header the script expected
        expected: u32,
        /// Header the device sent
        got: u32,
    },

    /// The script panicked on its thread
    #[error("phy script panicked")]
    Panicked,
}

/// One phy endpoint driven by a script
#[derive(Debug)]
pub struct ScriptedPhy {
    stream: UnixStream,
}

/// Handle to a phy script running on its own thread
#[derive(Debug)]
pub struct PhyThread {
    handle: JoinHandle<Result<(), SimError>>,
}

impl PhyThread {
    /// Wait for the script to finish and surface its outcome
    pub fn join(self) -> Result<(), SimError> {
        match self.handle.join() {
            Ok(res) => res,
            Err(_) => Err(SimError::Panicked),
        }
    }
}

impl ScriptedPhy {
    /// A connected device/phy endpoint pair over an in-process socket
    pub fn pair() -> io::Result<(UnixTransport, ScriptedPhy)> {
        let (device_end, phy_end) = UnixStream::pair()?;
        Ok((
            UnixTransport::from_stream(device_end),
            ScriptedPhy { stream: phy_end },
        ))
    }

    /// Wrap an already-accepted stream (see [`crate::BoundPhy`])
    pub fn from_stream(stream: UnixStream) -> Self {
        ScriptedPhy { stream }
    }

    /// Run a script on its own thread against a fresh endpoint pair.
    ///
    /// The returned transport is the device end; drive a
    /// [`phylink_device::Connection`] over it, then [`PhyThread::join`] to
    /// propagate any script failure into the test.
    pub fn spawn<F>(script: F) -> io::Result<(UnixTransport, PhyThread)>
    where
        F: FnOnce(&mut ScriptedPhy) -> Result<(), SimError> + Send + 'static,
    {
        let (transport, mut phy) = ScriptedPhy::pair()?;
        let handle = thread::spawn(move || script(&mut phy));
        Ok((transport, PhyThread { handle }))
    }

    // ------------------------------------------------------------------
    // Device-to-phy side
    // ------------------------------------------------------------------

    /// Read the next header, whatever it is
    pub fn recv_header(&mut self) -> Result<u32, SimError> {
        let mut bytes = [0u8; header::SIZE];
        self.stream.read_exact(&mut bytes)?;
        let got = u32::from_le_bytes(bytes);
        debug!(header = header::name(got), "device message");
        Ok(got)
    }

    /// Read the next header and fail unless it is `expected`
    pub fn expect_header(&mut self, expected: u32) -> Result<(), SimError> {
        let got = self.recv_header()?;
        if got != expected {
            return Err(SimError::UnexpectedHeader { expected, got });
        }
        Ok(())
    }

    /// Expect a Tx request; returns the request and the raw payload
    pub fn expect_tx(&mut self) -> Result<(TxRequest, Vec<u8>), SimError> {
        self.expect_header(header::TX)?;
        let request: TxRequest = self.recv_record()?;
        let mut packet = vec![0u8; usize::from(request.packet_size)];
        self.stream.read_exact(&mut packet)?;
        Ok((request, packet))
    }

    /// Expect an Rx request
    pub fn expect_rx(&mut self) -> Result<RxRequest, SimError> {
        self.expect_header(header::RX)?;
        self.recv_record()
    }

    /// Expect an RSSI measurement request
    pub fn expect_rssi(&mut self) -> Result<RssiRequest, SimError> {
        self.expect_header(header::RSSI_MEASURE)?;
        self.recv_record()
    }

    /// Expect a CCA request
    pub fn expect_cca(&mut self) -> Result<CcaRequest, SimError> {
        self.expect_header(header::CCA_MEASURE)?;
        self.recv_record()
    }

    /// Expect a time-advance request
    pub fn expect_wait(&mut self) -> Result<WaitRequest, SimError> {
        self.expect_header(header::WAIT)?;
        self.recv_record()
    }

    /// Expect the device's accept/reject decision after an address match
    pub fn expect_rx_decision(&mut self) -> Result<bool, SimError> {
        match self.recv_header()? {
            header::RX_CONTINUE => Ok(true),
            header::RX_STOP => Ok(false),
            got => Err(SimError::UnexpectedHeader {
                expected: header::RX_CONTINUE,
                got,
            }),
        }
    }

    /// Expect the device to leave the session
    pub fn expect_disconnect(&mut self) -> Result<(), SimError> {
        self.expect_header(header::DISCONNECT)
    }

    /// Expect the device to ask for the whole simulation to end
    pub fn expect_terminate(&mut self) -> Result<(), SimError> {
        self.expect_header(header::TERMINATE)
    }

    /// Poke the device to reevaluate its abort schedule and read the revised
    /// schedule it answers with
    pub fn poke_reevaluation(&mut self) -> Result<AbortSchedule, SimError> {
        self.send_header(header::ABORT_REEVALUATE)?;
        self.expect_header(header::NEW_ABORT)?;
        self.recv_record()
    }

    // ------------------------------------------------------------------
    // Phy-to-device side
    // ------------------------------------------------------------------

    /// Send a bare header
    pub fn send_header(&mut self, header: u32) -> Result<(), SimError> {
        self.stream.write_all(&header.to_le_bytes())?;
        Ok(())
    }

    /// End a transmission
    pub fn send_tx_end(&mut self, result: &TxResult) -> Result<(), SimError> {
        self.send_message(header::TX_END, &result.encode())
    }

    /// Report an address match, followed by the packet bytes
    pub fn send_rx_address_found(
        &mut self,
        partial: &RxResult,
        packet: &[u8],
    ) -> Result<(), SimError> {
        self.send_message(header::RX_ADDRESS_FOUND, &partial.encode())?;
        self.stream.write_all(packet)?;
        Ok(())
    }

    /// End a reception
    pub fn send_rx_end(&mut self, result: &RxResult) -> Result<(), SimError> {
        self.send_message(header::RX_END, &result.encode())
    }

    /// Answer an RSSI measurement
    pub fn send_rssi_end(&mut self, result: &RssiResult) -> Result<(), SimError> {
        self.send_message(header::RSSI_END, &result.encode())
    }

    /// End a clear-channel assessment
    pub fn send_cca_end(&mut self, result: &CcaResult) -> Result<(), SimError> {
        self.send_message(header::CCA_END, &result.encode())
    }

    /// Report a wait as elapsed
    pub fn send_wait_end(&mut self) -> Result<(), SimError> {
        self.send_header(header::WAIT_END)
    }

    /// End the session from the phy side
    pub fn send_disconnect(&mut self) -> Result<(), SimError> {
        self.send_header(header::DISCONNECT)
    }

    fn recv_record<R: Record>(&mut self) -> Result<R, SimError> {
        let mut bytes = vec![0u8; R::SIZE];
        self.stream.read_exact(&mut bytes)?;
        Ok(R::decode(&bytes)?)
    }

    fn send_message(&mut self, header: u32, body: &[u8]) -> Result<(), SimError> {
        self.stream.write_all(&header.to_le_bytes())?;
        self.stream.write_all(body)?;
        Ok(())
    }
}
