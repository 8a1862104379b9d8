//! Connection lifecycle and exchange engines
//!
//! A [`Connection`] is the explicit, caller-owned handle to one device-phy
//! channel. It tracks the link state, enforces the single-outstanding-
//! exchange discipline, and drives the five exchange state machines (Tx,
//! Rx, RSSI, CCA, Wait) over the transport.
//!
//! Protocol rules encoded here:
//!
//! - every request embeds the abort schedule; while waiting for a terminal
//!   record the phy may poke the device to revise it (see [`crate::reeval`])
//! - a Disconnect record observed at any point ends the exchange, clears the
//!   outstanding state and invalidates the connection
//! - a header not valid for the current state is a remote fault: the engine
//!   disconnects in an orderly way and reports the violation

use tracing::{debug, info, warn};

use phylink_wire::{
    header, AbortSchedule, CcaRequest, CcaResult, Record, RssiRequest, RssiResult, RxRequest,
    RxResult, SimTime, TxRequest, TxResult, WaitRequest,
};

use crate::buffer::{self, PacketBuffer};
use crate::error::{DeviceError, UsageError};
use crate::reeval;
use crate::strategy::{DecisionStrategy, DefaultStrategy};
use crate::transport::{self, Transport, UnixTransport};

/// Link state of a connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    /// No usable channel; every exchange operation fails fast
    Disconnected,
    /// Channel established, exchanges may be issued
    Connected,
    /// Orderly end-of-session handshake in progress
    Terminating,
}

/// Sub-phase of an outstanding Rx exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RxPhase {
    /// Waiting for an address match (or end of the scan window)
    Scanning,
    /// Address matched; packet read, accept/reject decision pending
    AddressEvaluation,
    /// Packet accepted; waiting for the final Rx result
    Receiving,
}

/// The exchange currently outstanding on a connection
///
/// At most one exchange is outstanding at any time; starting another while
/// one is in flight is a caller error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exchange {
    /// Transmission; carries the abort schedule for a deferred pick-up
    Tx(AbortSchedule),
    /// Reception
    Rx(RxPhase),
    /// RSSI measurement
    Rssi,
    /// Clear-channel assessment
    Cca,
    /// Time advance
    Wait,
}

impl Exchange {
    fn kind(&self) -> &'static str {
        match self {
            Exchange::Tx(_) => "Tx",
            Exchange::Rx(_) => "Rx",
            Exchange::Rssi => "Rssi",
            Exchange::Cca => "Cca",
            Exchange::Wait => "Wait",
        }
    }
}

/// Checked before a Tx exchange starts, so a mismatch leaves no exchange
/// outstanding and nothing on the wire.
fn check_payload(request: &TxRequest, packet: &[u8]) -> Result<(), UsageError> {
    if usize::from(request.packet_size) != packet.len() {
        return Err(UsageError::PacketSizeMismatch {
            declared: request.packet_size,
            provided: packet.len(),
        });
    }
    Ok(())
}

/// Everything a completed (or rejected) Rx exchange hands back
#[derive(Debug)]
pub struct RxCompletion<'a> {
    /// The final result, or the address-found partial result if the packet
    /// was rejected (status `InProgress`), or the no-sync result if the scan
    /// window closed without a match
    pub result: RxResult,
    /// The packet bytes; empty if no address was matched
    pub packet: PacketBuffer<'a>,
    /// Whether the packet passed address evaluation
    pub accepted: bool,
}

/// A caller-owned connection to the phy
///
/// Multiple simulated devices are multiple independent `Connection` values;
/// nothing is shared between them.
pub struct Connection<T: Transport> {
    transport: T,
    state: LinkState,
    outstanding: Option<Exchange>,
    strategy: Box<dyn DecisionStrategy>,
}

impl Connection<UnixTransport> {
    /// Connect to the phy and hand back a ready connection.
    ///
    /// Blocks until the phy accepts the channel. Uses the default decision
    /// strategy; see [`Connection::set_strategy`] to install a custom one.
    pub fn connect(
        device_id: u32,
        endpoint: impl AsRef<std::path::Path>,
        session_id: &str,
    ) -> Result<Self, DeviceError> {
        let transport = UnixTransport::connect(endpoint, session_id, device_id)?;
        Ok(Connection::from_transport(transport))
    }
}

impl<T: Transport> Connection<T> {
    /// Wrap an already-established transport
    pub fn from_transport(transport: T) -> Self {
        Connection {
            transport,
            state: LinkState::Connected,
            outstanding: None,
            strategy: Box::new(DefaultStrategy),
        }
    }

    /// Wrap an already-established transport with a custom strategy
    pub fn with_strategy(transport: T, strategy: Box<dyn DecisionStrategy>) -> Self {
        Connection {
            transport,
            state: LinkState::Connected,
            outstanding: None,
            strategy,
        }
    }

    /// Install a decision strategy, replacing the current one
    pub fn set_strategy(&mut self, strategy: Box<dyn DecisionStrategy>) {
        self.strategy = strategy;
    }

    /// Current link state
    pub fn state(&self) -> LinkState {
        self.state
    }

    /// Whether exchanges may currently be issued
    pub fn is_connected(&self) -> bool {
        self.state == LinkState::Connected
    }

    /// The exchange currently outstanding, if any
    pub fn outstanding(&self) -> Option<Exchange> {
        self.outstanding
    }

    /// Best-effort notify the phy, then release the transport
    pub fn disconnect(mut self) {
        if self.state == LinkState::Connected {
            let _ = transport::send_header(&mut self.transport, header::DISCONNECT);
        }
        self.transport.shutdown();
        info!("disconnected from phy");
    }

    /// Request an orderly end of the whole session.
    ///
    /// Blocks until the phy acknowledges with a Disconnect record (or closes
    /// the channel), then releases the transport.
    pub fn terminate(mut self) -> Result<(), DeviceError> {
        if self.state != LinkState::Connected {
            return Err(DeviceError::NotConnected);
        }
        self.state = LinkState::Terminating;
        transport::send_header(&mut self.transport, header::TERMINATE)?;
        match transport::recv_header(&mut self.transport) {
            Ok(header::DISCONNECT) => {}
            Ok(other) => {
                warn!(header = other, "unexpected response to terminate");
                self.transport.shutdown();
                return Err(DeviceError::UnexpectedHeader {
                    header: other,
                    context: "waiting for terminate acknowledgement",
                });
            }
            // the phy closing the channel counts as acknowledgement
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {}
            Err(e) => return Err(e.into()),
        }
        self.transport.shutdown();
        info!("session terminated");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Tx exchange
    // ------------------------------------------------------------------

    /// Transmit a packet and block until the phy reports the end of the
    /// transmission.
    pub fn transmit(&mut self, request: &TxRequest, packet: &[u8]) -> Result<TxResult, DeviceError> {
        check_payload(request, packet)?;
        self.begin(Exchange::Tx(request.abort))?;
        let res = self.run_tx(request, packet);
        self.conclude(res)
    }

    /// Send a Tx request and return immediately.
    ///
    /// The exchange stays outstanding; call [`Connection::pickup_tx`] to
    /// collect the result. Useful to interleave other work while the
    /// transmission is in the air.
    pub fn transmit_nowait(&mut self, request: &TxRequest, packet: &[u8]) -> Result<(), DeviceError> {
        check_payload(request, packet)?;
        self.begin(Exchange::Tx(request.abort))?;
        let res = self.send_tx(request, packet);
        if res.is_err() {
            return self.conclude(res);
        }
        Ok(())
    }

    /// Collect the result of a transmission started with
    /// [`Connection::transmit_nowait`].
    ///
    /// Calling this with no Tx exchange outstanding is a caller bug and
    /// fails with [`UsageError::NoMatchingExchange`].
    pub fn pickup_tx(&mut self) -> Result<TxResult, DeviceError> {
        let mut abort = match self.outstanding {
            Some(Exchange::Tx(abort)) => abort,
            _ => {
                return Err(UsageError::NoMatchingExchange { expected: "Tx" }.into());
            }
        };
        let res = self.finish_tx(&mut abort);
        self.conclude(res)
    }

    fn run_tx(&mut self, request: &TxRequest, packet: &[u8]) -> Result<TxResult, DeviceError> {
        self.send_tx(request, packet)?;
        let mut abort = request.abort;
        self.finish_tx(&mut abort)
    }

    fn send_tx(&mut self, request: &TxRequest, packet: &[u8]) -> Result<(), DeviceError> {
        debug!(
            start_time = request.start_time,
            end_time = request.end_time,
            packet_size = request.packet_size,
            "tx request"
        );
        transport::send_message(&mut self.transport, header::TX, &request.encode())?;
        self.transport.send(packet)?;
        Ok(())
    }

    fn finish_tx(&mut self, abort: &mut AbortSchedule) -> Result<TxResult, DeviceError> {
        let header = reeval::await_response(&mut self.transport, &mut *self.strategy, abort)?;
        self.read_terminal(header, header::TX_END, "waiting for tx end")
    }

    // ------------------------------------------------------------------
    // Rx exchange
    // ------------------------------------------------------------------

    /// Attempt a reception and block until it concludes.
    ///
    /// `caller_buf` decides where packet bytes go: `None` (or an empty
    /// slice) makes the engine allocate a buffer of exactly the reported
    /// packet length; a non-empty slice is used in place and must be able to
    /// hold the whole packet, otherwise the engine disconnects rather than
    /// truncate.
    ///
    /// When the phy reports an address match, the strategy's accept/reject
    /// decision is taken exactly once: on reject the call returns right away
    /// with the partial (address-found) result and the bytes read so far.
    pub fn receive<'a>(
        &mut self,
        request: &RxRequest,
        caller_buf: Option<&'a mut [u8]>,
    ) -> Result<RxCompletion<'a>, DeviceError> {
        self.begin(Exchange::Rx(RxPhase::Scanning))?;
        let res = self.run_rx(request, caller_buf);
        self.conclude(res)
    }

    fn run_rx<'a>(
        &mut self,
        request: &RxRequest,
        caller_buf: Option<&'a mut [u8]>,
    ) -> Result<RxCompletion<'a>, DeviceError> {
        debug!(
            start_time = request.start_time,
            scan_duration = request.scan_duration,
            phy_address = request.phy_address,
            "rx request"
        );
        transport::send_message(&mut self.transport, header::RX, &request.encode())?;
        let mut abort = request.abort;

        let first =
            reeval::await_response(&mut self.transport, &mut *self.strategy, &mut abort)?;
        match first {
            header::RX_ADDRESS_FOUND => {
                self.set_rx_phase(RxPhase::AddressEvaluation);
                let partial: RxResult = transport::recv_record(&mut self.transport)?;
                let mut packet = buffer::acquire(usize::from(partial.packet_size), caller_buf)?;
                if !packet.is_empty() {
                    self.transport.recv_exact(packet.as_mut_slice())?;
                }

                let accepted = self.strategy.accept_packet(&partial, packet.as_slice());
                debug!(
                    packet_size = partial.packet_size,
                    accepted, "address evaluation"
                );
                let decision = if accepted {
                    header::RX_CONTINUE
                } else {
                    header::RX_STOP
                };
                transport::send_header(&mut self.transport, decision)?;

                if !accepted {
                    return Ok(RxCompletion {
                        result: partial,
                        packet,
                        accepted: false,
                    });
                }

                self.set_rx_phase(RxPhase::Receiving);
                let last =
                    reeval::await_response(&mut self.transport, &mut *self.strategy, &mut abort)?;
                let result =
                    self.read_terminal(last, header::RX_END, "waiting for rx end")?;
                Ok(RxCompletion {
                    result,
                    packet,
                    accepted: true,
                })
            }
            // scan window closed without a match
            header::RX_END => {
                let result: RxResult = transport::recv_record(&mut self.transport)?;
                Ok(RxCompletion {
                    result,
                    packet: buffer::acquire(0, caller_buf)?,
                    accepted: false,
                })
            }
            header::DISCONNECT => Err(DeviceError::SessionEnded),
            other => Err(DeviceError::UnexpectedHeader {
                header: other,
                context: "waiting for rx address match",
            }),
        }
    }

    fn set_rx_phase(&mut self, phase: RxPhase) {
        if let Some(Exchange::Rx(current)) = &mut self.outstanding {
            *current = phase;
        }
    }

    // ------------------------------------------------------------------
    // RSSI and CCA exchanges
    // ------------------------------------------------------------------

    /// Measure RSSI at an instant and block for the result.
    ///
    /// A single request/response pair; the reevaluation sub-protocol does
    /// not apply to this exchange kind.
    pub fn measure_rssi(&mut self, request: &RssiRequest) -> Result<RssiResult, DeviceError> {
        self.begin(Exchange::Rssi)?;
        debug!(meas_time = request.meas_time, "rssi request");
        let res = (|| {
            transport::send_message(&mut self.transport, header::RSSI_MEASURE, &request.encode())?;
            let header = transport::recv_header(&mut self.transport)?;
            self.read_terminal(header, header::RSSI_END, "waiting for rssi result")
        })();
        self.conclude(res)
    }

    /// Run a clear-channel assessment and block for the result.
    ///
    /// The request's stop condition only affects when the phy ends its scan;
    /// the device side just awaits the terminal record.
    pub fn assess_channel(&mut self, request: &CcaRequest) -> Result<CcaResult, DeviceError> {
        self.begin(Exchange::Cca)?;
        debug!(
            start_time = request.start_time,
            scan_duration = request.scan_duration,
            "cca request"
        );
        let res = (|| {
            transport::send_message(&mut self.transport, header::CCA_MEASURE, &request.encode())?;
            let mut abort = request.abort;
            let header =
                reeval::await_response(&mut self.transport, &mut *self.strategy, &mut abort)?;
            self.read_terminal(header, header::CCA_END, "waiting for cca result")
        })();
        self.conclude(res)
    }

    // ------------------------------------------------------------------
    // Wait exchange
    // ------------------------------------------------------------------

    /// Ask the phy to advance simulated time and block until it reports
    /// having reached `end_time`.
    pub fn advance_time(&mut self, end_time: SimTime) -> Result<(), DeviceError> {
        self.begin(Exchange::Wait)?;
        let res = self
            .send_wait(end_time)
            .and_then(|()| self.finish_wait());
        self.conclude(res)
    }

    /// Send a time-advance request and return immediately.
    ///
    /// Call [`Connection::pickup_wait`] to block for the phy's response.
    /// Useful when other devices or processes need to act while time
    /// advances.
    pub fn advance_time_nowait(&mut self, end_time: SimTime) -> Result<(), DeviceError> {
        self.begin(Exchange::Wait)?;
        let res = self.send_wait(end_time);
        if res.is_err() {
            return self.conclude(res);
        }
        Ok(())
    }

    /// Block until a wait started with [`Connection::advance_time_nowait`]
    /// completes.
    pub fn pickup_wait(&mut self) -> Result<(), DeviceError> {
        if !matches!(self.outstanding, Some(Exchange::Wait)) {
            return Err(UsageError::NoMatchingExchange { expected: "Wait" }.into());
        }
        let res = self.finish_wait();
        self.conclude(res)
    }

    fn send_wait(&mut self, end_time: SimTime) -> Result<(), DeviceError> {
        debug!(end_time, "wait request");
        let request = WaitRequest { end_time };
        transport::send_message(&mut self.transport, header::WAIT, &request.encode())?;
        Ok(())
    }

    fn finish_wait(&mut self) -> Result<(), DeviceError> {
        match transport::recv_header(&mut self.transport)? {
            header::WAIT_END => Ok(()),
            header::DISCONNECT => Err(DeviceError::SessionEnded),
            other => Err(DeviceError::UnexpectedHeader {
                header: other,
                context: "waiting for wait end",
            }),
        }
    }

    // ------------------------------------------------------------------
    // State machine plumbing
    // ------------------------------------------------------------------

    /// Guard the start of an exchange: connected, nothing outstanding.
    fn begin(&mut self, exchange: Exchange) -> Result<(), DeviceError> {
        if self.state != LinkState::Connected {
            return Err(DeviceError::NotConnected);
        }
        if let Some(current) = &self.outstanding {
            return Err(UsageError::ExchangeOutstanding(current.kind()).into());
        }
        self.outstanding = Some(exchange);
        Ok(())
    }

    /// Close out an exchange, invalidating the connection on fatal errors.
    fn conclude<R>(&mut self, res: Result<R, DeviceError>) -> Result<R, DeviceError> {
        match &res {
            Ok(_) => {
                self.outstanding = None;
            }
            Err(DeviceError::Usage(_)) => {
                // caller bug; the exchange (if any) is still intact
            }
            Err(DeviceError::Io(_)) => {
                self.outstanding = None;
                self.state = LinkState::Disconnected;
            }
            Err(DeviceError::SessionEnded) => {
                debug!("phy ended the session");
                self.outstanding = None;
                self.state = LinkState::Disconnected;
                self.transport.shutdown();
            }
            Err(e) => {
                // remote fault (unexpected header, malformed record, or a
                // packet we must not truncate): orderly disconnect
                warn!(error = %e, "protocol violation, disconnecting");
                self.outstanding = None;
                self.state = LinkState::Disconnected;
                let _ = transport::send_header(&mut self.transport, header::DISCONNECT);
                self.transport.shutdown();
            }
        }
        res
    }

    /// Read the expected terminal record, mapping Disconnect and anything
    /// unexpected to their respective errors.
    fn read_terminal<R: Record>(
        &mut self,
        got: u32,
        want: u32,
        context: &'static str,
    ) -> Result<R, DeviceError> {
        if got == want {
            transport::recv_record(&mut self.transport)
        } else if got == header::DISCONNECT {
            Err(DeviceError::SessionEnded)
        } else {
            Err(DeviceError::UnexpectedHeader {
                header: got,
                context,
            })
        }
    }
}
