//! Request and result records
//!
//! One request/result pair per exchange kind, plus the abort schedule every
//! request embeds. Layouts are fixed-width and packed: encoding writes each
//! field in declaration order, little-endian, with no padding. A record is
//! immutable once sent; results are populated by decoding the exact number
//! of bytes the phy sends back.

use crate::error::WireError;
use crate::units::{Frequency, Power, RssiPower};
use crate::Modulation;
use crate::SimTime;

/// A fixed-layout record that can be sent or received verbatim
pub trait Record: Sized {
    /// Encoded size in bytes
    const SIZE: usize;

    /// Encode to wire bytes
    fn encode(&self) -> Vec<u8>;

    /// Decode from exactly [`Record::SIZE`] wire bytes
    fn decode(bytes: &[u8]) -> Result<Self, WireError>;
}

/// Field-by-field little-endian writer
struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    fn new(size: usize) -> Self {
        Writer {
            buf: Vec::with_capacity(size),
        }
    }

    fn u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn u16(&mut self, v: u16) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn i16(&mut self, v: i16) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn i32(&mut self, v: i32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn finish(self, expected: usize) -> Vec<u8> {
        debug_assert_eq!(self.buf.len(), expected);
        self.buf
    }
}

/// Field-by-field little-endian reader over a length-checked slice
struct Reader<'a> {
    buf: &'a [u8],
}

impl<'a> Reader<'a> {
    fn new(buf: &'a [u8], expected: usize) -> Result<Self, WireError> {
        if buf.len() != expected {
            return Err(WireError::Length {
                expected,
                got: buf.len(),
            });
        }
        Ok(Reader { buf })
    }

    fn bytes<const N: usize>(&mut self) -> [u8; N] {
        let (head, rest) = self.buf.split_at(N);
        self.buf = rest;
        let mut out = [0u8; N];
        out.copy_from_slice(head);
        out
    }

    fn u8(&mut self) -> u8 {
        self.bytes::<1>()[0]
    }

    fn u16(&mut self) -> u16 {
        u16::from_le_bytes(self.bytes())
    }

    fn i16(&mut self) -> i16 {
        i16::from_le_bytes(self.bytes())
    }

    fn u32(&mut self) -> u32 {
        u32::from_le_bytes(self.bytes())
    }

    fn i32(&mut self) -> i32 {
        i32::from_le_bytes(self.bytes())
    }

    fn u64(&mut self) -> u64 {
        u64::from_le_bytes(self.bytes())
    }
}

/// When the device wants the phy to cut an exchange short
///
/// `abort_time` must lie strictly after the exchange's start time;
/// `recheck_time` is the instant at which the phy should poke the device to
/// reconsider. Either may be [`crate::TIME_NEVER`]. Only the device mutates
/// the schedule, via the abort-reevaluation sub-protocol.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AbortSchedule {
    /// The exchange is stopped abruptly at this instant
    pub abort_time: SimTime,
    /// When the phy should ask whether `abort_time` changed
    pub recheck_time: SimTime,
}

impl AbortSchedule {
    /// A schedule that never aborts and never asks again
    pub fn never() -> Self {
        AbortSchedule {
            abort_time: crate::TIME_NEVER,
            recheck_time: crate::TIME_NEVER,
        }
    }
}

impl Record for AbortSchedule {
    const SIZE: usize = 16;

    fn encode(&self) -> Vec<u8> {
        let mut w = Writer::new(Self::SIZE);
        w.u64(self.abort_time);
        w.u64(self.recheck_time);
        w.finish(Self::SIZE)
    }

    fn decode(bytes: &[u8]) -> Result<Self, WireError> {
        let mut r = Reader::new(bytes, Self::SIZE)?;
        Ok(AbortSchedule {
            abort_time: r.u64(),
            recheck_time: r.u64(),
        })
    }
}

/// Modulation and carrier frequency of a transmission or receiver
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RadioParams {
    /// Modulation identifier
    pub modulation: Modulation,
    /// Carrier frequency
    pub center_freq: Frequency,
}

impl RadioParams {
    fn write(&self, w: &mut Writer) {
        w.u16(self.modulation.0);
        w.i16(self.center_freq.0);
    }

    fn read(r: &mut Reader<'_>) -> Self {
        RadioParams {
            modulation: Modulation(r.u16()),
            center_freq: Frequency(r.i16()),
        }
    }
}

/// Request a transmission
///
/// The raw packet payload (`packet_size` bytes) follows the record on the
/// wire.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TxRequest {
    /// When the first bit of the packet reaches the air
    pub start_time: SimTime,
    /// When the last bit of the packet leaves the air
    pub end_time: SimTime,
    /// Abort schedule; `abort_time` must be > `start_time`
    pub abort: AbortSchedule,
    /// Phy address / access code used in the packet
    pub phy_address: u32,
    /// Modulation and carrier
    pub radio_params: RadioParams,
    /// Transmit power including antenna gain, in dBm
    pub power_level: Power,
    /// Packet size in bytes; only used for moving the payload
    pub packet_size: u16,
}

impl Record for TxRequest {
    const SIZE: usize = 44;

    fn encode(&self) -> Vec<u8> {
        let mut w = Writer::new(Self::SIZE);
        w.u64(self.start_time);
        w.u64(self.end_time);
        w.u64(self.abort.abort_time);
        w.u64(self.abort.recheck_time);
        w.u32(self.phy_address);
        self.radio_params.write(&mut w);
        w.i16(self.power_level.0);
        w.u16(self.packet_size);
        w.finish(Self::SIZE)
    }

    fn decode(bytes: &[u8]) -> Result<Self, WireError> {
        let mut r = Reader::new(bytes, Self::SIZE)?;
        Ok(TxRequest {
            start_time: r.u64(),
            end_time: r.u64(),
            abort: AbortSchedule {
                abort_time: r.u64(),
                recheck_time: r.u64(),
            },
            phy_address: r.u32(),
            radio_params: RadioParams::read(&mut r),
            power_level: Power(r.i16()),
            packet_size: r.u16(),
        })
    }
}

/// Result of a transmission
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TxResult {
    /// Absolute instant the phy sent this message
    pub end_time: SimTime,
}

impl Record for TxResult {
    const SIZE: usize = 8;

    fn encode(&self) -> Vec<u8> {
        let mut w = Writer::new(Self::SIZE);
        w.u64(self.end_time);
        w.finish(Self::SIZE)
    }

    fn decode(bytes: &[u8]) -> Result<Self, WireError> {
        let mut r = Reader::new(bytes, Self::SIZE)?;
        Ok(TxResult { end_time: r.u64() })
    }
}

/// Request a reception attempt
///
/// The receiver scans `[start_time, start_time + scan_duration - 1]` for a
/// preamble and address match; once matched it receives the whole packet
/// unless the device rejects it at address evaluation or a header error
/// occurs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RxRequest {
    /// When the receiver starts scanning
    pub start_time: SimTime,
    /// Scan window length in microseconds
    pub scan_duration: u32,
    /// Address we search for
    pub phy_address: u32,
    /// Modulation and carrier the receiver is configured for
    pub radio_params: RadioParams,
    /// Rx antenna gain, in dB
    pub antenna_gain: Power,
    /// Accepted bit errors before preamble+address sync is considered lost
    pub sync_threshold: u16,
    /// Accepted bit errors in the header before a header error is raised
    pub header_threshold: u16,
    /// Duration of the preamble and start flag, in microseconds
    pub pream_and_addr_duration: u16,
    /// Duration of the packet header, in microseconds
    pub header_duration: u16,
    /// Data rate in bits per second
    pub bps: u32,
    /// Abort schedule; `abort_time` must be > `start_time`
    pub abort: AbortSchedule,
}

impl Record for RxRequest {
    const SIZE: usize = 50;

    fn encode(&self) -> Vec<u8> {
        let mut w = Writer::new(Self::SIZE);
        w.u64(self.start_time);
        w.u32(self.scan_duration);
        w.u32(self.phy_address);
        self.radio_params.write(&mut w);
        w.i16(self.antenna_gain.0);
        w.u16(self.sync_threshold);
        w.u16(self.header_threshold);
        w.u16(self.pream_and_addr_duration);
        w.u16(self.header_duration);
        w.u32(self.bps);
        w.u64(self.abort.abort_time);
        w.u64(self.abort.recheck_time);
        w.finish(Self::SIZE)
    }

    fn decode(bytes: &[u8]) -> Result<Self, WireError> {
        let mut r = Reader::new(bytes, Self::SIZE)?;
        Ok(RxRequest {
            start_time: r.u64(),
            scan_duration: r.u32(),
            phy_address: r.u32(),
            radio_params: RadioParams::read(&mut r),
            antenna_gain: Power(r.i16()),
            sync_threshold: r.u16(),
            header_threshold: r.u16(),
            pream_and_addr_duration: r.u16(),
            header_duration: r.u16(),
            bps: r.u32(),
            abort: AbortSchedule {
                abort_time: r.u64(),
                recheck_time: r.u64(),
            },
        })
    }
}

/// Outcome of a reception
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RxStatus {
    /// Packet received correctly
    Ok,
    /// At least one bit error during header or payload
    PacketContentError,
    /// More header bit errors than the request's `header_threshold`
    HeaderError,
    /// Nothing was synchronized during the scan window
    NoSync,
    /// The reception is still ongoing (address-found partial result)
    InProgress,
}

impl RxStatus {
    fn as_u16(self) -> u16 {
        match self {
            RxStatus::Ok => 1,
            RxStatus::PacketContentError => 2,
            RxStatus::HeaderError => 3,
            RxStatus::NoSync => 4,
            RxStatus::InProgress => 5,
        }
    }

    fn from_u16(v: u16) -> Result<Self, WireError> {
        match v {
            1 => Ok(RxStatus::Ok),
            2 => Ok(RxStatus::PacketContentError),
            3 => Ok(RxStatus::HeaderError),
            4 => Ok(RxStatus::NoSync),
            5 => Ok(RxStatus::InProgress),
            other => Err(WireError::InvalidRxStatus(other)),
        }
    }
}

/// Result of a reception, both the address-found partial form and the final
/// form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RxResult {
    /// Reception outcome so far
    pub status: RxStatus,
    /// Size of the matched packet in bytes
    pub packet_size: u16,
    /// When the address ended, or when the scan window ended on no sync
    pub rx_time_stamp: SimTime,
    /// Absolute instant the phy sent this message
    pub end_time: SimTime,
    /// RSSI measured by the modem
    pub rssi: RssiPower,
}

impl Record for RxResult {
    const SIZE: usize = 24;

    fn encode(&self) -> Vec<u8> {
        let mut w = Writer::new(Self::SIZE);
        w.u16(self.status.as_u16());
        w.u16(self.packet_size);
        w.u64(self.rx_time_stamp);
        w.u64(self.end_time);
        w.i32(self.rssi.0);
        w.finish(Self::SIZE)
    }

    fn decode(bytes: &[u8]) -> Result<Self, WireError> {
        let mut r = Reader::new(bytes, Self::SIZE)?;
        Ok(RxResult {
            status: RxStatus::from_u16(r.u16())?,
            packet_size: r.u16(),
            rx_time_stamp: r.u64(),
            end_time: r.u64(),
            rssi: RssiPower(r.i32()),
        })
    }
}

/// Request an RSSI measurement
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RssiRequest {
    /// Absolute instant the measurement should be taken
    pub meas_time: SimTime,
    /// Modulation and carrier the receiver is configured for
    pub radio_params: RadioParams,
    /// Rx antenna gain, in dB
    pub antenna_gain: Power,
}

impl Record for RssiRequest {
    const SIZE: usize = 14;

    fn encode(&self) -> Vec<u8> {
        let mut w = Writer::new(Self::SIZE);
        w.u64(self.meas_time);
        self.radio_params.write(&mut w);
        w.i16(self.antenna_gain.0);
        w.finish(Self::SIZE)
    }

    fn decode(bytes: &[u8]) -> Result<Self, WireError> {
        let mut r = Reader::new(bytes, Self::SIZE)?;
        Ok(RssiRequest {
            meas_time: r.u64(),
            radio_params: RadioParams::read(&mut r),
            antenna_gain: Power(r.i16()),
        })
    }
}

/// Result of an RSSI measurement
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RssiResult {
    /// RSSI measured by the modem
    pub rssi: RssiPower,
}

impl Record for RssiResult {
    const SIZE: usize = 4;

    fn encode(&self) -> Vec<u8> {
        let mut w = Writer::new(Self::SIZE);
        w.i32(self.rssi.0);
        w.finish(Self::SIZE)
    }

    fn decode(bytes: &[u8]) -> Result<Self, WireError> {
        let mut r = Reader::new(bytes, Self::SIZE)?;
        Ok(RssiResult {
            rssi: RssiPower(r.i32()),
        })
    }
}

/// When the phy may end a CCA scan early
///
/// This only affects the phy's own scan termination; the device applies no
/// early-exit logic of its own.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StopCondition {
    /// Continue until the end of the scan window
    #[default]
    Never,
    /// Stop as soon as a compatible modulation is found over `mod_threshold`
    OnModulation,
    /// Stop as soon as any RSSI measurement is over `rssi_threshold`
    OnRssi,
    /// Stop on either condition
    OnEither,
}

impl StopCondition {
    fn as_u8(self) -> u8 {
        match self {
            StopCondition::Never => 0,
            StopCondition::OnModulation => 1,
            StopCondition::OnRssi => 2,
            StopCondition::OnEither => 3,
        }
    }

    fn from_u8(v: u8) -> Result<Self, WireError> {
        match v {
            0 => Ok(StopCondition::Never),
            1 => Ok(StopCondition::OnModulation),
            2 => Ok(StopCondition::OnRssi),
            3 => Ok(StopCondition::OnEither),
            other => Err(WireError::InvalidStopCondition(other)),
        }
    }
}

/// Request a clear-channel assessment
///
/// The phy does `ceil(scan_duration / scan_period)` measurements, one every
/// `scan_period` microseconds starting at `start_time`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CcaRequest {
    /// When the receiver starts measuring
    pub start_time: SimTime,
    /// Abort schedule; `abort_time` must be > `start_time`
    pub abort: AbortSchedule,
    /// Scan window length in microseconds
    pub scan_duration: u32,
    /// Interval between measurements in microseconds
    pub scan_period: u32,
    /// Modulation we search for and carrier the receiver is set to
    pub radio_params: RadioParams,
    /// Rx power over which a compatible transmitter counts as found
    pub mod_threshold: RssiPower,
    /// RSSI power over which energy detection counts as over threshold
    pub rssi_threshold: RssiPower,
    /// Rx antenna gain, in dB
    pub antenna_gain: Power,
    /// Whether the phy may end the scan before the window closes
    pub stop_when_found: StopCondition,
}

impl Record for CcaRequest {
    const SIZE: usize = 47;

    fn encode(&self) -> Vec<u8> {
        let mut w = Writer::new(Self::SIZE);
        w.u64(self.start_time);
        w.u64(self.abort.abort_time);
        w.u64(self.abort.recheck_time);
        w.u32(self.scan_duration);
        w.u32(self.scan_period);
        self.radio_params.write(&mut w);
        w.i32(self.mod_threshold.0);
        w.i32(self.rssi_threshold.0);
        w.i16(self.antenna_gain.0);
        w.u8(self.stop_when_found.as_u8());
        w.finish(Self::SIZE)
    }

    fn decode(bytes: &[u8]) -> Result<Self, WireError> {
        let mut r = Reader::new(bytes, Self::SIZE)?;
        Ok(CcaRequest {
            start_time: r.u64(),
            abort: AbortSchedule {
                abort_time: r.u64(),
                recheck_time: r.u64(),
            },
            scan_duration: r.u32(),
            scan_period: r.u32(),
            radio_params: RadioParams::read(&mut r),
            mod_threshold: RssiPower(r.i32()),
            rssi_threshold: RssiPower(r.i32()),
            antenna_gain: Power(r.i16()),
            stop_when_found: StopCondition::from_u8(r.u8())?,
        })
    }
}

/// Result of a clear-channel assessment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CcaResult {
    /// Absolute instant the phy sent this message
    pub end_time: SimTime,
    /// Averaged RSSI over all scan periods
    pub rssi_ave: RssiPower,
    /// Maximum RSSI over all scan periods
    pub rssi_max: RssiPower,
    /// Rx power of the strongest matching transmitter found, if any
    pub mod_rx_power: RssiPower,
    /// Whether a compatible transmitter over `mod_threshold` was found
    pub mod_found: bool,
    /// Whether the RSSI was ever over `rssi_threshold`
    pub rssi_overthreshold: bool,
}

impl Record for CcaResult {
    const SIZE: usize = 22;

    fn encode(&self) -> Vec<u8> {
        let mut w = Writer::new(Self::SIZE);
        w.u64(self.end_time);
        w.i32(self.rssi_ave.0);
        w.i32(self.rssi_max.0);
        w.i32(self.mod_rx_power.0);
        w.u8(self.mod_found as u8);
        w.u8(self.rssi_overthreshold as u8);
        w.finish(Self::SIZE)
    }

    fn decode(bytes: &[u8]) -> Result<Self, WireError> {
        let mut r = Reader::new(bytes, Self::SIZE)?;
        Ok(CcaResult {
            end_time: r.u64(),
            rssi_ave: RssiPower(r.i32()),
            rssi_max: RssiPower(r.i32()),
            mod_rx_power: RssiPower(r.i32()),
            mod_found: r.u8() != 0,
            rssi_overthreshold: r.u8() != 0,
        })
    }
}

/// Request the phy to advance simulated time
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WaitRequest {
    /// The instant to advance to
    pub end_time: SimTime,
}

impl Record for WaitRequest {
    const SIZE: usize = 8;

    fn encode(&self) -> Vec<u8> {
        let mut w = Writer::new(Self::SIZE);
        w.u64(self.end_time);
        w.finish(Self::SIZE)
    }

    fn decode(bytes: &[u8]) -> Result<Self, WireError> {
        let mut r = Reader::new(bytes, Self::SIZE)?;
        Ok(WaitRequest { end_time: r.u64() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TIME_NEVER;

    #[test]
    fn test_tx_request_layout() {
        let req = TxRequest {
            start_time: 0x0102030405060708,
            end_time: 0x1112131415161718,
            abort: AbortSchedule {
                abort_time: 0x2122232425262728,
                recheck_time: TIME_NEVER,
            },
            phy_address: 0xA1B2C3D4,
            radio_params: RadioParams {
                modulation: Modulation::BLE_1M,
                center_freq: Frequency(0x2800),
            },
            power_level: Power(-256),
            packet_size: 0x0014,
        };
        let bytes = req.encode();
        assert_eq!(bytes.len(), TxRequest::SIZE);
        // field offsets match the packed C layout
        assert_eq!(&bytes[0..8], &0x0102030405060708u64.to_le_bytes());
        assert_eq!(&bytes[8..16], &0x1112131415161718u64.to_le_bytes());
        assert_eq!(&bytes[16..24], &0x2122232425262728u64.to_le_bytes());
        assert_eq!(&bytes[24..32], &[0xFF; 8]); // recheck_time = TIME_NEVER
        assert_eq!(&bytes[32..36], &0xA1B2C3D4u32.to_le_bytes());
        assert_eq!(&bytes[36..38], &0x10u16.to_le_bytes()); // modulation
        assert_eq!(&bytes[38..40], &0x2800u16.to_le_bytes()); // center_freq
        assert_eq!(&bytes[40..42], &(-256i16).to_le_bytes());
        assert_eq!(&bytes[42..44], &20u16.to_le_bytes());
    }

    #[test]
    fn test_tx_request_roundtrip() {
        let req = TxRequest {
            start_time: 100,
            end_time: 200,
            abort: AbortSchedule {
                abort_time: 150,
                recheck_time: TIME_NEVER,
            },
            phy_address: 0x8E89BED6,
            radio_params: RadioParams {
                modulation: Modulation::BLE_1M,
                center_freq: Frequency::from_ble_channel(37).unwrap(),
            },
            power_level: Power::from_dbm(0.0),
            packet_size: 20,
        };
        assert_eq!(TxRequest::decode(&req.encode()).unwrap(), req);
    }

    #[test]
    fn test_record_sizes_match_packed_layout() {
        assert_eq!(AbortSchedule::SIZE, 16);
        assert_eq!(TxRequest::SIZE, 44);
        assert_eq!(TxResult::SIZE, 8);
        assert_eq!(RxRequest::SIZE, 50);
        assert_eq!(RxResult::SIZE, 24);
        assert_eq!(RssiRequest::SIZE, 14);
        assert_eq!(RssiResult::SIZE, 4);
        assert_eq!(CcaRequest::SIZE, 47);
        assert_eq!(CcaResult::SIZE, 22);
        assert_eq!(WaitRequest::SIZE, 8);
    }

    #[test]
    fn test_rx_result_decodes_raw_bytes() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&1u16.to_le_bytes()); // status Ok
        bytes.extend_from_slice(&20u16.to_le_bytes()); // packet_size
        bytes.extend_from_slice(&1520u64.to_le_bytes()); // rx_time_stamp
        bytes.extend_from_slice(&1540u64.to_le_bytes()); // end_time
        bytes.extend_from_slice(&(-60 * 65536i32).to_le_bytes()); // rssi

        let result = RxResult::decode(&bytes).unwrap();
        assert_eq!(result.status, RxStatus::Ok);
        assert_eq!(result.packet_size, 20);
        assert_eq!(result.rx_time_stamp, 1520);
        assert_eq!(result.end_time, 1540);
        assert!((result.rssi.to_dbm() + 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_rx_result_rejects_unknown_status() {
        let mut bytes = vec![0u8; RxResult::SIZE];
        bytes[0] = 9;
        assert_eq!(RxResult::decode(&bytes), Err(WireError::InvalidRxStatus(9)));
    }

    #[test]
    fn test_wrong_length_is_an_error() {
        let err = TxResult::decode(&[0u8; 7]).unwrap_err();
        assert_eq!(
            err,
            WireError::Length {
                expected: 8,
                got: 7
            }
        );
    }

    #[test]
    fn test_cca_roundtrip() {
        let req = CcaRequest {
            start_time: 5000,
            abort: AbortSchedule::never(),
            scan_duration: 128,
            scan_period: 16,
            radio_params: RadioParams {
                modulation: Modulation::IEEE802154_DSS,
                center_freq: Frequency::from_mhz(2425.0, true).unwrap(),
            },
            mod_threshold: RssiPower::from_dbm(-75.0),
            rssi_threshold: RssiPower::from_dbm(-70.0),
            antenna_gain: Power::from_dbm(1.5),
            stop_when_found: StopCondition::OnEither,
        };
        assert_eq!(CcaRequest::decode(&req.encode()).unwrap(), req);

        let res = CcaResult {
            end_time: 5128,
            rssi_ave: RssiPower::from_dbm(-82.0),
            rssi_max: RssiPower::from_dbm(-71.0),
            mod_rx_power: RssiPower::MIN,
            mod_found: false,
            rssi_overthreshold: true,
        };
        assert_eq!(CcaResult::decode(&res.encode()).unwrap(), res);
    }

    #[test]
    fn test_cca_rejects_unknown_stop_condition() {
        let mut bytes = CcaRequest::default().encode();
        bytes[CcaRequest::SIZE - 1] = 7;
        assert_eq!(
            CcaRequest::decode(&bytes),
            Err(WireError::InvalidStopCondition(7))
        );
    }
}
