//! Message header constants
//!
//! Every message on the device-phy channel starts with a 32-bit
//! little-endian header identifying the record (if any) that follows.
//! The device→phy and phy→device value spaces are disjoint except for
//! [`DISCONNECT`], which either side may send to end the session.

/// Wire size of a message header in bytes
pub const SIZE: usize = 4;

// Device → phy

/// Advance simulated time up to the requested instant
pub const WAIT: u32 = 0x01;
/// The device will transmit; a `TxRequest` and the packet payload follow
pub const TX: u32 = 0x02;
/// The device wants to attempt to receive; an `RxRequest` follows
pub const RX: u32 = 0x11;
/// Continue receiving: the device accepts the matched address and headers
pub const RX_CONTINUE: u32 = 0x12;
/// Stop reception: the device rejects the packet, the phy ends the Rx
pub const RX_STOP: u32 = 0x13;
/// Do an RSSI measurement; an `RssiRequest` follows
pub const RSSI_MEASURE: u32 = 0x14;
/// The device answers an abort reevaluation; a new `AbortSchedule` follows
pub const NEW_ABORT: u32 = 0x15;
/// Do a CCA check; a `CcaRequest` follows
pub const CCA_MEASURE: u32 = 0x32;
/// Orderly end-of-session request; the phy acknowledges with `DISCONNECT`
pub const TERMINATE: u32 = 0xFFFE;

// Phy → device

/// The requested wait time was reached (no record body)
pub const WAIT_END: u32 = 0x81;
/// Tx completed; a `TxResult` follows
pub const TX_END: u32 = 0x100;
/// The phy pokes the device to reconsider its abort time
pub const ABORT_REEVALUATE: u32 = 0x101;
/// Matching address found while scanning; an `RxResult` and payload follow
pub const RX_ADDRESS_FOUND: u32 = 0x102;
/// Rx completed (successfully or not); an `RxResult` follows
pub const RX_END: u32 = 0x103;
/// RSSI measurement completed; an `RssiResult` follows
pub const RSSI_END: u32 = 0x104;
/// CCA check completed; a `CcaResult` follows
pub const CCA_END: u32 = 0x114;

/// Session end sentinel, distinct from every exchange header.
/// Sent by either side; no record body.
pub const DISCONNECT: u32 = 0xFFFF;

/// Human-readable header name for log messages
pub fn name(header: u32) -> &'static str {
    match header {
        WAIT => "Wait",
        TX => "Tx",
        RX => "Rx",
        RX_CONTINUE => "RxContinue",
        RX_STOP => "RxStop",
        RSSI_MEASURE => "RssiMeasure",
        NEW_ABORT => "NewAbort",
        CCA_MEASURE => "CcaMeasure",
        TERMINATE => "Terminate",
        WAIT_END => "WaitEnd",
        TX_END => "TxEnd",
        ABORT_REEVALUATE => "AbortReevaluate",
        RX_ADDRESS_FOUND => "RxAddressFound",
        RX_END => "RxEnd",
        RSSI_END => "RssiEnd",
        CCA_END => "CcaEnd",
        DISCONNECT => "Disconnect",
        _ => "unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headers_are_distinct() {
        let all = [
            WAIT,
            TX,
            RX,
            RX_CONTINUE,
            RX_STOP,
            RSSI_MEASURE,
            NEW_ABORT,
            CCA_MEASURE,
            TERMINATE,
            WAIT_END,
            TX_END,
            ABORT_REEVALUATE,
            RX_ADDRESS_FOUND,
            RX_END,
            RSSI_END,
            CCA_END,
            DISCONNECT,
        ];
        for (i, a) in all.iter().enumerate() {
            for b in &all[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_known_names() {
        assert_eq!(name(TX), "Tx");
        assert_eq!(name(RX_ADDRESS_FOUND), "RxAddressFound");
        assert_eq!(name(0xDEAD), "unknown");
    }
}
