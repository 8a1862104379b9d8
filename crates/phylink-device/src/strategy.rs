//! Mid-exchange decisions delegated to the caller
//!
//! Two decisions can be requested while an exchange is in flight: "what is
//! your abort schedule now" (the abort-reevaluation sub-protocol) and "do
//! you accept this packet" (the Rx address-evaluation sub-phase). Both are
//! delegated to a [`DecisionStrategy`] injected into the connection, so a
//! single engine serves both hands-off devices and devices that model
//! reception decisions in detail.

use phylink_wire::{AbortSchedule, RxResult, TIME_NEVER};

/// Caller-supplied policy consulted in the middle of exchanges
pub trait DecisionStrategy {
    /// The phy asked whether the abort time should change.
    ///
    /// Called with the schedule currently in force, at simulated time
    /// `schedule.recheck_time`. Mutate it in place; the updated schedule is
    /// sent back to the phy verbatim.
    fn reevaluate_abort(&mut self, schedule: &mut AbortSchedule);

    /// A packet with a matching address is being received; decide whether to
    /// keep receiving it.
    ///
    /// `partial` is the address-found partial result and `packet` the packet
    /// bytes read so far. Returning `false` makes the phy stop this
    /// reception. Called at most once per Rx exchange.
    fn accept_packet(&mut self, partial: &RxResult, packet: &[u8]) -> bool {
        let _ = (partial, packet);
        true
    }
}

/// Strategy for devices that never revise their abort time: leaves the
/// schedule as requested, declines future reevaluation offers, and accepts
/// every packet.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultStrategy;

impl DecisionStrategy for DefaultStrategy {
    fn reevaluate_abort(&mut self, schedule: &mut AbortSchedule) {
        schedule.recheck_time = TIME_NEVER;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_strategy_declines_further_rechecks() {
        let mut strategy = DefaultStrategy;
        let mut schedule = AbortSchedule {
            abort_time: 2000,
            recheck_time: 1500,
        };
        strategy.reevaluate_abort(&mut schedule);
        assert_eq!(schedule.abort_time, 2000);
        assert_eq!(schedule.recheck_time, TIME_NEVER);
    }

    #[test]
    fn test_default_strategy_accepts_packets() {
        let mut strategy = DefaultStrategy;
        let partial = RxResult {
            status: phylink_wire::RxStatus::InProgress,
            packet_size: 3,
            rx_time_stamp: 10,
            end_time: 10,
            rssi: phylink_wire::RssiPower::MIN,
        };
        assert!(strategy.accept_packet(&partial, b"abc"));
    }
}
