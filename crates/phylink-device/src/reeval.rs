//! Abort-reevaluation interceptor
//!
//! While an exchange waits for its terminal record, the phy may interleave
//! any number of "reevaluate your abort time" pokes. This loop is the one
//! piece of interleaving logic in the whole protocol and is shared by the
//! Tx, Rx and CCA engines.

use tracing::debug;

use phylink_wire::{header, AbortSchedule, Record};

use crate::error::DeviceError;
use crate::strategy::DecisionStrategy;
use crate::transport::{self, Transport};

/// Read records until something other than an abort-reevaluation poke
/// arrives, answering each poke from the strategy.
///
/// `schedule` is the abort schedule currently in force; the strategy mutates
/// it in place and the updated schedule is sent back as a NewAbort record.
/// Returns the first non-reevaluation header observed.
pub(crate) fn await_response<T: Transport + ?Sized>(
    transport: &mut T,
    strategy: &mut dyn DecisionStrategy,
    schedule: &mut AbortSchedule,
) -> Result<u32, DeviceError> {
    loop {
        let header = transport::recv_header(transport)?;
        if header != header::ABORT_REEVALUATE {
            return Ok(header);
        }
        strategy.reevaluate_abort(schedule);
        debug!(
            abort_time = schedule.abort_time,
            recheck_time = schedule.recheck_time,
            "answering abort reevaluation"
        );
        transport::send_message(transport, header::NEW_ABORT, &schedule.encode())?;
    }
}
