use nexus_config::MAX_EVENT_DATA_SIZE;
use nexus_core::{Address, Event, EventKind, GasEventData, SystemEventKind};
use tracing::{debug, trace};

use super::ExecutionEngine;
use crate::error::{RuntimeError, RuntimeResult};

impl<'a> ExecutionEngine<'a> {
    /// Appends an event raised by the current context.
    ///
    /// Kinds reserved for a system contract are only accepted from that
    /// contract. Gas and block kinds update the engine's state before the
    /// event is recorded; a rejected event leaves both the log and the state
    /// untouched.
    pub fn notify(
        &mut self,
        kind: impl Into<EventKind>,
        address: Address,
        data: Vec<u8>,
    ) -> RuntimeResult<()> {
        let kind = kind.into();
        let contract = self.current.name().to_string();

        if let Some(owner) = kind.owning_contract() {
            if owner != contract {
                return Err(RuntimeError::assertion(format!(
                    "event {kind} can only be raised by {owner}, not {contract}"
                )));
            }
        }
        if data.len() > MAX_EVENT_DATA_SIZE {
            return Err(RuntimeError::assertion(format!(
                "event data of {} bytes exceeds {MAX_EVENT_DATA_SIZE}",
                data.len()
            )));
        }

        match kind {
            EventKind::Known(SystemEventKind::GasEscrow) => {
                let escrow = GasEventData::decode(&data)?;
                if escrow.price < self.env.settings.min_gas_fee {
                    return Err(RuntimeError::assertion(format!(
                        "gas price {} is below the minimum of {}",
                        escrow.price, self.env.settings.min_gas_fee
                    )));
                }
                self.gas.set_escrow(escrow.amount, escrow.price, escrow.address);
                debug!(
                    payer = %address,
                    target = %escrow.address,
                    price = escrow.price,
                    limit = escrow.amount,
                    "gas escrowed"
                );
            }
            EventKind::Known(SystemEventKind::GasPayment) => {
                let payment = GasEventData::decode(&data)?;
                self.gas.record_payment(payment.amount, payment.address);
                debug!(payer = %address, amount = payment.amount, "gas paid");
            }
            EventKind::Known(SystemEventKind::BlockCreate | SystemEventKind::BlockClose) => {
                self.block_operation = true;
                self.gas.set_used(0);
            }
            _ => {}
        }

        trace!(%kind, %address, contract = %contract, "event raised");
        self.events.push(Event::new(kind, address, contract, data));
        Ok(())
    }
}
