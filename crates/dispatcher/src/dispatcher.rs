//! ContractDispatcher - receiving side of a generated adapter

use std::fmt;
use std::sync::{Arc, Weak};

use contracts::{DecodeError, DispatchTarget, Payload};
use observability::DispatchOutcome;
use tracing::{debug, trace, warn};

use crate::metrics::DispatchMetrics;
use crate::registry::Contract;
use crate::table::DispatchTable;

/// Routes payloads of one contract to a weakly-held receiver
///
/// The dispatcher never keeps the receiver alive. Each dispatch upgrades the
/// handle once; the receiver then stays valid for the whole call, or the
/// payload is ignored.
pub struct ContractDispatcher<R: ?Sized + 'static> {
    table: &'static DispatchTable<R>,
    receiver: Weak<R>,
    metrics: Arc<DispatchMetrics>,
}

impl<R: Contract + ?Sized> ContractDispatcher<R> {
    /// Bind the generated table of `R` to `receiver`
    pub fn new(receiver: &Arc<R>) -> Self {
        Self::with_table(R::dispatch_table(), receiver)
    }
}

impl<R: ?Sized + 'static> ContractDispatcher<R> {
    /// Bind an explicit table to `receiver`
    pub fn with_table(table: &'static DispatchTable<R>, receiver: &Arc<R>) -> Self {
        Self {
            table,
            receiver: Arc::downgrade(receiver),
            metrics: Arc::new(DispatchMetrics::new()),
        }
    }

    /// Qualified name of the bound contract
    pub fn contract(&self) -> &'static str {
        self.table.contract()
    }

    pub fn table(&self) -> &'static DispatchTable<R> {
        self.table
    }

    /// Whether the receiver is still alive
    pub fn is_alive(&self) -> bool {
        self.receiver.strong_count() > 0
    }

    pub fn metrics(&self) -> &Arc<DispatchMetrics> {
        &self.metrics
    }

    fn record(&self, outcome: DispatchOutcome) {
        match outcome {
            DispatchOutcome::Delivered => self.metrics.inc_delivered(),
            DispatchOutcome::Unmatched => self.metrics.inc_unmatched(),
            DispatchOutcome::Expired => self.metrics.inc_expired(),
            DispatchOutcome::Fault => self.metrics.inc_faults(),
        }
        observability::record_dispatch(self.contract(), outcome);
    }
}

impl<R: ?Sized + Send + Sync + 'static> DispatchTarget for ContractDispatcher<R> {
    fn matches(&self, payload: &Payload) -> bool {
        payload.class_name() == Some(self.table.contract())
    }

    /// Outcomes in order: contract mismatch, unreadable method id, expired
    /// receiver, unknown method id, then delivery.
    ///
    /// The method id is read before the receiver is upgraded, so an expired
    /// dispatcher still fails on a matching payload whose `__method_id` is
    /// missing or not an int. Every other payload gives `Ok(false)` once the
    /// receiver is gone.
    fn dispatch(&self, payload: &Payload) -> Result<bool, DecodeError> {
        if !self.matches(payload) {
            return Ok(false);
        }

        let contract = self.contract();

        let method_id = match payload.method_id() {
            Ok(id) => id,
            Err(e) => {
                self.record(DispatchOutcome::Fault);
                warn!(contract, error = %e, "Payload without usable method id");
                return Err(e);
            }
        };

        let Some(receiver) = self.receiver.upgrade() else {
            self.record(DispatchOutcome::Expired);
            trace!(contract, "Receiver released, payload ignored");
            return Ok(false);
        };

        let Some(entry) = method_id.and_then(|id| self.table.lookup(id)) else {
            self.record(DispatchOutcome::Unmatched);
            debug!(contract, method_id = ?method_id, "Unrecognized method id");
            return Ok(false);
        };

        match entry.invoke(&receiver, payload) {
            Ok(()) => {
                self.record(DispatchOutcome::Delivered);
                trace!(contract, method = entry.name(), "Payload dispatched");
                Ok(true)
            }
            Err(e) => {
                self.record(DispatchOutcome::Fault);
                warn!(contract, method = entry.name(), error = %e, "Malformed payload");
                Err(e)
            }
        }
    }
}

impl<R: ?Sized + 'static> Clone for ContractDispatcher<R> {
    fn clone(&self) -> Self {
        Self {
            table: self.table,
            receiver: Weak::clone(&self.receiver),
            metrics: Arc::clone(&self.metrics),
        }
    }
}

impl<R: ?Sized + 'static> fmt::Debug for ContractDispatcher<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContractDispatcher")
            .field("contract", &self.contract())
            .field("alive", &self.is_alive())
            .finish()
    }
}
