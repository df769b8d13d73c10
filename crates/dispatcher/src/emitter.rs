//! PayloadEmitter - emitter side of a generated adapter

use std::fmt;

use contracts::{MethodId, Payload, Sink};
use tracing::trace;

/// Stamps discriminators on encoded calls and forwards them to a sink
///
/// Every generated emitter owns exactly one of these.
pub struct PayloadEmitter {
    contract: &'static str,
    sink: Box<dyn Sink>,
}

impl PayloadEmitter {
    pub fn new(contract: &'static str, sink: Box<dyn Sink>) -> Self {
        Self { contract, sink }
    }

    /// Qualified name of the bound contract
    pub fn contract(&self) -> &'static str {
        self.contract
    }

    /// Send one encoded call
    ///
    /// `args` holds the parameters only; `__class_name` and `__method_id`
    /// are added here.
    pub fn emit(&self, method_id: MethodId, mut args: Payload) {
        let params = args.len();
        args.set_discriminators(self.contract, method_id);

        trace!(contract = self.contract, method_id, params, "Emitting payload");
        observability::record_payload_emitted(self.contract);

        self.sink.send(args);
    }
}

impl fmt::Debug for PayloadEmitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PayloadEmitter")
            .field("contract", &self.contract)
            .finish_non_exhaustive()
    }
}
