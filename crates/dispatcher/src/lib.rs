//! # Dispatcher
//!
//! Runtime half of the generated channel adapters.
//!
//! Responsibilities:
//! - Stamp discriminators and hand payloads to a `Sink` (emitter side)
//! - Route payloads to a weakly-held receiver through a per-contract table
//! - Multiplex several contracts over one payload stream
//! - Look up generated adapters without name-based discovery
//!
//! Generated code refers to this crate only, every wire type it needs is
//! re-exported here.

pub mod dispatcher;
pub mod emitter;
pub mod error;
pub mod merge;
pub mod metrics;
pub mod pipes;
pub mod registry;
pub mod table;

pub use contracts::{
    ChannelEnum, DecodeError, DispatchTarget, FromValue, IntoValue, MethodId, Payload, Sink,
    Value,
};
pub use dispatcher::ContractDispatcher;
pub use emitter::PayloadEmitter;
pub use error::{LookupError, PipeError};
pub use merge::{merge, CompositeDispatcher};
pub use metrics::{DispatchMetrics, DispatchSnapshot, PipeMetrics, PipeSnapshot};
pub use pipes::{
    ActionEnvelope, ActionPipe, ActionSink, DatagramConfig, DatagramReceiver, DatagramSink,
    LogSink, QueuedPipe, QueuedSink, WireFormat,
};
pub use registry::{new_dispatcher, new_emitter, AdapterRegistry, Contract};
pub use table::{DispatchTable, Invoker, MethodEntry};
