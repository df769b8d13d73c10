//! Reference pipes
//!
//! Concrete transports pairing a `Sink` on one side with a `DispatchTarget`
//! on the other. Contains QueuedPipe, DatagramSink/Receiver, ActionPipe and
//! LogSink.

mod action;
mod datagram;
mod log;
mod queued;

pub use self::action::{ActionEnvelope, ActionPipe, ActionSink, CUSTOM_ACTION, SESSION_EVENT};
pub use self::datagram::{
    decode_payload, encode_payload, DatagramConfig, DatagramReceiver, DatagramSink, WireFormat,
};
pub use self::log::LogSink;
pub use self::queued::{QueuedPipe, QueuedSink};
