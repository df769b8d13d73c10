//! # Contracts
//!
//! Frozen wire-level interface shared by generated emitters, dispatchers and
//! transports. All other crates depend on this crate, reverse dependencies
//! are prohibited.
//!
//! ## Wire model
//! - One method call travels as one [`Payload`]: an ordered key -> [`Value`] map
//! - `__class_name` names the contract, `__method_id` selects the method
//! - Every other key is a parameter name

mod descriptor;
mod enumeration;
mod error;
mod payload;
mod transport;
mod value;

pub use descriptor::*;
pub use enumeration::ChannelEnum;
pub use error::*;
pub use payload::{MethodId, Payload, KEY_CLASS_NAME, KEY_METHOD_ID, RESERVED_PREFIX};
pub use transport::{sink_fn, DispatchTarget, FnSink, Sink};
pub use value::{FromValue, IntoValue, Value};
