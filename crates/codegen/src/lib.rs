//! # Codegen
//!
//! Generation-time half of the channel adapters.
//!
//! Responsibilities:
//! - Flatten contract inheritance into numbered method tables
//! - Vet parameters through a pluggable `Inspector`
//! - Emit Rust source for contract traits, emitters, dispatchers and the
//!   adapter registration hook
//!
//! # Example
//!
//! ```no_run
//! use codegen::{Generator, WireTypeInspector};
//! use contracts::{ContractDescriptor, MethodDescriptor, ParamDescriptor, ParamType};
//! use std::path::Path;
//!
//! let bar = ContractDescriptor::new("demo.Bar").method(
//!     MethodDescriptor::new("stringParam")
//!         .param(ParamDescriptor::new("aString", ParamType::String)),
//! );
//!
//! let unit = Generator::new()
//!     .with_inspector(WireTypeInspector)
//!     .generate(&[bar])
//!     .unwrap();
//! unit.write_to(Path::new("channels.rs")).unwrap();
//! ```

mod error;
mod generator;
mod inspector;
mod model;
pub mod naming;

pub use error::GenerationError;
pub use generator::{
    GeneratedContract, GeneratedUnit, Generator, DEFAULT_RUNTIME_CRATE, GENERATED_HEADER,
};
pub use inspector::{IllegalParameter, InspectedParam, Inspector, WireTypeInspector};
pub use model::{ContractMethod, ContractModel, ContractParam};
