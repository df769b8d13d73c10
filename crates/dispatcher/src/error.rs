//! Dispatcher error types

use thiserror::Error;

/// Adapter lookup failure
///
/// Configuration fault: surfaced to the caller requesting an adapter, never
/// retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    /// No generated adapter registered for the contract
    #[error("no generated adapter registered for contract '{contract}'")]
    NotRegistered { contract: String },

    /// Adapter exists but was generated for another contract type
    #[error("adapter for '{contract}' takes {registered}, requested with {requested}")]
    ArgumentMismatch {
        contract: String,
        requested: &'static str,
        registered: &'static str,
    },

    /// Contract registered twice
    #[error("contract '{contract}' is already registered")]
    DuplicateRegistration { contract: String },
}

impl LookupError {
    /// Create a not-registered error
    pub fn not_registered(contract: impl Into<String>) -> Self {
        Self::NotRegistered {
            contract: contract.into(),
        }
    }
}

/// Pipe errors
#[derive(Debug, Error)]
pub enum PipeError {
    /// Payload could not be serialized
    #[error("failed to encode payload: {message}")]
    Encode { message: String },

    /// Received bytes are not a payload
    #[error("failed to decode payload: {message}")]
    Decode { message: String },

    /// Invalid pipe parameters
    #[error("invalid pipe config: {message}")]
    Config { message: String },

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl PipeError {
    pub fn encode(message: impl Into<String>) -> Self {
        Self::Encode {
            message: message.into(),
        }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}
