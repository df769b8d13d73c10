//! Decode error definitions
//!
//! Raised while reading parameters back out of a [`crate::Payload`].

use thiserror::Error;

/// A single value could not be converted to the requested type
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValueError {
    /// The value holds a different wire type
    #[error("expected {expected}, found {found}")]
    WrongType {
        expected: &'static str,
        found: &'static str,
    },

    /// Enumeration encoded by name, but the name is unknown
    #[error("`{variant}` is not a variant of {enum_name}")]
    UnknownVariant {
        enum_name: &'static str,
        variant: String,
    },

    /// Enumeration encoded by ordinal, but the ordinal has no variant
    #[error("ordinal {ordinal} is out of range for {enum_name}")]
    OrdinalOutOfRange { enum_name: &'static str, ordinal: i64 },
}

impl ValueError {
    /// Create a wrong type error
    pub fn wrong_type(expected: &'static str, found: &'static str) -> Self {
        Self::WrongType { expected, found }
    }
}

/// Malformed payload fault surfaced at the dispatch call
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    /// Expected key is absent
    #[error("payload has no entry for key '{key}'")]
    MissingKey { key: String },

    /// Key is present but its value cannot be decoded
    #[error("invalid value for key '{key}': {source}")]
    InvalidValue {
        key: String,
        #[source]
        source: ValueError,
    },
}

impl DecodeError {
    /// Create missing key error
    pub fn missing_key(key: impl Into<String>) -> Self {
        Self::MissingKey { key: key.into() }
    }

    /// Create invalid value error
    pub fn invalid_value(key: impl Into<String>, source: ValueError) -> Self {
        Self::InvalidValue {
            key: key.into(),
            source,
        }
    }

    /// Key the fault refers to
    pub fn key(&self) -> &str {
        match self {
            Self::MissingKey { key } | Self::InvalidValue { key, .. } => key,
        }
    }
}
