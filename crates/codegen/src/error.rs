//! Generation errors

use thiserror::Error;

use crate::inspector::IllegalParameter;

/// Generation-time failure; nothing is emitted when one occurs
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    /// Contract (or parent) not present in the catalog
    #[error("unknown contract '{name}'")]
    UnknownContract { name: String },

    /// A contract is its own ancestor
    #[error("inheritance cycle: {}", path.join(" -> "))]
    InheritanceCycle { path: Vec<String> },

    /// Qualified name declared twice
    #[error("contract '{name}' is declared more than once")]
    DuplicateContract { name: String },

    /// Two contracts would emit the same Rust item name
    #[error("contracts '{first}' and '{second}' both generate item '{ident}'")]
    DuplicateTypeName {
        ident: String,
        first: String,
        second: String,
    },

    /// Method name declared twice in one contract
    #[error("method '{method}' is declared more than once in '{contract}'")]
    DuplicateMethod { contract: String, method: String },

    /// Two parameters map to the same Rust identifier
    #[error("parameter '{param}' of {contract}.{method} collides with another parameter")]
    DuplicateParam {
        contract: String,
        method: String,
        param: String,
    },

    /// Parameter name uses the protocol prefix `__`
    #[error("parameter '{param}' of {contract}.{method} uses the reserved '__' prefix")]
    ReservedParamName {
        contract: String,
        method: String,
        param: String,
    },

    /// Name cannot become a Rust identifier
    #[error("'{name}' in '{contract}' is not a valid identifier")]
    InvalidIdentifier { contract: String, name: String },

    /// Referenced type is not a Rust path
    #[error("parameter '{param}' of {contract}.{method} has invalid type '{path}'")]
    InvalidTypePath {
        contract: String,
        method: String,
        param: String,
        path: String,
    },

    /// `by-ordinal` hint on a parameter that is not an enumeration
    #[error("parameter '{param}' of {contract}.{method} is '{ty}', by-ordinal requires an enum")]
    OrdinalOnNonEnum {
        contract: String,
        method: String,
        param: String,
        ty: String,
    },

    /// `by-ordinal` hint on an optional parameter
    #[error("parameter '{param}' of {contract}.{method} cannot be both optional and by-ordinal")]
    OptionalOrdinal {
        contract: String,
        method: String,
        param: String,
    },

    /// Inspector rejected one or more parameters
    #[error("illegal parameters: {}", join_illegal(.0))]
    IllegalParameters(Vec<IllegalParameter>),
}

fn join_illegal(params: &[IllegalParameter]) -> String {
    params
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl GenerationError {
    pub fn unknown_contract(name: impl Into<String>) -> Self {
        Self::UnknownContract { name: name.into() }
    }
}
