//! Parameter inspection
//!
//! An [`Inspector`] vets every parameter of every contract before anything
//! is emitted. Rejected parameters are collected and reported together.

use std::fmt;

use contracts::{MarshalHint, ParamType};

/// Parameter as seen by an inspector
#[derive(Debug, Clone, Copy)]
pub struct InspectedParam<'a> {
    /// Qualified name of the declaring contract
    pub contract: &'a str,
    pub method: &'a str,
    /// Declared (wire) name
    pub name: &'a str,
    pub ty: &'a ParamType,
    pub marshal: MarshalHint,
    pub optional: bool,
}

/// Generation-time parameter policy
pub trait Inspector {
    /// Whether the parameter must be rejected
    fn is_illegal(&self, param: &InspectedParam<'_>) -> bool;
}

impl<F> Inspector for F
where
    F: Fn(&InspectedParam<'_>) -> bool,
{
    fn is_illegal(&self, param: &InspectedParam<'_>) -> bool {
        self(param)
    }
}

/// Accepts only wire primitives, strings and enumerations
///
/// Rejects `other` types, whose value codecs live outside the generated
/// code and cannot be checked here.
#[derive(Debug, Clone, Copy, Default)]
pub struct WireTypeInspector;

impl Inspector for WireTypeInspector {
    fn is_illegal(&self, param: &InspectedParam<'_>) -> bool {
        matches!(param.ty, ParamType::Other { .. })
    }
}

/// One rejected parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IllegalParameter {
    pub contract: String,
    pub method: String,
    pub param: String,
    pub ty: String,
}

impl IllegalParameter {
    pub fn from_inspected(param: &InspectedParam<'_>) -> Self {
        Self {
            contract: param.contract.to_string(),
            method: param.method.to_string(),
            param: param.name.to_string(),
            ty: param.ty.to_string(),
        }
    }
}

impl fmt::Display for IllegalParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}({}: {})",
            self.contract, self.method, self.param, self.ty
        )
    }
}
