//! Contract descriptors - generation-time input
//!
//! Describes an interaction contract: its qualified name, its parents in
//! declaration order, and its own methods with ordered typed parameters.
//! Loaded from TOML / JSON by `config_loader`, consumed by `codegen`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A set of contracts generated together
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContractSet {
    #[serde(default)]
    pub contracts: Vec<ContractDescriptor>,
}

impl ContractSet {
    /// Find a contract by qualified name
    pub fn get(&self, name: &str) -> Option<&ContractDescriptor> {
        self.contracts.iter().find(|c| c.name == name)
    }

    /// Qualified names in declaration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.contracts.iter().map(|c| c.name.as_str())
    }
}

/// One interaction contract
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractDescriptor {
    /// Qualified name, e.g. `demo.Bar`; also the `__class_name` discriminator
    pub name: String,

    /// Parent contracts, in declaration order
    #[serde(default)]
    pub parents: Vec<String>,

    /// Own methods, in declaration order
    #[serde(default)]
    pub methods: Vec<MethodDescriptor>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
}

impl ContractDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parents: Vec::new(),
            methods: Vec::new(),
            doc: None,
        }
    }

    /// Append a parent contract
    pub fn extends(mut self, parent: impl Into<String>) -> Self {
        self.parents.push(parent.into());
        self
    }

    /// Append an own method
    pub fn method(mut self, method: MethodDescriptor) -> Self {
        self.methods.push(method);
        self
    }

    /// Last segment of the qualified name (`demo.Bar` -> `Bar`)
    pub fn simple_name(&self) -> &str {
        simple_name(&self.name)
    }
}

/// Last segment of a qualified name, accepting `.` and `::` separators
pub fn simple_name(qualified: &str) -> &str {
    let tail = qualified.rsplit('.').next().unwrap_or(qualified);
    tail.rsplit("::").next().unwrap_or(tail)
}

/// One contract method
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodDescriptor {
    pub name: String,

    #[serde(default)]
    pub params: Vec<ParamDescriptor>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
}

impl MethodDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
            doc: None,
        }
    }

    /// Append a parameter
    pub fn param(mut self, param: ParamDescriptor) -> Self {
        self.params.push(param);
        self
    }
}

/// One method parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamDescriptor {
    /// Wire key of the parameter
    pub name: String,

    #[serde(flatten)]
    pub ty: ParamType,

    #[serde(default)]
    pub marshal: MarshalHint,

    /// Parameter may be absent (`null` on the wire)
    #[serde(default)]
    pub optional: bool,
}

impl ParamDescriptor {
    pub fn new(name: impl Into<String>, ty: ParamType) -> Self {
        Self {
            name: name.into(),
            ty,
            marshal: MarshalHint::ByValue,
            optional: false,
        }
    }

    /// Encode enumeration by ordinal
    pub fn by_ordinal(mut self) -> Self {
        self.marshal = MarshalHint::ByOrdinal;
        self
    }

    /// Allow `null`
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }
}

/// Semantic parameter type
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ParamType {
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
    Boolean,
    String,
    /// Enumeration declared with `channel_enum!`, referenced by Rust path
    Enum { path: String },
    /// Any other type implementing the value codecs, referenced by Rust path
    Other { path: String },
}

impl ParamType {
    pub fn enumeration(path: impl Into<String>) -> Self {
        Self::Enum { path: path.into() }
    }

    pub fn other(path: impl Into<String>) -> Self {
        Self::Other { path: path.into() }
    }

    pub fn is_enum(&self) -> bool {
        matches!(self, Self::Enum { .. })
    }

    /// Rust path of a referenced type
    pub fn path(&self) -> Option<&str> {
        match self {
            Self::Enum { path } | Self::Other { path } => Some(path),
            _ => None,
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Byte => write!(f, "byte"),
            Self::Short => write!(f, "short"),
            Self::Int => write!(f, "int"),
            Self::Long => write!(f, "long"),
            Self::Float => write!(f, "float"),
            Self::Double => write!(f, "double"),
            Self::Boolean => write!(f, "boolean"),
            Self::String => write!(f, "string"),
            Self::Enum { path } => write!(f, "enum {path}"),
            Self::Other { path } => write!(f, "{path}"),
        }
    }
}

/// How a parameter is placed on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MarshalHint {
    #[default]
    ByValue,
    /// Enumerations only: declaration index as `int`
    ByOrdinal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_name() {
        assert_eq!(simple_name("demo.test.Bar"), "Bar");
        assert_eq!(simple_name("demo::Bar"), "Bar");
        assert_eq!(simple_name("Bar"), "Bar");
    }

    #[test]
    fn test_param_json_shape() {
        let json = r#"{
            "name": "aEnum2", "type": "enum", "path": "crate::TimeUnit", "marshal": "by-ordinal"
        }"#;
        let param: ParamDescriptor = serde_json::from_str(json).unwrap();
        assert_eq!(
            param,
            ParamDescriptor::new("aEnum2", ParamType::enumeration("crate::TimeUnit")).by_ordinal()
        );
    }

    #[test]
    fn test_param_defaults() {
        let param: ParamDescriptor =
            serde_json::from_str(r#"{ "name": "aInt", "type": "int" }"#).unwrap();
        assert_eq!(param.marshal, MarshalHint::ByValue);
        assert!(!param.optional);
        assert_eq!(param.ty.to_string(), "int");
    }

    #[test]
    fn test_builder() {
        let bar = ContractDescriptor::new("demo.Bar")
            .extends("demo.Foo")
            .method(
                MethodDescriptor::new("stringParam")
                    .param(ParamDescriptor::new("aString", ParamType::String)),
            );
        assert_eq!(bar.simple_name(), "Bar");
        assert_eq!(bar.parents, vec!["demo.Foo".to_string()]);
        assert_eq!(bar.methods[0].params[0].name, "aString");
    }
}
