//! Value - wire representation of one parameter
//!
//! Each variant keeps its semantic type, so an `int` sent by an emitter is
//! never read back as a `long` by a dispatcher.

use serde::{Deserialize, Serialize};

use crate::{Payload, ValueError};

/// Encoded parameter value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Null,
    Bool(bool),
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
    /// Enumeration encoded by variant name
    Enum(String),
    List(Vec<Value>),
    Map(Payload),
}

impl Value {
    /// Wire type name (used in error messages)
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Byte(_) => "byte",
            Value::Short(_) => "short",
            Value::Int(_) => "int",
            Value::Long(_) => "long",
            Value::Float(_) => "float",
            Value::Double(_) => "double",
            Value::String(_) => "string",
            Value::Enum(_) => "enum",
            Value::List(_) => "list",
            Value::Map(_) => "map",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }
}

/// Conversion into a wire value
pub trait IntoValue {
    fn into_value(self) -> Value;
}

/// Conversion out of a wire value
pub trait FromValue: Sized {
    /// Expected wire type name, reported on mismatch
    const TYPE_NAME: &'static str;

    fn from_value(value: &Value) -> Result<Self, ValueError>;
}

macro_rules! impl_scalar_value {
    ($($ty:ty => $variant:ident, $name:literal;)+) => {
        $(
            impl IntoValue for $ty {
                #[inline]
                fn into_value(self) -> Value {
                    Value::$variant(self)
                }
            }

            impl FromValue for $ty {
                const TYPE_NAME: &'static str = $name;

                #[inline]
                fn from_value(value: &Value) -> Result<Self, ValueError> {
                    match value {
                        Value::$variant(v) => Ok(*v),
                        other => Err(ValueError::wrong_type(Self::TYPE_NAME, other.kind())),
                    }
                }
            }
        )+
    };
}

impl_scalar_value! {
    bool => Bool, "bool";
    i8 => Byte, "byte";
    i16 => Short, "short";
    i32 => Int, "int";
    i64 => Long, "long";
    f32 => Float, "float";
    f64 => Double, "double";
}

impl IntoValue for String {
    fn into_value(self) -> Value {
        Value::String(self)
    }
}

impl IntoValue for &str {
    fn into_value(self) -> Value {
        Value::String(self.to_string())
    }
}

impl FromValue for String {
    const TYPE_NAME: &'static str = "string";

    fn from_value(value: &Value) -> Result<Self, ValueError> {
        match value {
            Value::String(s) => Ok(s.clone()),
            other => Err(ValueError::wrong_type(Self::TYPE_NAME, other.kind())),
        }
    }
}

impl<T: IntoValue> IntoValue for Option<T> {
    fn into_value(self) -> Value {
        match self {
            Some(v) => v.into_value(),
            None => Value::Null,
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    const TYPE_NAME: &'static str = T::TYPE_NAME;

    fn from_value(value: &Value) -> Result<Self, ValueError> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl<T: IntoValue> IntoValue for Vec<T> {
    fn into_value(self) -> Value {
        Value::List(self.into_iter().map(IntoValue::into_value).collect())
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    const TYPE_NAME: &'static str = "list";

    fn from_value(value: &Value) -> Result<Self, ValueError> {
        match value {
            Value::List(items) => items.iter().map(T::from_value).collect(),
            other => Err(ValueError::wrong_type(Self::TYPE_NAME, other.kind())),
        }
    }
}

impl IntoValue for Payload {
    fn into_value(self) -> Value {
        Value::Map(self)
    }
}

impl FromValue for Payload {
    const TYPE_NAME: &'static str = "map";

    fn from_value(value: &Value) -> Result<Self, ValueError> {
        match value {
            Value::Map(map) => Ok(map.clone()),
            other => Err(ValueError::wrong_type(Self::TYPE_NAME, other.kind())),
        }
    }
}

impl IntoValue for Value {
    fn into_value(self) -> Value {
        self
    }
}

impl FromValue for Value {
    const TYPE_NAME: &'static str = "any";

    fn from_value(value: &Value) -> Result<Self, ValueError> {
        Ok(value.clone())
    }
}
