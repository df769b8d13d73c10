//! Payload - generic encoded method call
//!
//! Ordered key -> value mapping. Two reserved keys carry the discriminators,
//! all other keys are parameter names.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{ChannelEnum, DecodeError, FromValue, IntoValue, Value, ValueError};

/// Reserved key: qualified name of the contract
pub const KEY_CLASS_NAME: &str = "__class_name";

/// Reserved key: id of the method within the flattened contract
pub const KEY_METHOD_ID: &str = "__method_id";

/// Keys starting with this prefix belong to the protocol
pub const RESERVED_PREFIX: &str = "__";

/// Method identifier, assigned 1..N in flattened declaration order
pub type MethodId = u32;

/// Wire representation of one method call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Payload(IndexMap<String, Value>);

impl Payload {
    /// Create an empty payload
    pub fn new() -> Self {
        Self(IndexMap::new())
    }

    /// Create an empty payload with room for `capacity` entries
    pub fn with_capacity(capacity: usize) -> Self {
        Self(IndexMap::with_capacity(capacity))
    }

    /// Insert a raw value, returning the previous one
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(key.into(), value)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Remove an entry, keeping the order of the remaining ones
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.shift_remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Encode a parameter by value
    pub fn encode<T: IntoValue>(&mut self, key: impl Into<String>, value: T) {
        self.0.insert(key.into(), value.into_value());
    }

    /// Encode an enumeration parameter by its ordinal
    pub fn encode_ordinal<E: ChannelEnum>(&mut self, key: impl Into<String>, value: E) {
        self.0.insert(key.into(), Value::Int(value.ordinal() as i32));
    }

    /// Decode a parameter encoded by value
    ///
    /// # Errors
    /// - Key missing
    /// - Value of a different wire type
    pub fn decode<T: FromValue>(&self, key: &str) -> Result<T, DecodeError> {
        let value = self.get(key).ok_or_else(|| DecodeError::missing_key(key))?;
        T::from_value(value).map_err(|e| DecodeError::invalid_value(key, e))
    }

    /// Decode an optional parameter; a missing key reads as `None`
    pub fn decode_optional<T: FromValue>(&self, key: &str) -> Result<Option<T>, DecodeError> {
        match self.get(key) {
            None => Ok(None),
            Some(value) => {
                Option::<T>::from_value(value).map_err(|e| DecodeError::invalid_value(key, e))
            }
        }
    }

    /// Decode an enumeration parameter encoded by ordinal
    ///
    /// The variant is looked up by position, so the decoded value is the
    /// variant that was originally at that index.
    pub fn decode_ordinal<E: ChannelEnum>(&self, key: &str) -> Result<E, DecodeError> {
        let ordinal = self.decode::<i32>(key)?;
        usize::try_from(ordinal)
            .ok()
            .and_then(E::from_ordinal)
            .ok_or_else(|| {
                DecodeError::invalid_value(
                    key,
                    ValueError::OrdinalOutOfRange {
                        enum_name: E::ENUM_NAME,
                        ordinal: i64::from(ordinal),
                    },
                )
            })
    }

    /// Contract discriminator, if present and a string
    pub fn class_name(&self) -> Option<&str> {
        self.get(KEY_CLASS_NAME).and_then(Value::as_str)
    }

    /// Method discriminator
    ///
    /// Returns `Ok(None)` for ids that can never be assigned (zero or
    /// negative), so callers treat them as unrecognized.
    ///
    /// # Errors
    /// - `__method_id` missing or not an `int`
    pub fn method_id(&self) -> Result<Option<MethodId>, DecodeError> {
        let raw = self.decode::<i32>(KEY_METHOD_ID)?;
        Ok(MethodId::try_from(raw).ok().filter(|id| *id >= 1))
    }

    /// Stamp both discriminators
    pub fn set_discriminators(&mut self, class_name: &str, method_id: MethodId) {
        self.0.insert(
            KEY_CLASS_NAME.to_string(),
            Value::String(class_name.to_string()),
        );
        self.0.insert(KEY_METHOD_ID.to_string(), Value::Int(method_id as i32));
    }
}

impl FromIterator<(String, Value)> for Payload {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for Payload {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
