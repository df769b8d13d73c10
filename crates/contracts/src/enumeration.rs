//! Enumeration marshaling
//!
//! Enumerations travel either by variant name (`Value::Enum`) or, when a
//! parameter is marked `by-ordinal`, by their declaration index.

/// Fieldless enumeration usable as a contract parameter
///
/// Usually implemented through [`channel_enum!`](crate::channel_enum).
pub trait ChannelEnum: Copy + Sized + 'static {
    /// Enumeration type name
    const ENUM_NAME: &'static str;

    /// All variants in declaration order
    const VARIANTS: &'static [Self];

    /// Declaration index
    fn ordinal(self) -> usize;

    /// Variant name
    fn name(self) -> &'static str;

    /// Variant at declaration index `ordinal`
    fn from_ordinal(ordinal: usize) -> Option<Self> {
        Self::VARIANTS.get(ordinal).copied()
    }

    /// Variant named `name`
    fn from_name(name: &str) -> Option<Self> {
        Self::VARIANTS.iter().copied().find(|v| v.name() == name)
    }
}

/// Declare a fieldless enumeration usable as a contract parameter
///
/// Generates the enum (deriving `Debug, Clone, Copy, PartialEq, Eq, Hash`),
/// its [`ChannelEnum`] implementation and by-name value codecs.
///
/// # Usage
/// ```
/// contracts::channel_enum! {
///     pub enum Priority { Lowest, Low, Normal, High, Highest }
/// }
///
/// use contracts::ChannelEnum;
/// assert_eq!(Priority::Normal.ordinal(), 2);
/// assert_eq!(Priority::from_ordinal(2), Some(Priority::Normal));
/// ```
#[macro_export]
macro_rules! channel_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($(#[$vmeta:meta])* $variant:ident),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $crate::ChannelEnum for $name {
            const ENUM_NAME: &'static str = stringify!($name);
            const VARIANTS: &'static [Self] = &[$(Self::$variant),+];

            fn ordinal(self) -> usize {
                self as usize
            }

            fn name(self) -> &'static str {
                match self {
                    $(Self::$variant => stringify!($variant)),+
                }
            }
        }

        impl $crate::IntoValue for $name {
            fn into_value(self) -> $crate::Value {
                $crate::Value::Enum($crate::ChannelEnum::name(self).to_string())
            }
        }

        impl $crate::FromValue for $name {
            const TYPE_NAME: &'static str = "enum";

            fn from_value(value: &$crate::Value) -> Result<Self, $crate::ValueError> {
                match value {
                    $crate::Value::Enum(variant) => {
                        <Self as $crate::ChannelEnum>::from_name(variant).ok_or_else(|| {
                            $crate::ValueError::UnknownVariant {
                                enum_name: <Self as $crate::ChannelEnum>::ENUM_NAME,
                                variant: variant.clone(),
                            }
                        })
                    }
                    other => Err($crate::ValueError::wrong_type("enum", other.kind())),
                }
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::{ChannelEnum, DecodeError, FromValue, IntoValue, Payload, Value, ValueError};

    crate::channel_enum! {
        enum Signal { Red, Amber, Green, Flashing, Off }
    }

    #[test]
    fn test_ordinal_follows_declaration() {
        assert_eq!(Signal::VARIANTS.len(), 5);
        assert_eq!(Signal::Green.ordinal(), 2);
        assert_eq!(Signal::from_ordinal(2), Some(Signal::Green));
        assert_eq!(Signal::from_ordinal(5), None);
    }

    #[test]
    fn test_by_ordinal_encoding() {
        let mut payload = Payload::new();
        payload.encode_ordinal("signal", Signal::Green);
        assert_eq!(payload.get("signal"), Some(&Value::Int(2)));

        let decoded: Signal = payload.decode_ordinal("signal").unwrap();
        assert_eq!(decoded, Signal::Green);
    }

    #[test]
    fn test_by_ordinal_out_of_range() {
        let mut payload = Payload::new();
        payload.insert("signal", Value::Int(9));

        let err = payload.decode_ordinal::<Signal>("signal").unwrap_err();
        assert_eq!(
            err,
            DecodeError::invalid_value(
                "signal",
                ValueError::OrdinalOutOfRange {
                    enum_name: "Signal",
                    ordinal: 9
                }
            )
        );
    }

    #[test]
    fn test_by_value_encoding() {
        let value = Signal::Flashing.into_value();
        assert_eq!(value, Value::Enum("Flashing".to_string()));
        assert_eq!(Signal::from_value(&value), Ok(Signal::Flashing));

        let err = Signal::from_value(&Value::Enum("Blue".into())).unwrap_err();
        assert!(matches!(err, ValueError::UnknownVariant { .. }));
    }

    #[test]
    fn test_by_value_rejects_ordinal() {
        let err = Signal::from_value(&Value::Int(1)).unwrap_err();
        assert_eq!(err, ValueError::wrong_type("enum", "int"));
    }
}
