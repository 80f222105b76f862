/// Implements [`Codec`](crate::Codec) and [`TypeTag`](crate::TypeTag) for
/// an enumeration through its integer representation.
///
/// The enumeration is stored exactly as its representation would be, and
/// validation only checks the representation: the set of accepted values
/// is open. For this to round-trip, both conversions must be total and
/// inverse of each other:
///
/// - `Repr: From<Enum>`,
/// - `Enum: From<Repr>`, typically with a catch-all variant holding
///   unknown values.
///
/// `impl_enum_codec!(Enum as Repr)` tags the type with its identifier,
/// `impl_enum_codec!(Enum as Repr, "tag")` with an explicit tag.
///
/// # Examples
///
/// ```
/// use vc_codec::{deserialize, impl_enum_codec, serialize};
///
/// #[derive(Debug, Clone, Copy, PartialEq)]
/// enum Level {
///     Low,
///     High,
///     Other(u8),
/// }
///
/// impl From<u8> for Level {
///     fn from(raw: u8) -> Self {
///         match raw {
///             0 => Level::Low,
///             1 => Level::High,
///             raw => Level::Other(raw),
///         }
///     }
/// }
///
/// impl From<Level> for u8 {
///     fn from(level: Level) -> u8 {
///         match level {
///             Level::Low => 0,
///             Level::High => 1,
///             Level::Other(raw) => raw,
///         }
///     }
/// }
///
/// impl_enum_codec!(Level as u8);
///
/// assert_eq!(serialize(&Level::High), serde_json::json!(1));
/// assert_eq!(deserialize::<Level>(&serde_json::json!(7)), Some(Level::Other(7)));
/// assert_eq!(deserialize::<Level>(&serde_json::json!(-1)), None);
/// ```
#[macro_export]
macro_rules! impl_enum_codec {
    ($ty:ident as $repr:ty) => {
        $crate::impl_enum_codec!($ty as $repr, ::core::stringify!($ty));
    };
    ($ty:ty as $repr:ty, $tag:expr) => {
        $crate::impl_type_tag!($ty as $tag);

        impl $crate::Codec for $ty {
            #[inline]
            fn validate(ctx: &mut $crate::Context, tree: &$crate::Value) -> bool {
                <$repr as $crate::Codec>::validate(ctx, tree)
            }

            #[inline]
            fn encode(ctx: &mut $crate::Context, value: &Self) -> $crate::Value {
                let raw = <$repr as ::core::convert::From<$ty>>::from(::core::clone::Clone::clone(value));
                <$repr as $crate::Codec>::encode(ctx, &raw)
            }

            #[inline]
            fn decode(
                ctx: &mut $crate::Context,
                tree: &$crate::Value,
            ) -> ::core::result::Result<Self, $crate::CodecError> {
                <$repr as $crate::Codec>::decode(ctx, tree).map(<$ty as ::core::convert::From<$repr>>::from)
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::{TypeTag, deserialize, serialize, validate};

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Direction {
        North,
        South,
        Unknown(i16),
    }

    impl From<i16> for Direction {
        fn from(raw: i16) -> Self {
            match raw {
                0 => Self::North,
                1 => Self::South,
                raw => Self::Unknown(raw),
            }
        }
    }

    impl From<Direction> for i16 {
        fn from(direction: Direction) -> i16 {
            match direction {
                Direction::North => 0,
                Direction::South => 1,
                Direction::Unknown(raw) => raw,
            }
        }
    }

    impl_enum_codec!(Direction as i16, "compass::Direction");

    #[test]
    fn stored_as_representation() {
        assert_eq!(serialize(&Direction::South), json!(1));
        assert_eq!(deserialize::<Direction>(&json!(0)), Some(Direction::North));
        assert_eq!(Direction::type_tag(), "compass::Direction");
    }

    #[test]
    fn undeclared_values_are_accepted() {
        let tree = json!(-40);
        assert!(validate::<Direction>(&tree));
        let value = deserialize::<Direction>(&tree).unwrap();
        assert_eq!(value, Direction::Unknown(-40));
        assert_eq!(serialize(&value), tree);
    }

    #[test]
    fn representation_is_still_checked() {
        assert!(!validate::<Direction>(&json!(40000)));
        assert!(!validate::<Direction>(&json!("North")));
    }
}
