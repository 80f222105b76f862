/// A stable, explicit name for a type.
///
/// Tags name the alternatives of tagged unions, the slots of tuples and
/// the candidates of polymorphic sets, so they end up inside encoded
/// trees. They are spelled out by hand instead of derived from compiler
/// output, which may change between toolchains.
///
/// Generic types build their tag from their parameters' tags, once per
/// instantiation, through a [`TypeCell`](crate::TypeCell).
///
/// # Examples
///
/// ```
/// use vc_codec::{TypeTag, impl_type_tag};
///
/// struct Meters(f64);
/// mod geo { pub struct Point; }
///
/// impl_type_tag!(Meters);
/// impl_type_tag!(geo::Point as "geo::Point");
///
/// assert_eq!(Meters::type_tag(), "Meters");
/// assert_eq!(geo::Point::type_tag(), "geo::Point");
/// assert_eq!(<Vec<Option<u8>>>::type_tag(), "Vec<Option<u8>>");
/// ```
pub trait TypeTag: 'static {
    /// Returns the tag. Must be the same on every call.
    fn type_tag() -> &'static str;
}

/// Implements [`TypeTag`] with a fixed string.
///
/// A list of plain identifiers uses each identifier as its own tag;
/// `Type as "tag"` names one type explicitly.
#[macro_export]
macro_rules! impl_type_tag {
    ($($ty:ident),+ $(,)?) => {
        $( $crate::impl_type_tag!($ty as ::core::stringify!($ty)); )+
    };
    ($ty:ty as $tag:expr) => {
        impl $crate::TypeTag for $ty {
            #[inline]
            fn type_tag() -> &'static str {
                $tag
            }
        }
    };
}
