//! Codecs for the types this crate supports out of the box.
//!
//! ## Implemented Menu
//!
//! - primitives:
//!     - `bool`, `char` (one-character string)
//!     - `i8`-`i64`, `isize`, `u8`-`u64`, `usize` (native integer)
//!     - `f32`, `f64` (native float, `"NaN"`, `"inf"`, `"-inf"` otherwise)
//!     - `i128`, `u128` (canonical decimal string)
//!     - [`Byte`] (`"0x"` and two lowercase hex digits)
//! - strings: `String`, `Box<str>`, `Cow<'static, str>`
//! - collections (arrays):
//!     - `Vec<T>`, `VecDeque<T>`, `LinkedList<T>`, `[T; N]`
//!     - `BTreeSet<T>`, `HashSet<T, S>` (in canonical order)
//!     - `BTreeMap<K, V>`, `HashMap<K, V, S>` (arrays of pairs, in canonical order)
//! - composites:
//!     - `()`, `(P0,)`, `(P0, P1, ...)` up to 12 slots (objects)
//!     - `Option<T>` (zero or one element array)
//!     - [`Variant2`] to [`Variant6`] and [`impl_variant_codec!`](crate::impl_variant_codec)
//! - pointers: `Box<T>`, `Rc<T>`, `Arc<T>` for `T: PointeeCodec`
//! - `core::time::Duration`
//! - `serde_json::Value` (passed through) and [`Serde<T>`]
//! - enumerations through [`impl_enum_codec!`](crate::impl_enum_codec)

// -----------------------------------------------------------------------------
// Modules

mod byte;
mod enums;
mod json;
mod map;
mod option;
mod order;
mod pointer;
mod primitive;
mod sequence;
mod string;
mod time;
mod tuple;
pub(crate) mod variant;
mod wide;

// -----------------------------------------------------------------------------
// Exports

pub use byte::Byte;
pub use json::Serde;
pub use pointer::PointeeCodec;
pub use variant::{VariantCodec, Variant2, Variant3, Variant4, Variant5, Variant6};

pub(crate) use option::{absent, present};
pub(crate) use order::{Ascending, ByText, sorted_by_text};
pub(crate) use tuple::pair_labels;

// -----------------------------------------------------------------------------
// Utilities

/// Implements [`Codec`](crate::Codec) for a leaf type from one parser and
/// one encoder.
///
/// The parser, `fn(&Value) -> Result<T, ErrorKind>`, serves both `validate`
/// and `decode`, so the two can never disagree.
macro_rules! impl_leaf_codec {
    ($ty:ty, $parse:expr, |$value:ident| $encode:expr) => {
        impl $crate::Codec for $ty {
            #[inline]
            fn validate(ctx: &mut $crate::Context, tree: &::serde_json::Value) -> bool {
                ctx.accept($parse(tree))
            }

            #[inline]
            fn encode(_: &mut $crate::Context, $value: &Self) -> ::serde_json::Value {
                $encode
            }

            #[inline]
            fn decode(
                ctx: &mut $crate::Context,
                tree: &::serde_json::Value,
            ) -> Result<Self, $crate::CodecError> {
                ctx.locate($parse(tree))
            }
        }
    };
}

pub(crate) use impl_leaf_codec;

/// Kind mismatch against the kind of `found`.
pub(crate) fn mismatch(expected: &'static str, found: &serde_json::Value) -> crate::ErrorKind {
    crate::ErrorKind::KindMismatch {
        expected,
        found: crate::context::kind_name(found),
    }
}
