use serde_json::Value;

use crate::context::Context;
use crate::error::CodecError;
use crate::registry::TypeTag;

/// Validate, encode and decode for one type.
///
/// Implementations must keep three promises:
///
/// - `validate` returning `true` means `decode` succeeds on the same tree;
/// - `decode(encode(v))` is equivalent to `v`;
/// - `encode(decode(t))` equals `t` for every tree `t` that validates.
///
/// `validate` never panics on bad input: it records a diagnostic through
/// [`Context::reject`] and returns `false`. `decode` assumes the tree was
/// validated and returns a located [`CodecError`] instead of guessing when
/// it was not.
///
/// Most types get their implementation from this crate (primitives,
/// strings, collections, tuples, pointers), from the class builder
/// ([`impl_class_codec!`](crate::impl_class_codec)), from
/// [`impl_enum_codec!`](crate::impl_enum_codec) or from
/// [`impl_variant_codec!`](crate::impl_variant_codec).
///
/// # Examples
///
/// A hand-written codec for a newtype:
///
/// ```
/// use vc_codec::{Codec, CodecError, Context, Value, impl_type_tag};
///
/// #[derive(Debug, PartialEq)]
/// struct Even(u32);
/// impl_type_tag!(Even);
///
/// impl Codec for Even {
///     fn validate(ctx: &mut Context, tree: &Value) -> bool {
///         u32::validate(ctx, tree)
///             && (u32::decode(ctx, tree).is_ok_and(|n| n % 2 == 0)
///                 || ctx.reject(vc_codec::ErrorKind::Rejected("even")))
///     }
///
///     fn encode(ctx: &mut Context, value: &Self) -> Value {
///         u32::encode(ctx, &value.0)
///     }
///
///     fn decode(ctx: &mut Context, tree: &Value) -> Result<Self, CodecError> {
///         u32::decode(ctx, tree).map(Even)
///     }
/// }
///
/// assert_eq!(vc_codec::deserialize::<Even>(&4.into()), Some(Even(4)));
/// assert_eq!(vc_codec::deserialize::<Even>(&5.into()), None);
/// ```
#[diagnostic::on_unimplemented(
    message = "`{Self}` has no codec",
    label = "no codec for this type",
    note = "use `impl_class_codec!`, `impl_enum_codec!` or `impl_variant_codec!`, or implement `Codec` by hand"
)]
pub trait Codec: TypeTag + Sized {
    /// Checks that `tree` decodes into a `Self` without loss.
    fn validate(ctx: &mut Context, tree: &Value) -> bool;

    /// Encodes `value`.
    fn encode(ctx: &mut Context, value: &Self) -> Value;

    /// Decodes a tree accepted by [`Codec::validate`].
    fn decode(ctx: &mut Context, tree: &Value) -> Result<Self, CodecError>;
}
