use alloc::string::String;
use core::fmt;
use core::marker::PhantomData;

use serde_json::{Map, Value};

use crate::{Codec, CodecError, Context};

// -----------------------------------------------------------------------------
// Param

/// A construction parameter registered on a [`ClassBuilder`].
///
/// Only the builder hands these out. A `Param<P>` is a typed key: it
/// remembers the label its value is stored under, and decodes to a `P`.
///
/// [`ClassBuilder`]: crate::ClassBuilder
pub struct Param<P> {
    label: &'static str,
    _marker: PhantomData<fn() -> P>,
}

impl<P> Param<P> {
    #[inline]
    pub(crate) const fn new(label: &'static str) -> Self {
        Self {
            label,
            _marker: PhantomData,
        }
    }

    /// The object key of this parameter.
    #[inline]
    pub const fn label(&self) -> &'static str {
        self.label
    }
}

impl<P> Clone for Param<P> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<P> Copy for Param<P> {}

impl<P> fmt::Debug for Param<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Param").field(&self.label).finish()
    }
}

// -----------------------------------------------------------------------------
// ParamList

/// A list of parameters, decoded together into `Values`.
///
/// Implemented by a single [`Param<P>`] (decoding to `P`) and by tuples of
/// lists up to 12 elements (decoding to the tuple of their values), so a
/// factory taking `(P0, P1)` pairs with `(Param<P0>, Param<P1>)`.
pub trait ParamList: Copy + Send + Sync + 'static {
    type Values;

    /// Decodes every parameter from the object of an aggregate.
    fn decode(&self, ctx: &mut Context, map: &Map<String, Value>) -> Result<Self::Values, CodecError>;
}

impl<P: Codec> ParamList for Param<P> {
    type Values = P;

    #[inline]
    fn decode(&self, ctx: &mut Context, map: &Map<String, Value>) -> Result<P, CodecError> {
        ctx.decode_key::<P>(map, self.label)
    }
}

macro_rules! impl_param_list {
    ([$($index:tt: $name:ident),*]) => {
        impl<$($name: ParamList),*> ParamList for ($($name,)*) {
            type Values = ($($name::Values,)*);

            #[inline]
            #[allow(unused_variables, reason = "the unit list reads nothing")]
            fn decode(
                &self,
                ctx: &mut Context,
                map: &Map<String, Value>,
            ) -> Result<Self::Values, CodecError> {
                Ok(($(self.$index.decode(ctx, map)?,)*))
            }
        }
    };
}

vc_utils::range_invoke!(impl_param_list, [
    0: P0, 1: P1, 2: P2, 3: P3, 4: P4, 5: P5,
    6: P6, 7: P7, 8: P8, 9: P9, 10: P10, 11: P11,
]);
