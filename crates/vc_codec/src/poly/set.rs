use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::any::{Any, TypeId};
use core::fmt;

use serde_json::Value;

use crate::{Codec, CodecError, Context};

// -----------------------------------------------------------------------------
// Upcast

/// Unsizing conversions from a candidate `C` to the base `B`.
///
/// Written by [`impl_polymorphic!`](crate::impl_polymorphic) as three
/// `|value| value` closures, which the compiler turns into the pointer
/// coercions `Box<C> -> Box<dyn Base>` and so on.
pub struct Upcast<C, B: ?Sized> {
    pub boxed: fn(Box<C>) -> Box<B>,
    pub rc: fn(Rc<C>) -> Rc<B>,
    pub arc: fn(Arc<C>) -> Arc<B>,
}

impl<C, B: ?Sized> Clone for Upcast<C, B> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<C, B: ?Sized> Copy for Upcast<C, B> {}

// -----------------------------------------------------------------------------
// Candidate

type DecodeInto<P> = Box<dyn Fn(&mut Context, &Value) -> Result<P, CodecError> + Send + Sync>;

pub(crate) struct Candidate<B: ?Sized> {
    pub tag: &'static str,
    pub type_id: TypeId,
    pub validate: fn(&mut Context, &Value) -> bool,
    pub encode: fn(&mut Context, &dyn Any) -> Value,
    pub decode_box: DecodeInto<Box<B>>,
    pub decode_rc: DecodeInto<Rc<B>>,
    pub decode_arc: DecodeInto<Arc<B>>,
}

fn encode_candidate<C: Codec>(ctx: &mut Context, value: &dyn Any) -> Value {
    match value.downcast_ref::<C>() {
        Some(value) => C::encode(ctx, value),
        None => unreachable!("candidate `{}` called on another type", C::type_tag()),
    }
}

// -----------------------------------------------------------------------------
// PolymorphicSet

/// The closed list of concrete types stored behind a base `B`.
///
/// Built once per base by [`impl_polymorphic!`](crate::impl_polymorphic).
///
/// # Panics
///
/// [`candidate`](Self::candidate) panics when a type or a tag is
/// registered twice.
pub struct PolymorphicSet<B: ?Sized> {
    candidates: Vec<Candidate<B>>,
}

impl<B: ?Sized + 'static> PolymorphicSet<B> {
    #[inline]
    pub const fn new() -> Self {
        Self {
            candidates: Vec::new(),
        }
    }

    /// Adds `C`, tagged with its [`TypeTag`](crate::TypeTag).
    #[must_use]
    pub fn candidate<C: Codec>(mut self, upcast: Upcast<C, B>) -> Self {
        let tag = C::type_tag();
        let type_id = TypeId::of::<C>();
        assert!(
            self.candidates.iter().all(|c| c.type_id != type_id),
            "`{tag}` is registered twice as a polymorphic candidate"
        );
        assert!(
            self.candidates.iter().all(|c| c.tag != tag),
            "two polymorphic candidates share the tag `{tag}`"
        );

        let Upcast { boxed, rc, arc } = upcast;
        self.candidates.push(Candidate {
            tag,
            type_id,
            validate: C::validate,
            encode: encode_candidate::<C>,
            decode_box: Box::new(move |ctx: &mut Context, tree: &Value| {
                C::decode(ctx, tree).map(|value| boxed(Box::new(value)))
            }),
            decode_rc: Box::new(move |ctx: &mut Context, tree: &Value| {
                C::decode(ctx, tree).map(|value| rc(Rc::new(value)))
            }),
            decode_arc: Box::new(move |ctx: &mut Context, tree: &Value| {
                C::decode(ctx, tree).map(|value| arc(Arc::new(value)))
            }),
        });
        self
    }

    /// Tags of the candidates, in registration order.
    pub fn tags(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.candidates.iter().map(|c| c.tag)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub(crate) fn by_tag(&self, tag: &str) -> Option<&Candidate<B>> {
        self.candidates.iter().find(|c| c.tag == tag)
    }

    pub(crate) fn by_type(&self, type_id: TypeId) -> Option<&Candidate<B>> {
        self.candidates.iter().find(|c| c.type_id == type_id)
    }
}

impl<B: ?Sized + 'static> Default for PolymorphicSet<B> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<B: ?Sized + 'static> fmt::Debug for PolymorphicSet<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.tags()).finish()
    }
}
