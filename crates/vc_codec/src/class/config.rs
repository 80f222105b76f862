use alloc::borrow::Cow;
use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use serde_json::{Map, Value};

use crate::{CodecError, Context, ErrorKind, TypeTag};

// -----------------------------------------------------------------------------
// Erased pieces

pub(crate) type SlotValidate = Box<dyn Fn(&mut Context, &Value) -> bool + Send + Sync>;
pub(crate) type SlotEncode<T> = Box<dyn Fn(&mut Context, &T) -> Value + Send + Sync>;
pub(crate) type SlotDecode<T> =
    Box<dyn Fn(&mut Context, &Value, &mut T) -> Result<(), CodecError> + Send + Sync>;
pub(crate) type JointValidate = Box<dyn Fn(&mut Context, &Map<String, Value>) -> bool + Send + Sync>;
pub(crate) type Build<T> =
    Box<dyn Fn(&mut Context, &Map<String, Value>) -> Result<T, CodecError> + Send + Sync>;
pub(crate) type Initialise<T> =
    Box<dyn Fn(&mut Context, &Map<String, Value>, &mut T) -> Result<(), CodecError> + Send + Sync>;
pub(crate) type EncodeHook<T> = Box<dyn Fn(&mut Context, &T, &mut Map<String, Value>) + Send + Sync>;
pub(crate) type DecodeHook<T> = Box<dyn Fn(&mut Context, &Map<String, Value>, &mut T) + Send + Sync>;

/// One key of the encoded object.
///
/// Parameters have no `decode`: their value reaches the instance through
/// the construction or an initialiser call.
pub(crate) struct Slot<T> {
    pub label: &'static str,
    pub validate: SlotValidate,
    pub encode: SlotEncode<T>,
    pub decode: Option<SlotDecode<T>>,
}

/// A key written by a post-encode hook.
pub(crate) struct Reserved {
    pub label: &'static str,
    pub validate: SlotValidate,
}

// -----------------------------------------------------------------------------
// Construction

/// How an aggregate is built from its decoded parameters.
///
/// Returned by [`ClassCodec::configure`](crate::ClassCodec::configure),
/// so every configuration names exactly one way of building the type.
/// Obtained from [`ClassBuilder::construct`](crate::ClassBuilder::construct)
/// and its siblings, or [`Construction::default_value`].
pub struct Construction<T> {
    pub(crate) build: Build<T>,
    pub(crate) validator: Option<JointValidate>,
}

impl<T: Default> Construction<T> {
    /// Builds the aggregate with `T::default()`, leaving its state to
    /// fields, initialisers and hooks.
    pub fn default_value() -> Self {
        Self {
            build: Box::new(|_: &mut Context, _: &Map<String, Value>| Ok(T::default())),
            validator: None,
        }
    }
}

impl<T> fmt::Debug for Construction<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Construction")
            .field("validated", &self.validator.is_some())
            .finish_non_exhaustive()
    }
}

// -----------------------------------------------------------------------------
// ClassConfig

/// The immutable codec of an aggregate, built once from
/// [`ClassCodec::configure`](crate::ClassCodec::configure).
pub struct ClassConfig<T> {
    pub(crate) slots: Vec<Slot<T>>,
    pub(crate) reserved: Vec<Reserved>,
    pub(crate) construction: Construction<T>,
    pub(crate) initialisers: Vec<Initialise<T>>,
    pub(crate) joint: Vec<JointValidate>,
    pub(crate) post_encode: Option<EncodeHook<T>>,
    pub(crate) post_decode: Option<DecodeHook<T>>,
}

impl<T: TypeTag> ClassConfig<T> {
    /// Keys of the encoded object, in registration order.
    pub fn labels(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.slots.iter().map(|slot| slot.label)
    }

    fn slot(&self, key: &str) -> Option<&Slot<T>> {
        self.slots.iter().find(|slot| slot.label == key)
    }

    fn reserved(&self, key: &str) -> Option<&Reserved> {
        self.reserved.iter().find(|reserved| reserved.label == key)
    }

    /// Checks that `tree` holds exactly the registered keys (plus any
    /// reserved ones), each valid on its own, then runs the joint
    /// validators.
    pub fn validate(&self, ctx: &mut Context, tree: &Value) -> bool {
        let Some(map) = ctx.check_object(tree) else {
            return false;
        };

        let mut valid = true;
        for (key, value) in map {
            if let Some(slot) = self.slot(key) {
                valid &= ctx.scoped(slot.label, |ctx| (slot.validate)(ctx, value));
            } else if let Some(reserved) = self.reserved(key) {
                valid &= ctx.scoped(reserved.label, |ctx| (reserved.validate)(ctx, value));
            } else {
                valid = ctx.reject(ErrorKind::UnknownKey(key.clone()));
            }
        }
        for slot in &self.slots {
            if !map.contains_key(slot.label) {
                valid = ctx.reject(ErrorKind::MissingKey(Cow::Borrowed(slot.label)));
            }
        }

        // Joint validators decode their parameters, which is only sound
        // once every slot is known to be valid.
        valid
            && self.construction.validator.iter().chain(&self.joint).all(|joint| joint(ctx, map))
    }

    pub fn encode(&self, ctx: &mut Context, value: &T) -> Value {
        let mut map = Map::new();
        for slot in &self.slots {
            let encoded = ctx.scoped(slot.label, |ctx| (slot.encode)(ctx, value));
            map.insert(String::from(slot.label), encoded);
        }

        if let Some(hook) = &self.post_encode {
            hook(ctx, value, &mut map);
            for key in map.keys() {
                if self.slot(key).is_none() && self.reserved(key).is_none() {
                    log::warn!(
                        "post-encode hook of `{}` wrote unreserved key `{key}` at `{}`, the tree will not validate",
                        T::type_tag(),
                        ctx.path(),
                    );
                }
            }
        }

        Value::Object(map)
    }

    /// Builds the instance, runs the initialisers in registration order,
    /// then assigns the fields and runs the post-decode hook.
    pub fn decode(&self, ctx: &mut Context, tree: &Value) -> Result<T, CodecError> {
        let map = ctx.as_object(tree)?;
        let mut value = (self.construction.build)(ctx, map)?;

        for initialise in &self.initialisers {
            initialise(ctx, map, &mut value)?;
        }

        for slot in &self.slots {
            let Some(decode) = &slot.decode else {
                continue;
            };
            let Some(field) = map.get(slot.label) else {
                return Err(ctx.error(ErrorKind::MissingKey(Cow::Borrowed(slot.label))));
            };
            ctx.scoped(slot.label, |ctx| decode(ctx, field, &mut value))?;
        }

        if let Some(hook) = &self.post_decode {
            hook(ctx, map, &mut value);
        }
        Ok(value)
    }
}

impl<T: TypeTag> fmt::Debug for ClassConfig<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassConfig")
            .field("type", &T::type_tag())
            .field("labels", &self.labels().collect::<Vec<_>>())
            .field(
                "reserved",
                &self.reserved.iter().map(|r| r.label).collect::<Vec<_>>(),
            )
            .field("initialisers", &self.initialisers.len())
            .finish_non_exhaustive()
    }
}
