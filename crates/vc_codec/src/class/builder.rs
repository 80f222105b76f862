use alloc::borrow::Cow;
use alloc::boxed::Box;
use alloc::format;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;

use serde_json::{Map, Value};

use super::config::{
    ClassConfig, Construction, DecodeHook, EncodeHook, Initialise, JointValidate, Reserved, Slot,
    SlotDecode, SlotValidate,
};
use super::param::{Param, ParamList};
use crate::{Codec, Context, ErrorKind, TypeTag};

type Validator<V> = Arc<dyn Fn(&V) -> bool + Send + Sync>;

// -----------------------------------------------------------------------------
// FieldOptions

/// Optional label and validator of a parameter or field.
///
/// Without a label the key is generated (`param0`, `param1`, ...). A label
/// already in use gets a numeric suffix, so `"min"` twice gives `min` and
/// `min0`. The validator runs during validation on the decoded value, and
/// during encoding, where a rejected value is only logged.
pub struct FieldOptions<V> {
    label: Option<Cow<'static, str>>,
    validator: Option<Validator<V>>,
}

impl<V> FieldOptions<V> {
    #[inline]
    pub const fn new() -> Self {
        Self {
            label: None,
            validator: None,
        }
    }

    #[inline]
    pub fn with_label(mut self, label: impl Into<Cow<'static, str>>) -> Self {
        self.label = Some(label.into());
        self
    }

    #[inline]
    pub fn with_validator(mut self, validator: impl Fn(&V) -> bool + Send + Sync + 'static) -> Self {
        self.validator = Some(Arc::new(validator));
        self
    }
}

impl<V> Default for FieldOptions<V> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<V> fmt::Debug for FieldOptions<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldOptions")
            .field("label", &self.label)
            .field("validator", &self.validator.is_some())
            .finish()
    }
}

// -----------------------------------------------------------------------------
// ClassBuilder

/// Declares, once per type, how an aggregate maps to an object.
///
/// A [`ClassCodec::configure`](crate::ClassCodec::configure) body
/// registers
///
/// - construction parameters (`param*`), read from an instance when
///   encoding and handed to the construction when decoding,
/// - initialiser calls, run on the built instance with their own
///   parameters,
/// - fields and properties, read and assigned directly on the instance,
/// - post-encode and post-decode hooks, with the keys they own.
///
/// and ends with one of the `construct*` methods.
pub struct ClassBuilder<T> {
    slots: Vec<Slot<T>>,
    reserved: Vec<Reserved>,
    initialisers: Vec<Initialise<T>>,
    joint: Vec<JointValidate>,
    post_encode: Option<EncodeHook<T>>,
    post_decode: Option<DecodeHook<T>>,
}

impl<T: TypeTag> ClassBuilder<T> {
    pub(crate) const fn new() -> Self {
        Self {
            slots: Vec::new(),
            reserved: Vec::new(),
            initialisers: Vec::new(),
            joint: Vec::new(),
            post_encode: None,
            post_decode: None,
        }
    }

    pub(crate) fn finish(self, construction: Construction<T>) -> ClassConfig<T> {
        log::trace!(
            "configured `{}` with {} keys and {} reserved",
            T::type_tag(),
            self.slots.len(),
            self.reserved.len(),
        );
        ClassConfig {
            slots: self.slots,
            reserved: self.reserved,
            construction,
            initialisers: self.initialisers,
            joint: self.joint,
            post_encode: self.post_encode,
            post_decode: self.post_decode,
        }
    }

    // -------------------------------------------------------------------------
    // Labels

    fn is_taken(&self, label: &str) -> bool {
        self.slots.iter().any(|slot| slot.label == label)
            || self.reserved.iter().any(|reserved| reserved.label == label)
    }

    fn generate_label(&self, prefix: &str) -> &'static str {
        let mut index = 0_usize;
        loop {
            let label = format!("{prefix}{index}");
            if !self.is_taken(&label) {
                return String::leak(label);
            }
            index += 1;
        }
    }

    fn claim_label(&self, requested: Option<Cow<'static, str>>) -> &'static str {
        match requested {
            None => self.generate_label("param"),
            Some(label) if self.is_taken(&label) => self.generate_label(&label),
            Some(Cow::Borrowed(label)) => label,
            Some(Cow::Owned(label)) => String::leak(label),
        }
    }

    fn add_slot<V: Codec>(
        &mut self,
        options: FieldOptions<V>,
        encode: impl Fn(&mut Context, &T, Option<&Validator<V>>) -> Value + Send + Sync + 'static,
        decode: Option<SlotDecode<T>>,
    ) -> &'static str {
        let FieldOptions { label, validator } = options;
        let label = self.claim_label(label);
        let encode_validator = validator.clone();
        self.slots.push(Slot {
            label,
            validate: slot_validator(validator),
            encode: Box::new(move |ctx: &mut Context, value: &T| {
                encode(ctx, value, encode_validator.as_ref())
            }),
            decode,
        });
        label
    }

    // -------------------------------------------------------------------------
    // Parameters

    /// Registers a construction parameter read by `getter`.
    #[inline]
    pub fn param<P: Codec>(&mut self, getter: impl Fn(&T) -> P + Send + Sync + 'static) -> Param<P> {
        self.param_with(getter, FieldOptions::new())
    }

    pub fn param_with<P: Codec>(
        &mut self,
        getter: impl Fn(&T) -> P + Send + Sync + 'static,
        options: FieldOptions<P>,
    ) -> Param<P> {
        let encode = move |ctx: &mut Context, value: &T, validator: Option<&Validator<P>>| {
            encode_checked(ctx, &getter(value), validator)
        };
        Param::new(self.add_slot(options, encode, None))
    }

    /// Registers a construction parameter borrowed from the instance, for
    /// values that are costly or impossible to clone.
    #[inline]
    pub fn param_ref<P: Codec>(&mut self, getter: impl Fn(&T) -> &P + Send + Sync + 'static) -> Param<P> {
        self.param_ref_with(getter, FieldOptions::new())
    }

    pub fn param_ref_with<P: Codec>(
        &mut self,
        getter: impl Fn(&T) -> &P + Send + Sync + 'static,
        options: FieldOptions<P>,
    ) -> Param<P> {
        let encode = move |ctx: &mut Context, value: &T, validator: Option<&Validator<P>>| {
            encode_checked(ctx, getter(value), validator)
        };
        Param::new(self.add_slot(options, encode, None))
    }

    /// Registers a construction parameter that does not depend on the
    /// instance.
    #[inline]
    pub fn param_fn<P: Codec>(&mut self, getter: impl Fn() -> P + Send + Sync + 'static) -> Param<P> {
        self.param_fn_with(getter, FieldOptions::new())
    }

    pub fn param_fn_with<P: Codec>(
        &mut self,
        getter: impl Fn() -> P + Send + Sync + 'static,
        options: FieldOptions<P>,
    ) -> Param<P> {
        let encode = move |ctx: &mut Context, _: &T, validator: Option<&Validator<P>>| {
            encode_checked(ctx, &getter(), validator)
        };
        Param::new(self.add_slot(options, encode, None))
    }

    /// Registers a constant. Any other value fails validation.
    #[inline]
    pub fn param_const<P>(&mut self, value: P) -> Param<P>
    where
        P: Codec + PartialEq + Send + Sync,
    {
        self.const_with(value, FieldOptions::new())
    }

    pub fn param_const_with<P>(&mut self, value: P, label: impl Into<Cow<'static, str>>) -> Param<P>
    where
        P: Codec + PartialEq + Send + Sync,
    {
        self.const_with(value, FieldOptions::new().with_label(label))
    }

    fn const_with<P>(&mut self, value: P, options: FieldOptions<P>) -> Param<P>
    where
        P: Codec + PartialEq + Send + Sync,
    {
        let expected = Arc::new(value);
        let encoded = Arc::clone(&expected);
        let options = options.with_validator(move |value: &P| *value == *expected);
        let encode = move |ctx: &mut Context, _: &T, _: Option<&Validator<P>>| P::encode(ctx, &encoded);
        Param::new(self.add_slot(options, encode, None))
    }

    // -------------------------------------------------------------------------
    // Fields

    /// Registers a field read and assigned through references.
    #[inline]
    pub fn field<V: Codec>(
        &mut self,
        get: impl Fn(&T) -> &V + Send + Sync + 'static,
        get_mut: impl Fn(&mut T) -> &mut V + Send + Sync + 'static,
    ) {
        self.field_with(get, get_mut, FieldOptions::new());
    }

    pub fn field_with<V: Codec>(
        &mut self,
        get: impl Fn(&T) -> &V + Send + Sync + 'static,
        get_mut: impl Fn(&mut T) -> &mut V + Send + Sync + 'static,
        options: FieldOptions<V>,
    ) {
        let encode = move |ctx: &mut Context, value: &T, validator: Option<&Validator<V>>| {
            encode_checked(ctx, get(value), validator)
        };
        let decode: SlotDecode<T> = Box::new(move |ctx: &mut Context, tree: &Value, target: &mut T| {
            *get_mut(target) = V::decode(ctx, tree)?;
            Ok(())
        });
        self.add_slot(options, encode, Some(decode));
    }

    /// Registers a value read by `getter` and assigned by `setter`.
    #[inline]
    pub fn property<V: Codec>(
        &mut self,
        getter: impl Fn(&T) -> V + Send + Sync + 'static,
        setter: impl Fn(&mut T, V) + Send + Sync + 'static,
    ) {
        self.property_with(getter, setter, FieldOptions::new());
    }

    pub fn property_with<V: Codec>(
        &mut self,
        getter: impl Fn(&T) -> V + Send + Sync + 'static,
        setter: impl Fn(&mut T, V) + Send + Sync + 'static,
        options: FieldOptions<V>,
    ) {
        let encode = move |ctx: &mut Context, value: &T, validator: Option<&Validator<V>>| {
            encode_checked(ctx, &getter(value), validator)
        };
        let decode: SlotDecode<T> = Box::new(move |ctx: &mut Context, tree: &Value, target: &mut T| {
            setter(target, V::decode(ctx, tree)?);
            Ok(())
        });
        self.add_slot(options, encode, Some(decode));
    }

    // -------------------------------------------------------------------------
    // Initialisers

    /// Registers a call run on every decoded instance, after construction
    /// and in registration order.
    pub fn initialise<L: ParamList>(
        &mut self,
        params: L,
        call: impl Fn(&mut T, L::Values) + Send + Sync + 'static,
    ) {
        self.initialisers.push(Box::new(
            move |ctx: &mut Context, map: &Map<String, Value>, target: &mut T| {
                call(target, params.decode(ctx, map)?);
                Ok(())
            },
        ));
    }

    /// Like [`initialise`](Self::initialise), with a validator over all the
    /// call's values together.
    pub fn initialise_validated<L: ParamList>(
        &mut self,
        params: L,
        call: impl Fn(&mut T, L::Values) + Send + Sync + 'static,
        validator: impl Fn(&L::Values) -> bool + Send + Sync + 'static,
    ) {
        self.joint.push(joint_validator(params, validator, "initialiser"));
        self.initialise(params, call);
    }

    // -------------------------------------------------------------------------
    // Hooks

    /// Runs after the registered keys are written. Keys the hook adds
    /// must be declared with [`reserve_key`](Self::reserve_key).
    pub fn post_encode(&mut self, hook: impl Fn(&mut Context, &T, &mut Map<String, Value>) + Send + Sync + 'static) {
        self.post_encode = Some(Box::new(hook));
    }

    /// Runs last when decoding, with the whole object.
    pub fn post_decode(&mut self, hook: impl Fn(&mut Context, &Map<String, Value>, &mut T) + Send + Sync + 'static) {
        self.post_decode = Some(Box::new(hook));
    }

    /// Declares a key owned by the hooks. It may be absent, and must hold
    /// a valid `V` when present.
    ///
    /// # Panics
    ///
    /// If `key` is already registered.
    pub fn reserve_key<V: Codec>(&mut self, key: &'static str) {
        assert!(
            !self.is_taken(key),
            "key `{key}` of `{}` is reserved twice",
            T::type_tag()
        );
        self.reserved.push(Reserved {
            label: key,
            validate: Box::new(|ctx: &mut Context, tree: &Value| V::validate(ctx, tree)),
        });
    }

    // -------------------------------------------------------------------------
    // Construction

    /// Builds the aggregate by calling `build` with the decoded parameters.
    pub fn construct<L: ParamList>(
        &self,
        params: L,
        build: impl Fn(L::Values) -> T + Send + Sync + 'static,
    ) -> Construction<T> {
        Construction {
            build: Box::new(move |ctx: &mut Context, map: &Map<String, Value>| {
                params.decode(ctx, map).map(&build)
            }),
            validator: None,
        }
    }

    /// Like [`construct`](Self::construct), with a validator over all the
    /// parameters together, for builds that would fail or panic on some
    /// combinations.
    pub fn construct_validated<L: ParamList>(
        &self,
        params: L,
        build: impl Fn(L::Values) -> T + Send + Sync + 'static,
        validator: impl Fn(&L::Values) -> bool + Send + Sync + 'static,
    ) -> Construction<T> {
        Construction {
            validator: Some(joint_validator(params, validator, "construction")),
            ..self.construct(params, build)
        }
    }

    /// Builds the aggregate through `T: From<L::Values>`.
    #[inline]
    pub fn construct_from<L: ParamList>(&self, params: L) -> Construction<T>
    where
        T: From<L::Values>,
    {
        self.construct(params, T::from)
    }
}

impl<T: TypeTag> fmt::Debug for ClassBuilder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassBuilder")
            .field("type", &T::type_tag())
            .field("labels", &self.slots.iter().map(|s| s.label).collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

// -----------------------------------------------------------------------------
// Helpers

fn slot_validator<V: Codec>(validator: Option<Validator<V>>) -> SlotValidate {
    Box::new(move |ctx: &mut Context, tree: &Value| {
        if !V::validate(ctx, tree) {
            return false;
        }
        let Some(validator) = &validator else {
            return true;
        };
        match V::decode(ctx, tree) {
            Ok(value) => validator(&value) || ctx.reject(ErrorKind::Rejected("field")),
            Err(error) => ctx.reject(error.kind),
        }
    })
}

fn joint_validator<L: ParamList>(
    params: L,
    validator: impl Fn(&L::Values) -> bool + Send + Sync + 'static,
    what: &'static str,
) -> JointValidate {
    Box::new(move |ctx: &mut Context, map: &Map<String, Value>| match params.decode(ctx, map) {
        Ok(values) => validator(&values) || ctx.reject(ErrorKind::Rejected(what)),
        Err(error) => ctx.reject(error.kind),
    })
}

fn encode_checked<V: Codec>(ctx: &mut Context, value: &V, validator: Option<&Validator<V>>) -> Value {
    if validator.is_some_and(|validator| !validator(value)) {
        log::warn!(
            "encoding a `{}` at `{}` that its validator rejects",
            V::type_tag(),
            ctx.path(),
        );
    }
    V::encode(ctx, value)
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use super::{ClassBuilder, FieldOptions};

    struct Blank;
    crate::impl_type_tag!(Blank);

    #[test]
    fn labels_are_generated_then_deduplicated() {
        let mut class = ClassBuilder::<Blank>::new();
        let a = class.param_fn(|| 1_u8);
        let b = class.param_fn(|| 2_u8);
        let min = class.param_fn_with(|| 3_u8, FieldOptions::new().with_label("min"));
        let again = class.param_fn_with(|| 4_u8, FieldOptions::new().with_label("min"));
        let clash = class.param_fn_with(|| 5_u8, FieldOptions::new().with_label("param0"));

        let labels = [a, b, min, again, clash].map(|param| param.label());
        assert_eq!(labels, ["param0", "param1", "min", "min0", "param00"]);
    }

    #[test]
    fn reserved_keys_take_part_in_deduplication() {
        let mut class = ClassBuilder::<Blank>::new();
        class.reserve_key::<u8>("extra");
        let extra = class.param_fn_with(|| 0_u8, FieldOptions::new().with_label("extra"));
        assert_eq!(extra.label(), "extra0");

        let labels: Vec<_> = class.slots.iter().map(|slot| slot.label).collect();
        assert_eq!(labels, ["extra0"]);
    }

    #[test]
    #[should_panic(expected = "reserved twice")]
    fn reserving_twice_panics() {
        let mut class = ClassBuilder::<Blank>::new();
        class.reserve_key::<u8>("extra");
        class.reserve_key::<u8>("extra");
    }
}
