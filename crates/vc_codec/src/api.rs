//! Entry points.
//!
//! Each operation exists twice: as a [`Context`] method, which keeps the
//! shared-pointer identity tables across calls, and as a free function,
//! which runs in a fresh one-shot context.

use serde_json::Value;

use crate::codec::Codec;
use crate::context::Context;
use crate::error::ValidationError;

// -----------------------------------------------------------------------------
// Context methods

impl Context {
    /// Returns `true` if `tree` decodes into a `T`.
    ///
    /// A failing call records at least its first rejection, even in a
    /// session whose diagnostics are already capped.
    #[inline]
    pub fn validate<T: Codec>(&mut self, tree: &Value) -> bool {
        self.with_room(|ctx| T::validate(ctx, tree))
    }

    /// Encodes `value`.
    #[inline]
    pub fn serialize<T: Codec>(&mut self, value: &T) -> Value {
        T::encode(self, value)
    }

    /// Validates then decodes `tree`. `None` exactly when validation fails.
    #[inline]
    pub fn deserialize<T: Codec>(&mut self, tree: &Value) -> Option<T> {
        self.try_deserialize(tree).ok()
    }

    /// Validates then decodes `tree`, returning the diagnostics on failure.
    ///
    /// # Examples
    ///
    /// ```
    /// use vc_codec::Context;
    ///
    /// let mut ctx = Context::new();
    /// let error = ctx
    ///     .try_deserialize::<Vec<u8>>(&serde_json::json!([1, 300]))
    ///     .unwrap_err();
    /// assert_eq!(error.type_tag, "Vec<u8>");
    /// assert_eq!(error.errors[0].to_string(), "at `$[1]`: `300` does not fit in `u8`");
    /// ```
    pub fn try_deserialize<T: Codec>(&mut self, tree: &Value) -> Result<T, ValidationError> {
        let mark = self.diagnostics().len();
        if !self.validate::<T>(tree) {
            return Err(ValidationError {
                type_tag: T::type_tag(),
                errors: self.split_diagnostics(mark),
            });
        }
        T::decode(self, tree).map_err(|error| {
            log::error!("`{}` validated but failed to decode: {error}", T::type_tag());
            ValidationError {
                type_tag: T::type_tag(),
                errors: alloc::vec![error],
            }
        })
    }

    /// Decodes `tree` without validating it first.
    ///
    /// # Panics
    ///
    /// If `tree` is not a valid `T`. The panic message carries the path of
    /// the offending node.
    pub fn deserialize_unchecked<T: Codec>(&mut self, tree: &Value) -> T {
        match T::decode(self, tree) {
            Ok(value) => value,
            Err(error) => {
                log::error!("unchecked decode of `{}` failed: {error}", T::type_tag());
                panic!("unchecked decode of `{}` failed: {error}", T::type_tag());
            }
        }
    }
}

// -----------------------------------------------------------------------------
// One-shot functions

/// Returns `true` if `tree` decodes into a `T`.
///
/// # Examples
///
/// ```
/// use serde_json::json;
///
/// assert!(vc_codec::validate::<[u8; 2]>(&json!([1, 2])));
/// assert!(!vc_codec::validate::<[u8; 2]>(&json!([1, 2, 3])));
/// ```
#[inline]
pub fn validate<T: Codec>(tree: &Value) -> bool {
    Context::new().validate::<T>(tree)
}

/// Encodes `value`.
///
/// # Examples
///
/// ```
/// use serde_json::json;
///
/// assert_eq!(vc_codec::serialize(&-437218_i32), json!(-437218));
/// assert_eq!(vc_codec::serialize(&Some('x')), json!(["x"]));
/// ```
#[inline]
pub fn serialize<T: Codec>(value: &T) -> Value {
    Context::new().serialize(value)
}

/// Validates then decodes `tree`. `None` exactly when validation fails.
#[inline]
pub fn deserialize<T: Codec>(tree: &Value) -> Option<T> {
    Context::new().deserialize(tree)
}

/// Validates then decodes `tree`, returning the diagnostics on failure.
#[inline]
pub fn try_deserialize<T: Codec>(tree: &Value) -> Result<T, ValidationError> {
    Context::new().try_deserialize(tree)
}

/// Decodes `tree` without validating it first.
///
/// # Panics
///
/// If `tree` is not a valid `T`.
#[inline]
pub fn deserialize_unchecked<T: Codec>(tree: &Value) -> T {
    Context::new().deserialize_unchecked(tree)
}

#[cfg(test)]
mod tests {
    use alloc::string::{String, ToString};
    use alloc::vec::Vec;

    use serde_json::json;

    use super::{deserialize, deserialize_unchecked, serialize, try_deserialize, validate};
    use crate::{Context, ContextOptions};

    #[test]
    fn negative_i32_round_trip() {
        let tree = serialize(&-437218_i32);
        assert_eq!(tree, json!(-437218));
        assert!(tree.is_i64());

        let value = deserialize::<i32>(&tree).unwrap();
        assert_eq!(value, -437218);
        assert_eq!(serialize(&value), tree);
    }

    #[test]
    fn deserialize_is_none_exactly_when_invalid() {
        let good = json!(["a", "b"]);
        let bad = json!(["a", 2]);
        assert!(validate::<Vec<String>>(&good));
        assert!(deserialize::<Vec<String>>(&good).is_some());
        assert!(!validate::<Vec<String>>(&bad));
        assert!(deserialize::<Vec<String>>(&bad).is_none());
    }

    #[test]
    fn try_deserialize_only_reports_its_own_diagnostics() {
        let mut ctx = Context::new();
        assert!(!ctx.validate::<bool>(&json!(1)));

        let error = ctx.try_deserialize::<u8>(&json!(-1)).unwrap_err();
        assert_eq!(error.errors.len(), 1);
        assert_eq!(ctx.diagnostics().len(), 1);
        assert!(try_deserialize::<u8>(&json!(1)).is_ok());
    }

    #[test]
    fn capped_session_still_reports_the_failing_call() {
        let mut ctx = Context::with_options(ContextOptions { max_diagnostics: 1 });
        assert!(!ctx.validate::<bool>(&json!(1)));
        assert_eq!(ctx.diagnostics().len(), 1);

        let error = ctx.try_deserialize::<Vec<u8>>(&json!([1, -1, 300])).unwrap_err();
        assert_eq!(error.errors.len(), 1);
        assert_eq!(error.errors[0].path.to_string(), "$[1]");
        assert_eq!(ctx.diagnostics().len(), 1);

        assert!(!ctx.validate::<u8>(&json!("x")));
        assert_eq!(ctx.diagnostics().len(), 2);
    }

    #[test]
    #[should_panic(expected = "unchecked decode of `Vec<u8>` failed: at `$[0]`")]
    fn unchecked_decode_panics_with_path() {
        deserialize_unchecked::<Vec<u8>>(&json!(["x"]));
    }
}
