use alloc::borrow::Cow;
use alloc::string::String;
use alloc::vec::Vec;

use serde_json::{Map, Value};

use super::Context;
use crate::Codec;
use crate::error::{CodecError, ErrorKind};

/// Human name of the kind of `tree`, as used in diagnostics.
pub(crate) fn kind_name(tree: &Value) -> &'static str {
    match tree {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(n) if n.is_u64() => "unsigned integer",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn mismatch(expected: &'static str, found: &Value) -> ErrorKind {
    ErrorKind::KindMismatch {
        expected,
        found: kind_name(found),
    }
}

/// Structural access shared by the built-in codecs.
///
/// `as_*` methods parse for decoding and return located errors,
/// `check_*` methods parse for validation and record a rejection.
impl Context {
    #[inline]
    pub fn as_object<'t>(&self, tree: &'t Value) -> Result<&'t Map<String, Value>, CodecError> {
        tree.as_object().ok_or_else(|| self.error(mismatch("object", tree)))
    }

    #[inline]
    pub fn as_array<'t>(&self, tree: &'t Value) -> Result<&'t Vec<Value>, CodecError> {
        tree.as_array().ok_or_else(|| self.error(mismatch("array", tree)))
    }

    #[inline]
    pub fn as_str<'t>(&self, tree: &'t Value) -> Result<&'t str, CodecError> {
        tree.as_str().ok_or_else(|| self.error(mismatch("string", tree)))
    }

    pub fn check_object<'t>(&mut self, tree: &'t Value) -> Option<&'t Map<String, Value>> {
        let map = tree.as_object();
        if map.is_none() {
            self.reject(mismatch("object", tree));
        }
        map
    }

    pub fn check_array<'t>(&mut self, tree: &'t Value) -> Option<&'t Vec<Value>> {
        let array = tree.as_array();
        if array.is_none() {
            self.reject(mismatch("array", tree));
        }
        array
    }

    /// Rejects an object holding keys outside `allowed`.
    pub fn check_keys(&mut self, map: &Map<String, Value>, allowed: &[&str]) -> bool {
        let mut valid = true;
        for key in map.keys() {
            if !allowed.contains(&key.as_str()) {
                valid = self.reject(ErrorKind::UnknownKey(key.clone()));
            }
        }
        valid
    }

    /// Validates the value under `key` as a `T`, rejecting a missing key.
    pub fn validate_key<T: Codec>(&mut self, map: &Map<String, Value>, key: &'static str) -> bool {
        match map.get(key) {
            Some(tree) => self.scoped(key, |ctx| T::validate(ctx, tree)),
            None => self.reject(ErrorKind::MissingKey(Cow::Borrowed(key))),
        }
    }

    /// Decodes the value under `key` as a `T`.
    pub fn decode_key<T: Codec>(
        &mut self,
        map: &Map<String, Value>,
        key: &'static str,
    ) -> Result<T, CodecError> {
        match map.get(key) {
            Some(tree) => self.scoped(key, |ctx| T::decode(ctx, tree)),
            None => Err(self.error(ErrorKind::MissingKey(Cow::Borrowed(key)))),
        }
    }

    /// Validates every element of `array` as a `T`.
    ///
    /// All elements are visited, so every bad one gets a diagnostic.
    pub fn validate_elements<T: Codec>(&mut self, array: &[Value]) -> bool {
        let mut valid = true;
        for (index, tree) in array.iter().enumerate() {
            valid &= self.scoped(index, |ctx| T::validate(ctx, tree));
        }
        valid
    }

    /// Decodes every element of `array` as a `T`, in order.
    pub fn decode_elements<'t, T: Codec>(
        &'t mut self,
        array: &'t [Value],
    ) -> impl Iterator<Item = Result<T, CodecError>> + 't {
        array
            .iter()
            .enumerate()
            .map(move |(index, tree)| self.scoped(index, |ctx| T::decode(ctx, tree)))
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use serde_json::json;

    use super::kind_name;
    use crate::context::Context;
    use crate::error::ErrorKind;

    #[test]
    fn kind_names_split_numbers() {
        assert_eq!(kind_name(&json!(-1)), "integer");
        assert_eq!(kind_name(&json!(1)), "unsigned integer");
        assert_eq!(kind_name(&json!(1.5)), "float");
        assert_eq!(kind_name(&json!(null)), "null");
    }

    #[test]
    fn check_keys_reports_each_unknown_key() {
        let mut ctx = Context::new();
        let tree = json!({ "a": 1, "b": 2, "c": 3 });
        let map = ctx.check_object(&tree).unwrap();
        assert!(!ctx.check_keys(map, &["a"]));
        assert_eq!(ctx.diagnostics().len(), 2);
        assert!(matches!(ctx.diagnostics()[0].kind, ErrorKind::UnknownKey(_)));
    }

    #[test]
    fn missing_key_is_located_at_parent() {
        let mut ctx = Context::new();
        let tree = json!({});
        let map = tree.as_object().unwrap();
        let error = ctx.decode_key::<u8>(map, "x").unwrap_err();
        assert!(error.path.is_root());
        assert_eq!(error.kind, ErrorKind::MissingKey("x".into()));
    }

    #[test]
    fn elements_are_visited_past_the_first_failure() {
        let mut ctx = Context::new();
        let tree = json!([true, 1, false, "x"]);
        assert!(!ctx.validate_elements::<bool>(tree.as_array().unwrap()));
        assert_eq!(ctx.diagnostics().len(), 2);
        assert_eq!(ctx.diagnostics()[1].path.to_string(), "$[3]");
    }
}
