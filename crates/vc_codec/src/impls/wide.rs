//! 128-bit integers, stored as decimal strings.
//!
//! JSON numbers stop at 64 bits. Wider integers are written as their
//! canonical decimal text: an optional `-`, no `+`, no leading zeros.
//! Validation parses the text, so a string with a plausible digit count
//! but a value beyond the type's range is refused.

use alloc::string::{String, ToString};
use core::str::FromStr;

use serde_json::Value;

use super::{impl_leaf_codec, mismatch};
use crate::{ErrorKind, TypeTag};

crate::impl_type_tag!(i128, u128);

fn is_decimal(text: &str) -> bool {
    let digits = text.strip_prefix('-').unwrap_or(text);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

fn parse_wide<T: FromStr + ToString + TypeTag>(tree: &Value) -> Result<T, ErrorKind> {
    let text = tree.as_str().ok_or_else(|| mismatch("decimal string", tree))?;
    match text.parse::<T>() {
        Ok(value) if value.to_string() == text => Ok(value),
        Err(_) if is_decimal(text) => Err(ErrorKind::OutOfRange {
            value: String::from(text),
            target: T::type_tag(),
        }),
        _ => Err(ErrorKind::Malformed {
            text: String::from(text),
            target: T::type_tag(),
        }),
    }
}

impl_leaf_codec!(i128, parse_wide::<i128>, |value| Value::String(value.to_string()));
impl_leaf_codec!(u128, parse_wide::<u128>, |value| Value::String(value.to_string()));
