use alloc::format;
use alloc::string::String;

use serde_json::Value;

use super::{impl_leaf_codec, mismatch};
use crate::ErrorKind;

/// A raw byte, stored as `"0x"` followed by two lowercase hex digits.
///
/// Use it where a `u8` is data rather than a number, so the tree reads
/// like a dump.
///
/// # Examples
///
/// ```
/// use vc_codec::{Byte, serialize, validate};
///
/// assert_eq!(serialize(&Byte(0xAB)), serde_json::json!("0xab"));
/// assert!(!validate::<Byte>(&serde_json::json!("0xAB")));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[repr(transparent)]
pub struct Byte(pub u8);

impl From<u8> for Byte {
    #[inline]
    fn from(value: u8) -> Self {
        Self(value)
    }
}

impl From<Byte> for u8 {
    #[inline]
    fn from(value: Byte) -> Self {
        value.0
    }
}

crate::impl_type_tag!(Byte);

fn is_lower_hex(b: u8) -> bool {
    b.is_ascii_digit() || (b'a'..=b'f').contains(&b)
}

fn parse_byte(tree: &Value) -> Result<Byte, ErrorKind> {
    let text = tree.as_str().ok_or_else(|| mismatch("string", tree))?;
    let malformed = || ErrorKind::Malformed {
        text: String::from(text),
        target: "Byte",
    };
    let digits = text.strip_prefix("0x").ok_or_else(malformed)?;
    if digits.len() != 2 || !digits.bytes().all(is_lower_hex) {
        return Err(malformed());
    }
    u8::from_str_radix(digits, 16).map(Byte).map_err(|_| malformed())
}

impl_leaf_codec!(Byte, parse_byte, |value| Value::String(format!("0x{:02x}", value.0)));
