//! `bool`, `char`, native-width integers and floats.

use alloc::string::{String, ToString};

use serde_json::{Number, Value};

use super::{impl_leaf_codec, mismatch};
use crate::{ErrorKind, TypeTag};

crate::impl_type_tag!(bool, char, i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);

// -----------------------------------------------------------------------------
// bool & char

fn parse_bool(tree: &Value) -> Result<bool, ErrorKind> {
    tree.as_bool().ok_or_else(|| mismatch("boolean", tree))
}

fn parse_char(tree: &Value) -> Result<char, ErrorKind> {
    let text = tree.as_str().ok_or_else(|| mismatch("string", tree))?;
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(ErrorKind::Malformed {
            text: String::from(text),
            target: "char",
        }),
    }
}

impl_leaf_codec!(bool, parse_bool, |value| Value::Bool(*value));
impl_leaf_codec!(char, parse_char, |value| Value::String(value.to_string()));

// -----------------------------------------------------------------------------
// Integers

/// Integral numbers only: a float node never becomes an integer, even
/// when it has no fractional part.
fn integral(tree: &Value) -> Result<&Number, ErrorKind> {
    match tree {
        Value::Number(number) if !number.is_f64() => Ok(number),
        _ => Err(mismatch("integer", tree)),
    }
}

fn parse_signed<T: TryFrom<i64> + TypeTag>(tree: &Value) -> Result<T, ErrorKind> {
    let number = integral(tree)?;
    number
        .as_i64()
        .and_then(|wide| T::try_from(wide).ok())
        .ok_or_else(|| ErrorKind::OutOfRange {
            value: number.to_string(),
            target: T::type_tag(),
        })
}

fn parse_unsigned<T: TryFrom<u64> + TypeTag>(tree: &Value) -> Result<T, ErrorKind> {
    let number = integral(tree)?;
    number
        .as_u64()
        .and_then(|wide| T::try_from(wide).ok())
        .ok_or_else(|| ErrorKind::OutOfRange {
            value: number.to_string(),
            target: T::type_tag(),
        })
}

macro_rules! impl_integer_codec {
    ($parse:ident: $($ty:ident)*) => {$(
        impl_leaf_codec!($ty, $parse::<$ty>, |value| Value::from(*value));
    )*};
}

impl_integer_codec!(parse_signed: i8 i16 i32 i64 isize);
impl_integer_codec!(parse_unsigned: u8 u16 u32 u64 usize);

// -----------------------------------------------------------------------------
// Floats

const NAN: &str = "NaN";
const INFINITY: &str = "inf";
const NEG_INFINITY: &str = "-inf";

fn parse_float(tree: &Value, target: &'static str) -> Result<f64, ErrorKind> {
    match tree {
        Value::Number(number) if number.is_f64() => number.as_f64().ok_or_else(|| mismatch("float", tree)),
        Value::String(text) => match text.as_str() {
            NAN => Ok(f64::NAN),
            INFINITY => Ok(f64::INFINITY),
            NEG_INFINITY => Ok(f64::NEG_INFINITY),
            _ => Err(ErrorKind::Malformed {
                text: text.clone(),
                target,
            }),
        },
        _ => Err(mismatch("float", tree)),
    }
}

fn parse_f64(tree: &Value) -> Result<f64, ErrorKind> {
    parse_float(tree, "f64")
}

fn parse_f32(tree: &Value) -> Result<f32, ErrorKind> {
    let wide = parse_float(tree, "f32")?;
    let narrow = wide as f32;
    if narrow.is_nan() || f64::from(narrow) == wide {
        Ok(narrow)
    } else {
        Err(ErrorKind::OutOfRange {
            value: wide.to_string(),
            target: "f32",
        })
    }
}

fn encode_float(value: f64) -> Value {
    match Number::from_f64(value) {
        Some(number) => Value::Number(number),
        None if value.is_nan() => Value::from(NAN),
        None if value > 0.0 => Value::from(INFINITY),
        None => Value::from(NEG_INFINITY),
    }
}

impl_leaf_codec!(f64, parse_f64, |value| encode_float(*value));
impl_leaf_codec!(f32, parse_f32, |value| encode_float(f64::from(*value)));

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use serde_json::json;

    use crate::{Context, ErrorKind, deserialize, serialize, validate};

    #[test]
    fn bool_requires_boolean_kind() {
        assert_eq!(serialize(&true), json!(true));
        assert!(validate::<bool>(&json!(false)));
        assert!(!validate::<bool>(&json!(0)));
        assert!(!validate::<bool>(&json!("true")));
    }

    #[test]
    fn char_is_one_scalar_string() {
        assert_eq!(serialize(&'é'), json!("é"));
        assert_eq!(deserialize::<char>(&json!("é")), Some('é'));
        assert!(!validate::<char>(&json!("")));
        assert!(!validate::<char>(&json!("ab")));
        assert!(!validate::<char>(&json!(97)));
    }

    #[test]
    fn integers_check_range() {
        assert!(validate::<u8>(&json!(255)));
        assert!(!validate::<u8>(&json!(256)));
        assert!(!validate::<u8>(&json!(-1)));
        assert!(validate::<i8>(&json!(-128)));
        assert!(!validate::<i8>(&json!(128)));
        assert!(validate::<u64>(&json!(u64::MAX)));
        assert!(!validate::<i64>(&json!(u64::MAX)));
        assert_eq!(deserialize::<isize>(&json!(-3)), Some(-3));
    }

    #[test]
    fn integers_refuse_float_kind() {
        let mut ctx = Context::new();
        assert!(!ctx.validate::<i32>(&json!(1.0)));
        assert!(!ctx.validate::<u32>(&json!(1.5)));
        assert_eq!(
            ctx.diagnostics()[0].kind,
            ErrorKind::KindMismatch {
                expected: "integer",
                found: "float"
            }
        );
    }

    #[test]
    fn out_of_range_names_value_and_target() {
        let mut ctx = Context::new();
        assert!(!ctx.validate::<u16>(&json!(70000)));
        assert_eq!(
            ctx.diagnostics()[0].kind.to_string(),
            "`70000` does not fit in `u16`"
        );
    }

    #[test]
    fn floats_round_trip() {
        assert_eq!(serialize(&1.5_f64), json!(1.5));
        assert_eq!(deserialize::<f64>(&json!(-0.25)), Some(-0.25));
        assert_eq!(deserialize::<f32>(&serialize(&0.1_f32)), Some(0.1_f32));
        assert!(!validate::<f64>(&json!(1)));
    }

    #[test]
    fn f32_refuses_precision_loss() {
        assert!(validate::<f32>(&json!(0.5)));
        assert!(!validate::<f32>(&json!(0.1)));
        assert!(!validate::<f32>(&json!(1e300)));
    }

    #[test]
    fn non_finite_floats_use_strings() {
        assert_eq!(serialize(&f64::INFINITY), json!("inf"));
        assert_eq!(serialize(&f32::NEG_INFINITY), json!("-inf"));
        assert_eq!(serialize(&f64::NAN), json!("NaN"));
        assert!(deserialize::<f64>(&json!("NaN")).is_some_and(f64::is_nan));
        assert_eq!(deserialize::<f32>(&json!("inf")), Some(f32::INFINITY));
        assert!(!validate::<f64>(&json!("nan")));
        assert!(!validate::<f64>(&json!("1.5")));
    }
}
