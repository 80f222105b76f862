//! Tuples, as aggregates whose slots are construction parameters.
//!
//! Slot `i` holding a `P` is stored under `"{i}:{tag of P}"`, so a pair
//! `(u8, String)` is `{"0:u8": .., "1:String": ..}` and `()` is `{}`.

use alloc::format;
use alloc::string::String;

use crate::class::{ClassBuilder, ClassCodec, Construction, FieldOptions, class_config};
use crate::registry::{TypeCell, concat};
use crate::{Codec, CodecError, Context, TypeTag, Value};

fn slot_label(index: usize, tag: &str) -> String {
    format!("{index}:{tag}")
}

fn tuple_tag(parts: &[&str]) -> String {
    match parts {
        [single] => concat(&["(", single, ",)"]),
        _ => format!("({})", parts.join(", ")),
    }
}

/// Keys of the two slots of a `(K, V)` pair.
pub(crate) fn pair_labels<K: TypeTag, V: TypeTag>() -> &'static [String; 2] {
    static CELL: TypeCell = TypeCell::new();
    CELL.get_or_insert::<(K, V), _>(|| [slot_label(0, K::type_tag()), slot_label(1, V::type_tag())])
}

macro_rules! impl_tuple_codec {
    ([$($index:tt: $name:ident),*]) => {
        impl<$($name: TypeTag),*> TypeTag for ($($name,)*) {
            fn type_tag() -> &'static str {
                static CELL: TypeCell = TypeCell::new();
                CELL.get_or_insert::<Self, _>(|| {
                    let parts: &[&str] = &[$($name::type_tag()),*];
                    tuple_tag(parts)
                })
            }
        }

        impl<$($name: Codec),*> ClassCodec for ($($name,)*) {
            fn configure(class: &mut ClassBuilder<Self>) -> Construction<Self> {
                let params = ($(
                    class.param_ref_with(
                        |tuple: &Self| &tuple.$index,
                        FieldOptions::new().with_label(slot_label($index, $name::type_tag())),
                    ),
                )*);
                class.construct(params, |values| values)
            }
        }

        impl<$($name: Codec),*> Codec for ($($name,)*) {
            #[inline]
            fn validate(ctx: &mut Context, tree: &Value) -> bool {
                class_config::<Self>().validate(ctx, tree)
            }

            #[inline]
            fn encode(ctx: &mut Context, value: &Self) -> Value {
                class_config::<Self>().encode(ctx, value)
            }

            #[inline]
            fn decode(ctx: &mut Context, tree: &Value) -> Result<Self, CodecError> {
                class_config::<Self>().decode(ctx, tree)
            }
        }
    };
}

vc_utils::range_invoke!(impl_tuple_codec, [
    0: P0, 1: P1, 2: P2, 3: P3, 4: P4, 5: P5,
    6: P6, 7: P7, 8: P8, 9: P9, 10: P10, 11: P11,
]);

#[cfg(test)]
mod tests {
    use alloc::string::{String, ToString};
    use alloc::vec;
    use alloc::vec::Vec;

    use serde_json::json;

    use super::pair_labels;
    use crate::{Codec, Context, ErrorKind, TypeTag, deserialize, serialize, validate};

    fn round_trip<T: Codec>(value: &T) -> Option<T> {
        deserialize(&serialize(value))
    }

    #[test]
    fn tags_follow_rust_spelling() {
        assert_eq!(<()>::type_tag(), "()");
        assert_eq!(<(u8,)>::type_tag(), "(u8,)");
        assert_eq!(<(u8, (bool, char))>::type_tag(), "(u8, (bool, char))");
    }

    #[test]
    fn slots_are_keyed_by_index_and_tag() {
        let pair = (7_u8, String::from("seven"));
        let tree = serialize(&pair);
        assert_eq!(tree, json!({ "0:u8": 7, "1:String": "seven" }));
        assert_eq!(deserialize::<(u8, String)>(&tree), Some(pair));
        assert_eq!(pair_labels::<u8, String>(), &["0:u8", "1:String"]);
    }

    #[test]
    fn unit_is_an_empty_object() {
        assert_eq!(serialize(&()), json!({}));
        assert_eq!(deserialize::<()>(&json!({})), Some(()));
        assert!(!validate::<()>(&json!({ "0:u8": 1 })));
        assert!(!validate::<()>(&json!([])));
    }

    #[test]
    fn repeated_slot_types_stay_apart() {
        let triple = (1_i64, 2_i64, vec![3_i64]);
        let tree = serialize(&triple);
        assert_eq!(tree, json!({ "0:i64": 1, "1:i64": 2, "2:Vec<i64>": [3] }));
        assert_eq!(deserialize::<(i64, i64, Vec<i64>)>(&tree), Some(triple));
    }

    #[test]
    fn largest_arity() {
        let wide = (0_u8, 1_u8, 2_u8, 3_u8, 4_u8, 5_u8, 6_u8, 7_u8, 8_u8, 9_u8, 10_u8, 11_u8);
        assert_eq!(round_trip(&wide), Some(wide));
    }

    #[test]
    fn wrong_slot_kind_is_located() {
        let mut ctx = Context::new();
        assert!(!ctx.validate::<(u8, bool)>(&json!({ "0:u8": 1, "1:bool": "yes" })));
        let error = &ctx.diagnostics()[0];
        assert_eq!(error.path.to_string(), "$[\"1:bool\"]");
        assert!(matches!(error.kind, ErrorKind::KindMismatch { .. }));
    }
}
