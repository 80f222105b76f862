//! Maps, stored as arrays of `(K, V)` pair objects.
//!
//! Keys are not limited to strings, so a map cannot reuse the object
//! kind. Each entry is encoded exactly like the pair `(K, V)`.

use alloc::collections::BTreeMap;
use core::hash::{BuildHasher, Hash};
use std::collections::HashMap;

use serde_json::{Map, Value};

use super::{Ascending, ByText, pair_labels, sorted_by_text};
use crate::registry::{TypeCell, concat};
use crate::{Codec, CodecError, Context, ErrorKind, TypeTag};

fn encode_entry<K: Codec, V: Codec>(ctx: &mut Context, key: &K, value: &V) -> Value {
    let [key_label, value_label] = pair_labels::<K, V>();
    let mut entry = Map::new();
    let encoded = ctx.scoped(key_label.as_str(), |ctx| K::encode(ctx, key));
    entry.insert(key_label.clone(), encoded);
    let encoded = ctx.scoped(value_label.as_str(), |ctx| V::encode(ctx, value));
    entry.insert(value_label.clone(), encoded);
    Value::Object(entry)
}

/// Validates every entry as a pair, then hands each decoded key with its
/// entry to `admit`, which rejects repeated keys and entries out of order.
fn validate_entries<K: Codec, V: Codec>(
    ctx: &mut Context,
    tree: &Value,
    mut admit: impl FnMut(usize, &Value, K) -> Result<(), ErrorKind>,
) -> bool {
    let Some(array) = ctx.check_array(tree) else {
        return false;
    };
    if !ctx.validate_elements::<(K, V)>(array) {
        return false;
    }
    let key_label = pair_labels::<K, V>()[0].as_str();
    array.iter().enumerate().all(|(index, entry)| {
        ctx.scoped(index, |ctx| {
            let key = ctx
                .as_object(entry)
                .and_then(|map| ctx.decode_key::<K>(map, key_label));
            match key.map(|key| admit(index, entry, key)) {
                Ok(Ok(())) => true,
                Ok(Err(kind)) => ctx.reject(kind),
                Err(error) => ctx.reject(error.kind),
            }
        })
    })
}

fn decode_entries<K: Codec, V: Codec, M: FromIterator<(K, V)>>(
    ctx: &mut Context,
    tree: &Value,
) -> Result<M, CodecError> {
    let array = ctx.as_array(tree)?;
    ctx.decode_elements::<(K, V)>(array).collect()
}

impl<K: TypeTag, V: TypeTag> TypeTag for BTreeMap<K, V> {
    fn type_tag() -> &'static str {
        static CELL: TypeCell = TypeCell::new();
        CELL.get_or_insert::<Self, _>(|| {
            concat(&["BTreeMap<", K::type_tag(), ", ", V::type_tag(), ">"])
        })
    }
}

impl<K: Codec + Ord, V: Codec> Codec for BTreeMap<K, V> {
    fn validate(ctx: &mut Context, tree: &Value) -> bool {
        let mut seen = Ascending::new();
        validate_entries::<K, V>(ctx, tree, |index, _, key| seen.admit(index, key))
    }

    fn encode(ctx: &mut Context, value: &Self) -> Value {
        Value::Array(
            value
                .iter()
                .enumerate()
                .map(|(index, (k, v))| ctx.scoped(index, |ctx| encode_entry(ctx, k, v)))
                .collect(),
        )
    }

    #[inline]
    fn decode(ctx: &mut Context, tree: &Value) -> Result<Self, CodecError> {
        decode_entries(ctx, tree)
    }
}

impl<K: TypeTag, V: TypeTag, S: 'static> TypeTag for HashMap<K, V, S> {
    fn type_tag() -> &'static str {
        static CELL: TypeCell = TypeCell::new();
        CELL.get_or_insert::<Self, _>(|| {
            concat(&["HashMap<", K::type_tag(), ", ", V::type_tag(), ">"])
        })
    }
}

impl<K, V, S> Codec for HashMap<K, V, S>
where
    K: Codec + Eq + Hash,
    V: Codec,
    S: BuildHasher + Default + 'static,
{
    fn validate(ctx: &mut Context, tree: &Value) -> bool {
        let mut seen = ByText::<K, S>::new();
        validate_entries::<K, V>(ctx, tree, |index, entry, key| seen.admit(index, entry, key))
    }

    fn encode(ctx: &mut Context, value: &Self) -> Value {
        sorted_by_text(
            value
                .iter()
                .enumerate()
                .map(|(index, (k, v))| ctx.scoped(index, |ctx| encode_entry(ctx, k, v))),
        )
    }

    #[inline]
    fn decode(ctx: &mut Context, tree: &Value) -> Result<Self, CodecError> {
        decode_entries(ctx, tree)
    }
}

#[cfg(test)]
mod tests {
    use alloc::collections::BTreeMap;
    use alloc::string::{String, ToString};
    use std::collections::HashMap;

    use serde_json::json;

    use crate::{Context, ErrorKind, TypeTag, deserialize, serialize, validate};

    #[test]
    fn entries_are_pairs() {
        let map = BTreeMap::from([(2_u8, "two".to_string()), (1, "one".to_string())]);
        let tree = serialize(&map);
        assert_eq!(
            tree,
            json!([
                { "0:u8": 1, "1:String": "one" },
                { "0:u8": 2, "1:String": "two" },
            ])
        );
        assert_eq!(deserialize::<BTreeMap<u8, String>>(&tree), Some(map));
        assert_eq!(<BTreeMap<u8, String>>::type_tag(), "BTreeMap<u8, String>");
    }

    #[test]
    fn keys_need_not_be_strings() {
        let map = HashMap::from([((1_i8, -1_i8), true), ((0, 0), false)]);
        let back = deserialize::<HashMap<(i8, i8), bool>>(&serialize(&map));
        assert_eq!(back, Some(map));
    }

    #[test]
    fn repeated_keys_are_refused() {
        let tree = json!([
            { "0:u8": 1, "1:bool": true },
            { "0:u8": 1, "1:bool": false },
        ]);
        let mut ctx = Context::new();
        assert!(!ctx.validate::<BTreeMap<u8, bool>>(&tree));
        assert_eq!(ctx.diagnostics()[0].kind, ErrorKind::Duplicate(1));
        assert!(!validate::<HashMap<u8, bool>>(&tree));
    }

    #[test]
    fn entries_must_be_in_canonical_order() {
        let tree = json!([
            { "0:u8": 2, "1:bool": true },
            { "0:u8": 1, "1:bool": false },
        ]);
        let mut ctx = Context::new();
        assert!(!ctx.validate::<BTreeMap<u8, bool>>(&tree));
        assert_eq!(ctx.diagnostics()[0].kind, ErrorKind::Unordered(1));
        assert!(!validate::<HashMap<u8, bool>>(&tree));
    }

    #[test]
    fn hash_maps_re_encode_to_the_same_tree() {
        let map: HashMap<String, u8> = ('a'..='h').map(|c| (c.to_string(), c as u8)).collect();
        let tree = serialize(&map);
        assert!(validate::<HashMap<String, u8>>(&tree));
        assert_eq!(tree[0], json!({ "0:String": "a", "1:u8": 97 }));
        for _ in 0..8 {
            let back = deserialize::<HashMap<String, u8>>(&tree).unwrap();
            assert_eq!(serialize(&back), tree);
        }
    }

    #[test]
    fn malformed_entries_are_refused() {
        assert!(validate::<BTreeMap<u8, bool>>(&json!([])));
        assert!(!validate::<BTreeMap<u8, bool>>(&json!({})));
        assert!(!validate::<BTreeMap<u8, bool>>(&json!([{ "0:u8": 1 }])));
        assert!(!validate::<BTreeMap<u8, bool>>(&json!([[1, true]])));
    }
}
