use alloc::borrow::Cow;
use alloc::boxed::Box;
use alloc::string::String;

use serde_json::Value;

use super::{impl_leaf_codec, mismatch};
use crate::ErrorKind;

crate::impl_type_tag!(String, str);
crate::impl_type_tag!(Cow<'static, str> as "Cow<str>");

fn parse_string(tree: &Value) -> Result<String, ErrorKind> {
    tree.as_str()
        .map(String::from)
        .ok_or_else(|| mismatch("string", tree))
}

impl_leaf_codec!(String, parse_string, |value| Value::String(value.clone()));

impl_leaf_codec!(
    Box<str>,
    |tree| parse_string(tree).map(String::into_boxed_str),
    |value| Value::String(String::from(&**value))
);

impl_leaf_codec!(
    Cow<'static, str>,
    |tree| parse_string(tree).map(Cow::<str>::Owned),
    |value| Value::String(String::from(&**value))
);

#[cfg(test)]
mod tests {
    use alloc::borrow::Cow;
    use alloc::boxed::Box;
    use alloc::string::String;

    use serde_json::json;

    use crate::{TypeTag, deserialize, serialize, validate};

    #[test]
    fn strings_are_native() {
        assert_eq!(serialize(&String::from("FooBar")), json!("FooBar"));
        assert_eq!(deserialize::<String>(&json!("")), Some(String::new()));
        assert!(!validate::<String>(&json!(null)));
        assert!(!validate::<String>(&json!(['a'])));
    }

    #[test]
    fn string_likes_share_the_encoding() {
        let boxed: Box<str> = "text".into();
        let cow: Cow<'static, str> = Cow::Borrowed("text");
        assert_eq!(serialize(&boxed), serialize(&cow));
        assert_eq!(deserialize::<Box<str>>(&json!("text")), Some(boxed));
        assert_eq!(deserialize::<Cow<'static, str>>(&json!("text")), Some(cow));
        assert_eq!(<Box<str>>::type_tag(), "Box<str>");
    }
}
