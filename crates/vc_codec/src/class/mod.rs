//! Codecs for aggregates, declared instead of written.
//!
//! A type implements [`ClassCodec`] by describing itself to a
//! [`ClassBuilder`]: which values are needed to build it, how to read
//! them from an instance, and how to build it from them. The resulting
//! [`ClassConfig`] is built on first use, stored once per type, and
//! provides `validate`, `encode` and `decode`.
//!
//! Aggregates are objects. Keys come from labels given at registration,
//! or are generated (`param0`, `param1`, ...).
//!
//! # Examples
//!
//! ```
//! use vc_codec::{ClassBuilder, ClassCodec, Construction, FieldOptions, impl_class_codec};
//! use vc_codec::{deserialize, serialize, validate};
//!
//! #[derive(Debug, PartialEq)]
//! struct Range {
//!     min: i32,
//!     max: i32,
//!     name: String,
//! }
//!
//! impl ClassCodec for Range {
//!     fn configure(class: &mut ClassBuilder<Self>) -> Construction<Self> {
//!         let min = class.param_with(|r: &Range| r.min, FieldOptions::new().with_label("min"));
//!         let max = class.param_with(|r: &Range| r.max, FieldOptions::new().with_label("max"));
//!         class.field_with(
//!             |r: &Range| &r.name,
//!             |r: &mut Range| &mut r.name,
//!             FieldOptions::new().with_label("name"),
//!         );
//!         class.construct_validated(
//!             (min, max),
//!             |(min, max)| Range { min, max, name: String::new() },
//!             |(min, max)| min <= max,
//!         )
//!     }
//! }
//!
//! impl_class_codec!(Range);
//!
//! let range = Range { min: 1, max: 5, name: "r".into() };
//! let tree = serialize(&range);
//! assert_eq!(tree, serde_json::json!({ "min": 1, "max": 5, "name": "r" }));
//! assert_eq!(deserialize::<Range>(&tree), Some(range));
//!
//! assert!(!validate::<Range>(&serde_json::json!({ "min": 5, "max": 1, "name": "" })));
//! ```

// -----------------------------------------------------------------------------
// Modules

mod builder;
mod config;
mod param;

// -----------------------------------------------------------------------------
// Exports

pub use builder::{ClassBuilder, FieldOptions};
pub use config::{ClassConfig, Construction};
pub use param::{Param, ParamList};

use crate::registry::TypeCell;
use crate::TypeTag;

// -----------------------------------------------------------------------------
// ClassCodec

/// An aggregate described through a [`ClassBuilder`].
///
/// Implementing this trait does not implement [`Codec`](crate::Codec);
/// [`impl_class_codec!`](crate::impl_class_codec) does, by delegating to
/// [`class_config`].
pub trait ClassCodec: TypeTag + Sized {
    /// Registers the parts of `Self` on `class` and returns how to build it.
    ///
    /// Called once per process, on first use of the type.
    fn configure(class: &mut ClassBuilder<Self>) -> Construction<Self>;
}

/// The configuration of `T`, built on first call.
pub fn class_config<T: ClassCodec>() -> &'static ClassConfig<T> {
    static CELL: TypeCell = TypeCell::new();
    CELL.get_or_insert::<T, _>(|| {
        let mut class = ClassBuilder::new();
        let construction = T::configure(&mut class);
        class.finish(construction)
    })
}

/// Implements [`Codec`](crate::Codec) for a [`ClassCodec`] type, along
/// with its [`TypeTag`].
///
/// `impl_class_codec!(Type)` tags the type with its identifier,
/// `impl_class_codec!(path::Type as "tag")` with an explicit tag.
#[macro_export]
macro_rules! impl_class_codec {
    (@codec $ty:ty) => {
        impl $crate::Codec for $ty {
            #[inline]
            fn validate(ctx: &mut $crate::Context, tree: &$crate::Value) -> bool {
                $crate::class::class_config::<Self>().validate(ctx, tree)
            }

            #[inline]
            fn encode(ctx: &mut $crate::Context, value: &Self) -> $crate::Value {
                $crate::class::class_config::<Self>().encode(ctx, value)
            }

            #[inline]
            fn decode(
                ctx: &mut $crate::Context,
                tree: &$crate::Value,
            ) -> ::core::result::Result<Self, $crate::CodecError> {
                $crate::class::class_config::<Self>().decode(ctx, tree)
            }
        }
    };
    ($ty:ident) => {
        $crate::impl_type_tag!($ty);
        $crate::impl_class_codec!(@codec $ty);
    };
    ($ty:ty as $tag:expr) => {
        $crate::impl_type_tag!($ty as $tag);
        $crate::impl_class_codec!(@codec $ty);
    };
}

#[cfg(test)]
mod tests {
    use alloc::string::{String, ToString};
    use alloc::vec;
    use alloc::vec::Vec;

    use serde_json::{Value, json};

    use super::{ClassBuilder, ClassCodec, Construction, FieldOptions, class_config};
    use crate::{Context, ErrorKind, deserialize, serialize, validate};

    // A point built from its coordinates.
    #[derive(Debug, Clone, PartialEq)]
    struct Point3D {
        x: i32,
        y: i32,
        z: i32,
    }

    impl ClassCodec for Point3D {
        fn configure(class: &mut ClassBuilder<Self>) -> Construction<Self> {
            let x = class.param(|p: &Self| p.x);
            let y = class.param(|p: &Self| p.y);
            let z = class.param(|p: &Self| p.z);
            class.construct((x, y, z), |(x, y, z)| Point3D { x, y, z })
        }
    }

    crate::impl_class_codec!(Point3D);

    // Default-built, with state in a field, a property and an initialiser.
    #[derive(Debug, Default, PartialEq)]
    struct Buffer {
        name: String,
        bytes: Vec<u8>,
        capacity: usize,
        flagged: bool,
    }

    impl Buffer {
        fn flagged(&self) -> bool {
            self.flagged
        }

        fn set_flagged(&mut self, flagged: bool) {
            self.flagged = flagged;
        }
    }

    impl ClassCodec for Buffer {
        fn configure(class: &mut ClassBuilder<Self>) -> Construction<Self> {
            class.field_with(
                |b: &Self| &b.name,
                |b: &mut Self| &mut b.name,
                FieldOptions::new()
                    .with_label("name")
                    .with_validator(|name: &String| !name.is_empty()),
            );
            class.field(|b: &Self| &b.bytes, |b: &mut Self| &mut b.bytes);
            class.property(Buffer::flagged, Buffer::set_flagged);
            let capacity = class.param_with(
                |b: &Self| b.capacity,
                FieldOptions::new().with_label("capacity"),
            );
            class.initialise_validated(
                capacity,
                |b: &mut Self, capacity| b.capacity = capacity,
                |capacity| *capacity <= 1024,
            );
            Construction::default_value()
        }
    }

    crate::impl_class_codec!(Buffer);

    // A constant, a generated value and hooks owning an extra key.
    #[derive(Debug, PartialEq)]
    struct Versioned {
        payload: u16,
        note: Option<String>,
    }

    impl From<(u8, u16)> for Versioned {
        fn from((_, payload): (u8, u16)) -> Self {
            Self { payload, note: None }
        }
    }

    impl ClassCodec for Versioned {
        fn configure(class: &mut ClassBuilder<Self>) -> Construction<Self> {
            let version = class.param_const_with(2_u8, "version");
            let payload = class.param(|v: &Self| v.payload);
            class.reserve_key::<String>("note");
            class.post_encode(|_, value: &Self, map| {
                if let Some(note) = &value.note {
                    map.insert("note".to_string(), Value::from(note.as_str()));
                }
            });
            class.post_decode(|_, map, value: &mut Self| {
                value.note = map.get("note").and_then(Value::as_str).map(String::from);
            });
            class.construct_from((version, payload))
        }
    }

    crate::impl_class_codec!(Versioned as "tests::Versioned");

    #[test]
    fn generated_labels() {
        let tree = serialize(&Point3D { x: 1, y: -2, z: 3 });
        assert_eq!(tree, json!({ "param0": 1, "param1": -2, "param2": 3 }));
        assert_eq!(
            class_config::<Point3D>().labels().collect::<Vec<_>>(),
            ["param0", "param1", "param2"]
        );
    }

    #[test]
    fn round_trip_through_construction() {
        let points = vec![Point3D { x: 0, y: 0, z: 0 }, Point3D { x: 7, y: 8, z: -9 }];
        let tree = serialize(&points);
        assert_eq!(deserialize::<Vec<Point3D>>(&tree), Some(points));
    }

    #[test]
    fn key_set_must_match_exactly() {
        let mut ctx = Context::new();
        assert!(!ctx.validate::<Point3D>(&json!({ "param0": 1, "param1": 2 })));
        assert_eq!(
            ctx.diagnostics()[0].kind,
            ErrorKind::MissingKey("param2".into())
        );

        let mut ctx = Context::new();
        let tree = json!({ "param0": 1, "param1": 2, "param2": 3, "param3": 4 });
        assert!(!ctx.validate::<Point3D>(&tree));
        assert_eq!(
            ctx.diagnostics()[0].kind,
            ErrorKind::UnknownKey("param3".to_string())
        );
        assert!(!validate::<Point3D>(&json!([1, 2, 3])));
    }

    #[test]
    fn bad_slot_is_located() {
        let mut ctx = Context::new();
        let tree = json!([{ "param0": 1, "param1": "2", "param2": 3 }]);
        assert!(!ctx.validate::<Vec<Point3D>>(&tree));
        assert_eq!(ctx.diagnostics()[0].path.to_string(), "$[0].param1");
    }

    #[test]
    fn fields_properties_and_initialisers() {
        let buffer = Buffer {
            name: "log".to_string(),
            bytes: vec![1, 2],
            capacity: 64,
            flagged: true,
        };
        let tree = serialize(&buffer);
        assert_eq!(
            tree,
            json!({ "name": "log", "param0": [1, 2], "param1": true, "capacity": 64 })
        );
        assert_eq!(deserialize::<Buffer>(&tree), Some(buffer));
    }

    #[test]
    fn field_and_joint_validators() {
        let mut ctx = Context::new();
        let tree = json!({ "name": "", "param0": [], "param1": false, "capacity": 1 });
        assert!(!ctx.validate::<Buffer>(&tree));
        assert_eq!(ctx.diagnostics()[0].kind, ErrorKind::Rejected("field"));
        assert_eq!(ctx.diagnostics()[0].path.to_string(), "$.name");

        let mut ctx = Context::new();
        let tree = json!({ "name": "x", "param0": [], "param1": false, "capacity": 4096 });
        assert!(!ctx.validate::<Buffer>(&tree));
        assert_eq!(ctx.diagnostics()[0].kind, ErrorKind::Rejected("initialiser"));
    }

    #[test]
    fn constants_and_reserved_keys() {
        let plain = Versioned {
            payload: 9,
            note: None,
        };
        let tree = serialize(&plain);
        assert_eq!(tree, json!({ "version": 2, "param0": 9 }));
        assert_eq!(deserialize::<Versioned>(&tree), Some(plain));

        let noted = Versioned {
            payload: 9,
            note: Some("hi".to_string()),
        };
        let tree = serialize(&noted);
        assert_eq!(tree["note"], json!("hi"));
        assert_eq!(deserialize::<Versioned>(&tree), Some(noted));

        assert!(!validate::<Versioned>(&json!({ "version": 3, "param0": 9 })));
        assert!(!validate::<Versioned>(&json!({ "version": 2, "param0": 9, "note": 1 })));
    }
}
