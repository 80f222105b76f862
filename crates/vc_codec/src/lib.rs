#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![no_std]

// -----------------------------------------------------------------------------
// No STD Support

extern crate alloc;
extern crate std;

// -----------------------------------------------------------------------------
// Modules

mod api;
mod codec;
mod error;

pub mod class;
pub mod context;
pub mod impls;
pub mod poly;
pub mod registry;

// -----------------------------------------------------------------------------
// Top-Level exports

pub use api::{deserialize, deserialize_unchecked, serialize, try_deserialize, validate};
pub use codec::Codec;
pub use context::{Context, ContextOptions, FieldPath, PathSegment};
pub use error::{CodecError, ErrorKind, ValidationError};
pub use registry::{TypeCell, TypeTag};

pub use class::{ClassBuilder, ClassCodec, Construction, FieldOptions, Param};
pub use impls::{Byte, PointeeCodec, Serde};
pub use impls::{Variant2, Variant3, Variant4, Variant5, Variant6};
pub use poly::{Polymorphic, PolymorphicSet, Upcast};

pub use serde_json::{Map, Value};

#[doc(hidden)]
pub mod __macro_exports {
    pub use alloc::boxed::Box;
    pub use alloc::rc::Rc;
    pub use alloc::sync::Arc;
    pub use alloc::vec::Vec;
    pub use std::sync::OnceLock;

    pub use crate::impls::variant::{
        decode as decode_variant, encode as encode_variant, validate as validate_variant,
    };
    pub use crate::poly::{
        decode_arc as decode_poly_arc, decode_box as decode_poly_box,
        decode_rc as decode_poly_rc, encode as encode_poly, validate as validate_poly,
    };
}
