//! Compile-time codec resolution and the stable type names it relies on.
//!
//! The registry itself is the trait system: a type is supported exactly
//! when it implements [`Codec`](crate::Codec), and the implementation
//! picked for it is the one coherence allows. This module holds what the
//! implementations share: [`TypeTag`] names and [`TypeCell`] storage for
//! everything built lazily per generic instantiation.

// -----------------------------------------------------------------------------
// Modules

mod cell;
mod type_tag;

// -----------------------------------------------------------------------------
// Exports

pub use cell::{TypeCell, concat};
pub use type_tag::TypeTag;
