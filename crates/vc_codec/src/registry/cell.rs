//! Per-type static storage for generic code.
//!
//! A `static` declared inside a generic function is shared by every
//! instantiation of that function. [`TypeCell`] keys its content by the
//! `TypeId` of the instantiating type, so each one gets its own slot.
//!
//! Values are leaked on first insertion and never dropped. They are built
//! outside of the lock, so building one value may itself use the same cell
//! for another type (nested tuples do).

use alloc::boxed::Box;
use core::any::{Any, TypeId};
use std::sync::{PoisonError, RwLock};

use vc_utils::TypeIdMap;

type Erased = dyn Any + Send + Sync;

/// Static storage of one value per type.
///
/// # Examples
///
/// ```
/// use vc_codec::{TypeCell, TypeTag};
///
/// struct Wrapper<T>(T);
///
/// impl<T: TypeTag> TypeTag for Wrapper<T> {
///     fn type_tag() -> &'static str {
///         static CELL: TypeCell = TypeCell::new();
///         CELL.get_or_insert::<Self, _>(|| format!("Wrapper<{}>", T::type_tag()))
///     }
/// }
///
/// assert_eq!(<Wrapper<u8>>::type_tag(), "Wrapper<u8>");
/// assert_eq!(<Wrapper<Wrapper<i64>>>::type_tag(), "Wrapper<Wrapper<i64>>");
/// ```
pub struct TypeCell(RwLock<TypeIdMap<&'static Erased>>);

impl TypeCell {
    /// Creates an empty cell.
    #[inline]
    pub const fn new() -> Self {
        Self(RwLock::new(TypeIdMap::new()))
    }

    /// Returns the value stored for `G`, building it with `f` first if
    /// there is none.
    ///
    /// One call site must always store the same `V` for a given `G`.
    #[inline]
    pub fn get_or_insert<G, V>(&self, f: impl FnOnce() -> V) -> &'static V
    where
        G: ?Sized + 'static,
        V: Any + Send + Sync,
    {
        let erased = match self.get(TypeId::of::<G>()) {
            Some(erased) => erased,
            None => self.insert(TypeId::of::<G>(), Box::new(f())),
        };
        match erased.downcast_ref::<V>() {
            Some(value) => value,
            None => unreachable!("`TypeCell` slot reused with another value type"),
        }
    }

    #[inline(never)]
    fn get(&self, type_id: TypeId) -> Option<&'static Erased> {
        self.0
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&type_id)
            .copied()
    }

    #[inline(never)]
    fn insert(&self, type_id: TypeId, value: Box<Erased>) -> &'static Erased {
        *self
            .0
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .get_or_insert(type_id, || Box::leak(value))
    }
}

/// Concatenates string pieces with a single allocation.
pub fn concat(pieces: &[&str]) -> alloc::string::String {
    let mut result = alloc::string::String::with_capacity(pieces.iter().map(|p| p.len()).sum());
    for piece in pieces {
        result.push_str(piece);
    }
    result
}
