//! Canonical element order of sets and maps.
//!
//! Ordered containers are stored ascending by `Ord`. Hashed containers have
//! no order of their own, so they are stored ascending by the compact JSON
//! text of each encoded element. Validation refuses any other order, so a
//! valid tree re-encodes to itself.

use alloc::collections::BTreeSet;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::hash::{BuildHasher, Hash};
use std::collections::HashSet;

use serde_json::Value;

use crate::ErrorKind;

/// Elements of an `Ord` container seen so far by validation.
pub(crate) struct Ascending<T>(BTreeSet<T>);

impl<T: Ord> Ascending<T> {
    #[inline]
    pub const fn new() -> Self {
        Self(BTreeSet::new())
    }

    /// Accepts `value` at `index` if it is new and above every earlier one.
    pub fn admit(&mut self, index: usize, value: T) -> Result<(), ErrorKind> {
        if self.0.contains(&value) {
            return Err(ErrorKind::Duplicate(index));
        }
        if self.0.last().is_some_and(|last| *last > value) {
            return Err(ErrorKind::Unordered(index));
        }
        self.0.insert(value);
        Ok(())
    }
}

/// Elements of a hashed container seen so far by validation.
pub(crate) struct ByText<T, S> {
    seen: HashSet<T, S>,
    last: String,
}

impl<T: Eq + Hash, S: BuildHasher + Default> ByText<T, S> {
    #[inline]
    pub fn new() -> Self {
        Self {
            seen: HashSet::default(),
            last: String::new(),
        }
    }

    /// Accepts `value`, encoded as `item` at `index`, if it is new and its
    /// text does not sort below the previous element's.
    pub fn admit(&mut self, index: usize, item: &Value, value: T) -> Result<(), ErrorKind> {
        if !self.seen.insert(value) {
            return Err(ErrorKind::Duplicate(index));
        }
        let text = item.to_string();
        if text < self.last {
            return Err(ErrorKind::Unordered(index));
        }
        self.last = text;
        Ok(())
    }
}

/// Collects encoded elements ascending by their compact JSON text.
pub(crate) fn sorted_by_text(items: impl Iterator<Item = Value>) -> Value {
    let mut keyed: Vec<(String, Value)> = items.map(|item| (item.to_string(), item)).collect();
    keyed.sort_unstable_by(|a, b| a.0.cmp(&b.0));
    Value::Array(keyed.into_iter().map(|(_, item)| item).collect())
}
