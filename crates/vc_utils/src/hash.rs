//! Hash containers with reproducible hashing.
//!
//! [`HashMap`] and [`HashSet`] are `hashbrown` containers over
//! [`FixedHashState`], a `foldhash` state with a fixed seed: the same
//! keys always hash the same way, across runs and across processes.
//!
//! [`NoOpHashState`] passes a `u64` through untouched. It suits keys that
//! are already well distributed, such as `TypeId`.

use core::hash::{BuildHasher, Hasher};

use foldhash::fast::{FixedState, FoldHasher};

// -----------------------------------------------------------------------------
// Re-export crates

pub use foldhash;
pub use hashbrown;

// -----------------------------------------------------------------------------
// FixedHashState

const SEED: FixedState = FixedState::with_seed(0x95EE04C4F326B271);

/// `foldhash` state seeded with a constant.
///
/// # Examples
///
/// ```
/// use core::hash::BuildHasher;
/// use vc_utils::hash::FixedHashState;
///
/// assert_eq!(FixedHashState.hash_one(42_u32), FixedHashState.hash_one(42_u32));
/// ```
#[derive(Copy, Clone, Default, Debug)]
pub struct FixedHashState;

impl BuildHasher for FixedHashState {
    type Hasher = FoldHasher<'static>;

    #[inline]
    fn build_hasher(&self) -> Self::Hasher {
        SEED.build_hasher()
    }
}

// -----------------------------------------------------------------------------
// NoOpHashState

/// Hasher that keeps the last `u64` written to it.
///
/// Byte writes are folded in, so a single `write_u32(n)` and a single
/// `write_u64(n)` produce the same hash.
#[derive(Copy, Clone, Default, Debug)]
pub struct NoOpHasher(u64);

impl Hasher for NoOpHasher {
    #[inline]
    fn finish(&self) -> u64 {
        self.0
    }

    fn write(&mut self, bytes: &[u8]) {
        for byte in bytes.iter().rev() {
            self.0 = self.0.rotate_left(8).wrapping_add(*byte as u64);
        }
    }

    #[inline]
    fn write_u64(&mut self, i: u64) {
        self.0 = i;
    }
}

/// Builds [`NoOpHasher`]s.
///
/// # Examples
///
/// ```
/// use core::hash::BuildHasher;
/// use vc_utils::hash::NoOpHashState;
///
/// assert_eq!(NoOpHashState.hash_one(7_u64), 7);
/// ```
#[derive(Copy, Clone, Default, Debug)]
pub struct NoOpHashState;

impl BuildHasher for NoOpHashState {
    type Hasher = NoOpHasher;

    #[inline]
    fn build_hasher(&self) -> Self::Hasher {
        NoOpHasher(0)
    }
}

// -----------------------------------------------------------------------------
// Containers

/// A `hashbrown` map using [`FixedHashState`] by default.
///
/// # Examples
///
/// ```
/// use vc_utils::hash::HashMap;
///
/// let mut map: HashMap<&str, i32> = HashMap::default();
/// map.insert("key", 1);
/// assert_eq!(map.get("key"), Some(&1));
/// ```
pub type HashMap<K, V, S = FixedHashState> = hashbrown::HashMap<K, V, S>;

/// A `hashbrown` set using [`FixedHashState`] by default.
pub type HashSet<T, S = FixedHashState> = hashbrown::HashSet<T, S>;
