use alloc::boxed::Box;
use alloc::string::String;
use core::any::{Any, TypeId};
use core::sync::atomic::{AtomicU64, Ordering};

use vc_utils::hash::HashMap;

use super::Context;

// -----------------------------------------------------------------------------
// Encode side

/// Source of share ids, common to every session of the process.
///
/// Two sessions never hand out the same id, so trees encoded separately
/// can be decoded together without their objects merging.
static NEXT_SHARE_ID: AtomicU64 = AtomicU64::new(0);

/// Ids of the shared allocations seen while encoding.
///
/// Each entry keeps a weak handle to its allocation. A weak handle keeps the
/// allocation itself alive, so an address can never be handed out again to
/// another object while the session lasts. No value is kept alive.
#[derive(Default)]
pub(super) struct IdentityTable {
    seen: HashMap<usize, Seen>,
}

struct Seen {
    id: u64,
    _weak: Box<dyn Any>,
}

impl IdentityTable {
    #[inline]
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    #[inline]
    pub fn clear(&mut self) {
        self.seen.clear();
    }
}

// -----------------------------------------------------------------------------
// Decode side

/// Cache key of a decoded shared instance.
///
/// Both the id and the encoded content take part, so equal content that
/// came from distinct objects never merges, and neither does the same id
/// reused with other content by another session.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct SharedKey {
    pointer: TypeId,
    id: u64,
    fingerprint: String,
}

impl SharedKey {
    /// Key for pointer type `P`.
    #[inline]
    pub fn new<P: ?Sized + 'static>(id: u64, fingerprint: String) -> Self {
        Self {
            pointer: TypeId::of::<P>(),
            id,
            fingerprint,
        }
    }
}

/// Weak handles to the shared instances decoded in this session.
#[derive(Default)]
pub(super) struct SharedCache(HashMap<SharedKey, Box<dyn Any>>);

impl SharedCache {
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn clear(&mut self) {
        self.0.clear();
    }
}

// -----------------------------------------------------------------------------
// Context access

impl Context {
    /// Returns the id of the allocation at `address`, drawing a fresh one
    /// on first sight in this session.
    ///
    /// `weak` is only called for a new address.
    pub(crate) fn share_id(&mut self, address: usize, weak: impl FnOnce() -> Box<dyn Any>) -> u64 {
        self.identities
            .seen
            .entry(address)
            .or_insert_with(|| Seen {
                id: NEXT_SHARE_ID.fetch_add(1, Ordering::Relaxed),
                _weak: weak(),
            })
            .id
    }

    /// Looks a decoded shared instance up.
    ///
    /// `W` is the weak handle type stored for the key; expired handles
    /// count as misses.
    pub(crate) fn shared_lookup<W: 'static, R>(
        &self,
        key: &SharedKey,
        upgrade: impl FnOnce(&W) -> Option<R>,
    ) -> Option<R> {
        let weak = self.shared.0.get(key)?.downcast_ref::<W>()?;
        let strong = upgrade(weak);
        if strong.is_none() {
            log::trace!("expired shared instance for id {} at `{}`", key.id, self.path);
        }
        strong
    }

    /// Remembers a freshly decoded shared instance.
    pub(crate) fn shared_insert<W: 'static>(&mut self, key: SharedKey, weak: W) {
        log::trace!("caching shared instance for id {} at `{}`", key.id, self.path);
        self.shared.0.insert(key, Box::new(weak));
    }
}

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;
    use alloc::rc::{Rc, Weak};
    use alloc::string::String;

    use super::SharedKey;
    use crate::context::Context;

    fn addr(rc: &Rc<u8>) -> usize {
        Rc::as_ptr(rc).addr()
    }

    fn weak(rc: &Rc<u8>) -> impl FnOnce() -> Box<dyn core::any::Any> {
        let weak = Rc::downgrade(rc);
        move || Box::new(weak) as Box<dyn core::any::Any>
    }

    #[test]
    fn ids_are_assigned_in_order_of_first_sight() {
        let mut ctx = Context::new();
        let a = Rc::new(1_u8);
        let b = Rc::new(2_u8);

        let id_a = ctx.share_id(addr(&a), weak(&a));
        let id_b = ctx.share_id(addr(&b), weak(&b));
        assert!(id_a < id_b);
        assert_eq!(ctx.share_id(addr(&a), weak(&a)), id_a);

        ctx.clear();
        let again = ctx.share_id(addr(&b), weak(&b));
        assert!(again > id_b);
    }

    #[test]
    fn ids_are_unique_across_sessions() {
        let value = Rc::new(1_u8);
        let mut first = Context::new();
        let mut second = Context::new();

        let a = first.share_id(addr(&value), weak(&value));
        let b = second.share_id(addr(&value), weak(&value));
        assert_ne!(a, b);
        assert_eq!(first.share_id(addr(&value), weak(&value)), a);
    }

    #[test]
    fn expired_entries_are_misses() {
        let mut ctx = Context::new();
        let key = SharedKey::new::<Rc<u8>>(0, String::from("7"));
        let value = Rc::new(7_u8);
        ctx.shared_insert(key.clone(), Rc::downgrade(&value));

        let hit = ctx.shared_lookup(&key, Weak::<u8>::upgrade);
        assert!(hit.is_some_and(|hit| Rc::ptr_eq(&hit, &value)));

        drop(value);
        assert!(ctx.shared_lookup(&key, Weak::<u8>::upgrade).is_none());
    }

    #[test]
    fn keys_differ_by_pointer_type() {
        let a = SharedKey::new::<Rc<u8>>(0, String::from("1"));
        let b = SharedKey::new::<alloc::sync::Arc<u8>>(0, String::from("1"));
        assert_ne!(a, b);
    }
}
