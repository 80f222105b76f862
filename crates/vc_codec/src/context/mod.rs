//! The session state threaded through every codec call.
//!
//! A [`Context`] carries three things from the first call of a logical
//! operation to the last one:
//!
//! - the [`FieldPath`] of the node being visited, so rejections can say where;
//! - the diagnostics recorded by validation;
//! - the shared-pointer identity tables, see [`Rc`](alloc::rc::Rc) and
//!   [`Arc`](alloc::sync::Arc) codecs.
//!
//! A context is cheap to create. The free functions of this crate make a
//! fresh one per call; use a long-lived context when shared pointers encoded
//! in several calls must decode back to shared instances.

// -----------------------------------------------------------------------------
// Modules

mod access;
mod identity;
mod path;

// -----------------------------------------------------------------------------
// Exports

pub use path::{FieldPath, PathSegment};

pub(crate) use access::kind_name;
pub(crate) use identity::SharedKey;

use alloc::vec::Vec;

use crate::error::{CodecError, ErrorKind};

use identity::{IdentityTable, SharedCache};

// -----------------------------------------------------------------------------
// Context

/// Runtime options of a [`Context`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextOptions {
    /// Diagnostics beyond this count are dropped, except that the first
    /// rejection of each top-level call is always kept.
    pub max_diagnostics: usize,
}

impl Default for ContextOptions {
    fn default() -> Self {
        Self {
            max_diagnostics: 64,
        }
    }
}

/// Session state for validate, encode and decode calls.
///
/// # Examples
///
/// ```
/// use std::rc::Rc;
/// use vc_codec::Context;
///
/// let shared = Rc::new(5_u32);
///
/// let mut ctx = Context::new();
/// let a = ctx.serialize(&shared);
/// let b = ctx.serialize(&shared);
///
/// let a: Rc<u32> = ctx.deserialize(&a).unwrap();
/// let b: Rc<u32> = ctx.deserialize(&b).unwrap();
/// assert!(Rc::ptr_eq(&a, &b));
/// assert!(!Rc::ptr_eq(&a, &shared));
/// ```
pub struct Context {
    options: ContextOptions,
    path: FieldPath,
    diagnostics: Vec<CodecError>,
    identities: IdentityTable,
    shared: SharedCache,
}

impl Context {
    /// Creates a context with default options.
    #[inline]
    pub fn new() -> Self {
        Self::with_options(ContextOptions::default())
    }

    /// Creates a context with the given options.
    pub fn with_options(options: ContextOptions) -> Self {
        Self {
            options,
            path: FieldPath::root(),
            diagnostics: Vec::new(),
            identities: IdentityTable::default(),
            shared: SharedCache::default(),
        }
    }

    #[inline]
    pub fn options(&self) -> &ContextOptions {
        &self.options
    }

    /// Path of the node currently visited.
    #[inline]
    pub fn path(&self) -> &FieldPath {
        &self.path
    }

    /// Runs `f` with `segment` appended to the current path.
    ///
    /// Every codec descending into a child node goes through this, so the
    /// path is restored whatever `f` returns.
    pub fn scoped<R>(
        &mut self,
        segment: impl Into<PathSegment>,
        f: impl FnOnce(&mut Self) -> R,
    ) -> R {
        self.path.push(segment.into());
        let result = f(self);
        self.path.pop();
        result
    }

    /// Runs `f` with room for at least one more diagnostic, even when the
    /// session already holds `max_diagnostics` of them.
    pub(crate) fn with_room<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        let cap = self.options.max_diagnostics;
        self.options.max_diagnostics = cap.max(self.diagnostics.len() + 1);
        let result = f(self);
        self.options.max_diagnostics = cap;
        result
    }

    /// Records a diagnostic at the current path and returns `false`.
    ///
    /// Meant as the tail of a failing `validate`.
    pub fn reject(&mut self, kind: ErrorKind) -> bool {
        #[cfg(feature = "debug")]
        log::debug!("rejected `{}`: {kind}", self.path);

        if self.diagnostics.len() < self.options.max_diagnostics {
            self.diagnostics.push(CodecError {
                path: self.path.clone(),
                kind,
            });
        }
        false
    }

    /// Builds an error located at the current path.
    #[inline]
    pub fn error(&self, kind: ErrorKind) -> CodecError {
        CodecError {
            path: self.path.clone(),
            kind,
        }
    }

    /// Turns a parsed leaf into a validation answer.
    ///
    /// Leaf codecs parse the same way in `validate` and `decode`; this is
    /// the `validate` half.
    #[inline]
    pub fn accept<T>(&mut self, parsed: Result<T, ErrorKind>) -> bool {
        match parsed {
            Ok(_) => true,
            Err(kind) => self.reject(kind),
        }
    }

    /// Turns a parsed leaf into a decode result, locating the error.
    #[inline]
    pub fn locate<T>(&self, parsed: Result<T, ErrorKind>) -> Result<T, CodecError> {
        parsed.map_err(|kind| self.error(kind))
    }

    /// Diagnostics recorded so far.
    #[inline]
    pub fn diagnostics(&self) -> &[CodecError] {
        &self.diagnostics
    }

    /// Removes and returns the recorded diagnostics.
    #[inline]
    pub fn take_diagnostics(&mut self) -> Vec<CodecError> {
        core::mem::take(&mut self.diagnostics)
    }

    pub(crate) fn split_diagnostics(&mut self, from: usize) -> Vec<CodecError> {
        if from >= self.diagnostics.len() {
            return Vec::new();
        }
        self.diagnostics.split_off(from)
    }

    /// Ends the session: forgets identities, cached shared instances
    /// and diagnostics.
    ///
    /// Trees encoded before and after a `clear` never share instances
    /// when decoded.
    pub fn clear(&mut self) {
        self.path = FieldPath::root();
        self.diagnostics.clear();
        self.identities.clear();
        self.shared.clear();
    }
}

impl Default for Context {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for Context {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Context")
            .field("options", &self.options)
            .field("path", &self.path)
            .field("diagnostics", &self.diagnostics.len())
            .field("identities", &self.identities.len())
            .field("shared", &self.shared.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use super::{Context, ContextOptions};
    use crate::error::ErrorKind;

    #[test]
    fn scoped_restores_path() {
        let mut ctx = Context::new();
        let inner = ctx.scoped("outer", |ctx| {
            ctx.scoped(3_usize, |ctx| ctx.path().to_string())
        });
        assert_eq!(inner, "$.outer[3]");
        assert!(ctx.path().is_root());
    }

    #[test]
    fn reject_records_path() {
        let mut ctx = Context::new();
        let accepted = ctx.scoped("name", |ctx| ctx.reject(ErrorKind::Rejected("custom")));
        assert!(!accepted);
        assert_eq!(ctx.diagnostics().len(), 1);
        assert_eq!(ctx.diagnostics()[0].path.to_string(), "$.name");
    }

    #[test]
    fn diagnostics_are_capped() {
        let mut ctx = Context::with_options(ContextOptions { max_diagnostics: 2 });
        for _ in 0..5 {
            ctx.reject(ErrorKind::Duplicate(0));
        }
        assert_eq!(ctx.take_diagnostics().len(), 2);
        assert!(ctx.diagnostics().is_empty());
    }

    #[test]
    fn room_is_made_for_one_more_diagnostic() {
        let mut ctx = Context::with_options(ContextOptions { max_diagnostics: 1 });
        ctx.reject(ErrorKind::Duplicate(0));
        ctx.with_room(|ctx| {
            ctx.reject(ErrorKind::Duplicate(1));
            ctx.reject(ErrorKind::Duplicate(2));
        });
        assert_eq!(ctx.diagnostics().len(), 2);
        assert_eq!(ctx.diagnostics()[1].kind, ErrorKind::Duplicate(1));
        assert_eq!(ctx.options().max_diagnostics, 1);
    }

    #[test]
    fn accept_and_locate_agree() {
        let mut ctx = Context::new();
        let parsed: Result<u8, ErrorKind> = Err(ErrorKind::Duplicate(1));
        assert!(!ctx.accept(parsed.clone()));
        let located = ctx.scoped(0_usize, |ctx| ctx.locate(parsed));
        assert_eq!(located.unwrap_err().to_string(), "at `$[0]`: duplicate element at index 1");
    }
}
