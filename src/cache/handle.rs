//! Cache entries
//!
//! A [`ResourceHandle`] is the slot the cache keeps for one (kind, path)
//! pair: the loadable instance, its validity and a reference count.

use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

use crate::error::ContentError;
use crate::files::FileSource;
use crate::kind::ResourceKind;
use crate::loadable::{Loadable, Shared, SharedLoadable};

/// Composite cache key
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContentKey {
    /// Kind of the entry
    pub kind: ResourceKind,
    /// Path the entry was loaded from
    pub path: String,
}

impl ContentKey {
    /// Create a key
    #[must_use]
    pub fn new(kind: ResourceKind, path: impl Into<String>) -> Self {
        Self {
            kind,
            path: path.into(),
        }
    }
}

impl std::fmt::Display for ContentKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} '{}'", self.kind, self.path)
    }
}

/// A cached entry.
///
/// The loadable lives in a single `Rc` allocation; `loadable` and `typed`
/// are two views of it, one for the uniform interface and one for typed
/// downcasts. Holders always get clones of that allocation, so a reload is
/// visible to all of them at once.
pub struct ResourceHandle {
    key: ContentKey,
    loadable: SharedLoadable,
    typed: Rc<dyn Any>,
    valid: bool,
    references: u32,
}

impl ResourceHandle {
    /// Wrap a fresh, not yet loaded instance
    pub(crate) fn new<L: Loadable>(key: ContentKey, loadable: L) -> Self {
        let shared: Shared<L> = Rc::new(RefCell::new(loadable));
        Self {
            key,
            loadable: shared.clone(),
            typed: shared,
            valid: false,
            references: 0,
        }
    }

    /// Key of this entry
    #[must_use]
    pub fn key(&self) -> &ContentKey {
        &self.key
    }

    /// Kind of this entry
    #[must_use]
    pub fn kind(&self) -> ResourceKind {
        self.key.kind
    }

    /// Path of this entry
    #[must_use]
    pub fn path(&self) -> &str {
        &self.key.path
    }

    /// Whether the last load succeeded and the content was not invalidated
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.valid
    }

    /// Current reference count
    #[must_use]
    pub const fn references(&self) -> u32 {
        self.references
    }

    /// Whether nothing references this entry any more
    #[must_use]
    pub const fn is_evictable(&self) -> bool {
        self.references == 0
    }

    /// Shared reference to the instance
    #[must_use]
    pub fn loadable(&self) -> SharedLoadable {
        Rc::clone(&self.loadable)
    }

    /// Shared reference to the instance as its concrete type
    #[must_use]
    pub fn downcast<L: Loadable>(&self) -> Option<Shared<L>> {
        Rc::clone(&self.typed).downcast::<RefCell<L>>().ok()
    }

    /// Whether both references point at the same instance
    #[must_use]
    pub fn is_same(&self, other: &SharedLoadable) -> bool {
        Rc::ptr_eq(&self.loadable, other)
    }

    /// Populate the instance from its path and refresh the validity flag
    pub(crate) fn load(&mut self, files: &dyn FileSource) -> Result<(), ContentError> {
        let mut loadable = self
            .loadable
            .try_borrow_mut()
            .map_err(|_| ContentError::Busy(self.key.path.clone()))?;
        let result = loadable.load(&self.key.path, files);
        self.valid = result.is_ok() && loadable.is_valid();
        result
    }

    /// Mark the entry invalid, propagating to the instance when possible
    pub(crate) fn invalidate(&mut self) {
        if let Ok(mut loadable) = self.loadable.try_borrow_mut() {
            loadable.invalidate();
        }
        self.valid = false;
    }

    /// Add a reference, returning the new count
    pub(crate) fn acquire(&mut self) -> u32 {
        self.references = self.references.saturating_add(1);
        self.references
    }

    /// Drop a reference, returning the new count.
    ///
    /// Releasing an entry with no references is rejected and leaves the
    /// count at zero.
    pub(crate) fn release(&mut self) -> Option<u32> {
        let remaining = self.references.checked_sub(1)?;
        self.references = remaining;
        Some(remaining)
    }
}

impl std::fmt::Debug for ResourceHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceHandle")
            .field("key", &self.key)
            .field("valid", &self.valid)
            .field("references", &self.references)
            .finish()
    }
}
