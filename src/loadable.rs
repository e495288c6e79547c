//! The loadable contract every content kind implements
//!
//! Two layers:
//! - [`Loadable`] is the uniform, object-safe interface the cache stores.
//! - [`Decode`] is the narrow hook a kind implements; [`Content`] wraps a
//!   decoder and takes care of validity, atomic state replacement and reload
//!   generations.

use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

use crate::error::ContentError;
use crate::files::FileSource;
use crate::kind::ResourceKind;

/// Shared, reload-transparent reference to cached content of type `T`
pub type Shared<T> = Rc<RefCell<T>>;

/// Shared reference to cached content of any kind
pub type SharedLoadable = Rc<RefCell<dyn Loadable>>;

/// Capability set every cached resource provides.
///
/// An implementation is either invalid (never loaded, failed, or
/// invalidated) or valid with all of its state populated. A failed `load`
/// must not leave half-written state observable.
pub trait Loadable: Any {
    /// Kind of content this instance holds
    fn kind(&self) -> ResourceKind;

    /// Populate this instance from `path`, replacing any previous state
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or decoded; the instance
    /// is invalid afterwards
    fn load(&mut self, path: &str, files: &dyn FileSource) -> Result<(), ContentError>;

    /// Mark valid if the state is populated, returning the new validity
    fn validate(&mut self) -> bool;

    /// Mark invalid without touching the path or generation
    fn invalidate(&mut self);

    /// Whether the instance can be used
    fn is_valid(&self) -> bool;
}

/// A loadable with a statically known kind, constructible empty.
///
/// This is what typed lookups such as
/// [`ContentCache::get`](crate::ContentCache::get) work with.
pub trait TypedLoadable: Loadable + Default {
    /// Kind this type is registered under
    const KIND: ResourceKind;
}

/// Decoding step for one content kind
pub trait Decode: Sized + 'static {
    /// Kind produced by this decoder
    const KIND: ResourceKind;

    /// Decode the content stored at `path`
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing or malformed
    fn decode(path: &str, files: &dyn FileSource) -> Result<Self, ContentError>;
}

/// Generic loadable around a decoded payload.
///
/// Reloading swaps the payload in one step, so holders of a
/// [`Shared<Content<T>>`] see either the old or the new state.
#[derive(Debug)]
pub struct Content<T> {
    state: Option<T>,
    valid: bool,
    /// Number of successful loads
    generation: u32,
    path: Option<String>,
}

impl<T> Default for Content<T> {
    fn default() -> Self {
        Self {
            state: None,
            valid: false,
            generation: 0,
            path: None,
        }
    }
}

impl<T> Content<T> {
    /// Decoded payload, if valid
    #[must_use]
    pub fn get(&self) -> Option<&T> {
        if self.valid { self.state.as_ref() } else { None }
    }

    /// Number of successful loads so far; changes on every reload
    #[must_use]
    pub const fn generation(&self) -> u32 {
        self.generation
    }

    /// Path of the last load attempt
    #[must_use]
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }
}

impl<T: Decode> Loadable for Content<T> {
    fn kind(&self) -> ResourceKind {
        T::KIND
    }

    fn load(&mut self, path: &str, files: &dyn FileSource) -> Result<(), ContentError> {
        self.path = Some(path.to_string());
        match T::decode(path, files) {
            Ok(state) => {
                self.state = Some(state);
                self.valid = true;
                self.generation += 1;
                Ok(())
            }
            Err(e) => {
                self.state = None;
                self.valid = false;
                Err(e)
            }
        }
    }

    fn validate(&mut self) -> bool {
        self.valid = self.state.is_some();
        self.valid
    }

    fn invalidate(&mut self) {
        self.valid = false;
    }

    fn is_valid(&self) -> bool {
        self.valid
    }
}

impl<T: Decode> TypedLoadable for Content<T> {
    const KIND: ResourceKind = T::KIND;
}
