//! The content cache
//!
//! Path-keyed registry of [`ResourceHandle`]s with one entry per
//! (kind, path). Loading an existing key shares the cached instance,
//! reloading re-populates it in place, unloading only drops a reference.
//!
//! Lifecycle notifications are queued while an operation runs and delivered
//! later, once nothing borrows the cache. For a [`SharedCache`] call
//! [`ContentCache::flush`] after the `borrow_mut` ends, so listeners can
//! borrow the cache again to re-fetch what changed. An owned cache delivers
//! with [`ContentCache::dispatch_pending`].

use std::any::TypeId;
use std::cell::RefCell;
use std::rc::Rc;

use rustc_hash::{FxHashMap, FxHashSet};

use super::handle::{ContentKey, ResourceHandle};
use crate::config::{ContentConfig, EvictionPolicy};
use crate::error::ContentError;
use crate::events::{ContentEvent, ContentListener, EventRouter, ListenerId, Notification};
use crate::files::{DiskFiles, FileSource};
use crate::kind::ResourceKind;
use crate::kinds::{
    Effect, Material, Model, ParticleEffect, Script, Shader, Sound, SpriteAnimation, Texture,
};
use crate::loadable::{Content, Shared, SharedLoadable, TypedLoadable};

/// Cache shared between bundles and other holders
pub type SharedCache = Rc<RefCell<ContentCache>>;

/// Constructor for an empty loadable of one kind
type LoaderFn = Box<dyn Fn(ContentKey) -> ResourceHandle>;

/// Registered constructor and the concrete type it builds
struct Loader {
    type_id: TypeId,
    build: LoaderFn,
}

/// Counters describing cache activity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Entries created
    pub loads: u64,
    /// Loads served by an existing entry
    pub hits: u64,
    /// In-place reloads
    pub reloads: u64,
    /// References released
    pub unloads: u64,
    /// Entries removed from the cache
    pub evictions: u64,
    /// Loads or reloads that left an entry invalid
    pub failures: u64,
}

/// Path-keyed cache of loadable content
pub struct ContentCache {
    config: ContentConfig,
    files: Rc<dyn FileSource>,
    handles: FxHashMap<ContentKey, ResourceHandle>,
    loaders: FxHashMap<ResourceKind, Loader>,
    /// Keys already reported as having no loader; reset by `compact`
    unresolved: FxHashSet<ContentKey>,
    router: Rc<RefCell<EventRouter>>,
    /// Notifications not yet delivered
    pending: Vec<Notification>,
    stats: CacheStats,
}

impl ContentCache {
    /// Create a cache with default configuration and the built-in kinds
    #[must_use]
    pub fn new(files: Rc<dyn FileSource>) -> Self {
        Self::with_config(ContentConfig::default(), files)
    }

    /// Create a cache with the given configuration and the built-in kinds
    #[must_use]
    pub fn with_config(config: ContentConfig, files: Rc<dyn FileSource>) -> Self {
        let mut cache = Self {
            config,
            files,
            handles: FxHashMap::default(),
            loaders: FxHashMap::default(),
            unresolved: FxHashSet::default(),
            router: Rc::new(RefCell::new(EventRouter::new())),
            pending: Vec::new(),
            stats: CacheStats::default(),
        };
        cache.register_defaults();
        cache
    }

    /// Create a cache reading from the configured root directory
    #[must_use]
    pub fn from_config(config: ContentConfig) -> Self {
        let files: Rc<dyn FileSource> = Rc::new(DiskFiles::new(&config.root));
        Self::with_config(config, files)
    }

    /// Wrap this cache for sharing with bundles
    #[must_use]
    pub fn into_shared(self) -> SharedCache {
        Rc::new(RefCell::new(self))
    }

    /// Install the built-in loadable for every kind that has one
    pub fn register_defaults(&mut self) {
        self.register_loader::<Content<Script>>();
        self.register_loader::<Content<Texture>>();
        self.register_loader::<Content<Shader>>();
        self.register_loader::<Content<Material>>();
        self.register_loader::<Content<Model>>();
        self.register_loader::<Content<Sound>>();
        self.register_loader::<Content<SpriteAnimation>>();
        self.register_loader::<Content<Effect>>();
        self.register_loader::<Content<ParticleEffect>>();
    }

    /// Install (or replace) the loadable constructed for `L::KIND`.
    ///
    /// Existing entries keep their instances; only new loads are affected.
    pub fn register_loader<L: TypedLoadable>(&mut self) {
        self.loaders.insert(
            L::KIND,
            Loader {
                type_id: TypeId::of::<L>(),
                build: Box::new(|key| ResourceHandle::new(key, L::default())),
            },
        );
    }

    /// Whether a loader is registered for `kind`
    #[must_use]
    pub fn has_loader(&self, kind: ResourceKind) -> bool {
        self.loaders.contains_key(&kind)
    }

    // -------------------------------------------------------------------------
    // Lifecycle operations
    // -------------------------------------------------------------------------

    /// Acquire the content at (kind, path).
    ///
    /// An existing entry gains a reference and is returned as-is. Otherwise a
    /// new entry is created, loaded and inserted with one reference; a failed
    /// decode still inserts the entry, marked invalid. Returns `None` only
    /// when no loader is registered for `kind`.
    pub fn load(&mut self, kind: ResourceKind, path: &str) -> Option<SharedLoadable> {
        let key = ContentKey::new(kind, path);

        if let Some(handle) = self.handles.get_mut(&key) {
            let references = handle.acquire();
            let loadable = handle.loadable();
            self.stats.hits += 1;
            log::debug!("Shared {key} ({references} references)");
            self.publish(ContentEvent::Load, kind, path);
            return Some(loadable);
        }

        let Some(loader) = self.loaders.get(&kind) else {
            if self.unresolved.insert(key.clone()) {
                log::warn!("Cannot load {key}: no loader for kind '{kind}'");
            }
            return None;
        };

        let mut handle = (loader.build)(key.clone());
        match handle.load(self.files.as_ref()) {
            Ok(()) => log::info!("Loaded {key}"),
            Err(e) => {
                self.stats.failures += 1;
                log::error!("Failed to load {key}: {e}");
            }
        }
        handle.acquire();
        let loadable = handle.loadable();

        self.handles.insert(key, handle);
        self.stats.loads += 1;
        self.publish(ContentEvent::Load, kind, path);
        Some(loadable)
    }

    /// Re-populate an existing entry in place.
    ///
    /// Holders keep their references and observe the new state. Reloading a
    /// key that is not cached does nothing, and neither does reloading an
    /// instance someone is currently borrowing. Returns whether the entry is
    /// valid after the reload.
    pub fn reload(&mut self, kind: ResourceKind, path: &str) -> bool {
        let key = ContentKey::new(kind, path);
        let Some(handle) = self.handles.get_mut(&key) else {
            log::warn!("Cannot reload {key}: not loaded");
            return false;
        };

        let valid = match handle.load(self.files.as_ref()) {
            Ok(()) => {
                log::info!("Hot reloaded {key}");
                true
            }
            Err(ContentError::Busy(_)) => {
                log::warn!("Cannot reload {key}: it is borrowed, keeping current state");
                return false;
            }
            Err(e) => {
                self.stats.failures += 1;
                log::error!("Failed to reload {key}: {e}");
                false
            }
        };

        self.stats.reloads += 1;
        self.publish(ContentEvent::Reload, kind, path);
        valid
    }

    /// Reload every cached entry, returning how many are valid afterwards
    pub fn reload_all(&mut self) -> usize {
        let mut keys: Vec<ContentKey> = self.handles.keys().cloned().collect();
        keys.sort();

        keys.iter()
            .filter(|key| self.reload(key.kind, &key.path))
            .count()
    }

    /// Release one reference to (kind, path).
    ///
    /// Returns `false` when the key is unknown or already has no
    /// references; the count never drops below zero.
    pub fn unload(&mut self, kind: ResourceKind, path: &str) -> bool {
        let key = ContentKey::new(kind, path);
        let Some(handle) = self.handles.get_mut(&key) else {
            log::warn!("Cannot unload {key}: not loaded");
            return false;
        };

        let Some(remaining) = handle.release() else {
            log::error!("Unload of {key} without a matching load; reference count stays at zero");
            return false;
        };

        self.stats.unloads += 1;
        log::debug!("Released {key} ({remaining} references)");

        if remaining == 0 && self.config.eviction == EvictionPolicy::Immediate {
            self.evict(&key);
        }

        self.publish(ContentEvent::Unload, kind, path);
        true
    }

    /// Event-driven entry point: perform the operation named by `event`.
    ///
    /// Returns whether the operation took effect.
    pub fn notify(&mut self, event: ContentEvent, kind: ResourceKind, path: &str) -> bool {
        match event {
            ContentEvent::Load => self.load(kind, path).is_some(),
            ContentEvent::Reload => self.reload(kind, path),
            ContentEvent::Unload => self.unload(kind, path),
        }
    }

    /// Typed access, loading the content first if it is not cached.
    ///
    /// A fresh load takes one reference; returning an existing entry leaves
    /// its count alone. Returns `None` without loading if the loader for
    /// `L::KIND` builds some other type, and `None` if the cached instance is
    /// not an `L`.
    pub fn get<L: TypedLoadable>(&mut self, path: &str) -> Option<Shared<L>> {
        if !self.contains(L::KIND, path) {
            let builds_l = self
                .loaders
                .get(&L::KIND)
                .is_some_and(|loader| loader.type_id == TypeId::of::<L>());
            if !builds_l {
                log::warn!(
                    "Not loading {}: the loader for this kind does not build {}",
                    ContentKey::new(L::KIND, path),
                    std::any::type_name::<L>()
                );
                return None;
            }
            self.load(L::KIND, path)?;
        }
        self.find::<L>(path)
    }

    /// Typed access to cached content; never loads
    #[must_use]
    pub fn find<L: TypedLoadable>(&self, path: &str) -> Option<Shared<L>> {
        let key = ContentKey::new(L::KIND, path);
        let handle = self.handles.get(&key)?;
        let typed = handle.downcast::<L>();
        if typed.is_none() {
            log::warn!(
                "{key} is cached as a different type than {}",
                std::any::type_name::<L>()
            );
        }
        typed
    }

    /// Mark an entry invalid without unloading it
    pub fn invalidate(&mut self, kind: ResourceKind, path: &str) -> bool {
        match self.handles.get_mut(&ContentKey::new(kind, path)) {
            Some(handle) => {
                handle.invalidate();
                true
            }
            None => false,
        }
    }

    /// Remove every entry with no references, returning how many were removed.
    ///
    /// Holders that kept a clone of an evicted instance still own it; the
    /// cache just forgets about it. Keys reported as having no loader are
    /// forgotten too and will be reported again.
    pub fn compact(&mut self) -> usize {
        self.unresolved.clear();

        let mut evictable: Vec<ContentKey> = self
            .handles
            .values()
            .filter(|handle| handle.is_evictable())
            .map(|handle| handle.key().clone())
            .collect();
        evictable.sort();

        for key in &evictable {
            self.evict(key);
        }
        evictable.len()
    }

    /// Drop every entry. Intended for shutdown.
    pub fn clear(&mut self) {
        for handle in self.handles.values() {
            if handle.references() > 0 {
                log::warn!(
                    "Discarding {} with {} outstanding references",
                    handle.key(),
                    handle.references()
                );
            }
        }
        self.stats.evictions += self.handles.len() as u64;
        self.handles.clear();
        self.unresolved.clear();
    }

    fn evict(&mut self, key: &ContentKey) {
        if self.handles.remove(key).is_some() {
            self.stats.evictions += 1;
            log::debug!("Evicted {key}");
        }
    }

    // -------------------------------------------------------------------------
    // Listeners
    // -------------------------------------------------------------------------

    /// Register a listener for lifecycle notifications
    ///
    /// # Panics
    ///
    /// Panics if called from inside a listener
    pub fn subscribe(&mut self, listener: impl ContentListener + 'static) -> ListenerId {
        self.router.borrow_mut().subscribe(listener)
    }

    /// Remove a listener
    ///
    /// # Panics
    ///
    /// Panics if called from inside a listener
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.router.borrow_mut().unsubscribe(id)
    }

    fn publish(&mut self, event: ContentEvent, kind: ResourceKind, path: &str) {
        self.pending.push(Notification::new(event, kind, path));
    }

    /// Put an undelivered batch back in front of anything queued since
    fn requeue(&mut self, mut batch: Vec<Notification>) {
        batch.append(&mut self.pending);
        self.pending = batch;
    }

    /// Number of notifications waiting for delivery
    #[must_use]
    pub fn pending_notifications(&self) -> usize {
        self.pending.len()
    }

    /// Deliver queued notifications while this cache is exclusively borrowed.
    ///
    /// Listeners cannot reach the cache from here; use
    /// [`flush`](Self::flush) for a [`SharedCache`]. Returns the number of
    /// notifications delivered.
    pub fn dispatch_pending(&mut self) -> usize {
        let router = Rc::clone(&self.router);
        let Ok(mut dispatcher) = router.try_borrow_mut() else {
            return 0;
        };
        let batch = std::mem::take(&mut self.pending);
        for notification in &batch {
            dispatcher.dispatch(notification);
        }
        batch.len()
    }

    /// Deliver queued notifications with the shared cache unborrowed.
    ///
    /// Listeners may borrow the cache and run further operations; whatever
    /// they queue is delivered by the same call, in order. Calling `flush`
    /// from inside a listener leaves the work to the call already running.
    /// Returns the number of notifications delivered.
    pub fn flush(shared: &SharedCache) -> usize {
        let mut delivered = 0;
        loop {
            let (router, batch) = {
                let Ok(mut cache) = shared.try_borrow_mut() else {
                    log::error!("Cache is borrowed; notifications stay queued");
                    return delivered;
                };
                if cache.pending.is_empty() {
                    return delivered;
                }
                (Rc::clone(&cache.router), std::mem::take(&mut cache.pending))
            };

            let Ok(mut dispatcher) = router.try_borrow_mut() else {
                // Already dispatching further up the stack
                if let Ok(mut cache) = shared.try_borrow_mut() {
                    cache.requeue(batch);
                }
                return delivered;
            };
            for notification in &batch {
                dispatcher.dispatch(notification);
            }
            delivered += batch.len();
        }
    }

    // -------------------------------------------------------------------------
    // Introspection
    // -------------------------------------------------------------------------

    /// Whether (kind, path) is cached
    #[must_use]
    pub fn contains(&self, kind: ResourceKind, path: &str) -> bool {
        self.handles.contains_key(&ContentKey::new(kind, path))
    }

    /// Entry for (kind, path)
    #[must_use]
    pub fn handle(&self, kind: ResourceKind, path: &str) -> Option<&ResourceHandle> {
        self.handles.get(&ContentKey::new(kind, path))
    }

    /// Reference count of (kind, path), if cached
    #[must_use]
    pub fn references(&self, kind: ResourceKind, path: &str) -> Option<u32> {
        self.handle(kind, path).map(ResourceHandle::references)
    }

    /// Whether (kind, path) is cached and valid
    #[must_use]
    pub fn is_valid(&self, kind: ResourceKind, path: &str) -> bool {
        self.handle(kind, path).is_some_and(ResourceHandle::is_valid)
    }

    /// All cached keys, sorted
    #[must_use]
    pub fn keys(&self) -> Vec<ContentKey> {
        let mut keys: Vec<ContentKey> = self.handles.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Number of cached entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    /// Check if the cache is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Activity counters
    #[must_use]
    pub const fn stats(&self) -> &CacheStats {
        &self.stats
    }

    /// Configuration in use
    #[must_use]
    pub const fn config(&self) -> &ContentConfig {
        &self.config
    }

    /// File source content is read from
    #[must_use]
    pub fn files(&self) -> Rc<dyn FileSource> {
        Rc::clone(&self.files)
    }
}

impl std::fmt::Debug for ContentCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentCache")
            .field("entries", &self.handles.len())
            .field("loaders", &self.loaders.len())
            .field("router", &self.router)
            .field("stats", &self.stats)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::files::MemoryFiles;
    use crate::loadable::{Decode, Loadable};

    /// Script decoder that upper-cases the source
    #[derive(Debug)]
    struct Upper(String);

    impl Decode for Upper {
        const KIND: ResourceKind = ResourceKind::Script;

        fn decode(path: &str, files: &dyn FileSource) -> Result<Self, ContentError> {
            Ok(Self(files.read_to_string(path)?.to_uppercase()))
        }
    }

    fn setup() -> (Rc<MemoryFiles>, ContentCache) {
        let files = Rc::new(MemoryFiles::new());
        files.insert("main.js", "let x = 1;");
        files.insert("basic.fx", "float4 PS() {}");
        let cache = ContentCache::new(files.clone());
        (files, cache)
    }

    fn record(cache: &mut ContentCache) -> Rc<RefCell<Vec<Notification>>> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        cache.subscribe(move |n: &Notification| sink.borrow_mut().push(n.clone()));
        seen
    }

    #[test]
    fn test_single_instance_per_key() {
        let (_files, mut cache) = setup();

        let first = cache.load(ResourceKind::Script, "main.js").unwrap();
        let second = cache.load(ResourceKind::Script, "main.js").unwrap();

        assert!(Rc::ptr_eq(&first, &second));
        assert_eq!(cache.references(ResourceKind::Script, "main.js"), Some(2));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.stats().loads, 1);
        assert_eq!(cache.stats().hits, 1);
    }

    #[test]
    fn test_kind_partitions_cache() {
        let (files, mut cache) = setup();
        files.insert("shared.txt", "text");

        cache.load(ResourceKind::Script, "shared.txt").unwrap();
        cache.load(ResourceKind::Shader, "shared.txt").unwrap();
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_failed_load_inserts_invalid_entry() {
        let (_files, mut cache) = setup();

        let loadable = cache.load(ResourceKind::Texture, "missing.png").unwrap();
        assert!(!loadable.borrow().is_valid());
        assert!(!cache.is_valid(ResourceKind::Texture, "missing.png"));
        assert_eq!(cache.references(ResourceKind::Texture, "missing.png"), Some(1));
        assert_eq!(cache.stats().failures, 1);
    }

    #[test]
    fn test_unknown_kind_is_not_cached() {
        let (_files, mut cache) = setup();

        assert!(cache.load(ResourceKind::Unknown, "b").is_none());
        assert!(cache.load(ResourceKind::Unknown, "b").is_none());
        assert!(cache.is_empty());
        assert!(!cache.notify(ContentEvent::Load, ResourceKind::Bundle, "x.box"));
    }

    #[test]
    fn test_reload_preserves_identity() {
        let (files, mut cache) = setup();

        let script = cache.get::<Content<Script>>("main.js").unwrap();
        assert_eq!(script.borrow().get().unwrap().source, "let x = 1;");

        files.insert("main.js", "let x = 2;");
        assert!(cache.reload(ResourceKind::Script, "main.js"));

        // Same instance, new contents, no re-lookup
        assert_eq!(script.borrow().get().unwrap().source, "let x = 2;");
        assert_eq!(script.borrow().generation(), 2);
        assert_eq!(cache.references(ResourceKind::Script, "main.js"), Some(1));
        assert_eq!(cache.stats().reloads, 1);
    }

    #[test]
    fn test_failed_reload_invalidates() {
        let (files, mut cache) = setup();

        let script = cache.get::<Content<Script>>("main.js").unwrap();
        files.remove("main.js");

        assert!(!cache.reload(ResourceKind::Script, "main.js"));
        assert!(!cache.is_valid(ResourceKind::Script, "main.js"));
        assert!(script.borrow().get().is_none());

        files.insert("main.js", "back");
        assert!(cache.reload(ResourceKind::Script, "main.js"));
        assert_eq!(script.borrow().get().unwrap().source, "back");
    }

    #[test]
    fn test_reload_missing_is_noop() {
        let (_files, mut cache) = setup();
        let seen = record(&mut cache);

        assert!(!cache.reload(ResourceKind::Script, "nothing.js"));
        assert!(cache.is_empty());
        assert_eq!(cache.dispatch_pending(), 0);
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn test_reload_while_borrowed_reports_busy() {
        let (_files, mut cache) = setup();

        let script = cache.get::<Content<Script>>("main.js").unwrap();
        cache.dispatch_pending();
        let seen = record(&mut cache);

        let guard = script.borrow();
        assert!(!cache.reload(ResourceKind::Script, "main.js"));

        // Nothing changed, so nothing is counted or announced
        assert_eq!(cache.stats().reloads, 0);
        assert_eq!(cache.stats().failures, 0);
        assert_eq!(cache.dispatch_pending(), 0);
        assert!(seen.borrow().is_empty());
        assert!(cache.is_valid(ResourceKind::Script, "main.js"));
        assert_eq!(guard.get().unwrap().source, "let x = 1;");
    }

    #[test]
    fn test_unload_never_goes_negative() {
        let (_files, mut cache) = setup();

        cache.load(ResourceKind::Script, "main.js").unwrap();
        assert!(cache.unload(ResourceKind::Script, "main.js"));
        assert!(!cache.unload(ResourceKind::Script, "main.js"));
        assert!(!cache.unload(ResourceKind::Script, "main.js"));

        assert_eq!(cache.references(ResourceKind::Script, "main.js"), Some(0));
        assert_eq!(cache.stats().unloads, 1);
    }

    #[test]
    fn test_unload_unknown_key() {
        let (_files, mut cache) = setup();
        assert!(!cache.unload(ResourceKind::Texture, "never.png"));
    }

    #[test]
    fn test_deferred_eviction_and_compact() {
        let (_files, mut cache) = setup();

        let held = cache.load(ResourceKind::Script, "main.js").unwrap();
        cache.load(ResourceKind::Shader, "basic.fx").unwrap();
        cache.unload(ResourceKind::Script, "main.js");

        // Still cached until compaction
        assert!(cache.contains(ResourceKind::Script, "main.js"));

        // Re-acquiring before compaction reuses the same instance
        let again = cache.load(ResourceKind::Script, "main.js").unwrap();
        assert!(Rc::ptr_eq(&held, &again));
        cache.unload(ResourceKind::Script, "main.js");

        assert_eq!(cache.compact(), 1);
        assert!(!cache.contains(ResourceKind::Script, "main.js"));
        assert!(cache.contains(ResourceKind::Shader, "basic.fx"));
        assert_eq!(cache.stats().evictions, 1);

        // The evicted instance is still usable by whoever kept it
        assert!(held.borrow().is_valid());
    }

    #[test]
    fn test_immediate_eviction() {
        let files = Rc::new(MemoryFiles::new());
        files.insert("main.js", "1");
        let config = ContentConfig::default().with_eviction(EvictionPolicy::Immediate);
        let mut cache = ContentCache::with_config(config, files);

        cache.load(ResourceKind::Script, "main.js").unwrap();
        cache.load(ResourceKind::Script, "main.js").unwrap();
        cache.unload(ResourceKind::Script, "main.js");
        assert!(cache.contains(ResourceKind::Script, "main.js"));

        cache.unload(ResourceKind::Script, "main.js");
        assert!(!cache.contains(ResourceKind::Script, "main.js"));
    }

    #[test]
    fn test_get_loads_once() {
        let (_files, mut cache) = setup();

        let a = cache.get::<Content<Script>>("main.js").unwrap();
        let b = cache.get::<Content<Script>>("main.js").unwrap();

        assert!(Rc::ptr_eq(&a, &b));
        assert_eq!(cache.references(ResourceKind::Script, "main.js"), Some(1));
    }

    #[test]
    fn test_find_never_loads() {
        let (_files, mut cache) = setup();

        assert!(cache.find::<Content<Script>>("main.js").is_none());
        assert!(cache.is_empty());

        cache.load(ResourceKind::Script, "main.js").unwrap();
        assert!(cache.find::<Content<Script>>("main.js").is_some());
    }

    #[test]
    fn test_notify_routes_operations() {
        let (_files, mut cache) = setup();
        let seen = record(&mut cache);

        assert!(cache.notify(ContentEvent::Load, ResourceKind::Script, "main.js"));
        assert!(cache.notify(ContentEvent::Reload, ResourceKind::Script, "main.js"));
        assert!(cache.notify(ContentEvent::Unload, ResourceKind::Script, "main.js"));
        assert!(!cache.notify(ContentEvent::Unload, ResourceKind::Script, "main.js"));

        // Queued until delivered
        assert!(seen.borrow().is_empty());
        assert_eq!(cache.pending_notifications(), 3);
        assert_eq!(cache.dispatch_pending(), 3);

        let events: Vec<ContentEvent> = seen.borrow().iter().map(|n| n.event).collect();
        assert_eq!(
            events,
            vec![ContentEvent::Load, ContentEvent::Reload, ContentEvent::Unload]
        );
        assert_eq!(seen.borrow()[0].path, "main.js");
        assert_eq!(seen.borrow()[0].kind, ResourceKind::Script);
    }

    #[test]
    fn test_reload_all() {
        let (files, mut cache) = setup();

        cache.load(ResourceKind::Script, "main.js").unwrap();
        cache.load(ResourceKind::Shader, "basic.fx").unwrap();
        files.remove("basic.fx");

        assert_eq!(cache.reload_all(), 1);
        assert_eq!(cache.stats().reloads, 2);
    }

    #[test]
    fn test_invalidate_entry() {
        let (_files, mut cache) = setup();

        let script = cache.get::<Content<Script>>("main.js").unwrap();
        assert!(cache.invalidate(ResourceKind::Script, "main.js"));
        assert!(!cache.is_valid(ResourceKind::Script, "main.js"));
        assert!(script.borrow().get().is_none());
        assert!(!cache.invalidate(ResourceKind::Script, "other.js"));
    }

    #[test]
    fn test_custom_loader_override() {
        let (_files, mut cache) = setup();
        cache.register_loader::<Content<Upper>>();

        let upper = cache.get::<Content<Upper>>("main.js").unwrap();
        assert_eq!(upper.borrow().get().unwrap().0, "LET X = 1;");
        assert_eq!(upper.borrow().kind(), ResourceKind::Script);

        // Cached as Upper, so the default script type does not match
        assert!(cache.find::<Content<Script>>("main.js").is_none());
    }

    #[test]
    fn test_get_with_mismatched_loader_does_not_load() {
        let (_files, mut cache) = setup();

        // The default script loader builds Content<Script>, not Content<Upper>
        assert!(cache.get::<Content<Upper>>("main.js").is_none());
        assert!(!cache.contains(ResourceKind::Script, "main.js"));
        assert_eq!(cache.references(ResourceKind::Script, "main.js"), None);
        assert_eq!(cache.stats().loads, 0);

        // An existing entry of the other type is left alone
        cache.load(ResourceKind::Script, "main.js").unwrap();
        assert!(cache.get::<Content<Upper>>("main.js").is_none());
        assert_eq!(cache.references(ResourceKind::Script, "main.js"), Some(1));
    }

    #[test]
    fn test_compact_forgets_unresolved_keys() {
        let (_files, mut cache) = setup();

        assert!(cache.load(ResourceKind::Unknown, "a").is_none());
        assert!(cache.load(ResourceKind::Unknown, "b").is_none());
        assert_eq!(cache.unresolved.len(), 2);

        cache.compact();
        assert!(cache.unresolved.is_empty());
    }

    #[test]
    fn test_listener_refetches_on_reload() {
        let (files, cache) = setup();
        let cache = cache.into_shared();
        let script = cache.borrow_mut().get::<Content<Script>>("main.js").unwrap();
        ContentCache::flush(&cache);

        let refetched = Rc::new(RefCell::new(None));
        {
            let sink = Rc::clone(&refetched);
            let weak = Rc::downgrade(&cache);
            cache.borrow_mut().subscribe(move |n: &Notification| {
                if n.event != ContentEvent::Reload {
                    return;
                }
                if let Some(cache) = weak.upgrade() {
                    let found = cache.borrow().find::<Content<Script>>(&n.path);
                    *sink.borrow_mut() = found.map(|script| {
                        let script = script.borrow();
                        script.get().map(|s| s.source.clone())
                    });
                }
            });
        }

        files.insert("main.js", "let x = 2;");
        assert!(cache.borrow_mut().reload(ResourceKind::Script, "main.js"));
        assert_eq!(ContentCache::flush(&cache), 1);

        assert_eq!(*refetched.borrow(), Some(Some("let x = 2;".to_string())));
        assert_eq!(script.borrow().generation(), 2);
    }

    #[test]
    fn test_flush_delivers_work_queued_by_listeners() {
        let (_files, cache) = setup();
        let cache = cache.into_shared();
        let seen = record(&mut cache.borrow_mut());
        {
            let weak = Rc::downgrade(&cache);
            cache.borrow_mut().subscribe(move |n: &Notification| {
                if n.event == ContentEvent::Load && n.kind == ResourceKind::Script {
                    if let Some(cache) = weak.upgrade() {
                        cache.borrow_mut().load(ResourceKind::Shader, "basic.fx");
                        // Nested flush leaves delivery to the outer one
                        assert_eq!(ContentCache::flush(&cache), 0);
                    }
                }
            });
        }

        cache.borrow_mut().load(ResourceKind::Script, "main.js");
        assert_eq!(ContentCache::flush(&cache), 2);

        let kinds: Vec<ResourceKind> = seen.borrow().iter().map(|n| n.kind).collect();
        assert_eq!(kinds, vec![ResourceKind::Script, ResourceKind::Shader]);
        assert_eq!(cache.borrow().pending_notifications(), 0);
    }

    #[test]
    fn test_clear() {
        let (_files, mut cache) = setup();
        cache.load(ResourceKind::Script, "main.js").unwrap();
        cache.clear();
        assert!(cache.is_empty());
    }
}
