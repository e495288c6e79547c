//! Content bundles
//!
//! A [`Bundle`] (a "box") groups the content a level, menu or scene needs.
//! It is described by a JSON manifest:
//!
//! ```json
//! [
//!     { "type": "texture", "path": "textures/crate.png" },
//!     { "type": "shader", "path": "shaders/lit.fx" },
//!     { "type": "box", "path": "boxes/ui.box" }
//! ]
//! ```
//!
//! # Design Principles
//!
//! - **Logical references only**: A bundle records (kind, path) pairs and
//!   never holds content itself
//! - **Balanced**: Every acquisition is matched by exactly one release when
//!   the bundle is dropped or reloaded
//! - **Forgiving**: Malformed entries are skipped and recorded as
//!   diagnostics; the rest of the manifest still loads
//!
//! All cache traffic goes through [`ContentCache::notify`], so listeners see
//! bundle activity as ordinary load and unload notifications. They are
//! delivered with [`ContentCache::flush`] at the end of every load and
//! release, when the bundle no longer borrows the cache.

use std::collections::BTreeMap;

use serde_json::Value;
use smallvec::SmallVec;

use crate::cache::{ContentCache, SharedCache};
use crate::error::ContentError;
use crate::events::ContentEvent;
use crate::kind::ResourceKind;

// ============================================================================
// Manifest
// ============================================================================

/// Why a manifest entry was skipped
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueReason {
    /// Entry is not a JSON object
    NotAnObject,
    /// `type` is missing or not a string
    MissingType,
    /// `path` is missing or not a string
    MissingPath,
    /// `path` is an empty string
    EmptyPath,
    /// `type` names no known kind
    UnknownKind(String),
    /// The cache could not provide the content
    Unresolved,
    /// A nested bundle would include one of its ancestors
    Cycle,
    /// A nested bundle exceeds the configured depth
    TooDeep,
}

/// A skipped manifest entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestIssue {
    /// Position of the entry in the manifest array
    pub index: usize,
    /// Why it was skipped
    pub reason: IssueReason,
}

impl ManifestIssue {
    /// Create an issue
    #[must_use]
    pub const fn new(index: usize, reason: IssueReason) -> Self {
        Self { index, reason }
    }
}

impl std::fmt::Display for ManifestIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let index = self.index;
        match &self.reason {
            IssueReason::NotAnObject => write!(f, "item {index} is not of an object type"),
            IssueReason::MissingType => {
                write!(f, "'type' of item {index} is not of a string type or undefined")
            }
            IssueReason::MissingPath => {
                write!(f, "'path' of item {index} is not of a string type or undefined")
            }
            IssueReason::EmptyPath => write!(f, "'path' of item {index} is empty"),
            IssueReason::UnknownKind(name) => {
                write!(f, "item {index} has unknown content type '{name}'")
            }
            IssueReason::Unresolved => write!(f, "item {index} could not be acquired"),
            IssueReason::Cycle => write!(f, "item {index} includes a bundle that includes itself"),
            IssueReason::TooDeep => write!(f, "item {index} nests bundles too deeply"),
        }
    }
}

/// A well-formed manifest entry, not yet acquired
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    /// Position in the manifest array
    pub index: usize,
    /// Resolved kind; `Unknown` if `declared` names none
    pub kind: ResourceKind,
    /// `type` string as written
    pub declared: String,
    /// Content path
    pub path: String,
}

/// Result of parsing a manifest
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    /// Well-formed entries in manifest order
    pub entries: Vec<ManifestEntry>,
    /// Entries that were skipped while parsing
    pub issues: Vec<ManifestIssue>,
}

/// Parse manifest text.
///
/// # Errors
///
/// Returns [`ContentError::ManifestError`] if the text is not JSON or the top
/// level is not an array. Problems with single entries are reported in
/// [`Manifest::issues`] instead.
pub fn parse_manifest(text: &str) -> Result<Manifest, ContentError> {
    let json: Value =
        serde_json::from_str(text).map_err(|e| ContentError::ManifestError(e.to_string()))?;
    let Value::Array(items) = json else {
        return Err(ContentError::ManifestError(
            "top level is not of an array type".to_string(),
        ));
    };

    let mut manifest = Manifest::default();
    for (index, item) in items.iter().enumerate() {
        let Some(object) = item.as_object() else {
            manifest
                .issues
                .push(ManifestIssue::new(index, IssueReason::NotAnObject));
            continue;
        };
        let Some(declared) = object.get("type").and_then(Value::as_str) else {
            manifest
                .issues
                .push(ManifestIssue::new(index, IssueReason::MissingType));
            continue;
        };
        let Some(path) = object.get("path").and_then(Value::as_str) else {
            manifest
                .issues
                .push(ManifestIssue::new(index, IssueReason::MissingPath));
            continue;
        };
        if path.is_empty() {
            manifest
                .issues
                .push(ManifestIssue::new(index, IssueReason::EmptyPath));
            continue;
        }

        manifest.entries.push(ManifestEntry {
            index,
            kind: ResourceKind::from_name(declared),
            declared: declared.to_string(),
            path: path.to_string(),
        });
    }

    Ok(manifest)
}

// ============================================================================
// Bundle
// ============================================================================

/// An acquired bundle entry
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BundleEntry {
    /// Kind of the content
    pub kind: ResourceKind,
    /// Content path
    pub path: String,
}

/// A group of content references that is released as one unit
pub struct Bundle {
    cache: SharedCache,
    manifest_path: Option<String>,
    entries: Vec<BundleEntry>,
    /// Indices into `entries`, grouped by kind
    by_kind: BTreeMap<ResourceKind, SmallVec<[usize; 8]>>,
    children: Vec<Bundle>,
    diagnostics: Vec<ManifestIssue>,
}

impl Bundle {
    /// Create an empty bundle bound to a cache
    #[must_use]
    pub fn new(cache: SharedCache) -> Self {
        Self {
            cache,
            manifest_path: None,
            entries: Vec::new(),
            by_kind: BTreeMap::new(),
            children: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    /// Create a bundle and load a manifest into it
    ///
    /// # Errors
    ///
    /// Returns an error if the manifest cannot be read or is not an array
    pub fn open(cache: SharedCache, manifest_path: &str) -> Result<Self, ContentError> {
        let mut bundle = Self::new(cache);
        bundle.load(manifest_path)?;
        Ok(bundle)
    }

    /// Load a manifest, acquiring every entry it declares.
    ///
    /// Anything this bundle held before is released first. Returns the
    /// number of entries acquired at this level; nested bundles are counted
    /// by their own [`len`](Self::len).
    ///
    /// # Errors
    ///
    /// Returns an error if the manifest cannot be read or is not an array
    pub fn load(&mut self, manifest_path: &str) -> Result<usize, ContentError> {
        self.release();
        let mut ancestors = Vec::new();
        let loaded = self.load_nested(manifest_path, &mut ancestors);
        ContentCache::flush(&self.cache);
        loaded
    }

    fn load_nested(
        &mut self,
        manifest_path: &str,
        ancestors: &mut Vec<String>,
    ) -> Result<usize, ContentError> {
        let (files, max_depth) = {
            let cache = self
                .cache
                .try_borrow()
                .map_err(|_| ContentError::Busy(manifest_path.to_string()))?;
            (cache.files(), cache.config().max_bundle_depth)
        };

        let manifest = files
            .read_to_string(manifest_path)
            .and_then(|text| parse_manifest(&text))
            .inspect_err(|e| log::error!("Could not load bundle '{manifest_path}': {e}"))?;

        self.manifest_path = Some(manifest_path.to_string());
        for issue in manifest.issues {
            self.report(issue);
        }

        ancestors.push(manifest_path.to_string());
        for entry in manifest.entries {
            match entry.kind {
                ResourceKind::Bundle => self.open_child(entry, ancestors, max_depth),
                _ => self.acquire(entry),
            }
        }
        ancestors.pop();

        log::info!(
            "Loaded bundle '{manifest_path}': {} entries, {} nested, {} skipped",
            self.entries.len(),
            self.children.len(),
            self.diagnostics.len()
        );
        Ok(self.entries.len())
    }

    fn acquire(&mut self, entry: ManifestEntry) {
        let acquired = match self.cache.try_borrow_mut() {
            Ok(mut cache) => cache.notify(ContentEvent::Load, entry.kind, &entry.path),
            Err(_) => {
                log::error!("Cache is borrowed; cannot acquire '{}'", entry.path);
                false
            }
        };

        if !acquired {
            let reason = if entry.kind.is_known() {
                IssueReason::Unresolved
            } else {
                IssueReason::UnknownKind(entry.declared)
            };
            self.report(ManifestIssue::new(entry.index, reason));
            return;
        }

        let index = self.entries.len();
        self.by_kind.entry(entry.kind).or_default().push(index);
        self.entries.push(BundleEntry {
            kind: entry.kind,
            path: entry.path,
        });
    }

    fn open_child(&mut self, entry: ManifestEntry, ancestors: &mut Vec<String>, max_depth: usize) {
        if ancestors.contains(&entry.path) {
            self.report(ManifestIssue::new(entry.index, IssueReason::Cycle));
            return;
        }
        if ancestors.len() >= max_depth {
            self.report(ManifestIssue::new(entry.index, IssueReason::TooDeep));
            return;
        }

        let mut child = Bundle::new(self.cache.clone());
        match child.load_nested(&entry.path, ancestors) {
            Ok(_) => self.children.push(child),
            Err(_) => self.report(ManifestIssue::new(entry.index, IssueReason::Unresolved)),
        }
    }

    fn report(&mut self, issue: ManifestIssue) {
        log::error!(
            "Skipping entry in bundle '{}': {issue}",
            self.manifest_path.as_deref().unwrap_or("<unnamed>")
        );
        self.diagnostics.push(issue);
    }

    /// Release every entry and nested bundle, leaving this bundle empty.
    ///
    /// Content shared with another bundle stays cached until its last
    /// reference goes.
    pub fn release(&mut self) {
        let had_content = !self.entries.is_empty() || !self.children.is_empty();
        if !self.entries.is_empty() {
            match self.cache.try_borrow_mut() {
                Ok(mut cache) => {
                    for indices in self.by_kind.values() {
                        for &index in indices {
                            let entry = &self.entries[index];
                            cache.notify(ContentEvent::Unload, entry.kind, &entry.path);
                        }
                    }
                }
                Err(_) => log::error!(
                    "Cache is borrowed; {} references of bundle '{}' are leaked",
                    self.entries.len(),
                    self.manifest_path.as_deref().unwrap_or("<unnamed>")
                ),
            }
        }

        if let Some(path) = self.manifest_path.take() {
            log::debug!("Released bundle '{path}'");
        }
        self.entries.clear();
        self.by_kind.clear();
        self.children.clear();
        self.diagnostics.clear();
        if had_content {
            ContentCache::flush(&self.cache);
        }
    }

    // -------------------------------------------------------------------------
    // Introspection
    // -------------------------------------------------------------------------

    /// Acquired entries in manifest order
    #[must_use]
    pub fn entries(&self) -> &[BundleEntry] {
        &self.entries
    }

    /// Paths acquired for one kind, in manifest order
    #[must_use]
    pub fn paths(&self, kind: ResourceKind) -> Vec<&str> {
        self.by_kind
            .get(&kind)
            .map(|indices| {
                indices
                    .iter()
                    .map(|&index| self.entries[index].path.as_str())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Whether (kind, path) was acquired at this level
    #[must_use]
    pub fn contains(&self, kind: ResourceKind, path: &str) -> bool {
        self.paths(kind).contains(&path)
    }

    /// Number of acquired entries at this level
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if nothing was acquired at this level
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries skipped while loading
    #[must_use]
    pub fn diagnostics(&self) -> &[ManifestIssue] {
        &self.diagnostics
    }

    /// Nested bundles
    #[must_use]
    pub fn children(&self) -> &[Bundle] {
        &self.children
    }

    /// Manifest this bundle was loaded from
    #[must_use]
    pub fn manifest_path(&self) -> Option<&str> {
        self.manifest_path.as_deref()
    }

    /// Cache this bundle acquires from
    #[must_use]
    pub fn cache(&self) -> &SharedCache {
        &self.cache
    }
}

impl Drop for Bundle {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for Bundle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bundle")
            .field("manifest_path", &self.manifest_path)
            .field("entries", &self.entries)
            .field("children", &self.children)
            .field("diagnostics", &self.diagnostics)
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
