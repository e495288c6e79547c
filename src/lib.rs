//! Content cache and bundle lifecycle for a real-time runtime
//!
//! This crate provides:
//! - A path-keyed content cache with reference counting and in-place reloads
//! - Bundles ("boxes") that acquire content from a JSON manifest and release
//!   it when dropped
//! - Load, reload and unload notifications for dependent subsystems
//! - Built-in content kinds decoded with `image`, `gltf` and `serde_json`

pub mod bundle;
pub mod cache;
pub mod config;
pub mod error;
pub mod events;
pub mod files;
pub mod kind;
pub mod kinds;
pub mod loadable;

// Re-exports for convenience
pub use bundle::{Bundle, BundleEntry, IssueReason, Manifest, ManifestIssue, parse_manifest};
pub use cache::{CacheStats, ContentCache, ContentKey, ResourceHandle, SharedCache};
pub use config::{ContentConfig, EvictionPolicy};
pub use error::ContentError;
pub use events::{ContentEvent, ContentListener, EventRouter, ListenerId, Notification};
pub use files::{DiskFiles, FileSource, MemoryFiles};
pub use kind::ResourceKind;
pub use loadable::{Content, Decode, Loadable, Shared, SharedLoadable, TypedLoadable};

pub use glam;

/// Prelude module for common imports
pub mod prelude {
    pub use crate::bundle::Bundle;
    pub use crate::cache::{ContentCache, SharedCache};
    pub use crate::config::{ContentConfig, EvictionPolicy};
    pub use crate::error::ContentError;
    pub use crate::events::{ContentEvent, Notification};
    pub use crate::files::{DiskFiles, FileSource, MemoryFiles};
    pub use crate::kind::ResourceKind;
    pub use crate::kinds::{
        Effect, Material, Model, ParticleEffect, Script, Shader, Sound, SpriteAnimation, Texture,
    };
    pub use crate::loadable::{Content, Loadable, Shared};
}
