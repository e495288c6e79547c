//! Content cache
//!
//! Provides the path-keyed resource cache with:
//! - One shared instance per (kind, path)
//! - Reference counting with deferred eviction
//! - In-place reloads visible to every holder

mod handle;
mod storage;

pub use handle::{ContentKey, ResourceHandle};
pub use storage::{CacheStats, ContentCache, SharedCache};
