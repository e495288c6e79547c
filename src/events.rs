//! Content lifecycle notifications
//!
//! The cache publishes a [`Notification`] for every load, reload and unload.
//! Subsystems that hold on to content (a renderer re-binding a texture, an
//! audio system dropping a stale clip) subscribe a [`ContentListener`] to the
//! [`EventRouter`] instead of being called by the cache directly.
//!
//! # Design Principles
//!
//! - **Synchronous**: Delivery happens on the caller's thread, right after the
//!   cache borrow that queued the notification ends
//! - **Ordered**: Delivery follows registration order
//! - **Isolated**: A failing or panicking listener never stops the others
//!
//! # Example
//!
//! ```ignore
//! let id = cache.subscribe(|n: &Notification| {
//!     if n.event == ContentEvent::Reload && n.kind == ResourceKind::Texture {
//!         rebind_texture(&n.path);
//!     }
//! });
//! ```

use std::panic::{self, AssertUnwindSafe};

use crate::error::ContentError;
use crate::kind::ResourceKind;

// ============================================================================
// Event Types
// ============================================================================

/// Lifecycle transition of a cache entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentEvent {
    /// Content was acquired (created or shared)
    Load,
    /// Content was re-populated in place
    Reload,
    /// A reference to content was released
    Unload,
}

impl ContentEvent {
    /// Lowercase name, for diagnostics
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Load => "load",
            Self::Reload => "reload",
            Self::Unload => "unload",
        }
    }
}

/// A single lifecycle notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// What happened
    pub event: ContentEvent,
    /// Kind of the affected entry
    pub kind: ResourceKind,
    /// Path of the affected entry
    pub path: String,
}

impl Notification {
    /// Create a notification
    #[must_use]
    pub fn new(event: ContentEvent, kind: ResourceKind, path: impl Into<String>) -> Self {
        Self {
            event,
            kind,
            path: path.into(),
        }
    }
}

// ============================================================================
// Listeners
// ============================================================================

/// Receiver of content notifications.
///
/// Closures taking `&Notification` implement this trait directly.
pub trait ContentListener {
    /// Handle one notification
    ///
    /// # Errors
    ///
    /// An error is logged by the router and does not affect other listeners
    fn on_notification(&mut self, notification: &Notification) -> Result<(), ContentError>;
}

impl<F> ContentListener for F
where
    F: FnMut(&Notification),
{
    fn on_notification(&mut self, notification: &Notification) -> Result<(), ContentError> {
        self(notification);
        Ok(())
    }
}

/// Identifier returned by [`EventRouter::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

// ============================================================================
// Event Router
// ============================================================================

/// Fan-out of notifications to registered listeners
#[derive(Default)]
pub struct EventRouter {
    listeners: Vec<(ListenerId, Box<dyn ContentListener>)>,
    next_id: u64,
}

impl EventRouter {
    /// Create a router with no listeners
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener; it receives every notification from now on
    pub fn subscribe(&mut self, listener: impl ContentListener + 'static) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener, returning whether it was registered
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    /// Deliver a notification to every listener in registration order.
    ///
    /// Returns the number of listeners that handled it successfully.
    pub fn dispatch(&mut self, notification: &Notification) -> usize {
        let mut delivered = 0;

        for (id, listener) in &mut self.listeners {
            let outcome =
                panic::catch_unwind(AssertUnwindSafe(|| listener.on_notification(notification)));
            match outcome {
                Ok(Ok(())) => delivered += 1,
                Ok(Err(e)) => log::error!(
                    "Listener {:?} failed on {} of {} '{}': {e}",
                    id,
                    notification.event.name(),
                    notification.kind,
                    notification.path
                ),
                Err(_) => log::error!(
                    "Listener {:?} panicked on {} of {} '{}'",
                    id,
                    notification.event.name(),
                    notification.kind,
                    notification.path
                ),
            }
        }

        delivered
    }

    /// Number of registered listeners
    #[must_use]
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    /// Check if no listener is registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Remove all listeners
    pub fn clear(&mut self) {
        self.listeners.clear();
    }
}

impl std::fmt::Debug for EventRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventRouter")
            .field("listener_count", &self.listeners.len())
            .field("next_id", &self.next_id)
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
