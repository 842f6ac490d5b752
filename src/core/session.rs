use crate::errors::Result;
use crate::types::{ElementRect, Locator, Platform, ScreenSize};
use async_trait::async_trait;
use std::time::Duration;

/// A connected remote automation session: the single shared handle to
/// the device and app under test.
///
/// Implementations wrap an Appium-style protocol client. The engine
/// assumes exclusive single-writer access; nothing here is synchronized.
#[async_trait]
pub trait AutomationSession: Send + Sync {
    type Element: ElementHandle;

    /// Resolve a locator to one element, immediately. An empty match is
    /// reported as `ActionError::NoSuchElement`.
    async fn locate(&self, locator: &Locator) -> Result<Self::Element>;

    /// Resolve a locator to every matching element, immediately. An
    /// empty match is an empty vec, not an error.
    async fn locate_all(&self, locator: &Locator) -> Result<Vec<Self::Element>>;

    /// Straight-line swipe between two points in device pixels.
    async fn swipe(&self, x1: i32, y1: i32, x2: i32, y2: i32, duration: Duration) -> Result<()>;

    /// Synthetic pointer-down/pause/pointer-up at a point in device pixels.
    async fn tap(&self, x: i32, y: i32) -> Result<()>;

    /// Current viewport dimensions. Never cached by the engine.
    async fn viewport_size(&self) -> Result<ScreenSize>;

    /// Opaque snapshot of the current UI tree, comparable for equality.
    async fn page_source(&self) -> Result<String>;

    /// Set the session's ambient implicit wait. This is global mutable
    /// state on the session; the engine suspends it around explicit
    /// polling and restores the configured ambient value afterwards.
    async fn set_implicit_wait(&self, timeout: Duration) -> Result<()>;

    /// Dismiss the software keyboard if shown.
    async fn hide_keyboard(&self) -> Result<()>;

    /// Press the platform back control.
    async fn back(&self) -> Result<()>;

    fn platform(&self) -> Platform;
}

/// A live, possibly-stale reference to a located UI node.
///
/// Valid for one interaction only: a re-render invalidates the handle
/// and any method may fail with `ActionError::StaleElement`. Callers
/// re-resolve instead of caching across gestures.
#[async_trait]
pub trait ElementHandle: Send + Sync {
    async fn is_displayed(&self) -> Result<bool>;

    async fn is_enabled(&self) -> Result<bool>;

    async fn click(&self) -> Result<()>;

    async fn clear(&self) -> Result<()>;

    async fn send_keys(&self, text: &str) -> Result<()>;

    /// Attribute value, or `None` when the attribute is absent.
    async fn attribute(&self, name: &str) -> Result<Option<String>>;

    async fn text(&self) -> Result<String>;

    async fn rect(&self) -> Result<ElementRect>;
}
