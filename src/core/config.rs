use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    pub lookup: LookupConfig,
    pub gestures: GestureConfig,
    pub scrolling: ScrollConfig,
    pub waits: WaitConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LookupConfig {
    /// Budget for one presence/visibility poll, per retry attempt.
    pub default_timeout_ms: u64,
    pub poll_interval_ms: u64,
    pub retry_attempts: u32,
    pub retry_backoff_ms: u64,
    /// Ambient implicit wait restored on the session after the engine
    /// suspends it for explicit polling.
    pub implicit_wait_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GestureConfig {
    /// Duration of the raw swipe primitive.
    pub swipe_duration_ms: u64,
    /// Duration of one swipe inside the container-aware scroll search.
    pub scroll_swipe_duration_ms: u64,
    /// Duration of one swipe inside the degraded fixed-vector search.
    pub simple_swipe_duration_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrollConfig {
    pub max_swipes: u32,
    pub horizontal_max_swipes: u32,
    pub simple_max_swipes: u32,
    pub post_swipe_delay_ms: u64,
    /// A container whose swipe span would fall under this is treated as
    /// degenerate and the search falls back to the whole screen.
    pub min_container_span_px: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaitConfig {
    /// Budget for the composite waits (visible/present/disappear/many).
    pub default_timeout_ms: u64,
    /// Settle time after a toggle click before re-reading its state.
    pub toggle_settle_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            lookup: LookupConfig::default(),
            gestures: GestureConfig::default(),
            scrolling: ScrollConfig::default(),
            waits: WaitConfig::default(),
        }
    }
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            default_timeout_ms: 10_000,
            poll_interval_ms: 500,
            retry_attempts: 3,
            retry_backoff_ms: 1_000,
            implicit_wait_ms: 25_000,
        }
    }
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            swipe_duration_ms: 800,
            scroll_swipe_duration_ms: 1_500,
            simple_swipe_duration_ms: 1_000,
        }
    }
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            max_swipes: 5,
            horizontal_max_swipes: 3,
            simple_max_swipes: 3,
            post_swipe_delay_ms: 500,
            min_container_span_px: 100,
        }
    }
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            default_timeout_ms: 30_000,
            toggle_settle_ms: 1_000,
        }
    }
}

impl LookupConfig {
    pub fn default_timeout(&self) -> Duration {
        Duration::from_millis(self.default_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }

    pub fn implicit_wait(&self) -> Duration {
        Duration::from_millis(self.implicit_wait_ms)
    }
}

impl WaitConfig {
    pub fn default_timeout(&self) -> Duration {
        Duration::from_millis(self.default_timeout_ms)
    }

    pub fn toggle_settle(&self) -> Duration {
        Duration::from_millis(self.toggle_settle_ms)
    }
}
