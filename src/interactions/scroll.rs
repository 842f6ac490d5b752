use crate::core::{AutomationSession, ElementHandle};
use crate::errors::Result;
use crate::types::{ElementRect, Locator, ScreenSize};
use std::time::Duration;
use tracing::{debug, warn};

use super::engine::InteractionEngine;

/// One scroll gesture: start and end points in device pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwipeVector {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl SwipeVector {
    /// Total travel of the gesture.
    pub fn span(&self) -> i32 {
        (self.x1 - self.x2).abs() + (self.y1 - self.y2).abs()
    }
}

/// Start/end height (or width) fractions for one search direction,
/// plus the widened pair used once a swipe is judged ineffective.
#[derive(Debug, Clone, Copy)]
struct SwipeRatios {
    start: f64,
    end: f64,
    wide_start: f64,
    wide_end: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VerticalDirection {
    /// Drag upward to reveal content below (finger 80% -> 20%).
    Down,
    /// Drag downward to reveal content above (finger 30% -> 70%).
    Up,
}

impl VerticalDirection {
    fn ratios(self) -> SwipeRatios {
        match self {
            VerticalDirection::Down => SwipeRatios {
                start: 0.8,
                end: 0.2,
                wide_start: 0.9,
                wide_end: 0.1,
            },
            VerticalDirection::Up => SwipeRatios {
                start: 0.3,
                end: 0.7,
                wide_start: 0.1,
                wide_end: 0.9,
            },
        }
    }
}

/// Vertical swipe across the whole screen, centered horizontally.
fn screen_vector(size: ScreenSize, start_ratio: f64, end_ratio: f64) -> SwipeVector {
    let x = (size.width / 2) as i32;
    SwipeVector {
        x1: x,
        y1: (size.height as f64 * start_ratio) as i32,
        x2: x,
        y2: (size.height as f64 * end_ratio) as i32,
    }
}

/// Vertical swipe inside a container's bounds, centered on its width.
///
/// `None` when the bounds are degenerate: the computed points must stay
/// strictly inside the container and span at least `min_span` pixels.
fn container_vector(
    rect: ElementRect,
    start_ratio: f64,
    end_ratio: f64,
    min_span: i32,
) -> Option<SwipeVector> {
    let start_y = rect.y + (rect.height as f64 * start_ratio) as i32;
    let end_y = rect.y + (rect.height as f64 * end_ratio) as i32;
    let x = rect.center_x();

    let inside = start_y > rect.y && end_y < rect.y + rect.height;
    if inside && (start_y - end_y).abs() >= min_span {
        Some(SwipeVector {
            x1: x,
            y1: start_y,
            x2: x,
            y2: end_y,
        })
    } else {
        None
    }
}

/// Horizontal swipe inside a container, at its vertical center.
fn horizontal_container_vector(rect: ElementRect) -> SwipeVector {
    let y = rect.center_y();
    SwipeVector {
        x1: rect.x + (rect.width as f64 * 0.8) as i32,
        y1: y,
        x2: rect.x + (rect.width as f64 * 0.2) as i32,
        y2: y,
    }
}

/// Outcome of one swipe-then-probe iteration.
enum SwipeProbe<E> {
    Found(E),
    NotFound { snapshot: String },
}

impl<S: AutomationSession> InteractionEngine<S> {
    /// Scroll down through the platform's vertical scroll region (or
    /// `container`, when given) until the element is displayed.
    ///
    /// Already-visible elements short-circuit without a single swipe.
    /// When the container is missing or its bounds are degenerate the
    /// search swipes across the whole screen instead, and a swipe that
    /// leaves the UI snapshot unchanged widens the vector for the
    /// remaining attempts. Exhaustion is `Ok(false)`, not an error.
    pub async fn scroll_to_element(
        &self,
        locator: &Locator,
        container: Option<&Locator>,
        max_swipes: Option<u32>,
        post_swipe_delay: Option<Duration>,
    ) -> Result<bool> {
        self.suspend_implicit_wait().await?;
        let result = self
            .vertical_scroll_search(
                locator,
                container,
                max_swipes.unwrap_or(self.config.scrolling.max_swipes),
                post_swipe_delay
                    .unwrap_or(Duration::from_millis(self.config.scrolling.post_swipe_delay_ms)),
                VerticalDirection::Down,
            )
            .await;
        self.restore_implicit_wait().await;
        result
    }

    /// Mirror of [`scroll_to_element`](Self::scroll_to_element) that
    /// scrolls up (reveals content above).
    pub async fn scroll_to_element_up(
        &self,
        locator: &Locator,
        container: Option<&Locator>,
        max_swipes: Option<u32>,
        post_swipe_delay: Option<Duration>,
    ) -> Result<bool> {
        self.suspend_implicit_wait().await?;
        let result = self
            .vertical_scroll_search(
                locator,
                container,
                max_swipes.unwrap_or(self.config.scrolling.max_swipes),
                post_swipe_delay
                    .unwrap_or(Duration::from_millis(self.config.scrolling.post_swipe_delay_ms)),
                VerticalDirection::Up,
            )
            .await;
        self.restore_implicit_wait().await;
        result
    }

    /// Scroll left inside a horizontal scroll container until the
    /// element is displayed.
    ///
    /// Unlike the vertical searches there is no whole-screen fallback:
    /// a missing container fails closed to `Ok(false)` with no swipe
    /// issued.
    pub async fn scroll_to_element_left(
        &self,
        locator: &Locator,
        container: Option<&Locator>,
        max_swipes: Option<u32>,
        post_swipe_delay: Option<Duration>,
    ) -> Result<bool> {
        self.suspend_implicit_wait().await?;
        let result = self
            .horizontal_scroll_search(
                locator,
                container,
                max_swipes.unwrap_or(self.config.scrolling.horizontal_max_swipes),
                post_swipe_delay
                    .unwrap_or(Duration::from_millis(self.config.scrolling.post_swipe_delay_ms)),
            )
            .await;
        self.restore_implicit_wait().await;
        result
    }

    /// Degraded search: fixed whole-screen swipes, no container
    /// detection, no effectiveness feedback.
    pub async fn simple_scroll_to_element(
        &self,
        locator: &Locator,
        max_swipes: Option<u32>,
    ) -> Result<bool> {
        self.suspend_implicit_wait().await?;
        let result = self
            .simple_scroll_search(
                locator,
                max_swipes.unwrap_or(self.config.scrolling.simple_max_swipes),
            )
            .await;
        self.restore_implicit_wait().await;
        result
    }

    async fn vertical_scroll_search(
        &self,
        locator: &Locator,
        container: Option<&Locator>,
        max_swipes: u32,
        post_swipe_delay: Duration,
        direction: VerticalDirection,
    ) -> Result<bool> {
        if self.displayed_now(locator).await {
            return Ok(true);
        }

        let size = self.session.viewport_size().await?;
        let ratios = direction.ratios();
        let mut vector = screen_vector(size, ratios.start, ratios.end);

        let container_locator = match container {
            Some(locator) => locator.clone(),
            None => self.session.platform().vertical_scroll_container(),
        };
        match self.session.locate(&container_locator).await {
            Ok(element) => match element.rect().await {
                Ok(rect) => {
                    match container_vector(
                        rect,
                        ratios.start,
                        ratios.end,
                        self.config.scrolling.min_container_span_px,
                    ) {
                        Some(v) => vector = v,
                        None => {
                            debug!(%container_locator, "container swipe range invalid, using screen range")
                        }
                    }
                }
                Err(err) => {
                    debug!(%container_locator, %err, "could not read container bounds, using screen range")
                }
            },
            Err(err) if err.is_transient() => {
                debug!(%container_locator, "scroll container not found, using screen range")
            }
            Err(err) => return Err(err),
        }

        let duration = Duration::from_millis(self.config.gestures.scroll_swipe_duration_ms);
        let mut last_snapshot = self.session.page_source().await?;

        let mut swipe_count = 0;
        while swipe_count < max_swipes {
            match self
                .swipe_and_probe(vector, duration, post_swipe_delay, locator)
                .await
            {
                Ok(SwipeProbe::Found(_)) => return Ok(true),
                Ok(SwipeProbe::NotFound { snapshot }) => {
                    if snapshot == last_snapshot {
                        debug!(%locator, "page content unchanged, swipe may be ineffective");
                        vector = screen_vector(size, ratios.wide_start, ratios.wide_end);
                    }
                    last_snapshot = snapshot;
                }
                Err(err) => {
                    warn!(%locator, %err, "error during swipe iteration");
                }
            }
            swipe_count += 1;
        }

        debug!(%locator, max_swipes, "element not found after exhausting swipes");
        Ok(false)
    }

    async fn horizontal_scroll_search(
        &self,
        locator: &Locator,
        container: Option<&Locator>,
        max_swipes: u32,
        post_swipe_delay: Duration,
    ) -> Result<bool> {
        if self.displayed_now(locator).await {
            return Ok(true);
        }

        let container_locator = match container {
            Some(locator) => locator.clone(),
            None => self.session.platform().horizontal_scroll_container(),
        };
        let element = match self.session.locate(&container_locator).await {
            Ok(element) => element,
            Err(err) if err.is_transient() => {
                debug!(%container_locator, "horizontal scroll container not found");
                return Ok(false);
            }
            Err(err) => return Err(err),
        };
        let vector = horizontal_container_vector(element.rect().await?);

        let duration = Duration::from_millis(self.config.gestures.swipe_duration_ms);
        for _ in 0..max_swipes {
            match self
                .swipe_and_probe(vector, duration, post_swipe_delay, locator)
                .await
            {
                Ok(SwipeProbe::Found(_)) => return Ok(true),
                Ok(SwipeProbe::NotFound { .. }) => {}
                Err(err) => {
                    warn!(%locator, %err, "error during horizontal swipe iteration");
                }
            }
        }

        Ok(false)
    }

    async fn simple_scroll_search(&self, locator: &Locator, max_swipes: u32) -> Result<bool> {
        if self.displayed_now(locator).await {
            return Ok(true);
        }

        let size = self.session.viewport_size().await?;
        let vector = screen_vector(size, 0.8, 0.2);
        let duration = Duration::from_millis(self.config.gestures.simple_swipe_duration_ms);

        for attempt in 1..=max_swipes {
            debug!(attempt, max_swipes, "executing swipe");
            match self
                .swipe_and_probe(vector, duration, Duration::from_secs(1), locator)
                .await
            {
                Ok(SwipeProbe::Found(_)) => return Ok(true),
                Ok(SwipeProbe::NotFound { .. }) => {}
                Err(err) => {
                    warn!(%locator, %err, "error during swipe iteration");
                }
            }
        }

        debug!(%locator, max_swipes, "element not found after exhausting swipes");
        Ok(false)
    }

    /// One iteration of a scroll search: swipe, settle, probe for the
    /// target, and capture the post-swipe snapshot for effectiveness
    /// comparison.
    async fn swipe_and_probe(
        &self,
        vector: SwipeVector,
        duration: Duration,
        post_swipe_delay: Duration,
        locator: &Locator,
    ) -> Result<SwipeProbe<S::Element>> {
        self.session
            .swipe(vector.x1, vector.y1, vector.x2, vector.y2, duration)
            .await?;
        tokio::time::sleep(post_swipe_delay).await;

        if let Ok(element) = self.session.locate(locator).await {
            if matches!(element.is_displayed().await, Ok(true)) {
                return Ok(SwipeProbe::Found(element));
            }
        }

        let snapshot = self.session.page_source().await?;
        Ok(SwipeProbe::NotFound { snapshot })
    }

    /// Immediate present-and-displayed probe; any failure reads as "not
    /// on screen yet".
    pub(crate) async fn displayed_now(&self, locator: &Locator) -> bool {
        match self.session.locate(locator).await {
            Ok(element) => matches!(element.is_displayed().await, Ok(true)),
            Err(_) => false,
        }
    }
}
