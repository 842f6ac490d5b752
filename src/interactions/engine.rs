use crate::core::{AutomationSession, ElementHandle, EngineConfig};
use crate::errors::{ActionError, Result};
use crate::types::{Locator, Platform, ScreenSize};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

use super::retry::retry_with_backoff;

/// Drives a mobile app through user-like interactions on top of a
/// connected [`AutomationSession`].
///
/// Element lookup is retry-wrapped against transient staleness, scroll
/// searches adapt to the platform's scroll containers, and toggle
/// coercion is idempotent. Every operation is sequential: it returns
/// only after success, exhaustion, or a raised error.
pub struct InteractionEngine<S: AutomationSession> {
    pub(crate) session: Arc<S>,
    pub(crate) config: EngineConfig,
    engine_id: String,
}

impl<S: AutomationSession> InteractionEngine<S> {
    pub fn new(session: S) -> Self {
        Self::with_config(session, EngineConfig::default())
    }

    pub fn with_config(session: S, config: EngineConfig) -> Self {
        let engine_id = uuid::Uuid::new_v4().to_string();
        debug!(%engine_id, platform = %session.platform(), "interaction engine created");
        Self {
            session: Arc::new(session),
            config,
            engine_id,
        }
    }

    pub fn session(&self) -> &S {
        &self.session
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn engine_id(&self) -> &str {
        &self.engine_id
    }

    pub fn platform(&self) -> Platform {
        self.session.platform()
    }

    // ---- retrying element lookup ----

    /// Find an element, polling until it is present (not necessarily
    /// visible). The poll is wrapped in an outer retry loop so a DOM
    /// re-render mid-poll costs one attempt instead of the whole call.
    pub async fn find_element(
        &self,
        locator: &Locator,
        timeout: Option<Duration>,
    ) -> Result<S::Element> {
        let timeout = timeout.unwrap_or_else(|| self.config.lookup.default_timeout());
        let attempts = self.config.lookup.retry_attempts;

        let result = retry_with_backoff(
            attempts,
            self.config.lookup.retry_backoff(),
            |err| err.is_transient() || matches!(err, ActionError::ElementNotFound(_)),
            || async move { self.poll_present(locator, timeout).await },
        )
        .await;

        result.map_err(|err| match err {
            ActionError::ElementNotFound(_)
            | ActionError::NoSuchElement(_)
            | ActionError::StaleElement(_) => ActionError::ElementNotFound(format!(
                "Element ({locator}) not found after {attempts} attempts"
            )),
            other => other,
        })
    }

    /// Non-fatal visibility probe with the same retry shape as
    /// [`find_element`](Self::find_element); exhaustion is `false`,
    /// never an error.
    pub async fn is_visible(&self, locator: &Locator, timeout: Option<Duration>) -> bool {
        let timeout = timeout.unwrap_or_else(|| self.config.lookup.default_timeout());

        let result = retry_with_backoff(
            self.config.lookup.retry_attempts,
            self.config.lookup.retry_backoff(),
            |err| {
                err.is_transient()
                    || matches!(
                        err,
                        ActionError::ElementNotFound(_) | ActionError::VisibilityTimeout(_)
                    )
            },
            || async move { self.poll_visible(locator, timeout).await },
        )
        .await;

        result.is_ok()
    }

    /// Single immediate existence check: no wait, no retry, fails
    /// closed to `false`.
    pub async fn is_present(&self, locator: &Locator) -> bool {
        match self.session.locate(locator).await {
            Ok(_) => true,
            Err(err) => {
                if !err.is_transient() {
                    warn!(%locator, %err, "presence check failed");
                }
                false
            }
        }
    }

    // ---- gesture dispatch ----

    /// Wait for the element to become interactable (present, displayed,
    /// enabled), then tap it. Retries the whole wait-and-click against
    /// staleness; exhaustion raises `ElementNotClickable`.
    pub async fn click(&self, locator: &Locator, timeout: Option<Duration>) -> Result<()> {
        let timeout = timeout.unwrap_or_else(|| self.config.lookup.default_timeout());
        let attempts = self.config.lookup.retry_attempts;

        let result = retry_with_backoff(
            attempts,
            self.config.lookup.retry_backoff(),
            |err| err.is_transient() || matches!(err, ActionError::ElementNotClickable(_)),
            || async move {
                let element = self.poll_clickable(locator, timeout).await?;
                element.click().await
            },
        )
        .await;

        result.map_err(|err| match err {
            ActionError::ElementNotClickable(_)
            | ActionError::NoSuchElement(_)
            | ActionError::StaleElement(_) => ActionError::ElementNotClickable(format!(
                "Element ({locator}) not clickable after {attempts} attempts"
            )),
            other => other,
        })
    }

    /// Click the element only if it becomes visible within one bounded
    /// probe; returns whether the click happened. Meant for optional,
    /// dismissible UI, so nothing here ever raises.
    pub async fn click_if_present(&self, locator: &Locator) -> bool {
        let timeout = self.config.lookup.default_timeout();
        match self.poll_visible(locator, timeout).await {
            Ok(element) => match element.click().await {
                Ok(()) => true,
                Err(err) => {
                    warn!(%locator, %err, "optional element visible but click failed");
                    false
                }
            },
            Err(_) => false,
        }
    }

    /// Tap at a viewport-relative position, each axis in 0.0..=1.0.
    /// Used where no addressable element exists, e.g. custom-drawn
    /// canvases.
    pub async fn tap_at_ratio(&self, x_ratio: f64, y_ratio: f64) -> Result<()> {
        let size = self.session.viewport_size().await?;
        let x = (size.width as f64 * x_ratio) as i32;
        let y = (size.height as f64 * y_ratio) as i32;
        debug!(x, y, "tap at ratio ({x_ratio}, {y_ratio})");
        self.session.tap(x, y).await
    }

    /// Raw straight-line swipe; every scroll search is built from this.
    pub async fn swipe(
        &self,
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
        duration: Option<Duration>,
    ) -> Result<()> {
        let duration =
            duration.unwrap_or(Duration::from_millis(self.config.gestures.swipe_duration_ms));
        self.session.swipe(x1, y1, x2, y2, duration).await
    }

    pub async fn screen_size(&self) -> Result<ScreenSize> {
        self.session.viewport_size().await
    }

    // ---- element conveniences ----

    pub async fn send_keys(&self, locator: &Locator, text: &str) -> Result<()> {
        let element = self.find_element(locator, None).await?;
        element.send_keys(text).await
    }

    pub async fn clear(&self, locator: &Locator) -> Result<()> {
        let element = self.find_element(locator, None).await?;
        element.clear().await
    }

    pub async fn element_text(&self, locator: &Locator) -> Result<String> {
        let element = self.find_element(locator, None).await?;
        element.text().await
    }

    pub async fn verify_element_text(&self, locator: &Locator, expected: &str) -> Result<bool> {
        let actual = self.element_text(locator).await?;
        Ok(actual == expected)
    }

    pub async fn element_attribute(
        &self,
        locator: &Locator,
        name: &str,
    ) -> Result<Option<String>> {
        let element = self.find_element(locator, None).await?;
        element.attribute(name).await
    }

    pub async fn element_location(&self, locator: &Locator) -> Result<(i32, i32)> {
        let element = self.find_element(locator, None).await?;
        let rect = element.rect().await?;
        Ok((rect.x, rect.y))
    }

    pub async fn element_size(&self, locator: &Locator) -> Result<(i32, i32)> {
        let element = self.find_element(locator, None).await?;
        let rect = element.rect().await?;
        Ok((rect.width, rect.height))
    }

    /// Number of elements currently matching the locator, without
    /// waiting.
    pub async fn element_count(&self, locator: &Locator) -> Result<usize> {
        Ok(self.session.locate_all(locator).await?.len())
    }

    pub async fn hide_keyboard(&self) -> Result<()> {
        self.session.hide_keyboard().await
    }

    /// Press the platform back control `times` times, letting each
    /// transition settle.
    pub async fn navigate_back(&self, times: u32) -> Result<()> {
        for _ in 0..times {
            tokio::time::sleep(Duration::from_millis(500)).await;
            self.session.back().await?;
            tokio::time::sleep(Duration::from_secs(1)).await;
        }
        Ok(())
    }

    // ---- composite waits ----

    /// Wait until the element is visible. `Ok(Some)` on success,
    /// `Ok(None)` when the element never appeared at all, and a
    /// `VisibilityTimeout` error when it was present but still hidden
    /// at the deadline.
    pub async fn wait_visible(
        &self,
        locator: &Locator,
        timeout: Option<Duration>,
    ) -> Result<Option<S::Element>> {
        let timeout = timeout.unwrap_or_else(|| self.config.waits.default_timeout());
        self.suspend_implicit_wait().await?;
        let result = self.poll_visible(locator, timeout).await;
        self.restore_implicit_wait().await;

        match result {
            Ok(element) => Ok(Some(element)),
            Err(ActionError::ElementNotFound(_)) => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Wait until the element appears and becomes visible; `false` on
    /// timeout instead of an error.
    pub async fn wait_present(&self, locator: &Locator, timeout: Option<Duration>) -> Result<bool> {
        let timeout = timeout.unwrap_or_else(|| self.config.waits.default_timeout());
        self.suspend_implicit_wait().await?;
        let result = self.poll_visible(locator, timeout).await;
        self.restore_implicit_wait().await;

        match result {
            Ok(_) => Ok(true),
            Err(ActionError::ElementNotFound(_)) | Err(ActionError::VisibilityTimeout(_)) => {
                Ok(false)
            }
            Err(err) => Err(err),
        }
    }

    /// Single bounded wait for interactability at the engine default
    /// timeout; never errors.
    pub async fn wait_clickable(&self, locator: &Locator) -> bool {
        let timeout = self.config.lookup.default_timeout();
        self.poll_clickable(locator, timeout).await.is_ok()
    }

    /// Wait until the element is gone or hidden. Success is immediate
    /// when the element is already absent; a `StillVisible` error means
    /// the deadline passed with the element still displayed.
    pub async fn wait_disappear(&self, locator: &Locator, timeout: Option<Duration>) -> Result<()> {
        let timeout = timeout.unwrap_or_else(|| self.config.waits.default_timeout());
        self.suspend_implicit_wait().await?;
        let result = self.poll_disappear(locator, timeout).await;
        self.restore_implicit_wait().await;
        result
    }

    /// Wait until at least `min_count` matches are displayed at once;
    /// raises `InsufficientVisibleElements` on timeout.
    pub async fn wait_many_visible(
        &self,
        locator: &Locator,
        timeout: Option<Duration>,
        min_count: usize,
    ) -> Result<Vec<S::Element>> {
        let timeout = timeout.unwrap_or_else(|| self.config.waits.default_timeout());
        self.suspend_implicit_wait().await?;
        let result = self.poll_many_visible(locator, timeout, min_count).await;
        self.restore_implicit_wait().await;
        result
    }

    // ---- polling internals ----

    /// One presence poll with a deadline. Transient lookup misses keep
    /// the poll alive; any other session error aborts it.
    pub(crate) async fn poll_present(
        &self,
        locator: &Locator,
        timeout: Duration,
    ) -> Result<S::Element> {
        let start = Instant::now();
        loop {
            match self.session.locate(locator).await {
                Ok(element) => return Ok(element),
                Err(err) if err.is_transient() => {}
                Err(err) => return Err(err),
            }
            if start.elapsed() >= timeout {
                return Err(ActionError::ElementNotFound(format!(
                    "Element ({locator}) not present within {}s",
                    timeout.as_secs_f64()
                )));
            }
            tokio::time::sleep(self.config.lookup.poll_interval()).await;
        }
    }

    /// One visibility poll with a deadline. The deadline error keeps
    /// the distinction between "never found" and "present but hidden".
    pub(crate) async fn poll_visible(
        &self,
        locator: &Locator,
        timeout: Duration,
    ) -> Result<S::Element> {
        let start = Instant::now();
        let mut seen_present = false;
        loop {
            match self.session.locate(locator).await {
                Ok(element) => {
                    seen_present = true;
                    if matches!(element.is_displayed().await, Ok(true)) {
                        return Ok(element);
                    }
                }
                Err(err) if err.is_transient() => {}
                Err(err) => return Err(err),
            }
            if start.elapsed() >= timeout {
                return Err(if seen_present {
                    ActionError::VisibilityTimeout(format!(
                        "Element ({locator}) still not visible after {}s",
                        timeout.as_secs_f64()
                    ))
                } else {
                    ActionError::ElementNotFound(format!(
                        "Element ({locator}) not found within {}s",
                        timeout.as_secs_f64()
                    ))
                });
            }
            tokio::time::sleep(self.config.lookup.poll_interval()).await;
        }
    }

    pub(crate) async fn poll_clickable(
        &self,
        locator: &Locator,
        timeout: Duration,
    ) -> Result<S::Element> {
        let start = Instant::now();
        loop {
            match self.session.locate(locator).await {
                Ok(element) => {
                    let displayed = matches!(element.is_displayed().await, Ok(true));
                    let enabled = matches!(element.is_enabled().await, Ok(true));
                    if displayed && enabled {
                        return Ok(element);
                    }
                }
                Err(err) if err.is_transient() => {}
                Err(err) => return Err(err),
            }
            if start.elapsed() >= timeout {
                return Err(ActionError::ElementNotClickable(format!(
                    "Element ({locator}) not clickable within {}s",
                    timeout.as_secs_f64()
                )));
            }
            tokio::time::sleep(self.config.lookup.poll_interval()).await;
        }
    }

    async fn poll_disappear(&self, locator: &Locator, timeout: Duration) -> Result<()> {
        let start = Instant::now();
        loop {
            match self.session.locate(locator).await {
                // Gone entirely counts as disappeared.
                Err(err) if err.is_transient() => return Ok(()),
                Err(err) => return Err(err),
                Ok(element) => {
                    if !matches!(element.is_displayed().await, Ok(true)) {
                        return Ok(());
                    }
                }
            }
            if start.elapsed() >= timeout {
                return Err(ActionError::StillVisible(format!(
                    "Element ({locator}) still visible after {}s",
                    timeout.as_secs_f64()
                )));
            }
            tokio::time::sleep(self.config.lookup.poll_interval()).await;
        }
    }

    async fn poll_many_visible(
        &self,
        locator: &Locator,
        timeout: Duration,
        min_count: usize,
    ) -> Result<Vec<S::Element>> {
        let start = Instant::now();
        loop {
            let elements = self.session.locate_all(locator).await?;
            let mut visible = Vec::new();
            for element in elements {
                if matches!(element.is_displayed().await, Ok(true)) {
                    visible.push(element);
                }
            }
            if visible.len() >= min_count {
                return Ok(visible);
            }
            if start.elapsed() >= timeout {
                return Err(ActionError::InsufficientVisibleElements(format!(
                    "Expected at least {min_count} visible elements ({locator}) after {}s, saw {}",
                    timeout.as_secs_f64(),
                    visible.len()
                )));
            }
            tokio::time::sleep(self.config.lookup.poll_interval()).await;
        }
    }

    // ---- implicit wait bracketing ----

    /// Explicit polling races the session's ambient implicit wait, so
    /// it is suspended first and restored on every exit path.
    pub(crate) async fn suspend_implicit_wait(&self) -> Result<()> {
        self.session.set_implicit_wait(Duration::ZERO).await
    }

    pub(crate) async fn restore_implicit_wait(&self) {
        let ambient = self.config.lookup.implicit_wait();
        if let Err(err) = self.session.set_implicit_wait(ambient).await {
            warn!(%err, "failed to restore implicit wait");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ScriptedElement, ScriptedSession};
    use crate::types::Platform;

    fn android_session() -> crate::testing::ScriptedSessionBuilder {
        ScriptedSession::builder(Platform::Android)
    }

    #[tokio::test(start_paused = true)]
    async fn find_element_returns_present_element() {
        let session = android_session()
            .element(ScriptedElement::new("login_button"))
            .build();
        let engine = InteractionEngine::new(session);

        let element = engine
            .find_element(&Locator::id("login_button"), None)
            .await
            .unwrap();
        assert!(element.is_displayed().await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn find_element_polls_until_element_appears() {
        let session = android_session()
            .element(ScriptedElement::new("late_banner").appears_after(Duration::from_secs(3)))
            .build();
        let engine = InteractionEngine::new(session);

        let result = engine.find_element(&Locator::id("late_banner"), None).await;
        assert!(result.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn find_element_exhausts_three_attempts_with_backoff() {
        let session = android_session().build();
        let engine = InteractionEngine::new(session);
        let start = Instant::now();

        let result = engine
            .find_element(&Locator::id("missing"), Some(Duration::from_secs(1)))
            .await;

        let err = result.unwrap_err();
        assert!(matches!(err, ActionError::ElementNotFound(_)));
        assert!(err.to_string().contains("after 3 attempts"));
        // 3 attempts x 1s timeout + 2 x 1s backoff.
        assert_eq!(start.elapsed(), Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn is_visible_never_errors() {
        let session = android_session()
            .element(ScriptedElement::new("spinner").hidden())
            .build();
        let engine = InteractionEngine::new(session);

        assert!(
            !engine
                .is_visible(&Locator::id("spinner"), Some(Duration::from_secs(1)))
                .await
        );
        assert!(
            !engine
                .is_visible(&Locator::id("missing"), Some(Duration::from_secs(1)))
                .await
        );
    }

    #[tokio::test(start_paused = true)]
    async fn is_present_is_immediate() {
        let session = android_session()
            .element(ScriptedElement::new("header").hidden())
            .build();
        let engine = InteractionEngine::new(session);
        let start = Instant::now();

        // Hidden still counts as present.
        assert!(engine.is_present(&Locator::id("header")).await);
        assert!(!engine.is_present(&Locator::id("missing")).await);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn click_taps_interactable_element_once() {
        let session = android_session()
            .element(ScriptedElement::new("submit"))
            .build();
        let probe = session.clone();
        let engine = InteractionEngine::new(session);

        engine.click(&Locator::id("submit"), None).await.unwrap();
        assert_eq!(probe.click_count("submit"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn click_raises_not_clickable_for_hidden_element() {
        let session = android_session()
            .element(ScriptedElement::new("ghost").hidden())
            .build();
        let probe = session.clone();
        let engine = InteractionEngine::new(session);

        let result = engine
            .click(&Locator::id("ghost"), Some(Duration::from_secs(1)))
            .await;

        assert!(matches!(result, Err(ActionError::ElementNotClickable(_))));
        assert_eq!(probe.click_count("ghost"), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn click_raises_not_clickable_for_disabled_element() {
        let session = android_session()
            .element(ScriptedElement::new("frozen").disabled())
            .build();
        let engine = InteractionEngine::new(session);

        let result = engine
            .click(&Locator::id("frozen"), Some(Duration::from_secs(1)))
            .await;
        assert!(matches!(result, Err(ActionError::ElementNotClickable(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn click_if_present_skips_missing_element() {
        let session = android_session().build();
        let probe = session.clone();
        let engine = InteractionEngine::new(session);

        assert!(!engine.click_if_present(&Locator::id("promo_banner")).await);
        assert_eq!(probe.click_count("promo_banner"), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn click_if_present_clicks_visible_element() {
        let session = android_session()
            .element(ScriptedElement::new("promo_banner"))
            .build();
        let probe = session.clone();
        let engine = InteractionEngine::new(session);

        assert!(engine.click_if_present(&Locator::id("promo_banner")).await);
        assert_eq!(probe.click_count("promo_banner"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn tap_at_ratio_scales_to_viewport() {
        let session = android_session().viewport(1000, 2000).build();
        let probe = session.clone();
        let engine = InteractionEngine::new(session);

        engine.tap_at_ratio(0.5, 0.9).await.unwrap();
        assert_eq!(probe.taps(), vec![(500, 1800)]);
    }

    #[tokio::test(start_paused = true)]
    async fn swipe_uses_default_duration() {
        let session = android_session().build();
        let probe = session.clone();
        let engine = InteractionEngine::new(session);

        engine.swipe(500, 1500, 500, 400, None).await.unwrap();
        let swipes = probe.swipes();
        assert_eq!(swipes.len(), 1);
        assert_eq!(swipes[0].duration_ms, 800);
    }

    #[tokio::test(start_paused = true)]
    async fn send_keys_and_clear_edit_the_field() {
        let session = android_session()
            .element(ScriptedElement::new("email_field"))
            .build();
        let probe = session.clone();
        let engine = InteractionEngine::new(session);
        let field = Locator::id("email_field");

        engine.send_keys(&field, "user@example.com").await.unwrap();
        assert_eq!(probe.entered_text("email_field"), "user@example.com");

        engine.clear(&field).await.unwrap();
        assert_eq!(probe.entered_text("email_field"), "");
    }

    #[tokio::test(start_paused = true)]
    async fn element_text_and_verification() {
        let session = android_session()
            .element(ScriptedElement::new("title").with_text("Settings"))
            .build();
        let engine = InteractionEngine::new(session);
        let title = Locator::id("title");

        assert_eq!(engine.element_text(&title).await.unwrap(), "Settings");
        assert!(engine.verify_element_text(&title, "Settings").await.unwrap());
        assert!(!engine.verify_element_text(&title, "Profile").await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn element_geometry_comes_from_its_rect() {
        let session = android_session()
            .element(ScriptedElement::new("avatar").with_rect(crate::types::ElementRect {
                x: 24,
                y: 128,
                width: 96,
                height: 96,
            }))
            .build();
        let engine = InteractionEngine::new(session);
        let avatar = Locator::id("avatar");

        assert_eq!(engine.element_location(&avatar).await.unwrap(), (24, 128));
        assert_eq!(engine.element_size(&avatar).await.unwrap(), (96, 96));
        assert_eq!(
            engine.element_attribute(&avatar, "checked").await.unwrap(),
            None
        );
    }

    #[tokio::test(start_paused = true)]
    async fn element_count_counts_all_matches() {
        let session = android_session()
            .element(ScriptedElement::new("list_item"))
            .element(ScriptedElement::new("list_item"))
            .element(ScriptedElement::new("list_item").hidden())
            .build();
        let engine = InteractionEngine::new(session);

        // Hidden elements still exist in the tree.
        assert_eq!(
            engine.element_count(&Locator::id("list_item")).await.unwrap(),
            3
        );
        assert_eq!(engine.element_count(&Locator::id("other")).await.unwrap(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn navigate_back_presses_once_per_step() {
        let session = android_session().build();
        let probe = session.clone();
        let engine = InteractionEngine::new(session);

        engine.navigate_back(2).await.unwrap();
        assert_eq!(probe.back_presses(), 2);
        assert_eq!(probe.hide_keyboard_calls(), 0);

        engine.hide_keyboard().await.unwrap();
        assert_eq!(probe.hide_keyboard_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn wait_visible_distinguishes_absent_from_hidden() {
        let session = android_session()
            .element(ScriptedElement::new("overlay").hidden())
            .build();
        let engine = InteractionEngine::new(session);
        let timeout = Some(Duration::from_secs(2));

        let absent = engine.wait_visible(&Locator::id("missing"), timeout).await;
        assert!(matches!(absent, Ok(None)));

        let hidden = engine.wait_visible(&Locator::id("overlay"), timeout).await;
        assert!(matches!(hidden, Err(ActionError::VisibilityTimeout(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn wait_visible_returns_element_that_appears_in_time() {
        let session = android_session()
            .element(ScriptedElement::new("toast").appears_after(Duration::from_secs(5)))
            .build();
        let engine = InteractionEngine::new(session);

        let result = engine
            .wait_visible(&Locator::id("toast"), Some(Duration::from_secs(10)))
            .await
            .unwrap();
        assert!(result.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn wait_present_is_boolean_on_timeout() {
        let session = android_session()
            .element(ScriptedElement::new("badge"))
            .build();
        let engine = InteractionEngine::new(session);
        let timeout = Some(Duration::from_secs(1));

        assert!(engine.wait_present(&Locator::id("badge"), timeout).await.unwrap());
        assert!(!engine.wait_present(&Locator::id("missing"), timeout).await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn wait_clickable_probes_without_raising() {
        let session = android_session()
            .element(ScriptedElement::new("ok_button"))
            .element(ScriptedElement::new("dim_button").disabled())
            .build();
        let engine = InteractionEngine::new(session);

        assert!(engine.wait_clickable(&Locator::id("ok_button")).await);
        assert!(!engine.wait_clickable(&Locator::id("dim_button")).await);
    }

    #[tokio::test(start_paused = true)]
    async fn wait_disappear_succeeds_immediately_when_absent() {
        let session = android_session().build();
        let engine = InteractionEngine::new(session);
        let start = Instant::now();

        engine
            .wait_disappear(&Locator::id("missing"), Some(Duration::from_secs(30)))
            .await
            .unwrap();
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn wait_disappear_waits_out_a_dismissing_element() {
        let session = android_session()
            .element(ScriptedElement::new("spinner").disappears_after(Duration::from_secs(3)))
            .build();
        let engine = InteractionEngine::new(session);

        let result = engine
            .wait_disappear(&Locator::id("spinner"), Some(Duration::from_secs(10)))
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn wait_disappear_raises_still_visible_on_timeout() {
        let session = android_session()
            .element(ScriptedElement::new("modal"))
            .build();
        let engine = InteractionEngine::new(session);

        let result = engine
            .wait_disappear(&Locator::id("modal"), Some(Duration::from_secs(2)))
            .await;
        assert!(matches!(result, Err(ActionError::StillVisible(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn wait_many_visible_requires_min_count_simultaneously() {
        let session = android_session()
            .element(ScriptedElement::new("row"))
            .element(ScriptedElement::new("row"))
            .element(ScriptedElement::new("row").hidden())
            .build();
        let engine = InteractionEngine::new(session);
        let row = Locator::id("row");
        let timeout = Some(Duration::from_secs(1));

        let visible = engine.wait_many_visible(&row, timeout, 2).await.unwrap();
        assert_eq!(visible.len(), 2);

        let result = engine.wait_many_visible(&row, timeout, 3).await;
        assert!(matches!(
            result,
            Err(ActionError::InsufficientVisibleElements(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn composite_waits_bracket_implicit_wait() {
        let session = android_session()
            .element(ScriptedElement::new("badge"))
            .build();
        let probe = session.clone();
        let engine = InteractionEngine::new(session);

        engine
            .wait_visible(&Locator::id("badge"), Some(Duration::from_secs(1)))
            .await
            .unwrap();

        let calls = probe.implicit_wait_calls();
        assert_eq!(calls, vec![Duration::ZERO, Duration::from_secs(25)]);
    }

    #[tokio::test(start_paused = true)]
    async fn implicit_wait_restored_even_on_wait_failure() {
        let session = android_session().build();
        let probe = session.clone();
        let engine = InteractionEngine::new(session);

        let result = engine
            .wait_disappear(&Locator::id("missing"), Some(Duration::from_secs(1)))
            .await;
        assert!(result.is_ok());

        let _ = engine
            .wait_many_visible(&Locator::id("missing"), Some(Duration::from_secs(1)), 1)
            .await;

        let calls = probe.implicit_wait_calls();
        assert_eq!(
            calls,
            vec![
                Duration::ZERO,
                Duration::from_secs(25),
                Duration::ZERO,
                Duration::from_secs(25),
            ]
        );
    }
}
