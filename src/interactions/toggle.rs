use crate::core::{AutomationSession, ElementHandle};
use crate::errors::Result;
use crate::types::{Locator, ToggleState};
use tracing::{debug, warn};

use super::engine::InteractionEngine;
use super::retry::retry_with_backoff;

impl<S: AutomationSession> InteractionEngine<S> {
    /// Read the switch state off the element's `checked` attribute.
    /// Any failure to find or read the element reads as off.
    pub async fn is_toggle_on(&self, locator: &Locator) -> bool {
        self.read_toggle_state(locator).await.is_on()
    }

    /// Drive a switch control to the requested state.
    ///
    /// Idempotent: a switch already in the target state is left
    /// untouched and the call succeeds without a click. Otherwise the
    /// engine clicks, lets the UI settle, and re-reads the state, for
    /// up to the configured attempt count. This operation never raises;
    /// callers check the returned bool.
    pub async fn set_toggle_state(&self, locator: &Locator, should_be_on: bool) -> bool {
        let target = ToggleState::from(should_be_on);
        let current = self.read_toggle_state(locator).await;
        debug!(%locator, ?current, ?target, "toggle state requested");

        if current == target {
            return true;
        }

        let result = retry_with_backoff(
            self.config.lookup.retry_attempts,
            self.config.lookup.retry_backoff(),
            // Any failure counts as a failed attempt.
            |_| true,
            || async move { self.attempt_toggle(locator, target).await },
        )
        .await;

        match result {
            Ok(()) => true,
            Err(err) => {
                warn!(%locator, ?target, %err, "failed to coerce toggle state");
                false
            }
        }
    }

    async fn read_toggle_state(&self, locator: &Locator) -> ToggleState {
        let checked = match self.find_element(locator, None).await {
            Ok(element) => match element.attribute("checked").await {
                Ok(value) => value,
                Err(err) => {
                    warn!(%locator, %err, "could not read checked attribute");
                    None
                }
            },
            Err(_) => None,
        };
        ToggleState::from_checked_attribute(checked.as_deref())
    }

    /// One coercion attempt: click, settle, re-read.
    async fn attempt_toggle(&self, locator: &Locator, target: ToggleState) -> Result<()> {
        self.click(locator, None).await?;
        tokio::time::sleep(self.config.waits.toggle_settle()).await;

        let new_state = self.read_toggle_state(locator).await;
        debug!(%locator, ?new_state, "toggle state after click");
        if new_state == target {
            Ok(())
        } else {
            Err(crate::errors::ActionError::SessionError(format!(
                "Toggle ({locator}) still {new_state:?} after click"
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::interactions::InteractionEngine;
    use crate::testing::{ScriptedElement, ScriptedSession};
    use crate::types::{Locator, Platform};

    fn toggle_session(initially_on: bool) -> ScriptedSession {
        ScriptedSession::builder(Platform::Android)
            .element(ScriptedElement::new("wifi_switch").checked(initially_on))
            .build()
    }

    #[tokio::test(start_paused = true)]
    async fn reads_state_from_checked_attribute() {
        let engine = InteractionEngine::new(toggle_session(true));
        assert!(engine.is_toggle_on(&Locator::id("wifi_switch")).await);

        let engine = InteractionEngine::new(toggle_session(false));
        assert!(!engine.is_toggle_on(&Locator::id("wifi_switch")).await);
    }

    #[tokio::test(start_paused = true)]
    async fn missing_toggle_reads_as_off() {
        let session = ScriptedSession::builder(Platform::Android).build();
        let engine = InteractionEngine::new(session);
        assert!(!engine.is_toggle_on(&Locator::id("wifi_switch")).await);
    }

    #[tokio::test(start_paused = true)]
    async fn matching_state_is_a_no_op() {
        let session = toggle_session(true);
        let probe = session.clone();
        let engine = InteractionEngine::new(session);

        assert!(engine.set_toggle_state(&Locator::id("wifi_switch"), true).await);
        assert_eq!(probe.click_count("wifi_switch"), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn single_click_flips_the_switch() {
        let session = toggle_session(false);
        let probe = session.clone();
        let engine = InteractionEngine::new(session);

        assert!(engine.set_toggle_state(&Locator::id("wifi_switch"), true).await);
        assert_eq!(probe.click_count("wifi_switch"), 1);
        assert!(engine.is_toggle_on(&Locator::id("wifi_switch")).await);
    }

    #[tokio::test(start_paused = true)]
    async fn repeated_coercion_clicks_exactly_once() {
        let session = toggle_session(false);
        let probe = session.clone();
        let engine = InteractionEngine::new(session);
        let switch = Locator::id("wifi_switch");

        assert!(engine.set_toggle_state(&switch, true).await);
        assert!(engine.set_toggle_state(&switch, true).await);
        assert_eq!(probe.click_count("wifi_switch"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn swallowed_click_is_retried() {
        let session = ScriptedSession::builder(Platform::Android)
            .element(
                ScriptedElement::new("wifi_switch")
                    .checked(false)
                    .ignores_clicks(1),
            )
            .build();
        let probe = session.clone();
        let engine = InteractionEngine::new(session);

        assert!(engine.set_toggle_state(&Locator::id("wifi_switch"), true).await);
        assert_eq!(probe.click_count("wifi_switch"), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn stuck_switch_resolves_to_false_after_attempts() {
        let session = ScriptedSession::builder(Platform::Android)
            .element(
                ScriptedElement::new("wifi_switch")
                    .checked(false)
                    .ignores_clicks(10),
            )
            .build();
        let probe = session.clone();
        let engine = InteractionEngine::new(session);

        assert!(!engine.set_toggle_state(&Locator::id("wifi_switch"), true).await);
        assert_eq!(probe.click_count("wifi_switch"), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn coercion_never_errors_on_missing_element() {
        let session = ScriptedSession::builder(Platform::Android).build();
        let probe = session.clone();
        let engine = InteractionEngine::new(session);
        let switch = Locator::id("wifi_switch");

        // A missing switch reads as off, so "off" is already satisfied
        // and "on" resolves to false without raising.
        assert!(engine.set_toggle_state(&switch, false).await);
        assert!(!engine.set_toggle_state(&switch, true).await);
        assert_eq!(probe.click_count("wifi_switch"), 0);
    }
}
