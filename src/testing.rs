//! Scripted session support for exercising the engine without a device.
//!
//! [`ScriptedSession`] implements [`AutomationSession`] over a
//! declarative screen description: elements can be hidden, appear after
//! a number of swipes or a delay, flip (or drop) toggle clicks, and the
//! session records every gesture and implicit-wait change for
//! assertions.

use crate::core::{AutomationSession, ElementHandle};
use crate::errors::{ActionError, Result};
use crate::types::{ElementRect, Locator, Platform, ScreenSize};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

/// Declarative description of one element on the scripted screen.
#[derive(Debug, Clone)]
pub struct ScriptedElement {
    /// Matched against the locator's value, regardless of strategy.
    pub name: String,
    pub present: bool,
    pub displayed: bool,
    pub enabled: bool,
    /// Present (and displayed) only once this much time has passed.
    pub appears_after: Option<Duration>,
    /// Removed from the screen once this much time has passed.
    pub disappears_after: Option<Duration>,
    /// Present (and displayed) only once this many swipes were issued.
    pub visible_after_swipes: Option<u32>,
    /// Initial `checked` attribute; a click flips it between "true"
    /// and "false".
    pub checked: Option<String>,
    /// Number of leading clicks the toggle swallows without flipping.
    pub ignores_clicks: u32,
    pub text: String,
    pub rect: ElementRect,
}

impl ScriptedElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            present: true,
            displayed: true,
            enabled: true,
            appears_after: None,
            disappears_after: None,
            visible_after_swipes: None,
            checked: None,
            ignores_clicks: 0,
            text: String::new(),
            rect: ElementRect {
                x: 0,
                y: 0,
                width: 100,
                height: 50,
            },
        }
    }

    pub fn hidden(mut self) -> Self {
        self.displayed = false;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    pub fn appears_after(mut self, delay: Duration) -> Self {
        self.appears_after = Some(delay);
        self
    }

    pub fn disappears_after(mut self, delay: Duration) -> Self {
        self.disappears_after = Some(delay);
        self
    }

    pub fn visible_after_swipes(mut self, swipes: u32) -> Self {
        self.visible_after_swipes = Some(swipes);
        self
    }

    pub fn checked(mut self, on: bool) -> Self {
        self.checked = Some(if on { "true" } else { "false" }.to_string());
        self
    }

    pub fn ignores_clicks(mut self, count: u32) -> Self {
        self.ignores_clicks = count;
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_rect(mut self, rect: ElementRect) -> Self {
        self.rect = rect;
        self
    }
}

/// One recorded swipe gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwipeRecord {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
    pub duration_ms: u64,
}

impl SwipeRecord {
    pub fn span(&self) -> i32 {
        (self.x1 - self.x2).abs() + (self.y1 - self.y2).abs()
    }
}

#[derive(Debug)]
struct ElementEntry {
    spec: ScriptedElement,
    clicks: u32,
    checked: Option<String>,
    entered_text: String,
}

#[derive(Debug)]
struct SessionState {
    platform: Platform,
    viewport: ScreenSize,
    elements: Vec<ElementEntry>,
    swipes: Vec<SwipeRecord>,
    taps: Vec<(i32, i32)>,
    implicit_waits: Vec<Duration>,
    back_presses: u32,
    hide_keyboard_calls: u32,
    /// Number of swipes after which the page source stops changing;
    /// `None` scrolls forever.
    scroll_range: Option<u32>,
    created_at: Instant,
}

impl SessionState {
    fn entry_present(&self, entry: &ElementEntry) -> bool {
        if let Some(delay) = entry.spec.disappears_after {
            if self.created_at.elapsed() >= delay {
                return false;
            }
        }
        if let Some(swipes) = entry.spec.visible_after_swipes {
            return self.swipes.len() as u32 >= swipes;
        }
        if let Some(delay) = entry.spec.appears_after {
            return self.created_at.elapsed() >= delay;
        }
        entry.spec.present
    }

    fn entry_displayed(&self, entry: &ElementEntry) -> bool {
        if entry.spec.visible_after_swipes.is_some() {
            return self.entry_present(entry);
        }
        self.entry_present(entry) && entry.spec.displayed
    }

    fn scroll_position(&self) -> u32 {
        let swipes = self.swipes.len() as u32;
        match self.scroll_range {
            Some(range) => swipes.min(range),
            None => swipes,
        }
    }
}

/// In-memory [`AutomationSession`] whose screen is declared up front.
///
/// Clones share state, so tests keep a clone for assertions while the
/// engine owns the original.
#[derive(Clone)]
pub struct ScriptedSession {
    state: Arc<Mutex<SessionState>>,
}

impl ScriptedSession {
    pub fn builder(platform: Platform) -> ScriptedSessionBuilder {
        ScriptedSessionBuilder {
            platform,
            viewport: ScreenSize {
                width: 1080,
                height: 1920,
            },
            elements: Vec::new(),
            scroll_range: None,
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SessionState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn swipe_count(&self) -> usize {
        self.lock().swipes.len()
    }

    pub fn swipes(&self) -> Vec<SwipeRecord> {
        self.lock().swipes.clone()
    }

    pub fn taps(&self) -> Vec<(i32, i32)> {
        self.lock().taps.clone()
    }

    pub fn implicit_wait_calls(&self) -> Vec<Duration> {
        self.lock().implicit_waits.clone()
    }

    pub fn click_count(&self, name: &str) -> u32 {
        self.lock()
            .elements
            .iter()
            .filter(|entry| entry.spec.name == name)
            .map(|entry| entry.clicks)
            .sum()
    }

    pub fn entered_text(&self, name: &str) -> String {
        self.lock()
            .elements
            .iter()
            .find(|entry| entry.spec.name == name)
            .map(|entry| entry.entered_text.clone())
            .unwrap_or_default()
    }

    pub fn back_presses(&self) -> u32 {
        self.lock().back_presses
    }

    pub fn hide_keyboard_calls(&self) -> u32 {
        self.lock().hide_keyboard_calls
    }
}

pub struct ScriptedSessionBuilder {
    platform: Platform,
    viewport: ScreenSize,
    elements: Vec<ScriptedElement>,
    scroll_range: Option<u32>,
}

impl ScriptedSessionBuilder {
    pub fn viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport = ScreenSize { width, height };
        self
    }

    pub fn element(mut self, element: ScriptedElement) -> Self {
        self.elements.push(element);
        self
    }

    /// Content stops changing after this many swipes, which is how the
    /// ineffective-swipe path is exercised. `0` pins the screen
    /// entirely.
    pub fn scroll_range(mut self, swipes: u32) -> Self {
        self.scroll_range = Some(swipes);
        self
    }

    pub fn build(self) -> ScriptedSession {
        let elements = self
            .elements
            .into_iter()
            .map(|spec| ElementEntry {
                checked: spec.checked.clone(),
                clicks: 0,
                entered_text: String::new(),
                spec,
            })
            .collect();
        ScriptedSession {
            state: Arc::new(Mutex::new(SessionState {
                platform: self.platform,
                viewport: self.viewport,
                elements,
                swipes: Vec::new(),
                taps: Vec::new(),
                implicit_waits: Vec::new(),
                back_presses: 0,
                hide_keyboard_calls: 0,
                scroll_range: self.scroll_range,
                created_at: Instant::now(),
            })),
        }
    }
}

/// Handle to one scripted element; looks its entry up at call time so
/// staleness behaves like the real thing.
#[derive(Debug)]
pub struct ScriptedHandle {
    name: String,
    index: usize,
    state: Arc<Mutex<SessionState>>,
}

impl ScriptedHandle {
    fn with_entry<T>(&self, f: impl FnOnce(&mut SessionState, usize) -> Result<T>) -> Result<T> {
        let mut state = match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let present = state
            .elements
            .get(self.index)
            .map(|entry| state.entry_present(entry))
            .unwrap_or(false);
        if !present {
            return Err(ActionError::StaleElement(self.name.clone()));
        }
        f(&mut state, self.index)
    }
}

#[async_trait]
impl ElementHandle for ScriptedHandle {
    async fn is_displayed(&self) -> Result<bool> {
        self.with_entry(|state, index| {
            let displayed = state.entry_displayed(&state.elements[index]);
            Ok(displayed)
        })
    }

    async fn is_enabled(&self) -> Result<bool> {
        self.with_entry(|state, index| Ok(state.elements[index].spec.enabled))
    }

    async fn click(&self) -> Result<()> {
        self.with_entry(|state, index| {
            let entry = &mut state.elements[index];
            entry.clicks += 1;
            if entry.checked.is_some() && entry.clicks > entry.spec.ignores_clicks {
                let flipped = match entry.checked.as_deref() {
                    Some("true") => "false",
                    _ => "true",
                };
                entry.checked = Some(flipped.to_string());
            }
            Ok(())
        })
    }

    async fn clear(&self) -> Result<()> {
        self.with_entry(|state, index| {
            state.elements[index].entered_text.clear();
            Ok(())
        })
    }

    async fn send_keys(&self, text: &str) -> Result<()> {
        self.with_entry(|state, index| {
            state.elements[index].entered_text.push_str(text);
            Ok(())
        })
    }

    async fn attribute(&self, name: &str) -> Result<Option<String>> {
        self.with_entry(|state, index| {
            let entry = &state.elements[index];
            Ok(match name {
                "checked" => entry.checked.clone(),
                _ => None,
            })
        })
    }

    async fn text(&self) -> Result<String> {
        self.with_entry(|state, index| Ok(state.elements[index].spec.text.clone()))
    }

    async fn rect(&self) -> Result<ElementRect> {
        self.with_entry(|state, index| Ok(state.elements[index].spec.rect))
    }
}

#[async_trait]
impl AutomationSession for ScriptedSession {
    type Element = ScriptedHandle;

    async fn locate(&self, locator: &Locator) -> Result<Self::Element> {
        let state = self.lock();
        for (index, entry) in state.elements.iter().enumerate() {
            if entry.spec.name == locator.value && state.entry_present(entry) {
                return Ok(ScriptedHandle {
                    name: entry.spec.name.clone(),
                    index,
                    state: Arc::clone(&self.state),
                });
            }
        }
        Err(ActionError::NoSuchElement(locator.to_string()))
    }

    async fn locate_all(&self, locator: &Locator) -> Result<Vec<Self::Element>> {
        let state = self.lock();
        Ok(state
            .elements
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.spec.name == locator.value && state.entry_present(entry))
            .map(|(index, entry)| ScriptedHandle {
                name: entry.spec.name.clone(),
                index,
                state: Arc::clone(&self.state),
            })
            .collect())
    }

    async fn swipe(&self, x1: i32, y1: i32, x2: i32, y2: i32, duration: Duration) -> Result<()> {
        self.lock().swipes.push(SwipeRecord {
            x1,
            y1,
            x2,
            y2,
            duration_ms: duration.as_millis() as u64,
        });
        Ok(())
    }

    async fn tap(&self, x: i32, y: i32) -> Result<()> {
        self.lock().taps.push((x, y));
        Ok(())
    }

    async fn viewport_size(&self) -> Result<ScreenSize> {
        Ok(self.lock().viewport)
    }

    async fn page_source(&self) -> Result<String> {
        let state = self.lock();
        Ok(format!("ui-snapshot:{}", state.scroll_position()))
    }

    async fn set_implicit_wait(&self, timeout: Duration) -> Result<()> {
        self.lock().implicit_waits.push(timeout);
        Ok(())
    }

    async fn hide_keyboard(&self) -> Result<()> {
        self.lock().hide_keyboard_calls += 1;
        Ok(())
    }

    async fn back(&self) -> Result<()> {
        self.lock().back_presses += 1;
        Ok(())
    }

    fn platform(&self) -> Platform {
        self.lock().platform
    }
}
