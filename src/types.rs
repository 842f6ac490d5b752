use serde::{Deserialize, Serialize};
use std::fmt;

/// Locator strategies understood by the remote automation session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LocatorStrategy {
    Id,
    AccessibilityId,
    XPath,
    ClassName,
    AndroidUiAutomator,
    IosPredicate,
    IosClassChain,
}

impl LocatorStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            LocatorStrategy::Id => "id",
            LocatorStrategy::AccessibilityId => "accessibility id",
            LocatorStrategy::XPath => "xpath",
            LocatorStrategy::ClassName => "class name",
            LocatorStrategy::AndroidUiAutomator => "-android uiautomator",
            LocatorStrategy::IosPredicate => "-ios predicate string",
            LocatorStrategy::IosClassChain => "-ios class chain",
        }
    }
}

/// A (strategy, value) pair identifying zero or more UI elements.
///
/// A locator carries no uniqueness guarantee; it may resolve to 0, 1, or
/// many elements on the current screen.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Locator {
    pub strategy: LocatorStrategy,
    pub value: String,
}

impl Locator {
    pub fn new(strategy: LocatorStrategy, value: impl Into<String>) -> Self {
        Self {
            strategy,
            value: value.into(),
        }
    }

    pub fn id(value: impl Into<String>) -> Self {
        Self::new(LocatorStrategy::Id, value)
    }

    pub fn accessibility_id(value: impl Into<String>) -> Self {
        Self::new(LocatorStrategy::AccessibilityId, value)
    }

    pub fn xpath(value: impl Into<String>) -> Self {
        Self::new(LocatorStrategy::XPath, value)
    }

    pub fn class_name(value: impl Into<String>) -> Self {
        Self::new(LocatorStrategy::ClassName, value)
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.strategy.as_str(), self.value)
    }
}

/// Mobile platform the session is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Platform {
    Android,
    Ios,
}

impl Platform {
    /// Default locator for the vertical scroll region on this platform.
    pub fn vertical_scroll_container(&self) -> Locator {
        match self {
            Platform::Android => {
                Locator::xpath("//android.widget.ScrollView | //android.widget.NestedScrollView")
            }
            Platform::Ios => {
                Locator::xpath("//XCUIElementTypeScrollView | //XCUIElementTypeTable")
            }
        }
    }

    /// Default locator for the horizontal scroll region on this platform.
    pub fn horizontal_scroll_container(&self) -> Locator {
        match self {
            Platform::Android => Locator::xpath("//android.widget.HorizontalScrollView"),
            Platform::Ios => Locator::xpath("//XCUIElementTypeScrollView"),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::Android => write!(f, "android"),
            Platform::Ios => write!(f, "ios"),
        }
    }
}

/// Viewport dimensions in device pixels.
///
/// Recomputed per call; orientation changes invalidate cached values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenSize {
    pub width: u32,
    pub height: u32,
}

/// On-screen bounds of an element in device pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElementRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl ElementRect {
    pub fn center_x(&self) -> i32 {
        self.x + self.width / 2
    }

    pub fn center_y(&self) -> i32 {
        self.y + self.height / 2
    }
}

/// State of a binary switch control, projected from its `checked`
/// attribute: the exact string `"true"` means on, anything else
/// (including a missing attribute) means off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ToggleState {
    On,
    Off,
}

impl ToggleState {
    pub fn from_checked_attribute(value: Option<&str>) -> Self {
        match value {
            Some("true") => ToggleState::On,
            _ => ToggleState::Off,
        }
    }

    pub fn is_on(&self) -> bool {
        matches!(self, ToggleState::On)
    }
}

impl From<bool> for ToggleState {
    fn from(on: bool) -> Self {
        if on {
            ToggleState::On
        } else {
            ToggleState::Off
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locator_display_includes_strategy_and_value() {
        let locator = Locator::id("submit_button");
        assert_eq!(locator.to_string(), "id=submit_button");

        let locator = Locator::xpath("//android.widget.Switch");
        assert_eq!(locator.to_string(), "xpath=//android.widget.Switch");
    }

    #[test]
    fn toggle_state_only_exact_true_is_on() {
        assert_eq!(
            ToggleState::from_checked_attribute(Some("true")),
            ToggleState::On
        );
        assert_eq!(
            ToggleState::from_checked_attribute(Some("false")),
            ToggleState::Off
        );
        assert_eq!(
            ToggleState::from_checked_attribute(Some("True")),
            ToggleState::Off
        );
        assert_eq!(ToggleState::from_checked_attribute(None), ToggleState::Off);
    }

    #[test]
    fn platform_scroll_containers_differ() {
        let android = Platform::Android.vertical_scroll_container();
        let ios = Platform::Ios.vertical_scroll_container();
        assert!(android.value.contains("android.widget.ScrollView"));
        assert!(ios.value.contains("XCUIElementTypeScrollView"));
        assert_ne!(android, ios);
    }
}
