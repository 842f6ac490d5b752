use thiserror::Error;

#[derive(Error, Debug)]
pub enum ActionError {
    /// The locator resolved to nothing on an immediate lookup. Retry
    /// loops consume this; it only escapes on single-shot paths.
    #[error("No such element: {0}")]
    NoSuchElement(String),

    /// The element reference was invalidated by a UI re-render. Always
    /// recovered by re-resolving; retry loops consume this.
    #[error("Stale element reference: {0}")]
    StaleElement(String),

    #[error("Element not found: {0}")]
    ElementNotFound(String),

    #[error("Element not clickable: {0}")]
    ElementNotClickable(String),

    #[error("Visibility timeout: {0}")]
    VisibilityTimeout(String),

    #[error("Element still visible: {0}")]
    StillVisible(String),

    #[error("Insufficient visible elements: {0}")]
    InsufficientVisibleElements(String),

    #[error("Session error: {0}")]
    SessionError(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Anyhow error: {0}")]
    AnyhowError(String),
}

pub type Result<T> = std::result::Result<T, ActionError>;

// Convert anyhow::Error to ActionError
impl From<anyhow::Error> for ActionError {
    fn from(err: anyhow::Error) -> Self {
        ActionError::AnyhowError(err.to_string())
    }
}

impl ActionError {
    /// Errors that a retry loop should absorb and try past: the element
    /// briefly missing or its reference gone stale mid-check.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ActionError::NoSuchElement(_) | ActionError::StaleElement(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_classification() {
        assert!(ActionError::NoSuchElement("id=x".into()).is_transient());
        assert!(ActionError::StaleElement("id=x".into()).is_transient());
        assert!(!ActionError::ElementNotFound("id=x".into()).is_transient());
        assert!(!ActionError::SessionError("gone".into()).is_transient());
    }
}
