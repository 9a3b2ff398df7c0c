//! One-shot flash messages stored in the session.
//!
//! A handler sets a message before redirecting; the next page render takes it
//! out of the session so it shows exactly once.

use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use crate::models::session_keys;

/// Flash severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashKind {
    Success,
    Error,
}

/// A message shown once on the next page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub kind: FlashKind,
    pub message: String,
}

impl Flash {
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Success,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Error,
            message: message.into(),
        }
    }

    /// CSS class for the alert box.
    #[must_use]
    pub const fn css_class(&self) -> &'static str {
        match self.kind {
            FlashKind::Success => "alert alert-success",
            FlashKind::Error => "alert alert-error",
        }
    }
}

/// Queue a flash message. Failures are logged, never surfaced.
pub async fn set_flash(session: &Session, flash: Flash) {
    if let Err(e) = session.insert(session_keys::FLASH, flash).await {
        tracing::warn!(error = %e, "Failed to store flash message");
    }
}

/// Take the pending flash message, if any.
pub async fn take_flash(session: &Session) -> Option<Flash> {
    session
        .remove::<Flash>(session_keys::FLASH)
        .await
        .ok()
        .flatten()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_flash_css_class() {
        assert_eq!(Flash::success("Saved").css_class(), "alert alert-success");
        assert_eq!(Flash::error("Nope").css_class(), "alert alert-error");
    }

    #[test]
    fn test_flash_serializes_kind_lowercase() {
        let json = serde_json::to_value(Flash::error("Out of stock")).unwrap();
        assert_eq!(json["kind"], "error");
        assert_eq!(json["message"], "Out of stock");
    }
}
