//! Load state and short-lived error banners exposed to the view.

use chrono::Duration;
use serde::Serialize;

use crate::types::Timestamp;

/// How long an error banner stays visible unless dismissed.
pub const BANNER_TTL_SECS: i64 = 4;

/// Lifecycle of a list screen's initial fetch.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "state", content = "message", rename_all = "snake_case")]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
    Ready,
    /// The fetch failed; the view offers a retry.
    Failed(String),
}

impl LoadState {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }
}

/// A dismissable message describing a failed write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBanner {
    pub message: String,
    pub shown_at: Timestamp,
}

impl ErrorBanner {
    pub fn new(message: impl Into<String>, now: Timestamp) -> Self {
        Self {
            message: message.into(),
            shown_at: now,
        }
    }

    pub fn is_expired(&self, now: Timestamp) -> bool {
        now - self.shown_at >= Duration::seconds(BANNER_TTL_SECS)
    }
}

/// The banner still worth showing at `now`, if any.
pub fn visible_banner(banner: &Option<ErrorBanner>, now: Timestamp) -> Option<&ErrorBanner> {
    banner.as_ref().filter(|b| !b.is_expired(now))
}
