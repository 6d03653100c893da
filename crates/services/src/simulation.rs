//! Simulated latency and failure injection for the in-memory services.
//!
//! Failures come from two sources: a random failure rate (used by the demo
//! to make the app feel networked) and per-operation forced failures queued
//! with [`FaultInjector::fail_next`] (used by tests to drive rollback paths
//! deterministically).

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use rand::Rng;

use crate::error::ServiceError;

/// Latency applied to each call when none is configured.
pub const DEFAULT_LATENCY: Duration = Duration::from_millis(300);

/// Every service call that can be delayed or failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    FetchReviews,
    SubmitReview,
    DeleteReview,
    FetchEvents,
    SetAttendance,
    FetchPhotos,
    UploadPhoto,
    DeletePhoto,
    SetLike,
    FetchComments,
    AddComment,
    FetchParks,
    AddCalendarEvent,
    RemoveCalendarEvent,
    SaveImage,
    LoadSettings,
    SaveSettings,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::FetchReviews => "fetch_reviews",
            Self::SubmitReview => "submit_review",
            Self::DeleteReview => "delete_review",
            Self::FetchEvents => "fetch_events",
            Self::SetAttendance => "set_attendance",
            Self::FetchPhotos => "fetch_photos",
            Self::UploadPhoto => "upload_photo",
            Self::DeletePhoto => "delete_photo",
            Self::SetLike => "set_like",
            Self::FetchComments => "fetch_comments",
            Self::AddComment => "add_comment",
            Self::FetchParks => "fetch_parks",
            Self::AddCalendarEvent => "add_calendar_event",
            Self::RemoveCalendarEvent => "remove_calendar_event",
            Self::SaveImage => "save_image",
            Self::LoadSettings => "load_settings",
            Self::SaveSettings => "save_settings",
        };
        f.write_str(name)
    }
}

/// Decides whether a call fails.
#[derive(Debug, Default)]
pub struct FaultInjector {
    failure_rate: f64,
    forced: Mutex<HashMap<Operation, u32>>,
}

impl FaultInjector {
    /// `failure_rate` is clamped into `0.0..=1.0`.
    pub fn new(failure_rate: f64) -> Self {
        Self {
            failure_rate: failure_rate.clamp(0.0, 1.0),
            forced: Mutex::new(HashMap::new()),
        }
    }

    /// Force the next `count` calls of `op` to fail.
    pub fn fail_next(&self, op: Operation, count: u32) {
        let mut forced = self.forced.lock().unwrap_or_else(|e| e.into_inner());
        *forced.entry(op).or_insert(0) += count;
    }

    /// Drop all queued forced failures.
    pub fn clear(&self) {
        self.forced
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
    }

    /// Consume one forced failure for `op`, or roll the dice.
    pub fn should_fail(&self, op: Operation) -> bool {
        {
            let mut forced = self.forced.lock().unwrap_or_else(|e| e.into_inner());
            if let Some(remaining) = forced.get_mut(&op) {
                if *remaining > 0 {
                    *remaining -= 1;
                    return true;
                }
            }
        }
        self.failure_rate > 0.0 && rand::rng().random_bool(self.failure_rate)
    }
}

/// Latency plus fault injection, shared by the services of one app.
#[derive(Debug, Clone)]
pub struct Simulation {
    latency: Duration,
    faults: Arc<FaultInjector>,
}

impl Simulation {
    pub fn new(latency: Duration, failure_rate: f64) -> Self {
        Self {
            latency,
            faults: Arc::new(FaultInjector::new(failure_rate)),
        }
    }

    /// No delay and no random failures. Forced failures still apply.
    pub fn instant() -> Self {
        Self::new(Duration::ZERO, 0.0)
    }

    pub fn faults(&self) -> &FaultInjector {
        &self.faults
    }

    /// Wait out the simulated latency, then fail if the injector says so.
    pub async fn round_trip(&self, op: Operation) -> Result<(), ServiceError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        if self.faults.should_fail(op) {
            tracing::debug!(operation = %op, "Injected service failure");
            return Err(ServiceError::Unavailable(op));
        }
        Ok(())
    }
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new(DEFAULT_LATENCY, 0.0)
    }
}
