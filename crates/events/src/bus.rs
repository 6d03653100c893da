//! In-process change bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`ChangeBus`] is the publish/subscribe hub for [`ChangeEvent`]s. It is
//! designed to be shared via `Arc<ChangeBus>` between every view-model of
//! the app so one screen can observe another's optimistic writes.

use barpark_core::types::{RecordId, Timestamp};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

// ---------------------------------------------------------------------------
// ChangeEvent
// ---------------------------------------------------------------------------

/// Which list changed and how.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    ReviewsLoaded,
    ReviewsReplaced,
    EventsLoaded,
    EventAttendance,
    PhotosLoaded,
    PhotoInserted,
    PhotoRemoved,
    PhotoLiked,
    CommentAdded,
    CommentRemoved,
    ParksLoaded,
    DashboardChanged,
}

/// Where a change stands in the optimistic update protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangePhase {
    /// Applied locally, confirmation pending.
    Optimistic,
    /// Confirmed by the backing service (or needed no confirmation).
    Confirmed,
    /// Confirmation failed and the local change was undone.
    RolledBack,
}

/// A change to one of the view-model lists.
///
/// Constructed via [`ChangeEvent::new`] and enriched with the builder
/// methods [`with_park`](ChangeEvent::with_park),
/// [`with_record`](ChangeEvent::with_record) and
/// [`with_payload`](ChangeEvent::with_payload).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub kind: ChangeKind,
    pub phase: ChangePhase,

    /// The park whose list changed, if the list is park-scoped.
    pub park_id: Option<RecordId>,

    /// The record that changed, for single-record changes.
    pub record_id: Option<RecordId>,

    /// Free-form JSON carrying the new field values.
    pub payload: serde_json::Value,

    pub timestamp: Timestamp,
}

impl ChangeEvent {
    /// A confirmed change with no scope or payload.
    pub fn new(kind: ChangeKind) -> Self {
        Self {
            kind,
            phase: ChangePhase::Confirmed,
            park_id: None,
            record_id: None,
            payload: serde_json::Value::Object(Default::default()),
            timestamp: Utc::now(),
        }
    }

    pub fn optimistic(kind: ChangeKind) -> Self {
        Self::new(kind).with_phase(ChangePhase::Optimistic)
    }

    pub fn rolled_back(kind: ChangeKind) -> Self {
        Self::new(kind).with_phase(ChangePhase::RolledBack)
    }

    pub fn with_phase(mut self, phase: ChangePhase) -> Self {
        self.phase = phase;
        self
    }

    pub fn with_park(mut self, park_id: RecordId) -> Self {
        self.park_id = Some(park_id);
        self
    }

    pub fn with_record(mut self, record_id: RecordId) -> Self {
        self.record_id = Some(record_id);
        self
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }
}

// ---------------------------------------------------------------------------
// ChangeBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 256;

/// In-process fan-out bus.
///
/// ```rust
/// use barpark_events::bus::{ChangeBus, ChangeEvent, ChangeKind};
///
/// let bus = ChangeBus::default();
/// let mut rx = bus.subscribe();
///
/// bus.publish(ChangeEvent::new(ChangeKind::ParksLoaded));
/// assert_eq!(rx.try_recv().unwrap().kind, ChangeKind::ParksLoaded);
/// ```
#[derive(Debug)]
pub struct ChangeBus {
    sender: broadcast::Sender<ChangeEvent>,
}

impl ChangeBus {
    /// When the buffer is full the oldest un-consumed changes are dropped
    /// and slow receivers observe `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish to all current subscribers. Dropped silently when nobody
    /// listens.
    pub fn publish(&self, event: ChangeEvent) {
        // A SendError only means there are zero receivers.
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.sender.subscribe()
    }
}

impl Default for ChangeBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
