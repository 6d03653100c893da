//! Event service: the canonical attendance roster for park events.
//!
//! The store keeps one [`Event`] per id plus the set of user ids known to
//! attend. `is_attending` on the returned records is projected for the
//! requesting viewer; the stored copy never carries per-user state.

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use barpark_core::event::{Event, PARTICIPANT_PREVIEW_LEN};
use barpark_core::types::{RecordId, User};
use chrono::Utc;
use tokio::sync::RwLock;

use crate::error::ServiceError;
use crate::simulation::{Operation, Simulation};

#[async_trait]
pub trait EventService: Send + Sync {
    /// Events at a park as seen by `viewer`, soonest first.
    async fn fetch(&self, park_id: RecordId, viewer: RecordId) -> Result<Vec<Event>, ServiceError>;

    /// Record that `user` joins (`attending = true`) or leaves an event and
    /// return the updated event as seen by `user`. Repeating the current
    /// state is accepted and changes nothing.
    async fn set_attendance(
        &self,
        event_id: RecordId,
        user: &User,
        attending: bool,
    ) -> Result<Event, ServiceError>;
}

#[derive(Debug, Clone)]
struct StoredEvent {
    event: Event,
    attendees: BTreeSet<RecordId>,
}

impl StoredEvent {
    fn view_for(&self, viewer: RecordId) -> Event {
        let mut event = self.event.clone();
        event.is_attending = self.attendees.contains(&viewer);
        event.calendar_ref = None;
        event
    }
}

#[derive(Debug)]
pub struct InMemoryEventService {
    events: RwLock<HashMap<RecordId, StoredEvent>>,
    simulation: Simulation,
}

impl InMemoryEventService {
    pub fn new(simulation: Simulation) -> Self {
        Self::with_events(simulation, Vec::new())
    }

    /// Seed the store. Each event is paired with the ids of known
    /// attendees; `attendee_count` may include attendees not listed.
    pub fn with_events(simulation: Simulation, seed: Vec<(Event, Vec<RecordId>)>) -> Self {
        let events = seed
            .into_iter()
            .map(|(mut event, attendees)| {
                event.is_attending = false;
                event.calendar_ref = None;
                let stored = StoredEvent {
                    event,
                    attendees: attendees.into_iter().collect(),
                };
                (stored.event.id, stored)
            })
            .collect();
        Self {
            events: RwLock::new(events),
            simulation,
        }
    }
}

#[async_trait]
impl EventService for InMemoryEventService {
    async fn fetch(&self, park_id: RecordId, viewer: RecordId) -> Result<Vec<Event>, ServiceError> {
        self.simulation.round_trip(Operation::FetchEvents).await?;
        let events = self.events.read().await;
        let mut out: Vec<Event> = events
            .values()
            .filter(|s| s.event.park_id == park_id)
            .map(|s| s.view_for(viewer))
            .collect();
        out.sort_by_key(|e| e.starts_at);
        Ok(out)
    }

    async fn set_attendance(
        &self,
        event_id: RecordId,
        user: &User,
        attending: bool,
    ) -> Result<Event, ServiceError> {
        self.simulation.round_trip(Operation::SetAttendance).await?;

        let mut events = self.events.write().await;
        let stored = events.get_mut(&event_id).ok_or(ServiceError::NotFound {
            entity: "event",
            id: event_id,
        })?;

        let already = stored.attendees.contains(&user.id);
        match (attending, already) {
            (true, false) => {
                if stored.event.is_full() {
                    return Err(ServiceError::Conflict(format!(
                        "Event '{}' is full",
                        stored.event.title
                    )));
                }
                stored.attendees.insert(user.id);
                stored.event.attendee_count += 1;
                if stored.event.participants.len() < PARTICIPANT_PREVIEW_LEN {
                    stored.event.participants.push(user.clone());
                }
                stored.event.last_updated = Utc::now();
            }
            (false, true) => {
                stored.attendees.remove(&user.id);
                stored.event.attendee_count = stored.event.attendee_count.saturating_sub(1);
                stored.event.participants.retain(|p| p.id != user.id);
                stored.event.last_updated = Utc::now();
            }
            _ => {}
        }

        tracing::debug!(
            event_id = %event_id,
            attending,
            attendee_count = stored.event.attendee_count,
            "Attendance recorded"
        );
        Ok(stored.view_for(user.id))
    }
}
