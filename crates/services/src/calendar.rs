//! External calendar integration used when RSVPing to events.
//!
//! Adding and removing entries can fail independently of the attendance
//! write itself; the event view-model decides how to reconcile.

use std::collections::HashMap;

use async_trait::async_trait;
use barpark_core::event::{CalendarRef, Event};
use barpark_core::types::{new_id, Timestamp};
use tokio::sync::RwLock;

use crate::error::ServiceError;
use crate::simulation::{Operation, Simulation};

#[async_trait]
pub trait CalendarClient: Send + Sync {
    /// Add an entry for `event` and return its calendar identifier.
    async fn add_event(&self, event: &Event) -> Result<CalendarRef, ServiceError>;

    /// Remove a previously added entry. Removing an unknown entry succeeds.
    async fn remove_event(&self, calendar_ref: &CalendarRef) -> Result<(), ServiceError>;
}

/// A calendar entry as stored by [`InMemoryCalendar`].
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarEntry {
    pub title: String,
    pub starts_at: Timestamp,
    pub ends_at: Option<Timestamp>,
    pub location: Option<String>,
}

#[derive(Debug)]
pub struct InMemoryCalendar {
    entries: RwLock<HashMap<CalendarRef, CalendarEntry>>,
    simulation: Simulation,
}

impl InMemoryCalendar {
    pub fn new(simulation: Simulation) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            simulation,
        }
    }

    pub async fn entry(&self, calendar_ref: &CalendarRef) -> Option<CalendarEntry> {
        self.entries.read().await.get(calendar_ref).cloned()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl CalendarClient for InMemoryCalendar {
    async fn add_event(&self, event: &Event) -> Result<CalendarRef, ServiceError> {
        self.simulation.round_trip(Operation::AddCalendarEvent).await?;
        let calendar_ref = CalendarRef(format!("cal-{}", new_id().simple()));
        let entry = CalendarEntry {
            title: event.title.clone(),
            starts_at: event.starts_at,
            ends_at: event.ends_at,
            location: event.location.clone(),
        };
        self.entries
            .write()
            .await
            .insert(calendar_ref.clone(), entry);
        tracing::debug!(calendar_ref = %calendar_ref, event_id = %event.id, "Calendar entry added");
        Ok(calendar_ref)
    }

    async fn remove_event(&self, calendar_ref: &CalendarRef) -> Result<(), ServiceError> {
        self.simulation
            .round_trip(Operation::RemoveCalendarEvent)
            .await?;
        self.entries.write().await.remove(calendar_ref);
        Ok(())
    }
}
