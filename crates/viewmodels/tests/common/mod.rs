//! Shared fixtures for the view-model integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use barpark_core::event::{CalendarRef, Event};
use barpark_core::types::{new_id, RecordId, User};
use barpark_events::ChangeBus;
use barpark_services::{CalendarClient, InMemoryCalendar, ServiceError, Simulation};
use barpark_viewmodels::Session;
use chrono::{Duration, Utc};
use tokio::sync::Notify;

pub fn session() -> Session {
    Session::new(User::new("Me"), Arc::new(ChangeBus::default()))
}

pub fn event(park_id: RecordId, title: &str, attendees: u32, capacity: Option<u32>) -> Event {
    Event {
        id: new_id(),
        park_id,
        title: title.to_string(),
        starts_at: Utc::now() + Duration::days(1),
        ends_at: None,
        location: Some("Main bar area".into()),
        attendee_count: attendees,
        capacity,
        participants: Vec::new(),
        is_attending: false,
        calendar_ref: None,
        last_updated: Utc::now(),
    }
}

/// Calendar whose `add_event` blocks until [`GatedCalendar::open`] is
/// called, so tests can observe state while an RSVP is in flight.
pub struct GatedCalendar {
    pub inner: InMemoryCalendar,
    gate: Notify,
}

impl GatedCalendar {
    pub fn new(simulation: Simulation) -> Self {
        Self {
            inner: InMemoryCalendar::new(simulation),
            gate: Notify::new(),
        }
    }

    /// Let one pending (or the next) `add_event` through.
    pub fn open(&self) {
        self.gate.notify_one();
    }
}

#[async_trait]
impl CalendarClient for GatedCalendar {
    async fn add_event(&self, event: &Event) -> Result<CalendarRef, ServiceError> {
        self.gate.notified().await;
        self.inner.add_event(event).await
    }

    async fn remove_event(&self, calendar_ref: &CalendarRef) -> Result<(), ServiceError> {
        self.inner.remove_event(calendar_ref).await
    }
}

/// Yield to the scheduler until `check` holds.
pub async fn wait_until<F, Fut>(mut check: F)
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    for _ in 0..1_000 {
        if check().await {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("condition never became true");
}
