//! Event list for one park with optimistic RSVP.
//!
//! Join and leave are two-phase. Phase one flips attendance in the
//! canonical list before any await, so every clone of the view-model (and
//! every bus subscriber) sees it at once. Phase two talks to the calendar
//! and then to the event service; any failure in either step restores the
//! pre-intent attendance. Calendar failures roll back both join and leave.

use std::collections::HashSet;
use std::sync::Arc;

use barpark_core::event::{self, AttendanceRollback, CalendarRef, Event};
use barpark_core::notice::LoadState;
use barpark_core::optimistic::{self, Pending};
use barpark_core::types::RecordId;
use barpark_events::{ChangeEvent, ChangeKind, ChangePhase};
use barpark_services::{CalendarClient, EventService, ServiceError};
use chrono::Utc;
use tokio::sync::RwLock;

use crate::outcome::{complete_detached, Outcome};
use crate::session::Session;

#[derive(Debug, Default)]
struct EventState {
    load_state: LoadState,
    events: Vec<Event>,
    last_joined: Option<Event>,
    in_flight: HashSet<RecordId>,
}

/// What happened to the calendar entry when a leave failed after the entry
/// had already been removed.
#[derive(Debug)]
enum CalendarAfterFailure {
    Untouched,
    Readded(CalendarRef),
    Lost,
}

#[derive(Clone)]
pub struct EventListViewModel {
    park_id: RecordId,
    session: Session,
    service: Arc<dyn EventService>,
    calendar: Arc<dyn CalendarClient>,
    state: Arc<RwLock<EventState>>,
}

impl EventListViewModel {
    pub fn new(
        park_id: RecordId,
        session: Session,
        service: Arc<dyn EventService>,
        calendar: Arc<dyn CalendarClient>,
    ) -> Self {
        Self {
            park_id,
            session,
            service,
            calendar,
            state: Arc::default(),
        }
    }

    pub async fn open(
        park_id: RecordId,
        session: Session,
        service: Arc<dyn EventService>,
        calendar: Arc<dyn CalendarClient>,
    ) -> Self {
        let vm = Self::new(park_id, session, service, calendar);
        vm.load().await;
        vm
    }

    // -----------------------------------------------------------------------
    // Loading
    // -----------------------------------------------------------------------

    /// Fetch the park's events. Calendar references already attached
    /// locally survive a reload.
    pub async fn load(&self) {
        self.state.write().await.load_state = LoadState::Loading;

        let result = self.service.fetch(self.park_id, self.session.user.id).await;

        let mut state = self.state.write().await;
        match result {
            Ok(mut events) => {
                for fresh in events.iter_mut() {
                    if let Some(known) = optimistic::find(&state.events, fresh.id) {
                        if fresh.is_attending {
                            fresh.calendar_ref = known.calendar_ref.clone();
                        }
                    }
                }
                tracing::info!(park_id = %self.park_id, count = events.len(), "Events loaded");
                state.events = events;
                state.load_state = LoadState::Ready;
                self.session
                    .publish(ChangeEvent::new(ChangeKind::EventsLoaded).with_park(self.park_id));
            }
            Err(e) => {
                tracing::error!(park_id = %self.park_id, error = %e, "Failed to load events");
                state.events.clear();
                state.load_state = LoadState::Failed(e.to_string());
            }
        }
    }

    pub async fn retry(&self) {
        self.load().await;
    }

    // -----------------------------------------------------------------------
    // Join
    // -----------------------------------------------------------------------

    /// RSVP to an event.
    ///
    /// Skipped when the user already attends, the event is full, the event
    /// is unknown, or another RSVP for it is still in flight. Once the
    /// optimistic change is applied, the round trip runs to completion even
    /// if the returned future is dropped.
    pub async fn join(&self, event_id: RecordId) -> Outcome {
        let Some((pending, snapshot)) = self
            .begin(event_id, |e| event::apply_join(e, Utc::now()))
            .await
        else {
            return Outcome::Skipped;
        };

        let vm = self.clone();
        complete_detached(async move { vm.finish_join(pending, snapshot).await }).await
    }

    async fn finish_join(&self, pending: Pending<AttendanceRollback>, snapshot: Event) -> Outcome {
        let event_id = snapshot.id;
        let result = self.confirm_join(&snapshot).await;

        let mut state = self.state.write().await;
        state.in_flight.remove(&event_id);
        match result {
            Ok((mut confirmed, calendar_ref)) => {
                confirmed.calendar_ref = Some(calendar_ref);
                if optimistic::replace(&mut state.events, confirmed.clone()) {
                    state.last_joined = Some(confirmed.clone());
                }
                tracing::info!(
                    event_id = %event_id,
                    attendee_count = confirmed.attendee_count,
                    "Joined event"
                );
                self.announce(&confirmed, ChangePhase::Confirmed);
                Outcome::Committed
            }
            Err(e) => {
                self.roll_back(&mut state, &pending, &e);
                Outcome::Reverted(e)
            }
        }
    }

    /// Calendar first, then the attendance write. If the write fails the
    /// fresh calendar entry is removed again.
    async fn confirm_join(&self, snapshot: &Event) -> Result<(Event, CalendarRef), ServiceError> {
        let calendar_ref = self.calendar.add_event(snapshot).await?;

        match self
            .service
            .set_attendance(snapshot.id, &self.session.user, true)
            .await
        {
            Ok(confirmed) => Ok((confirmed, calendar_ref)),
            Err(e) => {
                if let Err(cleanup) = self.calendar.remove_event(&calendar_ref).await {
                    tracing::warn!(
                        calendar_ref = %calendar_ref,
                        error = %cleanup,
                        "Failed to remove calendar entry after join failed"
                    );
                }
                Err(e)
            }
        }
    }

    // -----------------------------------------------------------------------
    // Leave
    // -----------------------------------------------------------------------

    /// Withdraw an RSVP. Skipped when not attending or already in flight.
    pub async fn leave(&self, event_id: RecordId) -> Outcome {
        let Some((pending, snapshot)) = self
            .begin(event_id, |e| event::apply_leave(e, Utc::now()))
            .await
        else {
            return Outcome::Skipped;
        };

        let vm = self.clone();
        complete_detached(async move { vm.finish_leave(pending, snapshot).await }).await
    }

    async fn finish_leave(&self, pending: Pending<AttendanceRollback>, snapshot: Event) -> Outcome {
        let event_id = snapshot.id;
        let previous_ref = pending.rollback.calendar_ref.clone();
        let result = self.confirm_leave(&snapshot, previous_ref).await;

        let mut state = self.state.write().await;
        state.in_flight.remove(&event_id);
        match result {
            Ok(confirmed) => {
                optimistic::replace(&mut state.events, confirmed.clone());
                if state.last_joined.as_ref().is_some_and(|e| e.id == event_id) {
                    state.last_joined = None;
                }
                tracing::info!(
                    event_id = %event_id,
                    attendee_count = confirmed.attendee_count,
                    "Left event"
                );
                self.announce(&confirmed, ChangePhase::Confirmed);
                Outcome::Committed
            }
            Err((e, calendar)) => {
                self.roll_back(&mut state, &pending, &e);
                if let Some(record) = optimistic::find_mut(&mut state.events, event_id) {
                    match calendar {
                        CalendarAfterFailure::Untouched => {}
                        CalendarAfterFailure::Readded(calendar_ref) => {
                            record.calendar_ref = Some(calendar_ref)
                        }
                        CalendarAfterFailure::Lost => record.calendar_ref = None,
                    }
                }
                Outcome::Reverted(e)
            }
        }
    }

    /// Calendar removal first, then the attendance write. If the write
    /// fails the calendar entry is added back.
    async fn confirm_leave(
        &self,
        snapshot: &Event,
        previous_ref: Option<CalendarRef>,
    ) -> Result<Event, (ServiceError, CalendarAfterFailure)> {
        if let Some(calendar_ref) = &previous_ref {
            self.calendar
                .remove_event(calendar_ref)
                .await
                .map_err(|e| (e, CalendarAfterFailure::Untouched))?;
        }

        match self
            .service
            .set_attendance(snapshot.id, &self.session.user, false)
            .await
        {
            Ok(confirmed) => Ok(confirmed),
            Err(e) if previous_ref.is_none() => Err((e, CalendarAfterFailure::Untouched)),
            Err(e) => match self.calendar.add_event(snapshot).await {
                Ok(readded) => Err((e, CalendarAfterFailure::Readded(readded))),
                Err(cleanup) => {
                    tracing::warn!(
                        event_id = %snapshot.id,
                        error = %cleanup,
                        "Failed to restore calendar entry after leave failed"
                    );
                    Err((e, CalendarAfterFailure::Lost))
                }
            },
        }
    }

    // -----------------------------------------------------------------------
    // Shared phase-one / rollback plumbing
    // -----------------------------------------------------------------------

    /// Apply a phase-one transition, mark the record in flight and announce
    /// the optimistic value. Returns the rollback and a snapshot of the
    /// optimistic record.
    async fn begin(
        &self,
        event_id: RecordId,
        step: impl FnOnce(&mut Event) -> Option<AttendanceRollback>,
    ) -> Option<(Pending<AttendanceRollback>, Event)> {
        let mut state = self.state.write().await;
        if state.in_flight.contains(&event_id) {
            tracing::debug!(event_id = %event_id, "RSVP already in flight");
            return None;
        }
        let pending = optimistic::transition(&mut state.events, event_id, step)?;
        let snapshot = optimistic::find(&state.events, event_id)?.clone();
        state.in_flight.insert(event_id);

        self.announce(&snapshot, ChangePhase::Optimistic);
        Some((pending, snapshot))
    }

    fn roll_back(
        &self,
        state: &mut EventState,
        pending: &Pending<AttendanceRollback>,
        error: &ServiceError,
    ) {
        let event_id = pending.record_id;
        if !pending.revert(&mut state.events) {
            tracing::debug!(event_id = %event_id, "Event gone before rollback, nothing to revert");
            return;
        }
        tracing::warn!(event_id = %event_id, error = %error, "RSVP failed, attendance rolled back");
        if let Some(record) = optimistic::find(&state.events, event_id) {
            self.announce(record, ChangePhase::RolledBack);
        }
    }

    fn announce(&self, record: &Event, phase: ChangePhase) {
        self.session.publish(
            ChangeEvent::new(ChangeKind::EventAttendance)
                .with_phase(phase)
                .with_park(self.park_id)
                .with_record(record.id)
                .with_payload(serde_json::json!({
                    "is_attending": record.is_attending,
                    "attendee_count": record.attendee_count,
                })),
        );
    }

    // -----------------------------------------------------------------------
    // Read access
    // -----------------------------------------------------------------------

    pub async fn events(&self) -> Vec<Event> {
        self.state.read().await.events.clone()
    }

    pub async fn event(&self, event_id: RecordId) -> Option<Event> {
        optimistic::find(&self.state.read().await.events, event_id).cloned()
    }

    /// The most recent successful join, for a transient confirmation.
    pub async fn last_joined(&self) -> Option<Event> {
        self.state.read().await.last_joined.clone()
    }

    pub async fn clear_last_joined(&self) {
        self.state.write().await.last_joined = None;
    }

    /// Whether an RSVP for this event is pending; the view disables its
    /// button meanwhile.
    pub async fn is_in_flight(&self, event_id: RecordId) -> bool {
        self.state.read().await.in_flight.contains(&event_id)
    }

    pub async fn load_state(&self) -> LoadState {
        self.state.read().await.load_state.clone()
    }
}
