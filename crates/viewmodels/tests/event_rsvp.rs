//! Integration tests for `EventListViewModel`.
//!
//! Cover the optimistic join/leave protocol: preconditions, the value seen
//! while the confirmation is pending, calendar attachment, and rollback
//! when either the calendar or the event service fails.

mod common;

use std::sync::Arc;

use assert_matches::assert_matches;
use barpark_core::event::CalendarRef;
use barpark_core::types::new_id;
use barpark_events::{ChangeKind, ChangePhase};
use barpark_services::{
    EventService, InMemoryCalendar, InMemoryEventService, Operation, ServiceError, Simulation,
};
use barpark_viewmodels::{EventListViewModel, Outcome};
use common::GatedCalendar;

struct Fixture {
    vm: EventListViewModel,
    sim: Simulation,
    calendar: Arc<InMemoryCalendar>,
    service: Arc<InMemoryEventService>,
}

async fn fixture(events: Vec<barpark_core::event::Event>) -> Fixture {
    let sim = Simulation::instant();
    let park = events[0].park_id;
    let service = Arc::new(InMemoryEventService::with_events(
        sim.clone(),
        events.into_iter().map(|e| (e, Vec::new())).collect(),
    ));
    let calendar = Arc::new(InMemoryCalendar::new(sim.clone()));
    let vm = EventListViewModel::open(park, common::session(), service.clone(), calendar.clone()).await;
    Fixture {
        vm,
        sim,
        calendar,
        service,
    }
}

// ---------------------------------------------------------------------------
// Test: preconditions
// ---------------------------------------------------------------------------

#[tokio::test]
async fn join_full_event_changes_nothing() {
    let park = new_id();
    let full = common::event(park, "Saturday Bar Jam", 10, Some(10));
    let id = full.id;
    let f = fixture(vec![full]).await;

    let outcome = f.vm.join(id).await;

    assert_matches!(outcome, Outcome::Skipped);
    let e = f.vm.event(id).await.unwrap();
    assert_eq!(e.attendee_count, 10);
    assert!(!e.is_attending);
    assert!(e.is_full());
    assert!(f.calendar.is_empty().await);
}

#[tokio::test]
async fn join_twice_counts_once() {
    let park = new_id();
    let open = common::event(park, "Open Street Workout", 3, None);
    let id = open.id;
    let f = fixture(vec![open]).await;

    assert!(f.vm.join(id).await.is_committed());
    assert!(f.vm.join(id).await.is_skipped());
    assert_eq!(f.vm.event(id).await.unwrap().attendee_count, 4);
}

#[tokio::test]
async fn leave_when_not_attending_is_noop() {
    let park = new_id();
    let e = common::event(park, "Open Street Workout", 3, None);
    let id = e.id;
    let f = fixture(vec![e]).await;

    assert!(f.vm.leave(id).await.is_skipped());
    assert_eq!(f.vm.event(id).await.unwrap().attendee_count, 3);
}

#[tokio::test]
async fn unknown_event_is_skipped() {
    let park = new_id();
    let f = fixture(vec![common::event(park, "Clinic", 0, None)]).await;
    assert!(f.vm.join(new_id()).await.is_skipped());
    assert!(f.vm.leave(new_id()).await.is_skipped());
}

// ---------------------------------------------------------------------------
// Test: successful join attaches calendar ref and sets last_joined
// ---------------------------------------------------------------------------

#[tokio::test]
async fn join_with_room_attaches_calendar_and_last_joined() {
    let park = new_id();
    let clinic = common::event(park, "Beginner Pull-up Clinic", 8, Some(15));
    let id = clinic.id;
    let f = fixture(vec![clinic]).await;

    assert!(f.vm.join(id).await.is_committed());

    let e = f.vm.event(id).await.unwrap();
    assert_eq!(e.attendee_count, 9);
    assert!(e.is_attending);
    let calendar_ref = e.calendar_ref.clone().expect("calendar ref attached");
    assert!(f.calendar.entry(&calendar_ref).await.is_some());

    let last = f.vm.last_joined().await.expect("last joined set");
    assert_eq!(last.id, id);
    f.vm.clear_last_joined().await;
    assert!(f.vm.last_joined().await.is_none());
}

// ---------------------------------------------------------------------------
// Test: optimistic value is visible before confirmation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn join_is_visible_before_calendar_confirms() {
    let park = new_id();
    let clinic = common::event(park, "Beginner Pull-up Clinic", 8, Some(15));
    let id = clinic.id;
    let session = common::session();
    let mut changes = session.bus.subscribe();

    let sim = Simulation::instant();
    let service = Arc::new(InMemoryEventService::with_events(sim.clone(), vec![(clinic, vec![])]));
    let calendar = Arc::new(GatedCalendar::new(sim));
    let vm = EventListViewModel::open(park, session, service, calendar.clone()).await;
    let observer = vm.clone();

    let task = tokio::spawn({
        let vm = vm.clone();
        async move { vm.join(id).await }
    });
    common::wait_until(|| observer.is_in_flight(id)).await;

    let pending = observer.event(id).await.unwrap();
    assert_eq!(pending.attendee_count, 9);
    assert!(pending.is_attending);
    assert!(pending.calendar_ref.is_none());
    assert!(observer.last_joined().await.is_none());

    // A rapid second tap while in flight does nothing.
    assert!(observer.join(id).await.is_skipped());

    calendar.open();
    assert!(task.await.unwrap().is_committed());
    assert!(!observer.is_in_flight(id).await);
    assert!(observer.event(id).await.unwrap().calendar_ref.is_some());

    let mut phases = Vec::new();
    while let Ok(change) = changes.try_recv() {
        if change.kind == ChangeKind::EventAttendance {
            phases.push(change.phase);
        }
    }
    assert_eq!(phases, vec![ChangePhase::Optimistic, ChangePhase::Confirmed]);
}

#[tokio::test]
async fn dropped_join_still_completes() {
    let park = new_id();
    let clinic = common::event(park, "Beginner Pull-up Clinic", 8, Some(15));
    let id = clinic.id;
    let session = common::session();
    let me = session.user.id;

    let sim = Simulation::instant();
    let service = Arc::new(InMemoryEventService::with_events(sim.clone(), vec![(clinic, vec![])]));
    let calendar = Arc::new(GatedCalendar::new(sim));
    let vm = EventListViewModel::open(park, session, service.clone(), calendar.clone()).await;

    // The screen gives up waiting while the calendar is still blocked.
    let gave_up = tokio::time::timeout(std::time::Duration::from_millis(50), vm.join(id)).await;
    assert!(gave_up.is_err());
    assert!(vm.is_in_flight(id).await);

    calendar.open();
    let watcher = &vm;
    common::wait_until(|| async move { !watcher.is_in_flight(id).await }).await;

    let joined = vm.event(id).await.unwrap();
    assert!(joined.is_attending);
    assert_eq!(joined.attendee_count, 9);
    assert!(joined.calendar_ref.is_some());
    assert_eq!(calendar.inner.len().await, 1);
    let server = service.fetch(park, me).await.unwrap();
    assert!(server[0].is_attending);
    assert_eq!(server[0].attendee_count, 9);

    // The event is no longer locked for later taps.
    assert!(vm.leave(id).await.is_committed());
    assert_eq!(vm.event(id).await.unwrap().attendee_count, 8);
}

// ---------------------------------------------------------------------------
// Test: rollback paths
// ---------------------------------------------------------------------------

#[tokio::test]
async fn calendar_failure_rolls_back_join() {
    let park = new_id();
    let clinic = common::event(park, "Beginner Pull-up Clinic", 8, Some(15));
    let id = clinic.id;
    let f = fixture(vec![clinic]).await;
    f.sim.faults().fail_next(Operation::AddCalendarEvent, 1);

    let outcome = f.vm.join(id).await;

    assert_matches!(outcome, Outcome::Reverted(ServiceError::Unavailable(Operation::AddCalendarEvent)));
    let e = f.vm.event(id).await.unwrap();
    assert_eq!(e.attendee_count, 8);
    assert!(!e.is_attending);
    assert!(f.vm.last_joined().await.is_none());

    let server = f.service.fetch(park, new_id()).await.unwrap();
    assert_eq!(server[0].attendee_count, 8);
}

#[tokio::test]
async fn attendance_failure_rolls_back_join_and_removes_calendar_entry() {
    let park = new_id();
    let clinic = common::event(park, "Beginner Pull-up Clinic", 8, Some(15));
    let id = clinic.id;
    let f = fixture(vec![clinic]).await;
    f.sim.faults().fail_next(Operation::SetAttendance, 1);

    let outcome = f.vm.join(id).await;

    assert_matches!(outcome, Outcome::Reverted(_));
    assert_eq!(f.vm.event(id).await.unwrap().attendee_count, 8);
    assert!(f.calendar.is_empty().await);
}

#[tokio::test]
async fn leave_decrements_and_removes_calendar_entry() {
    let park = new_id();
    let clinic = common::event(park, "Beginner Pull-up Clinic", 8, Some(15));
    let id = clinic.id;
    let f = fixture(vec![clinic]).await;
    f.vm.join(id).await;
    assert_eq!(f.calendar.len().await, 1);

    assert!(f.vm.leave(id).await.is_committed());

    let e = f.vm.event(id).await.unwrap();
    assert_eq!(e.attendee_count, 8);
    assert!(!e.is_attending);
    assert!(e.calendar_ref.is_none());
    assert!(f.calendar.is_empty().await);
    assert!(f.vm.last_joined().await.is_none());
}

#[tokio::test]
async fn calendar_removal_failure_restores_attendance() {
    let park = new_id();
    let clinic = common::event(park, "Beginner Pull-up Clinic", 8, Some(15));
    let id = clinic.id;
    let f = fixture(vec![clinic]).await;
    f.vm.join(id).await;
    let before = f.vm.event(id).await.unwrap();

    f.sim.faults().fail_next(Operation::RemoveCalendarEvent, 1);
    let outcome = f.vm.leave(id).await;

    assert_matches!(outcome, Outcome::Reverted(ServiceError::Unavailable(Operation::RemoveCalendarEvent)));
    let after = f.vm.event(id).await.unwrap();
    assert_eq!(after.attendee_count, before.attendee_count);
    assert!(after.is_attending);
    assert_eq!(after.calendar_ref, before.calendar_ref);
}

#[tokio::test]
async fn attendance_failure_on_leave_readds_calendar_entry() {
    let park = new_id();
    let clinic = common::event(park, "Beginner Pull-up Clinic", 8, Some(15));
    let id = clinic.id;
    let f = fixture(vec![clinic]).await;
    f.vm.join(id).await;
    let old_ref: CalendarRef = f.vm.event(id).await.unwrap().calendar_ref.unwrap();

    f.sim.faults().fail_next(Operation::SetAttendance, 1);
    assert_matches!(f.vm.leave(id).await, Outcome::Reverted(_));

    let after = f.vm.event(id).await.unwrap();
    assert!(after.is_attending);
    assert_eq!(after.attendee_count, 9);
    let new_ref = after.calendar_ref.expect("calendar entry restored");
    assert_ne!(new_ref, old_ref);
    assert!(f.calendar.entry(&new_ref).await.is_some());
    assert_eq!(f.calendar.len().await, 1);
}

#[tokio::test]
async fn leave_floors_attendee_count_at_zero() {
    let park = new_id();
    let me = common::session().user;
    let odd = common::event(park, "Early bird", 0, None);
    let id = odd.id;
    let sim = Simulation::instant();
    let service = Arc::new(InMemoryEventService::with_events(sim.clone(), vec![(odd, vec![me.id])]));
    let calendar = Arc::new(InMemoryCalendar::new(sim));
    let session = barpark_viewmodels::Session::new(me, Arc::default());
    let vm = EventListViewModel::open(park, session, service, calendar).await;

    assert!(vm.event(id).await.unwrap().is_attending);
    assert!(vm.leave(id).await.is_committed());
    assert_eq!(vm.event(id).await.unwrap().attendee_count, 0);
}

// ---------------------------------------------------------------------------
// Test: completion after the list was replaced
// ---------------------------------------------------------------------------

#[tokio::test]
async fn rollback_after_reload_is_harmless() {
    let park = new_id();
    let clinic = common::event(park, "Beginner Pull-up Clinic", 8, Some(15));
    let id = clinic.id;
    let sim = Simulation::instant();
    let service = Arc::new(InMemoryEventService::with_events(sim.clone(), vec![(clinic, vec![])]));
    let calendar = Arc::new(GatedCalendar::new(sim.clone()));
    let vm = EventListViewModel::open(park, common::session(), service, calendar.clone()).await;

    let task = tokio::spawn({
        let vm = vm.clone();
        async move { vm.join(id).await }
    });
    common::wait_until(|| vm.is_in_flight(id)).await;

    // The screen reloads while the RSVP is pending, and the write fails.
    sim.faults().fail_next(Operation::FetchEvents, 1);
    vm.load().await;
    assert!(vm.events().await.is_empty());

    sim.faults().fail_next(Operation::AddCalendarEvent, 1);
    calendar.open();
    assert_matches!(task.await.unwrap(), Outcome::Reverted(_));
    assert!(vm.events().await.is_empty());
    assert!(!vm.is_in_flight(id).await);
}
