//! Park events and the attendance (RSVP) transitions.

use serde::{Deserialize, Serialize};

use crate::optimistic::{Identified, Rollback};
use crate::types::{RecordId, Timestamp, User};

/// Maximum number of participants kept in an event's preview row.
pub const PARTICIPANT_PREVIEW_LEN: usize = 5;

/// Opaque identifier returned by the external calendar for an added entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CalendarRef(pub String);

impl std::fmt::Display for CalendarRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: RecordId,
    pub park_id: RecordId,
    pub title: String,
    pub starts_at: Timestamp,
    pub ends_at: Option<Timestamp>,
    pub location: Option<String>,
    pub attendee_count: u32,
    pub capacity: Option<u32>,
    /// Preview of who is going; not the full roster.
    pub participants: Vec<User>,
    /// Whether the current user is attending.
    pub is_attending: bool,
    pub calendar_ref: Option<CalendarRef>,
    pub last_updated: Timestamp,
}

impl Event {
    pub fn is_full(&self) -> bool {
        self.capacity
            .is_some_and(|capacity| self.attendee_count >= capacity)
    }

    /// Seats left, if the event is capped.
    pub fn spots_left(&self) -> Option<u32> {
        self.capacity
            .map(|capacity| capacity.saturating_sub(self.attendee_count))
    }

    pub fn can_join(&self) -> bool {
        !self.is_attending && !self.is_full()
    }
}

impl Identified for Event {
    fn id(&self) -> RecordId {
        self.id
    }
}

/// Attendance fields as they were before an optimistic join or leave.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendanceRollback {
    pub is_attending: bool,
    pub attendee_count: u32,
    pub calendar_ref: Option<CalendarRef>,
}

impl AttendanceRollback {
    fn capture(event: &Event) -> Self {
        Self {
            is_attending: event.is_attending,
            attendee_count: event.attendee_count,
            calendar_ref: event.calendar_ref.clone(),
        }
    }
}

impl Rollback<Event> for AttendanceRollback {
    fn restore(&self, record: &mut Event) {
        record.is_attending = self.is_attending;
        record.attendee_count = self.attendee_count;
        record.calendar_ref = self.calendar_ref.clone();
    }
}

/// Optimistic join. Refused when already attending or full.
pub fn apply_join(event: &mut Event, now: Timestamp) -> Option<AttendanceRollback> {
    if !event.can_join() {
        return None;
    }
    let rollback = AttendanceRollback::capture(event);
    event.is_attending = true;
    event.attendee_count += 1;
    event.last_updated = now;
    Some(rollback)
}

/// Optimistic leave. Refused when not attending.
pub fn apply_leave(event: &mut Event, now: Timestamp) -> Option<AttendanceRollback> {
    if !event.is_attending {
        return None;
    }
    let rollback = AttendanceRollback::capture(event);
    event.is_attending = false;
    event.attendee_count = event.attendee_count.saturating_sub(1);
    event.calendar_ref = None;
    event.last_updated = now;
    Some(rollback)
}
