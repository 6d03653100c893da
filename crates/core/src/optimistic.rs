//! Two-phase optimistic updates over an in-memory list.
//!
//! Phase one is a synchronous transition on a single record, located by id,
//! that either refuses (precondition not met) or mutates the record and
//! returns a [`Pending`] carrying the values needed to undo it. Phase two is
//! whatever async confirmation the caller performs; on failure it calls
//! [`Pending::revert`] against the list as it exists *then*, which may no
//! longer contain the record.

use crate::types::RecordId;

/// A record that can be located in a list by id.
pub trait Identified {
    fn id(&self) -> RecordId;
}

/// Undo information for one optimistic mutation of a `T`.
pub trait Rollback<T> {
    /// Restore the pre-mutation field values on `record`.
    fn restore(&self, record: &mut T);
}

/// A phase-one mutation that has been applied and may still be undone.
#[derive(Debug, Clone, PartialEq)]
pub struct Pending<R> {
    pub record_id: RecordId,
    pub rollback: R,
}

impl<R> Pending<R> {
    /// Apply the stored rollback to the record with the same id.
    ///
    /// Returns `false` (and does nothing) when the record is gone, e.g. the
    /// list was reloaded while the confirmation was in flight.
    pub fn revert<T>(&self, list: &mut [T]) -> bool
    where
        T: Identified,
        R: Rollback<T>,
    {
        match find_mut(list, self.record_id) {
            Some(record) => {
                self.rollback.restore(record);
                true
            }
            None => false,
        }
    }
}

/// Locate a record by id.
pub fn find<T: Identified>(list: &[T], id: RecordId) -> Option<&T> {
    list.iter().find(|r| r.id() == id)
}

/// Locate a record by id, mutably.
pub fn find_mut<T: Identified>(list: &mut [T], id: RecordId) -> Option<&mut T> {
    list.iter_mut().find(|r| r.id() == id)
}

/// Run a phase-one transition on the record with `id`.
///
/// `step` returns `None` to refuse the transition, in which case the record
/// must be left untouched. A missing record is also a refusal.
pub fn transition<T, R>(
    list: &mut [T],
    id: RecordId,
    step: impl FnOnce(&mut T) -> Option<R>,
) -> Option<Pending<R>>
where
    T: Identified,
{
    let record = find_mut(list, id)?;
    step(record).map(|rollback| Pending {
        record_id: id,
        rollback,
    })
}

/// Replace the record with the same id as `updated`. Returns `false` when
/// no such record exists.
pub fn replace<T: Identified>(list: &mut [T], updated: T) -> bool {
    match find_mut(list, updated.id()) {
        Some(slot) => {
            *slot = updated;
            true
        }
        None => false,
    }
}

/// Remove the record with `id`, returning it when present.
pub fn remove<T: Identified>(list: &mut Vec<T>, id: RecordId) -> Option<T> {
    let index = list.iter().position(|r| r.id() == id)?;
    Some(list.remove(index))
}
