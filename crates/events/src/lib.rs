//! Change notifications shared between barpark view-models.
//!
//! - [`ChangeBus`]: in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`ChangeEvent`]: what changed, on which list, and whether the change
//!   is optimistic, confirmed or rolled back.
//! - [`ChangeJournal`]: background task that records every change, used by
//!   a second observer (and by tests) to see optimistic values as they land.

pub mod bus;
pub mod journal;

pub use bus::{ChangeBus, ChangeEvent, ChangeKind, ChangePhase};
pub use journal::ChangeJournal;
