//! Domain records and pure list logic for the barpark client.
//!
//! Everything in this crate is synchronous and free of I/O: record types,
//! write-time clamping, the derived list views (filter, sort, page) and the
//! phase-one transitions of the optimistic update protocol. The async
//! services and the view-models that drive them live in sibling crates.

pub mod dashboard;
pub mod error;
pub mod event;
pub mod notice;
pub mod optimistic;
pub mod park;
pub mod photo;
pub mod review;
pub mod types;
