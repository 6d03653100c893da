//! View-models for the barpark screens.
//!
//! Each view-model owns the in-memory copy of one screen's list behind an
//! `Arc<RwLock<..>>`, derives its filtered/sorted views on demand, and runs
//! user intents through the two-phase optimistic protocol from
//! [`barpark_core::optimistic`]: a synchronous local transition that is
//! visible immediately, then an async service round trip that confirms or
//! reverts it. Locks are never held across a service call.
//!
//! View-models are cheap to clone; clones share state, which is how a
//! second view observes the first one's optimistic writes.

pub mod dashboard;
pub mod event;
pub mod outcome;
pub mod park;
pub mod photo;
pub mod review;
pub mod session;

pub use dashboard::DashboardViewModel;
pub use event::EventListViewModel;
pub use outcome::Outcome;
pub use park::ParkDirectoryViewModel;
pub use photo::PhotoListViewModel;
pub use review::ReviewListViewModel;
pub use session::Session;
