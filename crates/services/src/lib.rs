//! Backing services for the barpark view-models.
//!
//! Each concern is an `async_trait` so a networked client can replace the
//! in-memory stand-ins shipped here:
//!
//! - [`ReviewService`], [`EventService`], [`PhotoService`], [`ParkService`]:
//!   per-park CRUD over a shared canonical store.
//! - [`CalendarClient`]: third-party calendar integration for event RSVPs.
//! - [`PhotoStore`]: durable storage for uploaded image bytes.
//! - [`SettingsStore`]: persisted dashboard module preferences.
//!
//! Every in-memory implementation routes its calls through a
//! [`Simulation`], which adds latency and injects failures.

pub mod calendar;
pub mod error;
pub mod event;
pub mod park;
pub mod photo;
pub mod photo_store;
pub mod review;
pub mod seed;
pub mod settings;
pub mod simulation;

pub use calendar::{CalendarClient, InMemoryCalendar};
pub use error::ServiceError;
pub use event::{EventService, InMemoryEventService};
pub use park::{InMemoryParkService, ParkService};
pub use photo::{InMemoryPhotoService, PhotoService};
pub use photo_store::{LocalPhotoStore, PhotoStore};
pub use review::{InMemoryReviewService, ReviewService};
pub use settings::{InMemorySettingsStore, JsonSettingsStore, SettingsStore};
pub use simulation::{FaultInjector, Operation, Simulation};
