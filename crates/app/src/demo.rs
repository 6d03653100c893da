//! Scripted walk through every screen against the seeded in-memory
//! services.
//!
//! The demo plays the part of a user: it browses the park directory, pages
//! through and posts a review, RSVPs to an event, uploads and likes a
//! photo, and rearranges the dashboard. Every list change flows over the
//! [`ChangeBus`] into a [`ChangeJournal`].

use std::sync::Arc;

use anyhow::Context;
use barpark_core::dashboard::DashboardModule;
use barpark_core::park::{ParkQuery, ParkSort};
use barpark_core::photo::Visibility;
use barpark_core::review::ReviewSort;
use barpark_core::types::User;
use barpark_events::{ChangeBus, ChangeJournal, ChangePhase};
use barpark_services::seed::MockData;
use barpark_services::{InMemoryCalendar, JsonSettingsStore, LocalPhotoStore, ServiceError};
use barpark_viewmodels::{
    DashboardViewModel, EventListViewModel, Outcome, ParkDirectoryViewModel, PhotoListViewModel,
    ReviewListViewModel, Session,
};
use chrono::Utc;

use crate::config::AppConfig;

/// Bytes standing in for a camera capture.
const SAMPLE_JPEG: &[u8] = &[
    0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F', 0xFF, 0xD9,
];

/// What the walk-through ended up with.
#[derive(Debug, Clone, Default)]
pub struct DemoReport {
    pub parks: usize,
    pub reviews: usize,
    pub average_rating: f64,
    pub joined_event: Option<String>,
    pub photos: usize,
    pub dashboard: Vec<DashboardModule>,
    /// Changes recorded by the journal.
    pub changes: usize,
    /// Of those, changes that were rolled back.
    pub rollbacks: usize,
}

/// Run the walk-through and wait for the journal to drain.
pub async fn run(config: &AppConfig) -> anyhow::Result<DemoReport> {
    tokio::fs::create_dir_all(&config.data_dir)
        .await
        .with_context(|| format!("creating data dir {}", config.data_dir.display()))?;

    let bus = Arc::new(ChangeBus::default());
    let (entries, journal) = ChangeJournal::spawn(bus.subscribe());
    let session = Session::new(User::new(config.user_name.clone()), Arc::clone(&bus));

    let mut report = walk(config, session).await;

    // Closing the bus ends the journal once it has drained.
    drop(bus);
    journal.await.context("change journal task failed")?;

    let entries = entries.read().await;
    report.changes = entries.len();
    report.rollbacks = entries
        .iter()
        .filter(|e| e.phase == ChangePhase::RolledBack)
        .count();
    Ok(report)
}

async fn walk(config: &AppConfig, session: Session) -> DemoReport {
    let data = MockData::generate(Utc::now());
    let sim = config.simulation();
    let home = data.home_park().clone();
    let mut report = DemoReport::default();

    // Park directory
    let park_service = Arc::new(data.park_service(sim.clone()));
    let parks = ParkDirectoryViewModel::open(session.clone(), park_service).await;
    parks
        .set_query(ParkQuery {
            sort: ParkSort::Rating,
            ..ParkQuery::default()
        })
        .await;
    let ranked = parks.results().await;
    report.parks = ranked.len();
    if let Some(top) = ranked.first() {
        tracing::info!(
            park = %top.name,
            rating = top.average_rating,
            equipment = ?top.equipment.iter().map(|e| e.label()).collect::<Vec<_>>(),
            "Top rated park"
        );
    }

    // Reviews
    let review_service = Arc::new(data.review_service(sim.clone()));
    let reviews = ReviewListViewModel::open(home.id, session.clone(), review_service).await;
    let shown = reviews.loaded_reviews().await.len();
    let total = reviews.review_count().await;
    tracing::info!(park = %home.name, shown, total, "Reviews first page");
    while reviews.load_more().await {}
    reviews.set_sort(ReviewSort::RatingHigh).await;
    reviews.set_only_with_comment(true).await;
    let sort = reviews.sort().await;
    let with_comment = reviews.filtered().await.len();
    tracing::info!(sort = sort.label(), with_comment, "Reviews re-sorted");
    let outcome = reviews.submit(5, "Solid bars and plenty of space for dips.").await;
    log_outcome("submit review", &outcome);
    report.reviews = reviews.review_count().await;
    report.average_rating = reviews.average_rating().await;

    // Events
    let calendar = Arc::new(InMemoryCalendar::new(sim.clone()));
    let events = EventListViewModel::open(
        home.id,
        session.clone(),
        Arc::new(data.event_service(sim.clone())),
        calendar,
    )
    .await;
    for event in events.events().await {
        tracing::info!(event = %event.title, spots_left = ?event.spots_left(), "Joining event");
        let mut outcome = events.join(event.id).await;
        if outcome.error().is_some_and(ServiceError::is_transient) {
            outcome = events.join(event.id).await;
        }
        log_outcome(&format!("join '{}'", event.title), &outcome);
        if outcome.is_committed() {
            break;
        }
    }
    report.joined_event = events.last_joined().await.map(|e| e.title);

    // Photos
    let store = Arc::new(LocalPhotoStore::new(config.photos_dir(), sim.clone()));
    let photo_service = Arc::new(data.photo_service(sim.clone()));
    let photos = PhotoListViewModel::open(home.id, session.clone(), photo_service, store).await;
    log_outcome("upload photo", &photos.upload(SAMPLE_JPEG, Visibility::Public).await);
    if let Some(first) = photos.photos().await.into_iter().nth(1) {
        log_outcome("like photo", &photos.toggle_like(first.id).await);
        photos.load_comments(first.id).await;
        log_outcome("comment", &photos.add_comment(first.id, "Clean muscle-up!").await);
    }
    report.photos = photos.photos().await.len();

    // Dashboard
    let settings = Arc::new(JsonSettingsStore::new(config.settings_path()));
    let dashboard = DashboardViewModel::load(session, settings).await;
    if !dashboard.is_enabled(DashboardModule::RecentPhotos).await {
        let outcome = dashboard.toggle(DashboardModule::RecentPhotos).await;
        log_outcome("enable recent photos", &outcome);
    }
    report.dashboard = dashboard.modules().await;
    tracing::info!(
        cards = ?report
            .dashboard
            .iter()
            .map(|m| (m.title(), m.content()))
            .collect::<Vec<_>>(),
        "Dashboard"
    );

    report
}

fn log_outcome(action: &str, outcome: &Outcome) {
    match outcome {
        Outcome::Committed => tracing::info!(action, "Committed"),
        Outcome::Skipped => tracing::info!(action, "Skipped"),
        Outcome::Reverted(e) => {
            tracing::warn!(action, error = %e, retryable = e.is_transient(), "Reverted")
        }
    }
}
