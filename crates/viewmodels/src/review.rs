//! Review list for one park: load, submit, filter, sort and paginate.
//!
//! Submissions are not applied optimistically. The service's returned list
//! is authoritative and replaces the local copy; while the call is pending
//! the view shows a busy state instead.

use std::sync::Arc;

use barpark_core::notice::{visible_banner, ErrorBanner, LoadState};
use barpark_core::review::{self, Review, ReviewSort};
use barpark_core::types::RecordId;
use barpark_events::{ChangeEvent, ChangeKind};
use barpark_services::ReviewService;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::outcome::Outcome;
use crate::session::Session;

#[derive(Debug, Default)]
struct ReviewState {
    load_state: LoadState,
    reviews: Vec<Review>,
    my_review: Option<Review>,
    only_with_comment: bool,
    sort: ReviewSort,
    current_page: usize,
    is_submitting: bool,
    banner: Option<ErrorBanner>,
}

impl ReviewState {
    fn sorted(&self) -> Vec<Review> {
        let mut list = review::filter_reviews(&self.reviews, self.only_with_comment);
        review::sort_reviews(&mut list, self.sort);
        list
    }

    fn replace_all(&mut self, reviews: Vec<Review>, user_id: RecordId) {
        self.my_review = reviews.iter().find(|r| r.user_id == user_id).cloned();
        self.reviews = reviews;
    }
}

#[derive(Clone)]
pub struct ReviewListViewModel {
    park_id: RecordId,
    session: Session,
    service: Arc<dyn ReviewService>,
    state: Arc<RwLock<ReviewState>>,
}

impl ReviewListViewModel {
    /// Build an idle view-model. Call [`load`](Self::load) to fetch.
    pub fn new(park_id: RecordId, session: Session, service: Arc<dyn ReviewService>) -> Self {
        Self {
            park_id,
            session,
            service,
            state: Arc::default(),
        }
    }

    /// Build and immediately load, as a screen does when it appears.
    pub async fn open(park_id: RecordId, session: Session, service: Arc<dyn ReviewService>) -> Self {
        let vm = Self::new(park_id, session, service);
        vm.load().await;
        vm
    }

    pub fn park_id(&self) -> RecordId {
        self.park_id
    }

    // -----------------------------------------------------------------------
    // Intents
    // -----------------------------------------------------------------------

    /// Fetch the park's reviews. A failure empties the list and leaves the
    /// view in [`LoadState::Failed`] so it can offer [`retry`](Self::retry).
    pub async fn load(&self) {
        self.state.write().await.load_state = LoadState::Loading;

        let result = self.service.fetch(self.park_id).await;

        let mut state = self.state.write().await;
        match result {
            Ok(reviews) => {
                tracing::info!(park_id = %self.park_id, count = reviews.len(), "Reviews loaded");
                state.replace_all(reviews, self.session.user.id);
                state.current_page = 0;
                state.load_state = LoadState::Ready;
                self.session
                    .publish(ChangeEvent::new(ChangeKind::ReviewsLoaded).with_park(self.park_id));
            }
            Err(e) => {
                tracing::error!(park_id = %self.park_id, error = %e, "Failed to load reviews");
                state.reviews.clear();
                state.my_review = None;
                state.current_page = 0;
                state.load_state = LoadState::Failed(e.to_string());
            }
        }
    }

    pub async fn retry(&self) {
        self.load().await;
    }

    /// Create or replace the current user's review.
    ///
    /// The rating is clamped to 1..=5 and the comment truncated to 140
    /// characters. On failure the previous list stays and an error banner
    /// is shown.
    pub async fn submit(&self, rating: i64, comment: &str) -> Outcome {
        let draft = {
            let mut state = self.state.write().await;
            if state.is_submitting {
                return Outcome::Skipped;
            }
            state.is_submitting = true;
            Review::submission(self.park_id, self.session.user.id, rating, comment, Utc::now())
        };

        let result = self.service.submit(draft).await;

        let mut state = self.state.write().await;
        state.is_submitting = false;
        match result {
            Ok(reviews) => {
                tracing::info!(park_id = %self.park_id, count = reviews.len(), "Review submitted");
                state.replace_all(reviews, self.session.user.id);
                self.session.publish(
                    ChangeEvent::new(ChangeKind::ReviewsReplaced).with_park(self.park_id),
                );
                Outcome::Committed
            }
            Err(e) => {
                tracing::error!(park_id = %self.park_id, error = %e, "Failed to submit review");
                state.banner = Some(ErrorBanner::new("Couldn't post your review", Utc::now()));
                Outcome::Reverted(e)
            }
        }
    }

    /// Show all reviews or only those with a comment. Resets pagination.
    pub async fn set_only_with_comment(&self, only_with_comment: bool) {
        let mut state = self.state.write().await;
        state.only_with_comment = only_with_comment;
        state.current_page = 0;
    }

    /// Change the ordering. Resets pagination.
    pub async fn set_sort(&self, sort: ReviewSort) {
        let mut state = self.state.write().await;
        state.sort = sort;
        state.current_page = 0;
    }

    /// Reveal the next page. Returns whether anything was revealed.
    pub async fn load_more(&self) -> bool {
        let mut state = self.state.write().await;
        let total = state.sorted().len();
        if review::has_more(total, state.current_page) {
            state.current_page += 1;
            true
        } else {
            false
        }
    }

    pub async fn dismiss_error(&self) {
        self.state.write().await.banner = None;
    }

    // -----------------------------------------------------------------------
    // Derived views
    // -----------------------------------------------------------------------

    pub async fn filtered(&self) -> Vec<Review> {
        let state = self.state.read().await;
        review::filter_reviews(&state.reviews, state.only_with_comment)
    }

    pub async fn sorted(&self) -> Vec<Review> {
        self.state.read().await.sorted()
    }

    /// The visible page window of the sorted list.
    pub async fn loaded_reviews(&self) -> Vec<Review> {
        let state = self.state.read().await;
        review::page_window(&state.sorted(), state.current_page).to_vec()
    }

    pub async fn has_more(&self) -> bool {
        let state = self.state.read().await;
        review::has_more(state.sorted().len(), state.current_page)
    }

    /// Mean rating over every review, ignoring the comment filter.
    pub async fn average_rating(&self) -> f64 {
        review::average_rating(&self.state.read().await.reviews)
    }

    pub async fn review_count(&self) -> usize {
        self.state.read().await.reviews.len()
    }

    pub async fn my_review(&self) -> Option<Review> {
        self.state.read().await.my_review.clone()
    }

    pub async fn load_state(&self) -> LoadState {
        self.state.read().await.load_state.clone()
    }

    pub async fn is_submitting(&self) -> bool {
        self.state.read().await.is_submitting
    }

    pub async fn current_page(&self) -> usize {
        self.state.read().await.current_page
    }

    pub async fn sort(&self) -> ReviewSort {
        self.state.read().await.sort
    }

    pub async fn only_with_comment(&self) -> bool {
        self.state.read().await.only_with_comment
    }

    pub async fn error_banner(&self) -> Option<ErrorBanner> {
        let state = self.state.read().await;
        visible_banner(&state.banner, Utc::now()).cloned()
    }
}
