//! Review service: per-park review lists with one review per user.

use std::collections::HashMap;

use async_trait::async_trait;
use barpark_core::review::Review;
use barpark_core::types::RecordId;
use tokio::sync::RwLock;

use crate::error::ServiceError;
use crate::simulation::{Operation, Simulation};

#[async_trait]
pub trait ReviewService: Send + Sync {
    /// Current reviews for a park. Never mutates.
    async fn fetch(&self, park_id: RecordId) -> Result<Vec<Review>, ServiceError>;

    /// Create or replace the submitting user's review for the park and
    /// return the park's refreshed list.
    async fn submit(&self, review: Review) -> Result<Vec<Review>, ServiceError>;

    /// Remove a review. Removing an absent id succeeds.
    async fn delete(&self, id: RecordId) -> Result<(), ServiceError>;
}

/// Process-lifetime review store keyed by park id.
#[derive(Debug)]
pub struct InMemoryReviewService {
    reviews: RwLock<HashMap<RecordId, Vec<Review>>>,
    simulation: Simulation,
}

impl InMemoryReviewService {
    pub fn new(simulation: Simulation) -> Self {
        Self::with_reviews(simulation, Vec::new())
    }

    /// Seed the store. Later entries for the same (park, user) pair win.
    pub fn with_reviews(simulation: Simulation, seed: Vec<Review>) -> Self {
        let mut reviews: HashMap<RecordId, Vec<Review>> = HashMap::new();
        for review in seed {
            upsert(reviews.entry(review.park_id).or_default(), review.normalized());
        }
        Self {
            reviews: RwLock::new(reviews),
            simulation,
        }
    }
}

/// Replace the same user's review in place, or append.
fn upsert(list: &mut Vec<Review>, mut review: Review) {
    match list.iter_mut().find(|r| r.user_id == review.user_id) {
        Some(existing) => {
            review.id = existing.id;
            review.updated_at = Some(review.created_at);
            review.created_at = existing.created_at;
            *existing = review;
        }
        None => list.push(review),
    }
}

#[async_trait]
impl ReviewService for InMemoryReviewService {
    async fn fetch(&self, park_id: RecordId) -> Result<Vec<Review>, ServiceError> {
        self.simulation.round_trip(Operation::FetchReviews).await?;
        Ok(self
            .reviews
            .read()
            .await
            .get(&park_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn submit(&self, review: Review) -> Result<Vec<Review>, ServiceError> {
        self.simulation.round_trip(Operation::SubmitReview).await?;

        let park_id = review.park_id;
        let mut reviews = self.reviews.write().await;
        let list = reviews.entry(park_id).or_default();
        upsert(list, review.normalized());

        tracing::debug!(park_id = %park_id, count = list.len(), "Review stored");
        Ok(list.clone())
    }

    async fn delete(&self, id: RecordId) -> Result<(), ServiceError> {
        self.simulation.round_trip(Operation::DeleteReview).await?;
        let mut reviews = self.reviews.write().await;
        for list in reviews.values_mut() {
            list.retain(|r| r.id != id);
        }
        Ok(())
    }
}
