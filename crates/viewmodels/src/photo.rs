//! Photo gallery for one park: upload, like, delete and comments.
//!
//! Uploads and comments are inserted optimistically and removed again if
//! the service rejects them. Likes flip optimistically and revert on
//! failure. Deletes are the exception: the record stays visible until the
//! service confirms the removal.
//!
//! Once an optimistic change is on screen its confirmation runs on its own
//! task, so it settles even if the caller stops waiting. Likes, comments
//! and deletes on a photo whose upload is still unconfirmed are skipped.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use barpark_core::notice::{visible_banner, ErrorBanner, LoadState};
use barpark_core::optimistic::{self, Pending};
use barpark_core::photo::{self, Comment, LikeRollback, Photo, Visibility};
use barpark_core::types::{new_id, RecordId};
use barpark_events::{ChangeEvent, ChangeKind, ChangePhase};
use barpark_services::{PhotoService, PhotoStore};
use chrono::Utc;
use tokio::sync::RwLock;

use crate::outcome::{complete_detached, Outcome};
use crate::session::Session;

#[derive(Debug, Default)]
struct PhotoState {
    load_state: LoadState,
    photos: Vec<Photo>,
    comments: HashMap<RecordId, Vec<Comment>>,
    uploads_in_flight: usize,
    /// Photos shown optimistically that the service does not know yet.
    unconfirmed: HashSet<RecordId>,
    likes_in_flight: HashSet<RecordId>,
    banner: Option<ErrorBanner>,
}

#[derive(Clone)]
pub struct PhotoListViewModel {
    park_id: RecordId,
    session: Session,
    service: Arc<dyn PhotoService>,
    store: Arc<dyn PhotoStore>,
    state: Arc<RwLock<PhotoState>>,
}

impl PhotoListViewModel {
    pub fn new(
        park_id: RecordId,
        session: Session,
        service: Arc<dyn PhotoService>,
        store: Arc<dyn PhotoStore>,
    ) -> Self {
        Self {
            park_id,
            session,
            service,
            store,
            state: Arc::default(),
        }
    }

    pub async fn open(
        park_id: RecordId,
        session: Session,
        service: Arc<dyn PhotoService>,
        store: Arc<dyn PhotoStore>,
    ) -> Self {
        let vm = Self::new(park_id, session, service, store);
        vm.load().await;
        vm
    }

    pub async fn load(&self) {
        self.state.write().await.load_state = LoadState::Loading;

        let result = self.service.fetch(self.park_id).await;

        let mut state = self.state.write().await;
        match result {
            Ok(photos) => {
                tracing::info!(park_id = %self.park_id, count = photos.len(), "Photos loaded");
                state.photos = photos;
                state.load_state = LoadState::Ready;
                self.session
                    .publish(ChangeEvent::new(ChangeKind::PhotosLoaded).with_park(self.park_id));
            }
            Err(e) => {
                tracing::error!(park_id = %self.park_id, error = %e, "Failed to load photos");
                state.photos.clear();
                state.load_state = LoadState::Failed(e.to_string());
            }
        }
    }

    pub async fn retry(&self) {
        self.load().await;
    }

    // -----------------------------------------------------------------------
    // Upload
    // -----------------------------------------------------------------------

    /// Store the image bytes, show the photo at the head of the gallery and
    /// register it with the service. A failed registration removes the
    /// optimistic photo and its stored image.
    pub async fn upload(&self, bytes: &[u8], visibility: Visibility) -> Outcome {
        self.state.write().await.uploads_in_flight += 1;
        let vm = self.clone();
        let bytes = bytes.to_vec();
        complete_detached(async move {
            let outcome = vm.upload_inner(&bytes, visibility).await;
            vm.state.write().await.uploads_in_flight -= 1;
            outcome
        })
        .await
    }

    async fn upload_inner(&self, bytes: &[u8], visibility: Visibility) -> Outcome {
        let id = new_id();
        let image = match self.store.save(id, bytes).await {
            Ok(image) => image,
            Err(e) => {
                tracing::error!(error = %e, "Failed to store photo bytes");
                self.show_error("Couldn't save your photo").await;
                return Outcome::Reverted(e);
            }
        };

        let record = Photo {
            id,
            park_id: self.park_id,
            image: image.clone(),
            uploader_name: self.session.user.name.clone(),
            uploaded_at: Utc::now(),
            visibility,
            likes: 0,
            is_liked_by_me: false,
        };

        {
            let mut state = self.state.write().await;
            state.photos.insert(0, record.clone());
            state.unconfirmed.insert(id);
        }
        self.announce(ChangeKind::PhotoInserted, id, ChangePhase::Optimistic);

        match self.service.upload(record).await {
            Ok(stored) => {
                {
                    let mut state = self.state.write().await;
                    state.unconfirmed.remove(&id);
                    optimistic::replace(&mut state.photos, stored);
                }
                tracing::info!(photo_id = %id, park_id = %self.park_id, "Photo uploaded");
                self.announce(ChangeKind::PhotoInserted, id, ChangePhase::Confirmed);
                Outcome::Committed
            }
            Err(e) => {
                tracing::error!(photo_id = %id, error = %e, "Photo upload failed, removing");
                {
                    let mut state = self.state.write().await;
                    state.unconfirmed.remove(&id);
                    optimistic::remove(&mut state.photos, id);
                    state.banner = Some(ErrorBanner::new("Upload failed", Utc::now()));
                }
                if let Err(cleanup) = self.store.discard(&image).await {
                    tracing::warn!(photo_id = %id, error = %cleanup, "Failed to discard stored image");
                }
                self.announce(ChangeKind::PhotoInserted, id, ChangePhase::RolledBack);
                Outcome::Reverted(e)
            }
        }
    }

    // -----------------------------------------------------------------------
    // Like
    // -----------------------------------------------------------------------

    /// Flip the current user's like. Skipped for unknown or unconfirmed
    /// photos and while a previous toggle on the same photo is pending.
    pub async fn toggle_like(&self, photo_id: RecordId) -> Outcome {
        let (pending, liked) = {
            let mut state = self.state.write().await;
            if state.likes_in_flight.contains(&photo_id) || state.unconfirmed.contains(&photo_id) {
                return Outcome::Skipped;
            }
            let Some(pending) = optimistic::transition(&mut state.photos, photo_id, |p| {
                Some(photo::apply_like_toggle(p))
            }) else {
                return Outcome::Skipped;
            };
            let liked = !pending.rollback.is_liked_by_me;
            state.likes_in_flight.insert(photo_id);
            (pending, liked)
        };
        self.announce(ChangeKind::PhotoLiked, photo_id, ChangePhase::Optimistic);

        let vm = self.clone();
        complete_detached(async move { vm.finish_like(pending, liked).await }).await
    }

    async fn finish_like(&self, pending: Pending<LikeRollback>, liked: bool) -> Outcome {
        let photo_id = pending.record_id;
        let result = self.service.set_like(photo_id, liked).await;

        let mut state = self.state.write().await;
        state.likes_in_flight.remove(&photo_id);
        match result {
            Ok(confirmed) => {
                if let Some(record) = optimistic::find_mut(&mut state.photos, photo_id) {
                    record.likes = confirmed.likes;
                    record.is_liked_by_me = confirmed.is_liked_by_me;
                }
                self.announce(ChangeKind::PhotoLiked, photo_id, ChangePhase::Confirmed);
                Outcome::Committed
            }
            Err(e) => {
                if pending.revert(&mut state.photos) {
                    tracing::warn!(photo_id = %photo_id, error = %e, "Like failed, reverted");
                    self.announce(ChangeKind::PhotoLiked, photo_id, ChangePhase::RolledBack);
                }
                Outcome::Reverted(e)
            }
        }
    }

    // -----------------------------------------------------------------------
    // Delete
    // -----------------------------------------------------------------------

    /// Delete a photo. The photo is removed locally only after the service
    /// confirms. Skipped for unknown or unconfirmed photos.
    pub async fn delete(&self, photo_id: RecordId) -> Outcome {
        {
            let state = self.state.read().await;
            if optimistic::find(&state.photos, photo_id).is_none()
                || state.unconfirmed.contains(&photo_id)
            {
                return Outcome::Skipped;
            }
        }

        match self.service.delete(photo_id).await {
            Ok(()) => {
                let mut state = self.state.write().await;
                optimistic::remove(&mut state.photos, photo_id);
                state.comments.remove(&photo_id);
                tracing::info!(photo_id = %photo_id, "Photo deleted");
                self.announce(ChangeKind::PhotoRemoved, photo_id, ChangePhase::Confirmed);
                Outcome::Committed
            }
            Err(e) => {
                tracing::error!(photo_id = %photo_id, error = %e, "Failed to delete photo");
                self.show_error("Couldn't delete photo").await;
                Outcome::Reverted(e)
            }
        }
    }

    // -----------------------------------------------------------------------
    // Comments
    // -----------------------------------------------------------------------

    /// Fetch a photo's comment thread, replacing the local copy.
    pub async fn load_comments(&self, photo_id: RecordId) -> Outcome {
        match self.service.fetch_comments(photo_id).await {
            Ok(comments) => {
                self.state.write().await.comments.insert(photo_id, comments);
                Outcome::Committed
            }
            Err(e) => {
                tracing::error!(photo_id = %photo_id, error = %e, "Failed to load comments");
                Outcome::Reverted(e)
            }
        }
    }

    /// Append a comment optimistically. Blank text and unknown or
    /// unconfirmed photos are skipped.
    pub async fn add_comment(&self, photo_id: RecordId, text: &str) -> Outcome {
        let comment = match Comment::new(&self.session.user.name, text, Utc::now()) {
            Ok(comment) => comment,
            Err(e) => {
                tracing::debug!(photo_id = %photo_id, reason = %e, "Comment rejected");
                return Outcome::Skipped;
            }
        };

        {
            let mut state = self.state.write().await;
            if optimistic::find(&state.photos, photo_id).is_none()
                || state.unconfirmed.contains(&photo_id)
            {
                return Outcome::Skipped;
            }
            state
                .comments
                .entry(photo_id)
                .or_default()
                .push(comment.clone());
        }
        self.announce(ChangeKind::CommentAdded, photo_id, ChangePhase::Optimistic);

        let vm = self.clone();
        complete_detached(async move { vm.finish_comment(photo_id, comment).await }).await
    }

    async fn finish_comment(&self, photo_id: RecordId, comment: Comment) -> Outcome {
        let comment_id = comment.id;
        match self.service.add_comment(photo_id, comment).await {
            Ok(_) => {
                self.announce(ChangeKind::CommentAdded, photo_id, ChangePhase::Confirmed);
                Outcome::Committed
            }
            Err(e) => {
                tracing::error!(photo_id = %photo_id, error = %e, "Failed to post comment, removing");
                {
                    let mut state = self.state.write().await;
                    if let Some(thread) = state.comments.get_mut(&photo_id) {
                        optimistic::remove(thread, comment_id);
                    }
                    state.banner = Some(ErrorBanner::new("Couldn't post comment", Utc::now()));
                }
                self.announce(ChangeKind::CommentRemoved, photo_id, ChangePhase::RolledBack);
                Outcome::Reverted(e)
            }
        }
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    async fn show_error(&self, message: &str) {
        self.state.write().await.banner = Some(ErrorBanner::new(message, Utc::now()));
    }

    fn announce(&self, kind: ChangeKind, record_id: RecordId, phase: ChangePhase) {
        self.session.publish(
            ChangeEvent::new(kind)
                .with_phase(phase)
                .with_park(self.park_id)
                .with_record(record_id),
        );
    }

    // -----------------------------------------------------------------------
    // Read access
    // -----------------------------------------------------------------------

    pub async fn photos(&self) -> Vec<Photo> {
        self.state.read().await.photos.clone()
    }

    pub async fn photo(&self, photo_id: RecordId) -> Option<Photo> {
        optimistic::find(&self.state.read().await.photos, photo_id).cloned()
    }

    pub async fn comments(&self, photo_id: RecordId) -> Vec<Comment> {
        self.state
            .read()
            .await
            .comments
            .get(&photo_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Whether an upload is in progress.
    pub async fn is_busy(&self) -> bool {
        self.state.read().await.uploads_in_flight > 0
    }

    pub async fn is_like_in_flight(&self, photo_id: RecordId) -> bool {
        self.state.read().await.likes_in_flight.contains(&photo_id)
    }

    pub async fn load_state(&self) -> LoadState {
        self.state.read().await.load_state.clone()
    }

    pub async fn error_banner(&self) -> Option<ErrorBanner> {
        let state = self.state.read().await;
        visible_banner(&state.banner, Utc::now()).cloned()
    }

    pub async fn dismiss_error(&self) {
        self.state.write().await.banner = None;
    }
}
