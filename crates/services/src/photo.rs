//! Photo service: park photo lists, likes and comment threads.

use std::collections::HashMap;

use async_trait::async_trait;
use barpark_core::photo::{Comment, Photo};
use barpark_core::types::RecordId;
use tokio::sync::RwLock;

use crate::error::ServiceError;
use crate::simulation::{Operation, Simulation};

#[async_trait]
pub trait PhotoService: Send + Sync {
    /// Photos of a park, newest first.
    async fn fetch(&self, park_id: RecordId) -> Result<Vec<Photo>, ServiceError>;

    /// Register an uploaded photo with the canonical store.
    async fn upload(&self, photo: Photo) -> Result<Photo, ServiceError>;

    /// Remove a photo and its comments. Removing an absent id succeeds.
    async fn delete(&self, id: RecordId) -> Result<(), ServiceError>;

    /// Set the current user's like on a photo and return the updated record.
    async fn set_like(&self, photo_id: RecordId, liked: bool) -> Result<Photo, ServiceError>;

    /// Comments on a photo, oldest first.
    async fn fetch_comments(&self, photo_id: RecordId) -> Result<Vec<Comment>, ServiceError>;

    /// Append a comment to a photo's thread.
    async fn add_comment(&self, photo_id: RecordId, comment: Comment) -> Result<Comment, ServiceError>;
}

#[derive(Debug, Default)]
struct PhotoTables {
    photos: Vec<Photo>,
    comments: HashMap<RecordId, Vec<Comment>>,
}

#[derive(Debug)]
pub struct InMemoryPhotoService {
    tables: RwLock<PhotoTables>,
    simulation: Simulation,
}

impl InMemoryPhotoService {
    pub fn new(simulation: Simulation) -> Self {
        Self::with_photos(simulation, Vec::new(), HashMap::new())
    }

    pub fn with_photos(
        simulation: Simulation,
        mut photos: Vec<Photo>,
        comments: HashMap<RecordId, Vec<Comment>>,
    ) -> Self {
        photos.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at));
        Self {
            tables: RwLock::new(PhotoTables { photos, comments }),
            simulation,
        }
    }
}

#[async_trait]
impl PhotoService for InMemoryPhotoService {
    async fn fetch(&self, park_id: RecordId) -> Result<Vec<Photo>, ServiceError> {
        self.simulation.round_trip(Operation::FetchPhotos).await?;
        let tables = self.tables.read().await;
        Ok(tables
            .photos
            .iter()
            .filter(|p| p.park_id == park_id)
            .cloned()
            .collect())
    }

    async fn upload(&self, photo: Photo) -> Result<Photo, ServiceError> {
        self.simulation.round_trip(Operation::UploadPhoto).await?;
        let mut tables = self.tables.write().await;
        tables.photos.retain(|p| p.id != photo.id);
        tables.photos.insert(0, photo.clone());
        tracing::debug!(photo_id = %photo.id, park_id = %photo.park_id, "Photo registered");
        Ok(photo)
    }

    async fn delete(&self, id: RecordId) -> Result<(), ServiceError> {
        self.simulation.round_trip(Operation::DeletePhoto).await?;
        let mut tables = self.tables.write().await;
        tables.photos.retain(|p| p.id != id);
        tables.comments.remove(&id);
        Ok(())
    }

    async fn set_like(&self, photo_id: RecordId, liked: bool) -> Result<Photo, ServiceError> {
        self.simulation.round_trip(Operation::SetLike).await?;
        let mut tables = self.tables.write().await;
        let photo = tables
            .photos
            .iter_mut()
            .find(|p| p.id == photo_id)
            .ok_or(ServiceError::NotFound {
                entity: "photo",
                id: photo_id,
            })?;

        if photo.is_liked_by_me != liked {
            photo.is_liked_by_me = liked;
            photo.likes = if liked {
                photo.likes + 1
            } else {
                photo.likes.saturating_sub(1)
            };
        }
        Ok(photo.clone())
    }

    async fn fetch_comments(&self, photo_id: RecordId) -> Result<Vec<Comment>, ServiceError> {
        self.simulation.round_trip(Operation::FetchComments).await?;
        let tables = self.tables.read().await;
        Ok(tables.comments.get(&photo_id).cloned().unwrap_or_default())
    }

    async fn add_comment(&self, photo_id: RecordId, comment: Comment) -> Result<Comment, ServiceError> {
        self.simulation.round_trip(Operation::AddComment).await?;
        let mut tables = self.tables.write().await;
        if !tables.photos.iter().any(|p| p.id == photo_id) {
            return Err(ServiceError::NotFound {
                entity: "photo",
                id: photo_id,
            });
        }
        tables
            .comments
            .entry(photo_id)
            .or_default()
            .push(comment.clone());
        Ok(comment)
    }
}
