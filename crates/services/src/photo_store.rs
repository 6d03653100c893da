//! Durable storage for uploaded image bytes.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use barpark_core::photo::ImageRef;
use barpark_core::types::RecordId;

use crate::error::ServiceError;
use crate::simulation::{Operation, Simulation};

/// File extension used for stored images.
const IMAGE_EXTENSION: &str = "jpg";

#[async_trait]
pub trait PhotoStore: Send + Sync {
    /// Persist `bytes` under `id` and return a loadable reference.
    async fn save(&self, id: RecordId, bytes: &[u8]) -> Result<ImageRef, ServiceError>;

    /// Best-effort removal of a stored image.
    async fn discard(&self, image: &ImageRef) -> Result<(), ServiceError>;
}

/// Writes images into a local directory, one file per photo id.
#[derive(Debug, Clone)]
pub struct LocalPhotoStore {
    root: PathBuf,
    simulation: Simulation,
}

impl LocalPhotoStore {
    pub fn new(root: impl Into<PathBuf>, simulation: Simulation) -> Self {
        Self {
            root: root.into(),
            simulation,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, id: RecordId) -> PathBuf {
        self.root.join(format!("{id}.{IMAGE_EXTENSION}"))
    }
}

#[async_trait]
impl PhotoStore for LocalPhotoStore {
    async fn save(&self, id: RecordId, bytes: &[u8]) -> Result<ImageRef, ServiceError> {
        self.simulation.round_trip(Operation::SaveImage).await?;
        tokio::fs::create_dir_all(&self.root).await?;
        let path = self.path_for(id);
        tokio::fs::write(&path, bytes).await?;
        tracing::debug!(path = %path.display(), bytes = bytes.len(), "Image saved");
        Ok(ImageRef::LocalPath(path))
    }

    async fn discard(&self, image: &ImageRef) -> Result<(), ServiceError> {
        let ImageRef::LocalPath(path) = image else {
            return Ok(());
        };
        if !path.starts_with(&self.root) {
            return Ok(());
        }
        match tokio::fs::remove_file(path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
