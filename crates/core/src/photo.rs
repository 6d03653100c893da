//! Community photos, their comments and the like toggle.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::optimistic::{Identified, Rollback};
use crate::types::{new_id, RecordId, Timestamp};

/// Maximum length for a photo comment, counted in characters.
pub const MAX_PHOTO_COMMENT_CHARS: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    #[default]
    Public,
    FriendsOnly,
}

/// Where the image bytes can be loaded from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "location", rename_all = "snake_case")]
pub enum ImageRef {
    Url(String),
    LocalPath(std::path::PathBuf),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Photo {
    pub id: RecordId,
    pub park_id: RecordId,
    pub image: ImageRef,
    pub uploader_name: String,
    pub uploaded_at: Timestamp,
    pub visibility: Visibility,
    pub likes: u32,
    pub is_liked_by_me: bool,
}

impl Identified for Photo {
    fn id(&self) -> RecordId {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: RecordId,
    pub author: String,
    pub text: String,
    pub created_at: Timestamp,
}

impl Comment {
    /// Build a new comment, rejecting blank or overlong text.
    pub fn new(author: &str, text: &str, now: Timestamp) -> Result<Self, CoreError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(CoreError::Validation(
                "Comment text must not be empty".to_string(),
            ));
        }
        if text.chars().count() > MAX_PHOTO_COMMENT_CHARS {
            return Err(CoreError::Validation(format!(
                "Comment exceeds maximum length of {MAX_PHOTO_COMMENT_CHARS} characters"
            )));
        }
        Ok(Self {
            id: new_id(),
            author: author.to_string(),
            text: text.to_string(),
            created_at: now,
        })
    }
}

impl Identified for Comment {
    fn id(&self) -> RecordId {
        self.id
    }
}

/// Like fields before a toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LikeRollback {
    pub likes: u32,
    pub is_liked_by_me: bool,
}

impl Rollback<Photo> for LikeRollback {
    fn restore(&self, record: &mut Photo) {
        record.likes = self.likes;
        record.is_liked_by_me = self.is_liked_by_me;
    }
}

/// Flip the like state, moving the counter by exactly one.
pub fn apply_like_toggle(photo: &mut Photo) -> LikeRollback {
    let rollback = LikeRollback {
        likes: photo.likes,
        is_liked_by_me: photo.is_liked_by_me,
    };
    if photo.is_liked_by_me {
        photo.likes = photo.likes.saturating_sub(1);
        photo.is_liked_by_me = false;
    } else {
        photo.likes += 1;
        photo.is_liked_by_me = true;
    }
    rollback
}
