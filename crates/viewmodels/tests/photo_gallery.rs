//! Integration tests for `PhotoListViewModel`, backed by a real directory
//! for image bytes.

mod common;

use std::collections::HashMap;
use std::sync::Arc;

use assert_matches::assert_matches;
use barpark_core::photo::{Comment, ImageRef, Photo, Visibility};
use barpark_core::types::{new_id, RecordId};
use barpark_services::{
    InMemoryPhotoService, LocalPhotoStore, Operation, PhotoService, ServiceError, Simulation,
};
use barpark_viewmodels::{Outcome, PhotoListViewModel};
use chrono::{Duration, Utc};
use tempfile::TempDir;

fn photo(park_id: RecordId, minutes_ago: i64, likes: u32) -> Photo {
    Photo {
        id: new_id(),
        park_id,
        image: ImageRef::Url(format!("https://img.example/{minutes_ago}.jpg")),
        uploader_name: "Sam".into(),
        uploaded_at: Utc::now() - Duration::minutes(minutes_ago),
        visibility: Visibility::Public,
        likes,
        is_liked_by_me: false,
    }
}

struct Gallery {
    vm: PhotoListViewModel,
    sim: Simulation,
    service: Arc<InMemoryPhotoService>,
    dir: TempDir,
}

async fn gallery(park: RecordId, photos: Vec<Photo>, comments: HashMap<RecordId, Vec<Comment>>) -> Gallery {
    gallery_with(Simulation::instant(), park, photos, comments).await
}

async fn gallery_with(
    sim: Simulation,
    park: RecordId,
    photos: Vec<Photo>,
    comments: HashMap<RecordId, Vec<Comment>>,
) -> Gallery {
    let dir = tempfile::tempdir().unwrap();
    let service = Arc::new(InMemoryPhotoService::with_photos(sim.clone(), photos, comments));
    let store = Arc::new(LocalPhotoStore::new(dir.path().join("photos"), sim.clone()));
    let vm = PhotoListViewModel::open(park, common::session(), service.clone(), store).await;
    Gallery { vm, sim, service, dir }
}

fn stored_files(dir: &TempDir) -> usize {
    std::fs::read_dir(dir.path().join("photos"))
        .map(|entries| entries.count())
        .unwrap_or(0)
}

// ---------------------------------------------------------------------------
// Test: upload
// ---------------------------------------------------------------------------

#[tokio::test]
async fn upload_inserts_at_head_and_writes_bytes() {
    let park = new_id();
    let g = gallery(park, vec![photo(park, 30, 2), photo(park, 60, 0)], HashMap::new()).await;

    let outcome = g.vm.upload(b"jpeg bytes", Visibility::FriendsOnly).await;

    assert!(outcome.is_committed());
    let photos = g.vm.photos().await;
    assert_eq!(photos.len(), 3);
    assert_eq!(photos[0].uploader_name, "Me");
    assert_eq!(photos[0].visibility, Visibility::FriendsOnly);
    assert_eq!(photos[0].likes, 0);
    let ImageRef::LocalPath(path) = &photos[0].image else {
        panic!("expected a local image, got {:?}", photos[0].image);
    };
    assert_eq!(std::fs::read(path).unwrap(), b"jpeg bytes");
    assert!(!g.vm.is_busy().await);

    let server = g.service.fetch(park).await.unwrap();
    assert_eq!(server[0].id, photos[0].id);
}

#[tokio::test]
async fn failed_upload_removes_photo_and_image() {
    let park = new_id();
    let g = gallery(park, vec![photo(park, 30, 2)], HashMap::new()).await;
    let before = g.vm.photos().await;

    g.sim.faults().fail_next(Operation::UploadPhoto, 1);
    let outcome = g.vm.upload(b"jpeg bytes", Visibility::Public).await;

    assert_matches!(outcome, Outcome::Reverted(ServiceError::Unavailable(Operation::UploadPhoto)));
    assert_eq!(g.vm.photos().await, before);
    assert_eq!(stored_files(&g.dir), 0);
    assert_eq!(g.vm.error_banner().await.unwrap().message, "Upload failed");
    assert!(!g.vm.is_busy().await);
}

#[tokio::test]
async fn failed_image_save_never_shows_photo() {
    let park = new_id();
    let g = gallery(park, Vec::new(), HashMap::new()).await;

    g.sim.faults().fail_next(Operation::SaveImage, 1);
    assert_matches!(g.vm.upload(b"x", Visibility::Public).await, Outcome::Reverted(_));

    assert!(g.vm.photos().await.is_empty());
    assert!(g.vm.error_banner().await.is_some());
}

#[tokio::test(start_paused = true)]
async fn abandoned_upload_still_settles() {
    let park = new_id();
    let sim = Simulation::new(std::time::Duration::from_millis(300), 0.0);
    let g = gallery_with(sim, park, Vec::new(), HashMap::new()).await;

    let gave_up = tokio::time::timeout(
        std::time::Duration::from_millis(50),
        g.vm.upload(b"jpeg bytes", Visibility::Public),
    )
    .await;
    assert!(gave_up.is_err());
    assert!(g.vm.is_busy().await);

    tokio::time::sleep(std::time::Duration::from_secs(1)).await;

    assert!(!g.vm.is_busy().await);
    let photos = g.vm.photos().await;
    assert_eq!(photos.len(), 1);
    assert_eq!(g.service.fetch(park).await.unwrap()[0].id, photos[0].id);
    assert!(g.vm.toggle_like(photos[0].id).await.is_committed());
}

#[tokio::test(start_paused = true)]
async fn unconfirmed_upload_ignores_likes_comments_and_delete() {
    let park = new_id();
    let sim = Simulation::new(std::time::Duration::from_millis(300), 0.0);
    let g = gallery_with(sim, park, Vec::new(), HashMap::new()).await;

    let upload = tokio::spawn({
        let vm = g.vm.clone();
        async move { vm.upload(b"jpeg bytes", Visibility::Public).await }
    });
    // Image saved, service registration still pending.
    tokio::time::sleep(std::time::Duration::from_millis(400)).await;
    let shown = g.vm.photos().await;
    assert_eq!(shown.len(), 1);
    let id = shown[0].id;

    assert!(g.vm.toggle_like(id).await.is_skipped());
    assert!(g.vm.add_comment(id, "first!").await.is_skipped());
    assert!(g.vm.delete(id).await.is_skipped());
    assert_eq!(g.vm.photo(id).await.unwrap().likes, 0);

    assert!(upload.await.unwrap().is_committed());
    assert!(g.vm.toggle_like(id).await.is_committed());
    assert_eq!(g.vm.photo(id).await.unwrap().likes, 1);
}

// ---------------------------------------------------------------------------
// Test: likes
// ---------------------------------------------------------------------------

#[tokio::test]
async fn like_toggles_on_and_off() {
    let park = new_id();
    let p = photo(park, 5, 3);
    let id = p.id;
    let g = gallery(park, vec![p], HashMap::new()).await;

    assert!(g.vm.toggle_like(id).await.is_committed());
    let liked = g.vm.photo(id).await.unwrap();
    assert!(liked.is_liked_by_me);
    assert_eq!(liked.likes, 4);

    assert!(g.vm.toggle_like(id).await.is_committed());
    let unliked = g.vm.photo(id).await.unwrap();
    assert!(!unliked.is_liked_by_me);
    assert_eq!(unliked.likes, 3);
}

#[tokio::test]
async fn failed_like_reverts_count_and_flag() {
    let park = new_id();
    let p = photo(park, 5, 3);
    let id = p.id;
    let g = gallery(park, vec![p], HashMap::new()).await;

    g.sim.faults().fail_next(Operation::SetLike, 1);
    assert_matches!(g.vm.toggle_like(id).await, Outcome::Reverted(_));

    let after = g.vm.photo(id).await.unwrap();
    assert!(!after.is_liked_by_me);
    assert_eq!(after.likes, 3);
    assert!(!g.vm.is_like_in_flight(id).await);
}

#[tokio::test(start_paused = true)]
async fn concurrent_taps_on_same_photo_count_once() {
    let park = new_id();
    let p = photo(park, 5, 0);
    let id = p.id;
    let sim = Simulation::new(std::time::Duration::from_millis(300), 0.0);
    let g = gallery_with(sim, park, vec![p], HashMap::new()).await;

    let (a, b) = futures::future::join(g.vm.toggle_like(id), g.vm.toggle_like(id)).await;

    let outcomes = [a, b];
    assert_eq!(outcomes.iter().filter(|o| o.is_committed()).count(), 1);
    assert_eq!(outcomes.iter().filter(|o| o.is_skipped()).count(), 1);
    assert_eq!(g.vm.photo(id).await.unwrap().likes, 1);
}

// ---------------------------------------------------------------------------
// Test: delete
// ---------------------------------------------------------------------------

#[tokio::test]
async fn delete_removes_after_confirmation() {
    let park = new_id();
    let p = photo(park, 5, 0);
    let id = p.id;
    let g = gallery(park, vec![p], HashMap::new()).await;

    assert!(g.vm.delete(id).await.is_committed());
    assert!(g.vm.photo(id).await.is_none());
    assert!(g.service.fetch(park).await.unwrap().is_empty());
    assert!(g.vm.delete(id).await.is_skipped());
}

#[tokio::test]
async fn failed_delete_keeps_photo_and_shows_banner() {
    let park = new_id();
    let p = photo(park, 5, 0);
    let id = p.id;
    let g = gallery(park, vec![p], HashMap::new()).await;

    g.sim.faults().fail_next(Operation::DeletePhoto, 1);
    assert_matches!(g.vm.delete(id).await, Outcome::Reverted(_));

    assert!(g.vm.photo(id).await.is_some());
    assert_eq!(g.vm.error_banner().await.unwrap().message, "Couldn't delete photo");
}

// ---------------------------------------------------------------------------
// Test: comments
// ---------------------------------------------------------------------------

#[tokio::test]
async fn load_comments_replaces_thread() {
    let park = new_id();
    let p = photo(park, 5, 0);
    let id = p.id;
    let existing = Comment::new("Sam", "Great spot", Utc::now()).unwrap();
    let g = gallery(park, vec![p], HashMap::from([(id, vec![existing.clone()])])).await;

    assert!(g.vm.comments(id).await.is_empty());
    assert!(g.vm.load_comments(id).await.is_committed());
    assert_eq!(g.vm.comments(id).await, vec![existing]);
}

#[tokio::test]
async fn add_comment_appends_and_persists() {
    let park = new_id();
    let p = photo(park, 5, 0);
    let id = p.id;
    let g = gallery(park, vec![p], HashMap::new()).await;

    assert!(g.vm.add_comment(id, "  Nice form!  ").await.is_committed());

    let thread = g.vm.comments(id).await;
    assert_eq!(thread.len(), 1);
    assert_eq!(thread[0].text, "Nice form!");
    assert_eq!(thread[0].author, "Me");
    assert_eq!(g.service.fetch_comments(id).await.unwrap(), thread);
}

#[tokio::test]
async fn failed_comment_is_removed() {
    let park = new_id();
    let p = photo(park, 5, 0);
    let id = p.id;
    let g = gallery(park, vec![p], HashMap::new()).await;

    g.sim.faults().fail_next(Operation::AddComment, 1);
    assert_matches!(g.vm.add_comment(id, "lost").await, Outcome::Reverted(_));

    assert!(g.vm.comments(id).await.is_empty());
    assert_eq!(g.vm.error_banner().await.unwrap().message, "Couldn't post comment");
}

#[tokio::test]
async fn blank_comment_or_unknown_photo_is_skipped() {
    let park = new_id();
    let p = photo(park, 5, 0);
    let id = p.id;
    let g = gallery(park, vec![p], HashMap::new()).await;

    assert!(g.vm.add_comment(id, "   ").await.is_skipped());
    assert!(g.vm.add_comment(new_id(), "hello").await.is_skipped());
    assert!(g.vm.comments(id).await.is_empty());
}
