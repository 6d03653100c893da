//! Mock data for the in-memory services.
//!
//! [`MockData::generate`] builds a small, self-consistent world around a
//! reference time: a handful of parks, a community of users, two weeks of
//! reviews for the first park, a few upcoming events (one already full) and
//! some photos with comments.

use std::collections::HashMap;

use barpark_core::event::{Event, PARTICIPANT_PREVIEW_LEN};
use barpark_core::park::{Coordinate, Equipment, Park};
use barpark_core::photo::{Comment, ImageRef, Photo, Visibility};
use barpark_core::review::{average_rating, Review};
use barpark_core::types::{new_id, RecordId, Timestamp, User};
use chrono::Duration;

use crate::{
    InMemoryEventService, InMemoryParkService, InMemoryPhotoService, InMemoryReviewService,
    Simulation,
};

/// Number of days covered by the seeded reviews.
pub const REVIEW_DAYS: i64 = 15;

const COMMUNITY: &[&str] = &[
    "Ana", "Kai", "Marta", "Jonas", "Leila", "Tomás", "Yuki", "Ola", "Samir", "Ines", "Bruno",
    "Hana", "Pavel", "Zoe", "Emeka",
];

const REVIEW_TEXT: &[&str] = &[
    "Solid pull-up bars, a bit crowded after work.",
    "",
    "Rings were missing this week.",
    "Best dip station in town!",
    "",
    "Great community, people share tips.",
    "Surface gets slippery when it rains.",
    "",
    "Perfect for muscle-up practice.",
    "Bars are too thick for beginners.",
    "Lighting at night is good.",
    "",
    "Monkey bars are a blast.",
    "Needs a water fountain.",
    "My go-to spot for calisthenics.",
];

const REVIEW_RATINGS: &[u8] = &[4, 5, 2, 5, 3, 4, 3, 1, 5, 2, 4, 3, 5, 3, 4];

/// Everything the in-memory services are seeded with.
#[derive(Debug, Clone)]
pub struct MockData {
    pub parks: Vec<Park>,
    pub community: Vec<User>,
    pub reviews: Vec<Review>,
    pub events: Vec<(Event, Vec<RecordId>)>,
    pub photos: Vec<Photo>,
    pub comments: HashMap<RecordId, Vec<Comment>>,
}

impl MockData {
    pub fn generate(now: Timestamp) -> Self {
        let parks = parks();
        let community: Vec<User> = COMMUNITY.iter().map(|name| User::new(*name)).collect();
        let home = parks[0].id;

        let reviews: Vec<Review> = community
            .iter()
            .enumerate()
            .map(|(i, user)| Review {
                id: new_id(),
                park_id: home,
                user_id: user.id,
                rating: REVIEW_RATINGS[i % REVIEW_RATINGS.len()],
                comment: REVIEW_TEXT[i % REVIEW_TEXT.len()].to_string(),
                created_at: now - Duration::days(i as i64 % REVIEW_DAYS) - Duration::hours(i as i64),
                updated_at: None,
            })
            .collect();

        let mut parks = parks;
        parks[0].average_rating = average_rating(&reviews);

        let events = vec![
            event_with(home, "Saturday Bar Jam", now + Duration::days(2), 10, Some(10), &community),
            event_with(home, "Beginner Pull-up Clinic", now + Duration::days(4), 8, Some(15), &community),
            event_with(home, "Open Street Workout", now + Duration::days(6), 3, None, &community),
        ];

        let uploads = [
            ("Morning session", 3, 12, Visibility::Public),
            ("New rings installed", 26, 4, Visibility::Public),
            ("Team photo", 50, 9, Visibility::FriendsOnly),
        ];
        let photos: Vec<Photo> = uploads
            .iter()
            .enumerate()
            .map(|(i, (_caption, hours_ago, likes, visibility))| Photo {
                id: new_id(),
                park_id: home,
                image: ImageRef::Url(format!("https://images.barpark.app/{home}/{i}.jpg")),
                uploader_name: community[i].name.clone(),
                uploaded_at: now - Duration::hours(*hours_ago),
                visibility: *visibility,
                likes: *likes,
                is_liked_by_me: false,
            })
            .collect();

        let mut comments = HashMap::new();
        comments.insert(
            photos[1].id,
            vec![
                Comment {
                    id: new_id(),
                    author: community[3].name.clone(),
                    text: "Finally! The old ones were falling apart.".into(),
                    created_at: now - Duration::hours(20),
                },
                Comment {
                    id: new_id(),
                    author: community[5].name.clone(),
                    text: "See you there on Saturday.".into(),
                    created_at: now - Duration::hours(18),
                },
            ],
        );

        Self {
            parks,
            community,
            reviews,
            events,
            photos,
            comments,
        }
    }

    pub fn home_park(&self) -> &Park {
        &self.parks[0]
    }

    pub fn review_service(&self, simulation: Simulation) -> InMemoryReviewService {
        InMemoryReviewService::with_reviews(simulation, self.reviews.clone())
    }

    pub fn event_service(&self, simulation: Simulation) -> InMemoryEventService {
        InMemoryEventService::with_events(simulation, self.events.clone())
    }

    pub fn photo_service(&self, simulation: Simulation) -> InMemoryPhotoService {
        InMemoryPhotoService::with_photos(simulation, self.photos.clone(), self.comments.clone())
    }

    pub fn park_service(&self, simulation: Simulation) -> InMemoryParkService {
        InMemoryParkService::new(simulation, self.parks.clone())
    }
}

fn event_with(
    park_id: RecordId,
    title: &str,
    starts_at: Timestamp,
    attendee_count: u32,
    capacity: Option<u32>,
    community: &[User],
) -> (Event, Vec<RecordId>) {
    let roster: Vec<User> = community
        .iter()
        .take(attendee_count as usize)
        .cloned()
        .collect();
    let event = Event {
        id: new_id(),
        park_id,
        title: title.to_string(),
        starts_at,
        ends_at: Some(starts_at + Duration::hours(2)),
        location: Some("Main bar area".to_string()),
        attendee_count,
        capacity,
        participants: roster.iter().take(PARTICIPANT_PREVIEW_LEN).cloned().collect(),
        is_attending: false,
        calendar_ref: None,
        last_updated: starts_at - Duration::days(7),
    };
    (event, roster.into_iter().map(|u| u.id).collect())
}

fn parks() -> Vec<Park> {
    use Equipment::*;
    let park = |name: &str, city: &str, latitude: f64, longitude: f64, eq: &[Equipment]| Park {
        id: new_id(),
        name: name.to_string(),
        city: city.to_string(),
        location: Coordinate {
            latitude,
            longitude,
        },
        equipment: eq.iter().copied().collect(),
        average_rating: 0.0,
    };
    vec![
        park("Tempelhof Street Workout", "Berlin", 52.4731, 13.4015, &[PullUpBar, ParallelBars, DipStation, MonkeyBars]),
        park("Mauerpark Bars", "Berlin", 52.5430, 13.4025, &[PullUpBar, WallBars]),
        park("Venice Muscle Beach", "Los Angeles", 33.9850, -118.4695, &[PullUpBar, Rings, ParallelBars]),
        park("Parc de Belleville", "Paris", 48.8718, 2.3846, &[PullUpBar, DipStation]),
    ]
}
