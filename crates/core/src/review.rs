//! Park reviews: write-time clamping and the derived list views.
//!
//! The derived views (filter, sort, page window, average) are plain
//! functions of their inputs so the review view-model can recompute them on
//! every access instead of caching mutable copies.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::optimistic::Identified;
use crate::types::{new_id, RecordId, Timestamp};

/* --------------------------------------------------------------------------
Constants
-------------------------------------------------------------------------- */

/// Lowest accepted star rating.
pub const MIN_RATING: u8 = 1;

/// Highest accepted star rating.
pub const MAX_RATING: u8 = 5;

/// Maximum comment length, counted in characters.
pub const MAX_COMMENT_CHARS: usize = 140;

/// Number of reviews revealed per page.
pub const PAGE_SIZE: usize = 5;

/* --------------------------------------------------------------------------
Record
-------------------------------------------------------------------------- */

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub id: RecordId,
    pub park_id: RecordId,
    pub user_id: RecordId,
    pub rating: u8,
    pub comment: String,
    pub created_at: Timestamp,
    pub updated_at: Option<Timestamp>,
}

impl Review {
    /// Build a fresh submission, clamping the rating and truncating the
    /// comment.
    pub fn submission(
        park_id: RecordId,
        user_id: RecordId,
        rating: i64,
        comment: &str,
        now: Timestamp,
    ) -> Self {
        Self {
            id: new_id(),
            park_id,
            user_id,
            rating: clamp_rating(rating),
            comment: truncate_comment(comment),
            created_at: now,
            updated_at: None,
        }
    }

    /// Re-apply the write-time rules to an existing record.
    pub fn normalized(mut self) -> Self {
        self.rating = clamp_rating(i64::from(self.rating));
        self.comment = truncate_comment(&self.comment);
        self
    }

    /// Any stored text counts, whitespace included.
    pub fn has_comment(&self) -> bool {
        !self.comment.is_empty()
    }
}

impl Identified for Review {
    fn id(&self) -> RecordId {
        self.id
    }
}

/// Clamp a raw rating into `MIN_RATING..=MAX_RATING`.
pub fn clamp_rating(raw: i64) -> u8 {
    raw.clamp(i64::from(MIN_RATING), i64::from(MAX_RATING)) as u8
}

/// Truncate a comment to its first [`MAX_COMMENT_CHARS`] characters.
pub fn truncate_comment(comment: &str) -> String {
    match comment.char_indices().nth(MAX_COMMENT_CHARS) {
        Some((byte_index, _)) => comment[..byte_index].to_string(),
        None => comment.to_string(),
    }
}

/* --------------------------------------------------------------------------
Derived views
-------------------------------------------------------------------------- */

/// Ordering options offered by the review list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewSort {
    #[default]
    Newest,
    RatingHigh,
    RatingLow,
}

impl ReviewSort {
    pub fn label(self) -> &'static str {
        match self {
            Self::Newest => "Newest",
            Self::RatingHigh => "Highest rated",
            Self::RatingLow => "Lowest rated",
        }
    }

    fn compare(self, a: &Review, b: &Review) -> Ordering {
        let newest_first = b.created_at.cmp(&a.created_at);
        match self {
            Self::Newest => newest_first,
            Self::RatingHigh => b.rating.cmp(&a.rating).then(newest_first),
            Self::RatingLow => a.rating.cmp(&b.rating).then(newest_first),
        }
    }
}

/// All reviews, or only those carrying a non-empty comment.
pub fn filter_reviews(reviews: &[Review], only_with_comment: bool) -> Vec<Review> {
    reviews
        .iter()
        .filter(|r| !only_with_comment || r.has_comment())
        .cloned()
        .collect()
}

/// Sort a list in place. Ties on rating fall back to newest first.
pub fn sort_reviews(reviews: &mut [Review], sort: ReviewSort) {
    reviews.sort_by(|a, b| sort.compare(a, b));
}

/// Number of items visible after `current_page` load-more steps.
pub fn window_len(current_page: usize) -> usize {
    (current_page + 1) * PAGE_SIZE
}

/// The visible prefix of a sorted list.
pub fn page_window(sorted: &[Review], current_page: usize) -> &[Review] {
    let end = window_len(current_page).min(sorted.len());
    &sorted[..end]
}

/// Whether another `load_more` would reveal anything.
pub fn has_more(total: usize, current_page: usize) -> bool {
    window_len(current_page) < total
}

/// Mean of all ratings; 0 for an empty list.
pub fn average_rating(reviews: &[Review]) -> f64 {
    if reviews.is_empty() {
        return 0.0;
    }
    let sum: u32 = reviews.iter().map(|r| u32::from(r.rating)).sum();
    f64::from(sum) / reviews.len() as f64
}

/* --------------------------------------------------------------------------
Tests
-------------------------------------------------------------------------- */

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn review(rating: u8, comment: &str, days_ago: i64) -> Review {
        Review {
            id: new_id(),
            park_id: new_id(),
            user_id: new_id(),
            rating,
            comment: comment.to_string(),
            created_at: Utc::now() - Duration::days(days_ago),
            updated_at: None,
        }
    }

    #[test]
    fn rating_is_clamped_into_range() {
        assert_eq!(clamp_rating(-3), 1);
        assert_eq!(clamp_rating(0), 1);
        assert_eq!(clamp_rating(1), 1);
        assert_eq!(clamp_rating(4), 4);
        assert_eq!(clamp_rating(5), 5);
        assert_eq!(clamp_rating(99), 5);
    }

    #[test]
    fn comment_is_truncated_to_prefix() {
        let long = "x".repeat(200);
        let out = truncate_comment(&long);
        assert_eq!(out.chars().count(), MAX_COMMENT_CHARS);
        assert!(long.starts_with(&out));

        assert_eq!(truncate_comment("short"), "short");
    }

    #[test]
    fn truncation_respects_multibyte_characters() {
        let long = "ü".repeat(150);
        let out = truncate_comment(&long);
        assert_eq!(out.chars().count(), MAX_COMMENT_CHARS);
        assert!(long.starts_with(&out));
    }

    #[test]
    fn submission_applies_write_rules() {
        let r = Review::submission(new_id(), new_id(), 11, &"a".repeat(141), Utc::now());
        assert_eq!(r.rating, 5);
        assert_eq!(r.comment.len(), 140);
        assert!(r.updated_at.is_none());
    }

    #[test]
    fn filter_drops_only_empty_comments() {
        let list = vec![review(3, "nice", 0), review(4, "", 1), review(5, "   ", 2)];
        assert_eq!(filter_reviews(&list, false).len(), 3);
        let kept = filter_reviews(&list, true);
        assert_eq!(kept.iter().map(|r| r.rating).collect::<Vec<_>>(), [3, 5]);
    }

    #[test]
    fn sort_orders() {
        let mut list = vec![review(2, "", 3), review(5, "", 1), review(4, "", 0)];

        sort_reviews(&mut list, ReviewSort::Newest);
        assert_eq!(list.iter().map(|r| r.rating).collect::<Vec<_>>(), [4, 5, 2]);

        sort_reviews(&mut list, ReviewSort::RatingHigh);
        assert_eq!(list.iter().map(|r| r.rating).collect::<Vec<_>>(), [5, 4, 2]);

        sort_reviews(&mut list, ReviewSort::RatingLow);
        assert_eq!(list.iter().map(|r| r.rating).collect::<Vec<_>>(), [2, 4, 5]);
    }

    #[test]
    fn rating_ties_fall_back_to_newest() {
        let older = review(4, "older", 5);
        let newer = review(4, "newer", 1);
        let mut list = vec![older, newer];
        sort_reviews(&mut list, ReviewSort::RatingHigh);
        assert_eq!(list[0].comment, "newer");
    }

    #[test]
    fn page_window_and_has_more() {
        let list: Vec<Review> = (0..12).map(|d| review(3, "", d)).collect();

        assert_eq!(page_window(&list, 0).len(), 5);
        assert!(has_more(list.len(), 0));
        assert_eq!(page_window(&list, 1).len(), 10);
        assert!(has_more(list.len(), 1));
        assert_eq!(page_window(&list, 2).len(), 12);
        assert!(!has_more(list.len(), 2));
    }

    #[test]
    fn exact_multiple_of_page_size_has_no_more() {
        assert!(!has_more(5, 0));
        assert!(has_more(6, 0));
        assert!(!has_more(0, 0));
    }

    #[test]
    fn average_of_empty_is_zero() {
        assert_eq!(average_rating(&[]), 0.0);
    }

    #[test]
    fn average_is_arithmetic_mean() {
        let list = vec![review(5, "", 0), review(4, "", 0), review(2, "", 0)];
        assert!((average_rating(&list) - 11.0 / 3.0).abs() < f64::EPSILON);
    }
}
