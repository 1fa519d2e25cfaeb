use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::choices::{AgeRange, MediaKind, SkinTone, SkinType};

/// A star rating, always within 1..=5.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Rating(u8);

impl Rating {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    /// Pulls any submitted integer into range instead of rejecting it.
    pub fn clamped(raw: i64) -> Self {
        Rating(raw.clamp(Self::MIN as i64, Self::MAX as i64) as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn stars(self) -> String {
        let filled = self.0 as usize;
        format!(
            "{}{}",
            "★".repeat(filled),
            "☆".repeat(Self::MAX as usize - filled)
        )
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Review {
    pub id: i64,
    pub user_id: i64,
    pub product_id: i64,
    pub title: String,
    pub body: String,
    pub rating: Rating,
    pub is_verified_purchase: bool,
    pub receipt: Option<String>,
    pub helpful_votes: i64,
    pub skin_type: Option<SkinType>,
    pub skin_tone: Option<SkinTone>,
    pub age_range: Option<AgeRange>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ReviewMedia {
    pub id: i64,
    pub review_id: i64,
    pub file: String,
    pub kind: MediaKind,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct WearTest {
    pub review_id: i64,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub notes: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct HelpfulnessVote {
    pub review_id: i64,
    pub user_id: i64,
    pub is_helpful: bool,
    pub created_at: DateTime<Utc>,
}

/// A review as displayed: author, product and attachments resolved.
#[derive(Serialize, Debug, Clone)]
pub struct ReviewEntry {
    pub review: Review,
    pub author: String,
    pub product_name: String,
    pub not_helpful_votes: i64,
    pub media: Vec<ReviewMedia>,
    pub wear_test: Option<WearTest>,
}

impl ReviewEntry {
    pub fn helpful_percentage(&self) -> f64 {
        let total = self.review.helpful_votes + self.not_helpful_votes;
        if total == 0 {
            return 0.0;
        }
        self.review.helpful_votes as f64 * 100.0 / total as f64
    }
}

/// Validated review fields from the submission form.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewInput {
    pub title: String,
    pub body: String,
    pub rating: Rating,
    pub is_verified_purchase: bool,
    pub receipt: Option<String>,
    pub skin_type: Option<SkinType>,
    pub skin_tone: Option<SkinTone>,
    pub age_range: Option<AgeRange>,
    pub start_wear_test: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MediaInput {
    pub file: String,
    pub kind: MediaKind,
}

/// Everything one review submission writes, committed together.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewSubmission {
    pub review: ReviewInput,
    pub media: Vec<MediaInput>,
}

/// Fields an author may change after posting.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewEdit {
    pub title: String,
    pub body: String,
    pub rating: Rating,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratings_clamp_into_range() {
        assert_eq!(Rating::clamped(7).value(), 5);
        assert_eq!(Rating::clamped(0).value(), 1);
        assert_eq!(Rating::clamped(-40).value(), 1);
        assert_eq!(Rating::clamped(3).value(), 3);
    }

    #[test]
    fn star_string_is_five_wide() {
        assert_eq!(Rating::clamped(2).stars(), "★★☆☆☆");
    }
}
