use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::choices::Category;
use super::price::Price;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Product {
    pub id: i64,
    pub brand: String,
    pub name: String,
    pub category: Category,
    pub price: Option<Price>,
    pub image_url: String,   // product card image
    pub description: String,
    pub created_at: DateTime<Utc>,
}

impl Product {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.brand, self.name)
    }
}

/// Validated fields for creating or updating a product.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductInput {
    pub brand: String,
    pub name: String,
    pub category: Category,
    pub price: Option<Price>,
    pub image_url: String,
    pub description: String,
}

/// A catalog row annotated with its review aggregate.
#[derive(Serialize, Debug, Clone)]
pub struct ProductSummary {
    pub product: Product,
    pub avg_rating: f64,
    pub review_count: i64,
}

#[derive(Serialize, Debug, Clone)]
pub struct TrendingProduct {
    pub product: Product,
    pub review_count: i64,
    pub recent_reviews: i64,
    pub avg_rating: f64,
    pub recent_avg: f64,
    pub rating_delta: f64,
    pub trending_score: f64,
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct RatingBucket {
    pub rating: u8,
    pub count: i64,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ProductStats {
    pub average_rating: f64,
    pub review_count: i64,
    /// One bucket per star value, 1 through 5.
    pub distribution: Vec<RatingBucket>,
}

impl ProductStats {
    pub fn share(&self, bucket: &RatingBucket) -> f64 {
        if self.review_count == 0 {
            0.0
        } else {
            bucket.count as f64 * 100.0 / self.review_count as f64
        }
    }
}

/// Site-wide counters shown on the home and about pages.
#[derive(Serialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SiteStats {
    pub products: i64,
    pub reviews: i64,
    pub users: i64,
    pub active_reviewers: i64,
}
