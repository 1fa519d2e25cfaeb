//! Listing filters parsed from query strings.
//!
//! Parsing never fails: values that do not parse are dropped and the
//! listing falls back to its default for that parameter.
use std::collections::HashMap;

use super::choices::{Category, SkinType};
use super::price::Price;

pub const DEFAULT_TRENDING_DAYS: i64 = 30;
pub const MIN_TRENDING_DAYS: i64 = 1;
pub const MAX_TRENDING_DAYS: i64 = 90;
pub const TRENDING_DAY_OPTIONS: [i64; 4] = [7, 14, 30, 60];

fn param<'a>(params: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    params
        .get(key)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrowseSort {
    Newest,
    Rating,
    Reviewed,
    PriceAsc,
    PriceDesc,
    Name,
}

impl BrowseSort {
    pub const ALL: [BrowseSort; 6] = [
        BrowseSort::Rating,
        BrowseSort::Newest,
        BrowseSort::Reviewed,
        BrowseSort::PriceAsc,
        BrowseSort::PriceDesc,
        BrowseSort::Name,
    ];

    /// Missing means "rating"; anything unrecognized means "newest".
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            None => BrowseSort::Rating,
            Some("newest") => BrowseSort::Newest,
            Some("rating") => BrowseSort::Rating,
            Some("reviewed") => BrowseSort::Reviewed,
            Some("price_asc") => BrowseSort::PriceAsc,
            Some("price_desc") => BrowseSort::PriceDesc,
            Some("name") => BrowseSort::Name,
            Some(_) => BrowseSort::Newest,
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            BrowseSort::Newest => "newest",
            BrowseSort::Rating => "rating",
            BrowseSort::Reviewed => "reviewed",
            BrowseSort::PriceAsc => "price_asc",
            BrowseSort::PriceDesc => "price_desc",
            BrowseSort::Name => "name",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            BrowseSort::Newest => "Newest",
            BrowseSort::Rating => "Top rated",
            BrowseSort::Reviewed => "Most reviewed",
            BrowseSort::PriceAsc => "Price: low to high",
            BrowseSort::PriceDesc => "Price: high to low",
            BrowseSort::Name => "Name",
        }
    }

    pub(crate) fn order_by(self) -> &'static str {
        match self {
            BrowseSort::Newest => "p.id DESC",
            BrowseSort::Rating => "avg_rating DESC, p.id DESC",
            BrowseSort::Reviewed => "reviews_count DESC, p.id DESC",
            BrowseSort::PriceAsc => "p.price_cents IS NULL, p.price_cents ASC, p.id DESC",
            BrowseSort::PriceDesc => "p.price_cents IS NULL, p.price_cents DESC, p.id DESC",
            BrowseSort::Name => "p.name ASC, p.id DESC",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BrowseQuery {
    pub q: Option<String>,
    pub category: Option<Category>,
    pub min_price: Option<Price>,
    pub max_price: Option<Price>,
    pub sort: BrowseSort,
}

impl Default for BrowseQuery {
    fn default() -> Self {
        Self {
            q: None,
            category: None,
            min_price: None,
            max_price: None,
            sort: BrowseSort::Rating,
        }
    }
}

impl BrowseQuery {
    pub fn from_params(params: &HashMap<String, String>) -> Self {
        Self {
            q: param(params, "q").map(str::to_string),
            category: param(params, "category").and_then(|c| c.parse().ok()),
            min_price: param(params, "min").and_then(|p| p.parse().ok()),
            max_price: param(params, "max").and_then(|p| p.parse().ok()),
            sort: BrowseSort::parse(param(params, "sort")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrendingQuery {
    pub days: i64,
    pub category: Option<Category>,
}

impl Default for TrendingQuery {
    fn default() -> Self {
        Self {
            days: DEFAULT_TRENDING_DAYS,
            category: None,
        }
    }
}

impl TrendingQuery {
    pub fn from_params(params: &HashMap<String, String>) -> Self {
        let days = param(params, "days")
            .and_then(|d| d.parse::<i64>().ok())
            .unwrap_or(DEFAULT_TRENDING_DAYS);
        Self {
            days: days.clamp(MIN_TRENDING_DAYS, MAX_TRENDING_DAYS),
            category: param(params, "category").and_then(|c| c.parse().ok()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewSort {
    Newest,
    Oldest,
    HighestRating,
    LowestRating,
    MostHelpful,
}

impl ReviewSort {
    pub const ALL: [ReviewSort; 5] = [
        ReviewSort::Newest,
        ReviewSort::Oldest,
        ReviewSort::HighestRating,
        ReviewSort::LowestRating,
        ReviewSort::MostHelpful,
    ];

    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("oldest") => ReviewSort::Oldest,
            Some("highest_rating") => ReviewSort::HighestRating,
            Some("lowest_rating") => ReviewSort::LowestRating,
            Some("most_helpful") => ReviewSort::MostHelpful,
            _ => ReviewSort::Newest,
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            ReviewSort::Newest => "newest",
            ReviewSort::Oldest => "oldest",
            ReviewSort::HighestRating => "highest_rating",
            ReviewSort::LowestRating => "lowest_rating",
            ReviewSort::MostHelpful => "most_helpful",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ReviewSort::Newest => "Newest",
            ReviewSort::Oldest => "Oldest",
            ReviewSort::HighestRating => "Highest rating",
            ReviewSort::LowestRating => "Lowest rating",
            ReviewSort::MostHelpful => "Most helpful",
        }
    }

    pub(crate) fn order_by(self) -> &'static str {
        match self {
            ReviewSort::Newest => "r.created_at DESC, r.id DESC",
            ReviewSort::Oldest => "r.created_at ASC, r.id ASC",
            ReviewSort::HighestRating => "r.rating DESC, r.created_at DESC, r.id DESC",
            ReviewSort::LowestRating => "r.rating ASC, r.created_at DESC, r.id DESC",
            ReviewSort::MostHelpful => "r.helpful_votes DESC, r.created_at DESC, r.id DESC",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReviewQuery {
    pub rating: Option<u8>,
    pub verified_only: bool,
    pub skin_type: Option<SkinType>,
    pub sort: ReviewSort,
}

impl Default for ReviewQuery {
    fn default() -> Self {
        Self {
            rating: None,
            verified_only: false,
            skin_type: None,
            sort: ReviewSort::Newest,
        }
    }
}

impl ReviewQuery {
    pub fn from_params(params: &HashMap<String, String>) -> Self {
        Self {
            rating: param(params, "rating")
                .and_then(|r| r.parse::<u8>().ok())
                .filter(|r| (1..=5).contains(r)),
            verified_only: param(params, "verified") == Some("true"),
            skin_type: param(params, "skin_type").and_then(|s| s.parse().ok()),
            sort: ReviewSort::parse(param(params, "sort")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn browse_sort_defaults() {
        assert_eq!(BrowseQuery::from_params(&params(&[])).sort, BrowseSort::Rating);
        assert_eq!(
            BrowseQuery::from_params(&params(&[("sort", "cheapest")])).sort,
            BrowseSort::Newest
        );
        assert_eq!(
            BrowseQuery::from_params(&params(&[("sort", "price_desc")])).sort,
            BrowseSort::PriceDesc
        );
    }

    #[test]
    fn browse_ignores_unparsable_filters() {
        let query = BrowseQuery::from_params(&params(&[
            ("min", "cheap"),
            ("max", "30"),
            ("category", "perfume"),
            ("q", "  "),
        ]));
        assert_eq!(query.min_price, None);
        assert_eq!(query.max_price.map(Price::cents), Some(3000));
        assert_eq!(query.category, None);
        assert_eq!(query.q, None);
    }

    #[test]
    fn trending_days_are_clamped() {
        assert_eq!(TrendingQuery::from_params(&params(&[])).days, 30);
        assert_eq!(TrendingQuery::from_params(&params(&[("days", "365")])).days, 90);
        assert_eq!(TrendingQuery::from_params(&params(&[("days", "0")])).days, 1);
        assert_eq!(TrendingQuery::from_params(&params(&[("days", "soon")])).days, 30);
    }

    #[test]
    fn review_filters() {
        let query = ReviewQuery::from_params(&params(&[
            ("rating", "9"),
            ("verified", "true"),
            ("skin_type", "oily"),
            ("sort", "most_helpful"),
        ]));
        assert_eq!(query.rating, None);
        assert!(query.verified_only);
        assert_eq!(query.skin_type, Some(SkinType::Oily));
        assert_eq!(query.sort, ReviewSort::MostHelpful);
    }
}
