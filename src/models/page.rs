use serde::Serialize;
use std::collections::HashMap;

pub const PRODUCTS_PER_PAGE: i64 = 12;
pub const REVIEWS_PER_PAGE: i64 = 10;

/// The page a listing was asked for, before it is reconciled with the row count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub number: i64,
    pub size: i64,
}

impl PageRequest {
    pub fn new(number: i64, size: i64) -> Self {
        Self {
            number: number.max(1),
            size: size.max(1),
        }
    }

    /// Reads `page` from a query string; anything unparsable means page 1.
    pub fn from_params(params: &HashMap<String, String>, size: i64) -> Self {
        let number = params
            .get("page")
            .and_then(|p| p.trim().parse::<i64>().ok())
            .unwrap_or(1);
        Self::new(number, size)
    }

    /// Clamps the request to the last existing page and returns (page number, page count, offset).
    pub fn resolve(self, total: i64) -> (i64, i64, i64) {
        let num_pages = ((total + self.size - 1) / self.size).max(1);
        let number = self.number.min(num_pages);
        (number, num_pages, (number - 1) * self.size)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub number: i64,
    pub num_pages: i64,
    pub total: i64,
}

impl<T> Page<T> {
    pub fn has_previous(&self) -> bool {
        self.number > 1
    }

    pub fn has_next(&self) -> bool {
        self.number < self.num_pages
    }
}

/// Re-encodes the current query string without `page`, for pagination links.
pub fn query_without_page(params: &HashMap<String, String>) -> String {
    let mut pairs: Vec<(&String, &String)> = params
        .iter()
        .filter(|(k, v)| k.as_str() != "page" && !v.is_empty())
        .collect();
    pairs.sort();
    pairs
        .into_iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}
