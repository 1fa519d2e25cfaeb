//! Catalog listings and their review aggregates.
//!
//! Every listing is one grouped query over `products LEFT JOIN reviews`
//! plus one `COUNT(*)` for pagination, so the cost does not grow with the
//! number of products on a page.
use chrono::{DateTime, Duration, Utc};
use rusqlite::{params, params_from_iter, types::Value, Error, OptionalExtension, Row};
use tracing::{debug, info};

use super::Database;
use crate::models::page::{Page, PageRequest};
use crate::models::product::{
    Product, ProductInput, ProductStats, ProductSummary, RatingBucket, TrendingProduct,
};
use crate::models::query::{BrowseQuery, BrowseSort, TrendingQuery};

pub(crate) const PRODUCT_COLUMNS: &str =
    "p.id, p.brand, p.name, p.category, p.price_cents, p.image_url, p.description, p.created_at";

// Trending weights: review velocity dominates quality and quality improvement.
const RECENT_COUNT_WEIGHT: f64 = 0.7;
const RECENT_AVG_WEIGHT: f64 = 0.2;
const RECENT_AVG_SCALE: f64 = 5.0;
const DELTA_WEIGHT: f64 = 0.1;
const DELTA_SCALE: f64 = 10.0;

pub(crate) fn product_from_row(row: &Row<'_>) -> Result<Product, Error> {
    Ok(Product {
        id: row.get(0)?,
        brand: row.get(1)?,
        name: row.get(2)?,
        category: row.get(3)?,
        price: row.get(4)?,
        image_url: row.get(5)?,
        description: row.get(6)?,
        created_at: row.get(7)?,
    })
}

fn summary_from_row(row: &Row<'_>) -> Result<ProductSummary, Error> {
    Ok(ProductSummary {
        product: product_from_row(row)?,
        avg_rating: row.get(8)?,
        review_count: row.get(9)?,
    })
}

/// `LIKE` pattern matching `needle` anywhere, with wildcards in the needle escaped.
fn contains_pattern(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len() + 2);
    escaped.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

fn browse_filters(query: &BrowseQuery) -> (String, Vec<Value>) {
    let mut clauses = Vec::new();
    let mut values = Vec::new();

    if let Some(q) = &query.q {
        clauses.push(
            "(p.name LIKE ? ESCAPE '\\' OR p.brand LIKE ? ESCAPE '\\' OR p.category LIKE ? ESCAPE '\\')",
        );
        let pattern = contains_pattern(q);
        for _ in 0..3 {
            values.push(Value::Text(pattern.clone()));
        }
    }
    if let Some(category) = query.category {
        clauses.push("p.category = ?");
        values.push(Value::Text(category.code().to_string()));
    }
    if let Some(min) = query.min_price {
        clauses.push("p.price_cents >= ?");
        values.push(Value::Integer(min.cents()));
    }
    if let Some(max) = query.max_price {
        clauses.push("p.price_cents <= ?");
        values.push(Value::Integer(max.cents()));
    }

    let where_clause = if clauses.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", clauses.join(" AND "))
    };
    (where_clause, values)
}

impl Database {
    /// Home page listing: newest products first.
    pub async fn list_products(&self, page: PageRequest) -> Result<Page<ProductSummary>, Error> {
        let query = BrowseQuery {
            sort: BrowseSort::Newest,
            ..BrowseQuery::default()
        };
        self.browse_products(&query, page).await
    }

    pub async fn browse_products(
        &self,
        query: &BrowseQuery,
        page: PageRequest,
    ) -> Result<Page<ProductSummary>, Error> {
        let conn = self.conn.lock().await;
        let (where_clause, mut values) = browse_filters(query);

        let total: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM products p {where_clause}"),
            params_from_iter(values.iter()),
            |row| row.get(0),
        )?;
        let (number, num_pages, offset) = page.resolve(total);

        let sql = format!(
            "SELECT {PRODUCT_COLUMNS},
                    COALESCE(AVG(r.rating), 0.0) AS avg_rating,
                    COUNT(r.id) AS reviews_count
             FROM products p
             LEFT JOIN reviews r ON r.product_id = p.id
             {where_clause}
             GROUP BY p.id
             ORDER BY {}
             LIMIT ? OFFSET ?",
            query.sort.order_by()
        );
        values.push(Value::Integer(page.size));
        values.push(Value::Integer(offset));

        let mut stmt = conn.prepare(&sql)?;
        let items = stmt
            .query_map(params_from_iter(values.iter()), summary_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        debug!(
            "Browse {:?} matched {} products, page {}/{}",
            query, total, number, num_pages
        );
        Ok(Page {
            items,
            number,
            num_pages,
            total,
        })
    }

    /// Ranks products by recent review velocity and rating improvement within `query.days`.
    pub async fn trending_products(
        &self,
        query: &TrendingQuery,
        now: DateTime<Utc>,
        page: PageRequest,
    ) -> Result<Page<TrendingProduct>, Error> {
        let conn = self.conn.lock().await;
        let since = now - Duration::days(query.days);
        let category = query.category.map(|c| c.code());

        let total: i64 = conn.query_row(
            "SELECT COUNT(*) FROM products p WHERE (?1 IS NULL OR p.category = ?1)",
            params![category],
            |row| row.get(0),
        )?;
        let (number, num_pages, offset) = page.resolve(total);

        let sql = format!(
            "WITH stats AS (
                SELECT p.id AS product_id,
                       COUNT(r.id) AS reviews_count,
                       SUM(CASE WHEN r.created_at >= ?1 THEN 1 ELSE 0 END) AS recent_reviews,
                       COALESCE(AVG(r.rating), 0.0) AS avg_rating,
                       COALESCE(AVG(CASE WHEN r.created_at >= ?1 THEN r.rating END), 0.0) AS recent_avg
                FROM products p
                LEFT JOIN reviews r ON r.product_id = p.id
                WHERE (?2 IS NULL OR p.category = ?2)
                GROUP BY p.id
            ),
            deltas AS (
                SELECT s.*, MAX(s.recent_avg - s.avg_rating, 0.0) AS rating_delta
                FROM stats s
            )
            SELECT {PRODUCT_COLUMNS},
                   d.reviews_count, d.recent_reviews, d.avg_rating, d.recent_avg, d.rating_delta,
                   ({RECENT_COUNT_WEIGHT} * d.recent_reviews
                    + {RECENT_AVG_WEIGHT} * d.recent_avg * {RECENT_AVG_SCALE}
                    + {DELTA_WEIGHT} * d.rating_delta * {DELTA_SCALE}) AS trending_score
            FROM deltas d
            JOIN products p ON p.id = d.product_id
            ORDER BY trending_score DESC, d.recent_reviews DESC, p.id DESC
            LIMIT ?3 OFFSET ?4"
        );

        let mut stmt = conn.prepare(&sql)?;
        let items = stmt
            .query_map(params![since, category, page.size, offset], |row| {
                Ok(TrendingProduct {
                    product: product_from_row(row)?,
                    review_count: row.get(8)?,
                    recent_reviews: row.get(9)?,
                    avg_rating: row.get(10)?,
                    recent_avg: row.get(11)?,
                    rating_delta: row.get(12)?,
                    trending_score: row.get(13)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Page {
            items,
            number,
            num_pages,
            total,
        })
    }

    pub async fn get_product(&self, id: i64) -> Result<Option<Product>, Error> {
        let conn = self.conn.lock().await;
        conn.query_row(
            &format!("SELECT {PRODUCT_COLUMNS} FROM products p WHERE p.id = ?"),
            [id],
            product_from_row,
        )
        .optional()
    }

    pub async fn product_stats(&self, product_id: i64) -> Result<ProductStats, Error> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(
            "SELECT rating, COUNT(*) FROM reviews WHERE product_id = ? GROUP BY rating",
        )?;
        let mut distribution: Vec<RatingBucket> = (1..=5)
            .map(|rating| RatingBucket { rating, count: 0 })
            .collect();
        let rows = stmt.query_map([product_id], |row| {
            Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?))
        })?;
        let mut review_count = 0;
        let mut rating_sum = 0;
        for row in rows {
            let (rating, count) = row?;
            review_count += count;
            rating_sum += rating * count;
            if let Some(bucket) = distribution.iter_mut().find(|b| b.rating as i64 == rating) {
                bucket.count = count;
            }
        }

        Ok(ProductStats {
            average_rating: if review_count == 0 {
                0.0
            } else {
                rating_sum as f64 / review_count as f64
            },
            review_count,
            distribution,
        })
    }

    pub async fn create_product(
        &self,
        input: &ProductInput,
        now: DateTime<Utc>,
    ) -> Result<i64, Error> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO products (brand, name, category, price_cents, image_url, description, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
            params![
                input.brand,
                input.name,
                input.category,
                input.price,
                input.image_url,
                input.description,
                now
            ],
        )?;
        let id = conn.last_insert_rowid();
        info!("Product created: {} ({} {})", id, input.brand, input.name);
        Ok(id)
    }

    /// Returns false when the product does not exist.
    pub async fn update_product(&self, id: i64, input: &ProductInput) -> Result<bool, Error> {
        let conn = self.conn.lock().await;
        let changed = conn.execute(
            "UPDATE products
             SET brand = ?, name = ?, category = ?, price_cents = ?, image_url = ?, description = ?
             WHERE id = ?",
            params![
                input.brand,
                input.name,
                input.category,
                input.price,
                input.image_url,
                input.description,
                id
            ],
        )?;
        Ok(changed > 0)
    }

    /// Deletes the product and, through cascades, its reviews and their votes, media and wear tests.
    pub async fn delete_product(&self, id: i64) -> Result<bool, Error> {
        let conn = self.conn.lock().await;
        let changed = conn.execute("DELETE FROM products WHERE id = ?", [id])?;
        if changed > 0 {
            info!("Product deleted: {}", id);
        }
        Ok(changed > 0)
    }
}
