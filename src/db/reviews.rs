use chrono::{DateTime, Utc};
use rusqlite::{params, params_from_iter, types::Value, Connection, Error, OptionalExtension, Row};
use std::collections::HashMap;
use tracing::{debug, info, warn};

use super::Database;
use crate::models::page::{Page, PageRequest};
use crate::models::query::ReviewQuery;
use crate::models::review::{
    Rating, Review, ReviewEdit, ReviewEntry, ReviewMedia, ReviewSubmission, WearTest,
};

const REVIEW_COLUMNS: &str = "r.id, r.user_id, r.product_id, r.title, r.body, r.rating, \
     r.is_verified_purchase, r.receipt, r.helpful_votes, r.skin_type, r.skin_tone, r.age_range, \
     r.created_at, r.updated_at";

/// Columns after [`REVIEW_COLUMNS`] in every entry query.
const ENTRY_EXTRA_COLUMNS: &str = "u.username, p.brand || ' ' || p.name, \
     (SELECT COUNT(*) FROM review_helpfulness h WHERE h.review_id = r.id AND h.is_helpful = 0), \
     w.start_time, w.end_time, w.notes";

const ENTRY_JOINS: &str = "FROM reviews r
     JOIN users u ON u.id = r.user_id
     JOIN products p ON p.id = r.product_id
     LEFT JOIN wear_tests w ON w.review_id = r.id";

/// Result of a review submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Created(i64),
    AlreadyReviewed,
}

fn is_unique_violation(error: &Error) -> bool {
    matches!(
        error,
        Error::SqliteFailure(e, _) if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

fn review_from_row(row: &Row<'_>) -> Result<Review, Error> {
    Ok(Review {
        id: row.get(0)?,
        user_id: row.get(1)?,
        product_id: row.get(2)?,
        title: row.get(3)?,
        body: row.get(4)?,
        rating: Rating::clamped(row.get(5)?),
        is_verified_purchase: row.get(6)?,
        receipt: row.get(7)?,
        helpful_votes: row.get(8)?,
        skin_type: row.get(9)?,
        skin_tone: row.get(10)?,
        age_range: row.get(11)?,
        created_at: row.get(12)?,
        updated_at: row.get(13)?,
    })
}

fn entry_from_row(row: &Row<'_>) -> Result<ReviewEntry, Error> {
    let review = review_from_row(row)?;
    let start_time: Option<DateTime<Utc>> = row.get(17)?;
    let wear_test = match start_time {
        Some(start_time) => Some(WearTest {
            review_id: review.id,
            start_time,
            end_time: row.get(18)?,
            notes: row.get(19)?,
        }),
        None => None,
    };
    Ok(ReviewEntry {
        review,
        author: row.get(14)?,
        product_name: row.get(15)?,
        not_helpful_votes: row.get(16)?,
        media: Vec::new(),
        wear_test,
    })
}

/// Loads the media rows for the given reviews in one query and attaches them.
fn attach_media(conn: &Connection, entries: &mut [ReviewEntry]) -> Result<(), Error> {
    if entries.is_empty() {
        return Ok(());
    }
    let placeholders = vec!["?"; entries.len()].join(", ");
    let mut stmt = conn.prepare(&format!(
        "SELECT id, review_id, file, kind FROM review_media
         WHERE review_id IN ({placeholders}) ORDER BY id"
    ))?;
    let rows = stmt.query_map(
        params_from_iter(entries.iter().map(|e| e.review.id)),
        |row| {
            Ok(ReviewMedia {
                id: row.get(0)?,
                review_id: row.get(1)?,
                file: row.get(2)?,
                kind: row.get(3)?,
            })
        },
    )?;

    let mut by_review: HashMap<i64, Vec<ReviewMedia>> = HashMap::new();
    for media in rows {
        let media = media?;
        by_review.entry(media.review_id).or_default().push(media);
    }
    for entry in entries.iter_mut() {
        if let Some(media) = by_review.remove(&entry.review.id) {
            entry.media = media;
        }
    }
    Ok(())
}

impl Database {
    /// Writes the review, its media and the optional wear test in one transaction.
    pub async fn submit_review(
        &self,
        user_id: i64,
        product_id: i64,
        submission: &ReviewSubmission,
        now: DateTime<Utc>,
    ) -> Result<SubmitOutcome, Error> {
        let mut conn = self.conn.lock().await;
        let tx = conn.transaction()?;

        let existing: Option<i64> = tx
            .query_row(
                "SELECT id FROM reviews WHERE user_id = ? AND product_id = ?",
                [user_id, product_id],
                |row| row.get(0),
            )
            .optional()?;
        if existing.is_some() {
            debug!("User {} already reviewed product {}", user_id, product_id);
            return Ok(SubmitOutcome::AlreadyReviewed);
        }

        let review = &submission.review;
        let inserted = tx.execute(
            "INSERT INTO reviews (user_id, product_id, title, body, rating, is_verified_purchase,
                                  receipt, skin_type, skin_tone, age_range, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?11)",
            params![
                user_id,
                product_id,
                review.title,
                review.body,
                review.rating.value(),
                review.is_verified_purchase,
                review.receipt,
                review.skin_type,
                review.skin_tone,
                review.age_range,
                now
            ],
        );
        match inserted {
            Ok(_) => {}
            Err(e) if is_unique_violation(&e) => return Ok(SubmitOutcome::AlreadyReviewed),
            Err(e) => return Err(e),
        }
        let review_id = tx.last_insert_rowid();

        for media in &submission.media {
            tx.execute(
                "INSERT INTO review_media (review_id, file, kind) VALUES (?, ?, ?)",
                params![review_id, media.file, media.kind],
            )?;
        }

        if review.start_wear_test {
            tx.execute(
                "INSERT INTO wear_tests (review_id, start_time) VALUES (?, ?)",
                params![review_id, now],
            )?;
        }

        tx.commit()?;
        info!(
            "Review {} posted by user {} on product {} with {} media",
            review_id,
            user_id,
            product_id,
            submission.media.len()
        );
        Ok(SubmitOutcome::Created(review_id))
    }

    pub async fn get_review(&self, id: i64) -> Result<Option<Review>, Error> {
        let conn = self.conn.lock().await;
        conn.query_row(
            &format!("SELECT {REVIEW_COLUMNS} FROM reviews r WHERE r.id = ?"),
            [id],
            review_from_row,
        )
        .optional()
    }

    pub async fn user_review_for_product(
        &self,
        user_id: i64,
        product_id: i64,
    ) -> Result<Option<Review>, Error> {
        let conn = self.conn.lock().await;
        conn.query_row(
            &format!(
                "SELECT {REVIEW_COLUMNS} FROM reviews r WHERE r.user_id = ? AND r.product_id = ?"
            ),
            [user_id, product_id],
            review_from_row,
        )
        .optional()
    }

    pub async fn update_review(
        &self,
        id: i64,
        edit: &ReviewEdit,
        now: DateTime<Utc>,
    ) -> Result<bool, Error> {
        let conn = self.conn.lock().await;
        let changed = conn.execute(
            "UPDATE reviews SET title = ?, body = ?, rating = ?, updated_at = ? WHERE id = ?",
            params![edit.title, edit.body, edit.rating.value(), now, id],
        )?;
        Ok(changed > 0)
    }

    pub async fn delete_review(&self, id: i64) -> Result<bool, Error> {
        let conn = self.conn.lock().await;
        let changed = conn.execute("DELETE FROM reviews WHERE id = ?", [id])?;
        if changed > 0 {
            info!("Review deleted: {}", id);
        }
        Ok(changed > 0)
    }

    /// Records or overwrites a user's vote and recounts the review's helpful votes.
    /// Returns the new helpful count.
    pub async fn cast_vote(
        &self,
        review_id: i64,
        user_id: i64,
        is_helpful: bool,
        now: DateTime<Utc>,
    ) -> Result<i64, Error> {
        let mut conn = self.conn.lock().await;
        let tx = conn.transaction()?;

        tx.execute(
            "INSERT INTO review_helpfulness (review_id, user_id, is_helpful, created_at)
             VALUES (?, ?, ?, ?)
             ON CONFLICT(review_id, user_id) DO UPDATE SET
                is_helpful = excluded.is_helpful",
            params![review_id, user_id, is_helpful, now],
        )?;

        let helpful: i64 = tx.query_row(
            "SELECT COUNT(*) FROM review_helpfulness WHERE review_id = ? AND is_helpful = 1",
            [review_id],
            |row| row.get(0),
        )?;
        tx.execute(
            "UPDATE reviews SET helpful_votes = ? WHERE id = ?",
            [helpful, review_id],
        )?;

        tx.commit()?;
        debug!(
            "Vote by user {} on review {}: helpful={} (now {})",
            user_id, review_id, is_helpful, helpful
        );
        Ok(helpful)
    }

    /// Every review of a product, newest first, with attachments.
    pub async fn reviews_for_product(&self, product_id: i64) -> Result<Vec<ReviewEntry>, Error> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(&format!(
            "SELECT {REVIEW_COLUMNS}, {ENTRY_EXTRA_COLUMNS}
             {ENTRY_JOINS}
             WHERE r.product_id = ?
             ORDER BY r.created_at DESC, r.id DESC"
        ))?;
        let mut entries = stmt
            .query_map([product_id], entry_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        attach_media(&conn, &mut entries)?;
        Ok(entries)
    }

    pub async fn list_reviews(
        &self,
        product_id: i64,
        query: &ReviewQuery,
        page: PageRequest,
    ) -> Result<Page<ReviewEntry>, Error> {
        let conn = self.conn.lock().await;

        let mut clauses = vec!["r.product_id = ?"];
        let mut values = vec![Value::Integer(product_id)];
        if let Some(rating) = query.rating {
            clauses.push("r.rating = ?");
            values.push(Value::Integer(rating as i64));
        }
        if query.verified_only {
            clauses.push("r.is_verified_purchase = 1");
        }
        if let Some(skin_type) = query.skin_type {
            clauses.push("r.skin_type = ?");
            values.push(Value::Text(skin_type.code().to_string()));
        }
        let where_clause = clauses.join(" AND ");

        let total: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM reviews r WHERE {where_clause}"),
            params_from_iter(values.iter()),
            |row| row.get(0),
        )?;
        let (number, num_pages, offset) = page.resolve(total);
        values.push(Value::Integer(page.size));
        values.push(Value::Integer(offset));

        let mut stmt = conn.prepare(&format!(
            "SELECT {REVIEW_COLUMNS}, {ENTRY_EXTRA_COLUMNS}
             {ENTRY_JOINS}
             WHERE {where_clause}
             ORDER BY {}
             LIMIT ? OFFSET ?",
            query.sort.order_by()
        ))?;
        let mut items = stmt
            .query_map(params_from_iter(values.iter()), entry_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        attach_media(&conn, &mut items)?;

        Ok(Page {
            items,
            number,
            num_pages,
            total,
        })
    }

    /// A user's own reviews for the profile page.
    pub async fn reviews_by_user(
        &self,
        user_id: i64,
        page: PageRequest,
    ) -> Result<Page<ReviewEntry>, Error> {
        let conn = self.conn.lock().await;
        let total: i64 = conn.query_row(
            "SELECT COUNT(*) FROM reviews WHERE user_id = ?",
            [user_id],
            |row| row.get(0),
        )?;
        let (number, num_pages, offset) = page.resolve(total);

        let mut stmt = conn.prepare(&format!(
            "SELECT {REVIEW_COLUMNS}, {ENTRY_EXTRA_COLUMNS}
             {ENTRY_JOINS}
             WHERE r.user_id = ?
             ORDER BY r.created_at DESC, r.id DESC
             LIMIT ? OFFSET ?"
        ))?;
        let mut items = stmt
            .query_map([user_id, page.size, offset], entry_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        attach_media(&conn, &mut items)?;

        Ok(Page {
            items,
            number,
            num_pages,
            total,
        })
    }

    /// (review count, average rating) for a user; the average is 0 without reviews.
    pub async fn user_review_stats(&self, user_id: i64) -> Result<(i64, f64), Error> {
        let conn = self.conn.lock().await;
        conn.query_row(
            "SELECT COUNT(*), COALESCE(AVG(rating), 0.0) FROM reviews WHERE user_id = ?",
            [user_id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .map_err(|e| {
            warn!("Failed to load review stats for user {}: {}", user_id, e);
            e
        })
    }
}
