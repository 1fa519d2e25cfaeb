mod accounts;
mod catalog;
mod reviews;

pub use accounts::SESSION_LIFETIME_DAYS;
pub use reviews::SubmitOutcome;

use rusqlite::{Connection, Error};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info};

use crate::models::product::SiteStats;

// Define a struct to represent a database connection
#[derive(Debug, Clone)]
pub struct Database {
    pub(crate) conn: Arc<Mutex<Connection>>,
}

impl Database {
    // Create a new database connection
    pub fn new(db_path: &str) -> Result<Self, Error> {
        let conn = Connection::open(db_path)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        info!("Database connection established at: {}", db_path);
        Ok(Database {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    // Create the database schema
    pub async fn create_schema(&self) -> Result<(), Error> {
        let conn = self.conn.lock().await;

        let tables = [
            (
                "users",
                "CREATE TABLE IF NOT EXISTS users (
                    id INTEGER PRIMARY KEY,
                    username TEXT NOT NULL UNIQUE,
                    password_hash TEXT NOT NULL,
                    date_joined TEXT NOT NULL
                );",
            ),
            (
                "sessions",
                "CREATE TABLE IF NOT EXISTS sessions (
                    token TEXT PRIMARY KEY,
                    user_id INTEGER NOT NULL,
                    created_at TEXT NOT NULL,
                    FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
                );",
            ),
            (
                "products",
                "CREATE TABLE IF NOT EXISTS products (
                    id INTEGER PRIMARY KEY,
                    brand TEXT NOT NULL,
                    name TEXT NOT NULL,
                    category TEXT NOT NULL,
                    price_cents INTEGER,
                    image_url TEXT NOT NULL DEFAULT '',
                    description TEXT NOT NULL DEFAULT '',
                    created_at TEXT NOT NULL
                );",
            ),
            (
                "reviews",
                "CREATE TABLE IF NOT EXISTS reviews (
                    id INTEGER PRIMARY KEY,
                    user_id INTEGER NOT NULL,
                    product_id INTEGER NOT NULL,
                    title TEXT NOT NULL,
                    body TEXT NOT NULL,
                    rating INTEGER NOT NULL CHECK (rating BETWEEN 1 AND 5),
                    is_verified_purchase INTEGER NOT NULL DEFAULT 0,
                    receipt TEXT,
                    helpful_votes INTEGER NOT NULL DEFAULT 0,
                    skin_type TEXT,
                    skin_tone TEXT,
                    age_range TEXT,
                    created_at TEXT NOT NULL,
                    updated_at TEXT NOT NULL,
                    UNIQUE (user_id, product_id),
                    FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE,
                    FOREIGN KEY (product_id) REFERENCES products(id) ON DELETE CASCADE
                );
                CREATE INDEX IF NOT EXISTS reviews_by_product
                    ON reviews (product_id, created_at);",
            ),
            (
                "review_media",
                "CREATE TABLE IF NOT EXISTS review_media (
                    id INTEGER PRIMARY KEY,
                    review_id INTEGER NOT NULL,
                    file TEXT NOT NULL,
                    kind TEXT NOT NULL,
                    FOREIGN KEY (review_id) REFERENCES reviews(id) ON DELETE CASCADE
                );",
            ),
            (
                "review_helpfulness",
                "CREATE TABLE IF NOT EXISTS review_helpfulness (
                    id INTEGER PRIMARY KEY,
                    review_id INTEGER NOT NULL,
                    user_id INTEGER NOT NULL,
                    is_helpful INTEGER NOT NULL,
                    created_at TEXT NOT NULL,
                    UNIQUE (review_id, user_id),
                    FOREIGN KEY (review_id) REFERENCES reviews(id) ON DELETE CASCADE,
                    FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
                );",
            ),
            (
                "wear_tests",
                "CREATE TABLE IF NOT EXISTS wear_tests (
                    review_id INTEGER PRIMARY KEY,
                    start_time TEXT NOT NULL,
                    end_time TEXT,
                    notes TEXT NOT NULL DEFAULT '',
                    FOREIGN KEY (review_id) REFERENCES reviews(id) ON DELETE CASCADE
                );",
            ),
        ];

        for (table, ddl) in tables {
            conn.execute_batch(ddl).map_err(|e| {
                error!("Failed creating {} table: {}", table, e);
                e
            })?;
        }
        Ok(())
    }

    /// Counters for the home and about pages.
    pub async fn site_stats(&self) -> Result<SiteStats, Error> {
        let conn = self.conn.lock().await;
        conn.query_row(
            "SELECT
                (SELECT COUNT(*) FROM products),
                (SELECT COUNT(*) FROM reviews),
                (SELECT COUNT(*) FROM users),
                (SELECT COUNT(DISTINCT user_id) FROM reviews)",
            [],
            |row| {
                Ok(SiteStats {
                    products: row.get(0)?,
                    reviews: row.get(1)?,
                    users: row.get(2)?,
                    active_reviewers: row.get(3)?,
                })
            },
        )
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::choices::Category;
    use crate::models::price::Price;
    use crate::models::product::ProductInput;
    use chrono::{DateTime, Utc};

    // Helper function to create test database
    pub(crate) async fn create_test_db() -> Database {
        let db = Database::new(":memory:").unwrap();
        db.create_schema().await.unwrap();
        db
    }

    pub(crate) async fn add_user(db: &Database, username: &str) -> i64 {
        db.create_user(username, "$pbkdf2-sha256$i=1,l=32$c2FsdA$ZGlnZXN0", Utc::now())
            .await
            .unwrap()
            .expect("username is free")
    }

    pub(crate) async fn add_product(
        db: &Database,
        name: &str,
        category: Category,
        price: Option<&str>,
        now: DateTime<Utc>,
    ) -> i64 {
        let input = ProductInput {
            brand: "Glow Co".into(),
            name: name.into(),
            category,
            price: price.map(|p| p.parse::<Price>().unwrap()),
            image_url: String::new(),
            description: String::new(),
        };
        db.create_product(&input, now).await.unwrap()
    }

    // Test database schema creation
    #[tokio::test]
    async fn test_schema_creation() {
        let db = create_test_db().await;

        let conn = db.conn.lock().await;
        let mut stmt = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table'")
            .unwrap();
        let tables: Vec<String> = stmt
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();

        for table in [
            "users",
            "sessions",
            "products",
            "reviews",
            "review_media",
            "review_helpfulness",
            "wear_tests",
        ] {
            assert!(tables.contains(&table.to_string()), "missing {table}");
        }
    }

    #[tokio::test]
    async fn test_schema_creation_is_idempotent() {
        let db = create_test_db().await;
        db.create_schema().await.unwrap();
    }

    #[tokio::test]
    async fn test_site_stats_count_active_reviewers_once() {
        let db = create_test_db().await;
        let now = Utc::now();
        let aria = add_user(&db, "aria").await;
        add_user(&db, "ben").await;
        let p1 = add_product(&db, "Lip Paint", Category::Lipstick, Some("25"), now).await;
        let p2 = add_product(&db, "Soft Matte", Category::Foundation, None, now).await;
        {
            let conn = db.conn.lock().await;
            for product in [p1, p2] {
                conn.execute(
                    "INSERT INTO reviews (user_id, product_id, title, body, rating, created_at, updated_at)
                     VALUES (?1, ?2, 't', 'b', 4, ?3, ?3)",
                    rusqlite::params![aria, product, now],
                )
                .unwrap();
            }
        }

        let stats = db.site_stats().await.unwrap();
        assert_eq!(
            stats,
            SiteStats {
                products: 2,
                reviews: 2,
                users: 2,
                active_reviewers: 1,
            }
        );
    }
}
