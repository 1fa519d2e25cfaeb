use tracing::info;

use crate::config::Config;
use crate::db::Database;
use crate::error::AppError;

/// Shared by every worker through `web::Data`.
pub struct AppState {
    pub db: Database,
    pub config: Config,
}

impl AppState {
    pub async fn new(config: Config) -> Result<Self, AppError> {
        let db = Database::new(&config.database_path)?;
        db.create_schema().await?;
        info!("Schema ready at {}", config.database_path);
        Ok(Self { db, config })
    }
}
