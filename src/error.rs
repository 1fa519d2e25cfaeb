use actix_web::{
    http::{header, StatusCode},
    HttpResponse, ResponseError,
};
use thiserror::Error;
use tracing::error;

use crate::components::pages::render_error_page;
use crate::config::ConfigError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found")]
    NotFound,

    #[error("You do not have permission to do that")]
    Forbidden,

    #[error("Login required")]
    LoginRequired { next: String },

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn login_required(path_and_query: &str) -> Self {
        AppError::LoginRequired {
            next: path_and_query.to_string(),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::LoginRequired { .. } => StatusCode::FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Database(_) | AppError::Config(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let message = match self {
            AppError::LoginRequired { next } => {
                let location = format!("/login/?next={}", urlencoding::encode(next));
                return HttpResponse::Found()
                    .insert_header((header::LOCATION, location))
                    .finish();
            }
            AppError::Database(_) | AppError::Config(_) | AppError::Internal(_) => {
                error!("request failed: {self}");
                "Something went wrong on our side. Please try again later.".to_string()
            }
            other => other.to_string(),
        };

        HttpResponse::build(status)
            .content_type("text/html; charset=utf-8")
            .body(render_error_page(status.as_u16(), message))
    }
}
