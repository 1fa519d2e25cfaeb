//! Cookie-backed identity and one-shot flash messages.
use actix_web::{
    cookie::{time::Duration, Cookie, SameSite},
    dev::Payload,
    web, FromRequest, HttpRequest,
};
use chrono::Utc;
use futures::future::{ready, LocalBoxFuture, Ready};
use std::convert::Infallible;
use tracing::warn;

use crate::config::Config;
use crate::db::SESSION_LIFETIME_DAYS;
use crate::error::AppError;
use crate::models::user::User;
use crate::state::AppState;

pub const SESSION_COOKIE: &str = "glow_session";
pub const FLASH_COOKIE: &str = "glow_flash";

/// The logged-in user, if any.
pub struct Viewer(pub Option<User>);

/// A logged-in user; extraction fails with a redirect to the login page.
pub struct AuthUser(pub User);

/// The pending flash message, if one was set by the previous response.
pub struct Flash(pub Option<String>);

fn load_user(req: &HttpRequest) -> LocalBoxFuture<'static, Result<Option<User>, AppError>> {
    let state = req.app_data::<web::Data<AppState>>().cloned();
    let token = req.cookie(SESSION_COOKIE).map(|c| c.value().to_string());

    Box::pin(async move {
        let state = state.ok_or_else(|| AppError::Internal("application state missing".into()))?;
        match token {
            Some(token) => Ok(state.db.user_for_session(&token, Utc::now()).await?),
            None => Ok(None),
        }
    })
}

impl FromRequest for Viewer {
    type Error = AppError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let user = load_user(req);
        Box::pin(async move { user.await.map(Viewer) })
    }
}

impl FromRequest for AuthUser {
    type Error = AppError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let next = req
            .uri()
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| req.path().to_string());
        let user = load_user(req);

        Box::pin(async move {
            match user.await? {
                Some(user) => Ok(AuthUser(user)),
                None => Err(AppError::login_required(&next)),
            }
        })
    }
}

impl FromRequest for Flash {
    type Error = Infallible;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let message = req.cookie(FLASH_COOKIE).and_then(|c| {
            urlencoding::decode(c.value())
                .map(|m| m.into_owned())
                .map_err(|e| warn!("Discarding undecodable flash cookie: {e}"))
                .ok()
        });
        ready(Ok(Flash(message)))
    }
}

pub fn session_cookie(config: &Config, token: String) -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE, token)
        .path("/")
        .max_age(Duration::days(SESSION_LIFETIME_DAYS))
        .http_only(true)
        .secure(config.secure_cookies)
        .same_site(SameSite::Lax)
        .finish()
}

pub fn flash_cookie(config: &Config, message: &str) -> Cookie<'static> {
    Cookie::build(FLASH_COOKIE, urlencoding::encode(message).into_owned())
        .path("/")
        .http_only(true)
        .secure(config.secure_cookies)
        .same_site(SameSite::Lax)
        .finish()
}

/// A cookie that tells the browser to drop `name`.
pub fn removal_cookie(name: &'static str) -> Cookie<'static> {
    let mut cookie = Cookie::build(name, "").path("/").finish();
    cookie.make_removal();
    cookie
}
