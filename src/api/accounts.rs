use actix_web::{web, HttpRequest, HttpResponse};
use chrono::Utc;
use leptos::*;
use tracing::{info, warn};

use super::{html_page, redirect, resolve_media, Params, Submitted};
use crate::components::accounts::{LoginPage, ProfileContext, ProfilePage, SignUpPage};
use crate::error::AppError;
use crate::forms::account::{safe_next, LoginForm, SignUpForm};
use crate::forms::FormData;
use crate::models::page::{PageRequest, REVIEWS_PER_PAGE};
use crate::models::user::{hash_password, verify_password, User};
use crate::session::{removal_cookie, session_cookie, AuthUser, Flash, Viewer, SESSION_COOKIE};
use crate::state::AppState;

/// Opens a session for `user_id` and sends them on to `next`.
async fn log_in(state: &AppState, user_id: i64, next: &str) -> Result<HttpResponse, AppError> {
    let token = state.db.create_session(user_id, Utc::now()).await?;
    let mut response = redirect(next);
    response
        .add_cookie(&session_cookie(&state.config, token))
        .map_err(|e| AppError::Internal(format!("could not set session cookie: {e}")))?;
    Ok(response)
}

fn signup_page(viewer: Option<User>, flash: Option<String>, form: SignUpForm, next: String) -> HttpResponse {
    html_page("Sign up", viewer, flash, move || {
        view! { <SignUpPage form=form next=next/> }
    })
}

fn login_page(viewer: Option<User>, flash: Option<String>, form: LoginForm, next: String) -> HttpResponse {
    html_page("Log in", viewer, flash, move || {
        view! { <LoginPage form=form next=next/> }
    })
}

pub async fn signup_form(
    Viewer(viewer): Viewer,
    Flash(flash): Flash,
    params: Params,
) -> HttpResponse {
    let next = safe_next(params.get("next").map(String::as_str));
    signup_page(viewer, flash, SignUpForm::default(), next)
}

pub async fn signup(
    state: web::Data<AppState>,
    form: Submitted,
) -> Result<HttpResponse, AppError> {
    let data = FormData::from(form.into_inner());
    let next = safe_next(data.get("next"));
    let mut signup_form = SignUpForm::bind(&data);

    if let Some(signup) = signup_form.clean() {
        if state.db.username_taken(&signup.username).await? {
            signup_form.reject_taken_username();
        } else {
            let hash = hash_password(&signup.password)
                .map_err(|e| AppError::Internal(format!("could not hash password: {e}")))?;
            match state
                .db
                .create_user(&signup.username, &hash, Utc::now())
                .await?
            {
                Some(user_id) => return log_in(&state, user_id, &next).await,
                // Lost a race with a concurrent signup.
                None => signup_form.reject_taken_username(),
            }
        }
    }

    Ok(signup_page(None, None, signup_form, next))
}

pub async fn login_form(
    Viewer(viewer): Viewer,
    Flash(flash): Flash,
    params: Params,
) -> HttpResponse {
    let next = safe_next(params.get("next").map(String::as_str));
    login_page(viewer, flash, LoginForm::default(), next)
}

pub async fn login(
    state: web::Data<AppState>,
    form: Submitted,
) -> Result<HttpResponse, AppError> {
    let data = FormData::from(form.into_inner());
    let next = safe_next(data.get("next"));
    let mut login_form = LoginForm::bind(&data);

    if login_form.clean() {
        match state.db.find_credentials(&login_form.username).await? {
            Some((user, hash)) if verify_password(&login_form.password, &hash) => {
                info!("{} logged in", user.username);
                return log_in(&state, user.id, &next).await;
            }
            _ => {
                warn!("Failed login for {}", login_form.username);
                login_form.reject_credentials();
            }
        }
    }

    Ok(login_page(None, None, login_form, next))
}

pub async fn logout(
    state: web::Data<AppState>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    if let Some(cookie) = req.cookie(SESSION_COOKIE) {
        state.db.delete_session(cookie.value()).await?;
    }
    let mut response = redirect("/login/");
    response
        .add_cookie(&removal_cookie(SESSION_COOKIE))
        .map_err(|e| AppError::Internal(format!("could not clear session cookie: {e}")))?;
    Ok(response)
}

pub async fn profile(
    state: web::Data<AppState>,
    AuthUser(user): AuthUser,
    Flash(flash): Flash,
    params: Params,
) -> Result<HttpResponse, AppError> {
    let mut page = state
        .db
        .reviews_by_user(user.id, PageRequest::from_params(&params, REVIEWS_PER_PAGE))
        .await?;
    resolve_media(&state.config, &mut page.items);
    let (total_reviews, average_rating) = state.db.user_review_stats(user.id).await?;

    let ctx = ProfileContext {
        user: user.clone(),
        page,
        total_reviews,
        average_rating,
    };
    Ok(html_page("Your profile", Some(user), flash, move || {
        view! { <ProfilePage ctx=ctx/> }
    }))
}
