use actix_web::{web, HttpResponse};
use chrono::Utc;
use leptos::*;
use tracing::{info, warn};

use super::{html_page, redirect, redirect_with_flash, resolve_media, Params, Submitted};
use crate::components::catalog::{ConfirmDeleteContext, ConfirmDeletePage};
use crate::components::reviews::{
    ReviewEditContext, ReviewEditPage, ReviewFormContext, ReviewFormPage, ReviewListContext,
    ReviewListPage,
};
use crate::db::SubmitOutcome;
use crate::error::AppError;
use crate::forms::review::{helpful_vote, MediaFormSet, ReviewEditForm, ReviewForm};
use crate::forms::FormData;
use crate::models::page::{query_without_page, PageRequest, REVIEWS_PER_PAGE};
use crate::models::product::Product;
use crate::models::query::ReviewQuery;
use crate::models::review::{Review, ReviewSubmission};
use crate::models::user::User;
use crate::session::{AuthUser, Flash, Viewer};
use crate::state::AppState;

const REVIEW_POSTED: &str = "Thanks! Your review has been posted.";
const ALREADY_REVIEWED: &str = "You have already reviewed this product.";

fn review_form_page(
    user: User,
    product: Product,
    form: ReviewForm,
    media: MediaFormSet,
) -> HttpResponse {
    let title = format!("Review {}", product.display_name());
    let ctx = ReviewFormContext {
        product,
        form,
        media,
    };
    html_page(&title, Some(user), None, move || {
        view! { <ReviewFormPage ctx=ctx/> }
    })
}

pub async fn new_review(
    state: web::Data<AppState>,
    AuthUser(user): AuthUser,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let product_id = path.into_inner();
    let product = state
        .db
        .get_product(product_id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(review_form_page(
        user,
        product,
        ReviewForm::default(),
        MediaFormSet::default(),
    ))
}

pub async fn create_review(
    state: web::Data<AppState>,
    AuthUser(user): AuthUser,
    path: web::Path<i64>,
    form: Submitted,
) -> Result<HttpResponse, AppError> {
    let product_id = path.into_inner();
    let product = state
        .db
        .get_product(product_id)
        .await?
        .ok_or(AppError::NotFound)?;

    let data = FormData::from(form.into_inner());
    let mut review_form = ReviewForm::bind(&data);
    let mut media_forms = MediaFormSet::bind(&data);
    // Both are cleaned so that every error is shown at once.
    let review = review_form.clean();
    let media = media_forms.clean();

    if let (Some(review), Some(media)) = (review, media) {
        let submission = ReviewSubmission { review, media };
        match state
            .db
            .submit_review(user.id, product.id, &submission, Utc::now())
            .await?
        {
            SubmitOutcome::Created(review_id) => {
                info!(
                    "{} reviewed product {} (review {})",
                    user.username, product.id, review_id
                );
                return Ok(redirect_with_flash(
                    &state.config,
                    &format!("/products/{}/", product.id),
                    REVIEW_POSTED,
                ));
            }
            SubmitOutcome::AlreadyReviewed => {
                warn!(
                    "{} tried to review product {} twice",
                    user.username, product.id
                );
                review_form.errors.add_non_field(ALREADY_REVIEWED);
            }
        }
    }

    Ok(review_form_page(user, product, review_form, media_forms))
}

pub async fn list_reviews(
    state: web::Data<AppState>,
    Viewer(viewer): Viewer,
    Flash(flash): Flash,
    path: web::Path<i64>,
    params: Params,
) -> Result<HttpResponse, AppError> {
    let product_id = path.into_inner();
    let product = state
        .db
        .get_product(product_id)
        .await?
        .ok_or(AppError::NotFound)?;

    let query = ReviewQuery::from_params(&params);
    let mut page = state
        .db
        .list_reviews(
            product_id,
            &query,
            PageRequest::from_params(&params, REVIEWS_PER_PAGE),
        )
        .await?;
    resolve_media(&state.config, &mut page.items);

    let title = format!("Reviews of {}", product.display_name());
    let ctx = ReviewListContext {
        product,
        page,
        query,
        query_string: query_without_page(&params),
        viewer_id: viewer.as_ref().map(|u| u.id),
    };
    Ok(html_page(&title, viewer, flash, move || {
        view! { <ReviewListPage ctx=ctx/> }
    }))
}

pub async fn vote(
    state: web::Data<AppState>,
    AuthUser(user): AuthUser,
    path: web::Path<i64>,
    form: Submitted,
) -> Result<HttpResponse, AppError> {
    let review_id = path.into_inner();
    let review = state
        .db
        .get_review(review_id)
        .await?
        .ok_or(AppError::NotFound)?;

    let is_helpful = helpful_vote(&FormData::from(form.into_inner()));
    let helpful_votes = state
        .db
        .cast_vote(review.id, user.id, is_helpful, Utc::now())
        .await?;
    info!(
        "{} voted on review {} (helpful: {}, total helpful: {})",
        user.username, review.id, is_helpful, helpful_votes
    );
    Ok(redirect(&format!("/products/{}/", review.product_id)))
}

/// Loads a review the user may change: 404 if missing, 403 if someone else wrote it.
async fn authored_review(state: &AppState, user: &User, review_id: i64) -> Result<Review, AppError> {
    let review = state
        .db
        .get_review(review_id)
        .await?
        .ok_or(AppError::NotFound)?;
    if review.user_id != user.id {
        warn!(
            "{} was refused access to review {} by user {}",
            user.username, review.id, review.user_id
        );
        return Err(AppError::Forbidden);
    }
    Ok(review)
}

fn review_edit_page(user: User, product: Product, form: ReviewEditForm) -> HttpResponse {
    let ctx = ReviewEditContext { product, form };
    html_page("Edit review", Some(user), None, move || {
        view! { <ReviewEditPage ctx=ctx/> }
    })
}

pub async fn edit_review(
    state: web::Data<AppState>,
    AuthUser(user): AuthUser,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let review = authored_review(&state, &user, path.into_inner()).await?;
    let product = state
        .db
        .get_product(review.product_id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(review_edit_page(
        user,
        product,
        ReviewEditForm::from_review(&review),
    ))
}

pub async fn update_review(
    state: web::Data<AppState>,
    AuthUser(user): AuthUser,
    path: web::Path<i64>,
    form: Submitted,
) -> Result<HttpResponse, AppError> {
    let review = authored_review(&state, &user, path.into_inner()).await?;
    let product = state
        .db
        .get_product(review.product_id)
        .await?
        .ok_or(AppError::NotFound)?;

    let mut edit_form = ReviewEditForm::bind(&FormData::from(form.into_inner()));
    let Some(edit) = edit_form.clean() else {
        return Ok(review_edit_page(user, product, edit_form));
    };
    if !state.db.update_review(review.id, &edit, Utc::now()).await? {
        return Err(AppError::NotFound);
    }
    info!("{} updated review {}", user.username, review.id);
    Ok(redirect_with_flash(
        &state.config,
        &format!("/products/{}/", product.id),
        "Your review has been updated.",
    ))
}

pub async fn confirm_delete_review(
    state: web::Data<AppState>,
    AuthUser(user): AuthUser,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let review = authored_review(&state, &user, path.into_inner()).await?;
    let ctx = ConfirmDeleteContext {
        heading: "Delete review".to_string(),
        message: format!(
            "Are you sure you want to delete your review \"{}\"?",
            review.title
        ),
        cancel_href: format!("/products/{}/", review.product_id),
    };
    Ok(html_page("Delete review", Some(user), None, move || {
        view! { <ConfirmDeletePage ctx=ctx/> }
    }))
}

pub async fn delete_review(
    state: web::Data<AppState>,
    AuthUser(user): AuthUser,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let review = authored_review(&state, &user, path.into_inner()).await?;
    if !state.db.delete_review(review.id).await? {
        return Err(AppError::NotFound);
    }
    info!("{} deleted review {}", user.username, review.id);
    Ok(redirect_with_flash(
        &state.config,
        &format!("/products/{}/", review.product_id),
        "Your review has been deleted.",
    ))
}
