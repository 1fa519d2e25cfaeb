use actix_web::{web, HttpResponse};
use chrono::Utc;
use leptos::*;
use tracing::{debug, info};

use super::{html_page, redirect, redirect_with_flash, resolve_media, Params, Submitted};
use crate::components::catalog::{
    BrowseContext, BrowsePage, ConfirmDeleteContext, ConfirmDeletePage, HomeContext, HomePage,
    ProductDetailContext, ProductDetailPage, ProductFormContext, ProductFormPage, TrendsContext,
    TrendsPage,
};
use crate::error::AppError;
use crate::forms::product::ProductForm;
use crate::forms::FormData;
use crate::models::page::{query_without_page, PageRequest, PRODUCTS_PER_PAGE};
use crate::models::query::{BrowseQuery, TrendingQuery};
use crate::session::{AuthUser, Flash, Viewer};
use crate::state::AppState;

pub async fn home(
    state: web::Data<AppState>,
    Viewer(viewer): Viewer,
    Flash(flash): Flash,
    params: Params,
) -> Result<HttpResponse, AppError> {
    let page = state
        .db
        .list_products(PageRequest::from_params(&params, PRODUCTS_PER_PAGE))
        .await?;
    let stats = state.db.site_stats().await?;
    let ctx = HomeContext { page, stats };
    Ok(html_page("Home", viewer, flash, move || view! { <HomePage ctx=ctx/> }))
}

pub async fn browse(
    state: web::Data<AppState>,
    Viewer(viewer): Viewer,
    Flash(flash): Flash,
    params: Params,
) -> Result<HttpResponse, AppError> {
    let query = BrowseQuery::from_params(&params);
    debug!("Browsing products with {:?}", query);
    let page = state
        .db
        .browse_products(&query, PageRequest::from_params(&params, PRODUCTS_PER_PAGE))
        .await?;
    let stats = state.db.site_stats().await?;

    let echo = |key: &str| {
        params
            .get(key)
            .map(|v| v.trim().to_string())
            .unwrap_or_default()
    };
    let ctx = BrowseContext {
        page,
        query_string: query_without_page(&params),
        q: echo("q"),
        category: query
            .category
            .map(|c| c.code().to_string())
            .unwrap_or_default(),
        min: echo("min"),
        max: echo("max"),
        sort: query.sort,
        stats,
    };
    Ok(html_page("Browse products", viewer, flash, move || {
        view! { <BrowsePage ctx=ctx/> }
    }))
}

pub async fn trends(
    state: web::Data<AppState>,
    Viewer(viewer): Viewer,
    Flash(flash): Flash,
    params: Params,
) -> Result<HttpResponse, AppError> {
    let query = TrendingQuery::from_params(&params);
    let page = state
        .db
        .trending_products(
            &query,
            Utc::now(),
            PageRequest::from_params(&params, PRODUCTS_PER_PAGE),
        )
        .await?;

    let ctx = TrendsContext {
        page,
        days: query.days,
        category: query
            .category
            .map(|c| c.code().to_string())
            .unwrap_or_default(),
        query_string: query_without_page(&params),
    };
    Ok(html_page("Trending", viewer, flash, move || {
        view! { <TrendsPage ctx=ctx/> }
    }))
}

pub async fn product_detail(
    state: web::Data<AppState>,
    Viewer(viewer): Viewer,
    Flash(flash): Flash,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let product = state.db.get_product(id).await?.ok_or(AppError::NotFound)?;
    let stats = state.db.product_stats(id).await?;
    let mut reviews = state.db.reviews_for_product(id).await?;
    resolve_media(&state.config, &mut reviews);

    let own_review = match &viewer {
        Some(user) => state
            .db
            .user_review_for_product(user.id, id)
            .await?
            .map(|r| r.id),
        None => None,
    };
    let verified_count = reviews
        .iter()
        .filter(|e| e.review.is_verified_purchase)
        .count();

    let title = product.display_name();
    let ctx = ProductDetailContext {
        product,
        stats,
        reviews,
        verified_count,
        viewer_id: viewer.as_ref().map(|u| u.id),
        own_review,
    };
    Ok(html_page(&title, viewer, flash, move || {
        view! { <ProductDetailPage ctx=ctx/> }
    }))
}

fn product_form_page(
    user: crate::models::user::User,
    heading: &str,
    form: ProductForm,
    cancel_href: String,
) -> HttpResponse {
    let ctx = ProductFormContext {
        heading: heading.to_string(),
        form,
        cancel_href,
    };
    html_page(heading, Some(user), None, move || {
        view! { <ProductFormPage ctx=ctx/> }
    })
}

pub async fn new_product(AuthUser(user): AuthUser) -> Result<HttpResponse, AppError> {
    Ok(product_form_page(
        user,
        "Add a product",
        ProductForm::default(),
        "/products/".to_string(),
    ))
}

pub async fn create_product(
    state: web::Data<AppState>,
    AuthUser(user): AuthUser,
    form: Submitted,
) -> Result<HttpResponse, AppError> {
    let data = FormData::from(form.into_inner());
    let mut product_form = ProductForm::bind(&data);
    let Some(input) = product_form.clean() else {
        return Ok(product_form_page(
            user,
            "Add a product",
            product_form,
            "/products/".to_string(),
        ));
    };

    let id = state.db.create_product(&input, Utc::now()).await?;
    info!("{} added product {}", user.username, id);
    Ok(redirect_with_flash(
        &state.config,
        &format!("/products/{id}/"),
        "Product added.",
    ))
}

pub async fn edit_product(
    state: web::Data<AppState>,
    AuthUser(user): AuthUser,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let product = state.db.get_product(id).await?.ok_or(AppError::NotFound)?;
    Ok(product_form_page(
        user,
        "Edit product",
        ProductForm::from_product(&product),
        format!("/products/{id}/"),
    ))
}

pub async fn update_product(
    state: web::Data<AppState>,
    AuthUser(user): AuthUser,
    path: web::Path<i64>,
    form: Submitted,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    state.db.get_product(id).await?.ok_or(AppError::NotFound)?;

    let data = FormData::from(form.into_inner());
    let mut product_form = ProductForm::bind(&data);
    let Some(input) = product_form.clean() else {
        return Ok(product_form_page(
            user,
            "Edit product",
            product_form,
            format!("/products/{id}/"),
        ));
    };

    if !state.db.update_product(id, &input).await? {
        return Err(AppError::NotFound);
    }
    info!("{} updated product {}", user.username, id);
    Ok(redirect_with_flash(
        &state.config,
        &format!("/products/{id}/"),
        "Product updated.",
    ))
}

pub async fn confirm_delete_product(
    state: web::Data<AppState>,
    AuthUser(user): AuthUser,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let product = state.db.get_product(id).await?.ok_or(AppError::NotFound)?;
    let ctx = ConfirmDeleteContext {
        heading: "Delete product".to_string(),
        message: format!(
            "Are you sure you want to delete \"{}\"? All of its reviews will be removed too.",
            product.display_name()
        ),
        cancel_href: format!("/products/{id}/"),
    };
    Ok(html_page("Delete product", Some(user), None, move || {
        view! { <ConfirmDeletePage ctx=ctx/> }
    }))
}

pub async fn delete_product(
    state: web::Data<AppState>,
    AuthUser(user): AuthUser,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    if !state.db.delete_product(id).await? {
        return Err(AppError::NotFound);
    }
    info!("{} deleted product {}", user.username, id);
    Ok(redirect("/"))
}
