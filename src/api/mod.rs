//! Route table and the response helpers shared by every handler.
mod accounts;
mod catalog;
mod pages;
mod reviews;

use actix_web::{http::header, web, HttpResponse};
use leptos::IntoView;
use std::collections::HashMap;

use crate::components::layout::render_page;
use crate::config::Config;
use crate::models::review::ReviewEntry;
use crate::models::user::User;
use crate::session::{flash_cookie, removal_cookie, FLASH_COOKIE};

type Params = web::Query<HashMap<String, String>>;
type Submitted = web::Form<Vec<(String, String)>>;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(catalog::home))
        .route("/products/", web::get().to(catalog::browse))
        .service(
            web::resource("/products/new/")
                .route(web::get().to(catalog::new_product))
                .route(web::post().to(catalog::create_product)),
        )
        .route("/products/{id}/", web::get().to(catalog::product_detail))
        .service(
            web::resource("/products/{id}/edit/")
                .route(web::get().to(catalog::edit_product))
                .route(web::post().to(catalog::update_product)),
        )
        .service(
            web::resource("/products/{id}/delete/")
                .route(web::get().to(catalog::confirm_delete_product))
                .route(web::post().to(catalog::delete_product)),
        )
        .service(
            web::resource("/products/{id}/reviews/new/")
                .route(web::get().to(reviews::new_review))
                .route(web::post().to(reviews::create_review)),
        )
        .route("/products/{id}/reviews/", web::get().to(reviews::list_reviews))
        .route("/reviews/{id}/helpful/", web::post().to(reviews::vote))
        .service(
            web::resource("/reviews/{id}/edit/")
                .route(web::get().to(reviews::edit_review))
                .route(web::post().to(reviews::update_review)),
        )
        .service(
            web::resource("/reviews/{id}/delete/")
                .route(web::get().to(reviews::confirm_delete_review))
                .route(web::post().to(reviews::delete_review)),
        )
        .route("/trends/", web::get().to(catalog::trends))
        .route("/profile/", web::get().to(accounts::profile))
        .route("/missions/", web::get().to(pages::missions))
        .route("/about/", web::get().to(pages::about))
        .service(
            web::resource("/signup/")
                .route(web::get().to(accounts::signup_form))
                .route(web::post().to(accounts::signup)),
        )
        .service(
            web::resource("/login/")
                .route(web::get().to(accounts::login_form))
                .route(web::post().to(accounts::login)),
        )
        .route("/logout/", web::post().to(accounts::logout));
}

/// A 200 HTML page. A shown flash message is expired in the same response.
fn html_page<F, N>(title: &str, viewer: Option<User>, flash: Option<String>, content: F) -> HttpResponse
where
    F: FnOnce() -> N + 'static,
    N: IntoView,
{
    let mut response = HttpResponse::Ok();
    response.content_type("text/html; charset=utf-8");
    if flash.is_some() {
        response.cookie(removal_cookie(FLASH_COOKIE));
    }
    response.body(render_page(title, viewer, flash, content))
}

fn redirect(location: &str) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, location.to_string()))
        .finish()
}

fn redirect_with_flash(config: &Config, location: &str, message: &str) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, location.to_string()))
        .cookie(flash_cookie(config, message))
        .finish()
}

/// Turns stored attachment references into public URLs.
fn resolve_media(config: &Config, entries: &mut [ReviewEntry]) {
    for entry in entries {
        for media in &mut entry.media {
            media.file = config.media_href(&media.file);
        }
        if let Some(receipt) = entry.review.receipt.as_mut() {
            *receipt = config.media_href(receipt);
        }
    }
}
