use actix_web::{web, HttpResponse};
use leptos::*;

use super::html_page;
use crate::components::pages::{AboutPage, MissionsPage};
use crate::error::AppError;
use crate::models::missions::MissionBoard;
use crate::session::{AuthUser, Flash, Viewer};
use crate::state::AppState;

pub async fn about(
    state: web::Data<AppState>,
    Viewer(viewer): Viewer,
    Flash(flash): Flash,
) -> Result<HttpResponse, AppError> {
    let stats = state.db.site_stats().await?;
    Ok(html_page("About", viewer, flash, move || {
        view! { <AboutPage stats=stats/> }
    }))
}

pub async fn missions(AuthUser(user): AuthUser, Flash(flash): Flash) -> HttpResponse {
    let board = MissionBoard::for_user(&user);
    html_page("Missions", Some(user), flash, move || {
        view! { <MissionsPage board=board/> }
    })
}
