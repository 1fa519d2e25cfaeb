use actix_web::{
    cookie::Cookie,
    dev::ServiceResponse,
    http::{header, StatusCode},
    test, web, App,
};
use chrono::Utc;
use glowreview::api;
use glowreview::config::Config;
use glowreview::models::choices::Category;
use glowreview::models::product::ProductInput;
use glowreview::models::user::hash_password;
use glowreview::session::{FLASH_COOKIE, SESSION_COOKIE};
use glowreview::state::AppState;

macro_rules! init_app {
    ($state:expr) => {
        test::init_service(App::new().app_data($state.clone()).configure(api::configure)).await
    };
}

async fn test_state() -> web::Data<AppState> {
    let config = Config {
        database_path: ":memory:".into(),
        ..Config::default()
    };
    web::Data::new(AppState::new(config).await.expect("in-memory state"))
}

/// Registers `username` directly and returns a logged-in session cookie.
async fn session_for(state: &AppState, username: &str) -> (i64, Cookie<'static>) {
    let user_id = state
        .db
        .create_user(username, &hash_password("demo12345").unwrap(), Utc::now())
        .await
        .unwrap()
        .expect("fresh username");
    let token = state.db.create_session(user_id, Utc::now()).await.unwrap();
    (user_id, Cookie::new(SESSION_COOKIE, token))
}

async fn product(state: &AppState, name: &str, price: Option<&str>) -> i64 {
    let input = ProductInput {
        brand: "Test Brand".into(),
        name: name.into(),
        category: Category::Lipstick,
        price: price.map(|p| p.parse().unwrap()),
        image_url: String::new(),
        description: String::new(),
    };
    state.db.create_product(&input, Utc::now()).await.unwrap()
}

fn location<B>(resp: &ServiceResponse<B>) -> String {
    resp.headers()
        .get(header::LOCATION)
        .expect("redirect has a location")
        .to_str()
        .unwrap()
        .to_string()
}

fn cookie_named<B>(resp: &ServiceResponse<B>, name: &str) -> Option<Cookie<'static>> {
    resp.response()
        .cookies()
        .find(|c| c.name() == name)
        .map(|c| c.into_owned())
}

#[actix_web::test]
async fn signup_logs_in_and_follows_next() {
    let state = test_state().await;
    let app = init_app!(state);

    let req = test::TestRequest::post()
        .uri("/signup/")
        .set_form([
            ("username", "glam.queen"),
            ("password1", "demo12345"),
            ("password2", "demo12345"),
            ("next", "/trends/"),
        ])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/trends/");
    let session = cookie_named(&resp, SESSION_COOKIE).expect("session cookie");

    let req = test::TestRequest::get()
        .uri("/profile/")
        .cookie(session)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = test::read_body(resp).await;
    assert!(String::from_utf8_lossy(&body).contains("glam.queen"));
}

#[actix_web::test]
async fn signup_rejects_a_taken_username() {
    let state = test_state().await;
    session_for(&state, "taken").await;
    let app = init_app!(state);

    let req = test::TestRequest::post()
        .uri("/signup/")
        .set_form([
            ("username", "taken"),
            ("password1", "demo12345"),
            ("password2", "demo12345"),
        ])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(cookie_named(&resp, SESSION_COOKIE).is_none());
    let body = test::read_body(resp).await;
    assert!(String::from_utf8_lossy(&body).contains("already exists"));
}

#[actix_web::test]
async fn login_required_pages_redirect_with_next() {
    let state = test_state().await;
    let id = product(&state, "Velvet", None).await;
    let app = init_app!(state);

    let req = test::TestRequest::get()
        .uri(&format!("/products/{id}/reviews/new/"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(
        location(&resp),
        format!("/login/?next=%2Fproducts%2F{id}%2Freviews%2Fnew%2F")
    );

    let req = test::TestRequest::get().uri("/missions/").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(location(&resp), "/login/?next=%2Fmissions%2F");
}

#[actix_web::test]
async fn wrong_password_shows_a_form_error() {
    let state = test_state().await;
    session_for(&state, "lumi").await;
    let app = init_app!(state);

    let req = test::TestRequest::post()
        .uri("/login/")
        .set_form([("username", "lumi"), ("password", "not-it")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = test::read_body(resp).await;
    assert!(String::from_utf8_lossy(&body).contains("Please enter a correct username and password"));

    let req = test::TestRequest::post()
        .uri("/login/")
        .set_form([("username", "lumi"), ("password", "demo12345")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert!(cookie_named(&resp, SESSION_COOKIE).is_some());
}

#[actix_web::test]
async fn review_rating_is_clamped_and_duplicates_are_rejected() {
    let state = test_state().await;
    let (user_id, session) = session_for(&state, "lumi").await;
    let id = product(&state, "Velvet", Some("18.00")).await;
    let app = init_app!(state);

    let req = test::TestRequest::post()
        .uri(&format!("/products/{id}/reviews/new/"))
        .cookie(session.clone())
        .set_form([("title", "Stays put"), ("body", "Lasted all day."), ("rating", "7")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), format!("/products/{id}/"));
    let flash = cookie_named(&resp, FLASH_COOKIE).expect("flash cookie");

    let stored = state
        .db
        .user_review_for_product(user_id, id)
        .await
        .unwrap()
        .expect("review stored");
    assert_eq!(stored.rating.value(), 5);

    let req = test::TestRequest::get()
        .uri(&format!("/products/{id}/"))
        .cookie(flash)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = test::read_body(resp).await;
    assert!(String::from_utf8_lossy(&body).contains("Thanks! Your review has been posted."));

    let req = test::TestRequest::post()
        .uri(&format!("/products/{id}/reviews/new/"))
        .cookie(session)
        .set_form([("title", "Again"), ("body", "Second try."), ("rating", "1")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = test::read_body(resp).await;
    assert!(String::from_utf8_lossy(&body).contains("You have already reviewed this product."));
    assert_eq!(state.db.reviews_for_product(id).await.unwrap().len(), 1);
}

#[actix_web::test]
async fn an_invalid_attachment_blocks_the_whole_review() {
    let state = test_state().await;
    let (user_id, session) = session_for(&state, "lumi").await;
    let id = product(&state, "Velvet", None).await;
    let app = init_app!(state);

    let req = test::TestRequest::post()
        .uri(&format!("/products/{id}/reviews/new/"))
        .cookie(session.clone())
        .set_form([
            ("title", "Great swatch"),
            ("body", "Looks lovely."),
            ("rating", "5"),
            ("media-TOTAL_FORMS", "2"),
            ("media-0-file", "review_media/swatch-unsorted.jpg"),
        ])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = String::from_utf8_lossy(&test::read_body(resp).await).to_string();
    assert!(body.contains("This field is required."));
    assert!(body.contains("review_media/swatch-unsorted.jpg"));
    assert!(state.db.user_review_for_product(user_id, id).await.unwrap().is_none());
    assert!(state.db.reviews_for_product(id).await.unwrap().is_empty());

    let req = test::TestRequest::post()
        .uri(&format!("/products/{id}/reviews/new/"))
        .cookie(session)
        .set_form([
            ("title", "Great swatch"),
            ("body", "Looks lovely."),
            ("rating", "5"),
            ("media-TOTAL_FORMS", "2"),
            ("media-0-file", "review_media/swatch-unsorted.jpg"),
            ("media-0-kind", "photo"),
        ])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    let reviews = state.db.reviews_for_product(id).await.unwrap();
    assert_eq!(reviews.len(), 1);
    assert_eq!(reviews[0].media.len(), 1);
}

#[actix_web::test]
async fn next_with_control_characters_stays_on_site() {
    let state = test_state().await;
    let app = init_app!(state);

    let req = test::TestRequest::post()
        .uri("/signup/")
        .set_form([
            ("username", "glam.queen"),
            ("password1", "demo12345"),
            ("password2", "demo12345"),
            ("next", "/\t/evil.example/"),
        ])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/");
}

#[actix_web::test]
async fn only_the_author_may_edit_or_delete() {
    let state = test_state().await;
    let (_, author) = session_for(&state, "author").await;
    let (_, other) = session_for(&state, "other").await;
    let id = product(&state, "Velvet", None).await;
    let app = init_app!(state);

    let req = test::TestRequest::post()
        .uri(&format!("/products/{id}/reviews/new/"))
        .cookie(author.clone())
        .set_form([("title", "Mine"), ("body", "My words."), ("rating", "4")])
        .to_request();
    test::call_service(&app, req).await;
    let review_id = state.db.reviews_for_product(id).await.unwrap()[0].review.id;

    for uri in [
        format!("/reviews/{review_id}/edit/"),
        format!("/reviews/{review_id}/delete/"),
    ] {
        let req = test::TestRequest::get().uri(&uri).cookie(other.clone()).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN, "GET {uri}");
    }

    let req = test::TestRequest::post()
        .uri(&format!("/reviews/{review_id}/edit/"))
        .cookie(other.clone())
        .set_form([("title", "Hijacked"), ("body", "Nope."), ("rating", "1")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let review = state.db.get_review(review_id).await.unwrap().unwrap();
    assert_eq!(review.title, "Mine");

    let req = test::TestRequest::post()
        .uri(&format!("/reviews/{review_id}/edit/"))
        .cookie(author.clone())
        .set_form([("title", "Updated"), ("body", "Better words."), ("rating", "0")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    let review = state.db.get_review(review_id).await.unwrap().unwrap();
    assert_eq!(review.title, "Updated");
    assert_eq!(review.rating.value(), 1);

    let req = test::TestRequest::post()
        .uri(&format!("/reviews/{review_id}/delete/"))
        .cookie(author)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert!(state.db.get_review(review_id).await.unwrap().is_none());
}

#[actix_web::test]
async fn unknown_ids_are_not_found() {
    let state = test_state().await;
    let (_, session) = session_for(&state, "lumi").await;
    let app = init_app!(state);

    for uri in ["/products/999/", "/products/999/reviews/", "/products/abc/"] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND, "GET {uri}");
    }

    let req = test::TestRequest::get()
        .uri("/reviews/999/edit/")
        .cookie(session.clone())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::post()
        .uri("/reviews/999/helpful/")
        .cookie(session)
        .set_form([("is_helpful", "true")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn votes_are_recounted_not_incremented() {
    let state = test_state().await;
    let (_, author) = session_for(&state, "author").await;
    let (_, voter) = session_for(&state, "voter").await;
    let id = product(&state, "Velvet", None).await;
    let app = init_app!(state);

    let req = test::TestRequest::post()
        .uri(&format!("/products/{id}/reviews/new/"))
        .cookie(author)
        .set_form([("title", "Mine"), ("body", "My words."), ("rating", "4")])
        .to_request();
    test::call_service(&app, req).await;
    let review_id = state.db.reviews_for_product(id).await.unwrap()[0].review.id;

    for (flag, expected) in [("true", 1), ("true", 1), ("false", 0)] {
        let req = test::TestRequest::post()
            .uri(&format!("/reviews/{review_id}/helpful/"))
            .cookie(voter.clone())
            .set_form([("is_helpful", flag)])
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(location(&resp), format!("/products/{id}/"));
        let review = state.db.get_review(review_id).await.unwrap().unwrap();
        assert_eq!(review.helpful_votes, expected, "after voting {flag}");
    }
}

#[actix_web::test]
async fn browse_sorts_by_price_with_unpriced_last() {
    let state = test_state().await;
    product(&state, "PriceyGloss", Some("40.00")).await;
    product(&state, "UnpricedGloss", None).await;
    product(&state, "CheapGloss", Some("5.50")).await;
    product(&state, "MiddleGloss", Some("12.00")).await;
    let app = init_app!(state);

    let req = test::TestRequest::get()
        .uri("/products/?sort=price_asc")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = String::from_utf8_lossy(&test::read_body(resp).await).to_string();

    let positions: Vec<usize> = ["CheapGloss", "MiddleGloss", "PriceyGloss", "UnpricedGloss"]
        .iter()
        .map(|name| body.find(name).unwrap_or_else(|| panic!("{name} missing")))
        .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]), "{positions:?}");

    let req = test::TestRequest::get()
        .uri("/products/?min=10&max=20")
        .to_request();
    let body = test::read_body(test::call_service(&app, req).await).await;
    let body = String::from_utf8_lossy(&body);
    assert!(body.contains("MiddleGloss"));
    assert!(!body.contains("CheapGloss"));
    assert!(!body.contains("PriceyGloss"));
}

#[actix_web::test]
async fn logout_ends_the_session() {
    let state = test_state().await;
    let (_, session) = session_for(&state, "lumi").await;
    let token = session.value().to_string();
    let app = init_app!(state);

    let req = test::TestRequest::post()
        .uri("/logout/")
        .cookie(session)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/login/");
    assert!(state.db.user_for_session(&token, Utc::now()).await.unwrap().is_none());
}

#[actix_web::test]
async fn public_pages_render() {
    let state = test_state().await;
    product(&state, "Velvet", Some("9.99")).await;
    let app = init_app!(state);

    for uri in ["/", "/products/", "/trends/?days=7", "/about/", "/login/", "/signup/"] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK, "GET {uri}");
    }
}
