pub mod account;
pub mod api;
pub mod auth;
pub mod gyms;
pub mod reviews;

use axum::routing::{get, post};
use axum::Router;

use crate::state::SharedState;
use crate::views;

/// Browser routes: pages plus the form posts that redirect back to them.
pub fn html_routes() -> Router<SharedState> {
    Router::new()
        // Gyms
        .route("/", get(views::gyms::index))
        .route("/gyms", get(views::gyms::index))
        .route("/add", get(views::gyms::add_page).post(gyms::create))
        .route("/add/{id}", post(gyms::update))
        .route("/gyms/{id}/edit", get(views::gyms::edit_page))
        .route("/gym/{slug}", get(views::gyms::show))
        .route("/tags", get(views::gyms::tags))
        .route("/tags/{tag}", get(views::gyms::tag))
        .route("/top", get(views::gyms::top))
        .route("/map", get(views::gyms::map_page))
        .route("/hearts", get(views::gyms::hearts))
        // Reviews
        .route("/reviews/{id}", post(reviews::create))
        // Auth
        .route("/login", get(views::auth::login_page).post(auth::login))
        .route("/register", get(views::auth::register_page).post(auth::register))
        .route("/logout", get(auth::logout))
        // Account
        .route("/account", get(views::account::account_page).post(account::update))
        .route("/account/forgot", post(auth::forgot))
        .route(
            "/account/reset/{token}",
            get(views::auth::reset_page).post(auth::reset),
        )
}

pub fn api_routes() -> Router<SharedState> {
    Router::new()
        .route("/api/search", get(api::search))
        .route("/api/gyms/near", get(api::near))
        .route("/api/gyms/{id}/heart", post(api::heart))
}
