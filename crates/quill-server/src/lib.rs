pub mod config;

use axum::Router;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

use quill_api::state::AppState;
use quill_api::{auth, posts};

/// Assemble the full application router. Pulled out of `main` so the
/// end-to-end tests can drive the app without binding a socket.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(posts::index))
        .route("/create", get(posts::create_page).post(posts::create))
        .route("/{id}/update", get(posts::update_page).post(posts::update))
        .route("/{id}/delete", post(posts::delete))
        .route("/auth/register", get(auth::register_page).post(auth::register))
        .route("/auth/login", get(auth::login_page).post(auth::login))
        .route("/auth/logout", get(auth::logout))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
