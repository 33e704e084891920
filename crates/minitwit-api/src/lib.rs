pub mod auth;
pub mod error;
pub mod messages;
pub mod middleware;
pub mod social;
pub mod state;
pub mod timeline;

use axum::{
    Json, Router,
    routing::{get, post},
};

pub use error::ApiError;
pub use state::{AppState, AppStateInner};

/// All MiniTwit routes with session resolution applied. Callers add
/// transport layers (CORS, tracing) on top.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(timeline::home_timeline))
        .route("/public", get(timeline::public_timeline))
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", get(auth::logout))
        .route("/add_message", post(messages::add_message))
        .route("/health", get(health))
        .route("/{username}", get(timeline::user_timeline))
        .route("/{username}/follow", get(social::follow_user))
        .route("/{username}/unfollow", get(social::unfollow_user))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::resolve_session,
        ))
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
