use axum::{
    Extension, Json,
    extract::{Path, State},
};

use minitwit_core::social;
use minitwit_types::api::ActionResponse;

use crate::error::{ApiError, blocking};
use crate::middleware::CurrentSession;
use crate::state::AppState;

/// GET /{username}/follow
pub async fn follow_user(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Extension(session): Extension<CurrentSession>,
) -> Result<Json<ActionResponse>, ApiError> {
    let ctx = state.context(&session);
    let name = username.clone();
    blocking(move || social::follow(&ctx, &name)).await?;

    Ok(Json(ActionResponse {
        redirect: format!("/{}", username),
        flash: Some(format!("You are now following \"{}\"", username)),
    }))
}

/// GET /{username}/unfollow
pub async fn unfollow_user(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Extension(session): Extension<CurrentSession>,
) -> Result<Json<ActionResponse>, ApiError> {
    let ctx = state.context(&session);
    let name = username.clone();
    blocking(move || social::unfollow(&ctx, &name)).await?;

    Ok(Json(ActionResponse {
        redirect: format!("/{}", username),
        flash: Some(format!("You are no longer following \"{}\"", username)),
    }))
}
