use axum::{Extension, Json, extract::State};

use minitwit_core::timeline;
use minitwit_types::api::{ActionResponse, PostMessageRequest};

use crate::error::{ApiError, blocking};
use crate::middleware::CurrentSession;
use crate::state::AppState;

/// POST /add_message: records a message for the logged-in user.
pub async fn add_message(
    State(state): State<AppState>,
    Extension(session): Extension<CurrentSession>,
    Json(req): Json<PostMessageRequest>,
) -> Result<Json<ActionResponse>, ApiError> {
    let ctx = state.context(&session);
    ctx.require_user()?;

    blocking(move || timeline::post_message(&ctx, &req.text)).await?;

    Ok(Json(ActionResponse {
        redirect: "/".into(),
        flash: Some("Your message was recorded".into()),
    }))
}
