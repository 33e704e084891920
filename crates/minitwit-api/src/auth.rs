use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use minitwit_core::identity;
use minitwit_types::api::{ActionResponse, LoginRequest, LoginResponse, RegisterRequest};

use crate::error::{ApiError, blocking};
use crate::middleware::CurrentSession;
use crate::state::AppState;

// Logged-in users hitting register/login are sent home.
fn already_logged_in() -> Response {
    Json(ActionResponse {
        redirect: "/".into(),
        flash: None,
    })
    .into_response()
}

pub async fn register(
    State(state): State<AppState>,
    Extension(session): Extension<CurrentSession>,
    Json(req): Json<RegisterRequest>,
) -> Result<Response, ApiError> {
    if session.is_authenticated() {
        return Ok(already_logged_in());
    }

    let ctx = state.context(&session);
    blocking(move || {
        identity::register(&ctx, &req.username, &req.email, &req.password, &req.password2)
    })
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(ActionResponse {
            redirect: "/login".into(),
            flash: Some("You were successfully registered and can login now".into()),
        }),
    )
        .into_response())
}

pub async fn login(
    State(state): State<AppState>,
    Extension(session): Extension<CurrentSession>,
    Json(req): Json<LoginRequest>,
) -> Result<Response, ApiError> {
    if session.is_authenticated() {
        return Ok(already_logged_in());
    }

    let ctx = state.context(&session);
    let gate = state.clone();
    let issued = blocking(move || gate.sessions.login(&ctx, &req.username, &req.password)).await?;

    Ok(Json(LoginResponse {
        user_id: issued.user.id,
        username: issued.user.username,
        token: issued.token,
        flash: "You were logged in".into(),
    })
    .into_response())
}

pub async fn logout(
    State(state): State<AppState>,
    Extension(session): Extension<CurrentSession>,
) -> Json<ActionResponse> {
    if let Some(token) = &session.token {
        state.sessions.logout(token);
    }

    Json(ActionResponse {
        redirect: "/public".into(),
        flash: Some("You were logged out".into()),
    })
}
