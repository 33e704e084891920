use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;

use minitwit_core::format::{DEFAULT_AVATAR_SIZE, avatar_url, format_datetime};
use minitwit_core::timeline::{self, page_limit};
use minitwit_types::api::{MessageResponse, ProfileResponse, TimelineResponse};
use minitwit_types::models::Message;

use crate::error::{ApiError, blocking};
use crate::middleware::CurrentSession;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct TimelineQuery {
    pub limit: Option<u32>,
}

/// GET /: the caller's feed. Anonymous visitors are sent to /public.
pub async fn home_timeline(
    State(state): State<AppState>,
    Query(query): Query<TimelineQuery>,
    Extension(session): Extension<CurrentSession>,
) -> Result<Response, ApiError> {
    if !session.is_authenticated() {
        return Ok(Redirect::to("/public").into_response());
    }

    let ctx = state.context(&session);
    let limit = page_limit(query.limit, state.per_page);
    let messages = blocking(move || timeline::home_timeline(&ctx, limit)).await?;

    Ok(Json(TimelineResponse {
        messages: messages.iter().map(message_response).collect(),
        profile: None,
    })
    .into_response())
}

/// GET /public
pub async fn public_timeline(
    State(state): State<AppState>,
    Query(query): Query<TimelineQuery>,
    Extension(session): Extension<CurrentSession>,
) -> Result<Json<TimelineResponse>, ApiError> {
    let ctx = state.context(&session);
    let limit = page_limit(query.limit, state.per_page);
    let messages = blocking(move || timeline::public_timeline(&ctx, limit)).await?;

    Ok(Json(TimelineResponse {
        messages: messages.iter().map(message_response).collect(),
        profile: None,
    }))
}

/// GET /{username}
pub async fn user_timeline(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Query(query): Query<TimelineQuery>,
    Extension(session): Extension<CurrentSession>,
) -> Result<Json<TimelineResponse>, ApiError> {
    let ctx = state.context(&session);
    let limit = page_limit(query.limit, state.per_page);
    let view = blocking(move || timeline::user_timeline(&ctx, &username, limit)).await?;

    Ok(Json(TimelineResponse {
        messages: view.messages.iter().map(message_response).collect(),
        profile: Some(ProfileResponse {
            user_id: view.profile.id,
            avatar_url: avatar_url(&view.profile.email, DEFAULT_AVATAR_SIZE),
            username: view.profile.username,
            followed: view.followed,
        }),
    }))
}

fn message_response(m: &Message) -> MessageResponse {
    MessageResponse {
        id: m.id,
        author_id: m.author_id,
        author_username: m.author_username.clone(),
        avatar_url: avatar_url(&m.author_email, 48),
        text: m.text.clone(),
        pub_date: m.pub_date,
        pub_date_formatted: format_datetime(m.pub_date),
    }
}
