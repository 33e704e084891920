use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{MessageId, UserId};

// -- Session token claims --

/// Claims carried by a session token. `sid` binds the token to an entry in
/// the live session table, so a logged-out token stops resolving even
/// before `exp`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    pub uid: UserId,
    pub username: String,
    pub sid: Uuid,
    pub exp: usize,
}

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub password2: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub user_id: UserId,
    pub username: String,
    pub token: String,
    pub flash: String,
}

// -- Messages --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PostMessageRequest {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub id: MessageId,
    pub author_id: UserId,
    pub author_username: String,
    pub avatar_url: String,
    pub text: String,
    pub pub_date: i64,
    pub pub_date_formatted: String,
}

// -- Timelines --

#[derive(Debug, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub user_id: UserId,
    pub username: String,
    pub avatar_url: String,
    pub followed: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TimelineResponse {
    pub messages: Vec<MessageResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<ProfileResponse>,
}

// -- Generic --

/// Where the client should go next, plus an optional one-shot notice.
#[derive(Debug, Serialize, Deserialize)]
pub struct ActionResponse {
    pub redirect: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flash: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
