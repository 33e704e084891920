use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Bearer};

use minitwit_core::SessionState;

use crate::state::AppState;

/// Session resolved for the current request.
#[derive(Debug, Clone)]
pub struct CurrentSession {
    pub state: SessionState,
    /// Raw bearer token, kept so logout can revoke it.
    pub token: Option<String>,
}

impl CurrentSession {
    pub fn is_authenticated(&self) -> bool {
        self.state.identity().is_some()
    }
}

/// Resolve the `Authorization: Bearer` token (if any) against the session
/// gate. Never rejects: anonymous requests pass through and each handler
/// decides whether it needs an identity.
pub async fn resolve_session(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let token = req
        .headers()
        .typed_get::<Authorization<Bearer>>()
        .map(|auth| auth.token().to_string());

    let session = CurrentSession {
        state: state.sessions.resolve(token.as_deref()),
        token,
    };

    req.extensions_mut().insert(session);
    next.run(req).await
}
