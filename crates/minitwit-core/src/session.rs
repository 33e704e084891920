use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use tracing::{debug, info};
use uuid::Uuid;

use minitwit_types::api::SessionClaims;
use minitwit_types::models::{User, UserId};

use crate::identity::authenticate;
use crate::{Error, RequestContext, Result};

/// Where a request stands with respect to authentication.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Anonymous,
    Authenticated(UserId),
}

impl SessionState {
    pub fn identity(self) -> Option<UserId> {
        match self {
            SessionState::Anonymous => None,
            SessionState::Authenticated(id) => Some(id),
        }
    }
}

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct SessionToken {
    pub token: String,
    pub user: User,
}

struct LiveSession {
    user_id: UserId,
    expires_at: DateTime<Utc>,
}

/// Issues and checks session tokens.
///
/// A token resolves only while its signature and expiry verify and its
/// session id is still in the live table. Logging out removes the entry,
/// so the token stops working before it expires.
pub struct SessionGate {
    secret: String,
    ttl: Duration,
    sessions: RwLock<HashMap<Uuid, LiveSession>>,
}

impl SessionGate {
    pub fn new(secret: impl Into<String>, ttl: Duration) -> Self {
        Self {
            secret: secret.into(),
            ttl,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Anonymous -> Authenticated. Verifies credentials and mints a token.
    pub fn login(&self, ctx: &RequestContext, username: &str, password: &str) -> Result<SessionToken> {
        let user = authenticate(ctx, username, password)?;

        let sid = Uuid::new_v4();
        let expires_at = Utc::now() + self.ttl;
        let claims = SessionClaims {
            uid: user.id,
            username: user.username.clone(),
            sid,
            exp: expires_at.timestamp().max(0) as usize,
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )?;

        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        let now = Utc::now();
        sessions.retain(|_, s| s.expires_at > now);
        sessions.insert(
            sid,
            LiveSession {
                user_id: user.id,
                expires_at,
            },
        );

        info!("User {} logged in", user.username);
        Ok(SessionToken { token, user })
    }

    /// State for a request carrying `token`, if any.
    pub fn resolve(&self, token: Option<&str>) -> SessionState {
        match token.and_then(|t| self.resolve_identity(t)) {
            Some(id) => SessionState::Authenticated(id),
            None => SessionState::Anonymous,
        }
    }

    pub fn resolve_identity(&self, token: &str) -> Option<UserId> {
        let claims = match self.decode(token, true) {
            Ok(claims) => claims,
            Err(e) => {
                debug!("Rejected session token: {}", e);
                return None;
            }
        };

        let sessions = self.sessions.read().unwrap_or_else(PoisonError::into_inner);
        sessions
            .get(&claims.sid)
            .filter(|s| s.user_id == claims.uid && s.expires_at > Utc::now())
            .map(|s| s.user_id)
    }

    /// Authenticated -> Anonymous. Unknown, expired or garbage tokens are
    /// ignored.
    pub fn logout(&self, token: &str) {
        let Ok(claims) = self.decode(token, false) else {
            return;
        };

        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        if sessions.remove(&claims.sid).is_some() {
            info!("User {} logged out", claims.username);
        }
    }

    pub fn live_sessions(&self) -> usize {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn decode(&self, token: &str, check_expiry: bool) -> Result<SessionClaims> {
        let mut validation = Validation::default();
        validation.validate_exp = check_expiry;

        let data = decode::<SessionClaims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )?;
        Ok(data.claims)
    }
}

/// Gate for operations that need a logged-in caller.
pub fn require_authenticated(identity: Option<UserId>) -> Result<UserId> {
    identity.ok_or(Error::Unauthenticated)
}
