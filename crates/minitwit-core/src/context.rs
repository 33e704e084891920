use std::sync::Arc;

use minitwit_db::Database;
use minitwit_types::models::UserId;

use crate::Result;
use crate::session::require_authenticated;

/// Per-request state handed to every service call: the shared store handle
/// and the identity the session gate resolved for this request.
#[derive(Clone)]
pub struct RequestContext {
    db: Arc<Database>,
    pub identity: Option<UserId>,
}

impl RequestContext {
    pub fn new(db: Arc<Database>, identity: Option<UserId>) -> Self {
        Self { db, identity }
    }

    pub fn anonymous(db: Arc<Database>) -> Self {
        Self::new(db, None)
    }

    /// Same store, acting as `user`.
    pub fn as_user(&self, user: UserId) -> Self {
        Self::new(self.db.clone(), Some(user))
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    /// The caller's id, or [`crate::Error::Unauthenticated`].
    pub fn require_user(&self) -> Result<UserId> {
        require_authenticated(self.identity)
    }
}
