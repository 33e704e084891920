use std::sync::Arc;

use minitwit_core::{RequestContext, SessionGate};
use minitwit_db::Database;

use crate::middleware::CurrentSession;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Arc<Database>,
    pub sessions: SessionGate,
    /// Default timeline page size.
    pub per_page: u32,
}

impl AppStateInner {
    /// Context for one request, acting as whoever the session resolved to.
    pub fn context(&self, session: &CurrentSession) -> RequestContext {
        RequestContext::new(self.db.clone(), session.state.identity())
    }
}
