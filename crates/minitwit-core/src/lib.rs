//! MiniTwit core: identity, follow graph, timelines and the session gate.
//!
//! Every operation takes an explicit [`RequestContext`] carrying the store
//! handle and the caller's resolved identity for the current request.

pub mod context;
pub mod error;
pub mod format;
pub mod identity;
pub mod session;
pub mod social;
pub mod timeline;

pub use context::RequestContext;
pub use error::{AuthError, Error, Result, ValidationError};
pub use session::{SessionGate, SessionState, SessionToken, require_authenticated};

/// Default number of messages per timeline page.
pub const PER_PAGE: u32 = 30;
