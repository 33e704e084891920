//! Database row types. These map directly to SQLite rows and stay
//! independent of the domain models in minitwit-types.

pub struct UserRow {
    pub user_id: i64,
    pub username: String,
    pub email: String,
    pub pw_hash: String,
}

/// A `message` row joined with its author's display columns.
pub struct MessageRow {
    pub message_id: i64,
    pub author_id: i64,
    pub username: String,
    pub email: String,
    pub text: String,
    pub pub_date: i64,
}
