use chrono::{DateTime, Utc};
use md5::{Digest, Md5};

pub const DEFAULT_AVATAR_SIZE: u32 = 80;

/// Gravatar identicon for an e-mail address.
pub fn avatar_url(email: &str, size: u32) -> String {
    let digest = Md5::digest(email.trim().to_lowercase().as_bytes());
    format!(
        "http://www.gravatar.com/avatar/{}?d=identicon&s={}",
        hex::encode(digest),
        size
    )
}

/// Render a Unix timestamp as `YYYY-MM-DD @ HH:MM` (UTC).
pub fn format_datetime(timestamp: i64) -> String {
    DateTime::<Utc>::from_timestamp(timestamp, 0)
        .unwrap_or_default()
        .format("%Y-%m-%d @ %H:%M")
        .to_string()
}
