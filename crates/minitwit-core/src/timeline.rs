use tracing::info;

use minitwit_db::models::MessageRow;
use minitwit_types::models::{Message, MessageId, UserId, UserTimeline};

use crate::identity::resolve_username;
use crate::social::is_followed_by;
use crate::{RequestContext, Result, ValidationError};

/// Latest messages from everyone.
pub fn public_timeline(ctx: &RequestContext, limit: u32) -> Result<Vec<Message>> {
    Ok(into_messages(ctx.db().recent_messages(limit)?))
}

/// The caller's own messages plus those of everyone they follow. Anonymous
/// callers get [`crate::Error::Unauthenticated`]; the handler layer sends
/// them to the public timeline instead.
pub fn home_timeline(ctx: &RequestContext, limit: u32) -> Result<Vec<Message>> {
    let user = ctx.require_user()?;
    Ok(into_messages(ctx.db().home_messages(user.0, limit)?))
}

/// One user's messages, plus whether the caller (if any) follows them.
pub fn user_timeline(ctx: &RequestContext, username: &str, limit: u32) -> Result<UserTimeline> {
    let profile = resolve_username(ctx, username)?;

    let followed = match ctx.identity {
        Some(viewer) => is_followed_by(ctx, viewer, profile.id)?,
        None => false,
    };

    let messages = into_messages(ctx.db().messages_for(&[profile.id.0], limit)?);

    Ok(UserTimeline {
        profile,
        messages,
        followed,
    })
}

/// Post `text` as the caller, stamped with the current time.
pub fn post_message(ctx: &RequestContext, text: &str) -> Result<MessageId> {
    let author = ctx.require_user()?;
    if text.is_empty() {
        return Err(ValidationError::EmptyMessage.into());
    }

    let now = chrono::Utc::now().timestamp();
    let id = ctx.db().insert_message(author.0, text, now)?;

    info!("User {} posted message {}", author, id);
    Ok(MessageId(id))
}

/// Clamp a client-supplied page size.
pub fn page_limit(requested: Option<u32>, default: u32) -> u32 {
    const MAX_PAGE: u32 = 200;
    match requested {
        Some(0) | None => default.clamp(1, MAX_PAGE),
        Some(n) => n.min(MAX_PAGE),
    }
}

fn into_messages(rows: Vec<MessageRow>) -> Vec<Message> {
    rows.into_iter()
        .map(|row| Message {
            id: MessageId(row.message_id),
            author_id: UserId(row.author_id),
            author_username: row.username,
            author_email: row.email,
            text: row.text,
            pub_date: row.pub_date,
        })
        .collect()
}
