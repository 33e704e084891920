use tracing::info;

use minitwit_types::models::UserId;

use crate::identity::resolve_username;
use crate::{RequestContext, Result};

/// Make the caller follow `followee`. Following twice leaves one edge.
pub fn follow(ctx: &RequestContext, followee: &str) -> Result<()> {
    let who = ctx.require_user()?;
    let whom = resolve_username(ctx, followee)?;

    ctx.db().insert_follow(who.0, whom.id.0)?;

    info!("User {} follows {}", who, whom.username);
    Ok(())
}

/// Drop the caller's edge to `followee`; no edge is not an error.
pub fn unfollow(ctx: &RequestContext, followee: &str) -> Result<()> {
    let who = ctx.require_user()?;
    let whom = resolve_username(ctx, followee)?;

    ctx.db().delete_follow(who.0, whom.id.0)?;

    info!("User {} unfollowed {}", who, whom.username);
    Ok(())
}

pub fn is_followed_by(ctx: &RequestContext, follower: UserId, followee: UserId) -> Result<bool> {
    Ok(ctx.db().is_following(follower.0, followee.0)?)
}

pub fn followees(ctx: &RequestContext, follower: UserId) -> Result<Vec<UserId>> {
    Ok(ctx
        .db()
        .followees_of(follower.0)?
        .into_iter()
        .map(UserId)
        .collect())
}
