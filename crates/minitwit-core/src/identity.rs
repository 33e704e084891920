use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use tracing::{info, warn};

use minitwit_db::StoreError;
use minitwit_db::models::UserRow;
use minitwit_types::models::{User, UserId};

use crate::{AuthError, Error, RequestContext, Result, ValidationError};

const USERNAME_TAKEN: &str = "The username is already taken";

/// Path segments the router owns; a user by one of these names would have
/// an unreachable profile page.
pub const RESERVED_USERNAMES: &[&str] =
    &["public", "register", "login", "logout", "add_message", "health"];

/// Register a new user. Checks run in order and the first failure wins:
/// username (present, not reserved), e-mail, password, confirmation, then
/// username availability.
pub fn register(
    ctx: &RequestContext,
    username: &str,
    email: &str,
    password: &str,
    password_confirm: &str,
) -> Result<UserId> {
    if username.is_empty() {
        return Err(ValidationError::EmptyUsername.into());
    }
    if RESERVED_USERNAMES.contains(&username) {
        return Err(ValidationError::ReservedUsername.into());
    }
    if email.is_empty() || !email.contains('@') {
        return Err(ValidationError::InvalidEmail.into());
    }
    if password.is_empty() {
        return Err(ValidationError::EmptyPassword.into());
    }
    if password != password_confirm {
        return Err(ValidationError::PasswordMismatch.into());
    }
    if ctx.db().find_user_by_name(username)?.is_some() {
        return Err(Error::Constraint(USERNAME_TAKEN.into()));
    }

    let pw_hash = hash_password(password)?;

    // A concurrent registration can still win the race; the UNIQUE
    // constraint reports it the same way as the check above.
    let id = ctx
        .db()
        .insert_user(username, email, &pw_hash)
        .map_err(|e| match e {
            StoreError::Constraint(_) => Error::Constraint(USERNAME_TAKEN.into()),
            other => other.into(),
        })?;

    info!("Registered user {} ({})", username, id);
    Ok(UserId(id))
}

/// Check a username/password pair and return the matching user.
pub fn authenticate(ctx: &RequestContext, username: &str, password: &str) -> Result<User> {
    let Some(row) = ctx.db().find_user_by_name(username)? else {
        warn!("Login failed: unknown user {:?}", username);
        return Err(AuthError::InvalidUsername.into());
    };

    if !verify_password(&row.pw_hash, password)? {
        warn!("Login failed: bad password for {:?}", username);
        return Err(AuthError::InvalidPassword.into());
    }

    Ok(user_from_row(row))
}

pub fn find_user(ctx: &RequestContext, username: &str) -> Result<Option<User>> {
    Ok(ctx.db().find_user_by_name(username)?.map(user_from_row))
}

pub fn find_user_by_id(ctx: &RequestContext, id: UserId) -> Result<Option<User>> {
    Ok(ctx.db().find_user_by_id(id.0)?.map(user_from_row))
}

/// Look up `username` or fail with [`Error::NotFound`].
pub fn resolve_username(ctx: &RequestContext, username: &str) -> Result<User> {
    find_user(ctx, username)?.ok_or_else(|| Error::NotFound(format!("User {:?}", username)))
}

fn user_from_row(row: UserRow) -> User {
    User {
        id: UserId(row.user_id),
        username: row.username,
        email: row.email,
    }
}

// Argon2id with a fresh random salt, PHC string format.
fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| Error::Hash(e.to_string()))
}

fn verify_password(stored: &str, password: &str) -> Result<bool> {
    let parsed = PasswordHash::new(stored).map_err(|e| Error::Hash(e.to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}
