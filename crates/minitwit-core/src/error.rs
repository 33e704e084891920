use minitwit_db::StoreError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Bad or missing user input. Display texts are shown to users as-is.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("You have to enter a username")]
    EmptyUsername,

    /// The name collides with a fixed route such as `/public`.
    #[error("That username is reserved")]
    ReservedUsername,

    #[error("You have to enter a valid email address")]
    InvalidEmail,

    #[error("You have to enter a password")]
    EmptyPassword,

    #[error("The two passwords do not match")]
    PasswordMismatch,

    #[error("You have to enter a message")]
    EmptyMessage,
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    #[error("Invalid username")]
    InvalidUsername,

    #[error("Invalid password")]
    InvalidPassword,
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    Constraint(String),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("You have to be logged in")]
    Unauthenticated,

    #[error("{0} not found")]
    NotFound(String),

    /// Store failure. The only unrecoverable condition.
    #[error("Store failure: {0}")]
    Store(StoreError),

    #[error("Session token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("Password hashing failed: {0}")]
    Hash(String),
}

impl From<StoreError> for Error {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Constraint(what) => Error::Constraint(what),
            StoreError::Validation(_) => Error::Validation(ValidationError::EmptyMessage),
            other => Error::Store(other),
        }
    }
}

impl Error {
    /// True for conditions the user can fix by resubmitting.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::Validation(_)
                | Error::Constraint(_)
                | Error::Auth(_)
                | Error::Unauthenticated
                | Error::NotFound(_)
        )
    }
}
