/**
 * Responsibility
 * - what a repository reports upward, independent of the driver
 */
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("db error")]
    Db(#[from] sqlx::Error),
    #[error("conflict")]
    Conflict,
    #[error("invalid stored value: {0}")]
    InvalidValue(String),
}

pub type RepoResult<T> = Result<T, RepoError>;

impl RepoError {
    /// Unique violations become `Conflict`; everything else stays a driver error.
    pub fn from_sqlx(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(dbe) = &e
            && dbe.code().as_deref() == Some("23505")
        {
            return RepoError::Conflict;
        }
        RepoError::Db(e)
    }
}
