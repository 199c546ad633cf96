use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub name: String,
}

/// Parameters for [`UserRepository::create_user`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub name: String,
}

impl NewUser {
    /// A fresh user with a random id, stamped with the current time.
    pub fn named(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            name: name.into(),
        }
    }
}

impl From<NewUser> for User {
    fn from(params: NewUser) -> Self {
        Self {
            id: params.id,
            created_at: params.created_at,
            updated_at: params.updated_at,
            name: params.name,
        }
    }
}

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("could not open repository: {0}")]
    Open(String),
    #[error("a user named {0} already exists")]
    AlreadyExists(String),
    #[error("query failed: {0}")]
    Query(String),
    #[error("stored record is corrupt: {0}")]
    Corrupt(String),
}

/// Narrow storage contract the command handlers depend on.
pub trait UserRepository {
    /// Returns `Ok(None)` when no user has that name.
    fn get_user(&self, name: &str) -> Result<Option<User>, RepositoryError>;
    fn create_user(&self, user: NewUser) -> Result<User, RepositoryError>;
    fn list_users(&self) -> Result<Vec<User>, RepositoryError>;
    /// Deletes every user.
    fn reset_users(&self) -> Result<(), RepositoryError>;
}
