//! Resource Access Layer: ownership-scoped operations over a unit of work.
//!
//! Every operation takes the authenticated owner and a `&mut dyn UnitOfWork`.
//! Operations never commit; the caller settles the unit of work once, at the
//! request boundary, with [`settle`].

use thiserror::Error;

use inventorix_auth::CredentialError;
use inventorix_core::DomainError;

use crate::store::{StoreError, UnitOfWork};

pub mod categories;
pub mod products;
pub mod stats;
pub mod users;
pub mod warehouses;

pub type AccessResult<T> = Result<T, AccessError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AccessError {
    /// Bad or missing field; carries the first failing field's condition.
    #[error("{0}")]
    Validation(String),

    /// Missing, or owned by another user.
    #[error("not found")]
    NotFound,

    /// Unique constraint violation (username/email).
    #[error("{0}")]
    Conflict(String),

    #[error(transparent)]
    Credential(#[from] CredentialError),

    #[error(transparent)]
    Store(StoreError),
}

impl From<DomainError> for AccessError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::Validation(msg) | DomainError::InvalidId(msg) => Self::Validation(msg),
        }
    }
}

impl From<StoreError> for AccessError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::Conflict(msg) => Self::Conflict(msg),
            other => Self::Store(other),
        }
    }
}

/// Commit on success, roll back on failure.
///
/// A failed commit surfaces as an error; a failed rollback is logged and the
/// original error is returned.
pub async fn settle<T>(uow: Box<dyn UnitOfWork>, result: AccessResult<T>) -> AccessResult<T> {
    match result {
        Ok(value) => {
            uow.commit().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = uow.rollback().await {
                tracing::warn!("rollback failed: {rollback_err}");
            }
            Err(err)
        }
    }
}

/// End a read-only unit of work: always roll back, then hand back the result.
pub async fn release<T>(uow: Box<dyn UnitOfWork>, result: AccessResult<T>) -> AccessResult<T> {
    if let Err(rollback_err) = uow.rollback().await {
        tracing::warn!("rollback failed: {rollback_err}");
    }
    result
}

#[cfg(test)]
pub(crate) mod testing {
    use chrono::Utc;

    use inventorix_auth::{Credential, NewUser, User};

    use crate::store::{InMemoryStore, Store};

    /// Insert and commit a user with a stub credential.
    pub async fn seed_user(store: &InMemoryStore, username: &str) -> User {
        let mut uow = store.begin().await.unwrap();
        let user = uow
            .insert_user(
                NewUser {
                    business_name: "Biz".into(),
                    username: username.into(),
                    email: format!("{username}@example.com"),
                    credential: Credential::from_phc("$argon2id$stub"),
                },
                Utc::now(),
            )
            .await
            .unwrap();
        uow.commit().await.unwrap();
        user
    }
}
