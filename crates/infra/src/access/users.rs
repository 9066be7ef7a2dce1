//! User accounts.
//!
//! Hashing and verification are slow on purpose, so they never run inside a
//! unit of work: [`prepare`] hashes before the store is touched and
//! [`authenticate`] checks the password after the lookup has been released.

use chrono::Utc;

use inventorix_auth::{Credential, NewUser, User, UserDraft};
use inventorix_core::UserId;

use super::{AccessError, AccessResult};
use crate::store::UnitOfWork;

/// Validate a registration and hash its password.
pub fn prepare(draft: UserDraft) -> AccessResult<NewUser> {
    Ok(draft.validate()?.into_new_user()?)
}

pub async fn register(uow: &mut dyn UnitOfWork, new: NewUser) -> AccessResult<User> {
    let user = uow.insert_user(new, Utc::now()).await?;
    tracing::info!(user_id = %user.id, "user registered");
    Ok(user)
}

pub async fn by_username(uow: &mut dyn UnitOfWork, username: &str) -> AccessResult<Option<User>> {
    Ok(uow.user_by_username(username.trim()).await?)
}

/// Check `password` against the account found by [`by_username`].
///
/// Unknown username and wrong password are indistinguishable, in result and
/// in cost: a missing account is checked against a decoy hash.
pub fn authenticate(candidate: Option<User>, password: &str) -> Option<User> {
    match candidate {
        Some(user) if user.authenticate(password) => Some(user),
        Some(_) => None,
        None => {
            Credential::verify_missing(password);
            None
        }
    }
}

pub async fn find(uow: &mut dyn UnitOfWork, id: UserId) -> AccessResult<Option<User>> {
    Ok(uow.user(id).await?)
}

/// Delete the user and, by cascade, everything it owns.
pub async fn delete(uow: &mut dyn UnitOfWork, id: UserId) -> AccessResult<()> {
    if uow.delete_user(id).await? {
        tracing::info!(user_id = %id, "user deleted");
        Ok(())
    } else {
        Err(AccessError::NotFound)
    }
}
