//! User identity (the tenant) and its field validation.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use inventorix_core::validate::{max_len, required, text};
use inventorix_core::{DomainError, DomainResult, Entity, UserId};

use crate::credential::{Credential, CredentialError};

const USERNAME_MIN: usize = 3;
const USERNAME_MAX: usize = 80;
const EMAIL_MAX: usize = 120;
const BUSINESS_NAME_MAX: usize = 100;

// ─────────────────────────────────────────────────────────────────────────────
// User
// ─────────────────────────────────────────────────────────────────────────────

/// A registered business account. Owns categories, warehouses and products.
///
/// # Invariants
/// - `username` is at least 3 characters and unique.
/// - `email` has a non-empty local part and domain around a single `@`, and is unique.
/// - The password is only ever held as a hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub business_name: String,
    pub username: String,
    pub email: String,
    pub credential: Credential,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn authenticate(&self, password: &str) -> bool {
        self.credential.verify(password)
    }
}

impl Entity for User {
    type Id = UserId;

    fn id(&self) -> UserId {
        self.id
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Registration
// ─────────────────────────────────────────────────────────────────────────────

/// Unvalidated registration input.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserDraft {
    pub business_name: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Registration input whose fields passed validation; the password is not yet hashed.
#[derive(Clone)]
pub struct ValidatedUser {
    pub business_name: String,
    pub username: String,
    pub email: String,
    password: String,
}

/// A user ready to be inserted.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub business_name: String,
    pub username: String,
    pub email: String,
    pub credential: Credential,
}

impl UserDraft {
    /// Validate fields in order, failing on the first violation.
    pub fn validate(self) -> DomainResult<ValidatedUser> {
        let business_name = text(
            "business_name",
            required("business_name", self.business_name)?,
            BUSINESS_NAME_MAX,
        )?;
        let username = validate_username(required("username", self.username)?)?;
        let email = validate_email(required("email", self.email)?)?;
        let password = required("password", self.password)?;
        if password.is_empty() {
            return Err(DomainError::validation("password cannot be empty"));
        }

        Ok(ValidatedUser {
            business_name,
            username,
            email,
            password,
        })
    }
}

impl ValidatedUser {
    /// Hash the password; the plaintext is dropped with `self`.
    pub fn into_new_user(self) -> Result<NewUser, CredentialError> {
        let credential = Credential::from_plaintext(&self.password)?;
        Ok(NewUser {
            business_name: self.business_name,
            username: self.username,
            email: self.email,
            credential,
        })
    }
}

impl core::fmt::Debug for ValidatedUser {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ValidatedUser")
            .field("business_name", &self.business_name)
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

pub fn validate_username(username: String) -> DomainResult<String> {
    let username = username.trim().to_string();
    if username.chars().count() < USERNAME_MIN {
        return Err(DomainError::validation(
            "Username must be at least 3 characters long",
        ));
    }
    max_len("username", &username, USERNAME_MAX)?;
    Ok(username)
}

pub fn validate_email(email: String) -> DomainResult<String> {
    let email = email.trim().to_lowercase();
    let valid = match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty() && !domain.contains('@'),
        None => false,
    };
    if !valid {
        return Err(DomainError::validation("Invalid email format"));
    }
    max_len("email", &email, EMAIL_MAX)?;
    Ok(email)
}
