//! `inventorix-auth`: credentials, signed tokens and the user identity.
//!
//! This crate is intentionally decoupled from HTTP and storage.

pub mod credential;
pub mod token;
pub mod user;

pub use credential::{Credential, CredentialError};
pub use token::{DEFAULT_MAX_AGE_SECS, TokenClaims, TokenError, TokenService};
pub use user::{NewUser, User, UserDraft, ValidatedUser};
