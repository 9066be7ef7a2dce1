//! Password credential: salted one-way hash, write-only plaintext.

use std::sync::OnceLock;

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CredentialError {
    /// The plaintext password is never retained, so it can never be read back.
    #[error("password is not readable")]
    Unreadable,

    #[error("password hashing failed: {0}")]
    Hashing(String),
}

/// A stored password hash (argon2id, PHC string format).
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    phc: String,
}

impl Credential {
    /// Hash `plaintext` with a fresh random salt.
    pub fn from_plaintext(plaintext: &str) -> Result<Self, CredentialError> {
        let mut salt_bytes = [0u8; 16];
        getrandom::getrandom(&mut salt_bytes).map_err(|e| CredentialError::Hashing(e.to_string()))?;
        let salt = SaltString::encode_b64(&salt_bytes).map_err(|e| CredentialError::Hashing(e.to_string()))?;
        let phc = Argon2::default()
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|e| CredentialError::Hashing(e.to_string()))?
            .to_string();
        Ok(Self { phc })
    }

    /// Rehydrate a credential from a previously stored PHC string.
    pub fn from_phc(phc: impl Into<String>) -> Self {
        Self { phc: phc.into() }
    }

    /// Replace the stored hash with one computed from `plaintext`.
    pub fn set_password(&mut self, plaintext: &str) -> Result<(), CredentialError> {
        *self = Self::from_plaintext(plaintext)?;
        Ok(())
    }

    /// Always fails: only the hash is kept.
    pub fn password(&self) -> Result<String, CredentialError> {
        Err(CredentialError::Unreadable)
    }

    /// Check `plaintext` against the stored hash.
    ///
    /// Returns `false` on mismatch or on a corrupt stored hash; never errors.
    pub fn verify(&self, plaintext: &str) -> bool {
        match PasswordHash::new(&self.phc) {
            Ok(parsed) => Argon2::default()
                .verify_password(plaintext.as_bytes(), &parsed)
                .is_ok(),
            Err(e) => {
                tracing::warn!("stored credential is not a valid PHC string: {e}");
                false
            }
        }
    }

    /// PHC string for persistence.
    pub fn as_phc(&self) -> &str {
        &self.phc
    }

    /// Check a password when no account matched.
    ///
    /// Runs a full argon2 verification against a decoy hash so an unknown
    /// username costs the same as a wrong password. Always `false`.
    pub fn verify_missing(plaintext: &str) -> bool {
        if let Some(decoy) = decoy() {
            let _ = decoy.verify(plaintext);
        }
        false
    }
}

fn decoy() -> Option<&'static Credential> {
    static DECOY: OnceLock<Option<Credential>> = OnceLock::new();
    DECOY
        .get_or_init(|| Credential::from_plaintext("inventorix-decoy").ok())
        .as_ref()
}

impl core::fmt::Debug for Credential {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Credential").field("phc", &"<redacted>").finish()
    }
}
