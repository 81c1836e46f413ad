use crate::db::PrincipalDirectory;
use crate::types::{AppError, Principal, Result};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use std::sync::{Arc, OnceLock};

/// Hashes a password using Argon2id.
///
/// Returns a PHC-formatted hash string.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
}

/// Verifies a password against an Argon2 hash.
pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| AppError::Internal(format!("Invalid password hash: {}", e)))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Hash verified in place of a real one when the email is unknown, so a miss
/// costs the same Argon2 work as a wrong password.
fn dummy_hash() -> Option<&'static str> {
    static DUMMY: OnceLock<Option<String>> = OnceLock::new();
    DUMMY
        .get_or_init(|| hash_password("tasktrack-dummy-password").ok())
        .as_deref()
}

/// Checks a submitted email/password pair against the stored credentials.
pub struct CredentialVerifier {
    directory: Arc<dyn PrincipalDirectory>,
}

impl CredentialVerifier {
    pub fn new(directory: Arc<dyn PrincipalDirectory>) -> Self {
        Self { directory }
    }

    /// Returns the matching principal, or `BadCredentials` for both an unknown
    /// email and a wrong password.
    pub async fn verify(&self, email: &str, password: &str) -> Result<Principal> {
        let Some(principal) = self.directory.find_by_email(email).await? else {
            if let Some(hash) = dummy_hash() {
                verify_password(password, hash)?;
            }
            return Err(AppError::BadCredentials);
        };

        if !verify_password(password, &principal.password_hash)? {
            return Err(AppError::BadCredentials);
        }

        Ok(principal)
    }
}
