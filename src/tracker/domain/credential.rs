//! Worker password credentials.
//!
//! Passwords are stored as
//! `pbkdf2_sha256$<iterations>$<salt-hex>$<digest-hex>`: a PBKDF2-HMAC-SHA256
//! key over the UTF-8 password bytes. The iteration count travels with the
//! hash, so raising [`PBKDF2_ITERATIONS`] leaves older hashes verifiable.

use super::TrackerDomainError;
use sha2::Sha256;
use std::fmt;
use subtle::ConstantTimeEq;
use uuid::Uuid;

/// Minimum number of characters accepted for a new password.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Iteration count applied to newly derived hashes.
pub const PBKDF2_ITERATIONS: u32 = 600_000;

/// Scheme tag leading every encoded hash.
pub const PASSWORD_SCHEME: &str = "pbkdf2_sha256";

const DIGEST_LEN: usize = 32;

/// Salted password digest. Never exposes the digest through `Debug`.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Hashes a plaintext password with a fresh random salt and the default
    /// iteration count.
    #[must_use]
    pub fn derive(password: &str) -> Self {
        Self::derive_with_iterations(password, PBKDF2_ITERATIONS)
    }

    /// Hashes a plaintext password with a fresh random salt and an explicit
    /// iteration count. A count of zero is raised to one.
    #[must_use]
    pub fn derive_with_iterations(password: &str, iterations: u32) -> Self {
        let salt = Uuid::new_v4().into_bytes();
        let rounds = iterations.max(1);
        let digest = stretch(password, &salt, rounds);
        Self(format!(
            "{PASSWORD_SCHEME}${rounds}${}${}",
            hex::encode(salt),
            hex::encode(digest)
        ))
    }

    /// Wraps a previously encoded hash loaded from storage.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerDomainError::MalformedPasswordHash`] when the value
    /// does not follow the `pbkdf2_sha256$iterations$salt$digest` layout.
    pub fn parse(encoded: impl Into<String>) -> Result<Self, TrackerDomainError> {
        let value = encoded.into();
        Encoded::split(&value).ok_or(TrackerDomainError::MalformedPasswordHash)?;
        Ok(Self(value))
    }

    /// Checks a plaintext candidate against the stored digest.
    #[must_use]
    pub fn verify(&self, candidate: &str) -> bool {
        let Some(encoded) = Encoded::split(&self.0) else {
            return false;
        };
        let computed = stretch(candidate, &encoded.salt, encoded.iterations);
        computed.as_slice().ct_eq(&encoded.digest).into()
    }

    /// Iteration count recorded in the hash.
    #[must_use]
    pub fn iterations(&self) -> Option<u32> {
        Encoded::split(&self.0).map(|encoded| encoded.iterations)
    }

    /// Returns the encoded representation for persistence.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(..)")
    }
}

/// Returns every password-policy rule the candidate breaks.
///
/// An empty result means the password is acceptable for `username`.
#[must_use]
pub fn password_policy_violations(password: &str, username: &str) -> Vec<TrackerDomainError> {
    let mut violations = Vec::new();
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        violations.push(TrackerDomainError::PasswordTooShort {
            min: MIN_PASSWORD_LENGTH,
        });
    }
    if !password.is_empty() && password.chars().all(|c| c.is_ascii_digit()) {
        violations.push(TrackerDomainError::PasswordEntirelyNumeric);
    }
    if !username.is_empty() && password.eq_ignore_ascii_case(username) {
        violations.push(TrackerDomainError::PasswordTooSimilar);
    }
    violations
}

fn stretch(password: &str, salt: &[u8], iterations: u32) -> [u8; DIGEST_LEN] {
    let mut digest = [0_u8; DIGEST_LEN];
    pbkdf2::pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, iterations, &mut digest);
    digest
}

struct Encoded {
    iterations: u32,
    salt: Vec<u8>,
    digest: Vec<u8>,
}

impl Encoded {
    fn split(encoded: &str) -> Option<Self> {
        let mut parts = encoded.split('$');
        if parts.next()? != PASSWORD_SCHEME {
            return None;
        }
        let iterations: u32 = parts.next()?.parse().ok()?;
        let salt = hex::decode(parts.next()?).ok()?;
        let digest = hex::decode(parts.next()?).ok()?;
        if parts.next().is_some() || iterations == 0 || salt.is_empty() {
            return None;
        }
        (digest.len() == DIGEST_LEN).then_some(Self {
            iterations,
            salt,
            digest,
        })
    }
}
