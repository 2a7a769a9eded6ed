//! Validated text scalars shared by tracker entities.

use super::TrackerDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum length for entity names, matching the `VARCHAR(100)` columns.
pub const MAX_ENTITY_NAME_LENGTH: usize = 100;

/// Maximum length for usernames and personal names, matching `VARCHAR(150)`.
pub const MAX_PERSON_FIELD_LENGTH: usize = 150;

/// Trimmed, non-empty display name for positions, task types, and tasks.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityName(String);

impl EntityName {
    /// Creates a validated entity name.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerDomainError::Required`] when the value is empty after
    /// trimming or [`TrackerDomainError::TooLong`] when it exceeds 100
    /// characters.
    pub fn new(value: impl Into<String>) -> Result<Self, TrackerDomainError> {
        let raw = value.into();
        let normalized = raw.trim();
        if normalized.is_empty() {
            return Err(TrackerDomainError::Required);
        }
        check_length(normalized, MAX_ENTITY_NAME_LENGTH)?;
        Ok(Self(normalized.to_owned()))
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for EntityName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for EntityName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unique login name for a worker.
///
/// Usernames are case-sensitive and may contain letters, digits, and the
/// characters `@`, `.`, `+`, `-`, and `_`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Username(String);

impl Username {
    /// Creates a validated username.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerDomainError::Required`] when empty,
    /// [`TrackerDomainError::TooLong`] beyond 150 characters, or
    /// [`TrackerDomainError::InvalidUsername`] for unsupported characters.
    pub fn new(value: impl Into<String>) -> Result<Self, TrackerDomainError> {
        let raw = value.into();
        let normalized = raw.trim();
        if normalized.is_empty() {
            return Err(TrackerDomainError::Required);
        }
        check_length(normalized, MAX_PERSON_FIELD_LENGTH)?;

        let is_valid = normalized
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'));
        if !is_valid {
            return Err(TrackerDomainError::InvalidUsername(raw));
        }

        Ok(Self(normalized.to_owned()))
    }

    /// Returns the username as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Optional first or last name of a worker; may be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersonName(String);

impl PersonName {
    /// Creates a validated personal name.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerDomainError::TooLong`] beyond 150 characters.
    pub fn new(value: impl Into<String>) -> Result<Self, TrackerDomainError> {
        let raw = value.into();
        let normalized = raw.trim();
        check_length(normalized, MAX_PERSON_FIELD_LENGTH)?;
        Ok(Self(normalized.to_owned()))
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PersonName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn check_length(value: &str, max: usize) -> Result<(), TrackerDomainError> {
    let actual = value.chars().count();
    if actual > max {
        return Err(TrackerDomainError::TooLong { max, actual });
    }
    Ok(())
}
