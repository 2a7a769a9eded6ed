//! Error types for tracker domain validation and parsing.
//!
//! Messages are phrased for end users because form validation surfaces them
//! verbatim next to the offending field.

use thiserror::Error;

/// Errors returned while constructing tracker domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TrackerDomainError {
    /// A required value is empty after trimming.
    #[error("This field is required.")]
    Required,

    /// A value exceeds its storage limit.
    #[error("Ensure this value has at most {max} characters (it has {actual}).")]
    TooLong {
        /// Maximum accepted length in characters.
        max: usize,
        /// Length of the rejected value in characters.
        actual: usize,
    },

    /// The username contains characters outside the accepted set.
    #[error(
        "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters."
    )]
    InvalidUsername(String),

    /// The password is shorter than the minimum length.
    #[error("This password is too short. It must contain at least {min} characters.")]
    PasswordTooShort {
        /// Minimum accepted length in characters.
        min: usize,
    },

    /// The password consists only of digits.
    #[error("This password is entirely numeric.")]
    PasswordEntirelyNumeric,

    /// The password matches the username.
    #[error("The password is too similar to the username.")]
    PasswordTooSimilar,

    /// A stored credential does not follow the
    /// `pbkdf2_sha256$iterations$salt$digest` layout.
    #[error("malformed password hash")]
    MalformedPasswordHash,
}

/// Error returned while parsing task statuses.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task status: {0}")]
pub struct ParseTaskStatusError(pub String);

/// Error returned while parsing task priorities.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task priority: {0}")]
pub struct ParseTaskPriorityError(pub String);
