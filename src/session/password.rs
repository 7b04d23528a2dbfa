//! Password strength checks and salted password hashes.
//!
//! A raw password must pass [ValidatedPassword::new] before it can be turned
//! into a [PasswordHash], which is the only form stored in the database.

use std::fmt::Display;

use bcrypt::{BcryptError, hash, verify};
use zxcvbn::{Score, feedback::Feedback, zxcvbn};

use crate::Error;

/// A password that has passed the strength check, but has not been hashed yet.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedPassword(String);

impl ValidatedPassword {
    /// Check the strength of `raw_password` and wrap it.
    ///
    /// # Errors
    ///
    /// Returns [Error::TooWeak] with suggestions for a stronger password if
    /// `raw_password` is easy to guess.
    pub fn new(raw_password: &str) -> Result<Self, Error> {
        let analysis = zxcvbn(raw_password, &[]);

        match analysis.score() {
            Score::Three | Score::Four => Ok(Self(raw_password.to_owned())),
            _ => Err(Error::TooWeak(
                analysis
                    .feedback()
                    .unwrap_or(&Feedback::default())
                    .to_string(),
            )),
        }
    }
}

impl Display for ValidatedPassword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", str::repeat("*", 8))
    }
}

/// A salted bcrypt hash of a password.
#[derive(Debug, Clone, PartialEq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// The recommended bcrypt cost.
    pub const DEFAULT_COST: u32 = bcrypt::DEFAULT_COST;

    /// Hash `password` with `cost` rounds of bcrypt.
    ///
    /// # Errors
    ///
    /// Returns [Error::HashingError] if bcrypt rejects the cost or fails.
    pub fn new(password: ValidatedPassword, cost: u32) -> Result<Self, Error> {
        hash(&password.0, cost)
            .map(Self)
            .map_err(|error| Error::HashingError(error.to_string()))
    }

    /// Wrap a hash loaded from the database.
    ///
    /// The caller must make sure `raw_hash` is a bcrypt hash, otherwise
    /// [PasswordHash::verify] returns an error.
    pub fn new_unchecked(raw_hash: &str) -> Self {
        Self(raw_hash.to_owned())
    }

    /// Check `raw_password` and hash it in one go.
    pub fn from_raw_password(raw_password: &str, cost: u32) -> Result<Self, Error> {
        PasswordHash::new(ValidatedPassword::new(raw_password)?, cost)
    }

    /// Whether `raw_password` is the password this hash was made from.
    pub fn verify(&self, raw_password: &str) -> Result<bool, BcryptError> {
        verify(raw_password, &self.0)
    }

    /// The hash in the modular crypt format, e.g. `$2b$12$...`.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod validated_password_tests {
    use crate::{Error, session::ValidatedPassword};

    #[test]
    fn new_fails_on_empty() {
        assert!(matches!(ValidatedPassword::new(""), Err(Error::TooWeak(_))));
    }

    #[test]
    fn new_fails_on_common_password() {
        assert!(matches!(
            ValidatedPassword::new("password1234"),
            Err(Error::TooWeak(_))
        ));
    }

    #[test]
    fn new_succeeds_on_long_password() {
        assert!(ValidatedPassword::new("asomewhatlongpassword1").is_ok());
    }

    #[test]
    fn display_hides_the_password() {
        let password = ValidatedPassword::new("asomewhatlongpassword1").unwrap();

        assert_eq!(password.to_string(), "********");
    }
}
