//! Account identifier type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Username`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum UsernameError {
    /// The input is empty or whitespace only.
    #[error("username cannot be blank")]
    Blank,
    /// The input string is too long.
    #[error("username must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
}

/// An account identifier, unique within its credential namespace.
///
/// The value is stored exactly as given. Parsing only rejects input that
/// could never name an account; surrounding whitespace is preserved so that
/// lookups stay exact-match.
///
/// ## Constraints
///
/// - Not empty after trimming whitespace
/// - At most 64 characters
///
/// ## Examples
///
/// ```
/// use agora_core::Username;
///
/// assert!(Username::parse("client1").is_ok());
///
/// assert!(Username::parse("").is_err());
/// assert!(Username::parse("   ").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Username(String);

impl Username {
    /// Maximum length of a username, in characters.
    pub const MAX_LENGTH: usize = 64;

    /// Parse a `Username` from a string.
    ///
    /// # Errors
    ///
    /// Returns `UsernameError::Blank` for empty or whitespace-only input and
    /// `UsernameError::TooLong` past [`Self::MAX_LENGTH`] characters.
    pub fn parse(s: &str) -> Result<Self, UsernameError> {
        if s.trim().is_empty() {
            return Err(UsernameError::Blank);
        }

        if s.chars().count() > Self::MAX_LENGTH {
            return Err(UsernameError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        Ok(Self(s.to_owned()))
    }

    /// Get the username as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the username, returning the inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl core::str::FromStr for Username {
    type Err = UsernameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        let name = Username::parse("TechAdmin1").unwrap();
        assert_eq!(name.as_str(), "TechAdmin1");
    }

    #[test]
    fn test_parse_blank() {
        assert_eq!(Username::parse(""), Err(UsernameError::Blank));
        assert_eq!(Username::parse(" \t\n"), Err(UsernameError::Blank));
    }

    #[test]
    fn test_parse_preserves_input() {
        let name = Username::parse(" client1").unwrap();
        assert_eq!(name.as_str(), " client1");
    }

    #[test]
    fn test_parse_too_long() {
        let long = "a".repeat(Username::MAX_LENGTH + 1);
        assert!(matches!(
            Username::parse(&long),
            Err(UsernameError::TooLong { .. })
        ));
        assert!(Username::parse(&"a".repeat(Username::MAX_LENGTH)).is_ok());
    }

    #[test]
    fn test_length_counts_characters() {
        let greek = "α".repeat(Username::MAX_LENGTH);
        assert!(Username::parse(&greek).is_ok());
    }

    #[test]
    fn test_display() {
        let name = Username::parse("client2").unwrap();
        assert_eq!(format!("{name}"), "client2");
    }
}
