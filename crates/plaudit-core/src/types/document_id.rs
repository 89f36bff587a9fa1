//! Document id type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, InvalidInputError};

/// A validated document identifier.
///
/// Document ids are assigned by the store on creation, are stable for the
/// document's lifetime, unique within a collection, and never reused after
/// deletion. Clients treat them as opaque.
///
/// # Example
///
/// ```
/// use plaudit_core::DocumentId;
///
/// let id = DocumentId::new("9f61c2a0d4e84b7f").unwrap();
/// assert_eq!(id.as_str(), "9f61c2a0d4e84b7f");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DocumentId(String);

impl DocumentId {
    /// Create a new document id from a string, validating the format.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not a valid document id.
    pub fn new(s: impl Into<String>) -> Result<Self, Error> {
        let s = s.into();
        Self::validate(&s)?;
        Ok(Self(s))
    }

    /// Returns the id string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate(s: &str) -> Result<(), Error> {
        // - 1-512 characters
        // - Can contain: a-z, A-Z, 0-9, ., -, _, ~
        // - Cannot be "." or ".."

        if s.is_empty() {
            return Err(InvalidInputError::DocumentId {
                value: s.to_string(),
                reason: "cannot be empty".to_string(),
            }
            .into());
        }

        if s.len() > 512 {
            return Err(InvalidInputError::DocumentId {
                value: s.to_string(),
                reason: "exceeds maximum length of 512 characters".to_string(),
            }
            .into());
        }

        if s == "." || s == ".." {
            return Err(InvalidInputError::DocumentId {
                value: s.to_string(),
                reason: "cannot be '.' or '..'".to_string(),
            }
            .into());
        }

        for c in s.chars() {
            if !c.is_ascii_alphanumeric() && c != '.' && c != '-' && c != '_' && c != '~' {
                return Err(InvalidInputError::DocumentId {
                    value: s.to_string(),
                    reason: format!("contains invalid character '{}'", c),
                }
                .into());
            }
        }

        Ok(())
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for DocumentId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for DocumentId {
    type Error = Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<DocumentId> for String {
    fn from(id: DocumentId) -> Self {
        id.0
    }
}

impl AsRef<str> for DocumentId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
