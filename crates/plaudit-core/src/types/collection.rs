//! Collection name type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, InvalidInputError};

/// A validated collection name.
///
/// Collection names identify a named set of documents within a store.
///
/// # Example
///
/// ```
/// use plaudit_core::CollectionName;
///
/// let collection = CollectionName::new("testimonials").unwrap();
/// assert_eq!(collection.as_str(), "testimonials");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CollectionName(String);

impl CollectionName {
    /// Create a new collection name from a string, validating the format.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not a valid collection name.
    pub fn new(s: impl Into<String>) -> Result<Self, Error> {
        let s = s.into();
        Self::validate(&s)?;
        Ok(Self(s))
    }

    /// Returns the collection name string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate(s: &str) -> Result<(), Error> {
        // - 1-128 characters
        // - Can contain: a-z, A-Z, 0-9, ., -, _
        // - Cannot be "." or ".."

        if s.is_empty() {
            return Err(InvalidInputError::CollectionName {
                value: s.to_string(),
                reason: "cannot be empty".to_string(),
            }
            .into());
        }

        if s.len() > 128 {
            return Err(InvalidInputError::CollectionName {
                value: s.to_string(),
                reason: "exceeds maximum length of 128 characters".to_string(),
            }
            .into());
        }

        if s == "." || s == ".." {
            return Err(InvalidInputError::CollectionName {
                value: s.to_string(),
                reason: "cannot be '.' or '..'".to_string(),
            }
            .into());
        }

        for c in s.chars() {
            if !c.is_ascii_alphanumeric() && c != '.' && c != '-' && c != '_' {
                return Err(InvalidInputError::CollectionName {
                    value: s.to_string(),
                    reason: format!("contains invalid character '{}'", c),
                }
                .into());
            }
        }

        Ok(())
    }
}

impl fmt::Display for CollectionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for CollectionName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for CollectionName {
    type Error = Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<CollectionName> for String {
    fn from(collection: CollectionName) -> Self {
        collection.0
    }
}

impl AsRef<str> for CollectionName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_name() {
        let collection = CollectionName::new("testimonials").unwrap();
        assert_eq!(collection.as_str(), "testimonials");
    }

    #[test]
    fn valid_dotted_name() {
        let collection = CollectionName::new("app.plaudit.testimonials").unwrap();
        assert_eq!(collection.as_str(), "app.plaudit.testimonials");
    }

    #[test]
    fn invalid_empty() {
        assert!(CollectionName::new("").is_err());
    }

    #[test]
    fn invalid_dot() {
        assert!(CollectionName::new(".").is_err());
        assert!(CollectionName::new("..").is_err());
    }

    #[test]
    fn invalid_slash() {
        assert!(CollectionName::new("a/b").is_err());
    }
}
