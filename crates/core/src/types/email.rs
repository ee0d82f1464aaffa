//! Email address type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Why a string is not an [`Email`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EmailError {
    #[error("email cannot be empty")]
    Empty,
    #[error("email must be at most {max} characters")]
    TooLong { max: usize },
    #[error("email cannot contain whitespace")]
    Whitespace,
    #[error("email must contain exactly one @ symbol")]
    AtSymbol,
    #[error("email local part cannot be empty")]
    EmptyLocalPart,
    #[error("email domain cannot be empty")]
    EmptyDomain,
}

/// A structurally valid email address.
///
/// This is the check a browser applies to `type="email"` inputs before a
/// form may submit: one `@` with something on both sides, no whitespace, at
/// most 254 characters. A top-level domain is not required, so `a@b`
/// passes; the storefront's on-blur feedback is stricter.
///
/// ```
/// use nutriharvest_core::Email;
///
/// assert!(Email::parse("orders@nutriharvest.in").is_ok());
/// assert!(Email::parse("orders@@nutriharvest.in").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    /// RFC 5321 path limit.
    pub const MAX_LENGTH: usize = 254;

    /// Parse an `Email` from a string.
    ///
    /// # Errors
    ///
    /// Returns the first structural rule the input breaks.
    pub fn parse(s: &str) -> Result<Self, EmailError> {
        if s.is_empty() {
            return Err(EmailError::Empty);
        }
        if s.len() > Self::MAX_LENGTH {
            return Err(EmailError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }
        if s.chars().any(char::is_whitespace) {
            return Err(EmailError::Whitespace);
        }

        match s.split_once('@') {
            Some((_, domain)) if domain.contains('@') => Err(EmailError::AtSymbol),
            Some(("", _)) => Err(EmailError::EmptyLocalPart),
            Some((_, "")) => Err(EmailError::EmptyDomain),
            Some(_) => Ok(Self(s.to_owned())),
            None => Err(EmailError::AtSymbol),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Everything after the `@`.
    #[must_use]
    pub fn domain(&self) -> &str {
        self.0.split_once('@').map_or("", |(_, domain)| domain)
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Email {
    type Err = EmailError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
