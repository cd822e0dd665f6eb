//! OEX account name type with validation.

use std::fmt::{self, Display};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::codec::RlpItem;
use crate::error::ParseAccountError;

/// An OEX account name.
///
/// Account names are lowercase ASCII made of letters, digits, `.` and `_`,
/// e.g. `"oexchain.account"` or `"alice123"`. The node applies the full
/// naming rules; this type only rejects names that can never be valid.
///
/// # Examples
///
/// ```
/// use oex_kit::AccountName;
///
/// let name: AccountName = "oexchain.dpos".parse().unwrap();
/// assert_eq!(name.as_str(), "oexchain.dpos");
///
/// assert!("Alice".parse::<AccountName>().is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccountName(String);

impl AccountName {
    /// Parse and validate an account name.
    pub fn new(s: impl Into<String>) -> Result<Self, ParseAccountError> {
        let s = s.into();
        Self::validate(&s)?;
        Ok(Self(s))
    }

    fn validate(s: &str) -> Result<(), ParseAccountError> {
        if s.is_empty() {
            return Err(ParseAccountError::Empty);
        }

        if s.len() > 64 {
            return Err(ParseAccountError::TooLong(s.to_string()));
        }

        if let Some(c) = s
            .chars()
            .find(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '.' || *c == '_'))
        {
            return Err(ParseAccountError::InvalidChar(s.to_string(), c));
        }

        Ok(())
    }

    /// Get the account name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for AccountName {
    type Err = ParseAccountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<&str> for AccountName {
    type Error = ParseAccountError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl TryFrom<String> for AccountName {
    type Error = ParseAccountError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<AccountName> for String {
    fn from(name: AccountName) -> Self {
        name.0
    }
}

impl AsRef<str> for AccountName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for AccountName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&AccountName> for RlpItem {
    fn from(name: &AccountName) -> Self {
        RlpItem::from(name.as_str())
    }
}
