//! Account identifiers and the identity-tag value type.

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::RegistryError;

/// Anchored tag shape: two uppercase letters followed by six digits.
static TAG_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z]{2}[0-9]{6}$").expect("tag pattern is valid"));

/// Opaque external account identifier (a platform snowflake).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(i64);

impl AccountId {
    /// Wrap a raw platform identifier.
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// Get the raw identifier, e.g. for store parameters.
    pub const fn as_i64(&self) -> i64 {
        self.0
    }
}

impl From<i64> for AccountId {
    fn from(raw: i64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Externally issued identity tag, e.g. `RC463713`.
///
/// Values are constructed only through [`IdentityTag::parse`], so every
/// live `IdentityTag` satisfies the format rule. Equality is exact string
/// match; no case folding happens here. The registration and scanning
/// entry points both normalize to uppercase before reaching this type, so
/// the two paths cannot disagree on case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct IdentityTag(String);

impl IdentityTag {
    /// Exact length of a well-formed tag.
    pub const LEN: usize = 8;

    /// Validate tag syntax without constructing a value.
    ///
    /// Accepts exactly eight characters, two in `A-Z` followed by six in
    /// `0-9`. No trimming, no case folding. Total and pure.
    pub fn is_valid_format(candidate: &str) -> bool {
        TAG_PATTERN.is_match(candidate)
    }

    /// Parse an exact-case candidate into a tag.
    pub fn parse(candidate: &str) -> Result<Self, RegistryError> {
        if Self::is_valid_format(candidate) {
            Ok(Self(candidate.to_owned()))
        } else {
            Err(RegistryError::FormatInvalid {
                candidate: candidate.to_owned(),
            })
        }
    }

    /// The tag as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IdentityTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for IdentityTag {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for IdentityTag {
    type Error = RegistryError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<IdentityTag> for String {
    fn from(tag: IdentityTag) -> Self {
        tag.0
    }
}

// ============================================================================
// TESTS
// ============================================================================


// ============================================================================
// PROPERTY-BASED TESTS
// ============================================================================
