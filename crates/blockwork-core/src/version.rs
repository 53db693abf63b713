//! Block version tokens.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A block version token.
///
/// Manifests may write the version as a string (`"1.2.0"`), an integer (`2`),
/// or a float (`0.1`). The token is kept as text; ordering compares
/// dot-separated numeric components, then the text itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct BlockVersion(String);

impl BlockVersion {
    /// Create a version from any token.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The version as written.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn numeric_parts(&self) -> Option<Vec<u64>> {
        self.0
            .split('.')
            .map(|part| part.trim().parse::<u64>().ok())
            .collect()
    }
}

impl<'de> Deserialize<'de> for BlockVersion {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Token {
            Text(String),
            Int(i64),
            Float(f64),
        }

        Ok(match Token::deserialize(deserializer)? {
            Token::Text(s) => Self(s),
            Token::Int(i) => Self(i.to_string()),
            Token::Float(f) => Self(f.to_string()),
        })
    }
}

impl Ord for BlockVersion {
    /// Numeric tokens order by their components, trailing zeros ignored, and
    /// sort before non-numeric tokens. Ties fall back to the raw text, so
    /// `cmp` is `Equal` exactly when the tokens are equal.
    fn cmp(&self, other: &Self) -> Ordering {
        let by_parts = match (self.numeric_parts(), other.numeric_parts()) {
            (Some(mut a), Some(mut b)) => {
                trim_zeros(&mut a);
                trim_zeros(&mut b);
                a.cmp(&b)
            },
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        by_parts.then_with(|| self.0.cmp(&other.0))
    }
}

fn trim_zeros(parts: &mut Vec<u64>) {
    while parts.last() == Some(&0) {
        parts.pop();
    }
}

impl PartialOrd for BlockVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for BlockVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
