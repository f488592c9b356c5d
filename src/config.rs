//! Session configuration.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// What a session does when asked to insert a key that's already present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicatePolicy {
    /// Leave the stored value alone and report [`Error::KeyAlreadyExists`].
    #[default]
    Reject,
    /// Replace the stored value.
    Overwrite,
}

impl FromStr for DuplicatePolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reject" => Ok(Self::Reject),
            "overwrite" => Ok(Self::Overwrite),
            other => Err(Error::InvalidConfig(format!(
                "unknown duplicate policy `{other}`, expected `reject` or `overwrite`"
            ))),
        }
    }
}

impl fmt::Display for DuplicatePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Reject => "reject",
            Self::Overwrite => "overwrite",
        })
    }
}

/// Configuration for a [`Session`][crate::Session].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SessionConfig {
    /// How inserts of existing keys are handled.
    pub duplicate_policy: DuplicatePolicy,
    /// An index to create and select when the session starts.
    pub default_index: Option<String>,
}

impl SessionConfig {
    /// Environment variable holding the [`DuplicatePolicy`].
    pub const DUPLICATE_POLICY_ENV: &'static str = "ORDERED_INDEX_DUPLICATE_POLICY";
    /// Environment variable holding the default index name.
    pub const DEFAULT_INDEX_ENV: &'static str = "ORDERED_INDEX_DEFAULT_INDEX";

    /// Load from environment variables. Unset variables keep their defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let duplicate_policy = lookup(Self::DUPLICATE_POLICY_ENV)
            .map(|policy| policy.parse::<DuplicatePolicy>())
            .transpose()?
            .unwrap_or_default();
        let default_index = lookup(Self::DEFAULT_INDEX_ENV)
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty());

        Ok(Self {
            duplicate_policy,
            default_index,
        })
    }
}
