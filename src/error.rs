//! Errors reported by the [`Session`][crate::Session] layer.
//!
//! The index itself never fails: a duplicate insert or a missing key are ordinary
//! [`InsertOutcome`][crate::InsertOutcome] / [`DeleteOutcome`][crate::DeleteOutcome] values. The
//! session turns those outcomes into errors so command handlers can use `?`.

use thiserror::Error;

/// Errors from session commands and configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// An insert was rejected because the key is already present.
    #[error("key {key} already exists in index `{index}`")]
    KeyAlreadyExists {
        /// Name of the index the insert targeted.
        index: String,
        /// The rejected key, rendered with `Debug`.
        key: String,
    },

    /// A lookup, update or delete named a key that isn't present.
    #[error("key {key} not found in index `{index}`")]
    KeyNotFound {
        /// Name of the index that was searched.
        index: String,
        /// The missing key, rendered with `Debug`.
        key: String,
    },

    /// A command needs an active index but none has been selected.
    #[error("no index selected")]
    NoIndexSelected,

    /// No index with this name exists in the session.
    #[error("unknown index `{0}`")]
    UnknownIndex(String),

    /// An index with this name already exists in the session.
    #[error("index `{0}` already exists")]
    IndexAlreadyExists(String),

    /// A configuration value couldn't be parsed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result alias defaulting to [`Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;
