//! A session over several named indexes.
//!
//! A `Session` is the context every command handler works against: it owns the indexes (the
//! inventory, the orders, the suppliers...), remembers which one is selected, and applies the
//! configured [`DuplicatePolicy`]. Handlers take the session explicitly; there is no global state.
//!
//! # Examples
//!
//! ```
//! use ordered_index::{Command, Error, Reply, Session, SessionConfig};
//!
//! let mut session = Session::new(SessionConfig::default());
//! session.create_index("orders")?;
//! session.select("orders")?;
//!
//! session.execute(Command::Insert(30, "Laptop"))?;
//! session.execute(Command::Insert(15, "Earphone"))?;
//!
//! assert_eq!(session.execute(Command::Search(30))?, Reply::Found("Laptop"));
//! assert!(matches!(
//!     session.execute(Command::Insert(30, "Monitor")),
//!     Err(Error::KeyAlreadyExists { .. })
//! ));
//! assert_eq!(
//!     session.execute(Command::List)?,
//!     Reply::Listing(vec![(15, "Earphone"), (30, "Laptop")])
//! );
//! # Ok::<(), Error>(())
//! ```

use std::fmt;
use std::mem;

use tracing::{debug, info, warn};

use crate::config::{DuplicatePolicy, SessionConfig};
use crate::error::{Error, Result};
use crate::index::{InsertOutcome, Iter, OrderedIndex};

/// A set of named indexes with one of them selected.
#[derive(Debug)]
pub struct Session<K, V> {
    config: SessionConfig,
    indexes: OrderedIndex<String, OrderedIndex<K, V>>,
    selected: Option<String>,
}

/// A request against the selected index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command<K, V> {
    /// Add an entry, following the session's [`DuplicatePolicy`].
    Insert(K, V),
    /// Look a key up.
    Search(K),
    /// Replace the value of an existing key.
    Update(K, V),
    /// Remove a key.
    Delete(K),
    /// Every entry in key order.
    List,
    /// Entry counts for every index.
    Stats,
}

/// The successful result of a [`Command`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply<K, V> {
    /// A new entry was added.
    Inserted,
    /// An existing entry was overwritten under [`DuplicatePolicy::Overwrite`]. Holds the old value.
    Replaced(V),
    /// The value stored under the searched key.
    Found(V),
    /// The value was replaced. Holds the old value.
    Updated(V),
    /// The entry was removed. Holds its value.
    Deleted(V),
    /// Every entry in key order.
    Listing(Vec<(K, V)>),
    /// Entry counts.
    Stats(Statistics),
}

/// Entry counts of a session's indexes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Statistics {
    /// Each index name with its entry count, ordered by name.
    pub indexes: Vec<(String, usize)>,
    /// Sum of all entry counts.
    pub total: usize,
}

/// What happened during [`Session::load`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadSummary {
    /// Records stored under a new key.
    pub inserted: usize,
    /// Records whose key was already present. They were skipped or overwrote the old value
    /// depending on the [`DuplicatePolicy`].
    pub duplicates: usize,
}

impl<K, V> Default for Session<K, V> {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

impl<K, V> Session<K, V> {
    /// Creates a session. If the config names a default index it is created and selected.
    pub fn new(config: SessionConfig) -> Self {
        let mut indexes = OrderedIndex::new();
        let selected = config.default_index.clone();
        if let Some(name) = &selected {
            indexes.insert(name.clone(), OrderedIndex::new());
        }

        Self {
            config,
            indexes,
            selected,
        }
    }

    /// The configuration this session was created with.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Adds a new, empty index.
    pub fn create_index(&mut self, name: impl Into<String>) -> Result<()> {
        match self.indexes.insert(name.into(), OrderedIndex::new()) {
            InsertOutcome::Inserted => Ok(()),
            InsertOutcome::Rejected { key, .. } => Err(Error::IndexAlreadyExists(key)),
        }
    }

    /// Removes an index and returns it. If it was selected, nothing is selected afterwards.
    pub fn drop_index(&mut self, name: &str) -> Result<OrderedIndex<K, V>> {
        let index = self
            .indexes
            .delete(name)
            .into_value()
            .ok_or_else(|| Error::UnknownIndex(name.to_string()))?;
        if self.selected.as_deref() == Some(name) {
            self.selected = None;
        }
        info!(index = name, entries = index.len(), "dropped index");

        Ok(index)
    }

    /// Makes `name` the index that commands run against.
    pub fn select(&mut self, name: &str) -> Result<()> {
        if !self.indexes.contains_key(name) {
            return Err(Error::UnknownIndex(name.to_string()));
        }
        debug!(index = name, "selected index");
        self.selected = Some(name.to_string());

        Ok(())
    }

    /// Name of the selected index.
    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// The index with the given name.
    pub fn index(&self, name: &str) -> Option<&OrderedIndex<K, V>> {
        self.indexes.search(name)
    }

    /// Names of all indexes, in order.
    pub fn index_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.indexes.iter().map(|(name, _)| name.as_str())
    }

    /// Entry counts of every index.
    pub fn stats(&self) -> Statistics {
        let indexes: Vec<_> = self
            .indexes
            .iter()
            .map(|(name, index)| (name.clone(), index.len()))
            .collect();
        let total = indexes.iter().map(|(_, len)| len).sum();

        Statistics { indexes, total }
    }

    fn active(&self) -> Result<(&str, &OrderedIndex<K, V>)> {
        let name = self.selected.as_deref().ok_or(Error::NoIndexSelected)?;
        let index = self
            .indexes
            .search(name)
            .ok_or_else(|| Error::UnknownIndex(name.to_string()))?;

        Ok((name, index))
    }

    fn active_mut(&mut self) -> Result<(&str, &mut OrderedIndex<K, V>)> {
        let name = self.selected.as_deref().ok_or(Error::NoIndexSelected)?;
        let index = self
            .indexes
            .search_mut(name)
            .ok_or_else(|| Error::UnknownIndex(name.to_string()))?;

        Ok((name, index))
    }
}

impl<K, V> Session<K, V>
where
    K: Ord + fmt::Debug,
{
    /// Adds an entry to the selected index. Under [`DuplicatePolicy::Reject`] an existing key is
    /// an error; under [`DuplicatePolicy::Overwrite`] the old value is replaced and returned.
    pub fn insert(&mut self, key: K, value: V) -> Result<Option<V>> {
        let policy = self.config.duplicate_policy;
        let (name, index) = self.active_mut()?;

        match policy {
            DuplicatePolicy::Reject => {
                let rejected = match index.insert(key, value) {
                    InsertOutcome::Inserted => None,
                    InsertOutcome::Rejected { key, .. } => Some(key),
                };
                if let Some(key) = rejected {
                    warn!(index = name, key = ?key, "rejected duplicate key");
                    return Err(key_already_exists(name, &key));
                }
                debug!(index = name, entries = index.len(), "inserted entry");

                Ok(None)
            }
            DuplicatePolicy::Overwrite => {
                let previous = index.upsert(key, value);
                debug!(
                    index = name,
                    entries = index.len(),
                    replaced = previous.is_some(),
                    "upserted entry"
                );

                Ok(previous)
            }
        }
    }

    /// Looks `key` up in the selected index.
    pub fn search(&self, key: &K) -> Result<&V> {
        let (name, index) = self.active()?;
        index.search(key).ok_or_else(|| key_not_found(name, key))
    }

    /// Replaces the value stored under an existing key and returns the old one.
    pub fn update(&mut self, key: K, value: V) -> Result<V> {
        let (name, index) = self.active_mut()?;
        match index.search_mut(&key) {
            Some(slot) => {
                debug!(index = name, key = ?key, "updated entry");
                Ok(mem::replace(slot, value))
            }
            None => {
                warn!(index = name, key = ?key, "update of missing key");
                Err(key_not_found(name, &key))
            }
        }
    }

    /// Removes `key` from the selected index and returns its value.
    pub fn delete(&mut self, key: &K) -> Result<V> {
        let (name, index) = self.active_mut()?;
        match index.delete(key).into_value() {
            Some(value) => {
                debug!(index = name, key = ?key, entries = index.len(), "deleted entry");
                Ok(value)
            }
            None => {
                warn!(index = name, key = ?key, "delete of missing key");
                Err(key_not_found(name, key))
            }
        }
    }

    /// Every entry of the selected index, in key order.
    pub fn entries(&self) -> Result<Iter<'_, K, V>> {
        self.active().map(|(_, index)| index.iter())
    }

    /// Inserts a batch of records into the selected index, as a record loader would. Duplicate
    /// keys don't stop the load: they are counted and handled according to the
    /// [`DuplicatePolicy`].
    pub fn load(&mut self, records: impl IntoIterator<Item = (K, V)>) -> Result<LoadSummary> {
        let policy = self.config.duplicate_policy;
        let (name, index) = self.active_mut()?;

        let mut summary = LoadSummary::default();
        for (key, value) in records {
            let duplicate = match policy {
                DuplicatePolicy::Reject => match index.insert(key, value) {
                    InsertOutcome::Inserted => false,
                    InsertOutcome::Rejected { key, .. } => {
                        warn!(index = name, key = ?key, "skipped duplicate record");
                        true
                    }
                },
                DuplicatePolicy::Overwrite => index.upsert(key, value).is_some(),
            };
            if duplicate {
                summary.duplicates += 1;
            } else {
                summary.inserted += 1;
            }
        }
        info!(
            index = name,
            inserted = summary.inserted,
            duplicates = summary.duplicates,
            "loaded records"
        );

        Ok(summary)
    }
}

impl<K, V> Session<K, V>
where
    K: Ord + Clone + fmt::Debug,
    V: Clone,
{
    /// Runs a command against the session. Returned values are copies; nothing in the reply
    /// refers back into the index.
    pub fn execute(&mut self, command: Command<K, V>) -> Result<Reply<K, V>> {
        match command {
            Command::Insert(key, value) => Ok(match self.insert(key, value)? {
                Some(previous) => Reply::Replaced(previous),
                None => Reply::Inserted,
            }),
            Command::Search(key) => self.search(&key).cloned().map(Reply::Found),
            Command::Update(key, value) => self.update(key, value).map(Reply::Updated),
            Command::Delete(key) => self.delete(&key).map(Reply::Deleted),
            Command::List => Ok(Reply::Listing(
                self.entries()?
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect(),
            )),
            Command::Stats => Ok(Reply::Stats(self.stats())),
        }
    }
}

fn key_already_exists<K: fmt::Debug>(index: &str, key: &K) -> Error {
    Error::KeyAlreadyExists {
        index: index.to_string(),
        key: format!("{key:?}"),
    }
}

fn key_not_found<K: fmt::Debug>(index: &str, key: &K) -> Error {
    Error::KeyNotFound {
        index: index.to_string(),
        key: format!("{key:?}"),
    }
}
