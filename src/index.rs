//! An ordered, mutable key-value index backed by a plain (non-balancing) Binary Search Tree.
//!
//! Nodes live in an arena of slots and link to each other by slot index, so there is no recursive
//! ownership. Every operation (descent, traversal, drop) is iterative. This matters because
//! there is no rebalancing: inserting keys in sorted order produces a tree with one node per
//! level.
//!
//! # Examples
//!
//! ```
//! use ordered_index::{DeleteOutcome, InsertOutcome, OrderedIndex};
//!
//! let mut index = OrderedIndex::new();
//!
//! // Nothing in here yet.
//! assert_eq!(index.search(&1), None);
//!
//! assert!(index.insert(1, "one").is_inserted());
//! assert_eq!(index.search(&1), Some(&"one"));
//!
//! // Inserting an existing key is rejected and the stored value is left alone.
//! assert!(matches!(
//!     index.insert(1, "uno"),
//!     InsertOutcome::Rejected { existing: &"one", .. }
//! ));
//! assert_eq!(index.search(&1), Some(&"one"));
//!
//! // Deleting a key hands its value back.
//! assert_eq!(index.delete(&1), DeleteOutcome::Deleted("one"));
//! assert_eq!(index.delete(&1), DeleteOutcome::NotFound);
//! assert!(index.is_empty());
//! ```

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;
use std::iter::FusedIterator;
use std::mem;

/// An ordered key-value index. Keys are unique and kept in ascending order.
///
/// There is no rebalancing, so the shape of the tree is decided entirely by insertion order and
/// all operations are `O(height)`.
#[derive(Clone)]
pub struct OrderedIndex<K, V> {
    slots: Vec<Slot<K, V>>,
    /// Head of the list of vacant slots, threaded through [`Slot::Vacant`].
    free: Option<NodeId>,
    root: Option<NodeId>,
    len: usize,
}

/// Position of a node in the arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct NodeId(usize);

#[derive(Clone)]
enum Slot<K, V> {
    Occupied(Node<K, V>),
    Vacant { next: Option<NodeId> },
}

#[derive(Clone)]
struct Node<K, V> {
    key: K,
    value: V,
    left: Option<NodeId>,
    right: Option<NodeId>,
}

/// The link that points (or would point) at a node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Position {
    Root,
    Left(NodeId),
    Right(NodeId),
}

/// Result of descending the tree looking for a key.
enum Location {
    Occupied { id: NodeId, position: Position },
    Vacant(Position),
}

/// The outcome of [`OrderedIndex::insert`].
#[derive(Debug, PartialEq, Eq)]
pub enum InsertOutcome<'a, K, V> {
    /// The key was absent and a new entry was added.
    Inserted,
    /// The key was already present. The index is unchanged and the rejected key and value are
    /// handed back alongside the value already stored.
    Rejected {
        /// The key passed to `insert`.
        key: K,
        /// The value passed to `insert`.
        value: V,
        /// The value currently stored under the key.
        existing: &'a V,
    },
}

impl<'a, K, V> InsertOutcome<'a, K, V> {
    /// Whether a new entry was added.
    pub fn is_inserted(&self) -> bool {
        matches!(self, Self::Inserted)
    }

    /// The value already stored under the key, if the insert was rejected.
    pub fn existing(&self) -> Option<&'a V> {
        match self {
            Self::Inserted => None,
            Self::Rejected { existing, .. } => Some(*existing),
        }
    }
}

/// The outcome of [`OrderedIndex::delete`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DeleteOutcome<V> {
    /// The key was present. Its entry was removed and this is the value it held.
    Deleted(V),
    /// The key was absent and nothing changed.
    NotFound,
}

impl<V> DeleteOutcome<V> {
    /// Whether an entry was removed.
    pub fn is_deleted(&self) -> bool {
        matches!(self, Self::Deleted(_))
    }

    /// The removed value, if any.
    pub fn into_value(self) -> Option<V> {
        match self {
            Self::Deleted(value) => Some(value),
            Self::NotFound => None,
        }
    }
}

impl<K, V> Default for OrderedIndex<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> fmt::Debug for OrderedIndex<K, V>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// Two indexes are equal when they hold the same entries, whatever their shapes.
impl<K, V> PartialEq for OrderedIndex<K, V>
where
    K: PartialEq,
    V: PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().eq(other.iter())
    }
}

impl<K, V> Eq for OrderedIndex<K, V>
where
    K: Eq,
    V: Eq,
{
}

impl<K, V> OrderedIndex<K, V> {
    /// Generates a new, empty `OrderedIndex`.
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: None,
            root: None,
            len: 0,
        }
    }

    /// Number of entries in the index. This is maintained by `insert` and `delete` so it's `O(1)`.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the index holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free = None;
        self.root = None;
        self.len = 0;
    }

    /// The key stored at the root of the tree. Which key that is depends on insertion and deletion
    /// history: it's the first key inserted unless the root has since been deleted.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_index::OrderedIndex;
    ///
    /// let mut index = OrderedIndex::new();
    /// assert_eq!(index.root_key(), None);
    ///
    /// index.insert("SKU-200", ());
    /// index.insert("SKU-100", ());
    /// assert_eq!(index.root_key(), Some(&"SKU-200"));
    /// ```
    pub fn root_key(&self) -> Option<&K> {
        self.root.map(|id| &self.node(id).key)
    }

    /// Number of levels in the tree, `0` when it's empty. Sorted insertion gives a height equal to
    /// [`len`][Self::len].
    pub fn height(&self) -> usize {
        let mut height = 0;
        let mut level: Vec<NodeId> = self.root.into_iter().collect();
        while !level.is_empty() {
            height += 1;
            level = level
                .iter()
                .flat_map(|&id| {
                    let node = self.node(id);
                    [node.left, node.right]
                })
                .flatten()
                .collect();
        }

        height
    }

    /// The entry with the smallest key.
    pub fn first(&self) -> Option<(&K, &V)> {
        self.root
            .map(|root| self.leftmost(root, Position::Root).0)
            .map(|id| self.entry(id))
    }

    /// The entry with the largest key.
    pub fn last(&self) -> Option<(&K, &V)> {
        let mut current = self.root?;
        while let Some(right) = self.node(current).right {
            current = right;
        }

        Some(self.entry(current))
    }

    /// Lazily visits every entry in ascending key order. Every call starts a fresh traversal.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_index::OrderedIndex;
    ///
    /// let mut index = OrderedIndex::new();
    /// for key in [30, 60, 90, 45, 75, 15] {
    ///     index.insert(key, key * 10);
    /// }
    ///
    /// let keys: Vec<_> = index.iter().map(|(k, _)| *k).collect();
    /// assert_eq!(keys, [15, 30, 45, 60, 75, 90]);
    /// ```
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(self)
    }

    /// Inserts the given value at the given key if the key is absent. If the key is already
    /// present the index is left untouched and the insert is rejected; use
    /// [`upsert`][Self::upsert] to overwrite instead.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_index::{InsertOutcome, OrderedIndex};
    ///
    /// let mut index = OrderedIndex::new();
    /// assert_eq!(index.insert(30, "laptop"), InsertOutcome::Inserted);
    /// assert_eq!(
    ///     index.insert(30, "monitor"),
    ///     InsertOutcome::Rejected { key: 30, value: "monitor", existing: &"laptop" }
    /// );
    /// assert_eq!(index.len(), 1);
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> InsertOutcome<'_, K, V>
    where
        K: Ord,
    {
        match self.locate(&key) {
            Location::Occupied { id, .. } => InsertOutcome::Rejected {
                key,
                value,
                existing: &self.node(id).value,
            },
            Location::Vacant(position) => {
                self.attach(position, key, value);
                InsertOutcome::Inserted
            }
        }
    }

    /// Inserts the given value at the given key, overwriting the value of an existing entry. The
    /// overwritten value is returned.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_index::OrderedIndex;
    ///
    /// let mut index = OrderedIndex::new();
    /// assert_eq!(index.upsert(30, "laptop"), None);
    /// assert_eq!(index.upsert(30, "monitor"), Some("laptop"));
    /// assert_eq!(index.search(&30), Some(&"monitor"));
    /// ```
    pub fn upsert(&mut self, key: K, value: V) -> Option<V>
    where
        K: Ord,
    {
        match self.locate(&key) {
            Location::Occupied { id, .. } => Some(mem::replace(&mut self.node_mut(id).value, value)),
            Location::Vacant(position) => {
                self.attach(position, key, value);
                None
            }
        }
    }

    /// Potentially finds the value associated with the given key. If no entry has the key, `None`
    /// is returned.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_index::OrderedIndex;
    ///
    /// let mut index = OrderedIndex::new();
    /// index.insert(String::from("SKU-100"), 4);
    ///
    /// assert_eq!(index.search("SKU-100"), Some(&4));
    /// assert_eq!(index.search("SKU-999"), None);
    /// ```
    pub fn search<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        match self.locate(key) {
            Location::Occupied { id, .. } => Some(&self.node(id).value),
            Location::Vacant(_) => None,
        }
    }

    /// Like [`search`][Self::search] but gives mutable access to the value. Keys are never
    /// handed out mutably so this can't break the ordering.
    pub fn search_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        match self.locate(key) {
            Location::Occupied { id, .. } => Some(&mut self.node_mut(id).value),
            Location::Vacant(_) => None,
        }
    }

    /// Whether an entry with the given key exists.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        matches!(self.locate(key), Location::Occupied { .. })
    }

    /// Deletes the entry with the given key and returns its value. If the index has no such entry,
    /// nothing happens.
    ///
    /// A node with two children isn't unlinked itself. Its in-order successor (the smallest key in
    /// its right subtree) is unlinked instead and the successor's key and value move into the
    /// node.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_index::{DeleteOutcome, OrderedIndex};
    ///
    /// let mut index = OrderedIndex::new();
    /// index.insert(1, 2);
    ///
    /// assert_eq!(index.delete(&1), DeleteOutcome::Deleted(2));
    /// assert_eq!(index.delete(&1), DeleteOutcome::NotFound);
    /// ```
    pub fn delete<Q>(&mut self, key: &Q) -> DeleteOutcome<V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let (id, position) = match self.locate(key) {
            Location::Occupied { id, position } => (id, position),
            Location::Vacant(_) => return DeleteOutcome::NotFound,
        };

        let node = self.node(id);
        let value = match (node.left, node.right) {
            (Some(_), Some(right)) => {
                let (successor, successor_position) = self.leftmost(right, Position::Right(id));
                // The successor has no left child so it's spliced out like a single-child node.
                let successor_right = self.node(successor).right;
                self.relink(successor_position, successor_right);
                let successor = self.release(successor);

                let target = self.node_mut(id);
                target.key = successor.key;
                mem::replace(&mut target.value, successor.value)
            }
            (child, None) | (None, child) => {
                self.relink(position, child);
                self.release(id).value
            }
        };
        self.len -= 1;

        DeleteOutcome::Deleted(value)
    }

    /// Descends from the root looking for `key`.
    fn locate<Q>(&self, key: &Q) -> Location
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut position = Position::Root;
        let mut current = self.root;
        while let Some(id) = current {
            let node = self.node(id);
            match key.cmp(node.key.borrow()) {
                Ordering::Less => {
                    position = Position::Left(id);
                    current = node.left;
                }
                Ordering::Equal => return Location::Occupied { id, position },
                Ordering::Greater => {
                    position = Position::Right(id);
                    current = node.right;
                }
            }
        }

        Location::Vacant(position)
    }

    /// Follows left children from `id` (which is linked from `position`) until there are none.
    fn leftmost(&self, mut id: NodeId, mut position: Position) -> (NodeId, Position) {
        while let Some(left) = self.node(id).left {
            position = Position::Left(id);
            id = left;
        }

        (id, position)
    }

    /// Allocates a leaf for the entry and hangs it off the vacant `position`.
    fn attach(&mut self, position: Position, key: K, value: V)
    where
        K: Ord,
    {
        let id = self.allocate(Node {
            key,
            value,
            left: None,
            right: None,
        });
        self.relink(position, Some(id));
        self.len += 1;

        if cfg!(debug_assertions) {
            match position {
                Position::Root => {}
                Position::Left(parent) => assert!(self.node(parent).key > self.node(id).key),
                Position::Right(parent) => assert!(self.node(parent).key < self.node(id).key),
            }
        }
    }

    /// Points the link at `position` to `child`.
    fn relink(&mut self, position: Position, child: Option<NodeId>) {
        match position {
            Position::Root => self.root = child,
            Position::Left(parent) => self.node_mut(parent).left = child,
            Position::Right(parent) => self.node_mut(parent).right = child,
        }
    }

    fn allocate(&mut self, node: Node<K, V>) -> NodeId {
        match self.free {
            Some(id) => {
                match mem::replace(&mut self.slots[id.0], Slot::Occupied(node)) {
                    Slot::Vacant { next } => self.free = next,
                    Slot::Occupied(_) => unreachable!("free list points at an occupied slot"),
                }
                id
            }
            None => {
                self.slots.push(Slot::Occupied(node));
                NodeId(self.slots.len() - 1)
            }
        }
    }

    /// Vacates the slot of a node that is no longer linked from anywhere and returns the node.
    fn release(&mut self, id: NodeId) -> Node<K, V> {
        let vacant = Slot::Vacant { next: self.free };
        match mem::replace(&mut self.slots[id.0], vacant) {
            Slot::Occupied(node) => {
                self.free = Some(id);
                node
            }
            Slot::Vacant { .. } => unreachable!("released a vacant slot"),
        }
    }

    fn node(&self, id: NodeId) -> &Node<K, V> {
        match &self.slots[id.0] {
            Slot::Occupied(node) => node,
            Slot::Vacant { .. } => unreachable!("link to a vacant slot"),
        }
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node<K, V> {
        match &mut self.slots[id.0] {
            Slot::Occupied(node) => node,
            Slot::Vacant { .. } => unreachable!("link to a vacant slot"),
        }
    }

    fn entry(&self, id: NodeId) -> (&K, &V) {
        let node = self.node(id);
        (&node.key, &node.value)
    }
}

impl<K, V> Extend<(K, V)> for OrderedIndex<K, V>
where
    K: Ord,
{
    /// Inserts every pair. Later duplicates of a key are rejected like they are in
    /// [`OrderedIndex::insert`].
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K, V> FromIterator<(K, V)> for OrderedIndex<K, V>
where
    K: Ord,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut index = Self::new();
        index.extend(iter);
        index
    }
}

impl<'a, K, V> IntoIterator for &'a OrderedIndex<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K, V> IntoIterator for OrderedIndex<K, V> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter::new(self)
    }
}

/// In-order iterator over the entries of an [`OrderedIndex`]. Created by
/// [`OrderedIndex::iter`].
pub struct Iter<'a, K, V> {
    index: &'a OrderedIndex<K, V>,
    /// Nodes whose left subtree has been (or is being) visited but which haven't been yielded.
    stack: Vec<NodeId>,
    remaining: usize,
}

impl<'a, K, V> Iter<'a, K, V> {
    fn new(index: &'a OrderedIndex<K, V>) -> Self {
        let mut iter = Self {
            index,
            stack: Vec::new(),
            remaining: index.len,
        };
        iter.descend_left(index.root);
        iter
    }

    fn descend_left(&mut self, mut link: Option<NodeId>) {
        while let Some(id) = link {
            self.stack.push(id);
            link = self.index.node(id).left;
        }
    }
}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            index: self.index,
            stack: self.stack.clone(),
            remaining: self.remaining,
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        let index = self.index;
        let node = index.node(id);
        self.descend_left(node.right);
        self.remaining -= 1;

        Some((&node.key, &node.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}
impl<K, V> FusedIterator for Iter<'_, K, V> {}

/// Owning in-order iterator over the entries of an [`OrderedIndex`].
pub struct IntoIter<K, V> {
    index: OrderedIndex<K, V>,
    stack: Vec<NodeId>,
}

impl<K, V> IntoIter<K, V> {
    fn new(index: OrderedIndex<K, V>) -> Self {
        let root = index.root;
        let mut iter = Self {
            index,
            stack: Vec::new(),
        };
        iter.descend_left(root);
        iter
    }

    fn descend_left(&mut self, mut link: Option<NodeId>) {
        while let Some(id) = link {
            self.stack.push(id);
            link = self.index.node(id).left;
        }
    }
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        // Only nodes on the stack and below are read after this, so the slot can go.
        let node = self.index.release(id);
        self.index.len -= 1;
        self.descend_left(node.right);

        Some((node.key, node.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.index.len, Some(self.index.len))
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {}
impl<K, V> FusedIterator for IntoIter<K, V> {}
