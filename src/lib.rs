//! An ordered key-value index built on a Binary Search Tree, plus a small session layer for
//! applications that keep several such indexes (inventory by SKU, orders by id, suppliers and
//! shipments by id, ...).
//!
//! ## Binary Search Tree
//!
//! A Binary Search Tree is a data structure supporting operations to
//! insert, find, and delete stored records. BSTs are typically defined
//! recursively using the notion of a `Node`. A `Node` stores a key, the
//! value associated with it, and up to two child `Node`s. The most important
//! invariants of a BST are:
//!
//! 1. For every `Node` in a BST, all the `Node`s in its left subtree have a
//!    key less than its own key.
//! 2. For every `Node` in a BST, all the `Node`s in its right subtree have a
//!    key greater than its own key.
//!
//! > Note that some `Node`s have no children. These `Node`s are called "leaf nodes".
//!
//! Searching takes `O(height)` (where `height` is the longest path from the
//! root `Node` to a leaf `Node`) and the tree naturally supports sorted
//! iteration by visiting the left subtree, then the subtree root, then the
//! right subtree.
//!
//! [`OrderedIndex`] does **not** rebalance. Its height depends on insertion
//! order, so keys inserted in sorted order give a tree that is really a linked
//! list. Because of that nothing in this crate recurses over the tree.
//!
//! ## Concurrency
//!
//! Nothing here is internally synchronized. To share an index between threads
//! put the whole thing behind one lock (`Mutex<OrderedIndex<K, V>>`) and take it
//! for every operation, reads included.

#![deny(missing_docs, clippy::clone_on_ref_ptr)]

pub mod config;
pub mod error;
pub mod index;
pub mod session;


pub use config::{DuplicatePolicy, SessionConfig};
pub use error::{Error, Result};
pub use index::{DeleteOutcome, InsertOutcome, OrderedIndex};
pub use session::{Command, LoadSummary, Reply, Session, Statistics};
