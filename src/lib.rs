//! This crate exposes a self-balancing AVL tree along with a few classic data structures it is
//! measured against, mostly for educational purposes.
//!
//! ## Binary Search Tree
//!
//! A Binary Search Tree is a data structure supporting operations to
//! insert, find, and delete stored keys. BSTs are typically defined
//! recursively using the notion of a `Node`. A `Node` stores a key and
//! will sometimes have child `Node`s. The most important invariants of a BST are:
//!
//! 1. For every `Node` in a BST, all the `Node`s in its left subtree have a
//!    key less than its own key.
//! 2. For every `Node` in a BST, all the `Node`s in its right subtree have a
//!    key greater than its own key.
//!
//! > Note that some `Node`s have no children. These `Node`s are called "leaf nodes".
//!
//! Searching for a key takes `O(height)`, where `height` is the longest path from the root
//! `Node` to a leaf `Node`. A plain [`bst::Tree`] makes no effort to keep that path short, so
//! sorted input turns it into a linked list.
//!
//! ## AVL Tree
//!
//! An [`AvlTree`] additionally requires that, for every `Node`, the heights of its two subtrees
//! differ by at most one. Every insert and delete retraces the path back to the root and rotates
//! any `Node` whose balance factor reached `±2`, which keeps the height within `1.44 lg N`.
//!
//! ## Everything else
//!
//! [`graph::Graph`] is an adjacency list graph with depth and breadth first traversals.
//! [`hash_table::HashTable`] is a separate chaining hash table of strings.

#![deny(missing_docs, clippy::clone_on_ref_ptr)]

pub mod avl;
pub mod bst;
pub mod graph;
pub mod hash_table;

mod arena;
mod util;

#[cfg(test)]
mod test {
    pub(crate) mod quick;
}

pub use avl::{AvlTree, NodeRef};
