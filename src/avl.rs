//! A self-balancing Binary Search Tree (specifically, an AVL tree) storing a set of keys.
//!
//! Nodes live in an arena and are linked by index. Every node caches its height and balance
//! factor, and every insert or delete recomputes them on the way back up from the changed leaf,
//! rotating wherever a balance factor reaches `±2`. This keeps the height at `O(lg N)`.
//!
//! # Examples
//!
//! ```
//! use avltree::avl::AvlTree;
//!
//! let mut tree = AvlTree::new();
//!
//! // Nothing in here yet.
//! assert!(tree.search(&1).is_none());
//!
//! // Ascending inserts would make a plain BST a linked list. Here they rotate.
//! tree.insert(10);
//! tree.insert(20);
//! tree.insert(30);
//!
//! let root = tree.root().unwrap();
//! assert_eq!(*root.key(), 20);
//! assert_eq!(root.balance_factor(), 0);
//!
//! // Inserting a key twice does nothing.
//! assert!(!tree.insert(20));
//! assert_eq!(tree.len(), 3);
//!
//! // Deleting an absent key does nothing either.
//! assert!(tree.delete(&10));
//! assert!(!tree.delete(&10));
//! assert_eq!(tree.in_order().iter().map(|n| *n.key()).collect::<Vec<_>>(), [20, 30]);
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::ptr;

use log::{debug, trace};

use crate::arena::{Arena, NodeId, EMPTY_HEIGHT};
use crate::util::Order;

/// A self-balancing Binary Search Tree (specifically, an AVL tree). This can be used for
/// inserting, searching, and deleting keys, and for walking them in pre-, in- or post-order.
///
/// The tree is not synchronized. Mutation takes `&mut self`, so sharing it between threads that
/// mutate it requires an external lock.
#[derive(Clone)]
pub struct AvlTree<K> {
    arena: Arena<K>,
    root: Option<NodeId>,
    len: usize,
}

impl<K> Default for AvlTree<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> fmt::Debug for AvlTree<K>
where
    K: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AvlTree")
            .field("len", &self.len)
            .field("root", &self.root())
            .finish()
    }
}

impl<K> AvlTree<K> {
    /// Generate a new, empty `AvlTree`.
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            root: None,
            len: 0,
        }
    }

    /// The number of keys stored in the tree. This is `O(1)`.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the tree holds no keys.
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// The height of the tree: `-1` when empty, `0` for a single node.
    pub fn height(&self) -> isize {
        self.height_of(self.root)
    }

    /// The root node, if there is one.
    pub fn root(&self) -> Option<NodeRef<'_, K>> {
        self.root.map(|id| self.node(id))
    }

    /// The node holding the smallest key, if the tree isn't empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use avltree::avl::AvlTree;
    ///
    /// let mut tree: AvlTree<i32> = [5, 3, 8].into_iter().collect();
    /// assert_eq!(tree.minimum().map(|n| *n.key()), Some(3));
    ///
    /// tree.clear();
    /// assert!(tree.minimum().is_none());
    /// ```
    pub fn minimum(&self) -> Option<NodeRef<'_, K>> {
        self.root.map(|root| self.node(self.minimum_of(root)))
    }

    /// The node holding the largest key, if the tree isn't empty.
    pub fn maximum(&self) -> Option<NodeRef<'_, K>> {
        self.root.map(|root| self.node(self.maximum_of(root)))
    }

    /// The nodes in root, left, right order.
    pub fn pre_order(&self) -> Vec<NodeRef<'_, K>> {
        self.collect(Order::Pre)
    }

    /// The nodes in left, root, right order, i.e. sorted by key.
    pub fn in_order(&self) -> Vec<NodeRef<'_, K>> {
        self.collect(Order::In)
    }

    /// The nodes in left, right, root order.
    pub fn post_order(&self) -> Vec<NodeRef<'_, K>> {
        self.collect(Order::Post)
    }

    /// A lazy iterator over the keys in ascending order.
    pub fn iter(&self) -> Iter<'_, K> {
        let mut iter = Iter {
            tree: self,
            stack: Vec::new(),
            remaining: self.len,
        };
        iter.push_left(self.root);
        iter
    }

    /// Removes every key.
    pub fn clear(&mut self) {
        self.arena.clear();
        self.root = None;
        self.len = 0;
    }

    fn node(&self, id: NodeId) -> NodeRef<'_, K> {
        NodeRef { tree: self, id }
    }

    fn height_of(&self, link: Option<NodeId>) -> isize {
        link.map_or(EMPTY_HEIGHT, |id| self.arena[id].height)
    }

    fn minimum_of(&self, mut id: NodeId) -> NodeId {
        while let Some(left) = self.arena[id].left {
            id = left;
        }
        id
    }

    fn maximum_of(&self, mut id: NodeId) -> NodeId {
        while let Some(right) = self.arena[id].right {
            id = right;
        }
        id
    }

    fn collect(&self, order: Order) -> Vec<NodeRef<'_, K>> {
        let mut ids = Vec::with_capacity(self.len);
        self.walk(self.root, order, &mut ids);
        ids.into_iter().map(|id| self.node(id)).collect()
    }

    fn walk(&self, link: Option<NodeId>, order: Order, out: &mut Vec<NodeId>) {
        let Some(id) = link else {
            return;
        };
        let node = &self.arena[id];
        if order == Order::Pre {
            out.push(id);
        }
        self.walk(node.left, order, out);
        if order == Order::In {
            out.push(id);
        }
        self.walk(node.right, order, out);
        if order == Order::Post {
            out.push(id);
        }
    }

    /// Recomputes the cached height and balance factor of `id` from its children.
    fn fix_height(&mut self, id: NodeId) {
        let (left, right) = {
            let node = &self.arena[id];
            (node.left, node.right)
        };
        let left_height = self.height_of(left);
        let right_height = self.height_of(right);

        let node = &mut self.arena[id];
        node.height = left_height.max(right_height) + 1;
        node.balance_factor = right_height - left_height;
    }

    /// Refreshes `id`'s cached metadata and rotates if it has become unbalanced. Returns the root
    /// of the subtree that used to be rooted at `id`. The caller owns the child slot pointing at
    /// that subtree and must re-point it.
    fn rebalance(&mut self, id: NodeId) -> NodeId {
        // See https://en.wikipedia.org/wiki/AVL_tree#Rebalancing for terminology.
        self.fix_height(id);
        let (balance_factor, left, right) = {
            let node = &self.arena[id];
            (node.balance_factor, node.left, node.right)
        };
        let new_root = match (balance_factor, left, right) {
            (-2, Some(left), _) => match self.arena[left].balance_factor {
                n if n <= 0 => self.rotate_right(id),
                _ => self.rotate_left_right(id, left),
            },
            (2, _, Some(right)) => match self.arena[right].balance_factor {
                n if n >= 0 => self.rotate_left(id),
                _ => self.rotate_right_left(id, right),
            },
            _ => id,
        };

        if cfg!(debug_assertions) {
            let node = &self.arena[new_root];
            let left_height = self.height_of(node.left);
            let right_height = self.height_of(node.right);
            assert_eq!(node.height, left_height.max(right_height) + 1);
            assert!(left_height.abs_diff(right_height) <= 1);
        }
        new_root
    }

    /// Rotate `old_root` to the right. This moves the left child up vertically and `old_root`
    /// down vertically. Used to rebalance the tree when the left child is too tall. As such, it
    /// must only be called when there _is_ a left child.
    ///
    /// ## Panics
    ///
    /// When called on a node without a left child.
    ///
    /// # Diagram
    ///
    /// ```text
    ///    Option<parent>            Option<parent>
    ///      /                         /
    ///   old_root                  new_root
    ///    /     \                  /     \
    /// new_root  z     rotate ->  x    old_root
    ///  / \                               /  \
    /// x   y                             y    z
    /// ```
    fn rotate_right(&mut self, old_root: NodeId) -> NodeId {
        let new_root = self.arena[old_root]
            .left
            .expect("Rotate right => left child");
        let old_parent = self.arena[old_root].parent;
        let moved = self.arena[new_root].right;

        self.arena[old_root].left = moved;
        if let Some(moved) = moved {
            self.arena[moved].parent = Some(old_root);
        }
        self.arena[old_root].parent = Some(new_root);
        self.fix_height(old_root);

        self.arena[new_root].right = Some(old_root);
        self.arena[new_root].parent = old_parent;
        self.fix_height(new_root);

        trace!("rotated right around {old_root:?}, {new_root:?} is the new subtree root");
        new_root
    }

    /// Mirror image of [`AvlTree::rotate_right`]: the right child moves up and takes over
    /// `old_root`'s parent, and its left subtree becomes `old_root`'s right subtree.
    fn rotate_left(&mut self, old_root: NodeId) -> NodeId {
        let new_root = self.arena[old_root]
            .right
            .expect("Rotate left => right child");
        let old_parent = self.arena[old_root].parent;
        let moved = self.arena[new_root].left;

        self.arena[old_root].right = moved;
        if let Some(moved) = moved {
            self.arena[moved].parent = Some(old_root);
        }
        self.arena[old_root].parent = Some(new_root);
        self.fix_height(old_root);

        self.arena[new_root].left = Some(old_root);
        self.arena[new_root].parent = old_parent;
        self.fix_height(new_root);

        trace!("rotated left around {old_root:?}, {new_root:?} is the new subtree root");
        new_root
    }

    fn rotate_right_left(&mut self, id: NodeId, right: NodeId) -> NodeId {
        let new_right = self.rotate_right(right);
        self.arena[id].right = Some(new_right);
        self.rotate_left(id)
    }

    fn rotate_left_right(&mut self, id: NodeId, left: NodeId) -> NodeId {
        let new_left = self.rotate_left(left);
        self.arena[id].left = Some(new_left);
        self.rotate_right(id)
    }
}

impl<K> AvlTree<K>
where
    K: Ord,
{
    /// Finds the node holding `key`. If no node has the key, `None` is returned.
    ///
    /// # Examples
    ///
    /// ```
    /// use avltree::avl::AvlTree;
    ///
    /// let mut tree = AvlTree::new();
    /// tree.insert(1);
    ///
    /// assert_eq!(tree.search(&1).map(|n| *n.key()), Some(1));
    /// assert!(tree.search(&42).is_none());
    /// ```
    pub fn search(&self, key: &K) -> Option<NodeRef<'_, K>> {
        self.find(key).map(|id| self.node(id))
    }

    /// Whether `key` is stored in the tree.
    pub fn contains(&self, key: &K) -> bool {
        self.find(key).is_some()
    }

    /// Inserts `key`, rebalancing as needed. Returns `false`, leaving the tree untouched, when the
    /// key was already present.
    ///
    /// # Examples
    ///
    /// ```
    /// use avltree::avl::AvlTree;
    ///
    /// let mut tree = AvlTree::new();
    ///
    /// assert!(tree.insert(1));
    /// assert!(!tree.insert(1));
    /// assert_eq!(tree.len(), 1);
    /// ```
    pub fn insert(&mut self, key: K) -> bool {
        let (root, inserted) = self.insert_at(self.root, None, key);
        if self.root != Some(root) && self.root.is_some() {
            debug!("insert moved the root from {:?} to {root:?}", self.root);
        }
        self.root = Some(root);
        if inserted {
            self.len += 1;
        }
        inserted
    }

    /// Deletes `key` from the tree, rebalancing as needed. Returns `false` when the key wasn't
    /// present, including when the tree is empty.
    ///
    /// A node with two children isn't unlinked. It takes the key of its in-order successor (the
    /// smallest key of its right subtree) and the successor's node is removed instead.
    ///
    /// # Examples
    ///
    /// ```
    /// use avltree::avl::AvlTree;
    ///
    /// let mut tree = AvlTree::new();
    /// assert!(!tree.delete(&1));
    ///
    /// tree.insert(1);
    /// assert!(tree.delete(&1));
    /// assert!(tree.search(&1).is_none());
    /// assert!(tree.root().is_none());
    /// ```
    pub fn delete(&mut self, key: &K) -> bool {
        let Some(root) = self.root else {
            return false;
        };
        let (new_root, deleted) = self.delete_at(root, key);
        if new_root != Some(root) {
            debug!("delete moved the root from {root:?} to {new_root:?}");
        }
        self.root = new_root;
        if deleted {
            self.len -= 1;
        }
        deleted
    }

    /// Checks every structural invariant of the tree. This can't fail for a tree only touched
    /// through the public API. It exists for tests and for callers that want to assert it.
    pub fn validate(&self) -> Result<(), InvariantError> {
        if let Some(root) = self.root {
            if self.arena[root].parent.is_some() {
                return Err(InvariantError::RootHasParent);
            }
        }
        let mut reachable = 0;
        self.validate_at(self.root, None, None, None, &mut reachable)?;
        if reachable != self.len || self.arena.live() != self.len {
            return Err(InvariantError::SizeMismatch {
                len: self.len,
                reachable,
            });
        }
        Ok(())
    }

    /// Returns the actual height of the subtree at `link`.
    fn validate_at(
        &self,
        link: Option<NodeId>,
        parent: Option<NodeId>,
        lower: Option<&K>,
        upper: Option<&K>,
        reachable: &mut usize,
    ) -> Result<isize, InvariantError> {
        let Some(id) = link else {
            return Ok(EMPTY_HEIGHT);
        };
        *reachable += 1;
        let node = &self.arena[id];
        if node.parent != parent {
            return Err(InvariantError::BrokenParentLink);
        }
        if lower.is_some_and(|lower| node.key <= *lower)
            || upper.is_some_and(|upper| node.key >= *upper)
        {
            return Err(InvariantError::Unordered);
        }

        let left = self.validate_at(node.left, Some(id), lower, Some(&node.key), reachable)?;
        let right = self.validate_at(node.right, Some(id), Some(&node.key), upper, reachable)?;
        let height = left.max(right) + 1;
        if node.height != height {
            return Err(InvariantError::StaleHeight {
                cached: node.height,
                actual: height,
            });
        }
        if node.balance_factor != right - left {
            return Err(InvariantError::StaleBalanceFactor {
                cached: node.balance_factor,
                actual: right - left,
            });
        }
        if node.balance_factor.abs() > 1 {
            return Err(InvariantError::Unbalanced {
                balance_factor: node.balance_factor,
            });
        }
        Ok(height)
    }

    fn find(&self, key: &K) -> Option<NodeId> {
        let mut link = self.root;
        while let Some(id) = link {
            let node = &self.arena[id];
            link = match key.cmp(&node.key) {
                Ordering::Less => node.left,
                Ordering::Equal => return Some(id),
                Ordering::Greater => node.right,
            };
        }
        None
    }

    /// Inserts `key` into the subtree at `link`, whose root hangs off `parent`. Returns the new
    /// root of that subtree and whether a node was created.
    fn insert_at(
        &mut self,
        link: Option<NodeId>,
        parent: Option<NodeId>,
        key: K,
    ) -> (NodeId, bool) {
        let Some(id) = link else {
            return (self.arena.alloc(key, parent), true);
        };
        match key.cmp(&self.arena[id].key) {
            Ordering::Less => {
                let (left, inserted) = self.insert_at(self.arena[id].left, Some(id), key);
                self.arena[id].left = Some(left);
                if !inserted {
                    return (id, false);
                }
            }
            Ordering::Equal => return (id, false),
            Ordering::Greater => {
                let (right, inserted) = self.insert_at(self.arena[id].right, Some(id), key);
                self.arena[id].right = Some(right);
                if !inserted {
                    return (id, false);
                }
            }
        }

        if cfg!(debug_assertions) {
            let node = &self.arena[id];
            if let Some(left) = node.left {
                assert!(node.key > self.arena[left].key);
            }
            if let Some(right) = node.right {
                assert!(node.key < self.arena[right].key);
            }
        }
        (self.rebalance(id), true)
    }

    /// Deletes `key` from the subtree rooted at `id`. Returns the new root of that subtree (`None`
    /// once it is empty) and whether a node was removed.
    fn delete_at(&mut self, id: NodeId, key: &K) -> (Option<NodeId>, bool) {
        match key.cmp(&self.arena[id].key) {
            Ordering::Less => {
                let Some(left) = self.arena[id].left else {
                    return (Some(id), false);
                };
                let (left, deleted) = self.delete_at(left, key);
                self.arena[id].left = left;
                if !deleted {
                    return (Some(id), false);
                }
            }
            Ordering::Greater => {
                let Some(right) = self.arena[id].right else {
                    return (Some(id), false);
                };
                let (right, deleted) = self.delete_at(right, key);
                self.arena[id].right = right;
                if !deleted {
                    return (Some(id), false);
                }
            }
            Ordering::Equal => {
                let (left, right, parent) = {
                    let node = &self.arena[id];
                    (node.left, node.right, node.parent)
                };
                match (left, right) {
                    (None, None) => {
                        self.arena.free(id);
                        return (None, true);
                    }
                    // The child takes over our spot, including our parent.
                    (Some(child), None) | (None, Some(child)) => {
                        self.arena[child].parent = parent;
                        self.arena.free(id);
                        return (Some(child), true);
                    }
                    (Some(_), Some(right)) => {
                        // After the swap `key` sits where the successor was. That node is still
                        // the minimum of the right subtree and has no left child, so deleting
                        // `key` from the right subtree unlinks it via one of the cases above.
                        let successor = self.minimum_of(right);
                        self.arena.swap_keys(id, successor);
                        let (right, deleted) = self.delete_at(right, key);
                        debug_assert!(deleted, "successor must be found in the right subtree");
                        self.arena[id].right = right;
                    }
                }
            }
        }
        (Some(self.rebalance(id)), true)
    }
}

impl<K> FromIterator<K> for AvlTree<K>
where
    K: Ord,
{
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut tree = Self::new();
        tree.extend(iter);
        tree
    }
}

impl<K> Extend<K> for AvlTree<K>
where
    K: Ord,
{
    fn extend<I: IntoIterator<Item = K>>(&mut self, iter: I) {
        for key in iter {
            self.insert(key);
        }
    }
}

impl<'a, K> IntoIterator for &'a AvlTree<K> {
    type Item = &'a K;
    type IntoIter = Iter<'a, K>;

    fn into_iter(self) -> Iter<'a, K> {
        self.iter()
    }
}

/// A borrowed handle to a node that is live in an [`AvlTree`].
pub struct NodeRef<'a, K> {
    tree: &'a AvlTree<K>,
    id: NodeId,
}

impl<K> Clone for NodeRef<'_, K> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<K> Copy for NodeRef<'_, K> {}

/// Two handles are equal when they point at the same node of the same tree.
impl<K> PartialEq for NodeRef<'_, K> {
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(self.tree, other.tree) && self.id == other.id
    }
}
impl<K> Eq for NodeRef<'_, K> {}

impl<K> fmt::Debug for NodeRef<'_, K>
where
    K: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("key", self.key())
            .field("height", &self.height())
            .field("balance_factor", &self.balance_factor())
            .field("left", &self.left())
            .field("right", &self.right())
            .finish()
    }
}

impl<'a, K> NodeRef<'a, K> {
    /// The key stored in this node.
    pub fn key(&self) -> &'a K {
        &self.tree.arena[self.id].key
    }

    /// Edges on the longest path from this node down to a leaf. A leaf has height `0`.
    pub fn height(&self) -> isize {
        self.tree.arena[self.id].height
    }

    /// `height(right) - height(left)`, where a missing child counts as `-1`. Always in `-1..=1`
    /// between public operations.
    pub fn balance_factor(&self) -> isize {
        self.tree.arena[self.id].balance_factor
    }

    /// The left child.
    pub fn left(&self) -> Option<NodeRef<'a, K>> {
        self.link(self.tree.arena[self.id].left)
    }

    /// The right child.
    pub fn right(&self) -> Option<NodeRef<'a, K>> {
        self.link(self.tree.arena[self.id].right)
    }

    /// The parent, or `None` for the root.
    pub fn parent(&self) -> Option<NodeRef<'a, K>> {
        self.link(self.tree.arena[self.id].parent)
    }

    /// Whether this node has no children.
    pub fn is_leaf(&self) -> bool {
        let node = &self.tree.arena[self.id];
        node.left.is_none() && node.right.is_none()
    }

    fn link(&self, link: Option<NodeId>) -> Option<NodeRef<'a, K>> {
        link.map(|id| NodeRef {
            tree: self.tree,
            id,
        })
    }
}

/// An iterator over the keys of an [`AvlTree`] in ascending order.
pub struct Iter<'a, K> {
    tree: &'a AvlTree<K>,
    stack: Vec<NodeId>,
    remaining: usize,
}

impl<K> Iter<'_, K> {
    fn push_left(&mut self, mut link: Option<NodeId>) {
        while let Some(id) = link {
            self.stack.push(id);
            link = self.tree.arena[id].left;
        }
    }
}

impl<'a, K> Iterator for Iter<'a, K> {
    type Item = &'a K;

    fn next(&mut self) -> Option<&'a K> {
        let id = self.stack.pop()?;
        let tree = self.tree;
        self.push_left(tree.arena[id].right);
        self.remaining -= 1;
        Some(&tree.arena[id].key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K> ExactSizeIterator for Iter<'_, K> {}

/// A broken structural invariant found by [`AvlTree::validate`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvariantError {
    /// Some key is not strictly between the keys bounding its subtree. This also catches
    /// duplicate keys.
    #[error("keys are out of order")]
    Unordered,
    /// A node's balance factor is outside `-1..=1`.
    #[error("node has balance factor {balance_factor}")]
    Unbalanced {
        /// The offending balance factor.
        balance_factor: isize,
    },
    /// A node's cached height doesn't match its subtree.
    #[error("cached height {cached} but subtree has height {actual}")]
    StaleHeight {
        /// The height stored in the node.
        cached: isize,
        /// The height computed from its children.
        actual: isize,
    },
    /// A node's cached balance factor doesn't match its children.
    #[error("cached balance factor {cached} but children give {actual}")]
    StaleBalanceFactor {
        /// The balance factor stored in the node.
        cached: isize,
        /// The balance factor computed from its children.
        actual: isize,
    },
    /// A node's parent link doesn't point at the node whose child it is.
    #[error("parent link does not point at the true parent")]
    BrokenParentLink,
    /// The root has a parent link.
    #[error("root node has a parent")]
    RootHasParent,
    /// The stored count disagrees with the number of nodes.
    #[error("tree reports {len} keys but {reachable} nodes are reachable")]
    SizeMismatch {
        /// The count the tree reports.
        len: usize,
        /// The number of nodes reachable from the root.
        reachable: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(nodes: &[NodeRef<'_, i32>]) -> Vec<i32> {
        nodes.iter().map(|n| *n.key()).collect()
    }

    fn tree_of(keys: &[i32]) -> AvlTree<i32> {
        let mut tree = AvlTree::new();
        for &key in keys {
            tree.insert(key);
            assert_eq!(tree.validate(), Ok(()));
        }
        tree
    }

    /// Assert the heights of the root, left child, and right child of a tree.
    macro_rules! assert_heights {
        ($tree:ident, $height:expr, $left_height:expr, $right_height:expr) => {{
            match $tree.root() {
                Some(n) => {
                    assert_eq!(n.height(), $height);

                    let left_height = n.left().map_or(-1, |n| n.height());
                    let right_height = n.right().map_or(-1, |n| n.height());
                    assert_eq!(right_height, $right_height);
                    assert_eq!(left_height, $left_height);
                }
                None => assert_eq!(-1, $height),
            }
        }};
    }

    #[test_log::test]
    fn ascending_inserts_rotate_left() {
        let tree = tree_of(&[10, 20, 30]);

        let root = tree.root().unwrap();
        assert_eq!(*root.key(), 20);
        assert_eq!(root.balance_factor(), 0);
        assert_eq!(keys(&tree.in_order()), [10, 20, 30]);
        assert_heights!(tree, 1, 0, 0);
    }

    #[test]
    fn descending_inserts_rotate_right() {
        let tree = tree_of(&[30, 20, 10]);

        assert_eq!(*tree.root().unwrap().key(), 20);
        assert_eq!(keys(&tree.pre_order()), [20, 10, 30]);
    }

    #[test_log::test]
    fn test_left_right_rebalance() {
        // 10 hangs left of 30 and is right heavy.
        let tree = tree_of(&[30, 10, 20]);

        let root = tree.root().unwrap();
        assert_eq!(*root.key(), 20);
        assert_eq!(root.balance_factor(), 0);
        assert_eq!(keys(&tree.in_order()), [10, 20, 30]);
        assert_heights!(tree, 1, 0, 0);
    }

    #[test]
    fn test_right_left_rebalance() {
        let tree = tree_of(&[10, 30, 20]);

        assert_eq!(*tree.root().unwrap().key(), 20);
        assert_eq!(keys(&tree.post_order()), [10, 30, 20]);
        assert_heights!(tree, 1, 0, 0);
    }

    #[test]
    fn always_adding_left() {
        let keys = [10, 9, 8, 7, 6, 5, 4, 3, 2, 1];
        let mut inserted = Vec::new();

        let mut tree = AvlTree::new();
        assert!(tree.search(&10).is_none());

        for key in keys {
            tree.insert(key);
            inserted.push(key);
            for inserted in &inserted {
                assert_eq!(tree.search(inserted).map(|n| *n.key()), Some(*inserted));
            }
            assert_eq!(tree.validate(), Ok(()));
        }
        // 10 keys fit in 4 levels.
        assert_eq!(tree.height(), 3);
    }

    #[test]
    fn always_adding_right() {
        let mut tree = AvlTree::new();
        for key in 1..=10 {
            tree.insert(key);
            assert_eq!(tree.validate(), Ok(()));
        }
        assert_eq!(tree.height(), 3);
        assert_eq!(tree.minimum().map(|n| *n.key()), Some(1));
        assert_eq!(tree.maximum().map(|n| *n.key()), Some(10));
    }

    #[test]
    fn duplicate_insert_changes_nothing() {
        let mut tree = tree_of(&[5, 3, 8, 1]);
        let before = keys(&tree.pre_order());

        assert!(!tree.insert(3));
        assert_eq!(tree.len(), 4);
        assert_eq!(keys(&tree.pre_order()), before);
    }

    #[test]
    fn one_sided_balance_factors() {
        let tree = tree_of(&[2, 3]);
        let root = tree.root().unwrap();
        assert_eq!(root.balance_factor(), 1);
        assert_eq!(root.height(), 1);

        let tree = tree_of(&[2, 1]);
        let root = tree.root().unwrap();
        assert_eq!(root.balance_factor(), -1);
        assert_eq!(root.right(), None);
    }

    #[test]
    fn empty_tree_queries() {
        let mut tree: AvlTree<i32> = AvlTree::new();

        assert!(tree.root().is_none());
        assert!(tree.minimum().is_none());
        assert!(tree.maximum().is_none());
        assert!(tree.in_order().is_empty());
        assert_eq!(tree.height(), -1);

        assert!(!tree.delete(&1));
        assert_eq!(tree.len(), 0);
        assert!(tree.root().is_none());
        assert_eq!(tree.validate(), Ok(()));
    }

    #[test]
    fn delete_with_no_children() {
        let mut tree = tree_of(&[5, 3, 7]);

        assert!(tree.search(&7).is_some_and(|n| n.is_leaf()));
        assert!(tree.delete(&7));
        assert!(tree.search(&7).is_none());
        assert!(tree.contains(&3));
        assert!(tree.contains(&5));
        assert!(!tree.root().is_some_and(|n| n.is_leaf()));
        assert_eq!(tree.validate(), Ok(()));
    }

    #[test]
    fn delete_with_null_left() {
        let mut tree = tree_of(&[5, 3, 7, 9]);

        assert!(tree.delete(&7));
        let nine = tree.search(&9).unwrap();
        assert_eq!(nine.parent().map(|n| *n.key()), Some(5));
        assert_eq!(keys(&tree.in_order()), [3, 5, 9]);
        assert_eq!(tree.validate(), Ok(()));
    }

    #[test]
    fn delete_with_null_right() {
        let mut tree = tree_of(&[5, 3, 7, 6]);

        assert!(tree.delete(&7));
        let six = tree.search(&6).unwrap();
        assert_eq!(six.parent().map(|n| *n.key()), Some(5));
        assert_eq!(keys(&tree.in_order()), [3, 5, 6]);
        assert_eq!(tree.validate(), Ok(()));
    }

    #[test]
    fn delete_root_with_one_child() {
        let mut tree = tree_of(&[5, 7]);

        assert!(tree.delete(&5));
        let root = tree.root().unwrap();
        assert_eq!(*root.key(), 7);
        assert!(root.parent().is_none());
        assert_eq!(tree.validate(), Ok(()));
    }

    #[test]
    fn delete_two_children_takes_successor() {
        let mut tree = tree_of(&[5, 3, 8, 2, 6, 9, 7]);

        assert!(tree.delete(&5));
        // 6 is the smallest key right of 5.
        assert_eq!(*tree.root().unwrap().key(), 6);
        assert_eq!(keys(&tree.in_order()), [2, 3, 6, 7, 8, 9]);
        assert_eq!(tree.validate(), Ok(()));
    }

    #[test_log::test]
    fn delete_two_children_then_rebalance() {
        let mut tree = tree_of(&[20, 10, 30, 5, 15]);

        assert!(tree.delete(&20));
        assert_eq!(tree.len(), 4);
        // The root takes 30, loses its right subtree and is then rotated right.
        assert_eq!(*tree.root().unwrap().key(), 10);
        assert_eq!(keys(&tree.pre_order()), [10, 5, 30, 15]);
        assert_eq!(keys(&tree.in_order()), [5, 10, 15, 30]);
        assert_eq!(tree.validate(), Ok(()));
    }

    #[test]
    fn delete_with_deeper_successor() {
        let mut tree = tree_of(&[5, 3, 8, 2, 6, 9, 7]);

        assert!(tree.delete(&3));
        assert!(tree.delete(&8));
        assert!(tree.search(&8).is_none());
        assert_eq!(keys(&tree.in_order()), [2, 5, 6, 7, 9]);
        assert_eq!(tree.validate(), Ok(()));
    }

    #[test]
    fn delete_last_key_clears_root() {
        let mut tree = tree_of(&[5]);

        assert!(tree.delete(&5));
        assert!(tree.search(&5).is_none());
        assert!(tree.root().is_none());
        assert!(tree.is_empty());
        assert_eq!(tree.validate(), Ok(()));
    }

    #[test]
    fn deleting_absent_keys_is_a_noop() {
        let mut tree = tree_of(&[5, 3, 7]);
        let before = keys(&tree.pre_order());

        assert!(!tree.delete(&4));
        assert!(!tree.delete(&100));
        assert_eq!(tree.len(), 3);
        assert_eq!(keys(&tree.pre_order()), before);
    }

    #[test]
    fn rotate_right_fixes_parent_pointers() {
        let tree = tree_of(&[5, 3, 9, 4, 2, 1]);

        let root = tree.root().unwrap();
        assert_eq!(*root.key(), 3);
        let five = root.right().unwrap();
        let nine = five.right().unwrap();
        let four = five.left().unwrap();

        assert_eq!(nine.parent(), Some(five));
        assert_eq!(four.parent(), Some(five));
        assert_eq!(five.parent(), Some(root));
        assert_eq!(root.parent(), None);
    }

    #[test]
    fn rotate_left_fixes_parent_pointers() {
        let tree = tree_of(&[-5, -3, -9, -4, -2, -1]);

        let root = tree.root().unwrap();
        assert_eq!(*root.key(), -3);
        let five = root.left().unwrap();
        let nine = five.left().unwrap();

        assert_eq!(nine.parent(), Some(five));
        assert_eq!(five.parent(), Some(root));
    }

    #[test]
    fn clone_is_independent() {
        let mut tree = tree_of(&[5, 3, 7, 1, 4, 6, 8]);
        let copy = tree.clone();

        assert!(tree.delete(&5));
        assert!(tree.delete(&1));
        assert!(copy.contains(&5));
        assert!(copy.contains(&1));
        assert_eq!(copy.len(), 7);
        assert_eq!(copy.validate(), Ok(()));
        assert_eq!(tree.validate(), Ok(()));
    }

    #[test]
    fn iter_matches_in_order() {
        let tree: AvlTree<i32> = [8, 3, 10, 1, 6, 14, 4, 7, 13].into_iter().collect();

        let iterated = tree.iter().copied().collect::<Vec<_>>();
        assert_eq!(iterated, keys(&tree.in_order()));
        assert_eq!(tree.iter().len(), 9);
        assert_eq!((&tree).into_iter().next(), Some(&1));
    }

    #[test]
    fn validate_catches_corruption() {
        let mut tree = tree_of(&[2, 1, 3]);
        let root = tree.root.unwrap();

        tree.arena[root].height = 5;
        assert_eq!(
            tree.validate(),
            Err(InvariantError::StaleHeight {
                cached: 5,
                actual: 1
            })
        );
        tree.arena[root].height = 1;

        let left = tree.arena[root].left.unwrap();
        tree.arena[left].parent = None;
        assert_eq!(tree.validate(), Err(InvariantError::BrokenParentLink));
        tree.arena[left].parent = Some(root);

        tree.arena[left].key = 9;
        assert_eq!(tree.validate(), Err(InvariantError::Unordered));
        tree.arena[left].key = 1;

        tree.len = 4;
        assert_eq!(
            tree.validate(),
            Err(InvariantError::SizeMismatch {
                len: 4,
                reachable: 3
            })
        );
    }

    #[test]
    fn delete_then_absent_delete_stays_valid() {
        let mut tree = AvlTree::new();

        for key in [77, -22, 0, -127, 5, 109, -58, -105, -65, -86, 45, -11, -39] {
            tree.insert(key);
        }
        tree.delete(&0);
        tree.delete(&-122);
        assert_eq!(tree.validate(), Ok(()));
    }

    #[test]
    fn deleting_root_then_inner_node_stays_valid() {
        let mut tree = AvlTree::new();

        for key in [-49, -107, 127, -22, -77, -128, -119, -69, -122, 109, 115, -118] {
            tree.insert(key);
        }
        tree.delete(&-49);
        tree.delete(&-77);
        assert_eq!(tree.validate(), Ok(()));
    }
}
