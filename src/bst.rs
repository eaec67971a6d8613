//! A plain, unbalanced Binary Search Tree storing a set of keys.
//!
//! This tree never rotates, so its shape depends entirely on insertion order. Inserting sorted
//! keys degrades it to a linked list with `O(N)` lookups. It exists as the baseline for
//! [`AvlTree`][crate::avl::AvlTree].
//!
//! # Examples
//!
//! ```
//! use avltree::bst::Tree;
//!
//! let mut tree = Tree::new();
//! for key in [1, 2, 3] {
//!     tree.insert(key);
//! }
//!
//! // No rebalancing: three keys, three levels.
//! assert_eq!(tree.height(), Some(2));
//! assert_eq!(tree.in_order(), [&1, &2, &3]);
//! ```

use std::cmp::Ordering;
use std::fmt;

use crate::avl::InvariantError;
use crate::util::Order;

type Link<K> = Option<Box<Node<K>>>;

/// An unbalanced Binary Search Tree. Children are owned by their parent through a `Box`.
pub struct Tree<K> {
    root: Link<K>,
    len: usize,
}

struct Node<K> {
    key: K,
    left: Link<K>,
    right: Link<K>,
}

impl<K> Default for Tree<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> Clone for Tree<K>
where
    K: Clone,
{
    // Rebuilds bottom up from a post-order walk. Every finished subtree waits on `built` until
    // its parent is reached, so a chain doesn't recurse once per node.
    fn clone(&self) -> Self {
        let mut built: Vec<Box<Node<K>>> = Vec::new();
        for node in nodes(&self.root, Order::Post) {
            let right = node.right.as_ref().and_then(|_| built.pop());
            let left = node.left.as_ref().and_then(|_| built.pop());
            built.push(Box::new(Node {
                key: node.key.clone(),
                left,
                right,
            }));
        }
        Self {
            root: built.pop(),
            len: self.len,
        }
    }
}

impl<K> fmt::Debug for Tree<K>
where
    K: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.in_order()).finish()
    }
}

impl<K> Drop for Tree<K> {
    // Unlinks nodes one by one so that a degenerate tree doesn't recurse once per node in the
    // compiler generated drop glue.
    fn drop(&mut self) {
        let mut stack: Vec<Box<Node<K>>> = self.root.take().into_iter().collect();
        while let Some(mut node) = stack.pop() {
            stack.extend(node.left.take());
            stack.extend(node.right.take());
        }
    }
}

impl<K> Tree<K> {
    /// Generates a new, empty `Tree`.
    pub fn new() -> Self {
        Self { root: None, len: 0 }
    }

    /// The number of keys in the tree.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the tree holds no keys.
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Edges on the longest path from the root to a leaf, or `None` for an empty tree.
    pub fn height(&self) -> Option<usize> {
        let mut height = None;
        let mut level = vec![self.root.as_deref()?];
        while !level.is_empty() {
            height = Some(height.map_or(0, |h| h + 1));
            level = level
                .into_iter()
                .flat_map(|n| [n.left.as_deref(), n.right.as_deref()])
                .flatten()
                .collect();
        }
        height
    }

    /// The smallest key.
    pub fn minimum(&self) -> Option<&K> {
        let mut node = self.root.as_deref()?;
        while let Some(left) = node.left.as_deref() {
            node = left;
        }
        Some(&node.key)
    }

    /// The largest key.
    pub fn maximum(&self) -> Option<&K> {
        let mut node = self.root.as_deref()?;
        while let Some(right) = node.right.as_deref() {
            node = right;
        }
        Some(&node.key)
    }

    /// The keys in root, left, right order.
    pub fn pre_order(&self) -> Vec<&K> {
        self.collect(Order::Pre)
    }

    /// The keys in ascending order.
    pub fn in_order(&self) -> Vec<&K> {
        self.collect(Order::In)
    }

    /// The keys in left, right, root order.
    pub fn post_order(&self) -> Vec<&K> {
        self.collect(Order::Post)
    }

    fn collect(&self, order: Order) -> Vec<&K> {
        nodes(&self.root, order)
            .into_iter()
            .map(|node| &node.key)
            .collect()
    }
}

impl<K> Tree<K>
where
    K: Ord,
{
    /// Finds the stored key equal to `key`.
    pub fn search(&self, key: &K) -> Option<&K> {
        let mut link = &self.root;
        while let Some(node) = link {
            link = match key.cmp(&node.key) {
                Ordering::Less => &node.left,
                Ordering::Equal => return Some(&node.key),
                Ordering::Greater => &node.right,
            };
        }
        None
    }

    /// Whether `key` is stored in the tree.
    pub fn contains(&self, key: &K) -> bool {
        self.search(key).is_some()
    }

    /// Inserts `key` as a new leaf. Returns `false`, changing nothing, if it was already present.
    pub fn insert(&mut self, key: K) -> bool {
        // Walk down iteratively, sorted input makes this path as long as the tree.
        let mut link = &mut self.root;
        while let Some(node) = link {
            link = match key.cmp(&node.key) {
                Ordering::Less => &mut node.left,
                Ordering::Equal => return false,
                Ordering::Greater => &mut node.right,
            };
        }
        *link = Some(Box::new(Node {
            key,
            left: None,
            right: None,
        }));
        self.len += 1;
        true
    }

    /// Deletes `key`. Returns `false` if it wasn't present.
    ///
    /// A node with two children takes the key of its in-order successor, which is then unlinked
    /// from the right subtree.
    ///
    /// # Examples
    ///
    /// ```
    /// use avltree::bst::Tree;
    ///
    /// let mut tree = Tree::new();
    /// for key in [2, 1, 3] {
    ///     tree.insert(key);
    /// }
    ///
    /// assert!(tree.delete(&2));
    /// assert!(!tree.delete(&2));
    /// assert_eq!(tree.pre_order(), [&3, &1]);
    /// ```
    pub fn delete(&mut self, key: &K) -> bool {
        let mut link = &mut self.root;
        loop {
            match *link {
                None => return false,
                Some(ref node) if *key < node.key => link = &mut link.as_mut().unwrap().left,
                Some(ref node) if *key > node.key => link = &mut link.as_mut().unwrap().right,
                Some(_) => break,
            }
        }

        let Some(mut node) = link.take() else {
            return false;
        };
        *link = match (node.left.take(), node.right.take()) {
            (None, None) => None,
            (Some(child), None) | (None, Some(child)) => Some(child),
            (Some(left), Some(right)) => {
                let mut right = Some(right);
                if let Some(successor) = take_smallest(&mut right) {
                    node.key = successor;
                }
                node.left = Some(left);
                node.right = right;
                Some(node)
            }
        };
        self.len -= 1;
        true
    }

    /// Checks that every key lies strictly between the keys bounding its subtree and that the
    /// stored count matches the nodes reachable from the root.
    ///
    /// # Examples
    ///
    /// ```
    /// use avltree::bst::Tree;
    ///
    /// let tree: Tree<i32> = [4, 2, 6, 1, 3].into_iter().collect();
    /// assert_eq!(tree.validate(), Ok(()));
    /// ```
    pub fn validate(&self) -> Result<(), InvariantError> {
        let mut reachable = 0;
        let mut stack: Vec<(&Node<K>, Option<&K>, Option<&K>)> = Vec::new();
        stack.extend(self.root.as_deref().map(|root| (root, None, None)));
        while let Some((node, lower, upper)) = stack.pop() {
            reachable += 1;
            if lower.is_some_and(|lower| node.key <= *lower)
                || upper.is_some_and(|upper| node.key >= *upper)
            {
                return Err(InvariantError::Unordered);
            }
            if let Some(left) = node.left.as_deref() {
                stack.push((left, lower, Some(&node.key)));
            }
            if let Some(right) = node.right.as_deref() {
                stack.push((right, Some(&node.key), upper));
            }
        }
        if reachable != self.len {
            return Err(InvariantError::SizeMismatch {
                len: self.len,
                reachable,
            });
        }
        Ok(())
    }
}

impl<K> FromIterator<K> for Tree<K>
where
    K: Ord,
{
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut tree = Self::new();
        for key in iter {
            tree.insert(key);
        }
        tree
    }
}

/// The nodes under `link` in the given depth first order, walked with an explicit stack.
fn nodes<K>(link: &Link<K>, order: Order) -> Vec<&Node<K>> {
    let mut out = Vec::new();
    // The flag marks a node whose children are already on the stack, so it is emitted next time
    // it is popped. Pushes happen in reverse of the order they should come off.
    let mut stack: Vec<(&Node<K>, bool)> = Vec::new();
    stack.extend(link.as_deref().map(|n| (n, false)));
    while let Some((node, expanded)) = stack.pop() {
        if expanded {
            out.push(node);
            continue;
        }
        let left = node.left.as_deref().map(|n| (n, false));
        let right = node.right.as_deref().map(|n| (n, false));
        match order {
            Order::Pre => stack.extend(right.into_iter().chain(left).chain([(node, true)])),
            Order::In => stack.extend(right.into_iter().chain([(node, true)]).chain(left)),
            Order::Post => stack.extend([(node, true)].into_iter().chain(right).chain(left)),
        }
    }
    out
}

/// Unlinks the smallest node of the subtree, returning its key. Its right child takes its place.
fn take_smallest<K>(subtree: &mut Link<K>) -> Option<K> {
    let mut link = subtree;
    loop {
        match *link {
            Some(ref node) if node.left.is_some() => link = &mut link.as_mut().unwrap().left,
            _ => break,
        }
    }
    let node = link.take()?;
    let Node { key, right, .. } = *node;
    *link = right;
    Some(key)
}
