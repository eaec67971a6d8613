//! Index-addressed node storage for [`AvlTree`][crate::avl::AvlTree].
//!
//! Children are linked by [`NodeId`] rather than by pointer so that the parent back-reference can
//! be stored without creating an ownership cycle. Freed slots are recycled before the backing
//! `Vec` grows.

use std::mem;
use std::ops::{Index, IndexMut};

/// Height of a missing subtree.
pub(crate) const EMPTY_HEIGHT: isize = -1;

/// The index of a node inside an [`Arena`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct NodeId(usize);

#[derive(Clone, Debug)]
pub(crate) struct Node<K> {
    pub(crate) key: K,
    pub(crate) left: Option<NodeId>,
    pub(crate) right: Option<NodeId>,
    /// Only used to navigate upwards. Never owns anything.
    pub(crate) parent: Option<NodeId>,
    /// Edges on the longest path down to a leaf. A leaf has height 0.
    pub(crate) height: isize,
    /// `height(right) - height(left)`, with [`EMPTY_HEIGHT`] for a missing child.
    pub(crate) balance_factor: isize,
}

impl<K> Node<K> {
    fn leaf(key: K, parent: Option<NodeId>) -> Self {
        Self {
            key,
            left: None,
            right: None,
            parent,
            height: 0,
            balance_factor: 0,
        }
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Arena<K> {
    slots: Vec<Option<Node<K>>>,
    free_list: Vec<NodeId>,
}

impl<K> Arena<K> {
    pub(crate) fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_list: Vec::new(),
        }
    }

    /// Stores a new leaf holding `key` and returns its id.
    pub(crate) fn alloc(&mut self, key: K, parent: Option<NodeId>) -> NodeId {
        let node = Node::leaf(key, parent);
        match self.free_list.pop() {
            Some(id) => {
                self.slots[id.0] = Some(node);
                id
            }
            None => {
                let id = NodeId(self.slots.len());
                self.slots.push(Some(node));
                id
            }
        }
    }

    /// Removes the node from the arena and hands it back. Its links are left as they were so the
    /// caller is responsible for having unhooked it first.
    pub(crate) fn free(&mut self, id: NodeId) -> Node<K> {
        let node = self.slots[id.0]
            .take()
            .expect("Freeing a node that was already freed");
        self.free_list.push(id);
        node
    }

    /// Exchanges the keys of two live nodes without touching their links.
    pub(crate) fn swap_keys(&mut self, a: NodeId, b: NodeId) {
        if a == b {
            return;
        }
        let (low, high) = if a.0 < b.0 { (a.0, b.0) } else { (b.0, a.0) };
        let (head, tail) = self.slots.split_at_mut(high);
        let (Some(first), Some(second)) = (head[low].as_mut(), tail[0].as_mut()) else {
            unreachable!("Swapping keys with a freed node");
        };
        mem::swap(&mut first.key, &mut second.key);
    }

    /// Number of live nodes.
    pub(crate) fn live(&self) -> usize {
        self.slots.len() - self.free_list.len()
    }

    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.free_list.clear();
    }
}

impl<K> Index<NodeId> for Arena<K> {
    type Output = Node<K>;

    fn index(&self, id: NodeId) -> &Node<K> {
        self.slots[id.0]
            .as_ref()
            .expect("NodeId refers to a freed node")
    }
}

impl<K> IndexMut<NodeId> for Arena<K> {
    fn index_mut(&mut self, id: NodeId) -> &mut Node<K> {
        self.slots[id.0]
            .as_mut()
            .expect("NodeId refers to a freed node")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn freed_slots_are_reused() {
        let mut arena = Arena::new();
        let a = arena.alloc(1, None);
        let b = arena.alloc(2, Some(a));
        assert_eq!(arena.live(), 2);

        let freed = arena.free(a);
        assert_eq!(freed.key, 1);
        assert_eq!(arena.live(), 1);

        let c = arena.alloc(3, None);
        assert_eq!(c, a);
        assert_eq!(arena[c].key, 3);
        assert_eq!(arena[b].parent, Some(a));
    }

    #[test]
    fn new_nodes_are_leaves() {
        let mut arena = Arena::new();
        let id = arena.alloc("x", None);

        let node = &arena[id];
        assert_eq!(node.height, 0);
        assert_eq!(node.balance_factor, 0);
        assert!(node.left.is_none() && node.right.is_none() && node.parent.is_none());
    }

    #[test]
    fn swap_keys_keeps_links() {
        let mut arena = Arena::new();
        let a = arena.alloc(10, None);
        let b = arena.alloc(20, Some(a));
        arena[a].right = Some(b);

        arena.swap_keys(b, a);
        assert_eq!(arena[a].key, 20);
        assert_eq!(arena[b].key, 10);
        assert_eq!(arena[a].right, Some(b));
        assert_eq!(arena[b].parent, Some(a));

        arena.swap_keys(a, a);
        assert_eq!(arena[a].key, 20);
    }

    #[test]
    #[should_panic(expected = "freed node")]
    fn indexing_a_freed_node_panics() {
        let mut arena = Arena::new();
        let id = arena.alloc(1, None);
        arena.free(id);
        let _ = &arena[id];
    }
}
