/// The order in which a depth first traversal emits a subtree root relative to its children.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Order {
    /// Root, then left subtree, then right subtree.
    Pre,
    /// Left subtree, then root, then right subtree. Yields keys in ascending order.
    In,
    /// Left subtree, then right subtree, then root.
    Post,
}
