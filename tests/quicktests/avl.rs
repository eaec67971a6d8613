use std::collections::HashSet;

use avltree::{AvlTree, NodeRef};

use crate::Op;

/// Applies a set of operations to a tree and a hashset.
/// This way we can ensure that after a random smattering of inserts
/// and deletes we have the same set of keys in both.
fn do_ops<K>(ops: &[Op<K>], tree: &mut AvlTree<K>, set: &mut HashSet<K>)
where
    K: std::hash::Hash + Eq + Clone + Ord,
{
    for op in ops {
        match op {
            Op::Insert(k) => {
                tree.insert(k.clone());
                set.insert(k.clone());
            }
            Op::Delete(k) => {
                tree.delete(k);
                set.remove(k);
            }
        }
    }
}

#[quickcheck]
fn fuzz_multiple_operations_i8(ops: Vec<Op<i8>>) -> bool {
    let mut tree = AvlTree::new();
    let mut set = HashSet::new();

    do_ops(&ops, &mut tree, &mut set);
    tree.len() == set.len()
        && set.iter().all(|key| tree.contains(key))
        && tree.validate().is_ok()
}

#[quickcheck]
fn contains(xs: Vec<i8>) -> bool {
    let tree: AvlTree<_> = xs.iter().copied().collect();

    xs.iter().all(|x| tree.search(x).map(|n| n.key()) == Some(x))
}

#[quickcheck]
fn contains_not(xs: Vec<i8>, nots: Vec<i8>) -> bool {
    let tree: AvlTree<_> = xs.iter().copied().collect();
    let added: HashSet<_> = xs.into_iter().collect();
    let nots: HashSet<_> = nots.into_iter().collect();
    let mut nots = nots.difference(&added);

    nots.all(|x| tree.search(x).is_none())
}

#[quickcheck]
fn with_deletions(xs: Vec<i8>, deletes: Vec<i8>) -> bool {
    let mut tree: AvlTree<_> = xs.iter().copied().collect();
    for delete in &deletes {
        tree.delete(delete);
    }

    let mut still_present = xs;
    for delete in &deletes {
        // We may have inserted the same key multiple times - drop each one.
        while let Some(pos) = still_present.iter().position(|x| x == delete) {
            still_present.swap_remove(pos);
        }
    }

    deletes.iter().all(|x| tree.search(x).is_none())
        && still_present.iter().all(|x| tree.search(x).is_some())
}

fn sorted_keys(nodes: Vec<NodeRef<'_, i16>>) -> Vec<i16> {
    let mut keys: Vec<i16> = nodes.into_iter().map(|n| *n.key()).collect();
    keys.sort_unstable();
    keys
}

#[quickcheck]
fn traversals_agree(xs: Vec<i16>) -> bool {
    let tree: AvlTree<_> = xs.into_iter().collect();
    let in_order: Vec<i16> = tree.in_order().into_iter().map(|n| *n.key()).collect();
    in_order.windows(2).all(|w| w[0] < w[1])
        && sorted_keys(tree.pre_order()) == in_order
        && sorted_keys(tree.post_order()) == in_order
        && tree.pre_order().first() == tree.root().as_ref()
        && tree.post_order().last() == tree.root().as_ref()
}

#[quickcheck]
fn extremes(xs: Vec<i8>) -> bool {
    let tree: AvlTree<_> = xs.iter().copied().collect();

    tree.minimum().map(|n| n.key()) == xs.iter().min()
        && tree.maximum().map(|n| n.key()) == xs.iter().max()
}
