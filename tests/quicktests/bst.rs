use std::collections::HashSet;

use avltree::bst::Tree;
use avltree::AvlTree;

use crate::Op;

#[quickcheck]
fn with_deletions(xs: Vec<i8>, deletes: Vec<i8>) -> bool {
    let mut tree: Tree<_> = xs.iter().copied().collect();
    for delete in &deletes {
        tree.delete(delete);
    }

    let deleted: HashSet<_> = deletes.iter().collect();
    deletes.iter().all(|x| !tree.contains(x))
        && xs
            .iter()
            .filter(|x| !deleted.contains(x))
            .all(|x| tree.contains(x))
}

/// Both trees hold the same keys no matter their shape.
#[quickcheck]
fn same_keys_as_avl(ops: Vec<Op<i8>>) -> bool {
    let mut bst = Tree::new();
    let mut avl = AvlTree::new();

    for op in &ops {
        let agrees = match op {
            Op::Insert(k) => bst.insert(*k) == avl.insert(*k),
            Op::Delete(k) => bst.delete(k) == avl.delete(k),
        };
        if !agrees {
            return false;
        }
    }

    bst.in_order().into_iter().eq(avl.iter()) && bst.len() == avl.len()
}

/// Sorted input turns the plain tree into a chain while the AVL tree stays shallow.
#[quickcheck]
fn sorted_input_degenerates(xs: Vec<i16>) -> bool {
    let mut xs = xs;
    xs.sort_unstable();
    xs.dedup();

    let bst: Tree<_> = xs.iter().copied().collect();
    let avl: AvlTree<_> = xs.iter().copied().collect();

    match bst.height() {
        None => xs.is_empty() && avl.height() == -1,
        Some(h) => h + 1 == xs.len() && avl.height() <= (xs.len() as f64).log2() as isize + 1,
    }
}
