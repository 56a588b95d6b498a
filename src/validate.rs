//! Structural checks over any [`TreeView`].
//!
//! None of these functions mutate the tree. The recursive ones descend once per level, which
//! is shallow for balanced trees; hand-built degenerate trees recurse as deep as they are tall.

use core::cmp::{max, Ordering};

use thiserror::Error;

use crate::{Balance, TreeView};

/// A broken tree invariant, located by the 1-based depth of the offending node.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Violation {
    #[error("key at depth {depth} is out of order with respect to its ancestors")]
    OutOfOrder { depth: usize },

    #[error("subtrees at depth {depth} differ in height by more than one (left {left}, right {right})")]
    Unbalanced {
        depth: usize,
        left: usize,
        right: usize,
    },

    #[error(
        "node at depth {depth} records {recorded:?} but its subtrees have heights {left} and {right}"
    )]
    StaleBalance {
        depth: usize,
        recorded: Balance,
        left: usize,
        right: usize,
    },

    #[error("node at depth {depth} does not link back to its parent")]
    BrokenParentLink { depth: usize },

    #[error("root node has a parent link")]
    RootHasParent,
}

/// Returns the number of levels in the tree; an empty tree has height 0.
pub fn height<V: TreeView + ?Sized>(view: &V) -> usize {
    fn height_at<V: TreeView + ?Sized>(view: &V, node: Option<V::Node>) -> usize {
        match node {
            Some(n) => 1 + max(height_at(view, view.left(n)), height_at(view, view.right(n))),
            None => 0,
        }
    }

    height_at(view, view.root())
}

/// Returns the number of nodes reachable from the root.
pub fn count<V: TreeView + ?Sized>(view: &V) -> usize {
    fn count_at<V: TreeView + ?Sized>(view: &V, node: Option<V::Node>) -> usize {
        match node {
            Some(n) => 1 + count_at(view, view.left(n)) + count_at(view, view.right(n)),
            None => 0,
        }
    }

    count_at(view, view.root())
}

/// Checks that every key lies strictly between the bounds implied by its ancestors under `cmp`.
pub fn check_bst_by<V, F>(view: &V, cmp: F) -> Result<(), Violation>
where
    V: TreeView + ?Sized,
    F: Fn(&V::Key, &V::Key) -> Ordering,
{
    fn check_at<'a, V, F>(
        view: &'a V,
        node: Option<V::Node>,
        lower: Option<&'a V::Key>,
        upper: Option<&'a V::Key>,
        depth: usize,
        cmp: &F,
    ) -> Result<(), Violation>
    where
        V: TreeView + ?Sized,
        F: Fn(&V::Key, &V::Key) -> Ordering,
    {
        let Some(node) = node else {
            return Ok(());
        };

        let key = view.key(node);

        let above_lower = lower.map_or(true, |lo| cmp(lo, key) == Ordering::Less);
        let below_upper = upper.map_or(true, |hi| cmp(key, hi) == Ordering::Less);
        if !(above_lower && below_upper) {
            return Err(Violation::OutOfOrder { depth });
        }

        check_at(view, view.left(node), lower, Some(key), depth + 1, cmp)?;
        check_at(view, view.right(node), Some(key), upper, depth + 1, cmp)
    }

    check_at(view, view.root(), None, None, 1, &cmp)
}

/// Checks the binary-search-tree property under the keys' [`Ord`] implementation.
pub fn check_bst<V>(view: &V) -> Result<(), Violation>
where
    V: TreeView + ?Sized,
    V::Key: Ord,
{
    check_bst_by(view, Ord::cmp)
}

/// Returns `true` if the tree is a binary search tree with no duplicate keys.
pub fn is_bst<V>(view: &V) -> bool
where
    V: TreeView + ?Sized,
    V::Key: Ord,
{
    check_bst(view).is_ok()
}

/// Checks that subtree heights differ by at most one at every node, returning the tree height.
///
/// Heights are computed bottom-up and the check stops at the first unbalanced subtree.
pub fn check_avl<V: TreeView + ?Sized>(view: &V) -> Result<usize, Violation> {
    fn check_at<V: TreeView + ?Sized>(
        view: &V,
        node: Option<V::Node>,
        depth: usize,
    ) -> Result<usize, Violation> {
        let Some(node) = node else {
            return Ok(0);
        };

        let left = check_at(view, view.left(node), depth + 1)?;
        let right = check_at(view, view.right(node), depth + 1)?;

        if left.abs_diff(right) > 1 {
            return Err(Violation::Unbalanced { depth, left, right });
        }

        Ok(1 + max(left, right))
    }

    check_at(view, view.root(), 1)
}

/// Returns `true` if subtree heights differ by at most one at every node.
pub fn is_avl_balanced<V: TreeView + ?Sized>(view: &V) -> bool {
    check_avl(view).is_ok()
}

/// Like [`check_avl`], and additionally checks every recorded balance factor against the
/// actual subtree heights.
pub fn check_balance_factors<V: TreeView + ?Sized>(view: &V) -> Result<usize, Violation> {
    fn check_at<V: TreeView + ?Sized>(
        view: &V,
        node: Option<V::Node>,
        depth: usize,
    ) -> Result<usize, Violation> {
        let Some(node) = node else {
            return Ok(0);
        };

        let left = check_at(view, view.left(node), depth + 1)?;
        let right = check_at(view, view.right(node), depth + 1)?;

        let Some(actual) = Balance::from_difference(left as i64 - right as i64) else {
            return Err(Violation::Unbalanced { depth, left, right });
        };

        if let Some(recorded) = view.balance(node) {
            if recorded != actual {
                return Err(Violation::StaleBalance {
                    depth,
                    recorded,
                    left,
                    right,
                });
            }
        }

        Ok(1 + max(left, right))
    }

    check_at(view, view.root(), 1)
}

/// Checks that every child links back to its parent and that the root has no parent.
pub fn check_parent_links<V: TreeView + ?Sized>(view: &V) -> Result<(), Violation> {
    let Some(root) = view.root() else {
        return Ok(());
    };

    if view.parent(root).is_some() {
        return Err(Violation::RootHasParent);
    }

    // Iterative: the parent links are exactly what is under test.
    let mut stack = vec![(root, 1)];
    while let Some((node, depth)) = stack.pop() {
        let left = view.left(node);
        let right = view.right(node);

        if left.is_some() && left == right {
            return Err(Violation::BrokenParentLink { depth: depth + 1 });
        }

        for child in [left, right].into_iter().flatten() {
            if view.parent(child) != Some(node) {
                return Err(Violation::BrokenParentLink { depth: depth + 1 });
            }

            stack.push((child, depth + 1));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    // A hand-built tree that records no balance factors.
    #[derive(Default)]
    struct Shape {
        keys: Vec<i32>,
        links: Vec<[Option<usize>; 3]>,
    }

    const PARENT: usize = 0;
    const LEFT: usize = 1;
    const RIGHT: usize = 2;

    impl Shape {
        fn graft(&mut self, sub: Shape, parent: usize, slot: usize) {
            let offset = self.keys.len();
            self.links[parent][slot] = Some(offset);

            for (i, mut links) in sub.links.into_iter().enumerate() {
                for link in links.iter_mut() {
                    *link = link.map(|l| l + offset);
                }
                if i == 0 {
                    links[PARENT] = Some(parent);
                }
                self.links.push(links);
            }
            self.keys.extend(sub.keys);
        }
    }

    fn node(left: Option<Shape>, right: Option<Shape>, key: i32) -> Shape {
        let mut shape = Shape {
            keys: vec![key],
            links: vec![[None; 3]],
        };

        if let Some(left) = left {
            shape.graft(left, 0, LEFT);
        }
        if let Some(right) = right {
            shape.graft(right, 0, RIGHT);
        }

        shape
    }

    fn leaf(key: i32) -> Option<Shape> {
        Some(node(None, None, key))
    }

    fn branch(left: Option<Shape>, right: Option<Shape>, key: i32) -> Option<Shape> {
        Some(node(left, right, key))
    }

    impl TreeView for Shape {
        type Node = usize;
        type Key = i32;

        fn root(&self) -> Option<usize> {
            (!self.keys.is_empty()).then_some(0)
        }

        fn parent(&self, node: usize) -> Option<usize> {
            self.links[node][PARENT]
        }

        fn left(&self, node: usize) -> Option<usize> {
            self.links[node][LEFT]
        }

        fn right(&self, node: usize) -> Option<usize> {
            self.links[node][RIGHT]
        }

        fn key(&self, node: usize) -> &i32 {
            &self.keys[node]
        }
    }

    #[test]
    fn trivial_trees_are_bst() {
        assert!(is_bst(&Shape::default()));
        assert!(is_bst(&node(None, None, 109)));
        assert!(is_bst(&node(leaf(5), None, 9)));
    }

    #[test]
    fn bst_accepts_ordered_shapes() {
        assert!(is_bst(&node(leaf(-5), leaf(2), 1)));
        assert!(is_bst(&node(None, branch(None, leaf(99), 2), 1)));
        assert!(is_bst(&node(
            leaf(0),
            branch(None, branch(leaf(7), leaf(100), 99), 2),
            1
        )));
    }

    #[test]
    fn bst_rejects_misordered_shapes() {
        assert_eq!(
            check_bst(&node(leaf(3), leaf(2), 1)),
            Err(Violation::OutOfOrder { depth: 2 })
        );

        // Duplicates are not allowed on either side.
        assert!(!is_bst(&node(leaf(0), leaf(1), 1)));

        // 7 is not in (3, 4).
        assert_eq!(
            check_bst(&node(
                leaf(0),
                branch(branch(None, leaf(7), 3), leaf(5), 4),
                1
            )),
            Err(Violation::OutOfOrder { depth: 4 })
        );

        // 0 is not in (1, 3).
        assert!(!is_bst(&node(
            leaf(-1),
            branch(branch(leaf(0), None, 3), leaf(5), 4),
            1
        )));
    }

    #[test]
    fn trivial_trees_are_avl_balanced() {
        assert!(is_avl_balanced(&Shape::default()));
        assert!(is_avl_balanced(&node(None, None, 109)));
        assert!(is_avl_balanced(&node(leaf(5), None, 9)));
    }

    #[test]
    fn balance_ignores_key_order() {
        let full = node(branch(leaf(5), leaf(2), 3), branch(leaf(11), leaf(22), -7), 0);
        assert_eq!(check_avl(&full), Ok(3));
        assert!(!is_bst(&full));

        let almost = node(branch(None, leaf(2), 3), branch(leaf(11), None, -7), 0);
        assert!(is_avl_balanced(&almost));
        assert!(!is_bst(&almost));
    }

    #[test]
    fn unbalanced_shapes_are_rejected() {
        assert_eq!(
            check_avl(&node(branch(leaf(5), None, 3), None, 1)),
            Err(Violation::Unbalanced {
                depth: 1,
                left: 2,
                right: 0
            })
        );

        let right_heavy = node(leaf(3), branch(branch(leaf(7), None, 11), None, -7), 0);
        assert!(!is_avl_balanced(&right_heavy));

        let left_heavy = node(branch(branch(leaf(7), None, 11), None, -7), leaf(3), 0);
        assert!(!is_avl_balanced(&left_heavy));
    }

    #[test]
    fn height_and_count() {
        assert_eq!(height(&Shape::default()), 0);
        assert_eq!(count(&Shape::default()), 0);

        let shape = node(leaf(1), branch(leaf(3), leaf(5), 4), 2);
        assert_eq!(height(&shape), 3);
        assert_eq!(count(&shape), 5);
    }

    #[test]
    fn parent_links_are_checked() {
        let mut shape = node(leaf(1), branch(leaf(3), leaf(5), 4), 2);
        assert_eq!(check_parent_links(&shape), Ok(()));

        // Point 5 at the root instead of 4.
        let five = shape.keys.iter().position(|&k| k == 5).unwrap();
        shape.links[five][PARENT] = Some(0);
        assert_eq!(
            check_parent_links(&shape),
            Err(Violation::BrokenParentLink { depth: 3 })
        );

        shape.links[five][PARENT] = Some(shape.keys.iter().position(|&k| k == 4).unwrap());
        shape.links[0][PARENT] = Some(five);
        assert_eq!(check_parent_links(&shape), Err(Violation::RootHasParent));
    }

    #[test]
    fn violations_render_readably() {
        let err = Violation::Unbalanced {
            depth: 2,
            left: 3,
            right: 1,
        };
        assert_eq!(
            err.to_string(),
            "subtrees at depth 2 differ in height by more than one (left 3, right 1)"
        );
    }
}
