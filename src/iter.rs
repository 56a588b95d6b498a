use std::collections::VecDeque;

use core::iter::FusedIterator;

use crate::{
    arena::{Dir, Link},
    AvlTree, Balance, NodeId,
};

enum CameFrom {
    Parent,
    LeftChild,
    Here,
    RightChild,
}

/// An in-order iterator over the elements of an [`AvlTree`].
///
/// The iterator keeps no stack; it climbs back up through parent links once a subtree has been
/// exhausted.
pub struct Iter<'tree, T, C> {
    tree: &'tree AvlTree<T, C>,

    front_cur: Link,
    front_from: CameFrom,

    len: usize,
}

impl<'tree, T, C> Iter<'tree, T, C> {
    pub(crate) fn new(tree: &'tree AvlTree<T, C>) -> Self {
        Iter {
            tree,

            front_cur: tree.root,
            front_from: CameFrom::Parent,
            len: tree.len(),
        }
    }
}

impl<'tree, T, C> Iterator for Iter<'tree, T, C> {
    type Item = &'tree T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.len == 0 {
            return None;
        }

        let tree = self.tree;
        let mut cur = self.front_cur?;

        loop {
            match self.front_from {
                CameFrom::Parent => {
                    // Upon entering a new subtree, find the minimum element.
                    cur = tree.extreme_in_subtree(cur, Dir::Left);

                    // Once the minimum is found, its (empty) left subtree has been exhausted.
                    self.front_from = CameFrom::LeftChild;
                }

                CameFrom::LeftChild => {
                    // The left subtree has been exhausted, so this node is up next. Save off the
                    // iterator state and return it.
                    self.front_cur = Some(cur);
                    self.front_from = CameFrom::Here;
                    self.len -= 1;

                    return Some(tree.item(cur));
                }

                CameFrom::Here => {
                    // The current node was just yielded.
                    if let Some(right) = tree.links(cur).right() {
                        // If the right subtree is not empty, go there.
                        self.front_from = CameFrom::Parent;

                        cur = right;
                    } else if let Some(parent) = tree.links(cur).parent() {
                        // Otherwise, ascend one level.
                        self.front_from = match tree.which_child(parent, cur) {
                            Dir::Left => CameFrom::LeftChild,
                            Dir::Right => CameFrom::RightChild,
                        };

                        cur = parent;
                    } else {
                        unreachable!("rightmost root yielded with elements remaining")
                    }
                }

                CameFrom::RightChild => {
                    // Ascend until we find the successor element.
                    while let Some(parent) = tree.links(cur).parent() {
                        match tree.which_child(parent, cur) {
                            Dir::Left => {
                                cur = parent;
                                break;
                            }
                            Dir::Right => cur = parent,
                        }
                    }

                    self.front_cur = Some(cur);
                    self.front_from = CameFrom::LeftChild;
                }
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len, Some(self.len))
    }
}

impl<T, C> ExactSizeIterator for Iter<'_, T, C> {}

impl<T, C> FusedIterator for Iter<'_, T, C> {}

/// A breadth-first iterator over the elements of an [`AvlTree`], yielding each element with
/// its 1-based depth.
pub struct LevelOrder<'tree, T, C> {
    tree: &'tree AvlTree<T, C>,
    queue: VecDeque<(NodeId, usize)>,
}

impl<'tree, T, C> Iterator for LevelOrder<'tree, T, C> {
    type Item = (&'tree T, usize);

    fn next(&mut self) -> Option<Self::Item> {
        let (node, depth) = self.queue.pop_front()?;
        let links = self.tree.links(node);

        for child in [links.left(), links.right()].into_iter().flatten() {
            self.queue.push_back((child, depth + 1));
        }

        Some((self.tree.item(node), depth))
    }
}

impl<T, C> FusedIterator for LevelOrder<'_, T, C> {}

impl<T, C> AvlTree<T, C> {
    /// Returns an in-order iterator over the elements of the tree.
    pub fn iter(&self) -> Iter<'_, T, C> {
        Iter::new(self)
    }

    /// Returns an iterator over `(element, depth)` pairs in level order, left to right.
    pub fn level_order(&self) -> LevelOrder<'_, T, C> {
        LevelOrder {
            tree: self,
            queue: self.root.map(|root| (root, 1)).into_iter().collect(),
        }
    }

    /// Walks the tree depth-first, calling `pre`, `inorder` and `post` with each element and its
    /// 1-based depth when the walk first reaches it, after its left subtree, and after its right
    /// subtree respectively.
    ///
    /// The walk uses parent links to climb out of finished subtrees and allocates nothing.
    pub fn traverse<Pre, In, Post>(&self, mut pre: Pre, mut inorder: In, mut post: Post)
    where
        Pre: FnMut(&T, usize),
        In: FnMut(&T, usize),
        Post: FnMut(&T, usize),
    {
        let mut depth = 1;
        let mut opt_cur = self.root;

        while let Some(mut cur) = opt_cur {
            pre(self.item(cur), depth);

            if let Some(left) = self.links(cur).left() {
                opt_cur = Some(left);
                depth += 1;
                continue;
            }

            // `cur` has no left subtree left to visit.
            loop {
                inorder(self.item(cur), depth);

                if let Some(right) = self.links(cur).right() {
                    opt_cur = Some(right);
                    depth += 1;
                    break;
                }

                post(self.item(cur), depth);

                // Finish every ancestor whose right subtree this was.
                while let Some(parent) = self.links(cur).parent() {
                    if self.links(parent).left() == Some(cur) {
                        break;
                    }

                    cur = parent;
                    depth -= 1;
                    post(self.item(cur), depth);
                }

                match self.links(cur).parent() {
                    // Came up from a left subtree: the parent is next in order.
                    Some(parent) => {
                        cur = parent;
                        depth -= 1;
                    }
                    None => {
                        opt_cur = None;
                        break;
                    }
                }
            }
        }
    }

    /// Calls `f` with every element, its 1-based depth and its balance factor, breadth-first.
    pub fn level_traverse<F>(&self, mut f: F)
    where
        F: FnMut(&T, usize, Balance),
    {
        let mut queue = VecDeque::new();
        queue.extend(self.root.map(|root| (root, 1)));

        while let Some((node, depth)) = queue.pop_front() {
            let links = self.links(node);
            f(self.item(node), depth, links.balance());

            if let Some(left) = links.left() {
                queue.push_back((left, depth + 1));
            }
            if let Some(right) = links.right() {
                queue.push_back((right, depth + 1));
            }
        }
    }
}

impl<'tree, T, C> IntoIterator for &'tree AvlTree<T, C> {
    type Item = &'tree T;
    type IntoIter = Iter<'tree, T, C>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use crate::AvlTree;

    fn one_to_five() -> AvlTree<u32> {
        (1..=5).collect()
    }

    #[test]
    fn level_order_shape() {
        let tree = one_to_five();

        let (keys, depths): (Vec<u32>, Vec<usize>) =
            tree.level_order().map(|(&k, d)| (k, d)).unzip();

        assert_eq!(keys, [2, 1, 4, 3, 5]);
        assert_eq!(depths, [1, 2, 2, 3, 3]);
    }

    #[test]
    fn traverse_visits_in_all_three_orders() {
        let tree = one_to_five();

        let mut pre = Vec::new();
        let mut inorder = Vec::new();
        let mut post = Vec::new();

        tree.traverse(
            |&k, d| pre.push((k, d)),
            |&k, d| inorder.push((k, d)),
            |&k, d| post.push((k, d)),
        );

        assert_eq!(pre, [(2, 1), (1, 2), (4, 2), (3, 3), (5, 3)]);
        assert_eq!(inorder, [(1, 2), (2, 1), (3, 3), (4, 2), (5, 3)]);
        assert_eq!(post, [(1, 2), (3, 3), (5, 3), (4, 2), (2, 1)]);
    }

    #[test]
    fn level_traverse_reports_balance() {
        use crate::Balance;

        let tree = one_to_five();
        let mut seen = Vec::new();
        tree.level_traverse(|&k, d, b| seen.push((k, d, b)));

        assert_eq!(
            seen,
            [
                (2, 1, Balance::RightHeavy),
                (1, 2, Balance::Balanced),
                (4, 2, Balance::Balanced),
                (3, 3, Balance::Balanced),
                (5, 3, Balance::Balanced),
            ]
        );
    }

    #[test]
    fn empty_tree_walks_nothing() {
        use core::cell::Cell;

        let tree: AvlTree<u32> = AvlTree::new();

        assert_eq!(tree.iter().next(), None);
        assert_eq!(tree.level_order().next(), None);

        let calls = Cell::new(0);
        let count = |_: &u32, _: usize| calls.set(calls.get() + 1);
        tree.traverse(count, count, count);
        tree.level_traverse(|_, _, _| calls.set(calls.get() + 1));
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn iter_is_exact_size() {
        let tree = one_to_five();
        let mut iter = tree.iter();

        assert_eq!(iter.len(), 5);
        iter.next();
        assert_eq!(iter.len(), 4);
        assert_eq!(iter.copied().collect::<Vec<_>>(), [2, 3, 4, 5]);
    }
}
