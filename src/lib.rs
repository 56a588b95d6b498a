//! An AVL tree whose nodes live in an arena and carry parent links.
//!
//! Every node records a three-state balance factor (the height of its left subtree minus the
//! height of its right subtree, which is always -1, 0 or +1) together with handles to its
//! parent and children. The parent links let insertion, erase and the traversals run without an
//! auxiliary path stack.
//
// Terminology used in comments:
// - A node *leans* toward a side when that subtree is one level taller than the other.
// - The *pivot* of an insertion is the deepest node on the search path that was leaning before
//   the insertion (the root if there is none). It is the only node whose balance can reach +-2,
//   because every node strictly below it on the path was balanced and absorbs the extra level.
// - After an erase the *shrunk side* of a node is the child slot whose subtree lost a level.
//
// Insertion performs at most one (single or double) rotation. Erase may rotate at every ancestor
// of the splice point.

use core::{cmp::Ordering, fmt, mem};

mod arena;
mod compare;
mod cursor;
pub mod debug;
mod iter;
mod map;
pub mod validate;
mod view;

#[cfg(any(test, feature = "model"))]
pub mod model;


use arena::{Arena, Dir, Link, Links};

pub use arena::NodeId;
pub use compare::{Compare, Natural};
pub use cursor::{Cursor, CursorMut};
pub use iter::{Iter, LevelOrder};
pub use map::AvlMap;
pub use validate::Violation;
pub use view::TreeView;

/// The balance factor of a node.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Balance {
    /// The left subtree is one level taller than the right.
    LeftHeavy,
    /// Both subtrees have the same height.
    Balanced,
    /// The right subtree is one level taller than the left.
    RightHeavy,
}

impl Balance {
    #[inline]
    fn leaning(dir: Dir) -> Balance {
        match dir {
            Dir::Left => Balance::LeftHeavy,
            Dir::Right => Balance::RightHeavy,
        }
    }

    #[inline]
    fn opposite(self) -> Balance {
        match self {
            Balance::LeftHeavy => Balance::RightHeavy,
            Balance::Balanced => Balance::Balanced,
            Balance::RightHeavy => Balance::LeftHeavy,
        }
    }

    /// Returns `height(left) - height(right)`.
    pub fn as_i8(self) -> i8 {
        match self {
            Balance::LeftHeavy => 1,
            Balance::Balanced => 0,
            Balance::RightHeavy => -1,
        }
    }

    /// Returns the balance for a height difference of `height(left) - height(right)`, or `None`
    /// if the difference is outside `-1..=1`.
    pub fn from_difference(diff: i64) -> Option<Balance> {
        match diff {
            1 => Some(Balance::LeftHeavy),
            0 => Some(Balance::Balanced),
            -1 => Some(Balance::RightHeavy),
            _ => None,
        }
    }
}

/// An AVL tree ordered by a comparator `C`.
///
/// Inserting an item that compares equal to a stored one replaces the stored item in place.
pub struct AvlTree<T, C = Natural> {
    arena: Arena<T>,
    root: Link,
    len: usize,
    cmp: C,
}

impl<T: Ord> AvlTree<T> {
    /// Returns a new empty tree ordered by `T`'s [`Ord`] implementation.
    pub const fn new() -> AvlTree<T> {
        AvlTree::with_comparator(Natural)
    }
}

impl<T: Ord> Default for AvlTree<T> {
    fn default() -> Self {
        AvlTree::new()
    }
}

impl<T, C> AvlTree<T, C> {
    /// Returns a new empty tree ordered by `cmp`.
    pub const fn with_comparator(cmp: C) -> AvlTree<T, C> {
        AvlTree {
            arena: Arena::new(),
            root: None,
            len: 0,
            cmp,
        }
    }

    /// Returns the comparator this tree was built with.
    pub fn comparator(&self) -> &C {
        &self.cmp
    }

    /// Returns `true` if the tree contains no elements.
    pub const fn is_empty(&self) -> bool {
        let empty = self.len() == 0;

        if cfg!(debug_assertions) {
            // Can't use assert_eq!() in const fn.
            assert!(empty == self.root.is_none());
        }

        empty
    }

    /// Returns the number of elements in the tree.
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns a handle to the root node.
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Returns the number of levels in the tree.
    pub fn height(&self) -> usize {
        validate::height(self)
    }

    /// Returns the element with handle `node`, or `None` if that node has been erased.
    ///
    /// A handle to an erased node stays stale even after its slot is reused.
    pub fn get_node(&self, node: NodeId) -> Option<&T> {
        self.arena.get(node).map(|n| &n.item)
    }

    #[inline]
    fn links(&self, node: NodeId) -> &Links {
        &self.arena.node(node).links
    }

    #[inline]
    fn links_mut(&mut self, node: NodeId) -> &mut Links {
        &mut self.arena.node_mut(node).links
    }

    #[inline]
    pub(crate) fn item(&self, node: NodeId) -> &T {
        &self.arena.node(node).item
    }

    #[inline]
    pub(crate) fn item_mut(&mut self, node: NodeId) -> &mut T {
        &mut self.arena.node_mut(node).item
    }

    /// Returns a reference to the element for which `f` returns `Ordering::Equal`.
    ///
    /// `f` receives a stored element and must report how the element being searched for orders
    /// relative to it, consistently with the tree's comparator.
    pub fn get_by<F>(&self, f: F) -> Option<&T>
    where
        F: FnMut(&T) -> Ordering,
    {
        self.find_by(f).map(|node| self.item(node))
    }

    /// Removes and returns the element for which `f` returns `Ordering::Equal`.
    ///
    /// See [`get_by`](Self::get_by) for the contract on `f`.
    pub fn erase_by<F>(&mut self, f: F) -> Option<T>
    where
        F: FnMut(&T) -> Ordering,
    {
        let node = self.find_by(f)?;
        Some(self.remove_at(node))
    }

    pub(crate) fn find_by<F>(&self, mut f: F) -> Link
    where
        F: FnMut(&T) -> Ordering,
    {
        let mut opt_cur = self.root;

        loop {
            let cur = opt_cur?;

            match f(self.item(cur)) {
                Ordering::Less => opt_cur = self.links(cur).left(),
                Ordering::Equal => return Some(cur),
                Ordering::Greater => opt_cur = self.links(cur).right(),
            }
        }
    }

    /// Returns the minimum element of the tree.
    pub fn first(&self) -> Option<&T> {
        self.first_node().map(|node| self.item(node))
    }

    /// Returns the maximum element of the tree.
    pub fn last(&self) -> Option<&T> {
        self.last_node().map(|node| self.item(node))
    }

    /// Removes and returns the minimum element of the tree.
    pub fn pop_first(&mut self) -> Option<T> {
        let node = self.first_node()?;
        Some(self.remove_at(node))
    }

    /// Removes and returns the maximum element of the tree.
    pub fn pop_last(&mut self) -> Option<T> {
        let node = self.last_node()?;
        Some(self.remove_at(node))
    }

    pub(crate) fn first_node(&self) -> Link {
        self.root.map(|root| self.extreme_in_subtree(root, Dir::Left))
    }

    pub(crate) fn last_node(&self) -> Link {
        self.root.map(|root| self.extreme_in_subtree(root, Dir::Right))
    }

    /// Clears the tree, removing all elements.
    pub fn clear(&mut self) {
        self.arena.clear();
        self.root = None;
        self.len = 0;
    }

    // Returns the last node reached by following `dir` links from `root`.
    fn extreme_in_subtree(&self, root: NodeId, dir: Dir) -> NodeId {
        let mut cur = root;

        while let Some(child) = self.links(cur).child(dir) {
            cur = child;
        }

        cur
    }

    pub(crate) fn successor(&self, node: NodeId) -> Link {
        self.neighbor(node, Dir::Right)
    }

    pub(crate) fn predecessor(&self, node: NodeId) -> Link {
        self.neighbor(node, Dir::Left)
    }

    // Returns the in-order neighbor of `node` on side `dir`, climbing parent links when the
    // subtree on that side is empty.
    fn neighbor(&self, node: NodeId, dir: Dir) -> Link {
        if let Some(child) = self.links(node).child(dir) {
            return Some(self.extreme_in_subtree(child, !dir));
        }

        let mut cur = node;
        while let Some(parent) = self.links(cur).parent() {
            if self.links(parent).child(dir) != Some(cur) {
                return Some(parent);
            }

            cur = parent;
        }

        None
    }

    #[inline]
    fn which_child(&self, parent: NodeId, child: NodeId) -> Dir {
        if self.links(parent).left() == Some(child) {
            Dir::Left
        } else {
            debug_assert_eq!(self.links(parent).right(), Some(child));
            Dir::Right
        }
    }

    #[inline]
    fn maybe_set_parent(&mut self, opt_node: Link, parent: Link) {
        let Some(node) = opt_node else {
            return;
        };

        self.links_mut(node).set_parent(parent);
    }

    #[inline]
    fn replace_child_or_set_root(&mut self, parent: Link, old_child: NodeId, new_child: Link) {
        match parent {
            Some(parent) => self.replace_child(parent, old_child, new_child),
            None => self.root = new_child,
        }
    }

    // Replaces the child link of `parent` pointing at `old_child` with `new_child`.
    //
    // `new_child`'s parent link is not updated.
    fn replace_child(&mut self, parent: NodeId, old_child: NodeId, new_child: Link) {
        let links = self.links_mut(parent);

        if links.left() == Some(old_child) {
            links.set_left(new_child);
        } else if links.right() == Some(old_child) {
            links.set_right(new_child);
        } else {
            unreachable!("`old_child` must be a child of `parent`");
        }
    }

    // Performs a rotation, moving `up` up and its parent `down` down.
    //
    // Balances of affected nodes are not updated.
    fn rotate_at(&mut self, down: NodeId, up: NodeId) {
        // - `down` becomes the `dir` child of `up`.
        // - `across` goes from the `dir` child of `up` to the `!dir` child of `down`.
        let dir = if self.links(down).right() == Some(up) {
            Dir::Left
        } else {
            Dir::Right
        };

        let across = self.links(up).child(dir);
        self.links_mut(down).set_child(!dir, across);
        self.maybe_set_parent(across, Some(down));

        self.links_mut(up).set_child(dir, Some(down));
        let parent = self.links_mut(down).set_parent(Some(up));
        self.links_mut(up).set_parent(parent);

        self.replace_child_or_set_root(parent, down, Some(up));
    }

    // Performs a double rotation, moving the grandchild `up` above both `down_first` (its parent)
    // and `down_second` (its grandparent).
    //
    // Balances of affected nodes are not updated.
    fn rotate_twice_at(&mut self, down_second: NodeId, down_first: NodeId, up: NodeId) {
        self.rotate_at(down_first, up);
        self.rotate_at(down_second, up);
    }

    // Resolves a +-2 imbalance at `node`, whose `heavy` subtree is two levels taller than the
    // other one, and whose stored balance still leans `heavy`.
    //
    // Returns `true` if the rotated subtree ends up one level shorter than `node`'s subtree was
    // before the rotation. That is always the case after an insertion; after an erase it fails
    // only when the heavy child was balanced.
    fn rotate_heavy(&mut self, node: NodeId, heavy: Dir) -> bool {
        let child = self
            .links(node)
            .child(heavy)
            .expect("heavy side of an unbalanced node must not be empty");
        let lean = Balance::leaning(heavy);
        let child_balance = self.links(child).balance();

        if child_balance != lean.opposite() {
            tracing::trace!(pivot = ?node, promoted = ?child, "single rotation");
            self.rotate_at(node, child);

            if child_balance == Balance::Balanced {
                // Only reachable from erase. `node` keeps leaning toward `child`'s former inner
                // subtree and `child` now leans back toward `node`.
                self.links_mut(child).set_balance(lean.opposite());
                return false;
            }

            self.links_mut(node).set_balance(Balance::Balanced);
            self.links_mut(child).set_balance(Balance::Balanced);
            return true;
        }

        let grandchild = self
            .links(child)
            .child(!heavy)
            .expect("inner grandchild of a double rotation must exist");
        let grandchild_balance = self.links(grandchild).balance();

        tracing::trace!(pivot = ?node, promoted = ?grandchild, "double rotation");
        self.rotate_twice_at(node, child, grandchild);

        // `node` receives the grandchild's `!heavy` subtree and `child` its `heavy` subtree; the
        // one that was shorter leaves its new parent leaning away from it.
        let node_balance = if grandchild_balance == lean {
            lean.opposite()
        } else {
            Balance::Balanced
        };
        let child_balance = if grandchild_balance == lean.opposite() {
            lean
        } else {
            Balance::Balanced
        };

        self.links_mut(node).set_balance(node_balance);
        self.links_mut(child).set_balance(child_balance);
        self.links_mut(grandchild).set_balance(Balance::Balanced);

        true
    }

    // Restores balance factors after `node` was attached below `pivot`.
    fn rebalance_inserted(&mut self, pivot: NodeId, node: NodeId) {
        let mut child = node;
        let mut parent = self
            .links(node)
            .parent()
            .expect("inserted node must not be the tree root");

        // Every node strictly between the pivot and the new leaf was balanced, and now leans
        // toward the leaf.
        while parent != pivot {
            debug_assert_eq!(
                self.links(parent).balance(),
                Balance::Balanced,
                "node below the insertion pivot was not balanced"
            );

            let dir = self.which_child(parent, child);
            self.links_mut(parent).set_balance(Balance::leaning(dir));

            child = parent;
            parent = self
                .links(parent)
                .parent()
                .expect("pivot must be an ancestor of the inserted node");
        }

        let dir = self.which_child(pivot, child);
        let grown = Balance::leaning(dir);
        let balance = self.links(pivot).balance();

        if balance == Balance::Balanced {
            // The pivot's subtree grew by one level; since the pivot is either the root or sits
            // below a balanced path, nothing above it needs to change.
            self.links_mut(pivot).set_balance(grown);
        } else if balance == grown.opposite() {
            self.links_mut(pivot).set_balance(Balance::Balanced);
        } else {
            self.rotate_heavy(pivot, dir);
        }
    }

    /// Removes the node `node` from the tree and returns its element.
    pub(crate) fn remove_at(&mut self, node: NodeId) -> T {
        // There are two cases:
        //
        // 1. `node` has two children.
        //
        //    Its in-order predecessor (the maximum of its left subtree) has no right child. The
        //    predecessor is unlinked, its left child taking its place, and it then assumes
        //    `node`'s position, children and balance. The subtree that lost a level is the right
        //    subtree of the predecessor's former parent, or the left subtree of the predecessor
        //    itself if it was `node`'s left child.
        //
        // 2. `node` has at most one child.
        //
        //    The child (or nothing) takes `node`'s place under its parent, and that side of the
        //    parent lost a level.
        let links = self.links(node);
        let parent = links.parent();
        let left = links.left();
        let right = links.right();
        let balance = links.balance();

        let shrunk = match (left, right) {
            (Some(left), Some(right)) => {
                let pred = self.extreme_in_subtree(left, Dir::Right);

                let shrunk = if pred == left {
                    (pred, Dir::Left)
                } else {
                    let pred_parent = self
                        .links(pred)
                        .parent()
                        .expect("predecessor below `left` must have a parent");
                    let pred_left = self.links(pred).left();

                    // Elevate the predecessor's left child to replace it.
                    self.links_mut(pred_parent).set_right(pred_left);
                    self.maybe_set_parent(pred_left, Some(pred_parent));

                    self.links_mut(pred).set_left(Some(left));
                    self.links_mut(left).set_parent(Some(pred));

                    (pred_parent, Dir::Right)
                };

                tracing::trace!(removed = ?node, predecessor = ?pred, "predecessor relinked");

                self.links_mut(pred).set_right(Some(right));
                self.links_mut(right).set_parent(Some(pred));

                self.links_mut(pred).set_parent(parent);
                self.links_mut(pred).set_balance(balance);
                self.replace_child_or_set_root(parent, node, Some(pred));

                Some(shrunk)
            }

            (child, None) | (None, child) => {
                let shrunk = parent.map(|p| (p, self.which_child(p, node)));

                self.replace_child_or_set_root(parent, node, child);
                self.maybe_set_parent(child, parent);

                shrunk
            }
        };

        self.len -= 1;
        let item = self.arena.free(node);

        if let Some((from, dir)) = shrunk {
            self.rebalance_removed(from, dir);
        }

        item
    }

    // Walks up from `node`, whose `shrunk` subtree lost a level, until some subtree keeps its
    // height.
    fn rebalance_removed(&mut self, mut node: NodeId, mut shrunk: Dir) {
        loop {
            let parent = self.links(node).parent();
            // Captured before a rotation puts a different node in `parent`'s slot.
            let side = parent.map(|p| self.which_child(p, node));
            let balance = self.links(node).balance();

            if balance == Balance::Balanced {
                self.links_mut(node).set_balance(Balance::leaning(!shrunk));
                return;
            }

            if balance == Balance::leaning(shrunk) {
                self.links_mut(node).set_balance(Balance::Balanced);
            } else if !self.rotate_heavy(node, !shrunk) {
                tracing::trace!(pivot = ?node, "rotation kept subtree height");
                return;
            }

            match parent.zip(side) {
                Some((p, dir)) => {
                    node = p;
                    shrunk = dir;
                }
                None => return,
            }
        }
    }
}

impl<T, C> AvlTree<T, C>
where
    C: Compare<T>,
{
    /// Inserts an item into the tree.
    ///
    /// If an equal item is already stored it is replaced in place and returned; the shape of the
    /// tree does not change. This operation completes in _O(log(n))_ time and performs at most
    /// one rotation.
    pub fn insert(&mut self, item: T) -> Option<T> {
        let Some(root) = self.root else {
            // Tree is empty. Set `item` as the root and return.
            let node = self.arena.alloc(item, None);
            self.root = Some(node);
            self.len += 1;
            return None;
        };

        let mut pivot = root;
        let mut cur = root;

        // Descend the tree, looking for a suitable leaf.
        let dir = loop {
            if self.links(cur).balance() != Balance::Balanced {
                pivot = cur;
            }

            let dir = match self.cmp.compare(&item, self.item(cur)) {
                Ordering::Less => Dir::Left,
                Ordering::Greater => Dir::Right,
                Ordering::Equal => return Some(mem::replace(self.item_mut(cur), item)),
            };

            match self.links(cur).child(dir) {
                Some(child) => cur = child,
                None => break dir,
            }
        };

        let node = self.arena.alloc(item, Some(cur));
        self.links_mut(cur).set_child(dir, Some(node));
        self.len += 1;

        self.rebalance_inserted(pivot, node);

        None
    }

    /// Returns a reference to the stored item equal to `key`.
    pub fn get(&self, key: &T) -> Option<&T> {
        self.get_by(|stored| self.cmp.compare(key, stored))
    }

    /// Returns `true` if an item equal to `key` is stored in the tree.
    pub fn contains(&self, key: &T) -> bool {
        self.find_by(|stored| self.cmp.compare(key, stored)).is_some()
    }

    /// Removes and returns the stored item equal to `key`.
    ///
    /// This operation completes in _O(log(n))_ time.
    pub fn erase(&mut self, key: &T) -> Option<T> {
        let node = self.find_by(|stored| self.cmp.compare(key, stored))?;
        Some(self.remove_at(node))
    }

    #[doc(hidden)]
    pub fn assert_invariants(&self) {
        let checked = validate::check_parent_links(self)
            .and_then(|()| validate::check_bst_by(self, |a, b| self.cmp.compare(a, b)))
            .and_then(|()| validate::check_balance_factors(self));

        if let Err(violation) = checked {
            panic!("AVL tree invariant violated: {violation}");
        }

        assert_eq!(validate::count(self), self.len, "tree length is stale");
    }
}

impl<T: fmt::Debug, C> fmt::Debug for AvlTree<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<T, C: Compare<T>> Extend<T> for AvlTree<T, C> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for item in iter {
            self.insert(item);
        }
    }
}

impl<T, C: Compare<T> + Default> FromIterator<T> for AvlTree<T, C> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut tree = AvlTree::with_comparator(C::default());
        tree.extend(iter);
        tree
    }
}
