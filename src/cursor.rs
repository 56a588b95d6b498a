use crate::{arena::Link, AvlTree, NodeId};

/// A read-only position in an [`AvlTree`].
///
/// Besides the stored elements, the cursor may rest on an empty "ghost" position that sits after
/// the maximum and before the minimum, so repeated moves cycle through the whole tree.
pub struct Cursor<'tree, T, C> {
    tree: &'tree AvlTree<T, C>,
    ptr: Link,
}

impl<'tree, T, C> Cursor<'tree, T, C> {
    /// Returns a handle to the node the cursor points to.
    pub fn node(&self) -> Option<NodeId> {
        self.ptr
    }

    /// Steps to the in-order successor.
    ///
    /// From the ghost position this lands on the minimum; from the maximum it lands on the ghost.
    pub fn move_next(&mut self) {
        self.ptr = next(self.tree, self.ptr);
    }

    /// Steps to the in-order predecessor.
    ///
    /// From the ghost position this lands on the maximum; from the minimum it lands on the ghost.
    pub fn move_prev(&mut self) {
        self.ptr = prev(self.tree, self.ptr);
    }

    /// Returns the element under the cursor, or `None` on the ghost position.
    pub fn get(&self) -> Option<&'tree T> {
        let tree = self.tree;
        self.ptr.map(|p| tree.item(p))
    }

    /// Returns the element [`move_next`](Self::move_next) would land on, without moving.
    pub fn peek_next(&self) -> Option<&'tree T> {
        let tree = self.tree;
        next(tree, self.ptr).map(|p| tree.item(p))
    }

    /// Returns the element [`move_prev`](Self::move_prev) would land on, without moving.
    pub fn peek_prev(&self) -> Option<&'tree T> {
        let tree = self.tree;
        prev(tree, self.ptr).map(|p| tree.item(p))
    }
}

/// A position in an [`AvlTree`] that can erase the element under it.
///
/// Movement follows the same cycle as [`Cursor`].
pub struct CursorMut<'tree, T, C> {
    tree: &'tree mut AvlTree<T, C>,
    ptr: Link,
}

impl<'tree, T, C> CursorMut<'tree, T, C> {
    /// Borrows this cursor as a read-only [`Cursor`] at the same position.
    pub fn as_cursor(&self) -> Cursor<'_, T, C> {
        Cursor {
            tree: &*self.tree,
            ptr: self.ptr,
        }
    }

    /// Returns a handle to the node the cursor points to.
    pub fn node(&self) -> Option<NodeId> {
        self.ptr
    }

    /// See [`Cursor::move_next`].
    pub fn move_next(&mut self) {
        self.ptr = next(self.tree, self.ptr);
    }

    /// See [`Cursor::move_prev`].
    pub fn move_prev(&mut self) {
        self.ptr = prev(self.tree, self.ptr);
    }

    /// See [`Cursor::get`].
    pub fn get(&self) -> Option<&T> {
        self.as_cursor().get()
    }

    /// See [`Cursor::peek_next`].
    pub fn peek_next(&self) -> Option<&T> {
        self.as_cursor().peek_next()
    }

    /// See [`Cursor::peek_prev`].
    pub fn peek_prev(&self) -> Option<&T> {
        self.as_cursor().peek_prev()
    }

    /// Erases the element under the cursor and steps to its successor.
    ///
    /// On the ghost position nothing is erased and `None` is returned.
    pub fn remove_current(&mut self) -> Option<T> {
        let remove = self.ptr?;

        // Erase relinks nodes without moving them, so the neighbor's handle survives.
        self.move_next();
        Some(self.tree.remove_at(remove))
    }

    /// Erases the element under the cursor and steps to its predecessor.
    ///
    /// On the ghost position nothing is erased and `None` is returned.
    pub fn remove_current_and_move_prev(&mut self) -> Option<T> {
        let remove = self.ptr?;

        self.move_prev();
        Some(self.tree.remove_at(remove))
    }
}

fn next<T, C>(tree: &AvlTree<T, C>, ptr: Link) -> Link {
    match ptr {
        Some(p) => tree.successor(p),
        None => tree.first_node(),
    }
}

fn prev<T, C>(tree: &AvlTree<T, C>, ptr: Link) -> Link {
    match ptr {
        Some(p) => tree.predecessor(p),
        None => tree.last_node(),
    }
}

impl<T, C> AvlTree<T, C> {
    /// Returns a cursor pointing to the first element, or to the "ghost" non-element if the
    /// tree is empty.
    pub fn cursor_first(&self) -> Cursor<'_, T, C> {
        Cursor {
            ptr: self.first_node(),
            tree: self,
        }
    }

    /// Returns a cursor pointing to the last element, or to the "ghost" non-element if the
    /// tree is empty.
    pub fn cursor_last(&self) -> Cursor<'_, T, C> {
        Cursor {
            ptr: self.last_node(),
            tree: self,
        }
    }

    /// Returns a mutable cursor pointing to the first element.
    pub fn cursor_first_mut(&mut self) -> CursorMut<'_, T, C> {
        CursorMut {
            ptr: self.first_node(),
            tree: self,
        }
    }

    /// Returns a mutable cursor pointing to the last element.
    pub fn cursor_last_mut(&mut self) -> CursorMut<'_, T, C> {
        CursorMut {
            ptr: self.last_node(),
            tree: self,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::AvlTree;

    #[test]
    fn cursor_wraps_through_ghost() {
        let tree: AvlTree<u32> = [10, 20, 30].into_iter().collect();
        let mut curs = tree.cursor_last();

        assert_eq!(curs.get(), Some(&30));
        assert_eq!(curs.peek_next(), None);

        curs.move_next();
        assert_eq!(curs.get(), None);
        assert_eq!(curs.peek_next(), Some(&10));
        assert_eq!(curs.peek_prev(), Some(&30));

        curs.move_next();
        assert_eq!(curs.get(), Some(&10));
        curs.move_prev();
        curs.move_prev();
        assert_eq!(curs.get(), Some(&30));
    }

    #[test]
    fn cursor_nodes_are_tree_handles() {
        let mut tree: AvlTree<u32> = (1..=5).collect();

        let mut curs = tree.cursor_first();
        let mut seen = Vec::new();
        while let Some(node) = curs.node() {
            seen.push(*tree.get_node(node).unwrap());
            curs.move_next();
        }
        assert_eq!(seen, [1, 2, 3, 4, 5]);
        assert_eq!(curs.get(), None);

        // 1..=5 is rooted at 2.
        let root = tree.root();
        let mut curs = tree.cursor_first_mut();
        curs.move_next();
        assert_eq!(curs.node(), root);

        assert_eq!(curs.remove_current(), Some(2));
        let three = curs.node().unwrap();
        assert_eq!(curs.get(), Some(&3));

        assert_eq!(tree.get_node(three), Some(&3));
        assert_eq!(root.and_then(|r| tree.get_node(r)), None);
        tree.assert_invariants();
    }

    #[test]
    fn remove_through_cursor_keeps_position() {
        let mut tree: AvlTree<u32> = (0..16).collect();

        let mut curs = tree.cursor_first_mut();
        while let Some(&key) = curs.get() {
            if key % 2 == 0 {
                assert_eq!(curs.remove_current(), Some(key));
            } else {
                curs.move_next();
            }
        }
        assert_eq!(curs.remove_current(), None);

        tree.assert_invariants();
        assert_eq!(
            tree.iter().copied().collect::<Vec<_>>(),
            [1, 3, 5, 7, 9, 11, 13, 15]
        );

        let mut curs = tree.cursor_last_mut();
        assert_eq!(curs.remove_current_and_move_prev(), Some(15));
        assert_eq!(curs.get(), Some(&13));
        assert_eq!(curs.as_cursor().peek_next(), None);

        tree.assert_invariants();
        assert_eq!(tree.len(), 7);
    }
}
