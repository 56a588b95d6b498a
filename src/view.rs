use core::fmt;

use crate::{AvlTree, Balance, NodeId};

/// Read-only access to the shape of a binary tree.
///
/// This is the capability the helpers in [`validate`](crate::validate) and
/// [`debug`](crate::debug) are written against. Implementations must not hand out handles to
/// nodes that are not part of the tree.
pub trait TreeView {
    type Node: Copy + Eq + fmt::Debug;
    type Key: ?Sized;

    fn root(&self) -> Option<Self::Node>;

    fn parent(&self, node: Self::Node) -> Option<Self::Node>;

    fn left(&self, node: Self::Node) -> Option<Self::Node>;

    fn right(&self, node: Self::Node) -> Option<Self::Node>;

    fn key(&self, node: Self::Node) -> &Self::Key;

    /// Returns the balance factor recorded at `node`, for trees that record one.
    fn balance(&self, node: Self::Node) -> Option<Balance> {
        let _ = node;
        None
    }
}

/// Handles of erased nodes are rejected with a panic.
impl<T, C> TreeView for AvlTree<T, C> {
    type Node = NodeId;
    type Key = T;

    fn root(&self) -> Option<NodeId> {
        self.root
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.links(node).parent()
    }

    fn left(&self, node: NodeId) -> Option<NodeId> {
        self.links(node).left()
    }

    fn right(&self, node: NodeId) -> Option<NodeId> {
        self.links(node).right()
    }

    fn key(&self, node: NodeId) -> &T {
        self.item(node)
    }

    fn balance(&self, node: NodeId) -> Option<Balance> {
        Some(self.links(node).balance())
    }
}
