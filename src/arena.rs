use core::{fmt, mem};

use crate::Balance;

/// A handle to a node stored in an [`AvlTree`](crate::AvlTree).
///
/// Handles stay valid until the node they refer to is erased. Rotations and the
/// predecessor splice performed by erase relink nodes but never move them, so a
/// handle keeps pointing at the same item for as long as that item is in the
/// tree. An erased node's slot may be reused by a later insertion, but the slot's
/// generation changes, so a stale handle never resolves to the new item.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

impl NodeId {
    #[inline]
    pub(crate) fn index(self) -> usize {
        self.index as usize
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}v{}", self.index, self.generation)
    }
}

pub(crate) type Link = Option<NodeId>;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Dir {
    Left = 0,
    Right = 1,
}

impl core::ops::Not for Dir {
    type Output = Dir;

    fn not(self) -> Self::Output {
        match self {
            Dir::Left => Dir::Right,
            Dir::Right => Dir::Left,
        }
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Links {
    parent: Link,
    children: [Link; 2],
    balance: Balance,
}

impl Links {
    fn new(parent: Link) -> Self {
        Links {
            parent,
            children: [None; 2],
            balance: Balance::Balanced,
        }
    }

    #[inline]
    pub(crate) fn parent(&self) -> Link {
        self.parent
    }

    #[inline]
    pub(crate) fn child(&self, dir: Dir) -> Link {
        self.children[dir as usize]
    }

    #[inline]
    pub(crate) fn left(&self) -> Link {
        self.child(Dir::Left)
    }

    #[inline]
    pub(crate) fn right(&self) -> Link {
        self.child(Dir::Right)
    }

    #[inline]
    pub(crate) fn balance(&self) -> Balance {
        self.balance
    }

    #[inline]
    pub(crate) fn set_parent(&mut self, parent: Link) -> Link {
        mem::replace(&mut self.parent, parent)
    }

    #[inline]
    pub(crate) fn set_child(&mut self, dir: Dir, child: Link) -> Link {
        mem::replace(&mut self.children[dir as usize], child)
    }

    #[inline]
    pub(crate) fn set_left(&mut self, left: Link) -> Link {
        self.set_child(Dir::Left, left)
    }

    #[inline]
    pub(crate) fn set_right(&mut self, right: Link) -> Link {
        self.set_child(Dir::Right, right)
    }

    #[inline]
    pub(crate) fn set_balance(&mut self, balance: Balance) {
        self.balance = balance;
    }
}

pub(crate) struct Node<T> {
    pub(crate) links: Links,
    pub(crate) item: T,
}

struct Slot<T> {
    generation: u32,
    node: Option<Node<T>>,
}

/// Slot storage for tree nodes.
///
/// Vacant slots are listed in `free` and handed out again before the backing
/// vector grows. Vacating a slot bumps its generation.
pub(crate) struct Arena<T> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
}

impl<T> Arena<T> {
    pub(crate) const fn new() -> Self {
        Arena {
            slots: Vec::new(),
            free: Vec::new(),
        }
    }

    pub(crate) fn alloc(&mut self, item: T, parent: Link) -> NodeId {
        let node = Node {
            links: Links::new(parent),
            item,
        };

        match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                debug_assert!(slot.node.is_none());
                slot.node = Some(node);
                NodeId {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                let index = u32::try_from(self.slots.len()).expect("node arena exhausted");
                self.slots.push(Slot {
                    generation: 0,
                    node: Some(node),
                });
                NodeId {
                    index,
                    generation: 0,
                }
            }
        }
    }

    pub(crate) fn free(&mut self, id: NodeId) -> T {
        let node = self
            .slot_mut(id)
            .and_then(|slot| {
                slot.generation = slot.generation.wrapping_add(1);
                slot.node.take()
            })
            .unwrap_or_else(|| panic!("double free of node {id:?}"));
        self.free.push(id.index);
        node.item
    }

    /// Vacates every slot. Slots are kept so that handles from before the clear stay stale.
    pub(crate) fn clear(&mut self) {
        self.free.clear();

        for (index, slot) in self.slots.iter_mut().enumerate().rev() {
            if slot.node.take().is_some() {
                slot.generation = slot.generation.wrapping_add(1);
            }
            self.free.push(index as u32);
        }
    }

    fn slot_mut(&mut self, id: NodeId) -> Option<&mut Slot<T>> {
        self.slots
            .get_mut(id.index())
            .filter(|slot| slot.generation == id.generation && slot.node.is_some())
    }

    #[inline]
    pub(crate) fn get(&self, id: NodeId) -> Option<&Node<T>> {
        let slot = self.slots.get(id.index())?;
        if slot.generation != id.generation {
            return None;
        }
        slot.node.as_ref()
    }

    #[inline]
    pub(crate) fn node(&self, id: NodeId) -> &Node<T> {
        match self.get(id) {
            Some(node) => node,
            None => panic!("dangling node handle {id:?}"),
        }
    }

    #[inline]
    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node<T> {
        match self.slot_mut(id).and_then(|slot| slot.node.as_mut()) {
            Some(node) => node,
            None => panic!("dangling node handle {id:?}"),
        }
    }

    pub(crate) fn is_live(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }
}
