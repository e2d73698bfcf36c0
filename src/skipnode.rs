//! Node storage for the skiplist.
//!
//! Nodes are kept in a contiguous [`Arena`] and refer to one another through
//! [`NodeId`] handles rather than pointers. A node reachable from several
//! levels at once is then simply a handle stored in several `forward` slots,
//! and relinking a level is a plain overwrite of one slot.

use std::mem;

/// Handle to a node stored in an [`Arena`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct NodeId(usize);

impl NodeId {
    /// The head sentinel always occupies the first slot of the arena.
    pub(crate) const HEAD: Self = NodeId(0);
}

// ////////////////////////////////////////////////////////////////////////////
// SkipNode
// ////////////////////////////////////////////////////////////////////////////

/// A single entry of the skiplist.
///
/// A node of height `h` has `h + 1` forward links, one for each level from `0`
/// through `h`. `forward[i]` is the next node at level `i`, or `None` if this
/// node is the last one at that level.
///
/// The head sentinel is also a `SkipNode`: its key and value are never read,
/// and it carries one forward link for every level of the list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct SkipNode {
    pub key: i64,
    pub value: String,
    pub forward: Vec<Option<NodeId>>,
}

impl SkipNode {
    /// Create a new head node spanning `total_levels` levels.
    pub fn head(total_levels: usize) -> Self {
        SkipNode {
            key: i64::MIN,
            value: String::new(),
            forward: vec![None; total_levels],
        }
    }

    /// Create a new node of the given height with all links unset.
    #[expect(
        clippy::arithmetic_side_effects,
        reason = "height is always below the total number of levels"
    )]
    pub fn new(key: i64, value: String, height: usize) -> Self {
        SkipNode {
            key,
            value,
            forward: vec![None; height + 1],
        }
    }

    /// How high this node reaches.
    pub fn height(&self) -> usize {
        self.forward.len().saturating_sub(1)
    }

    /// The next node at `level`, if this node participates in that level and
    /// is not the last one on it.
    pub fn next(&self, level: usize) -> Option<NodeId> {
        self.forward.get(level).copied().flatten()
    }

    /// Point this node's link at `level` to `next`.
    ///
    /// Levels above the node's height are ignored.
    pub fn set_next(&mut self, level: usize, next: Option<NodeId>) {
        if let Some(slot) = self.forward.get_mut(level) {
            *slot = next;
        }
    }
}

// ////////////////////////////////////////////////////////////////////////////
// Arena
// ////////////////////////////////////////////////////////////////////////////

/// Owner of every node of a skiplist, the head included.
///
/// Slots freed by [`release`][Arena::release] are recycled by later calls to
/// [`alloc`][Arena::alloc], so the arena only grows to the largest number of
/// entries the list has ever held at once.
#[derive(Clone, Debug)]
pub(crate) struct Arena {
    nodes: Vec<SkipNode>,
    free: Vec<NodeId>,
}

impl Arena {
    /// Create an arena holding just a head node with `total_levels` levels.
    pub fn new(total_levels: usize) -> Self {
        Arena {
            nodes: vec![SkipNode::head(total_levels)],
            free: Vec::new(),
        }
    }

    /// The head sentinel.
    pub fn head(&self) -> &SkipNode {
        self.get(NodeId::HEAD)
    }

    #[expect(
        clippy::indexing_slicing,
        reason = "handles are only ever produced by this arena"
    )]
    pub fn get(&self, id: NodeId) -> &SkipNode {
        &self.nodes[id.0]
    }

    #[expect(
        clippy::indexing_slicing,
        reason = "handles are only ever produced by this arena"
    )]
    pub fn get_mut(&mut self, id: NodeId) -> &mut SkipNode {
        &mut self.nodes[id.0]
    }

    /// Store `node`, reusing a vacant slot when one is available.
    pub fn alloc(&mut self, node: SkipNode) -> NodeId {
        if let Some(id) = self.free.pop() {
            *self.get_mut(id) = node;
            id
        } else {
            self.nodes.push(node);
            NodeId(self.nodes.len().saturating_sub(1))
        }
    }

    /// Take the node out of its slot and mark the slot as vacant.
    ///
    /// The caller must have unlinked the node from every level first.
    pub fn release(&mut self, id: NodeId) -> SkipNode {
        debug_assert_ne!(id, NodeId::HEAD, "the head node cannot be released");
        let node = mem::replace(self.get_mut(id), SkipNode::head(0));
        self.free.push(id);
        node
    }

    /// Number of slots in use or waiting to be reused, excluding the head.
    pub fn slots(&self) -> usize {
        self.nodes.len().saturating_sub(1)
    }
}
