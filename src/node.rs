use crate::arena::{Arena, NodeId};
use std::fmt;

/// Node storage. Entries are sorted by key, an internal node has one more child than entries,
/// a leaf has no children.
#[derive(Clone, Debug)]
pub(crate) struct Node<K, V> {
    pub pairs: Vec<(K, V)>,
    pub children: Vec<NodeId>,
    pub parent: Option<NodeId>,
}

impl<K, V> Node<K, V> {
    pub fn leaf(pairs: Vec<(K, V)>, parent: Option<NodeId>) -> Self {
        Self {
            pairs,
            children: Vec::new(),
            parent,
        }
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Read-only view of one node of a [`Tree`](crate::Tree), returned by
/// [`Tree::get_node`](crate::Tree::get_node), [`Tree::leftmost`](crate::Tree::leftmost) and friends.
pub struct NodeRef<'a, K, V> {
    nodes: &'a Arena<Node<K, V>>,
    id: NodeId,
}

impl<K, V> Clone for NodeRef<'_, K, V> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<K, V> Copy for NodeRef<'_, K, V> {}

impl<'a, K, V> NodeRef<'a, K, V> {
    pub(crate) fn new(nodes: &'a Arena<Node<K, V>>, id: NodeId) -> Self {
        Self { nodes, id }
    }

    #[inline]
    fn node(&self) -> &'a Node<K, V> {
        self.nodes.ix(self.id)
    }

    /// Handle of this node, stable until the node is split away, merged or freed.
    #[must_use]
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Key-value pairs held by this node, in ascending key order.
    #[must_use]
    pub fn entries(&self) -> &'a [(K, V)] {
        &self.node().pairs
    }

    /// Keys held by this node, in ascending order.
    pub fn keys(&self) -> impl DoubleEndedIterator<Item = &'a K> + ExactSizeIterator {
        self.node().pairs.iter().map(|(k, _)| k)
    }

    /// Number of entries in this node.
    #[must_use]
    pub fn len(&self) -> usize {
        self.node().pairs.len()
    }

    /// Does this node hold no entries? Only a transient state, never observable from outside.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.node().pairs.is_empty()
    }

    /// Is this node a leaf?
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.node().is_leaf()
    }

    /// Is this node the root?
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.node().parent.is_none()
    }

    /// Parent node, `None` for the root.
    #[must_use]
    pub fn parent(&self) -> Option<NodeRef<'a, K, V>> {
        self.node().parent.map(|p| NodeRef::new(self.nodes, p))
    }

    /// Child at index `i`, `None` for a leaf or when out of range.
    #[must_use]
    pub fn child(&self, i: usize) -> Option<NodeRef<'a, K, V>> {
        self.node()
            .children
            .get(i)
            .map(|&c| NodeRef::new(self.nodes, c))
    }

    /// Children in order, empty for a leaf.
    pub fn children(&self) -> impl DoubleEndedIterator<Item = NodeRef<'a, K, V>> + ExactSizeIterator {
        let nodes = self.nodes;
        self.node()
            .children
            .iter()
            .map(move |&c| NodeRef::new(nodes, c))
    }

    /// Number of nodes in the subtree rooted here, including this one.
    /// Computed by walking the subtree.
    #[must_use]
    pub fn subtree_nodes(&self) -> usize {
        1 + self.children().map(|c| c.subtree_nodes()).sum::<usize>()
    }

    /// Number of entries in the subtree rooted here.
    /// Computed by walking the subtree.
    #[must_use]
    pub fn subtree_len(&self) -> usize {
        self.len() + self.children().map(|c| c.subtree_len()).sum::<usize>()
    }

    /// Number of levels from this node down to the leaves, 1 for a leaf.
    #[must_use]
    pub fn height(&self) -> usize {
        let mut height = 1;
        let mut n = self.node();
        while let Some(&c) = n.children.first() {
            height += 1;
            n = self.nodes.ix(c);
        }
        height
    }
}

impl<K: fmt::Debug, V> fmt::Debug for NodeRef<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRef")
            .field("id", &self.id)
            .field("keys", &self.keys().collect::<Vec<_>>())
            .field("children", &self.node().children)
            .finish()
    }
}

impl<K, V> PartialEq for NodeRef<'_, K, V> {
    /// Two views are equal when they show the same node of the same tree.
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.nodes, other.nodes) && self.id == other.id
    }
}
impl<K, V> Eq for NodeRef<'_, K, V> {}
