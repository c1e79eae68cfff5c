/// B-tree of order m mapping keys to values, ordered by a runtime [`Comparator`].
///
/// The order is the maximum number of children of a node, so a node holds at most `m - 1`
/// entries and every non-root node at least `ceil(m/2) - 1`. All leaves are at the same depth.
///
/// General guide to implementation:
///
/// Nodes live in an arena and refer to each other (children and parent) by [`NodeId`].
/// Splits and merges therefore only move handles between vectors, never re-own nodes.
///
/// Insertion descends to a leaf, inserts, then splits upward while a node overflows.
/// Removal from an internal node substitutes the in-order predecessor, so entries are only
/// ever physically removed from leaves. Underflow is repaired by borrowing from a sibling,
/// else merging with one, cascading upward.
///
/// The tree also carries a mutation stamp, bumped by every change of structure, which lets a
/// detached [`Checkpoint`](crate::Checkpoint) detect that it has gone stale.
pub struct Tree<K, V, C = Natural> {
    nodes: Arena<Node<K, V>>,
    root: Option<NodeId>,
    len: usize,
    order: usize,
    cmp: C,
    id: u64,
    stamp: u64,
}

static NEXT_TREE_ID: AtomicU64 = AtomicU64::new(1);

fn next_tree_id() -> u64 {
    NEXT_TREE_ID.fetch_add(1, AtomicOrdering::Relaxed)
}

impl<K: Ord, V> Default for Tree<K, V, Natural> {
    fn default() -> Self {
        Self::new(DEFAULT_ORDER, Natural)
    }
}

impl<K, V, C> Tree<K, V, C>
where
    C: Comparator<K>,
{
    /// Returns a new, empty tree of the given order.
    ///
    /// # Panics
    ///
    /// Panics if `order < 3`.
    #[must_use]
    pub fn new(order: usize, cmp: C) -> Self {
        match Self::try_new(order, cmp) {
            Ok(tree) => tree,
            Err(e) => panic!("{e}"),
        }
    }

    /// Returns a new, empty tree, or [`Error::InvalidOrder`] if `order < 3`.
    pub fn try_new(order: usize, cmp: C) -> Result<Self> {
        if order < 3 {
            return Err(Error::InvalidOrder { order });
        }
        Ok(Self {
            nodes: Arena::new(),
            root: None,
            len: 0,
            order,
            cmp,
            id: next_tree_id(),
            stamp: 0,
        })
    }

    /// Returns a new, empty tree of order [`DEFAULT_ORDER`] using `cmp`.
    #[must_use]
    pub fn with_comparator(cmp: C) -> Self {
        Self::new(DEFAULT_ORDER, cmp)
    }

    /// Build a tree by inserting every pair from `iter`, later duplicates overwrite earlier ones.
    ///
    /// # Panics
    ///
    /// Panics if `order < 3`.
    pub fn from_iter_with<I>(order: usize, cmp: C, iter: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
    {
        let mut tree = Self::new(order, cmp);
        tree.extend(iter);
        tree
    }

    /// Build a tree by draining an [`OrderedSource`].
    ///
    /// # Panics
    ///
    /// Panics if `order < 3`.
    pub fn from_source<S>(order: usize, cmp: C, source: S) -> Self
    where
        S: OrderedSource<Key = K, Value = V>,
    {
        let mut tree = Self::new(order, cmp);
        tree.load(source);
        tree
    }

    /// Insert every pair produced by `source`, returning how many pairs were pulled.
    pub fn load<S>(&mut self, mut source: S) -> usize
    where
        S: OrderedSource<Key = K, Value = V>,
    {
        let mut pulled = 0;
        while source.advance() {
            if let Some((k, v)) = source.current() {
                self.put(k, v);
                pulled += 1;
            }
        }
        debug!(pulled, len = self.len, "bulk load complete");
        pulled
    }

    /// Insert key-value pair into tree, or if key is already in tree, replaces value and returns old value.
    pub fn put(&mut self, key: K, value: V) -> Option<V> {
        let Some(mut id) = self.root else {
            let root = self.nodes.insert(Node::leaf(vec![(key, value)], None));
            self.root = Some(root);
            self.len = 1;
            self.bump();
            return None;
        };
        loop {
            let node = self.nodes.ixm(id);
            match search(&self.cmp, &node.pairs, &key) {
                Ok(i) => {
                    return Some(std::mem::replace(&mut node.pairs[i].1, value));
                }
                Err(i) => {
                    if node.is_leaf() {
                        node.pairs.insert(i, (key, value));
                        break;
                    }
                    id = node.children[i];
                }
            }
        }
        self.len += 1;
        self.bump();
        self.split(id);
        None
    }

    /// Does the tree have an entry for the specified key.
    pub fn contains_key(&self, key: &K) -> bool {
        self.locate(key).is_some()
    }

    /// Get reference to the value corresponding to the key.
    pub fn get(&self, key: &K) -> Option<&V> {
        self.get_key_value(key).map(|(_k, v)| v)
    }

    /// Get references to the corresponding key and value.
    pub fn get_key_value(&self, key: &K) -> Option<(&K, &V)> {
        let (id, i) = self.locate(key)?;
        let (k, v) = &self.nodes.ix(id).pairs[i];
        Some((k, v))
    }

    /// Get a mutable reference to the value corresponding to the key.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let (id, i) = self.locate(key)?;
        Some(&mut self.nodes.ixm(id).pairs[i].1)
    }

    /// Get the node holding `key`.
    pub fn get_node(&self, key: &K) -> Option<NodeRef<'_, K, V>> {
        let (id, _) = self.locate(key)?;
        Some(NodeRef::new(&self.nodes, id))
    }

    /// Greatest entry with key less than or equal to `key`.
    pub fn floor(&self, key: &K) -> Option<(&K, &V)> {
        let mut best = None;
        let mut id = self.root?;
        loop {
            let node = self.nodes.ix(id);
            match search(&self.cmp, &node.pairs, key) {
                Ok(i) => {
                    best = Some((id, i));
                    break;
                }
                Err(i) => {
                    if i > 0 {
                        best = Some((id, i - 1));
                    }
                    if node.is_leaf() {
                        break;
                    }
                    id = node.children[i];
                }
            }
        }
        best.map(|(id, i)| {
            let (k, v) = &self.nodes.ix(id).pairs[i];
            (k, v)
        })
    }

    /// Least entry with key greater than or equal to `key`.
    pub fn ceiling(&self, key: &K) -> Option<(&K, &V)> {
        let mut best = None;
        let mut id = self.root?;
        loop {
            let node = self.nodes.ix(id);
            match search(&self.cmp, &node.pairs, key) {
                Ok(i) => {
                    best = Some((id, i));
                    break;
                }
                Err(i) => {
                    if i < node.pairs.len() {
                        best = Some((id, i));
                    }
                    if node.is_leaf() {
                        break;
                    }
                    id = node.children[i];
                }
            }
        }
        best.map(|(id, i)| {
            let (k, v) = &self.nodes.ix(id).pairs[i];
            (k, v)
        })
    }

    /// Remove key-value pair from tree, returning just the value.
    /// Removing an absent key does nothing.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.remove_entry(key).map(|(_k, v)| v)
    }

    /// Remove key-value pair from tree.
    pub fn remove_entry(&mut self, key: &K) -> Option<(K, V)> {
        let (id, i) = self.locate(key)?;
        self.len -= 1;
        self.bump();
        let removed = if self.nodes.ix(id).is_leaf() {
            let kv = self.nodes.ixm(id).pairs.remove(i);
            self.rebalance(id);
            kv
        } else {
            // Substitute the in-order predecessor, the last entry of the left subtree.
            let left = self.nodes.ix(id).children[i];
            let pred = self.rightmost_leaf(left);
            let Some(sub) = self.nodes.ixm(pred).pairs.pop() else {
                unreachable!("leaf {pred:?} is empty")
            };
            let kv = std::mem::replace(&mut self.nodes.ixm(id).pairs[i], sub);
            self.rebalance(pred);
            kv
        };
        if let Some(root) = self.root {
            if self.nodes.ix(root).pairs.is_empty() {
                self.nodes.remove(root);
                self.root = None;
                trace!(tree = self.id, "last entry removed");
            }
        }
        Some(removed)
    }

    #[cfg(test)]
    pub(crate) fn check(&self) {
        if let Err(e) = self.validate() {
            panic!("invalid tree: {e}");
        }
        let reachable = self.root_node().map_or(0, |r| r.subtree_nodes());
        assert_eq!(self.nodes.len(), reachable, "arena holds unreachable nodes");
    }

    /// Check the structural invariants, returning the first violation found.
    ///
    /// A tree only ever fails this if its comparator is not a strict total order.
    pub fn validate(&self) -> Result<()> {
        let Some(root) = self.root else {
            return if self.len == 0 {
                Ok(())
            } else {
                Err(Error::LenMismatch {
                    recorded: self.len,
                    counted: 0,
                })
            };
        };
        if self.nodes.ix(root).parent.is_some() {
            return Err(Error::ParentLink { node: root });
        }
        let mut leaf_depth = None;
        let mut counted = 0;
        let mut prev: Option<&K> = None;
        self.validate_node(root, 1, &mut leaf_depth, &mut counted, &mut prev)?;
        if counted != self.len {
            return Err(Error::LenMismatch {
                recorded: self.len,
                counted,
            });
        }
        Ok(())
    }

    /// In-order walk of the subtree at `id`, checking each node as it goes.
    fn validate_node<'a>(
        &'a self,
        id: NodeId,
        depth: usize,
        leaf_depth: &mut Option<usize>,
        counted: &mut usize,
        prev: &mut Option<&'a K>,
    ) -> Result<()> {
        let node = self.nodes.ix(id);
        let len = node.pairs.len();
        if node.parent.is_some() && (len < self.min_entries() || len > self.max_entries()) {
            return Err(Error::EntryCount {
                node: id,
                len,
                min: self.min_entries(),
                max: self.max_entries(),
            });
        }
        if len == 0 || len > self.max_entries() {
            return Err(Error::EntryCount {
                node: id,
                len,
                min: 1,
                max: self.max_entries(),
            });
        }
        *counted += len;
        if node.is_leaf() {
            match *leaf_depth {
                None => *leaf_depth = Some(depth),
                Some(expected) if expected != depth => {
                    return Err(Error::LeafDepth {
                        node: id,
                        expected,
                        found: depth,
                    });
                }
                Some(_) => {}
            }
        } else if node.children.len() != len + 1 {
            return Err(Error::ChildCount {
                node: id,
                children: node.children.len(),
                entries: len,
            });
        }
        for i in 0..=len {
            if let Some(&c) = node.children.get(i) {
                if self.nodes.ix(c).parent != Some(id) {
                    return Err(Error::ParentLink { node: c });
                }
                self.validate_node(c, depth + 1, leaf_depth, counted, prev)?;
            }
            if let Some((k, _)) = node.pairs.get(i) {
                if let Some(p) = *prev {
                    if self.cmp.compare(p, k) != Ordering::Less {
                        return Err(Error::Unordered { node: id, entry: i });
                    }
                }
                *prev = Some(k);
            }
        }
        Ok(())
    }

    /// Node and entry index holding `key`.
    pub(crate) fn locate(&self, key: &K) -> Option<(NodeId, usize)> {
        let mut id = self.root?;
        loop {
            let node = self.nodes.ix(id);
            match search(&self.cmp, &node.pairs, key) {
                Ok(i) => return Some((id, i)),
                Err(i) => {
                    if node.is_leaf() {
                        return None;
                    }
                    id = node.children[i];
                }
            }
        }
    }

    /// Split `id` while it holds more than `max_entries`, cascading towards the root.
    fn split(&mut self, mut id: NodeId) {
        let middle = self.middle();
        while self.nodes.ix(id).pairs.len() > self.max_entries() {
            let node = self.nodes.ixm(id);
            let right_pairs = node.pairs.split_off(middle + 1);
            let med = node.pairs.remove(middle);
            let right_children = if node.is_leaf() {
                Vec::new()
            } else {
                node.children.split_off(middle + 1)
            };
            let parent = node.parent;
            let right = self.nodes.insert(Node {
                pairs: right_pairs,
                children: right_children,
                parent,
            });
            self.adopt_children(right);
            match parent {
                None => {
                    let root = self.nodes.insert(Node {
                        pairs: vec![med],
                        children: vec![id, right],
                        parent: None,
                    });
                    self.nodes.ixm(id).parent = Some(root);
                    self.nodes.ixm(right).parent = Some(root);
                    self.root = Some(root);
                    trace!(tree = self.id, height = self.height(), "root split");
                    return;
                }
                Some(p) => {
                    let pn = self.nodes.ixm(p);
                    let Err(at) = search(&self.cmp, &pn.pairs, &med.0) else {
                        unreachable!("split key already present in parent {p:?}")
                    };
                    pn.pairs.insert(at, med);
                    pn.children.insert(at + 1, right);
                    id = p;
                }
            }
        }
    }

    /// Restore the minimum-entries invariant at `id` after a removal, cascading upward.
    fn rebalance(&mut self, mut id: NodeId) {
        let min = self.min_entries();
        loop {
            let node = self.nodes.ix(id);
            if node.pairs.len() >= min {
                return;
            }
            let Some(parent) = node.parent else {
                return;
            };
            let siblings = &self.nodes.ix(parent).children;
            let Some(at) = siblings.iter().position(|&c| c == id) else {
                unreachable!("{id:?} missing from its parent {parent:?}")
            };
            let left = at.checked_sub(1).map(|i| siblings[i]);
            let right = siblings.get(at + 1).copied();

            if let Some(left) = left {
                if self.nodes.ix(left).pairs.len() > min {
                    self.rotate_right(parent, at - 1, left, id);
                    return;
                }
            }
            if let Some(right) = right {
                if self.nodes.ix(right).pairs.len() > min {
                    self.rotate_left(parent, at, id, right);
                    return;
                }
            }
            let survivor = if right.is_some() {
                self.merge(parent, at)
            } else if left.is_some() {
                self.merge(parent, at - 1)
            } else {
                unreachable!("{id:?} has no siblings")
            };
            if Some(parent) == self.root && self.nodes.ix(parent).pairs.is_empty() {
                self.nodes.remove(parent);
                self.nodes.ixm(survivor).parent = None;
                self.root = Some(survivor);
                trace!(tree = self.id, height = self.height(), "root collapsed");
                return;
            }
            id = parent;
        }
    }

    /// Borrow from the left sibling: its last entry moves up to separator `sep`,
    /// the old separator moves down to the front of `node`.
    fn rotate_right(&mut self, parent: NodeId, sep: usize, left: NodeId, node: NodeId) {
        let ln = self.nodes.ixm(left);
        let Some(up) = ln.pairs.pop() else {
            unreachable!("left sibling {left:?} is empty")
        };
        let child = ln.children.pop();
        let down = std::mem::replace(&mut self.nodes.ixm(parent).pairs[sep], up);
        let n = self.nodes.ixm(node);
        n.pairs.insert(0, down);
        if let Some(child) = child {
            n.children.insert(0, child);
            self.nodes.ixm(child).parent = Some(node);
        }
    }

    /// Borrow from the right sibling: its first entry moves up to separator `sep`,
    /// the old separator moves down to the back of `node`.
    fn rotate_left(&mut self, parent: NodeId, sep: usize, node: NodeId, right: NodeId) {
        let rn = self.nodes.ixm(right);
        let up = rn.pairs.remove(0);
        let child = if rn.is_leaf() {
            None
        } else {
            Some(rn.children.remove(0))
        };
        let down = std::mem::replace(&mut self.nodes.ixm(parent).pairs[sep], up);
        let n = self.nodes.ixm(node);
        n.pairs.push(down);
        if let Some(child) = child {
            n.children.push(child);
            self.nodes.ixm(child).parent = Some(node);
        }
    }

    /// Merge the child right of separator `sep` into the child left of it, pulling the separator
    /// down between them. Returns the surviving (left) child.
    fn merge(&mut self, parent: NodeId, sep: usize) -> NodeId {
        let pn = self.nodes.ixm(parent);
        let down = pn.pairs.remove(sep);
        let left = pn.children[sep];
        let right = pn.children.remove(sep + 1);
        let Node {
            pairs, children, ..
        } = self.nodes.remove(right);
        let ln = self.nodes.ixm(left);
        ln.pairs.push(down);
        ln.pairs.extend(pairs);
        for &c in &children {
            self.nodes.ixm(c).parent = Some(left);
        }
        self.nodes.ixm(left).children.extend(children);
        left
    }

    /// Point the parent link of every child of `id` at `id`.
    fn adopt_children(&mut self, id: NodeId) {
        for i in 0..self.nodes.ix(id).children.len() {
            let c = self.nodes.ix(id).children[i];
            self.nodes.ixm(c).parent = Some(id);
        }
    }
}

// Queries that need no comparator.
impl<K, V, C> Tree<K, V, C> {
    /// Clear the tree.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
        self.len = 0;
        self.bump();
        trace!(tree = self.id, "cleared");
    }

    /// Get number of key-value pairs in the tree.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Is the tree empty?
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Order of the tree (maximum number of children per node).
    #[must_use]
    pub fn order(&self) -> usize {
        self.order
    }

    /// The comparator.
    #[must_use]
    pub fn comparator(&self) -> &C {
        &self.cmp
    }

    /// Number of levels, 0 for an empty tree.
    #[must_use]
    pub fn height(&self) -> usize {
        self.root_node().map_or(0, |r| r.height())
    }

    /// Root node, `None` when empty.
    #[must_use]
    pub fn root_node(&self) -> Option<NodeRef<'_, K, V>> {
        self.root.map(|r| NodeRef::new(&self.nodes, r))
    }

    /// Left-most leaf (holding the minimum key), `None` when empty.
    #[must_use]
    pub fn leftmost(&self) -> Option<NodeRef<'_, K, V>> {
        self.root
            .map(|r| NodeRef::new(&self.nodes, self.leftmost_leaf(r)))
    }

    /// Right-most leaf (holding the maximum key), `None` when empty.
    #[must_use]
    pub fn rightmost(&self) -> Option<NodeRef<'_, K, V>> {
        self.root
            .map(|r| NodeRef::new(&self.nodes, self.rightmost_leaf(r)))
    }

    /// Get references to first key and value.
    #[must_use]
    pub fn first_key_value(&self) -> Option<(&K, &V)> {
        let (k, v) = self.leftmost()?.entries().first()?;
        Some((k, v))
    }

    /// Get references to last key and value.
    #[must_use]
    pub fn last_key_value(&self) -> Option<(&K, &V)> {
        let (k, v) = self.rightmost()?.entries().last()?;
        Some((k, v))
    }

    #[inline]
    fn max_entries(&self) -> usize {
        self.order - 1
    }

    #[inline]
    fn min_entries(&self) -> usize {
        self.order.div_ceil(2) - 1
    }

    /// Split pivot, biased so the right node gets the larger half when the order is even.
    #[inline]
    fn middle(&self) -> usize {
        (self.order - 1) / 2
    }

    fn bump(&mut self) {
        self.stamp = self.stamp.wrapping_add(1);
    }

    #[inline]
    pub(crate) fn node(&self, id: NodeId) -> &Node<K, V> {
        self.nodes.ix(id)
    }

    #[inline]
    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node<K, V> {
        self.nodes.ixm(id)
    }

    pub(crate) fn node_ref(&self, id: NodeId) -> NodeRef<'_, K, V> {
        NodeRef::new(&self.nodes, id)
    }

    pub(crate) fn is_live(&self, id: NodeId) -> bool {
        self.nodes.contains(id)
    }

    pub(crate) fn root_id(&self) -> Option<NodeId> {
        self.root
    }

    pub(crate) fn tree_id(&self) -> u64 {
        self.id
    }

    pub(crate) fn stamp(&self) -> u64 {
        self.stamp
    }

    pub(crate) fn leftmost_leaf(&self, mut id: NodeId) -> NodeId {
        while let Some(&c) = self.nodes.ix(id).children.first() {
            id = c;
        }
        id
    }

    pub(crate) fn rightmost_leaf(&self, mut id: NodeId) -> NodeId {
        while let Some(&c) = self.nodes.ix(id).children.last() {
            id = c;
        }
        id
    }
} // End impl Tree

impl<K, V, C> Clone for Tree<K, V, C>
where
    K: Clone,
    V: Clone,
    C: Clone,
{
    /// Clones share nothing with the original, so cursors and checkpoints do not carry over.
    fn clone(&self) -> Self {
        Self {
            nodes: self.nodes.clone(),
            root: self.root,
            len: self.len,
            order: self.order,
            cmp: self.cmp.clone(),
            id: next_tree_id(),
            stamp: 0,
        }
    }
}

impl<K, V, C> PartialEq for Tree<K, V, C>
where
    K: PartialEq,
    V: PartialEq,
{
    /// Trees are equal when they hold the same pairs in the same order, whatever their shape.
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().zip(other.iter()).all(|(a, b)| a == b)
    }
}
impl<K: Eq, V: Eq, C> Eq for Tree<K, V, C> {}

impl<K: Debug, V: Debug, C> Debug for Tree<K, V, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V, C> std::ops::Index<&K> for Tree<K, V, C>
where
    C: Comparator<K>,
{
    type Output = V;

    /// Returns a reference to the value corresponding to the supplied key.
    ///
    /// Panics if the key is not present in the `Tree`.
    fn index(&self, key: &K) -> &V {
        self.get(key).expect("no entry found for key")
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for Tree<K, V, Natural> {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Tree::from_iter_with(DEFAULT_ORDER, Natural, iter)
    }
}

impl<K: Ord, V, const N: usize> From<[(K, V); N]> for Tree<K, V, Natural> {
    fn from(arr: [(K, V); N]) -> Self {
        Tree::from_iter_with(DEFAULT_ORDER, Natural, arr)
    }
}

impl<K, V, C> Extend<(K, V)> for Tree<K, V, C>
where
    C: Comparator<K>,
{
    fn extend<T>(&mut self, iter: T)
    where
        T: IntoIterator<Item = (K, V)>,
    {
        for (k, v) in iter {
            self.put(k, v);
        }
    }
}

impl<'a, K, V, C> Extend<(&'a K, &'a V)> for Tree<K, V, C>
where
    K: Copy,
    V: Copy,
    C: Comparator<K>,
{
    fn extend<I>(&mut self, iter: I)
    where
        I: IntoIterator<Item = (&'a K, &'a V)>,
    {
        for (&k, &v) in iter {
            self.put(k, v);
        }
    }
}

use crate::{
    arena::{Arena, NodeId},
    compare::{search, Comparator, Natural},
    error::{Error, Result},
    node::{Node, NodeRef},
    source::OrderedSource,
    DEFAULT_ORDER,
};
use std::{
    cmp::Ordering,
    fmt,
    fmt::Debug,
    sync::atomic::{AtomicU64, Ordering as AtomicOrdering},
};
use tracing::{debug, trace};
