//! Positional ordered iteration.
//!
//! An [`OrderedIter`] is a bidirectional cursor with an ordinal position in `-1..=len`:
//! `-1` is the Begin sentinel (before the first entry), `len` the End sentinel (after the last),
//! and everything in between is a valid position. It navigates purely through the tree's
//! structure (child and parent links) and keeps the ordinal up to date as it moves, so the
//! distance between two cursors is a subtraction.
//!
//! [`OrderedIterMut`] adds in-place value updates. Neither ever changes the shape of the tree.
//!
//! A cursor borrows its tree, so the tree cannot change under it. To keep a position across
//! mutations, detach it with `checkpoint` and later [`Tree::resume`], which reports
//! [`Error::Invalidated`] if the tree's structure changed in between.

use crate::{
    arena::NodeId,
    compare::{Comparator, Natural},
    error::{Error, Result},
    node::NodeRef,
    source::OrderedSource,
    Tree,
};
use std::{cmp::Ordering, fmt, iter::FusedIterator};
use tracing::debug;

/// Structural position of a cursor: node, entry offset inside it, and ordinal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Position {
    node: Option<NodeId>,
    entry: usize,
    index: isize,
}

impl Position {
    const BEGIN: Position = Position {
        node: None,
        entry: 0,
        index: -1,
    };

    fn end(len: usize) -> Self {
        Self {
            node: None,
            entry: 0,
            index: len as isize,
        }
    }

    fn is_begin(&self) -> bool {
        self.index <= -1
    }

    fn is_end(&self, len: usize) -> bool {
        len == 0 || self.index >= len as isize
    }

    fn is_valid(&self, len: usize) -> bool {
        len > 0 && !self.is_begin() && !self.is_end(len)
    }

    /// Current node and entry, `None` at a sentinel.
    fn at(&self, len: usize) -> Option<(NodeId, usize)> {
        if self.is_valid(len) {
            self.node.map(|n| (n, self.entry))
        } else {
            None
        }
    }
}

// Structural navigation.
impl<K, V, C> Tree<K, V, C> {
    /// In-order successor of entry `e` of node `id`.
    fn successor(&self, id: NodeId, e: usize) -> Option<(NodeId, usize)> {
        let node = self.node(id);
        if let Some(&c) = node.children.get(e + 1) {
            return Some((self.leftmost_leaf(c), 0));
        }
        if e + 1 < node.pairs.len() {
            return Some((id, e + 1));
        }
        // Climb until an ancestor has an entry right of the branch we came up.
        let mut child = id;
        let mut up = node.parent;
        while let Some(p) = up {
            let pn = self.node(p);
            let branch = branch_index(&pn.children, child);
            if branch < pn.pairs.len() {
                return Some((p, branch));
            }
            child = p;
            up = pn.parent;
        }
        None
    }

    /// In-order predecessor of entry `e` of node `id`.
    fn predecessor(&self, id: NodeId, e: usize) -> Option<(NodeId, usize)> {
        let node = self.node(id);
        if let Some(&c) = node.children.get(e) {
            let leaf = self.rightmost_leaf(c);
            return Some((leaf, self.node(leaf).pairs.len() - 1));
        }
        if e > 0 {
            return Some((id, e - 1));
        }
        let mut child = id;
        let mut up = node.parent;
        while let Some(p) = up {
            let pn = self.node(p);
            let branch = branch_index(&pn.children, child);
            if branch > 0 {
                return Some((p, branch - 1));
            }
            child = p;
            up = pn.parent;
        }
        None
    }

    /// Advance `pos` one entry, returns false (leaving `pos` at End) if there is none.
    fn step_next(&self, pos: &mut Position) -> bool {
        let len = self.len();
        if pos.is_end(len) {
            *pos = Position::end(len);
            return false;
        }
        let next = if pos.is_begin() {
            self.root_id().map(|r| (self.leftmost_leaf(r), 0))
        } else {
            pos.node.and_then(|n| self.successor(n, pos.entry))
        };
        match next {
            Some((node, entry)) => {
                pos.node = Some(node);
                pos.entry = entry;
                pos.index = (pos.index + 1).min(len as isize);
                true
            }
            None => {
                *pos = Position::end(len);
                false
            }
        }
    }

    /// Move `pos` back one entry, returns false (leaving `pos` at Begin) if there is none.
    fn step_prev(&self, pos: &mut Position) -> bool {
        let len = self.len();
        if pos.is_begin() || len == 0 {
            *pos = Position::BEGIN;
            return false;
        }
        let prev = if pos.is_end(len) {
            self.root_id().map(|r| {
                let leaf = self.rightmost_leaf(r);
                (leaf, self.node(leaf).pairs.len() - 1)
            })
        } else {
            pos.node.and_then(|n| self.predecessor(n, pos.entry))
        };
        match prev {
            Some((node, entry)) => {
                pos.node = Some(node);
                pos.entry = entry;
                pos.index = (pos.index.min(len as isize) - 1).max(-1);
                true
            }
            None => {
                *pos = Position::BEGIN;
                false
            }
        }
    }

    fn step_by(&self, pos: &mut Position, n: isize) -> bool {
        match n.cmp(&0) {
            Ordering::Greater => (0..n).all(|_| self.step_next(pos)),
            Ordering::Less => (n..0).all(|_| self.step_prev(pos)),
            Ordering::Equal => pos.is_valid(self.len()),
        }
    }

    /// Position at ordinal `index`, walking from whichever sentinel is nearer.
    fn position_at(&self, index: isize) -> Position {
        let len = self.len() as isize;
        if index <= -1 {
            return Position::BEGIN;
        }
        if index >= len {
            return Position::end(self.len());
        }
        let mut pos;
        if index < len - index {
            pos = Position::BEGIN;
            self.step_by(&mut pos, index + 1);
        } else {
            pos = Position::end(self.len());
            self.step_by(&mut pos, index - len);
        }
        pos
    }

    fn pair_at(&self, pos: &Position) -> Option<(&K, &V)> {
        let (node, entry) = pos.at(self.len())?;
        let (k, v) = &self.node(node).pairs[entry];
        Some((k, v))
    }

    /// Get cursor positioned at the Begin sentinel, before the first entry.
    #[must_use]
    pub fn ordered_begin(&self) -> OrderedIter<'_, K, V, C> {
        OrderedIter {
            tree: self,
            pos: Position::BEGIN,
        }
    }

    /// Get cursor positioned at the End sentinel, after the last entry.
    #[must_use]
    pub fn ordered_end(&self) -> OrderedIter<'_, K, V, C> {
        OrderedIter {
            tree: self,
            pos: Position::end(self.len()),
        }
    }

    /// Get cursor positioned at the first entry (at End if the tree is empty).
    #[must_use]
    pub fn ordered_first(&self) -> OrderedIter<'_, K, V, C> {
        self.ordered_at(0)
    }

    /// Get cursor positioned at the last entry (at Begin if the tree is empty).
    #[must_use]
    pub fn ordered_last(&self) -> OrderedIter<'_, K, V, C> {
        let mut it = self.ordered_end();
        it.previous();
        it
    }

    /// Get cursor at ordinal `index`, clamped to the sentinels.
    #[must_use]
    pub fn ordered_at(&self, index: isize) -> OrderedIter<'_, K, V, C> {
        OrderedIter {
            tree: self,
            pos: self.position_at(index),
        }
    }

    /// Get mutable cursor positioned at the Begin sentinel.
    pub fn ordered_begin_mut(&mut self) -> OrderedIterMut<'_, K, V, C> {
        OrderedIterMut {
            pos: Position::BEGIN,
            tree: self,
        }
    }

    /// Get mutable cursor positioned at the End sentinel.
    pub fn ordered_end_mut(&mut self) -> OrderedIterMut<'_, K, V, C> {
        OrderedIterMut {
            pos: Position::end(self.len()),
            tree: self,
        }
    }

    /// Get mutable cursor positioned at the first entry.
    pub fn ordered_first_mut(&mut self) -> OrderedIterMut<'_, K, V, C> {
        self.ordered_at_mut(0)
    }

    /// Get mutable cursor positioned at the last entry.
    pub fn ordered_last_mut(&mut self) -> OrderedIterMut<'_, K, V, C> {
        let mut it = self.ordered_end_mut();
        it.previous();
        it
    }

    /// Get mutable cursor at ordinal `index`, clamped to the sentinels.
    pub fn ordered_at_mut(&mut self, index: isize) -> OrderedIterMut<'_, K, V, C> {
        OrderedIterMut {
            pos: self.position_at(index),
            tree: self,
        }
    }

    fn check_checkpoint(&self, cp: &Checkpoint) -> Result<Position> {
        if cp.tree != self.tree_id() {
            debug!(checkpoint = cp.tree, tree = self.tree_id(), "checkpoint from another tree");
            return Err(Error::ForeignTree);
        }
        if cp.stamp != self.stamp() {
            debug!(captured = cp.stamp, current = self.stamp(), "stale checkpoint");
            return Err(Error::Invalidated {
                captured: cp.stamp,
                current: self.stamp(),
            });
        }
        if let Some(node) = cp.pos.node {
            debug_assert!(self.is_live(node));
        }
        Ok(cp.pos)
    }

    /// Re-attach a detached cursor.
    ///
    /// Fails with [`Error::Invalidated`] if a key was inserted or removed (or the tree cleared)
    /// since the checkpoint was taken, and with [`Error::ForeignTree`] if it came from another tree.
    /// Value updates do not invalidate checkpoints.
    pub fn resume(&self, cp: &Checkpoint) -> Result<OrderedIter<'_, K, V, C>> {
        let pos = self.check_checkpoint(cp)?;
        Ok(OrderedIter { tree: self, pos })
    }

    /// Re-attach a detached cursor for mutation, see [`Tree::resume`].
    pub fn resume_mut(&mut self, cp: &Checkpoint) -> Result<OrderedIterMut<'_, K, V, C>> {
        let pos = self.check_checkpoint(cp)?;
        Ok(OrderedIterMut { tree: self, pos })
    }

    /// Get iterator of references to key-value pairs.
    #[must_use]
    pub fn iter(&self) -> Iter<'_, K, V, C> {
        Iter {
            tree: self,
            front: Position::BEGIN,
            back: Position::end(self.len()),
            remaining: self.len(),
        }
    }

    /// Get iterator of references to keys, in ascending order.
    #[must_use]
    pub fn keys(&self) -> Keys<'_, K, V, C> {
        Keys(self.iter())
    }

    /// Get iterator of references to values, in key order.
    #[must_use]
    pub fn values(&self) -> Values<'_, K, V, C> {
        Values(self.iter())
    }
}

impl<K, V, C> Tree<K, V, C>
where
    C: Comparator<K>,
{
    /// Get cursor positioned at `key`, `None` if the key is absent.
    pub fn ordered_at_key(&self, key: &K) -> Option<OrderedIter<'_, K, V, C>> {
        let mut it = self.ordered_begin();
        it.move_to(key).then_some(it)
    }

    /// Get mutable cursor positioned at `key`, `None` if the key is absent.
    pub fn ordered_at_key_mut(&mut self, key: &K) -> Option<OrderedIterMut<'_, K, V, C>> {
        let mut it = self.ordered_begin_mut();
        it.move_to(key).then_some(it)
    }

    /// Walk `pos` to `key`, forwards or backwards depending on where it is now.
    /// An absent key leaves `pos` at the sentinel in the direction of travel.
    fn seek(&self, pos: &mut Position, key: &K) -> bool {
        let forward = match self.pair_at(pos) {
            Some((k, _)) => match self.comparator().compare(k, key) {
                Ordering::Equal => return true,
                Ordering::Less => true,
                Ordering::Greater => false,
            },
            None => pos.is_begin(),
        };
        // An absent key walks off the end, so go straight to the sentinel the walk would reach.
        if !self.contains_key(key) {
            *pos = if forward {
                Position::end(self.len())
            } else {
                Position::BEGIN
            };
            return false;
        }
        loop {
            let moved = if forward {
                self.step_next(pos)
            } else {
                self.step_prev(pos)
            };
            if !moved {
                return false;
            }
            if let Some((k, _)) = self.pair_at(pos) {
                if self.comparator().compare(k, key) == Ordering::Equal {
                    return true;
                }
            }
        }
    }
}

/// Detached cursor position, see [`OrderedIter::checkpoint`] and [`Tree::resume`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Checkpoint {
    tree: u64,
    stamp: u64,
    pos: Position,
}

impl Checkpoint {
    /// Ordinal position captured.
    #[must_use]
    pub fn index(&self) -> isize {
        self.pos.index
    }
}

/// Cursor over a [`Tree`], returned by [`Tree::ordered_begin`], [`Tree::ordered_end`] and friends.
pub struct OrderedIter<'a, K, V, C = Natural> {
    tree: &'a Tree<K, V, C>,
    pos: Position,
}

impl<K, V, C> Clone for OrderedIter<'_, K, V, C> {
    fn clone(&self) -> Self {
        Self {
            tree: self.tree,
            pos: self.pos,
        }
    }
}

impl<'a, K, V, C> OrderedIter<'a, K, V, C> {
    /// Move to the next entry, returns false (and moves to End) if there is none.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> bool {
        self.tree.step_next(&mut self.pos)
    }

    /// Move to the previous entry, returns false (and moves to Begin) if there is none.
    pub fn previous(&mut self) -> bool {
        self.tree.step_prev(&mut self.pos)
    }

    /// Call [`next`](Self::next) `n` times, stopping at End. True if the cursor is left valid.
    pub fn next_n(&mut self, n: usize) -> bool {
        self.move_by(n as isize)
    }

    /// Call [`previous`](Self::previous) `n` times, stopping at Begin. True if the cursor is left valid.
    pub fn previous_n(&mut self, n: usize) -> bool {
        self.move_by(-(n as isize))
    }

    /// Move `n` entries forwards (or backwards if negative), stopping early at a sentinel.
    /// True if the cursor is left valid.
    pub fn move_by(&mut self, n: isize) -> bool {
        self.tree.step_by(&mut self.pos, n)
    }

    /// Ordinal position: `-1` at Begin, `len` at End.
    #[must_use]
    pub fn index(&self) -> isize {
        self.pos.index
    }

    /// Number of entries in the tree.
    #[must_use]
    pub fn size(&self) -> usize {
        self.tree.len()
    }

    /// Is the cursor at the Begin sentinel?
    #[must_use]
    pub fn is_begin(&self) -> bool {
        self.pos.is_begin()
    }

    /// Is the cursor at the End sentinel? Always true for an empty tree.
    #[must_use]
    pub fn is_end(&self) -> bool {
        self.pos.is_end(self.tree.len())
    }

    /// Is the cursor at the first entry?
    #[must_use]
    pub fn is_first(&self) -> bool {
        self.is_valid() && self.pos.index == 0
    }

    /// Is the cursor at the last entry?
    #[must_use]
    pub fn is_last(&self) -> bool {
        self.is_valid() && self.pos.index == self.tree.len() as isize - 1
    }

    /// Is the cursor at an entry (not a sentinel)?
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.pos.is_valid(self.tree.len())
    }

    /// Key and value at the cursor.
    #[must_use]
    pub fn entry(&self) -> Option<(&'a K, &'a V)> {
        self.tree.pair_at(&self.pos)
    }

    /// Key at the cursor.
    #[must_use]
    pub fn key(&self) -> Option<&'a K> {
        self.entry().map(|(k, _)| k)
    }

    /// Value at the cursor.
    #[must_use]
    pub fn get(&self) -> Option<&'a V> {
        self.entry().map(|(_, v)| v)
    }

    /// Node holding the current entry.
    #[must_use]
    pub fn node(&self) -> Option<NodeRef<'a, K, V>> {
        let (node, _) = self.pos.at(self.tree.len())?;
        Some(self.tree.node_ref(node))
    }

    /// Signed number of steps from `other` to `self`.
    pub fn distance_to(&self, other: &Self) -> Result<isize> {
        if !std::ptr::eq(self.tree, other.tree) {
            return Err(Error::ForeignTree);
        }
        Ok(self.pos.index - other.pos.index)
    }

    /// Is `self` strictly before `other`? False for cursors of different trees.
    #[must_use]
    pub fn is_before(&self, other: &Self) -> bool {
        self.partial_cmp(other) == Some(Ordering::Less)
    }

    /// Is `self` strictly after `other`? False for cursors of different trees.
    #[must_use]
    pub fn is_after(&self, other: &Self) -> bool {
        self.partial_cmp(other) == Some(Ordering::Greater)
    }

    /// Detach the position so it can outlive the borrow, see [`Tree::resume`].
    #[must_use]
    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            tree: self.tree.tree_id(),
            stamp: self.tree.stamp(),
            pos: self.pos,
        }
    }
}

impl<'a, K, V, C> OrderedIter<'a, K, V, C>
where
    C: Comparator<K>,
{
    /// Walk to `key`. Returns false if the key is absent, leaving the cursor at End when it was
    /// walking forwards and at Begin when it was walking backwards.
    ///
    /// The walk is linear in the distance travelled, as the ordinal has to be kept.
    pub fn move_to(&mut self, key: &K) -> bool {
        self.tree.seek(&mut self.pos, key)
    }

    /// Look up `key` in the tree, independent of the cursor position.
    pub fn get_at(&self, key: &K) -> Option<&'a V> {
        self.tree.get(key)
    }
}

impl<K, V, C> PartialEq for OrderedIter<'_, K, V, C> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.pos.index == other.pos.index
    }
}

impl<K, V, C> PartialOrd for OrderedIter<'_, K, V, C> {
    /// Cursors compare by ordinal; cursors of different trees are unordered.
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if std::ptr::eq(self.tree, other.tree) {
            Some(self.pos.index.cmp(&other.pos.index))
        } else {
            None
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug, C> fmt::Debug for OrderedIter<'_, K, V, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrderedIter")
            .field("index", &self.pos.index)
            .field("entry", &self.entry())
            .finish()
    }
}

impl<K: Clone, V: Clone, C> OrderedSource for OrderedIter<'_, K, V, C> {
    type Key = K;
    type Value = V;

    fn advance(&mut self) -> bool {
        self.next()
    }

    fn current(&mut self) -> Option<(K, V)> {
        self.entry().map(|(k, v)| (k.clone(), v.clone()))
    }
}

/// Cursor that can update values in place, returned by [`Tree::ordered_begin_mut`] and friends.
pub struct OrderedIterMut<'a, K, V, C = Natural> {
    tree: &'a mut Tree<K, V, C>,
    pos: Position,
}

impl<K, V, C> OrderedIterMut<'_, K, V, C> {
    /// Move to the next entry, returns false (and moves to End) if there is none.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> bool {
        self.tree.step_next(&mut self.pos)
    }

    /// Move to the previous entry, returns false (and moves to Begin) if there is none.
    pub fn previous(&mut self) -> bool {
        self.tree.step_prev(&mut self.pos)
    }

    /// Call [`next`](Self::next) `n` times, stopping at End. True if the cursor is left valid.
    pub fn next_n(&mut self, n: usize) -> bool {
        self.move_by(n as isize)
    }

    /// Call [`previous`](Self::previous) `n` times, stopping at Begin. True if the cursor is left valid.
    pub fn previous_n(&mut self, n: usize) -> bool {
        self.move_by(-(n as isize))
    }

    /// Move `n` entries forwards (or backwards if negative), stopping early at a sentinel.
    pub fn move_by(&mut self, n: isize) -> bool {
        self.tree.step_by(&mut self.pos, n)
    }

    /// Ordinal position: `-1` at Begin, `len` at End.
    #[must_use]
    pub fn index(&self) -> isize {
        self.pos.index
    }

    /// Is the cursor at an entry (not a sentinel)?
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.pos.is_valid(self.tree.len())
    }

    /// Key and value at the cursor.
    #[must_use]
    pub fn entry(&self) -> Option<(&K, &V)> {
        self.tree.pair_at(&self.pos)
    }

    /// Key at the cursor.
    #[must_use]
    pub fn key(&self) -> Option<&K> {
        self.entry().map(|(k, _)| k)
    }

    /// Value at the cursor.
    #[must_use]
    pub fn get(&self) -> Option<&V> {
        self.entry().map(|(_, v)| v)
    }

    /// Mutable reference to the value at the cursor.
    pub fn get_mut(&mut self) -> Option<&mut V> {
        let (node, entry) = self.pos.at(self.tree.len())?;
        Some(&mut self.tree.node_mut(node).pairs[entry].1)
    }

    /// Overwrite the value at the cursor, false (value dropped) at a sentinel.
    pub fn set(&mut self, value: V) -> bool {
        match self.get_mut() {
            Some(v) => {
                *v = value;
                true
            }
            None => false,
        }
    }

    /// Returns a read-only cursor at the same position.
    #[must_use]
    pub fn as_iter(&self) -> OrderedIter<'_, K, V, C> {
        OrderedIter {
            tree: &*self.tree,
            pos: self.pos,
        }
    }

    /// Detach the position so it can outlive the borrow, see [`Tree::resume_mut`].
    #[must_use]
    pub fn checkpoint(&self) -> Checkpoint {
        self.as_iter().checkpoint()
    }
}

impl<K, V, C> OrderedIterMut<'_, K, V, C>
where
    C: Comparator<K>,
{
    /// Walk to `key`. Returns false if the key is absent, leaving the cursor at the sentinel
    /// in the direction of travel.
    pub fn move_to(&mut self, key: &K) -> bool {
        self.tree.seek(&mut self.pos, key)
    }
}

impl<K: fmt::Debug, V: fmt::Debug, C> fmt::Debug for OrderedIterMut<'_, K, V, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrderedIterMut")
            .field("index", &self.pos.index)
            .field("entry", &self.entry())
            .finish()
    }
}

/// Iterator returned by [`Tree::iter`].
pub struct Iter<'a, K, V, C = Natural> {
    tree: &'a Tree<K, V, C>,
    front: Position,
    back: Position,
    remaining: usize,
}

impl<K, V, C> Clone for Iter<'_, K, V, C> {
    fn clone(&self) -> Self {
        Self {
            tree: self.tree,
            front: self.front,
            back: self.back,
            remaining: self.remaining,
        }
    }
}

impl<'a, K, V, C> Iterator for Iter<'a, K, V, C> {
    type Item = (&'a K, &'a V);
    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        self.tree.step_next(&mut self.front);
        self.tree.pair_at(&self.front)
    }
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}
impl<K, V, C> ExactSizeIterator for Iter<'_, K, V, C> {
    fn len(&self) -> usize {
        self.remaining
    }
}
impl<K, V, C> DoubleEndedIterator for Iter<'_, K, V, C> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        self.tree.step_prev(&mut self.back);
        self.tree.pair_at(&self.back)
    }
}
impl<K, V, C> FusedIterator for Iter<'_, K, V, C> {}

impl<'a, K, V, C> IntoIterator for &'a Tree<K, V, C> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V, C>;
    fn into_iter(self) -> Iter<'a, K, V, C> {
        self.iter()
    }
}

/// Iterator returned by [`Tree::keys`].
pub struct Keys<'a, K, V, C = Natural>(Iter<'a, K, V, C>);
impl<'a, K, V, C> Iterator for Keys<'a, K, V, C> {
    type Item = &'a K;
    fn next(&mut self) -> Option<Self::Item> {
        Some(self.0.next()?.0)
    }
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}
impl<K, V, C> DoubleEndedIterator for Keys<'_, K, V, C> {
    fn next_back(&mut self) -> Option<Self::Item> {
        Some(self.0.next_back()?.0)
    }
}
impl<K, V, C> ExactSizeIterator for Keys<'_, K, V, C> {
    fn len(&self) -> usize {
        self.0.len()
    }
}
impl<K, V, C> FusedIterator for Keys<'_, K, V, C> {}

/// Iterator returned by [`Tree::values`].
pub struct Values<'a, K, V, C = Natural>(Iter<'a, K, V, C>);
impl<'a, K, V, C> Iterator for Values<'a, K, V, C> {
    type Item = &'a V;
    fn next(&mut self) -> Option<Self::Item> {
        Some(self.0.next()?.1)
    }
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}
impl<K, V, C> DoubleEndedIterator for Values<'_, K, V, C> {
    fn next_back(&mut self) -> Option<Self::Item> {
        Some(self.0.next_back()?.1)
    }
}
impl<K, V, C> ExactSizeIterator for Values<'_, K, V, C> {
    fn len(&self) -> usize {
        self.0.len()
    }
}
impl<K, V, C> FusedIterator for Values<'_, K, V, C> {}

fn branch_index(children: &[NodeId], child: NodeId) -> usize {
    match children.iter().position(|&c| c == child) {
        Some(i) => i,
        None => unreachable!("{child:?} missing from its parent"),
    }
}
