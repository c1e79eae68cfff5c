//! Error types.
//!
//! Absence of a key is never an error: lookups return [`Option`] and cursor moves return `bool`.
//! [`Error`] covers misconfiguration, stale or foreign cursors, and the invariant violations
//! reported by [`Tree::validate`](crate::Tree::validate).

use crate::NodeId;
use thiserror::Error;

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, Error>;

/// All errors reported by this crate.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum Error {
    /// Order (maximum number of children) must be at least 3.
    #[error("invalid order {order}, should be at least 3")]
    InvalidOrder {
        /// The rejected order.
        order: usize,
    },

    /// A [`Checkpoint`](crate::Checkpoint) was resumed after the tree's structure changed.
    #[error("iterator invalidated: captured at stamp {captured}, tree is at stamp {current}")]
    Invalidated {
        /// Mutation stamp when the checkpoint was taken.
        captured: u64,
        /// Mutation stamp of the tree now.
        current: u64,
    },

    /// Iterator or checkpoint belongs to a different tree.
    #[error("iterator belongs to a different tree")]
    ForeignTree,

    /// Adjacent keys are not strictly ascending under the comparator.
    #[error("keys out of order in node {node:?} at entry {entry}")]
    Unordered {
        /// Offending node.
        node: NodeId,
        /// Entry index (within the node) of the second key of the bad pair.
        entry: usize,
    },

    /// A non-root node has too few or too many entries.
    #[error("node {node:?} has {len} entries, expected {min}..={max}")]
    EntryCount {
        /// Offending node.
        node: NodeId,
        /// Entries found.
        len: usize,
        /// Minimum allowed.
        min: usize,
        /// Maximum allowed.
        max: usize,
    },

    /// An internal node does not have exactly one more child than entries.
    #[error("node {node:?} has {children} children for {entries} entries")]
    ChildCount {
        /// Offending node.
        node: NodeId,
        /// Children found.
        children: usize,
        /// Entries found.
        entries: usize,
    },

    /// Leaves are not all at the same depth.
    #[error("leaf {node:?} at depth {found}, expected {expected}")]
    LeafDepth {
        /// Offending leaf.
        node: NodeId,
        /// Depth of the first leaf visited.
        expected: usize,
        /// Depth of this leaf.
        found: usize,
    },

    /// A child's parent back-reference does not point at the node owning it.
    #[error("node {node:?} has a broken parent link")]
    ParentLink {
        /// Offending node.
        node: NodeId,
    },

    /// The recorded size disagrees with the number of entries stored.
    #[error("tree records {recorded} entries but holds {counted}")]
    LenMismatch {
        /// Size counter.
        recorded: usize,
        /// Entries actually stored.
        counted: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = Error::InvalidOrder { order: 2 };
        assert_eq!(err.to_string(), "invalid order 2, should be at least 3");

        let err = Error::Invalidated {
            captured: 3,
            current: 5,
        };
        assert_eq!(
            err.to_string(),
            "iterator invalidated: captured at stamp 3, tree is at stamp 5"
        );

        let err = Error::LenMismatch {
            recorded: 4,
            counted: 3,
        };
        assert_eq!(err.to_string(), "tree records 4 entries but holds 3");
    }
}
