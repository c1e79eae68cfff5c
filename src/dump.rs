use crate::{arena::NodeId, Tree};
use std::fmt;

/// Indented dump of the tree's shape.
///
/// A `BTree` header line, then every key in order on its own line, indented four spaces per
/// level below the root, so separators sit between the subtrees they divide.
///
/// ```
/// use mway_btree::{Natural, Tree};
/// let mut tree = Tree::new(3, Natural);
/// for k in 1..=3 {
///     tree.put(k, ());
/// }
/// assert_eq!(tree.to_string(), "BTree\n    1\n2\n    3\n");
/// ```
impl<K: fmt::Display, V, C> fmt::Display for Tree<K, V, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "BTree")?;
        match self.root_id() {
            Some(root) => self.dump(f, root, 0),
            None => Ok(()),
        }
    }
}

impl<K: fmt::Display, V, C> Tree<K, V, C> {
    fn dump(&self, f: &mut fmt::Formatter<'_>, id: NodeId, level: usize) -> fmt::Result {
        let node = self.node(id);
        for i in 0..=node.pairs.len() {
            if let Some(&c) = node.children.get(i) {
                self.dump(f, c, level + 1)?;
            }
            if let Some((k, _)) = node.pairs.get(i) {
                writeln!(f, "{:indent$}{k}", "", indent = level * 4)?;
            }
        }
        Ok(())
    }
}
