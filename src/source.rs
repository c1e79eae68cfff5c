//! Pull-based sources of key-value pairs used to bulk load a [`Tree`](crate::Tree).

/// A cursor over key-value pairs that ends at a terminal sentinel.
///
/// A fresh source is positioned before its first pair. [`advance`](OrderedSource::advance) moves
/// to the next pair and returns false once the sentinel is reached; [`current`](OrderedSource::current)
/// then yields the pair under the cursor. This is the only contract
/// [`Tree::from_source`](crate::Tree::from_source) relies on, so any container
/// able to walk its contents can feed a tree.
pub trait OrderedSource {
    /// Key type produced.
    type Key;
    /// Value type produced.
    type Value;

    /// Move to the next pair, false if there is none.
    fn advance(&mut self) -> bool;

    /// Pair at the current position, `None` before the first [`advance`](OrderedSource::advance)
    /// or after the sentinel.
    fn current(&mut self) -> Option<(Self::Key, Self::Value)>;
}

/// [`OrderedSource`] over any iterator of pairs.
///
/// ```
/// use mway_btree::{IterSource, Natural, Tree};
/// let source = IterSource::new(vec![(2, "b"), (1, "a")]);
/// let tree = Tree::from_source(3, Natural, source);
/// assert_eq!(tree.keys().copied().collect::<Vec<_>>(), [1, 2]);
/// ```
#[derive(Debug)]
pub struct IterSource<I: Iterator> {
    inner: I,
    current: Option<I::Item>,
}

impl<I: Iterator> IterSource<I> {
    /// Wrap `iter`.
    pub fn new<T>(iter: T) -> Self
    where
        T: IntoIterator<IntoIter = I>,
    {
        Self {
            inner: iter.into_iter(),
            current: None,
        }
    }
}

impl<I, K, V> OrderedSource for IterSource<I>
where
    I: Iterator<Item = (K, V)>,
{
    type Key = K;
    type Value = V;

    fn advance(&mut self) -> bool {
        self.current = self.inner.next();
        self.current.is_some()
    }

    fn current(&mut self) -> Option<(K, V)> {
        self.current.take()
    }
}
