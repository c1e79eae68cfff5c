use std::cmp::Ordering;

/// Total ordering over keys used by a [`Tree`](crate::Tree).
///
/// The tree treats [`Ordering::Equal`] as "same key" for both placement and upsert, so a
/// comparator that reports equality for logically distinct keys will silently collapse them.
/// A comparator that is not a strict total order leaves the tree in an unspecified (but memory
/// safe) state, which [`Tree::validate`](crate::Tree::validate) can detect.
pub trait Comparator<K: ?Sized> {
    /// Compare `a` with `b`.
    fn compare(&self, a: &K, b: &K) -> Ordering;
}

/// Comparator using the key's [`Ord`] implementation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Natural;

impl<K: Ord + ?Sized> Comparator<K> for Natural {
    #[inline]
    fn compare(&self, a: &K, b: &K) -> Ordering {
        a.cmp(b)
    }
}

impl<K: ?Sized, F> Comparator<K> for F
where
    F: Fn(&K, &K) -> Ordering,
{
    #[inline]
    fn compare(&self, a: &K, b: &K) -> Ordering {
        self(a, b)
    }
}

/// Comparator that inverts another comparator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Reversed<C>(pub C);

impl<K: ?Sized, C: Comparator<K>> Comparator<K> for Reversed<C> {
    #[inline]
    fn compare(&self, a: &K, b: &K) -> Ordering {
        self.0.compare(b, a)
    }
}

/// Binary search of sorted `pairs` for `key`.
///
/// `Ok(i)` is a hit, `Err(i)` is the insertion index, which is also the index of the child
/// to descend into.
pub(crate) fn search<K, V, C>(cmp: &C, pairs: &[(K, V)], key: &K) -> Result<usize, usize>
where
    C: Comparator<K> + ?Sized,
{
    let (mut i, mut j) = (0, pairs.len());
    while i < j {
        let m = (i + j) / 2;
        match cmp.compare(&pairs[m].0, key) {
            Ordering::Equal => {
                return Ok(m);
            }
            Ordering::Less => i = m + 1,
            Ordering::Greater => j = m,
        }
    }
    Err(i)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_hits_and_misses() {
        let pairs = [(1, ()), (3, ()), (5, ())];
        assert_eq!(search(&Natural, &pairs, &3), Ok(1));
        assert_eq!(search(&Natural, &pairs, &0), Err(0));
        assert_eq!(search(&Natural, &pairs, &4), Err(2));
        assert_eq!(search(&Natural, &pairs, &9), Err(3));
        assert_eq!(search(&Natural, &[] as &[(i32, ())], &9), Err(0));
    }

    #[test]
    fn closures_and_reversed() {
        let by_len = |a: &&str, b: &&str| a.len().cmp(&b.len());
        assert_eq!(by_len.compare(&"ab", &"c"), Ordering::Greater);
        assert_eq!(Reversed(Natural).compare(&1, &2), Ordering::Greater);
    }
}
