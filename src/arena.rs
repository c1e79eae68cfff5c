use std::fmt;

/// In debug mode or feature unsafe-optim not enabled, same as assert! otherwise does nothing.
#[cfg(any(debug_assertions, not(feature = "unsafe-optim")))]
macro_rules! safe_assert {
    ( $cond: expr ) => {
        assert!($cond)
    };
}

/// In debug mode or feature unsafe-optim not enabled, same as assert! otherwise does nothing.
#[cfg(all(not(debug_assertions), feature = "unsafe-optim"))]
macro_rules! safe_assert {
    ( $cond: expr ) => {};
}

/// Stable handle of a node inside a tree's arena.
///
/// Handles are only meaningful for the tree that issued them, and a handle
/// may be reused once its node has been freed by a merge or removal.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    #[inline]
    fn ix(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Clone)]
enum Slot<T> {
    Occupied(T),
    Vacant(Option<NodeId>),
}

/// Dense store of values addressed by [`NodeId`], freed slots are chained and reused.
#[derive(Clone)]
pub(crate) struct Arena<T> {
    slots: Vec<Slot<T>>,
    free: Option<NodeId>,
    live: usize,
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Arena<T> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: None,
            live: 0,
        }
    }

    /// Number of occupied slots.
    #[inline]
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.free = None;
        self.live = 0;
    }

    pub fn insert(&mut self, value: T) -> NodeId {
        self.live += 1;
        match self.free {
            Some(id) => {
                let slot = std::mem::replace(&mut self.slots[id.ix()], Slot::Occupied(value));
                match slot {
                    Slot::Vacant(next) => self.free = next,
                    Slot::Occupied(_) => unreachable!("free list points at occupied slot"),
                }
                id
            }
            None => {
                let ix = self.slots.len();
                safe_assert!(ix < u32::MAX as usize);
                self.slots.push(Slot::Occupied(value));
                NodeId(ix as u32)
            }
        }
    }

    pub fn remove(&mut self, id: NodeId) -> T {
        let slot = std::mem::replace(&mut self.slots[id.ix()], Slot::Vacant(self.free));
        match slot {
            Slot::Occupied(value) => {
                self.free = Some(id);
                self.live -= 1;
                value
            }
            Slot::Vacant(next) => {
                // Put the chain back before reporting the misuse.
                self.slots[id.ix()] = Slot::Vacant(next);
                panic!("node {id:?} removed twice");
            }
        }
    }

    /// Is `id` a live slot?
    pub fn contains(&self, id: NodeId) -> bool {
        matches!(self.slots.get(id.ix()), Some(Slot::Occupied(_)))
    }

    /// Get reference to the value stored under `id`.
    #[inline]
    pub fn ix(&self, id: NodeId) -> &T {
        safe_assert!(id.ix() < self.slots.len());
        #[cfg(all(not(debug_assertions), feature = "unsafe-optim"))]
        let slot = unsafe { self.slots.get_unchecked(id.ix()) };
        #[cfg(any(debug_assertions, not(feature = "unsafe-optim")))]
        let slot = &self.slots[id.ix()];
        match slot {
            Slot::Occupied(value) => value,
            Slot::Vacant(_) => vacant(id),
        }
    }

    /// Get mutable reference to the value stored under `id`.
    #[inline]
    pub fn ixm(&mut self, id: NodeId) -> &mut T {
        safe_assert!(id.ix() < self.slots.len());
        #[cfg(all(not(debug_assertions), feature = "unsafe-optim"))]
        let slot = unsafe { self.slots.get_unchecked_mut(id.ix()) };
        #[cfg(any(debug_assertions, not(feature = "unsafe-optim")))]
        let slot = &mut self.slots[id.ix()];
        match slot {
            Slot::Occupied(value) => value,
            Slot::Vacant(_) => vacant(id),
        }
    }
}

#[cold]
#[inline(never)]
#[cfg(any(debug_assertions, not(feature = "unsafe-optim")))]
fn vacant(id: NodeId) -> ! {
    panic!("node {id:?} is not live")
}

#[inline]
#[cfg(all(not(debug_assertions), feature = "unsafe-optim"))]
fn vacant(_id: NodeId) -> ! {
    unsafe { std::hint::unreachable_unchecked() }
}

impl<T> fmt::Debug for Arena<T>
where
    T: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let live = self.slots.iter().enumerate().filter_map(|(i, s)| match s {
            Slot::Occupied(v) => Some((NodeId(i as u32), v)),
            Slot::Vacant(_) => None,
        });
        f.debug_map().entries(live).finish()
    }
}
