#![deny(missing_docs)]

//! This crate implements an order-m [Tree] (B-tree) mapping keys to values under a runtime
//! [Comparator], with a positional cursor, [OrderedIter], that knows its ordinal position.
//!
//! The order is the maximum number of children per node and is chosen when the tree is
//! constructed, so the same code can build shallow wide trees or the tiny order-3 trees that
//! make every split and merge visible.
//!
//! # Example
//!
//! ```
//!     use mway_btree::{Natural, Tree};
//!     let mut capitals = Tree::new(3, Natural);
//!     capitals.put("England", "London");
//!     capitals.put("France", "Paris");
//!     capitals.put("Spain", "Madrid");
//!     println!("The capital of France is {}", capitals[&"France"]);
//!
//!     let mut it = capitals.ordered_begin();
//!     while it.next() {
//!         println!("#{} {}: {:?}", it.index(), it.key().unwrap(), it.get());
//!     }
//!     assert!(it.is_end());
//! ```
//!
//!# Features
//!
//! This crate supports the following cargo features:
//! - `serde` : enables serialisation of [Tree] via serde crate.
//! - `unsafe-optim` : uses unsafe code for extra optimisation.

mod arena;
mod compare;
mod dump;
mod error;
mod iter;
mod node;
mod source;
mod tree;

#[cfg(feature = "serde")]
mod serde;

pub use arena::NodeId;
pub use compare::{Comparator, Natural, Reversed};
pub use error::{Error, Result};
pub use iter::{Checkpoint, Iter, Keys, OrderedIter, OrderedIterMut, Values};
pub use node::NodeRef;
pub use source::{IterSource, OrderedSource};
pub use tree::Tree;

/// Order used by [Tree::default], [Tree::with_comparator] and [FromIterator].
pub const DEFAULT_ORDER: usize = 32;

// Tests.

/* mimalloc cannot be used with miri */
#[cfg(all(test, not(miri)))]
use mimalloc::MiMalloc;

#[cfg(all(test, not(miri)))]
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;
