//! Serialization of a [`Tree`] as a flat map. The node structure is not preserved: decoding
//! rebuilds the tree by repeated [`Tree::put`], so only the key-value content round-trips.

use crate::{Comparator, Tree, DEFAULT_ORDER};
use ::serde::{
    de::{DeserializeSeed, MapAccess, Visitor},
    ser::SerializeMap,
    Deserialize, Deserializer, Serialize, Serializer,
};
use std::{fmt, marker::PhantomData};
use tracing::debug;

impl<K, V, C> Serialize for Tree<K, V, C>
where
    K: Serialize,
    V: Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (k, v) in self {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// Reads a serialized map into a list of pairs.
struct PairsVisitor<K, V> {
    marker: PhantomData<fn() -> Vec<(K, V)>>,
}

impl<K, V> PairsVisitor<K, V> {
    fn new() -> Self {
        PairsVisitor {
            marker: PhantomData,
        }
    }
}

impl<'de, K, V> Visitor<'de> for PairsVisitor<K, V>
where
    K: Deserialize<'de>,
    V: Deserialize<'de>,
{
    type Value = Vec<(K, V)>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a map")
    }

    fn visit_map<M>(self, mut access: M) -> Result<Self::Value, M::Error>
    where
        M: MapAccess<'de>,
    {
        let mut pairs = Vec::with_capacity(access.size_hint().unwrap_or(0).min(4096));
        while let Some(kv) = access.next_entry()? {
            pairs.push(kv);
        }
        Ok(pairs)
    }
}

/// Decoding into an existing tree replaces its contents, keeping its order and comparator.
/// The whole map is read before the tree is touched, so a decoding error leaves it unchanged.
///
/// ```
/// use serde::de::DeserializeSeed;
/// use mway_btree::{Natural, Tree};
/// let mut tree = Tree::new(4, Natural);
/// tree.put("stale".to_string(), 0);
/// let mut de = serde_json::Deserializer::from_str(r#"{"b":2,"a":1}"#);
/// (&mut tree).deserialize(&mut de).unwrap();
/// assert_eq!(tree.order(), 4);
/// assert_eq!(tree.keys().collect::<Vec<_>>(), ["a", "b"]);
/// ```
impl<'de, K, V, C> DeserializeSeed<'de> for &mut Tree<K, V, C>
where
    K: Deserialize<'de>,
    V: Deserialize<'de>,
    C: Comparator<K>,
{
    type Value = ();

    fn deserialize<D>(self, deserializer: D) -> Result<(), D::Error>
    where
        D: Deserializer<'de>,
    {
        let pairs = deserializer.deserialize_map(PairsVisitor::new())?;
        let read = pairs.len();
        self.clear();
        self.extend(pairs);
        debug!(read, len = self.len(), "tree decoded");
        Ok(())
    }
}

/// Builds a tree of order [`DEFAULT_ORDER`] with the default comparator.
impl<'de, K, V, C> Deserialize<'de> for Tree<K, V, C>
where
    K: Deserialize<'de>,
    V: Deserialize<'de>,
    C: Comparator<K> + Default,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let mut tree = Tree::new(DEFAULT_ORDER, C::default());
        (&mut tree).deserialize(deserializer)?;
        Ok(tree)
    }
}
