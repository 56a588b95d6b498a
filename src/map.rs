use core::{borrow::Borrow, cmp::Ordering, fmt};

use crate::{AvlTree, Compare};

/// An ordered map based on an [AVL tree].
///
/// Inserting a key that is already present replaces its value in place.
///
/// [AVL tree]: https://en.wikipedia.org/wiki/AVL_tree
pub struct AvlMap<K: Ord, V> {
    tree: AvlTree<MapEntry<K, V>, ByKey>,
}

struct MapEntry<K, V> {
    key: K,
    value: V,
}

/// Orders map entries by key alone.
#[derive(Copy, Clone, Debug, Default)]
struct ByKey;

impl<K: Ord, V> Compare<MapEntry<K, V>> for ByKey {
    fn compare(&self, a: &MapEntry<K, V>, b: &MapEntry<K, V>) -> Ordering {
        a.key.cmp(&b.key)
    }
}

impl<K: Ord, V> AvlMap<K, V> {
    /// Creates a new, empty `AvlMap`.
    pub const fn new() -> Self {
        Self {
            tree: AvlTree::with_comparator(ByKey),
        }
    }

    /// Returns `true` if no keys are stored.
    pub const fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Returns the number of stored keys.
    pub const fn len(&self) -> usize {
        self.tree.len()
    }

    /// Inserts a key-value pair, returning the value previously associated with `key`.
    ///
    /// The stored key is not replaced when `key` is already present.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        match self.find(&key) {
            Some(entry) => Some(core::mem::replace(entry, value)),
            None => {
                self.tree.insert(MapEntry { key, value });
                None
            }
        }
    }

    fn find<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let node = self.tree.find_by(|e| key.cmp(e.key.borrow()))?;
        Some(&mut self.tree.item_mut(node).value)
    }

    /// Returns `true` if `key` is stored.
    #[inline]
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.tree.find_by(|e| key.cmp(e.key.borrow())).is_some()
    }

    /// Looks up the value stored under `key`.
    #[inline]
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.tree
            .get_by(|e| key.cmp(e.key.borrow()))
            .map(|e| &e.value)
    }

    /// Looks up the value stored under `key` for modification.
    #[inline]
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find(key)
    }

    /// Returns the entry with the smallest key.
    #[inline]
    pub fn first_key_value(&self) -> Option<(&K, &V)> {
        self.tree.first().map(|e| (&e.key, &e.value))
    }

    /// Removes the entry with the smallest key.
    #[inline]
    pub fn pop_first(&mut self) -> Option<(K, V)> {
        self.tree.pop_first().map(|e| (e.key, e.value))
    }

    /// Returns the entry with the largest key.
    #[inline]
    pub fn last_key_value(&self) -> Option<(&K, &V)> {
        self.tree.last().map(|e| (&e.key, &e.value))
    }

    /// Removes the entry with the largest key.
    #[inline]
    pub fn pop_last(&mut self) -> Option<(K, V)> {
        self.tree.pop_last().map(|e| (e.key, e.value))
    }

    /// Removes `key`, returning the value it held.
    #[inline]
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.tree
            .erase_by(|e| key.cmp(e.key.borrow()))
            .map(|e| e.value)
    }

    /// Returns an iterator over the key-value pairs of the map, in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> + '_ {
        self.tree.iter().map(|e| (&e.key, &e.value))
    }

    /// Removes every entry.
    #[inline]
    pub fn clear(&mut self) {
        self.tree.clear();
    }
}

impl<K: Ord, V> Default for AvlMap<K, V> {
    fn default() -> Self {
        AvlMap::new()
    }
}

impl<K: Ord + fmt::Debug, V: fmt::Debug> fmt::Debug for AvlMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for AvlMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = AvlMap::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_overwrites_value() {
        let mut map = AvlMap::new();

        assert_eq!(map.insert("b", 1), None);
        assert_eq!(map.insert("a", 2), None);
        assert_eq!(map.insert("b", 3), Some(1));

        assert_eq!(map.len(), 2);
        assert_eq!(map.get("b"), Some(&3));
        assert_eq!(map.iter().collect::<Vec<_>>(), [(&"a", &2), (&"b", &3)]);
        map.tree.assert_invariants();
    }

    #[test]
    fn borrowed_lookups() {
        let mut map: AvlMap<String, usize> = ["one", "two", "three", "four"]
            .into_iter()
            .map(|s| (s.to_owned(), s.len()))
            .collect();

        assert!(map.contains_key("three"));
        assert!(!map.contains_key("five"));

        *map.get_mut("two").unwrap() += 10;
        assert_eq!(map.get("two"), Some(&13));

        assert_eq!(map.remove("one"), Some(3));
        assert_eq!(map.remove("one"), None);
        assert_eq!(map.len(), 3);
        map.tree.assert_invariants();
    }

    #[test]
    fn first_and_last() {
        let mut map: AvlMap<u32, char> = (0..26).map(|i| (i, (b'a' + i as u8) as char)).collect();

        assert_eq!(map.first_key_value(), Some((&0, &'a')));
        assert_eq!(map.last_key_value(), Some((&25, &'z')));
        assert_eq!(map.pop_first(), Some((0, 'a')));
        assert_eq!(map.pop_last(), Some((25, 'z')));
        assert_eq!(map.len(), 24);
        map.tree.assert_invariants();

        map.clear();
        assert!(map.is_empty());
        assert_eq!(map.pop_first(), None);
    }
}
