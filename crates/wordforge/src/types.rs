//! # Common Types

/// The token id type.
///
/// Ids are dense: a vocabulary of size `n` uses exactly the ids `0..n`.
pub type TokenId = u32;

/// A pair of adjacent symbols.
pub type Pair<T> = (T, T);

cfg_if::cfg_if! {
    if #[cfg(feature = "ahash")] {
        /// Type Alias for hash maps in this crate.
        pub type WFHashMap<K, V> = ahash::AHashMap<K, V>;

        /// Type Alias for hash sets in this crate.
        pub type WFHashSet<V> = ahash::AHashSet<V>;

    } else if #[cfg(feature = "foldhash")] {
        /// Type Alias for hash maps in this crate.
        pub type WFHashMap<K, V> = foldhash::HashMap<K, V>;

        /// Type Alias for hash sets in this crate.
        pub type WFHashSet<V> = foldhash::HashSet<V>;

    } else {
        /// Type Alias for hash maps in this crate.
        pub type WFHashMap<K, V> = std::collections::HashMap<K, V>;

        /// Type Alias for hash sets in this crate.
        pub type WFHashSet<V> = std::collections::HashSet<V>;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_aliases() {
        let mut map: WFHashMap<Pair<TokenId>, usize> = WFHashMap::default();
        map.insert((1, 2), 3);
        assert_eq!(map.get(&(1, 2)), Some(&3));

        let set: WFHashSet<TokenId> = [1, 2, 2, 3].into_iter().collect();
        assert_eq!(set.len(), 3);
    }
}
