use std::collections::HashMap;

pub(crate) type KeySizeMap<K> = HashMap<K, f64>;
pub(crate) type KeyIndexMap<K> = HashMap<K, usize>;

/// Maps each key to its first position in `keys`.
pub(crate) fn index_keys<K: KeyCacheKey>(keys: &[K]) -> KeyIndexMap<K> {
    let mut map = KeyIndexMap::<K>::with_capacity(keys.len());
    for (index, key) in keys.iter().enumerate() {
        map.entry(key.clone()).or_insert(index);
    }
    map
}

/// Bound for item identities: anything hashable, comparable and cheap enough to clone.
///
/// String and integer keys both qualify.
#[doc(hidden)]
pub trait KeyCacheKey: core::hash::Hash + Eq + Clone {}
impl<K: core::hash::Hash + Eq + Clone> KeyCacheKey for K {}
