use crate::key::{KeyCacheKey, KeySizeMap};

/// Last-known item sizes by key.
///
/// Absent keys fall back to `min_size + item_gap`. In fixed mode every key reports that
/// fallback and measurements are never stored.
#[derive(Clone, Debug)]
pub struct SizeStore<K> {
    sizes: KeySizeMap<K>,
    default_size: f64,
    fixed: bool,
}

impl<K: KeyCacheKey> SizeStore<K> {
    pub(crate) fn new(min_size: f64, item_gap: f64, fixed: bool) -> Self {
        Self {
            sizes: KeySizeMap::<K>::new(),
            default_size: min_size + item_gap,
            fixed,
        }
    }

    /// The size assumed for unmeasured items.
    pub fn default_size(&self) -> f64 {
        self.default_size
    }

    pub fn is_fixed(&self) -> bool {
        self.fixed
    }

    pub fn get(&self, key: &K) -> f64 {
        if self.fixed {
            return self.default_size;
        }
        self.sizes.get(key).copied().unwrap_or(self.default_size)
    }

    /// Whether `key` has a stored measurement.
    pub fn contains(&self, key: &K) -> bool {
        self.sizes.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }

    /// Stores `size` and returns the size previously reported for `key`.
    pub(crate) fn set(&mut self, key: K, size: f64) -> f64 {
        let prev = self.get(&key);
        if !self.fixed {
            self.sizes.insert(key, size);
        }
        prev
    }

    pub(crate) fn delete(&mut self, key: &K) -> Option<f64> {
        self.sizes.remove(key)
    }

    pub(crate) fn clear(&mut self) {
        self.sizes.clear();
    }

    pub(crate) fn retain(&mut self, mut keep: impl FnMut(&K) -> bool) {
        self.sizes.retain(|k, _| keep(k));
    }

    /// Sum of sizes for indices in `[min(a, b), max(a, b))` of `keys`.
    ///
    /// Indices past the end of `keys` count as unmeasured items.
    pub fn range_size(&self, keys: &[K], a: usize, b: usize) -> f64 {
        let (start, end) = if a <= b { (a, b) } else { (b, a) };
        if self.fixed {
            return (end - start) as f64 * self.default_size;
        }
        let len = keys.len();
        let mut sum = 0.0;
        if start < len {
            for key in &keys[start..end.min(len)] {
                sum += self.get(key);
            }
        }
        let beyond = end.saturating_sub(start.max(len));
        sum + beyond as f64 * self.default_size
    }

    pub fn total_size(&self, keys: &[K]) -> f64 {
        self.range_size(keys, 0, keys.len())
    }
}
