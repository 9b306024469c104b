use std::sync::Mutex;

/// Single-slot memo: remembers the value computed for the last key.
///
/// Values should be cheap to clone (`Arc<..>`). The slot stays locked while
/// `compute` runs, so `compute` must not block or await.
pub struct Memo<K, V> {
    slot: Mutex<Option<(K, V)>>,
}

impl<K, V> Memo<K, V>
where
    K: PartialEq,
    V: Clone,
{
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(None),
        }
    }

    /// Return the cached value for `key`, computing and storing it on a miss.
    pub fn get_or_compute(&self, key: K, compute: impl FnOnce() -> V) -> V {
        let mut slot = self
            .slot
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if let Some((cached_key, value)) = slot.as_ref() {
            if *cached_key == key {
                return value.clone();
            }
        }

        let value = compute();
        *slot = Some((key, value.clone()));
        value
    }
}

impl<K, V> Default for Memo<K, V>
where
    K: PartialEq,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_hit_skips_compute() {
        let memo: Memo<u64, u64> = Memo::new();
        let calls = Cell::new(0);

        let compute = |v: u64| {
            calls.set(calls.get() + 1);
            v * 10
        };

        assert_eq!(memo.get_or_compute(1, || compute(1)), 10);
        assert_eq!(memo.get_or_compute(1, || compute(1)), 10);
        assert_eq!(calls.get(), 1);

        assert_eq!(memo.get_or_compute(2, || compute(2)), 20);
        assert_eq!(calls.get(), 2);

        // Single slot: going back recomputes
        assert_eq!(memo.get_or_compute(1, || compute(1)), 10);
        assert_eq!(calls.get(), 3);
    }
}
