use std::{collections::HashMap, hash::Hash, sync::Arc};
use tokio::sync::RwLock;

/// Generic in-memory key-value map guarded by a single lock.
///
/// Every read takes the read guard; every mutation, including compound
/// check-then-write sequences passed to [`MapStore::update_map`], runs under
/// the write guard.
#[derive(Clone)]
pub struct MapStore<K, V> {
    inner: Arc<RwLock<HashMap<K, V>>>,
}

impl<K, V> Default for MapStore<K, V> {
    fn default() -> Self {
        Self { inner: Arc::new(RwLock::new(HashMap::new())) }
    }
}

impl<K, V> MapStore<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Get value by key.
    pub async fn get(&self, key: &K) -> Option<V> {
        let map = self.inner.read().await;
        map.get(key).cloned()
    }

    pub async fn contains(&self, key: &K) -> bool {
        let map = self.inner.read().await;
        map.contains_key(key)
    }

    /// Insert or overwrite a value by key.
    pub async fn insert(&self, key: K, value: V) {
        let mut map = self.inner.write().await;
        map.insert(key, value);
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }

    /// Apply a mutation to the underlying map while holding the write guard.
    pub async fn update_map<F, T, E>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut HashMap<K, V>) -> Result<T, E>,
    {
        let mut map = self.inner.write().await;
        f(&mut map)
    }
}
