//! Run-scoped memo for provider responses.
//!
//! Lives only as long as one command invocation; nothing is persisted.
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

#[derive(Clone)]
pub struct Cache<K, V>
where
    K: Eq + Hash + Debug + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    inner: Arc<Mutex<HashMap<K, V>>>,
}

impl<K, V> Cache<K, V>
where
    K: Eq + Hash + Debug + Send + Sync,
    V: Clone + Send + Sync,
{
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub async fn get(&self, key: &K) -> Option<V> {
        let entries = self.inner.lock().await;
        let value = entries.get(key).cloned();
        debug!(?key, hit = value.is_some(), "Cache lookup");
        value
    }

    pub async fn put(&self, key: K, value: V) {
        let mut entries = self.inner.lock().await;
        debug!(?key, "Cache PUT");
        entries.insert(key, value);
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl<K, V> Default for Cache<K, V>
where
    K: Eq + Hash + Debug + Send + Sync,
    V: Clone + Send + Sync,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_cache_get_put() {
        let cache = Cache::<String, f64>::new();
        assert!(cache.is_empty().await);
        assert!(cache.get(&"EURUSD".to_string()).await.is_none());

        cache.put("EURUSD".to_string(), 1.105).await;
        assert_eq!(cache.get(&"EURUSD".to_string()).await, Some(1.105));
        assert!(cache.get(&"GBPUSD".to_string()).await.is_none());
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_cache_clones_share_entries() {
        let cache = Cache::<String, f64>::new();
        let other = cache.clone();
        other.put("USDJPY".to_string(), 151.2).await;
        assert_eq!(cache.get(&"USDJPY".to_string()).await, Some(151.2));
    }
}
