use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use std::sync::Arc;

/// Small TTL cache shared between clones. A zero TTL disables caching.
#[derive(Debug, Clone)]
pub struct Cache<T> {
    data: Arc<Mutex<HashMap<String, (T, Instant)>>>,
    ttl: Duration,
}

impl<T: Clone> Cache<T> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            data: Arc::new(Mutex::new(HashMap::new())),
            ttl,
        }
    }

    pub async fn get(&self, key: &str) -> Option<T> {
        let data = self.data.lock().await;
        if let Some((value, timestamp)) = data.get(key) {
            if timestamp.elapsed() < self.ttl {
                return Some(value.clone());
            }
        }
        None
    }

    pub async fn set(&self, key: String, value: T) {
        if self.ttl.is_zero() {
            return;
        }
        let mut data = self.data.lock().await;
        data.retain(|_, (_, timestamp)| timestamp.elapsed() < self.ttl);
        data.insert(key, (value, Instant::now()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_cache_hit_and_miss() {
        let cache = Cache::new(Duration::from_secs(60));
        assert_eq!(cache.get("BTCUSDT").await, None);

        cache.set("BTCUSDT".to_string(), 30000.0).await;
        assert_eq!(cache.get("BTCUSDT").await, Some(30000.0));
        assert_eq!(cache.get("ETHUSDT").await, None);
    }

    #[tokio::test]
    async fn test_entries_expire() {
        let cache = Cache::new(Duration::from_millis(20));
        cache.set("BTCUSDT".to_string(), 1.0).await;
        tokio::time::sleep(Duration::from_millis(40)).await;
        assert_eq!(cache.get("BTCUSDT").await, None);
    }

    #[tokio::test]
    async fn test_zero_ttl_disables_cache() {
        let cache = Cache::new(Duration::ZERO);
        cache.set("BTCUSDT".to_string(), 1.0).await;
        assert_eq!(cache.get("BTCUSDT").await, None);
    }
}
