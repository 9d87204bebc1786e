//! HTTP GET with a time-bounded response cache.
//!
//! Forecasts and cat pictures change slowly; repeated requests for the same
//! URL within the TTL are answered from memory.

use mrweather_core::error::MrWeatherError;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::debug;

/// In-memory cache of decoded JSON bodies keyed by URL.
pub struct ResponseCache {
    ttl: Duration,
    entries: Mutex<HashMap<String, (Instant, Value)>>,
}

impl ResponseCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Cached body for `key`, if present and younger than the TTL.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.get_at(key, Instant::now())
    }

    fn get_at(&self, key: &str, now: Instant) -> Option<Value> {
        let Ok(mut entries) = self.entries.lock() else {
            return None;
        };
        match entries.get(key) {
            Some((stored, value)) if now.duration_since(*stored) < self.ttl => Some(value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    pub fn insert(&self, key: String, value: Value) {
        self.insert_at(key, value, Instant::now());
    }

    fn insert_at(&self, key: String, value: Value, now: Instant) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.retain(|_, (stored, _)| now.duration_since(*stored) < self.ttl);
            entries.insert(key, (now, value));
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A `reqwest` client whose successful JSON GETs are cached.
pub struct CachedClient {
    client: reqwest::Client,
    cache: ResponseCache,
}

impl CachedClient {
    pub fn new(ttl: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            cache: ResponseCache::new(ttl),
        }
    }

    /// GET `url` and decode the body as JSON. Non-2xx responses are errors
    /// and are never cached.
    ///
    /// API keys travel in the query string, so errors never carry the URL.
    pub async fn get_json(&self, url: &reqwest::Url) -> Result<Value, MrWeatherError> {
        if let Some(hit) = self.cache.get(url.as_str()) {
            debug!("cache hit: {}", url.path());
            return Ok(hit);
        }

        let resp = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| MrWeatherError::Provider(format!("request failed: {}", e.without_url())))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(MrWeatherError::Provider(format!(
                "{} returned {status}: {text}",
                url.path()
            )));
        }

        let body: Value = resp
            .json()
            .await
            .map_err(|e| {
                MrWeatherError::Provider(format!("failed to parse response: {}", e.without_url()))
            })?;

        self.cache.insert(url.as_str().to_string(), body.clone());
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_hit_within_ttl() {
        let cache = ResponseCache::new(Duration::from_secs(60));
        let t0 = Instant::now();
        cache.insert_at("k".into(), json!({"a": 1}), t0);
        assert_eq!(
            cache.get_at("k", t0 + Duration::from_secs(59)),
            Some(json!({"a": 1}))
        );
    }

    #[test]
    fn test_expired_entry_is_evicted() {
        let cache = ResponseCache::new(Duration::from_secs(60));
        let t0 = Instant::now();
        cache.insert_at("k".into(), json!(1), t0);
        assert_eq!(cache.get_at("k", t0 + Duration::from_secs(60)), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_insert_sweeps_stale_entries() {
        let cache = ResponseCache::new(Duration::from_secs(10));
        let t0 = Instant::now();
        cache.insert_at("old".into(), json!(1), t0);
        cache.insert_at("new".into(), json!(2), t0 + Duration::from_secs(11));
        assert_eq!(cache.len(), 1);
        assert_eq!(
            cache.get_at("new", t0 + Duration::from_secs(12)),
            Some(json!(2))
        );
    }

    #[tokio::test]
    async fn test_transport_error_hides_query_key() {
        let client = CachedClient::new(Duration::from_secs(60));
        let url = reqwest::Url::parse(
            "http://127.0.0.1:1/v1/images/search?limit=1&api_key=SECRET123",
        )
        .unwrap();
        let err = client.get_json(&url).await.unwrap_err().to_string();
        assert!(err.contains("request failed"), "{err}");
        assert!(!err.contains("SECRET123"), "{err}");
    }

    #[test]
    fn test_miss() {
        let cache = ResponseCache::new(Duration::from_secs(10));
        assert!(cache.get("absent").is_none());
    }
}
