//! Random cat picture provider backed by thecatapi.com.

use async_trait::async_trait;
use mrweather_core::{config::CatConfig, error::MrWeatherError, message::CatImage, traits::Provider};
use serde::Deserialize;
use std::time::Duration;
use tracing::warn;

use crate::cache::CachedClient;

const SOURCE: &str = "The Cat Api";

/// Cat picture provider.
pub struct CatProvider {
    http: CachedClient,
    api_key: String,
    base_url: String,
}

impl CatProvider {
    /// Create from config values.
    pub fn from_config(config: &CatConfig) -> Self {
        Self {
            http: CachedClient::new(Duration::from_secs(config.cache_ttl_secs)),
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn request(&self) -> Result<CatImage, MrWeatherError> {
        let url = reqwest::Url::parse_with_params(
            &format!("{}/images/search", self.base_url),
            &[("limit", "1"), ("api_key", self.api_key.as_str())],
        )
        .map_err(|e| MrWeatherError::Provider(format!("cat: bad url: {e}")))?;

        let body = self.http.get_json(&url).await?;
        parse_image(body)
    }
}

#[derive(Deserialize)]
struct ImageEntry {
    url: String,
}

/// First image URL of an `images/search` body.
fn parse_image(body: serde_json::Value) -> Result<CatImage, MrWeatherError> {
    let entries: Vec<ImageEntry> = serde_json::from_value(body)?;
    let first = entries
        .into_iter()
        .next()
        .ok_or_else(|| MrWeatherError::Provider("cat: empty search result".into()))?;
    Ok(CatImage {
        url: first.url,
        source: SOURCE.to_string(),
    })
}

#[async_trait]
impl Provider for CatProvider {
    type Request = ();
    type Output = CatImage;

    fn name(&self) -> &str {
        "cat"
    }

    async fn fetch(&self, _request: &()) -> Option<CatImage> {
        match self.request().await {
            Ok(image) => Some(image),
            Err(e) => {
                warn!("cat: image search failed: {e}");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_image_takes_first_url() {
        let body = json!([
            { "id": "a1", "url": "https://cdn2.thecatapi.com/images/a1.jpg", "width": 640, "height": 480 },
            { "id": "b2", "url": "https://cdn2.thecatapi.com/images/b2.jpg" }
        ]);
        let image = parse_image(body).unwrap();
        assert_eq!(image.url, "https://cdn2.thecatapi.com/images/a1.jpg");
        assert_eq!(image.source, "The Cat Api");
    }

    #[test]
    fn test_parse_image_empty_array() {
        assert!(matches!(
            parse_image(json!([])),
            Err(MrWeatherError::Provider(_))
        ));
    }

    #[test]
    fn test_parse_image_unexpected_shape() {
        assert!(parse_image(json!({ "message": "unauthorized" })).is_err());
    }
}
