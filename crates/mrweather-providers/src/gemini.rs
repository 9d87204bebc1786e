//! Google Gemini text provider.
//!
//! Calls the Gemini `generateContent` endpoint. Auth via URL query param.

use async_trait::async_trait;
use mrweather_core::{
    config::TextConfig, error::MrWeatherError, message::TextReply, traits::Provider,
};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, warn};

const SOURCE: &str = "Gemini";

/// Google Gemini text provider.
pub struct GeminiProvider {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
    max_output_tokens: u32,
}

impl GeminiProvider {
    /// Create from config values.
    pub fn from_config(config: &TextConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_output_tokens: config.max_output_tokens,
        }
    }

    fn build_request(&self, prompt: &str) -> GeminiRequest {
        GeminiRequest {
            contents: vec![GeminiContent {
                role: Some("user".to_string()),
                parts: vec![GeminiPart {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: self.temperature,
                max_output_tokens: self.max_output_tokens,
            },
        }
    }

    async fn generate(&self, prompt: &str) -> Result<TextReply, MrWeatherError> {
        let start = Instant::now();
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );
        debug!("gemini: POST models/{}:generateContent", self.model);

        let resp = self
            .client
            .post(&url)
            .json(&self.build_request(prompt))
            .send()
            .await
            .map_err(|e| {
                MrWeatherError::Provider(format!("gemini request failed: {}", e.without_url()))
            })?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(MrWeatherError::Provider(format!(
                "gemini returned {status}: {text}"
            )));
        }

        let parsed: GeminiResponse = resp.json().await.map_err(|e| {
            MrWeatherError::Provider(format!(
                "gemini: failed to parse response: {}",
                e.without_url()
            ))
        })?;

        let text = first_text(&parsed)
            .ok_or_else(|| MrWeatherError::Provider("gemini: empty candidate list".into()))?;
        debug!("gemini: replied in {}ms", start.elapsed().as_millis());

        Ok(TextReply {
            text,
            source: SOURCE.to_string(),
        })
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Serialize, Deserialize)]
struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<GeminiPart>,
}

#[derive(Serialize, Deserialize)]
struct GeminiPart {
    text: String,
}

#[derive(Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<GeminiCandidate>>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

fn first_text(response: &GeminiResponse) -> Option<String> {
    response
        .candidates
        .as_ref()
        .and_then(|c| c.first())
        .and_then(|c| c.content.as_ref())
        .and_then(|c| c.parts.first())
        .map(|p| p.text.trim().to_string())
        .filter(|t| !t.is_empty())
}

#[async_trait]
impl Provider for GeminiProvider {
    type Request = str;
    type Output = TextReply;

    fn name(&self) -> &str {
        "gemini"
    }

    async fn fetch(&self, prompt: &str) -> Option<TextReply> {
        if self.api_key.is_empty() {
            warn!("gemini: no API key configured");
            return None;
        }
        match self.generate(prompt).await {
            Ok(reply) => Some(reply),
            Err(e) => {
                warn!("gemini: generation failed: {e}");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> GeminiProvider {
        GeminiProvider::from_config(&TextConfig {
            api_key: "AIza-test".into(),
            ..TextConfig::default()
        })
    }

    #[test]
    fn test_gemini_provider_name() {
        assert_eq!(provider().name(), "gemini");
    }

    #[test]
    fn test_gemini_request_serialization() {
        let body = serde_json::to_value(provider().build_request("hello")).unwrap();
        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "hello");
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 800);
        assert!((body["generationConfig"]["temperature"].as_f64().unwrap() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_first_text_from_response() {
        let json = r#"{
            "candidates": [{"content": {"role": "model", "parts": [{"text": "  Carpe diem.\n"}]}}],
            "usageMetadata": {"totalTokenCount": 12}
        }"#;
        let resp: GeminiResponse = serde_json::from_str(json).unwrap();
        assert_eq!(first_text(&resp).as_deref(), Some("Carpe diem."));
    }

    #[test]
    fn test_first_text_blocked_response() {
        let resp: GeminiResponse =
            serde_json::from_str(r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#).unwrap();
        assert!(first_text(&resp).is_none());
    }

    #[tokio::test]
    async fn test_generate_error_hides_api_key() {
        let p = GeminiProvider::from_config(&TextConfig {
            api_key: "AIza-SECRET".into(),
            base_url: "http://127.0.0.1:1/v1beta".into(),
            ..TextConfig::default()
        });
        let err = p.generate("hi").await.unwrap_err().to_string();
        assert!(err.contains("gemini request failed"), "{err}");
        assert!(!err.contains("AIza-SECRET"), "{err}");
    }

    #[tokio::test]
    async fn test_fetch_without_key_is_none() {
        let p = GeminiProvider::from_config(&TextConfig::default());
        assert!(p.fetch("hi").await.is_none());
    }
}
