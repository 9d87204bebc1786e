use serde::{Deserialize, Serialize};

use super::defaults::*;

/// Data provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProviderConfig {
    #[serde(default)]
    pub weather: WeatherConfig,
    #[serde(default)]
    pub text: TextConfig,
    #[serde(default)]
    pub cat: CatConfig,
}

/// Weather forecast API (weatherapi.com) config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_weather_base_url")]
    pub base_url: String,
    /// How long a cached response stays valid, in seconds (default: 4 hours).
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_weather_base_url(),
            cache_ttl_secs: default_cache_ttl_secs(),
        }
    }
}

/// Generative text (Gemini) config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_gemini_base_url")]
    pub base_url: String,
    #[serde(default = "default_gemini_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
    /// Prefix prepended to every free-form chat prompt.
    #[serde(default = "default_personality")]
    pub personality: String,
    /// Prompt used for `/motivation` and the daily digest.
    #[serde(default = "default_motivation_prompt")]
    pub motivation_prompt: String,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_gemini_base_url(),
            model: default_gemini_model(),
            temperature: default_temperature(),
            max_output_tokens: default_max_output_tokens(),
            personality: default_personality(),
            motivation_prompt: default_motivation_prompt(),
        }
    }
}

/// Cat image API (thecatapi.com) config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_cat_base_url")]
    pub base_url: String,
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
}

impl Default for CatConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_cat_base_url(),
            cache_ttl_secs: default_cache_ttl_secs(),
        }
    }
}
