//! Daily forecast provider backed by weatherapi.com.
//!
//! Calls `GET {base}/forecast.json?key=..&q=<location>&days=1` and keeps the
//! handful of fields the bot shows: high, wind, chance of rain, condition.

use async_trait::async_trait;
use mrweather_core::{
    config::WeatherConfig, error::MrWeatherError, message::Forecast, traits::Provider,
};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use crate::cache::CachedClient;

const SOURCE: &str = "Open Weather Api";

/// Forecast provider.
pub struct WeatherProvider {
    http: CachedClient,
    api_key: String,
    base_url: String,
}

impl WeatherProvider {
    /// Create from config values.
    pub fn from_config(config: &WeatherConfig) -> Self {
        Self {
            http: CachedClient::new(Duration::from_secs(config.cache_ttl_secs)),
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Whether the API recognizes `location`.
    pub async fn location_exists(&self, location: &str) -> bool {
        self.fetch(location).await.is_some()
    }

    async fn request(&self, location: &str) -> Result<Forecast, MrWeatherError> {
        let url = reqwest::Url::parse_with_params(
            &format!("{}/forecast.json", self.base_url),
            &[("key", self.api_key.as_str()), ("q", location), ("days", "1")],
        )
        .map_err(|e| MrWeatherError::Provider(format!("weather: bad url: {e}")))?;

        debug!("weather: GET forecast.json q={location}");
        let body = self.http.get_json(&url).await?;
        parse_forecast(body)
    }
}

// --- Serde types ---

#[derive(Deserialize)]
struct ForecastResponse {
    location: ApiLocation,
    forecast: ApiForecast,
}

#[derive(Deserialize)]
struct ApiLocation {
    name: String,
}

#[derive(Deserialize)]
struct ApiForecast {
    forecastday: Vec<ApiForecastDay>,
}

#[derive(Deserialize)]
struct ApiForecastDay {
    day: ApiDay,
}

#[derive(Deserialize)]
struct ApiDay {
    maxtemp_f: f64,
    maxwind_mph: f64,
    #[serde(default)]
    daily_chance_of_rain: u32,
    condition: ApiCondition,
}

#[derive(Deserialize)]
struct ApiCondition {
    text: String,
    icon: String,
}

/// Extract today's forecast from a `forecast.json` body.
fn parse_forecast(body: serde_json::Value) -> Result<Forecast, MrWeatherError> {
    let parsed: ForecastResponse = serde_json::from_value(body)?;
    let today = parsed
        .forecast
        .forecastday
        .into_iter()
        .next()
        .ok_or_else(|| MrWeatherError::Provider("weather: no forecast days".into()))?;

    Ok(Forecast {
        location: parsed.location.name,
        highest_temperature: today.day.maxtemp_f,
        wind: today.day.maxwind_mph,
        rain: today.day.daily_chance_of_rain,
        summary: today.day.condition.text,
        icon: normalize_icon(&today.day.condition.icon),
        source: SOURCE.to_string(),
    })
}

/// The API returns protocol-relative icon URLs (`//cdn.weatherapi.com/...`).
fn normalize_icon(icon: &str) -> String {
    match icon.strip_prefix("//") {
        Some(rest) => format!("https://{rest}"),
        None => icon.to_string(),
    }
}

#[async_trait]
impl Provider for WeatherProvider {
    type Request = str;
    type Output = Forecast;

    fn name(&self) -> &str {
        "weather"
    }

    async fn fetch(&self, location: &str) -> Option<Forecast> {
        if location.trim().is_empty() {
            return None;
        }
        if self.api_key.is_empty() {
            warn!("weather: no API key configured");
            return None;
        }
        match self.request(location.trim()).await {
            Ok(forecast) => Some(forecast),
            Err(e) => {
                warn!("weather: forecast for '{location}' failed: {e}");
                None
            }
        }
    }
}
