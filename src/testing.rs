//! Stub providers and a recording channel for tests.

use async_trait::async_trait;
use mrweather_core::{
    error::MrWeatherError,
    message::{CatImage, Forecast, OutgoingMessage, TextReply},
    traits::{Channel, Provider},
};
use mrweather_memory::{Store, UserRegistry};
use std::sync::Mutex;

pub async fn registry() -> UserRegistry {
    let registry = UserRegistry::new(Store::open_in_memory().await.unwrap());
    registry.ensure_tables().await.unwrap();
    registry
}

/// Knows a fixed set of locations (case-insensitive).
pub struct StubWeather {
    pub known: Vec<&'static str>,
}

impl StubWeather {
    pub fn new(known: &[&'static str]) -> Self {
        Self {
            known: known.to_vec(),
        }
    }
}

#[async_trait]
impl Provider for StubWeather {
    type Request = str;
    type Output = Forecast;

    fn name(&self) -> &str {
        "stub-weather"
    }

    async fn fetch(&self, location: &str) -> Option<Forecast> {
        let name = self
            .known
            .iter()
            .find(|k| k.eq_ignore_ascii_case(location.trim()))?;
        Some(Forecast {
            location: name.to_string(),
            highest_temperature: 72.0,
            wind: 5.0,
            rain: 20,
            summary: "Partly cloudy".into(),
            icon: String::new(),
            source: "stub".into(),
        })
    }
}

/// Replies with a fixed text (or nothing) and records every prompt.
pub struct StubText {
    pub reply: Option<String>,
    pub prompts: Mutex<Vec<String>>,
}

impl StubText {
    pub fn new(reply: Option<&str>) -> Self {
        Self {
            reply: reply.map(String::from),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Provider for StubText {
    type Request = str;
    type Output = TextReply;

    fn name(&self) -> &str {
        "stub-text"
    }

    async fn fetch(&self, prompt: &str) -> Option<TextReply> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.reply.clone().map(|text| TextReply {
            text,
            source: "stub".into(),
        })
    }
}

pub struct StubCat {
    pub url: Option<String>,
}

#[async_trait]
impl Provider for StubCat {
    type Request = ();
    type Output = CatImage;

    fn name(&self) -> &str {
        "stub-cat"
    }

    async fn fetch(&self, _request: &()) -> Option<CatImage> {
        self.url.clone().map(|url| CatImage {
            url,
            source: "stub".into(),
        })
    }
}

/// Keeps every delivered message; refuses delivery to `reject`.
#[derive(Default)]
pub struct RecordingChannel {
    pub sent: Mutex<Vec<OutgoingMessage>>,
    pub reject: Vec<i64>,
}

impl RecordingChannel {
    pub fn sent(&self) -> Vec<OutgoingMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Channel for RecordingChannel {
    fn name(&self) -> &str {
        "recording"
    }

    async fn send(&self, message: OutgoingMessage) -> Result<(), MrWeatherError> {
        if self.reject.contains(&message.target) {
            return Err(MrWeatherError::Channel(format!(
                "user {} unreachable",
                message.target
            )));
        }
        self.sent.lock().unwrap().push(message);
        Ok(())
    }
}
