use serde::{Deserialize, Serialize};

/// An incoming message from a user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IncomingMessage {
    /// Platform user ID.
    pub sender_id: i64,
    /// Human-readable sender name.
    pub sender_name: String,
    /// Avatar URL, if the platform provides one.
    #[serde(default)]
    pub sender_avatar: String,
    /// Message text content.
    pub text: String,
}

/// A message to deliver to a user through a channel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutgoingMessage {
    /// Platform user ID of the recipient.
    pub target: i64,
    pub text: String,
    /// Optional image shown with the message (e.g. the daily cat).
    #[serde(default)]
    pub image_url: Option<String>,
}

impl OutgoingMessage {
    pub fn text(target: i64, text: impl Into<String>) -> Self {
        Self {
            target,
            text: text.into(),
            image_url: None,
        }
    }
}

/// Today's forecast for one location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    /// Resolved location name as reported by the API.
    pub location: String,
    /// Daily high in °F.
    pub highest_temperature: f64,
    /// Max wind in mph.
    pub wind: f64,
    /// Daily chance of rain, percent.
    pub rain: u32,
    pub summary: String,
    pub icon: String,
    pub source: String,
}

/// Generated text from the text provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextReply {
    pub text: String,
    pub source: String,
}

/// A random cat picture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatImage {
    pub url: String,
    pub source: String,
}
