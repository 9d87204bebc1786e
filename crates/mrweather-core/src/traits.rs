use crate::{error::MrWeatherError, message::OutgoingMessage};
use async_trait::async_trait;

/// Data provider trait -- one third-party API behind a single call.
///
/// `fetch` never fails loudly: any transport, status, or decoding error is
/// logged by the implementation and reported as `None`.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Request parameters (a location, a prompt, or `()`).
    type Request: ?Sized + Sync;
    /// Extracted result.
    type Output: Send;

    /// Human-readable provider name.
    fn name(&self) -> &str;

    /// Query the API and extract the fields the bot uses.
    async fn fetch(&self, request: &Self::Request) -> Option<Self::Output>;
}

/// Delivery channel trait.
///
/// Platform integrations implement this to deliver messages to a user.
#[async_trait]
pub trait Channel: Send + Sync {
    /// Human-readable channel name.
    fn name(&self) -> &str;

    /// Deliver a message to `message.target`.
    async fn send(&self, message: OutgoingMessage) -> Result<(), MrWeatherError>;
}
