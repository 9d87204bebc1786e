//! # mrweather-providers
//!
//! Third-party data providers for Mr. Weather.

pub mod cache;
pub mod cat;
pub mod gemini;
pub mod weather;

pub use cat::CatProvider;
pub use gemini::GeminiProvider;
pub use weather::WeatherProvider;
