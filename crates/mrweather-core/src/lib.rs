//! # mrweather-core
//!
//! Core types, traits, configuration, and error handling for Mr. Weather.

pub mod config;
pub mod error;
pub mod message;
pub mod traits;

pub use config::shellexpand;
