//! # mrweather-memory
//!
//! Persistent user and reminder storage for Mr. Weather (SQLite-backed).

pub mod registry;
pub mod store;

pub use registry::{Reminder, User, UserRegistry};
pub use store::{Session, Store};
