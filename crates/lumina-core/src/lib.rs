//! lumina-core - Shared types for the Lumina builder
//!
//! This crate provides the types passed between the builder crates:
//! - `settings` - Provider selection, api key and endpoint configuration
//! - `message` - Conversation history entries and the inbound chat request
//! - `events` - The normalized stream event sequence relayed to clients
//! - `paths` - Data directory helpers

pub mod error;
pub mod events;
pub mod message;
pub mod paths;
pub mod settings;

pub use error::ConfigError;
pub use events::StreamEvent;
pub use message::{ChatRequest, Message, Role};
pub use settings::{MaskedSettings, Provider, Settings, SettingsUpdate};
