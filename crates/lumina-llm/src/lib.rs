//! lumina-llm - Talking to chat-completion providers
//!
//! - `adapter` - Request construction, connection probe, streaming and
//!   non-streaming chat against the configured provider
//! - `endpoint` - Provider-specific endpoint resolution
//! - `openai_compat` - Wire types shared by every supported provider
//! - `relay` - Decodes the provider byte stream into [`StreamEvent`]s
//!
//! [`StreamEvent`]: lumina_core::StreamEvent

pub mod adapter;
pub mod endpoint;
pub mod error;
pub mod openai_compat;
pub mod relay;

pub use adapter::{ByteStream, ChatResponse, ConnectionSuccess, ProviderAdapter};
pub use endpoint::{provider_for_endpoint, resolve_endpoint};
pub use error::{LLMError, Result};
pub use openai_compat::Usage;
pub use relay::{relay_events, stream_turn, EventStream};
