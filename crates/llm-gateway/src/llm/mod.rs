//! Provider adapters and the canonical chat-completion types.

mod credentials;
mod error;
mod gemini;
mod openai;
mod provider;
mod registry;
mod types;

pub use credentials::{Credential, CredentialStore, KeySelector, RandomKeySelector, parse_pool};
pub use error::GatewayError;
pub use gemini::GeminiAdapter;
pub use openai::OpenAICompatibleAdapter;
pub use provider::{Adapter, Provider, ProviderSelection, UpstreamRequest};
pub use registry::{ProviderRegistry, RegisteredProvider};
pub use types::{ChatRequest, Message, NormalizedChoice, NormalizedMessage, NormalizedResponse, Role};

/// Sampling temperature used when the request leaves it unset.
pub const DEFAULT_TEMPERATURE: f64 = 0.7;

/// Completion token cap used when the request leaves it unset.
pub const DEFAULT_MAX_TOKENS: u32 = 4096;
