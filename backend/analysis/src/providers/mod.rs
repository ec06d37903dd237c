//! LLM provider implementations.

pub mod anthropic;
pub mod mock;

pub use anthropic::AnthropicProvider;
pub use mock::MockProvider;

pub use billscope_core::{DEFAULT_BASE_URL, DEFAULT_MAX_TOKENS, DEFAULT_MODEL};
