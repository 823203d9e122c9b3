//! Completion service integration.

pub mod anthropic;
pub mod shared;

pub use shared::{ChatMessage, ProviderError, ProviderErrorKind, ProviderResult};
