//! Inference providers for the nyasah insights engine.
//!
//! Three interchangeable backends (a hosted chat-completion API, a
//! self-hosted generation server, and a hosted per-model inference API)
//! sit behind the [`Provider`] trait. [`create_provider`] picks one from
//! configuration. Every call goes through a shared JSON transport with a
//! per-request timeout and bounded retry on transient failures.

pub mod error;
pub mod factory;
pub mod huggingface;
pub mod llama;
pub mod openai;
pub mod provider;

mod retry;
mod sentiment;
mod transport;

pub use error::ProviderError;
pub use factory::{create_provider, ProviderKind};
pub use huggingface::HuggingFaceProvider;
pub use llama::LlamaProvider;
pub use openai::OpenAiProvider;
pub use provider::Provider;
