//! LLM 模块
//!
//! 提供限流、带重试的 Chat Completions 客户端。

mod client;
mod format;
mod openai;
mod rate_limit;
mod types;

pub use client::LlmClient;
pub use types::{ChatMessage, ChatOptions, LlmError, RetryConfig};
