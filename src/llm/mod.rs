//! LLM integration module

pub mod client;
pub mod prompts;
