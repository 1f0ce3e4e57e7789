//! Job tailor library

pub mod cli;
pub mod config;
pub mod document;
pub mod error;
pub mod input;
pub mod llm;
pub mod output;
pub mod pipeline;
pub mod processing;
pub mod runs;

pub use config::Config;
pub use error::{Result, TailorError};
