//! Text processing: tokenization, coverage scoring, bullets and baselines

pub mod banned_chars;
pub mod baseline;
pub mod bullets;
pub mod coverage;
pub mod text_processor;
