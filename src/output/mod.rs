//! Output: rendered resumes, result records, console reports and the tracking sheet

pub mod formatter;
pub mod markdown;
pub mod result;
pub mod sheets;
