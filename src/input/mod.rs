//! Input handling
//! File type detection, text extraction and job description parsing

pub mod file_detector;
pub mod jd_parser;
pub mod manager;
pub mod text_extractor;
