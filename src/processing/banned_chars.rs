//! Scan a directory tree for characters that must never ship in output

use crate::error::{Result, TailorError};
use aho_corasick::AhoCorasick;
use log::debug;
use std::path::{Path, PathBuf};

const SKIPPED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "pdf", "docx"];

#[derive(Debug, Clone, PartialEq)]
pub struct BannedHit {
    pub path: PathBuf,
    pub character: String,
    pub count: usize,
}

pub struct BannedCharScanner {
    patterns: Vec<String>,
    matcher: AhoCorasick,
}

impl BannedCharScanner {
    pub fn new(patterns: &[String]) -> Result<Self> {
        let patterns: Vec<String> = patterns.iter().filter(|p| !p.is_empty()).cloned().collect();
        let matcher = AhoCorasick::new(&patterns)
            .map_err(|e| TailorError::Configuration(format!("Invalid banned characters: {}", e)))?;
        Ok(Self { patterns, matcher })
    }

    /// Hits in one string, one entry per banned character found
    pub fn scan_text(&self, text: &str) -> Vec<(String, usize)> {
        let mut counts = vec![0usize; self.patterns.len()];
        for m in self.matcher.find_iter(text) {
            counts[m.pattern().as_usize()] += 1;
        }
        self.patterns
            .iter()
            .zip(counts)
            .filter(|(_, count)| *count > 0)
            .map(|(p, count)| (p.clone(), count))
            .collect()
    }

    /// Walk `root` (a file or directory). Binary and document files, and
    /// files that are not valid UTF-8, are skipped.
    pub fn scan_path(&self, root: &Path) -> Result<Vec<BannedHit>> {
        let mut files = Vec::new();
        collect_files(root, &mut files)?;
        files.sort();

        let mut hits = Vec::new();
        for path in files {
            let skipped = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| SKIPPED_EXTENSIONS.contains(&e.to_lowercase().as_str()));
            if skipped {
                continue;
            }
            let Ok(text) = std::fs::read_to_string(&path) else {
                debug!("Skipping non-text file {}", path.display());
                continue;
            };
            for (character, count) in self.scan_text(&text) {
                hits.push(BannedHit {
                    path: path.clone(),
                    character,
                    count,
                });
            }
        }
        Ok(hits)
    }
}

fn collect_files(path: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
    if path.is_file() {
        files.push(path.to_path_buf());
        return Ok(());
    }
    for entry in std::fs::read_dir(path)? {
        let entry_path = entry?.path();
        if entry_path.is_dir() {
            collect_files(&entry_path, files)?;
        } else {
            files.push(entry_path);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn scanner() -> BannedCharScanner {
        BannedCharScanner::new(&["\u{2014}".to_string()]).unwrap()
    }

    #[test]
    fn test_scan_text_counts() {
        let hits = scanner().scan_text("a \u{2014} b \u{2014} c - d");
        assert_eq!(hits, vec![("\u{2014}".to_string(), 2)]);
        assert!(scanner().scan_text("plain - text").is_empty());
    }

    #[test]
    fn test_scan_path_skips_binary_extensions() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("runs").join("inputs");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(nested.join("notes.md"), "Role \u{2014} Analyst").unwrap();
        std::fs::write(temp_dir.path().join("clean.txt"), "nothing here").unwrap();
        std::fs::write(temp_dir.path().join("resume.docx"), "\u{2014}").unwrap();
        std::fs::write(temp_dir.path().join("blob.bin"), [0xffu8, 0xfe, 0x00]).unwrap();

        let hits = scanner().scan_path(temp_dir.path()).unwrap();
        assert_eq!(hits.len(), 1);
        assert!(hits[0].path.ends_with("notes.md"));
        assert_eq!(hits[0].count, 1);
    }

    #[test]
    fn test_scan_single_file() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("out.md");
        std::fs::write(&file, "x\u{2014}y").unwrap();
        assert_eq!(scanner().scan_path(&file).unwrap().len(), 1);
    }
}
